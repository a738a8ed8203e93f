use camino::{Utf8Path, Utf8PathBuf};
use std::collections::{BTreeMap, BTreeSet};

use crate::error::{Result, SessionError};

/// Which lines of which files the suite actually executes, from an optional
/// prior coverage pass. Mutables on never-executed lines are classified
/// Uncovered without running the suite at all.
#[derive(Debug, Default)]
pub struct CoverageMap {
    files: BTreeMap<Utf8PathBuf, BTreeSet<usize>>,
}

impl CoverageMap {
    pub fn load(path: &Utf8Path) -> Result<Self> {
        let data =
            std::fs::read_to_string(path).map_err(|e| SessionError::io(path.to_owned(), e))?;
        let files: BTreeMap<Utf8PathBuf, BTreeSet<usize>> = serde_json::from_str(&data)
            .map_err(|e| {
                SessionError::config(format!("failed to parse coverage map {path}: {e}"))
            })?;
        Ok(CoverageMap { files })
    }

    pub fn from_lines(
        entries: impl IntoIterator<Item = (Utf8PathBuf, Vec<usize>)>,
    ) -> Self {
        CoverageMap {
            files: entries
                .into_iter()
                .map(|(path, lines)| (path, lines.into_iter().collect()))
                .collect(),
        }
    }

    pub fn covers(&self, file_path: &Utf8Path, line: usize) -> bool {
        self.files
            .get(file_path)
            .is_some_and(|lines| lines.contains(&line))
    }
}
