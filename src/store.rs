use camino::Utf8Path;
use serde::{Deserialize, Serialize};

use crate::error::{Result, SessionError};
use crate::mutable::{Mutable, MutableStatus};

/// Holds scanned Mutables in execution order and persists them so a long run
/// can be paused and resumed without rescanning.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct MutableStore {
    mutables: Vec<Mutable>,
}

impl MutableStore {
    /// Build from scanner output. The scanner already sorted by file, byte
    /// offset, and operator; the store preserves that order.
    pub fn new(mutables: Vec<Mutable>) -> Self {
        MutableStore { mutables }
    }

    pub fn len(&self) -> usize {
        self.mutables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mutables.is_empty()
    }

    pub fn all(&self) -> &[Mutable] {
        &self.mutables
    }

    pub fn for_file(&self, file_path: &Utf8Path) -> impl Iterator<Item = &Mutable> {
        self.mutables.iter().filter(move |m| m.file_path == file_path)
    }

    pub fn with_status(&self, status: MutableStatus) -> impl Iterator<Item = &Mutable> {
        self.mutables.iter().filter(move |m| m.status == status)
    }

    /// Indices of Mutables still awaiting execution, in store order.
    pub fn pending_indices(&self) -> Vec<usize> {
        self.mutables
            .iter()
            .enumerate()
            .filter(|(_, m)| m.status == MutableStatus::Pending)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn get(&self, index: usize) -> &Mutable {
        &self.mutables[index]
    }

    /// Record a terminal status. Pending is the only state that may change;
    /// once terminal, a Mutable is never revisited.
    pub fn record(&mut self, index: usize, status: MutableStatus) {
        let mutable = &mut self.mutables[index];
        debug_assert_eq!(mutable.status, MutableStatus::Pending);
        mutable.status = status;
    }

    /// Attach the mutant-vs-original diff captured during execution.
    pub fn record_diff(&mut self, index: usize, diff: String) {
        self.mutables[index].diff = diff;
    }

    /// Carry terminal statuses forward from a previous session, matched by
    /// stable id. Mutables absent from the previous run stay Pending.
    pub fn resume_from(&mut self, previous: &MutableStore) {
        for mutable in &mut self.mutables {
            if let Some(prior) = previous
                .mutables
                .iter()
                .find(|p| p.id == mutable.id && p.status.is_terminal())
            {
                mutable.status = prior.status;
                mutable.diff = prior.diff.clone();
            }
        }
    }

    pub fn save(&self, path: &Utf8Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| SessionError::config(format!("failed to serialize state: {e}")))?;
        std::fs::write(path, json).map_err(|e| SessionError::io(path.to_owned(), e))
    }

    pub fn load(path: &Utf8Path) -> Result<Self> {
        let data =
            std::fs::read_to_string(path).map_err(|e| SessionError::io(path.to_owned(), e))?;
        serde_json::from_str(&data)
            .map_err(|e| SessionError::config(format!("failed to parse state file {path}: {e}")))
    }
}
