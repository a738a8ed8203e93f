//! Isolated working copies.
//!
//! Mutants are injected into a per-session copy of the project, never into the
//! caller's tree. Parallel sessions get parallel copies; isolation between
//! concurrent runs is resource partitioning, not locking.

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

use crate::error::{Result, SessionError};

const SKIP_NAMES: &[&str] = &[
    ".git",
    ".hg",
    ".svn",
    "node_modules",
    ".venv",
    "venv",
    "__pycache__",
    ".tox",
    ".mypy_cache",
    ".pytest_cache",
    ".ruff_cache",
    "target",
    "dist",
    "build",
];

const SKIP_SUFFIXES: &[&str] = &[".pyc", ".pyo"];

fn should_skip(name: &str) -> bool {
    SKIP_NAMES.iter().any(|s| *s == name) || SKIP_SUFFIXES.iter().any(|s| name.ends_with(s))
}

#[derive(Debug)]
pub struct Workspace {
    /// Root of the working copy.
    pub root: Utf8PathBuf,
    /// The copied source tree: injection target.
    pub source_root: Utf8PathBuf,
    /// The copied test tree.
    pub test_root: Utf8PathBuf,
    // Keeps a system-temp workspace alive for the session's duration.
    _temp: Option<tempfile::TempDir>,
}

/// Copy the trees containing `source_dir` and `test_dir` into a fresh
/// working copy under `cache_dir` (system temp when unset).
pub fn prepare(
    source_dir: &Utf8Path,
    test_dir: &Utf8Path,
    cache_dir: Option<&Utf8Path>,
    session_id: &str,
) -> Result<Workspace> {
    if !source_dir.is_dir() {
        return Err(SessionError::config(format!(
            "source directory not found: {source_dir}"
        )));
    }
    if !test_dir.is_dir() {
        return Err(SessionError::config(format!(
            "test directory not found: {test_dir}"
        )));
    }

    let base = common_ancestor(source_dir, test_dir);
    if base.as_str().is_empty() {
        return Err(SessionError::config(format!(
            "source and test directories share no common root: {source_dir}, {test_dir}"
        )));
    }

    let (root, temp) = match cache_dir {
        Some(dir) => {
            let root = dir.join(format!("faultline-{session_id}"));
            fs::create_dir_all(&root).map_err(|e| SessionError::io(root.clone(), e))?;
            (root, None)
        }
        None => {
            let temp = tempfile::Builder::new()
                .prefix(&format!("faultline-{session_id}-"))
                .tempdir()
                .map_err(|e| SessionError::config(format!("failed to create temp dir: {e}")))?;
            let root = Utf8PathBuf::from_path_buf(temp.path().to_path_buf())
                .map_err(|p| SessionError::config(format!("non-utf8 temp dir: {}", p.display())))?;
            (root, Some(temp))
        }
    };

    copy_dir_filtered(&base, &root).map_err(|e| SessionError::io(root.clone(), e))?;

    let rel_source = source_dir.strip_prefix(&base).unwrap_or(source_dir);
    let rel_test = test_dir.strip_prefix(&base).unwrap_or(test_dir);

    Ok(Workspace {
        source_root: root.join(rel_source),
        test_root: root.join(rel_test),
        root,
        _temp: temp,
    })
}

fn common_ancestor(a: &Utf8Path, b: &Utf8Path) -> Utf8PathBuf {
    let mut result = Utf8PathBuf::new();
    for (ca, cb) in a.components().zip(b.components()) {
        if ca == cb {
            result.push(ca);
        } else {
            break;
        }
    }
    result
}

fn copy_dir_filtered(src: &Utf8Path, dst: &Utf8Path) -> std::io::Result<()> {
    fs::create_dir_all(dst)?;
    for entry in fs::read_dir(src)? {
        let entry = entry?;
        let name = entry.file_name();
        let name_str = name.to_string_lossy();
        if should_skip(&name_str) {
            continue;
        }
        let src_path = src.join(name_str.as_ref());
        let dst_path = dst.join(name_str.as_ref());
        let ft = entry.file_type()?;
        if ft.is_dir() {
            copy_dir_filtered(&src_path, &dst_path)?;
        } else if ft.is_file() {
            fs::copy(&src_path, &dst_path)?;
        }
        // Symlinks and special files are not copied.
    }
    Ok(())
}
