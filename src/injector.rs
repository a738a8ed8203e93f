//! Runtime mutation injector.
//!
//! `inject` splices exactly one Mutable's replacement into its file and hands
//! back a guard. Releasing the guard restores byte-identical original content;
//! Drop restores too, so the revert runs on every exit path including panics
//! and cancellation. A failed restore is the one unrecoverable condition.

use camino::{Utf8Path, Utf8PathBuf};
use std::fs;

use crate::error::{Result, SessionError};
use crate::mutable::Mutable;

/// Splice `replacement` over the Mutable's byte range, all other bytes
/// untouched.
pub fn apply_replacement(source: &str, mutable: &Mutable) -> String {
    let mut result = String::with_capacity(source.len());
    result.push_str(&source[..mutable.start_byte]);
    result.push_str(&mutable.replacement);
    result.push_str(&source[mutable.end_byte..]);
    result
}

/// Line diff between original and mutated content, `-`/`+` lines only.
pub fn generate_diff(original: &str, mutated: &str) -> String {
    use similar::TextDiff;
    let diff = TextDiff::from_lines(original, mutated);
    let mut output = String::new();
    for change in diff.iter_all_changes() {
        match change.tag() {
            similar::ChangeTag::Delete => output.push_str(&format!("- {change}")),
            similar::ChangeTag::Insert => output.push_str(&format!("+ {change}")),
            _ => {}
        }
    }
    output
}

#[derive(Debug)]
pub struct InjectionGuard {
    path: Utf8PathBuf,
    original: String,
    mutated: String,
    released: bool,
}

impl InjectionGuard {
    pub fn diff(&self) -> String {
        generate_diff(&self.original, &self.mutated)
    }

    /// Restore the original content and verify the write landed. Consumes the
    /// guard; after this the file is byte-identical to its pre-injection
    /// state or the session is over.
    pub fn release(mut self) -> Result<()> {
        self.released = true;
        fs::write(&self.path, &self.original).map_err(|e| SessionError::RevertFailure {
            path: self.path.clone(),
            source: e,
        })?;
        let restored = fs::read_to_string(&self.path).map_err(|e| SessionError::RevertFailure {
            path: self.path.clone(),
            source: e,
        })?;
        if restored != self.original {
            return Err(SessionError::RevertFailure {
                path: self.path.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::InvalidData,
                    "restored content does not match original",
                ),
            });
        }
        Ok(())
    }
}

impl Drop for InjectionGuard {
    fn drop(&mut self) {
        if !self.released {
            // Last-resort restore on panic or cancellation. Errors cannot
            // propagate out of Drop; the coordinator's explicit release()
            // path is where failures become fatal.
            if fs::write(&self.path, &self.original).is_err() {
                eprintln!("faultline: failed to restore {} after abnormal exit", self.path);
            }
        }
    }
}

/// Apply one Mutable to its file under `workspace_root`.
///
/// Refuses to inject when the bytes at the Mutable's range no longer read as
/// its original tokens: that means the baseline was corrupted by an earlier
/// failed restore, which must not be papered over.
pub fn inject(workspace_root: &Utf8Path, mutable: &Mutable) -> Result<InjectionGuard> {
    let path = workspace_root.join(&mutable.file_path);
    let original =
        fs::read_to_string(&path).map_err(|e| SessionError::io(path.clone(), e))?;

    let at_site = original
        .get(mutable.start_byte..mutable.end_byte)
        .unwrap_or("");
    if at_site != mutable.original {
        return Err(SessionError::config(format!(
            "stale mutable {}: expected {:?} at bytes {}..{}, found {:?}",
            mutable.id, mutable.original, mutable.start_byte, mutable.end_byte, at_site
        )));
    }

    let mutated = apply_replacement(&original, mutable);
    fs::write(&path, &mutated).map_err(|e| SessionError::io(path.clone(), e))?;

    Ok(InjectionGuard {
        path,
        original,
        mutated,
        released: false,
    })
}
