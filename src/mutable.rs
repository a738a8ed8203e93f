use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::operators::OperatorKind;

/// Terminal (and initial) states of one candidate mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutableStatus {
    Pending,
    Killed,
    Escaped,
    TimedOut,
    ExecutionError,
    Uncovered,
}

impl MutableStatus {
    pub fn is_terminal(&self) -> bool {
        *self != MutableStatus::Pending
    }
}

/// One candidate fault injection: where, what, and (after execution) how the
/// suite responded. Serializable so a session can be paused and resumed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mutable {
    /// Stable id derived from file, byte offset, and operator kind.
    pub id: String,
    /// Path relative to the scanned source root.
    pub file_path: Utf8PathBuf,
    pub line: usize,
    pub column: usize,
    /// Indices into the file's token stream as of scan time; start < end.
    pub token_start: usize,
    pub token_end: usize,
    /// Byte range the replacement text splices over.
    pub start_byte: usize,
    pub end_byte: usize,
    pub operator: OperatorKind,
    pub original: String,
    pub replacement: String,
    pub status: MutableStatus,
    /// Line diff against the original file, captured when the mutant escapes.
    #[serde(default)]
    pub diff: String,
    #[serde(default)]
    pub context_before: Vec<String>,
    #[serde(default)]
    pub context_after: Vec<String>,
}

impl Mutable {
    pub fn stable_id(file_path: &str, start_byte: usize, operator: OperatorKind) -> String {
        format!("{}:{}:{}", file_path, start_byte, operator.name())
    }

    pub fn describe(&self) -> String {
        format!(
            "{}:{} [{}] {} -> {}",
            self.file_path,
            self.line,
            self.operator.name(),
            self.original,
            if self.replacement.is_empty() {
                "<removed>"
            } else {
                self.replacement.as_str()
            },
        )
    }
}

/// What one test-suite invocation reported, folded into a status and dropped.
#[derive(Debug, Clone)]
pub struct ExecutionOutcome {
    pub passed: bool,
    /// The suite itself failed to execute (spawn failure, interpreter or
    /// compiler rejecting the mutant) as opposed to tests failing.
    pub crashed: bool,
    pub timed_out: bool,
    pub elapsed: Duration,
}

impl ExecutionOutcome {
    /// Classification rule from the coordinator's state machine. Timeout wins
    /// over crash wins over pass/fail.
    pub fn classify(&self) -> MutableStatus {
        if self.timed_out {
            MutableStatus::TimedOut
        } else if self.crashed {
            MutableStatus::ExecutionError
        } else if self.passed {
            MutableStatus::Escaped
        } else {
            MutableStatus::Killed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(passed: bool, crashed: bool, timed_out: bool) -> ExecutionOutcome {
        ExecutionOutcome {
            passed,
            crashed,
            timed_out,
            elapsed: Duration::from_millis(5),
        }
    }

    #[test]
    fn classify_orders_timeout_over_crash() {
        assert_eq!(outcome(false, true, true).classify(), MutableStatus::TimedOut);
        assert_eq!(
            outcome(false, true, false).classify(),
            MutableStatus::ExecutionError
        );
        assert_eq!(outcome(true, false, false).classify(), MutableStatus::Escaped);
        assert_eq!(outcome(false, false, false).classify(), MutableStatus::Killed);
    }

    #[test]
    fn stable_id_is_deterministic() {
        let a = Mutable::stable_id("src/app.py", 42, OperatorKind::ArithmeticSwap);
        let b = Mutable::stable_id("src/app.py", 42, OperatorKind::ArithmeticSwap);
        assert_eq!(a, b);
        assert_eq!(a, "src/app.py:42:arith_swap");
    }
}
