use camino::Utf8PathBuf;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::mutable::{Mutable, MutableStatus};
use crate::store::MutableStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StatusCounts {
    pub total: usize,
    pub killed: usize,
    pub escaped: usize,
    pub timed_out: usize,
    pub errored: usize,
    pub uncovered: usize,
    pub pending: usize,
}

impl StatusCounts {
    fn add(&mut self, status: MutableStatus) {
        self.total += 1;
        match status {
            MutableStatus::Pending => self.pending += 1,
            MutableStatus::Killed => self.killed += 1,
            MutableStatus::Escaped => self.escaped += 1,
            MutableStatus::TimedOut => self.timed_out += 1,
            MutableStatus::ExecutionError => self.errored += 1,
            MutableStatus::Uncovered => self.uncovered += 1,
        }
    }

    /// killed / (total - uncovered - errored), 0 when nothing is usable.
    pub fn score(&self) -> f64 {
        let usable = self.total - self.uncovered - self.errored;
        if usable == 0 {
            0.0
        } else {
            self.killed as f64 / usable as f64
        }
    }
}

/// An escaped mutant with everything a human needs to review it.
#[derive(Debug, Clone, Serialize)]
pub struct EscapedDetail {
    pub id: String,
    pub file: Utf8PathBuf,
    pub line: usize,
    pub column: usize,
    pub operator: String,
    pub original: String,
    pub replacement: String,
    pub diff: String,
    pub context_before: Vec<String>,
    pub context_after: Vec<String>,
}

impl EscapedDetail {
    fn from_mutable(m: &Mutable) -> Self {
        EscapedDetail {
            id: m.id.clone(),
            file: m.file_path.clone(),
            line: m.line,
            column: m.column,
            operator: m.operator.name().to_string(),
            original: m.original.clone(),
            replacement: m.replacement.clone(),
            diff: m.diff.clone(),
            context_before: m.context_before.clone(),
            context_after: m.context_after.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Summary {
    pub counts: StatusCounts,
    pub score: f64,
    pub by_operator: BTreeMap<String, StatusCounts>,
    pub by_file: BTreeMap<Utf8PathBuf, StatusCounts>,
    pub escaped: Vec<EscapedDetail>,
}

/// Fold terminal statuses into the reporting summary.
pub fn summarize(store: &MutableStore) -> Summary {
    let mut counts = StatusCounts::default();
    let mut by_operator: BTreeMap<String, StatusCounts> = BTreeMap::new();
    let mut by_file: BTreeMap<Utf8PathBuf, StatusCounts> = BTreeMap::new();
    let mut escaped = Vec::new();

    for mutable in store.all() {
        counts.add(mutable.status);
        by_operator
            .entry(mutable.operator.name().to_string())
            .or_default()
            .add(mutable.status);
        by_file
            .entry(mutable.file_path.clone())
            .or_default()
            .add(mutable.status);
        if mutable.status == MutableStatus::Escaped {
            escaped.push(EscapedDetail::from_mutable(mutable));
        }
    }

    let score = counts.score();
    Summary {
        counts,
        score,
        by_operator,
        by_file,
        escaped,
    }
}
