//! Mutant execution coordinator.
//!
//! Per Mutable: coverage gate, inject, run under deadline, classify, revert,
//! record. The baseline run must pass before any mutant executes, and exactly
//! one Mutable is injected at any instant because the coordinator owns the
//! session's single workspace.

use camino::Utf8PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crate::adapter::{RunRequest, TestRunner};
use crate::coverage::CoverageMap;
use crate::error::{Result, SessionError};
use crate::injector;
use crate::mutable::MutableStatus;
use crate::store::MutableStore;

/// Cooperative cancellation. Checked between mutants only, so the in-flight
/// mutant's revert always completes before shutdown.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Working directory the test process runs in.
    pub workspace_root: Utf8PathBuf,
    /// Root of the copied source tree; Mutable paths resolve against this.
    pub source_root: Utf8PathBuf,
    /// Test file or filter handed to the adapter.
    pub test_path: Option<Utf8PathBuf>,
    /// Raw adapter options, passed through verbatim.
    pub extra_args: Vec<String>,
    pub bootstrap: Option<Utf8PathBuf>,
    pub timeout: Duration,
    /// When set, the store is persisted after every recorded outcome so an
    /// interrupted session can resume.
    pub state_path: Option<Utf8PathBuf>,
}

pub struct Coordinator<R: TestRunner> {
    adapter: R,
    config: SessionConfig,
    coverage: Option<CoverageMap>,
}

impl<R: TestRunner> Coordinator<R> {
    pub fn new(adapter: R, config: SessionConfig) -> Self {
        Coordinator {
            adapter,
            config,
            coverage: None,
        }
    }

    pub fn with_coverage(mut self, coverage: CoverageMap) -> Self {
        self.coverage = Some(coverage);
        self
    }

    fn request(&self) -> RunRequest {
        RunRequest {
            working_dir: self.config.workspace_root.clone(),
            test_path: self.config.test_path.clone(),
            extra_args: self.config.extra_args.clone(),
            bootstrap: self.config.bootstrap.clone(),
            timeout: self.config.timeout,
        }
    }

    /// Run the suite against unmutated sources. Any non-pass is fatal: mutant
    /// classifications against a failing baseline would be meaningless.
    pub fn run_baseline(&self) -> Result<Duration> {
        let outcome = self.adapter.run(&self.request());
        if outcome.timed_out {
            return Err(SessionError::BaselineFailure {
                output: format!(
                    "suite exceeded the {}s deadline on unmutated sources",
                    self.config.timeout.as_secs()
                ),
            });
        }
        if outcome.crashed || !outcome.passed {
            return Err(SessionError::BaselineFailure {
                output: "suite did not pass on unmutated sources".into(),
            });
        }
        Ok(outcome.elapsed)
    }

    /// Baseline, then every Pending Mutable in store order. Statuses are
    /// written into the store; the caller folds them with the aggregator.
    pub fn execute(&self, store: &mut MutableStore, cancel: &CancelToken) -> Result<()> {
        self.run_baseline()?;

        for index in store.pending_indices() {
            if cancel.is_cancelled() {
                break;
            }

            let mutable = store.get(index).clone();

            if let Some(coverage) = &self.coverage {
                if !coverage.covers(&mutable.file_path, mutable.line) {
                    store.record(index, MutableStatus::Uncovered);
                    self.persist(store)?;
                    continue;
                }
            }

            let guard = injector::inject(&self.config.source_root, &mutable)?;
            let outcome = self.adapter.run(&self.request());
            let diff = guard.diff();
            // Revert is unconditional and its failure ends the session.
            guard.release()?;

            let status = outcome.classify();
            store.record(index, status);
            if status == MutableStatus::Escaped {
                store.record_diff(index, diff);
            }
            self.persist(store)?;
        }

        Ok(())
    }

    fn persist(&self, store: &MutableStore) -> Result<()> {
        match &self.config.state_path {
            Some(path) => store.save(path),
            None => Ok(()),
        }
    }
}
