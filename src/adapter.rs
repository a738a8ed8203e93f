//! Test-runner adapter boundary.
//!
//! The coordinator only ever sees `TestRunner::run`: one suite invocation in,
//! one `ExecutionOutcome` back. Framework specifics (command line, how a
//! broken-to-load mutant shows up on stderr) live in the process adapter's
//! named presets.

use camino::Utf8PathBuf;
use std::io::Read;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

use crate::mutable::ExecutionOutcome;

#[derive(Debug, Clone)]
pub struct RunRequest {
    pub working_dir: Utf8PathBuf,
    /// Test file or filter argument, when the framework takes one.
    pub test_path: Option<Utf8PathBuf>,
    /// Raw options passed through verbatim after the preset's own arguments.
    pub extra_args: Vec<String>,
    /// Exported as FAULTLINE_BOOTSTRAP for framework hooks to load.
    pub bootstrap: Option<Utf8PathBuf>,
    pub timeout: Duration,
}

pub trait TestRunner {
    fn run(&self, request: &RunRequest) -> ExecutionOutcome;
}

/// Runs the suite as an external process with the polling kill-on-deadline
/// loop. `crash_markers` distinguish "the suite could not execute" (e.g. the
/// mutant broke loading or compilation) from an ordinary test failure.
#[derive(Debug, Clone)]
pub struct ProcessAdapter {
    pub program: String,
    pub base_args: Vec<String>,
    pub crash_markers: Vec<&'static str>,
    pub passes_test_path: bool,
}

impl ProcessAdapter {
    /// Adapter selection by name, as configured on the command line.
    pub fn by_name(name: &str) -> Option<ProcessAdapter> {
        match name {
            "pytest" => Some(ProcessAdapter {
                program: "pytest".into(),
                base_args: vec![
                    "-x".into(),
                    "-q".into(),
                    "--tb=no".into(),
                    "--no-header".into(),
                    "-p".into(),
                    "no:cacheprovider".into(),
                ],
                crash_markers: vec![
                    "SyntaxError",
                    "IndentationError",
                    "ImportError",
                    "ModuleNotFoundError",
                ],
                passes_test_path: true,
            }),
            "cargo" => Some(ProcessAdapter {
                program: "cargo".into(),
                base_args: vec!["test".into(), "--quiet".into()],
                crash_markers: vec!["error[E", "could not compile", "aborting due to"],
                passes_test_path: false,
            }),
            "npm" => Some(ProcessAdapter {
                program: "npm".into(),
                base_args: vec!["test".into(), "--silent".into(), "--".into()],
                crash_markers: vec!["SyntaxError", "ReferenceError", "Cannot find module"],
                passes_test_path: true,
            }),
            _ => None,
        }
    }

    /// An adapter invoking an arbitrary command, for frameworks without a
    /// preset. Crash detection then relies on spawn failure only.
    pub fn custom(program: impl Into<String>, base_args: Vec<String>) -> ProcessAdapter {
        ProcessAdapter {
            program: program.into(),
            base_args,
            crash_markers: vec![],
            passes_test_path: false,
        }
    }
}

impl TestRunner for ProcessAdapter {
    fn run(&self, request: &RunRequest) -> ExecutionOutcome {
        let start = Instant::now();

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.base_args);
        if self.passes_test_path {
            if let Some(test_path) = &request.test_path {
                cmd.arg(test_path);
            }
        }
        cmd.args(&request.extra_args);
        cmd.current_dir(&request.working_dir);
        if let Some(bootstrap) = &request.bootstrap {
            cmd.env("FAULTLINE_BOOTSTRAP", bootstrap);
        }
        cmd.stdout(Stdio::piped()).stderr(Stdio::piped());

        let mut child = match cmd.spawn() {
            Ok(child) => child,
            Err(_) => {
                return ExecutionOutcome {
                    passed: false,
                    crashed: true,
                    timed_out: false,
                    elapsed: start.elapsed(),
                };
            }
        };

        loop {
            match child.try_wait() {
                Ok(Some(exit_status)) => {
                    let stderr = child
                        .stderr
                        .take()
                        .and_then(|mut s| {
                            let mut buf = String::new();
                            s.read_to_string(&mut buf).ok()?;
                            Some(buf)
                        })
                        .unwrap_or_default();

                    let passed = exit_status.success();
                    let crashed = !passed
                        && self.crash_markers.iter().any(|m| stderr.contains(m));
                    return ExecutionOutcome {
                        passed,
                        crashed,
                        timed_out: false,
                        elapsed: start.elapsed(),
                    };
                }
                Ok(None) => {
                    if start.elapsed() > request.timeout {
                        // Forcible termination; wait() reaps so no orphan
                        // survives the deadline.
                        let _ = child.kill();
                        let _ = child.wait();
                        return ExecutionOutcome {
                            passed: false,
                            crashed: false,
                            timed_out: true,
                            elapsed: start.elapsed(),
                        };
                    }
                    std::thread::sleep(Duration::from_millis(10));
                }
                Err(_) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return ExecutionOutcome {
                        passed: false,
                        crashed: true,
                        timed_out: false,
                        elapsed: start.elapsed(),
                    };
                }
            }
        }
    }
}
