use camino::{Utf8Path, Utf8PathBuf};
use clap::{Parser, Subcommand};
use std::process;
use std::time::Duration;

use faultline::adapter::ProcessAdapter;
use faultline::coordinator::{CancelToken, Coordinator, SessionConfig};
use faultline::coverage::CoverageMap;
use faultline::error::SessionError;
use faultline::scanner::{self, ExclusionRules};
use faultline::store::MutableStore;
use faultline::{aggregator, output, workspace};

#[derive(Parser)]
#[command(name = "faultline", version, about = "Token-level mutation testing")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scan a source tree and execute every mutant against the test suite
    Run {
        /// Directory containing the sources to mutate
        #[arg(long)]
        srcdir: Utf8PathBuf,
        /// Directory containing the test suite
        #[arg(long)]
        testdir: Utf8PathBuf,
        /// Test runner adapter: pytest, cargo, or npm
        #[arg(long, default_value = "pytest")]
        adapter: String,
        /// Hard wall-clock timeout per test run, in seconds
        #[arg(long, default_value = "30")]
        timeout: u64,
        /// Working/cache directory for the isolated copy (default: system temp)
        #[arg(long)]
        cache_dir: Option<Utf8PathBuf>,
        /// Bootstrap file exported to the adapter
        #[arg(long)]
        bootstrap: Option<Utf8PathBuf>,
        /// Coverage map (JSON {file: [lines]}); uncovered sites skip execution
        #[arg(long)]
        coverage: Option<Utf8PathBuf>,
        /// State file for pause/resume
        #[arg(long, default_value = ".faultline-state.json")]
        state: Utf8PathBuf,
        /// Resume: carry terminal statuses over from the state file
        #[arg(long)]
        resume: bool,
        /// File name or relative path to exclude from scanning (repeatable)
        #[arg(long = "exclude")]
        excludes: Vec<String>,
        /// Lines containing this marker are never mutated
        #[arg(long)]
        exclude_marker: Option<String>,
        /// Session ID for workspace isolation (default: auto-generated)
        #[arg(long)]
        session: Option<String>,
        /// Output JSON instead of human-readable text
        #[arg(long)]
        json: bool,
        /// Exit code only, no output
        #[arg(short, long)]
        quiet: bool,
        /// Extra options passed through verbatim to the adapter
        #[arg(last = true)]
        options: Vec<String>,
    },
    /// Summary of the last (or an interrupted) session
    Status {
        /// State file written by `run`
        #[arg(long, default_value = ".faultline-state.json")]
        state: Utf8PathBuf,
        /// Output JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() {
    let cli = Cli::parse();

    let exit_code = match cli.command {
        Commands::Run {
            srcdir,
            testdir,
            adapter,
            timeout,
            cache_dir,
            bootstrap,
            coverage,
            state,
            resume,
            excludes,
            exclude_marker,
            session,
            json,
            quiet,
            options,
        } => cmd_run(RunArgs {
            srcdir,
            testdir,
            adapter,
            timeout,
            cache_dir,
            bootstrap,
            coverage,
            state,
            resume,
            excludes,
            exclude_marker,
            session,
            json,
            quiet,
            options,
        }),
        Commands::Status { state, json } => cmd_status(&state, json),
    };

    process::exit(exit_code);
}

struct RunArgs {
    srcdir: Utf8PathBuf,
    testdir: Utf8PathBuf,
    adapter: String,
    timeout: u64,
    cache_dir: Option<Utf8PathBuf>,
    bootstrap: Option<Utf8PathBuf>,
    coverage: Option<Utf8PathBuf>,
    state: Utf8PathBuf,
    resume: bool,
    excludes: Vec<String>,
    exclude_marker: Option<String>,
    session: Option<String>,
    json: bool,
    quiet: bool,
    options: Vec<String>,
}

fn generate_session_id() -> String {
    format!("{:08x}", fastrand::u32(..))
}

fn absolute(path: &Utf8Path) -> Utf8PathBuf {
    if path.is_absolute() {
        return path.to_owned();
    }
    match std::env::current_dir()
        .ok()
        .and_then(|d| Utf8PathBuf::from_path_buf(d).ok())
    {
        Some(cwd) => cwd.join(path),
        None => path.to_owned(),
    }
}

fn exit_code_for(err: &SessionError) -> i32 {
    match err {
        SessionError::Configuration { .. } => 2,
        _ => 3,
    }
}

fn cmd_run(args: RunArgs) -> i32 {
    let srcdir = absolute(&args.srcdir);
    let testdir = absolute(&args.testdir);

    let Some(adapter) = ProcessAdapter::by_name(&args.adapter) else {
        output::print_error(&format!(
            "Unknown adapter '{}'. Supported: pytest, cargo, npm",
            args.adapter
        ));
        return 2;
    };

    if let Some(bootstrap) = &args.bootstrap {
        if std::fs::read(bootstrap).is_err() {
            output::print_error(&format!("Bootstrap file not readable: {bootstrap}"));
            return 2;
        }
    }

    let coverage_map = match &args.coverage {
        Some(path) => match CoverageMap::load(path) {
            Ok(map) => Some(map),
            Err(e) => {
                output::print_error(&e.to_string());
                return exit_code_for(&e);
            }
        },
        None => None,
    };

    let rules = ExclusionRules {
        files: args.excludes.clone(),
        line_marker: args.exclude_marker.clone(),
    };

    let report = match scanner::scan(&srcdir, &rules) {
        Ok(report) => report,
        Err(e) => {
            output::print_error(&e.to_string());
            return exit_code_for(&e);
        }
    };
    if !args.quiet && !report.warnings.is_empty() {
        output::print_scan_warnings(&report.warnings);
    }

    let mut store = MutableStore::new(report.mutables);
    if store.is_empty() {
        if !args.quiet {
            if args.json {
                let summary = aggregator::summarize(&store);
                println!("{}", serde_json::to_string(&summary).expect("summary is serializable"));
            } else {
                output::print_success("No mutable code found.");
            }
        }
        return 0;
    }

    if args.resume {
        match MutableStore::load(&args.state) {
            Ok(previous) => store.resume_from(&previous),
            Err(e) => {
                output::print_error(&format!("Cannot resume: {e}"));
                return 2;
            }
        }
    }

    let session_id = args.session.unwrap_or_else(generate_session_id);
    let ws = match workspace::prepare(&srcdir, &testdir, args.cache_dir.as_deref(), &session_id) {
        Ok(ws) => ws,
        Err(e) => {
            output::print_error(&e.to_string());
            return exit_code_for(&e);
        }
    };

    let config = SessionConfig {
        workspace_root: ws.root.clone(),
        source_root: ws.source_root.clone(),
        test_path: Some(ws.test_root.clone()),
        extra_args: args.options,
        bootstrap: args.bootstrap.map(|b| absolute(&b)),
        timeout: Duration::from_secs(args.timeout),
        state_path: Some(absolute(&args.state)),
    };

    let mut coordinator = Coordinator::new(adapter, config);
    if let Some(map) = coverage_map {
        coordinator = coordinator.with_coverage(map);
    }

    let cancel = CancelToken::new();
    if let Err(e) = coordinator.execute(&mut store, &cancel) {
        output::print_error(&e.to_string());
        return exit_code_for(&e);
    }

    let summary = aggregator::summarize(&store);
    if args.quiet {
        return 0;
    }
    if args.json {
        println!("{}", serde_json::to_string(&summary).expect("summary is serializable"));
    } else {
        output::print_summary(&summary);
    }
    // Score is informational; a completed session always exits 0.
    0
}

fn cmd_status(state: &Utf8Path, json: bool) -> i32 {
    match MutableStore::load(state) {
        Ok(store) => {
            let summary = aggregator::summarize(&store);
            if json {
                println!("{}", serde_json::to_string(&summary).expect("summary is serializable"));
            } else {
                output::print_status(&summary);
            }
            0
        }
        Err(_) => {
            output::print_error("No previous session found. Run `faultline run` first.");
            2
        }
    }
}
