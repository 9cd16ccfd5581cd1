//! CLI command handlers: collect, compare, copy. Each runs one operation on a session with Ctrl+C
//! and stdin control attached, waits for it, and persists the result.

use anyhow::{Context, Result, bail};
use colored::Colorize;
use log::{debug, info, warn};
use std::io::BufRead;
use std::path::Path;
use std::thread;

use crate::broadcast::{
    JsonLinesObserver, JsonLinesWriter, LogObserver, ObserverId, ProgressBarObserver,
};
use crate::compare::summary_line;
use crate::engine::arg_parser::{Cli, Commands, CommonArgs};
use crate::engine::report_io::{load_comparison, load_report, save_comparison, save_report};
use crate::error::OperationError;
use crate::session::{OperationHandle, ScanSession};
use crate::utils::{QueueConsts, apply_file_to_opts, load_syncscan_toml, setup_logging};
use crate::{ComparisonResult, Outcome, RunOpts};

/// Defaults, then `.syncscan.toml` in the working directory, then CLI flags.
fn build_opts(common: &CommonArgs) -> RunOpts {
    let mut opts = RunOpts::default();
    if let Some(file) = load_syncscan_toml(Path::new(".")) {
        apply_file_to_opts(&file, &mut opts);
    }
    if let Some(ref p) = common.output_dir {
        opts.output_dir = p.clone();
    }
    if let Some(ref p) = common.comparison_dir {
        opts.comparison_dir = p.clone();
    }
    if let Some(n) = common.workers {
        opts.session.num_workers = Some(n);
    }
    if let Some(ms) = common.poll_ms {
        opts.session.pause_poll_interval = std::time::Duration::from_millis(ms);
    }
    if let Some(v) = common.follow_links {
        opts.session.follow_links = v;
    }
    if let Some(v) = common.json_events {
        opts.json_events = v;
    }
    if let Some(v) = common.verbose {
        opts.verbose = v;
    }
    opts
}

/// JSON-lines observer still attached to the session; detach it to write out the tail.
struct JsonFeed {
    id: ObserverId,
    writer: JsonLinesWriter,
}

impl JsonFeed {
    fn close(self, session: &ScanSession) {
        session.unregister_observer(self.id);
        session.flush_events();
        self.writer.finish();
    }
}

fn attach_observers(
    session: &ScanSession,
    opts: &RunOpts,
    desc: &'static str,
) -> Result<Option<JsonFeed>> {
    if opts.json_events {
        let (observer, writer) =
            JsonLinesObserver::spawn(std::io::stdout(), QueueConsts::SUBSCRIBER_QUEUE_CAP)
                .context("spawn json lines writer")?;
        let id = session.register_observer(Box::new(observer));
        return Ok(Some(JsonFeed { id, writer }));
    }
    session.register_observer(Box::new(LogObserver));
    session.register_observer(Box::new(ProgressBarObserver::new(desc)));
    Ok(None)
}

/// Ctrl+C cancels; stdin lines `pause` / `resume` / `cancel` (or `p` / `r` / `c`) control the
/// running operation. The stdin thread is detached and ends with the process.
fn attach_controls(session: &ScanSession) -> Result<()> {
    let on_signal = session.clone();
    ctrlc::set_handler(move || {
        on_signal.cancel();
    })
    .context("set Ctrl+C handler")?;

    let on_stdin = session.clone();
    thread::Builder::new()
        .name(format!("{}-stdin", env!("CARGO_PKG_NAME")))
        .spawn(move || {
            for line in std::io::stdin().lock().lines().map_while(|l| l.ok()) {
                match line.trim() {
                    "pause" | "p" => {
                        on_stdin.pause();
                    }
                    "resume" | "r" => {
                        on_stdin.resume();
                    }
                    "cancel" | "c" => {
                        on_stdin.cancel();
                    }
                    "" => {}
                    other => warn!("unknown command: {} (pause, resume, cancel)", other),
                }
            }
        })
        .context("spawn stdin control thread")?;
    Ok(())
}

/// Wait for the operation, drain pending events, and turn the outcome into a CLI result.
/// Canceled is not an error.
fn finish<T>(
    session: &ScanSession,
    started: Result<OperationHandle<T>, OperationError>,
) -> Result<Option<T>> {
    let handle = started?;
    let outcome = handle.wait()?;
    session.flush_events();
    match outcome {
        Outcome::Completed(v) => Ok(Some(v)),
        Outcome::Canceled => {
            warn!("Operation canceled; nothing saved.");
            Ok(None)
        }
        Outcome::Failed(msg) => bail!(msg),
    }
}

fn colored_summary(result: &ComparisonResult) -> String {
    if result.is_in_sync() {
        return summary_line(result);
    }
    format!(
        "{} | {} | {}",
        format!("Missing: {}", result.missing_in_dest.len()).green(),
        format!("Different: {}", result.different_in_dest.len()).yellow(),
        format!("Only in destination: {}", result.only_in_dest.len()).red()
    )
}

/// Run the selected subcommand.
pub fn handle_run(cli: &Cli) -> Result<()> {
    let opts = build_opts(&cli.common);
    setup_logging(opts.verbose);
    debug!("{} CONFIG:{:#?}", env!("CARGO_PKG_NAME").to_uppercase(), opts);

    let session = ScanSession::new(opts.session.clone());
    attach_controls(&session)?;

    match &cli.command {
        Commands::Collect { dir, kind } => {
            let feed = attach_observers(&session, &opts, "Collecting")?;
            let started = session.start_scan(dir.clone(), *kind);
            let result = finish(&session, started).and_then(|done| {
                if let Some(report) = done {
                    let path = save_report(&opts.output_dir, &report)?;
                    info!(
                        "Collected {} files from {}. Report: {}",
                        report.files.len(),
                        report.root_path,
                        path.display()
                    );
                }
                Ok(())
            });
            close_feed(&session, feed);
            result
        }
        Commands::Compare {
            source,
            destination,
        } => {
            let source = load_report(source)?;
            let destination = load_report(destination)?;
            let feed = attach_observers(&session, &opts, "Comparing")?;
            let started = session.start_compare(source, destination);
            let result = finish(&session, started).and_then(|done| {
                if let Some(result) = done {
                    let path = save_comparison(&opts.comparison_dir, &result)?;
                    info!("{}", colored_summary(&result));
                    info!("Comparison: {}", path.display());
                }
                Ok(())
            });
            close_feed(&session, feed);
            result
        }
        Commands::Copy { comparison } => {
            let comparison = load_comparison(comparison)?;
            let feed = attach_observers(&session, &opts, "Copying")?;
            let started = session.start_copy(comparison);
            let result = finish(&session, started).and_then(|done| {
                if let Some(summary) = done {
                    info!(
                        "Copied {} files ({} bytes), {} failed",
                        summary.copied, summary.bytes, summary.failed
                    );
                    if summary.failed > 0 {
                        bail!("{} files could not be copied", summary.failed);
                    }
                }
                Ok(())
            });
            close_feed(&session, feed);
            result
        }
    }
}

fn close_feed(session: &ScanSession, feed: Option<JsonFeed>) {
    if let Some(feed) = feed {
        feed.close(session);
    }
}
