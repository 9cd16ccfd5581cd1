use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::ReportKind;

/// Parallel file inventory, report comparison, and sync copy with pause / resume / cancel.
#[derive(Clone, Parser)]
#[command(name = "syncscan")]
#[command(about = "Scan a directory into a hashed report, compare two reports, copy the differences.")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Clone, Subcommand)]
pub enum Commands {
    /// Scan DIR and save a report.
    Collect {
        #[arg(value_name = "DIR")]
        dir: PathBuf,

        /// Which side of the sync this report describes.
        #[arg(long, short = 'k', value_enum, default_value_t = ReportKind::Source)]
        kind: ReportKind,
    },
    /// Compare a source report with a destination report and save the result.
    Compare {
        #[arg(value_name = "SOURCE_REPORT")]
        source: PathBuf,
        #[arg(value_name = "DEST_REPORT")]
        destination: PathBuf,
    },
    /// Copy missing and different files listed in a comparison result.
    Copy {
        #[arg(value_name = "COMPARISON")]
        comparison: PathBuf,
    },
}

/// Flags shared by every subcommand. Unset flags fall back to `.syncscan.toml`, then defaults.
#[derive(Clone, Args)]
pub struct CommonArgs {
    /// Directory for scan reports. Default: collected_data.
    #[arg(long, short = 'o', global = true)]
    pub output_dir: Option<PathBuf>,

    /// Directory for comparison results. Default: comparison_results.
    #[arg(long, global = true)]
    pub comparison_dir: Option<PathBuf>,

    /// Worker threads. Default: one per core, capped by the open file limit.
    #[arg(long, short = 'w', global = true)]
    pub workers: Option<usize>,

    /// Pause poll interval in milliseconds.
    #[arg(long, global = true)]
    pub poll_ms: Option<u64>,

    /// Follow symbolic links.
    #[arg(long, short = 'f', global = true, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub follow_links: Option<bool>,

    /// Print every event as a JSON line on stdout instead of the progress bar.
    #[arg(long, short = 'j', global = true, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub json_events: Option<bool>,

    /// Verbose output.
    #[arg(long, short = 'v', global = true, num_args = 0..=1, default_missing_value = "true", value_parser = clap::value_parser!(bool))]
    pub verbose: Option<bool>,
}
