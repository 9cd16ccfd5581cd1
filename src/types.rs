//! Public data types: file records, reports, comparison results, and CLI run options.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::utils::config::{PackagePaths, SessionConfig};

/// Metadata and content hash for one file, relative to the scanned root.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Path relative to the root, `/`-separated.
    #[serde(rename = "path")]
    pub relative_path: String,
    #[serde(rename = "size")]
    pub size_bytes: u64,
    #[serde(rename = "mod_time")]
    pub modified_at: DateTime<Utc>,
    /// Blake3 digest of the full content, lowercase hex.
    #[serde(rename = "hash")]
    pub content_hash: String,
}

/// Which side of a sync a report describes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Source,
    Destination,
}

impl ReportKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportKind::Source => "source",
            ReportKind::Destination => "destination",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of a completed scan. `files` is in worker completion order; do not rely on it.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScanReport {
    #[serde(rename = "type")]
    pub kind: ReportKind,
    pub root_path: String,
    pub files: Vec<FileRecord>,
    #[serde(rename = "timestamp")]
    pub generated_at: DateTime<Utc>,
}

impl ScanReport {
    pub fn new(kind: ReportKind, root_path: String, files: Vec<FileRecord>) -> Self {
        Self {
            kind,
            root_path,
            files,
            generated_at: Utc::now(),
        }
    }

    /// `<kind>_<YYYYmmdd_HHMMSS>`: file stem used when persisting and as a label in comparisons.
    pub fn label(&self) -> String {
        format!("{}_{}", self.kind, self.generated_at.format("%Y%m%d_%H%M%S"))
    }
}

/// Differences between a source and a destination report.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub source_report: String,
    pub destination_report: String,
    pub source_root: String,
    pub destination_root: String,
    /// In source, absent from destination.
    pub missing_in_dest: Vec<FileRecord>,
    /// Same path on both sides, size or hash differs. Records are the source side.
    pub different_in_dest: Vec<FileRecord>,
    /// In destination only.
    pub only_in_dest: Vec<FileRecord>,
    #[serde(rename = "timestamp")]
    pub generated_at: DateTime<Utc>,
}

impl ComparisonResult {
    pub fn label(&self) -> String {
        format!("comparison_{}", self.generated_at.format("%Y%m%d_%H%M%S"))
    }

    /// Files a copy pass would transfer (missing, then different).
    pub fn pending_copies(&self) -> impl Iterator<Item = &FileRecord> {
        self.missing_in_dest.iter().chain(self.different_in_dest.iter())
    }

    pub fn is_in_sync(&self) -> bool {
        self.missing_in_dest.is_empty()
            && self.different_in_dest.is_empty()
            && self.only_in_dest.is_empty()
    }
}

/// Totals from a copy pass.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CopySummary {
    pub copied: u64,
    pub failed: u64,
    pub bytes: u64,
}

/// How an operation ended. Cancellation is an outcome, not an error.
#[derive(Debug)]
pub enum Outcome<T> {
    Completed(T),
    Canceled,
    Failed(String),
}

impl<T> Outcome<T> {
    pub fn is_completed(&self) -> bool {
        matches!(self, Outcome::Completed(_))
    }

    pub fn is_canceled(&self) -> bool {
        matches!(self, Outcome::Canceled)
    }

    pub fn into_completed(self) -> Option<T> {
        match self {
            Outcome::Completed(v) => Some(v),
            _ => None,
        }
    }
}

/// Full options for the CLI host. Library callers build a [`SessionConfig`] directly.
#[derive(Clone, Debug)]
pub struct RunOpts {
    /// Directory for scan reports.
    pub output_dir: PathBuf,
    /// Directory for comparison results.
    pub comparison_dir: PathBuf,
    /// Debug logging.
    pub verbose: bool,
    /// Print every event as a JSON line on stdout instead of the progress bar.
    pub json_events: bool,
    pub session: SessionConfig,
}

impl Default for RunOpts {
    fn default() -> Self {
        let paths = PackagePaths::get();
        Self {
            output_dir: PathBuf::from(paths.reports_dir()),
            comparison_dir: PathBuf::from(paths.comparisons_dir()),
            verbose: false,
            json_events: false,
            session: SessionConfig::default(),
        }
    }
}
