//! Persist reports and comparisons as pretty JSON: `<dir>/<label>.json`, written via temp + rename.

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};

use crate::engine::tools::ensure_dir;
use crate::utils::tempfiles::write_atomically;
use crate::{ComparisonResult, ScanReport};

fn save_json<T: Serialize>(dir: &Path, label: &str, value: &T) -> Result<PathBuf> {
    ensure_dir(dir)?;
    let path = dir.join(format!("{}.json", label));
    let bytes = serde_json::to_vec_pretty(value).context("serialize")?;
    write_atomically(&path, &bytes)?;
    log::debug!("saved {}", path.display());
    Ok(path)
}

fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    serde_json::from_slice(&bytes).with_context(|| format!("parse {}", path.display()))
}

/// Write `report` to `<dir>/<kind>_<YYYYmmdd_HHMMSS>.json` and return the path.
pub fn save_report(dir: &Path, report: &ScanReport) -> Result<PathBuf> {
    save_json(dir, &report.label(), report)
}

pub fn load_report(path: &Path) -> Result<ScanReport> {
    load_json(path)
}

/// Write `result` to `<dir>/comparison_<YYYYmmdd_HHMMSS>.json` and return the path.
pub fn save_comparison(dir: &Path, result: &ComparisonResult) -> Result<PathBuf> {
    save_json(dir, &result.label(), result)
}

pub fn load_comparison(path: &Path) -> Result<ComparisonResult> {
    load_json(path)
}
