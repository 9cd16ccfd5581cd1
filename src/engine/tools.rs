//! Path utilities

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::fs::Metadata;
use std::path::{Component, Path, PathBuf};

/// Convert absolute path to relative path from base
pub fn path_relative_to(path: &Path, base: &Path) -> Option<PathBuf> {
    path.strip_prefix(base).ok().map(|p| p.to_path_buf())
}

/// Normalize a relative path for reports: `/` separators on every platform.
pub fn path_to_report_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

/// Relative report path for `abs_path` under `root`. When the root is itself a file the relative
/// path is empty, so fall back to the file name.
pub fn report_path_for(abs_path: &Path, root: &Path) -> String {
    let rel = path_relative_to(abs_path, root).unwrap_or_else(|| abs_path.to_path_buf());
    if rel.as_os_str().is_empty() {
        return abs_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
    }
    path_to_report_string(&rel)
}

/// True if `rel` stays inside whatever root it is joined to: no `..`, no root or prefix.
pub fn is_contained_relative(rel: &Path) -> bool {
    !rel.as_os_str().is_empty()
        && rel
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir))
}

/// Modification time from metadata, falling back to the epoch when the platform has none.
pub fn modified_at(meta: &Metadata) -> DateTime<Utc> {
    meta.modified()
        .map(DateTime::<Utc>::from)
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

/// Canonical root for display in reports. Falls back to the path as given so an inaccessible root
/// still reaches the walker, which logs it as an entry error.
pub fn display_root(path: &Path) -> String {
    path.canonicalize()
        .unwrap_or_else(|_| path.to_path_buf())
        .to_string_lossy()
        .into_owned()
}

pub fn ensure_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).with_context(|| format!("create directory {}", dir.display()))
}
