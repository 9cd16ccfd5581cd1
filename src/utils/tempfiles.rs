use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

const FALLBACK_NAME: &str = concat!(env!("CARGO_PKG_NAME"), "_output");

/// Temp path next to `final_path`: `<name>.tmp`.
pub fn temp_path_for(final_path: &Path) -> PathBuf {
    let name = final_path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| FALLBACK_NAME.to_string());
    final_path
        .parent()
        .unwrap_or(Path::new("."))
        .join(format!("{name}.tmp"))
}

/// Write `bytes` to `final_path` through a temp file and rename, so readers never see a partial file.
/// A stale temp from an earlier crash is overwritten.
pub fn write_atomically(final_path: &Path, bytes: &[u8]) -> Result<()> {
    let temp_path = temp_path_for(final_path);
    fs::write(&temp_path, bytes)
        .with_context(|| format!("write temp file {}", temp_path.display()))?;
    rename_temp_to_final(&temp_path, final_path)
}

pub fn rename_temp_to_final(temp_path: &Path, final_path: &Path) -> Result<()> {
    fs::rename(temp_path, final_path).with_context(|| {
        format!(
            "atomic rename temp file to final path ({} -> {})",
            temp_path.display(),
            final_path.display()
        )
    })
}
