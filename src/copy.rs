//! Copy pass: bring the destination in line with a comparison.

use anyhow::{Context, Result, bail};
use log::{debug, warn};
use std::fs;
use std::path::Path;

use crate::engine::tools::{ensure_dir, is_contained_relative};
use crate::pipeline::{Checkpoint, OperationContext};
use crate::{ComparisonResult, CopySummary, FileRecord, Outcome};

/// Copy one record from `src_root` to `dst_root`, creating parent directories. Returns bytes
/// written. Paths that would leave either root are rejected.
pub fn copy_record(record: &FileRecord, src_root: &Path, dst_root: &Path) -> Result<u64> {
    let rel = Path::new(&record.relative_path);
    if !is_contained_relative(rel) {
        bail!("path escapes the root");
    }
    let from = src_root.join(rel);
    let to = dst_root.join(rel);
    if let Some(parent) = to.parent() {
        ensure_dir(parent)?;
    }
    fs::copy(&from, &to).with_context(|| format!("copy {} -> {}", from.display(), to.display()))
}

/// Copy every missing and different file. Per-file failures are reported and counted, never
/// fatal; only cancellation stops the pass early.
pub fn copy_files(op: &OperationContext, comparison: &ComparisonResult) -> Outcome<CopySummary> {
    let src_root = Path::new(&comparison.source_root);
    let dst_root = Path::new(&comparison.destination_root);
    let total = comparison.pending_copies().count() as u64;
    op.state.set_total(total);
    op.hub.log(format!(
        "Copying {} files from {} to {}",
        total, comparison.source_root, comparison.destination_root
    ));

    let mut summary = CopySummary::default();
    for record in comparison.pending_copies() {
        if op.checkpoint() == Checkpoint::Canceled {
            debug!("copy: canceled after {} files", summary.copied);
            return Outcome::Canceled;
        }
        match copy_record(record, src_root, dst_root) {
            Ok(bytes) => {
                summary.copied += 1;
                summary.bytes += bytes;
            }
            Err(e) => {
                warn!("skipping {}: {:#}", record.relative_path, e);
                op.hub
                    .log(format!("ERROR: {}: {:#}", record.relative_path, e));
                summary.failed += 1;
            }
        }
        op.state.increment_processed();
        op.hub
            .progress(&op.state, format!("Copied: {}", record.relative_path));
    }

    op.hub.log(format!(
        "Copy finished: {} copied, {} failed, {} bytes",
        summary.copied, summary.failed, summary.bytes
    ));
    Outcome::Completed(summary)
}
