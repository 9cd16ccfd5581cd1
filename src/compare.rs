//! Report comparison: what the destination is missing, what differs, and what exists only there.

use chrono::Utc;
use std::collections::HashMap;

use crate::pipeline::{Checkpoint, OperationContext};
use crate::utils::config::ProgressConsts;
use crate::{ComparisonResult, FileRecord, Outcome, ScanReport};

/// Index a report's files by relative path. A later duplicate replaces an earlier one.
fn index_by_path(files: &[FileRecord]) -> HashMap<&str, &FileRecord> {
    files
        .iter()
        .map(|f| (f.relative_path.as_str(), f))
        .collect()
}

fn differs(src: &FileRecord, dst: &FileRecord) -> bool {
    src.size_bytes != dst.size_bytes || src.content_hash != dst.content_hash
}

/// Count one item and publish progress every batch (and on the last item).
fn tick(op: &OperationContext, total: u64) {
    let n = op.state.increment_processed();
    if n % ProgressConsts::PROGRESS_UPDATE_BATCH_SIZE == 0 || n == total {
        op.hub.progress(&op.state, format!("Compared {} of {}", n, total));
    }
}

/// Walk both reports under the operation's pause/cancel checkpoint. Every source file and every
/// destination file counts as one unit of progress.
pub fn compare_reports(
    op: &OperationContext,
    source: &ScanReport,
    destination: &ScanReport,
) -> Outcome<ComparisonResult> {
    let total = (source.files.len() + destination.files.len()) as u64;
    op.state.set_total(total);
    op.hub.log(format!(
        "Comparing {} ({} files) with {} ({} files)",
        source.root_path,
        source.files.len(),
        destination.root_path,
        destination.files.len()
    ));

    let src_map = index_by_path(&source.files);
    let dst_map = index_by_path(&destination.files);

    let mut missing_in_dest = Vec::new();
    let mut different_in_dest = Vec::new();
    let mut only_in_dest = Vec::new();

    for file in &source.files {
        if op.checkpoint() == Checkpoint::Canceled {
            return Outcome::Canceled;
        }
        match dst_map.get(file.relative_path.as_str()) {
            None => missing_in_dest.push(file.clone()),
            Some(dst) if differs(file, dst) => different_in_dest.push(file.clone()),
            Some(_) => {}
        }
        tick(op, total);
    }
    for file in &destination.files {
        if op.checkpoint() == Checkpoint::Canceled {
            return Outcome::Canceled;
        }
        if !src_map.contains_key(file.relative_path.as_str()) {
            only_in_dest.push(file.clone());
        }
        tick(op, total);
    }

    let result = ComparisonResult {
        source_report: source.label(),
        destination_report: destination.label(),
        source_root: source.root_path.clone(),
        destination_root: destination.root_path.clone(),
        missing_in_dest,
        different_in_dest,
        only_in_dest,
        generated_at: Utc::now(),
    };
    op.hub.log(summary_line(&result));
    Outcome::Completed(result)
}

/// One-line summary of a comparison.
pub fn summary_line(result: &ComparisonResult) -> String {
    if result.is_in_sync() {
        return "No differences found.".to_string();
    }
    format!(
        "Missing: {} | Different: {} | Only in destination: {}",
        result.missing_in_dest.len(),
        result.different_in_dest.len(),
        result.only_in_dest.len()
    )
}
