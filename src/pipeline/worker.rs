use anyhow::{Context, Result};
use crossbeam_channel::{Receiver, Sender};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};

use crate::FileRecord;
use crate::engine::hashing::hash_file;
use crate::engine::tools::{modified_at, report_path_for};

use super::checkpoint::Checkpoint;
use super::context::PipelineContext;

/// Single hash worker: take paths from job_rx, checkpoint, stat + hash, send the record on
/// result_tx, bump the processed counter, publish progress. Failures on one file are reported
/// and skipped. Exits when the job queue closes or the operation is canceled.
fn hash_worker_loop(job_rx: Receiver<PathBuf>, result_tx: Sender<FileRecord>, ctx: PipelineContext) {
    let op = &ctx.op;
    for abs_path in job_rx.iter() {
        if op.checkpoint() == Checkpoint::Canceled {
            break;
        }
        let record = match path_to_record(&abs_path, &ctx.root) {
            Ok(record) => record,
            Err(e) => {
                warn!("skipping {}: {:#}", abs_path.display(), e);
                op.hub
                    .log(format!("ERROR: {}: {:#}", abs_path.display(), e));
                continue;
            }
        };
        let rel = record.relative_path.clone();
        if result_tx.send(record).is_err() {
            debug!("worker: result queue closed");
            break;
        }
        op.state.increment_processed();
        op.hub.progress(&op.state, format!("Collected: {rel}"));
    }
    drop(result_tx);
}

/// Spawn `num_workers` hash workers. Caller must drop its own `result_tx` afterwards so the result
/// queue closes once the last worker exits.
pub fn spawn_hash_workers(
    job_rx: &Receiver<PathBuf>,
    result_tx: &Sender<FileRecord>,
    ctx: &PipelineContext,
    num_workers: usize,
) -> Vec<JoinHandle<()>> {
    (0..num_workers)
        .map(|_| {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();
            let ctx = ctx.clone();
            thread::spawn(move || hash_worker_loop(job_rx, result_tx, ctx))
        })
        .collect()
}

/// Stat and hash one file into a [`FileRecord`] relative to `root`.
pub fn path_to_record(abs_path: &Path, root: &Path) -> Result<FileRecord> {
    let meta = std::fs::metadata(abs_path).context("stat")?;
    // FIFOs and sockets would block the read forever.
    if !meta.is_file() {
        anyhow::bail!("not a regular file");
    }
    let size = meta.len();
    let content_hash = hash_file(abs_path, size).context("hash")?;
    Ok(FileRecord {
        relative_path: report_path_for(abs_path, root),
        size_bytes: size,
        modified_at: modified_at(&meta),
        content_hash,
    })
}
