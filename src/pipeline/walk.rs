//! Two-pass walk: a count pass for the progress total and a stream pass that feeds the job queue.

use anyhow::Result;
use crossbeam_channel::{Sender, select};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use std::thread::{self, JoinHandle};
use walkdir::WalkDir;

use crate::state::CancelToken;

use super::context::PipelineContext;

fn walker(root: &Path, follow_links: bool) -> walkdir::IntoIter {
    WalkDir::new(root).follow_links(follow_links).into_iter()
}

/// Count non-directory entries under `root`. Traversal errors are skipped, so the total is an
/// estimate. Stops early (returning the partial count) once `token` fires.
pub fn count_files(root: &Path, follow_links: bool, token: &CancelToken) -> u64 {
    let mut count = 0_u64;
    for entry in walker(root, follow_links).filter_map(|r| r.ok()) {
        if token.is_canceled() {
            break;
        }
        if !entry.file_type().is_dir() {
            count += 1;
        }
    }
    count
}

/// Only a directory below the root that cannot be read ends the pass. The root itself, a
/// symlink loop, or an entry that cannot be stat'ed (a dangling link when following links) is a
/// per-entry failure.
fn is_fatal_walk_error(err: &walkdir::Error) -> bool {
    if err.depth() == 0 || err.loop_ancestor().is_some() {
        return false;
    }
    err.path().is_some_and(|p| p.is_dir())
}

fn report_entry_error(ctx: &PipelineContext, err: &walkdir::Error) {
    let path = err.path().unwrap_or(&ctx.root).display().to_string();
    let reason = match err.io_error() {
        Some(io) => io.to_string(),
        None => err.to_string(),
    };
    warn!("skipping {}: {}", path, reason);
    ctx.op.hub.log(format!("ERROR: {}: {}", path, reason));
}

/// Push every non-directory path under `ctx.root` into `job_tx`. A push blocks until a worker
/// takes it; cancellation abandons the push and ends the pass without error. An unreadable
/// directory below the root aborts the pass and is returned; other walk errors are reported and
/// skipped. Dropping `job_tx` on return closes the job queue.
pub fn stream_paths(job_tx: Sender<PathBuf>, ctx: &PipelineContext) -> Result<u64> {
    let token = &ctx.op.token;
    let mut dispatched = 0_u64;
    for result in walker(&ctx.root, ctx.follow_links) {
        if token.is_canceled() {
            debug!("walk: canceled after {} paths", dispatched);
            break;
        }
        let entry = match result {
            Ok(entry) => entry,
            Err(e) if is_fatal_walk_error(&e) => return Err(anyhow::Error::new(e).context("walk")),
            Err(e) => {
                report_entry_error(ctx, &e);
                continue;
            }
        };
        if entry.file_type().is_dir() {
            continue;
        }
        select! {
            send(job_tx, entry.into_path()) -> res => {
                if res.is_err() {
                    debug!("walk: job queue closed, stopping after {} paths", dispatched);
                    break;
                }
                dispatched += 1;
            }
            recv(token.signal()) -> _ => {
                debug!("walk: canceled after {} paths", dispatched);
                break;
            }
        }
    }
    drop(job_tx);
    Ok(dispatched)
}

pub fn spawn_walk_thread(job_tx: Sender<PathBuf>, ctx: PipelineContext) -> JoinHandle<Result<u64>> {
    thread::spawn(move || stream_paths(job_tx, &ctx))
}
