use log::debug;
use std::path::Path;

use crate::engine::tools::display_root;
use crate::{Outcome, ReportKind, ScanReport};

use super::collector::collect_results;
use super::context::{OperationContext, PipelineContext, PipelineHandles, create_pipeline_channels};
use super::walk::{count_files, spawn_walk_thread};
use super::worker::spawn_hash_workers;

/// Coordinator for one scan: count pass, then walk thread -> job queue -> hash workers ->
/// result queue -> collector, all under `op`'s cancel token. Runs on the caller's thread.
pub fn run_scan(op: &OperationContext, root: &Path, kind: ReportKind) -> Outcome<ScanReport> {
    let root_display = display_root(root);
    let ctx = PipelineContext::new(op, root);

    op.hub.log(format!("Counting files in: {}", root_display));
    let total = count_files(&ctx.root, ctx.follow_links, &op.token);
    if op.is_canceled() {
        return Outcome::Canceled;
    }
    op.state.set_total(total);
    op.hub.log(format!("Total files found: {}", total));
    op.hub.progress(&op.state, "Starting collection...");

    let channels = create_pipeline_channels(&op.config);
    let num_workers = op.config.effective_workers();
    debug!("scan: {} workers, total estimate {}", num_workers, total);

    let walk_handle = spawn_walk_thread(channels.job_tx, ctx.clone());
    let worker_handles =
        spawn_hash_workers(&channels.job_rx, &channels.result_tx, &ctx, num_workers);

    // Dropping the last sender / receiver copies here lets the queues close when the walk and
    // the workers are done.
    drop(channels.job_rx);
    drop(channels.result_tx);

    collect_results(
        channels.result_rx,
        PipelineHandles {
            walk_handle,
            worker_handles,
        },
        &ctx,
        kind,
        root_display,
    )
}
