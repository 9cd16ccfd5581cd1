//! Drains the result queue and decides how the scan ended.

use crossbeam_channel::Receiver;
use log::debug;

use crate::{FileRecord, Outcome, ReportKind, ScanReport};

use super::context::{PipelineContext, PipelineHandles};

/// Collect records until the result queue closes (walk done and every worker exited), then:
/// canceled -> discard and report cancellation; walk error -> failure; otherwise the report.
/// Threads are always joined before returning.
pub fn collect_results(
    result_rx: Receiver<FileRecord>,
    handles: PipelineHandles,
    ctx: &PipelineContext,
    kind: ReportKind,
    root_display: String,
) -> Outcome<ScanReport> {
    let mut files = Vec::new();
    for record in result_rx.iter() {
        files.push(record);
    }
    debug!("collector: result queue closed, {} records", files.len());

    let PipelineHandles {
        walk_handle,
        worker_handles,
    } = handles;
    let mut worker_panicked = false;
    for h in worker_handles {
        worker_panicked |= h.join().is_err();
    }
    let walked = walk_handle.join();

    if ctx.op.is_canceled() {
        debug!("collector: canceled, discarding {} records", files.len());
        return Outcome::Canceled;
    }
    if worker_panicked {
        return Outcome::Failed("hash worker panicked".to_string());
    }
    let dispatched = match walked {
        Err(_) => return Outcome::Failed("walk thread panicked".to_string()),
        Ok(Err(e)) => return Outcome::Failed(format!("{:#}", e)),
        Ok(Ok(n)) => n,
    };

    let total = ctx.op.state.total();
    if dispatched != total {
        debug!(
            "collector: tree changed between passes (counted {}, dispatched {})",
            total, dispatched
        );
    }
    Outcome::Completed(ScanReport::new(kind, root_display, files))
}
