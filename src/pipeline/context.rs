//! Operation context and scan channels: shared data passed into the coordinator, walk, and
//! worker threads.

use crossbeam_channel::{Receiver, Sender, bounded};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

use crate::FileRecord;
use crate::broadcast::BroadcastHub;
use crate::state::{CancelToken, OperationState};
use crate::utils::config::SessionConfig;

use super::checkpoint::{Checkpoint, checkpoint};

/// Everything one operation needs: the session's state and hub, this operation's cancel token,
/// and the session settings. Cheap to clone; every thread gets its own copy.
#[derive(Clone)]
pub struct OperationContext {
    pub state: Arc<OperationState>,
    pub hub: BroadcastHub,
    pub token: CancelToken,
    pub config: Arc<SessionConfig>,
}

impl OperationContext {
    pub fn poll_interval(&self) -> Duration {
        self.config.pause_poll_interval
    }

    /// Pause/cancel checkpoint for this operation.
    pub fn checkpoint(&self) -> Checkpoint {
        checkpoint(&self.state, &self.token, self.poll_interval())
    }

    pub fn is_canceled(&self) -> bool {
        self.token.is_canceled()
    }
}

/// Scan-specific context handed to the walk and worker threads.
#[derive(Clone)]
pub struct PipelineContext {
    pub op: OperationContext,
    pub root: PathBuf,
    pub follow_links: bool,
}

impl PipelineContext {
    pub fn new(op: &OperationContext, root: &Path) -> Self {
        Self {
            op: op.clone(),
            root: root.to_path_buf(),
            follow_links: op.config.follow_links,
        }
    }
}

/// Handles for the threads of one scan. The collector joins them after the result queue closes.
pub struct PipelineHandles {
    /// Returns the number of paths dispatched, or the traversal error that aborted the pass.
    pub walk_handle: JoinHandle<anyhow::Result<u64>>,
    pub worker_handles: Vec<JoinHandle<()>>,
}

/// Job queue (walk -> workers) and result queue (workers -> collector).
pub struct PipelineChannels {
    pub job_tx: Sender<PathBuf>,
    pub job_rx: Receiver<PathBuf>,
    pub result_tx: Sender<FileRecord>,
    pub result_rx: Receiver<FileRecord>,
}

pub fn create_pipeline_channels(config: &SessionConfig) -> PipelineChannels {
    let (job_tx, job_rx) = bounded::<PathBuf>(config.effective_job_queue_cap());
    let (result_tx, result_rx) = bounded::<FileRecord>(config.result_queue_cap.max(1));
    PipelineChannels {
        job_tx,
        job_rx,
        result_tx,
        result_rx,
    }
}
