//! Host-facing control API: start one operation at a time, pause / resume / cancel it, read its
//! progress, and attach observers to its event stream.

use anyhow::anyhow;
use log::{debug, error};
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crate::broadcast::{BroadcastHub, Observer, ObserverId, Subscription};
use crate::compare::compare_reports;
use crate::copy::copy_files;
use crate::error::OperationError;
use crate::pipeline::{OperationContext, run_scan};
use crate::state::{CancelToken, OperationState, ProgressSnapshot};
use crate::utils::config::{PackagePaths, SessionConfig};
use crate::{ComparisonResult, CopySummary, Outcome, ReportKind, ScanReport};

/// Join handle for a launched operation.
pub struct OperationHandle<T> {
    handle: JoinHandle<Outcome<T>>,
}

impl<T> OperationHandle<T> {
    /// Block until the operation ends. Errors only if the coordinator thread panicked.
    pub fn wait(self) -> anyhow::Result<Outcome<T>> {
        self.handle
            .join()
            .map_err(|_| anyhow!("operation thread panicked"))
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

/// Owns the operation state and the broadcast hub. Cheap to clone; clones share both, so a
/// control thread (signal handler, stdin reader) can hold its own copy.
#[derive(Clone)]
pub struct ScanSession {
    state: Arc<OperationState>,
    hub: BroadcastHub,
    config: Arc<SessionConfig>,
}

impl Default for ScanSession {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}

impl ScanSession {
    pub fn new(config: SessionConfig) -> Self {
        let hub = BroadcastHub::new(config.event_buffer_cap, config.subscriber_queue_cap);
        Self {
            state: Arc::new(OperationState::new()),
            hub,
            config: Arc::new(config),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn hub(&self) -> &BroadcastHub {
        &self.hub
    }

    /// Scan `root` in the background. Fails with a conflict while another operation is active.
    pub fn start_scan(
        &self,
        root: impl Into<PathBuf>,
        kind: ReportKind,
    ) -> Result<OperationHandle<ScanReport>, OperationError> {
        let root = root.into();
        self.launch("scan", move |op| run_scan(&op, &root, kind))
    }

    /// Compare two reports in the background.
    pub fn start_compare(
        &self,
        source: ScanReport,
        destination: ScanReport,
    ) -> Result<OperationHandle<ComparisonResult>, OperationError> {
        self.launch("compare", move |op| {
            compare_reports(&op, &source, &destination)
        })
    }

    /// Copy what a comparison found missing or different from source root to destination root.
    pub fn start_copy(
        &self,
        comparison: ComparisonResult,
    ) -> Result<OperationHandle<CopySummary>, OperationError> {
        self.launch("copy", move |op| copy_files(&op, &comparison))
    }

    /// Claim the state, then run `body` on a named coordinator thread and settle its outcome.
    fn launch<T, F>(&self, label: &'static str, body: F) -> Result<OperationHandle<T>, OperationError>
    where
        T: Send + 'static,
        F: FnOnce(OperationContext) -> Outcome<T> + Send + 'static,
    {
        let token = CancelToken::new();
        self.state.start(token.clone())?;
        self.hub
            .status(&self.state, format!("Starting {}...", label));

        let op = OperationContext {
            state: Arc::clone(&self.state),
            hub: self.hub.clone(),
            token,
            config: Arc::clone(&self.config),
        };
        let spawned = thread::Builder::new()
            .name(format!("{}-{}", PackagePaths::get().pkg_name(), label))
            .spawn(move || {
                let outcome = body(op.clone());
                settle(&op, label, outcome)
            });
        match spawned {
            Ok(handle) => Ok(OperationHandle { handle }),
            Err(e) => {
                error!("failed to spawn {} thread: {}", label, e);
                self.state.finish();
                self.hub.status(&self.state, format!("{} failed to start", label));
                Err(OperationError::Spawn(e))
            }
        }
    }

    /// Running -> paused. Returns whether the transition happened.
    pub fn pause(&self) -> bool {
        if !self.state.pause() {
            debug!("pause ignored: status is {}", self.state.status());
            return false;
        }
        self.hub.log("Operation paused");
        self.hub.progress(&self.state, "Paused");
        self.hub.status(&self.state, "Paused");
        true
    }

    /// Paused -> running. Returns whether the transition happened.
    pub fn resume(&self) -> bool {
        if !self.state.resume() {
            debug!("resume ignored: status is {}", self.state.status());
            return false;
        }
        self.hub.log("Operation resumed");
        self.hub.progress(&self.state, "Resumed");
        self.hub.status(&self.state, "Resumed");
        true
    }

    /// Cancel the active operation. Workers stop at their next checkpoint; a paused worker wakes
    /// at once. No-op when nothing is running or paused.
    pub fn cancel(&self) -> bool {
        if !self.state.cancel() {
            debug!("cancel ignored: status is {}", self.state.status());
            return false;
        }
        self.hub.log("Operation cancelled");
        self.hub.status(&self.state, "Canceled");
        true
    }

    pub fn progress(&self) -> ProgressSnapshot {
        self.state.progress()
    }

    /// Running or paused.
    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    pub fn subscribe(&self) -> Subscription {
        self.hub.subscribe()
    }

    pub fn unsubscribe(&self, subscription: &Subscription) {
        self.hub.unsubscribe(subscription);
    }

    pub fn register_observer(&self, observer: Box<dyn Observer>) -> ObserverId {
        self.hub.register(observer)
    }

    pub fn unregister_observer(&self, id: ObserverId) {
        self.hub.unregister(id);
    }

    /// Block until every event published so far has reached the observers.
    pub fn flush_events(&self) {
        self.hub.flush();
    }
}

/// Final status transition and the closing events. A cancel that lands after the work completed
/// still wins: the result is discarded and the status stays canceled.
fn settle<T>(op: &OperationContext, label: &str, outcome: Outcome<T>) -> Outcome<T> {
    match outcome {
        Outcome::Completed(value) => {
            if !op.state.try_finish() {
                debug!("{}: canceled after completion, discarding result", label);
                return Outcome::Canceled;
            }
            op.hub.progress(&op.state, format!("Finished {}", label));
            op.hub.status(&op.state, "Finished");
            Outcome::Completed(value)
        }
        Outcome::Canceled => {
            // The canceller already set the status; leave it.
            op.hub.log(format!("{} canceled", label));
            op.hub.status(&op.state, "Canceled");
            Outcome::Canceled
        }
        Outcome::Failed(msg) => {
            error!("{} failed: {}", label, msg);
            if !op.state.try_finish() {
                return Outcome::Canceled;
            }
            op.hub.log(format!("ERROR: {} failed: {}", label, msg));
            op.hub.status(&op.state, "Finished");
            Outcome::Failed(msg)
        }
    }
}
