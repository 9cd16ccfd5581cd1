//! Status register and pause/cancel switch for the current operation.
//!
//! Status transitions go through one mutex; the counters and the pause flag are atomics so the
//! hot path in workers never takes the lock.
//!
//! ```text
//! idle -> running <-> paused
//! running | paused -> canceled | finished
//! canceled | finished -> running   (next start)
//! ```

pub mod cancel;

pub use cancel::CancelToken;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::error::OperationError;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OperationStatus {
    #[default]
    Idle,
    Running,
    Paused,
    Canceled,
    Finished,
}

impl OperationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationStatus::Idle => "idle",
            OperationStatus::Running => "running",
            OperationStatus::Paused => "paused",
            OperationStatus::Canceled => "canceled",
            OperationStatus::Finished => "finished",
        }
    }

    /// Running or paused.
    pub fn is_active(&self) -> bool {
        matches!(self, OperationStatus::Running | OperationStatus::Paused)
    }
}

impl fmt::Display for OperationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Point-in-time view of the counters and status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct ProgressSnapshot {
    pub processed: u64,
    pub total: u64,
    pub status: OperationStatus,
}

impl ProgressSnapshot {
    /// `processed / total * 100`, clamped to [0, 100]; 0 when total is 0.
    pub fn percentage(&self) -> f64 {
        percentage(self.processed, self.total)
    }
}

/// `processed / total * 100`, clamped to [0, 100]; 0 when total is 0.
/// The total is a walk-time estimate, so processed may exceed it if the tree grew.
pub fn percentage(processed: u64, total: u64) -> f64 {
    if total == 0 {
        return 0.0;
    }
    (processed as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
}

struct StateInner {
    status: OperationStatus,
    cancel: Option<CancelToken>,
}

pub struct OperationState {
    inner: Mutex<StateInner>,
    paused: AtomicBool,
    processed: AtomicU64,
    total: AtomicU64,
}

impl Default for OperationState {
    fn default() -> Self {
        Self::new()
    }
}

impl OperationState {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(StateInner {
                status: OperationStatus::Idle,
                cancel: None,
            }),
            paused: AtomicBool::new(false),
            processed: AtomicU64::new(0),
            total: AtomicU64::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, StateInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Begin an operation. Rejected with [`OperationError::Conflict`] while one is active;
    /// otherwise resets counters and the pause flag, stores `cancel`, and sets running.
    pub fn start(&self, cancel: CancelToken) -> Result<(), OperationError> {
        let mut inner = self.lock();
        if inner.status.is_active() {
            return Err(OperationError::Conflict(inner.status));
        }
        self.paused.store(false, Ordering::SeqCst);
        self.processed.store(0, Ordering::SeqCst);
        self.total.store(0, Ordering::SeqCst);
        inner.cancel = Some(cancel);
        inner.status = OperationStatus::Running;
        Ok(())
    }

    pub fn set_total(&self, total: u64) {
        self.total.store(total, Ordering::SeqCst);
    }

    /// Returns the post-increment count.
    pub fn increment_processed(&self) -> u64 {
        self.processed.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Running -> paused. Returns false (no-op) from any other status.
    pub fn pause(&self) -> bool {
        let mut inner = self.lock();
        if inner.status != OperationStatus::Running {
            return false;
        }
        self.paused.store(true, Ordering::SeqCst);
        inner.status = OperationStatus::Paused;
        true
    }

    /// Paused -> running. Returns false (no-op) from any other status.
    pub fn resume(&self) -> bool {
        let mut inner = self.lock();
        if inner.status != OperationStatus::Paused {
            return false;
        }
        self.paused.store(false, Ordering::SeqCst);
        inner.status = OperationStatus::Running;
        true
    }

    /// Fire the operation's cancel token and mark it canceled. No-op unless running or paused.
    pub fn cancel(&self) -> bool {
        let mut inner = self.lock();
        if !inner.status.is_active() {
            return false;
        }
        if let Some(token) = inner.cancel.take() {
            token.cancel();
        }
        self.paused.store(false, Ordering::SeqCst);
        inner.status = OperationStatus::Canceled;
        true
    }

    /// Mark finished regardless of prior status.
    pub fn finish(&self) {
        let mut inner = self.lock();
        inner.cancel = None;
        self.paused.store(false, Ordering::SeqCst);
        inner.status = OperationStatus::Finished;
    }

    /// Mark finished unless a cancel already landed. Returns whether the transition happened.
    pub fn try_finish(&self) -> bool {
        let mut inner = self.lock();
        if inner.status == OperationStatus::Canceled {
            return false;
        }
        inner.cancel = None;
        self.paused.store(false, Ordering::SeqCst);
        inner.status = OperationStatus::Finished;
        true
    }

    pub fn is_running(&self) -> bool {
        self.lock().status.is_active()
    }

    /// Lock-free read of the pause flag for worker checkpoints.
    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    pub fn status(&self) -> OperationStatus {
        self.lock().status
    }

    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::SeqCst)
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::SeqCst)
    }

    pub fn progress(&self) -> ProgressSnapshot {
        let status = self.status();
        ProgressSnapshot {
            processed: self.processed(),
            total: self.total(),
            status,
        }
    }
}
