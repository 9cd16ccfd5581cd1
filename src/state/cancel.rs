//! One-shot cancellation token.
//!
//! Firing drops the only sender of a zero-capacity channel, so every clone's receiver becomes
//! disconnected at once. That lets a blocked `select!` (queue push) or a timed wait (pause poll)
//! wake immediately instead of waiting out its timeout.

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, bounded};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

#[derive(Clone, Debug)]
pub struct CancelToken {
    fired: Arc<AtomicBool>,
    trigger: Arc<Mutex<Option<Sender<()>>>>,
    signal: Receiver<()>,
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

impl CancelToken {
    pub fn new() -> Self {
        let (tx, rx) = bounded::<()>(0);
        Self {
            fired: Arc::new(AtomicBool::new(false)),
            trigger: Arc::new(Mutex::new(Some(tx))),
            signal: rx,
        }
    }

    /// Fire the token. Permanent; later calls are no-ops.
    pub fn cancel(&self) {
        self.fired.store(true, Ordering::SeqCst);
        let sender = self
            .trigger
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        drop(sender);
    }

    pub fn is_canceled(&self) -> bool {
        self.fired.load(Ordering::SeqCst)
    }

    /// Receiver that never yields a value and disconnects when the token fires.
    /// Use as a `recv` arm in `crossbeam_channel::select!`.
    pub fn signal(&self) -> &Receiver<()> {
        &self.signal
    }

    /// Sleep up to `timeout`, waking early on cancellation. Returns true if canceled.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        match self.signal.recv_timeout(timeout) {
            Err(RecvTimeoutError::Timeout) => self.is_canceled(),
            Ok(()) | Err(RecvTimeoutError::Disconnected) => true,
        }
    }
}
