//! Typed errors for the host-facing control API and observer delivery.
//! Pipeline plumbing uses `anyhow`; these are the errors a caller branches on.

use thiserror::Error;

use crate::state::OperationStatus;

/// Why an operation could not be started.
#[derive(Debug, Error)]
pub enum OperationError {
    /// Another operation is running or paused. Nothing was changed.
    #[error("an operation is already in progress (status: {0})")]
    Conflict(OperationStatus),
    /// The coordinator thread could not be spawned; the state was rolled back to finished.
    #[error("failed to spawn operation thread: {0}")]
    Spawn(#[source] std::io::Error),
}

impl OperationError {
    pub fn is_conflict(&self) -> bool {
        matches!(self, OperationError::Conflict(_))
    }
}

/// A failed delivery to one observer. The hub drops the observer.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("observer disconnected")]
    Disconnected,
    #[error("observer queue full")]
    Backlogged,
    #[error("observer write failed: {0}")]
    Io(#[from] std::io::Error),
}
