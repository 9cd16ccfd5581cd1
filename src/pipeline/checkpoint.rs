//! Cooperative pause/cancel checkpoint consulted before each unit of work.

use std::time::Duration;

use crate::state::{CancelToken, OperationState};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Checkpoint {
    Proceed,
    Canceled,
}

/// Return immediately when neither paused nor canceled. While paused, wait in steps of
/// `poll_interval`; each wait wakes at once if the token fires.
pub fn checkpoint(state: &OperationState, token: &CancelToken, poll_interval: Duration) -> Checkpoint {
    if token.is_canceled() {
        return Checkpoint::Canceled;
    }
    while state.is_paused() {
        if token.wait_timeout(poll_interval) {
            return Checkpoint::Canceled;
        }
    }
    if token.is_canceled() {
        return Checkpoint::Canceled;
    }
    Checkpoint::Proceed
}
