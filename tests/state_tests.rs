use proptest::prelude::*;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use syncscan::state::{CancelToken, OperationState, percentage};
use syncscan::{OperationError, OperationStatus};

// --- transitions ---

#[test]
fn test_start_resets_counters_and_runs() {
    let state = OperationState::new();
    assert_eq!(state.status(), OperationStatus::Idle);
    state.start(CancelToken::new()).unwrap();
    state.set_total(10);
    state.increment_processed();
    state.finish();

    state.start(CancelToken::new()).unwrap();
    let p = state.progress();
    assert_eq!(p.status, OperationStatus::Running);
    assert_eq!((p.processed, p.total), (0, 0));
}

#[test]
fn test_start_while_active_is_conflict() {
    let state = OperationState::new();
    state.start(CancelToken::new()).unwrap();
    state.set_total(5);
    let err = state.start(CancelToken::new()).unwrap_err();
    assert!(matches!(err, OperationError::Conflict(OperationStatus::Running)));
    assert_eq!(state.total(), 5);

    assert!(state.pause());
    let err = state.start(CancelToken::new()).unwrap_err();
    assert!(err.is_conflict());
    assert_eq!(state.status(), OperationStatus::Paused);
}

#[test]
fn test_pause_resume_only_from_matching_status() {
    let state = OperationState::new();
    assert!(!state.pause());
    assert!(!state.resume());

    state.start(CancelToken::new()).unwrap();
    assert!(!state.resume());
    assert!(state.pause());
    assert!(state.is_paused());
    assert!(!state.pause());
    assert!(state.resume());
    assert!(!state.is_paused());
    assert_eq!(state.status(), OperationStatus::Running);
}

#[test]
fn test_cancel_fires_token_and_is_idempotent() {
    let state = OperationState::new();
    let token = CancelToken::new();
    assert!(!state.cancel());

    state.start(token.clone()).unwrap();
    assert!(state.pause());
    assert!(state.cancel());
    assert!(token.is_canceled());
    assert!(!state.is_paused());
    assert_eq!(state.status(), OperationStatus::Canceled);

    assert!(!state.cancel());
    assert_eq!(state.status(), OperationStatus::Canceled);
}

#[test]
fn test_try_finish_keeps_canceled() {
    let state = OperationState::new();
    state.start(CancelToken::new()).unwrap();
    state.cancel();
    assert!(!state.try_finish());
    assert_eq!(state.status(), OperationStatus::Canceled);

    state.start(CancelToken::new()).unwrap();
    assert!(state.try_finish());
    assert_eq!(state.status(), OperationStatus::Finished);
    assert!(!state.is_running());
}

// --- cancel token ---

#[test]
fn test_cancel_token_wakes_waiter_early() {
    let token = CancelToken::new();
    let waiter = token.clone();
    let started = Instant::now();
    let handle = thread::spawn(move || waiter.wait_timeout(Duration::from_secs(30)));
    thread::sleep(Duration::from_millis(50));
    token.cancel();
    assert!(handle.join().unwrap());
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[test]
fn test_cancel_token_timeout_without_cancel() {
    let token = CancelToken::new();
    assert!(!token.wait_timeout(Duration::from_millis(10)));
    assert!(!token.is_canceled());
}

// --- counters ---

#[test]
fn test_concurrent_increments_are_not_lost() {
    let state = Arc::new(OperationState::new());
    state.start(CancelToken::new()).unwrap();
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let state = Arc::clone(&state);
            thread::spawn(move || {
                for _ in 0..1000 {
                    state.increment_processed();
                }
            })
        })
        .collect();
    for h in handles {
        h.join().unwrap();
    }
    assert_eq!(state.processed(), 8000);
}

proptest! {
    #[test]
    fn percentage_is_clamped(processed in any::<u64>(), total in any::<u64>()) {
        let p = percentage(processed, total);
        prop_assert!((0.0..=100.0).contains(&p));
        if total == 0 {
            prop_assert_eq!(p, 0.0);
        }
    }

    #[test]
    fn increments_return_running_count(n in 1usize..200) {
        let state = OperationState::new();
        state.start(CancelToken::new()).unwrap();
        let mut last = 0;
        for _ in 0..n {
            last = state.increment_processed();
        }
        prop_assert_eq!(last, n as u64);
        prop_assert_eq!(state.processed(), n as u64);
    }
}
