use std::sync::{Arc, Mutex};
use syncscan::broadcast::{BroadcastHub, Event, EventKind, JsonLinesObserver, Observer};
use syncscan::state::{CancelToken, OperationState};
use syncscan::{DeliveryError, OperationStatus};

/// Records every event; optionally fails after `fail_after` deliveries.
struct Recorder {
    seen: Arc<Mutex<Vec<Event>>>,
    fail_after: Option<usize>,
}

impl Observer for Recorder {
    fn deliver(&mut self, event: &Event) -> Result<(), DeliveryError> {
        let mut seen = self.seen.lock().unwrap();
        if self.fail_after.is_some_and(|n| seen.len() >= n) {
            return Err(DeliveryError::Disconnected);
        }
        seen.push(event.clone());
        Ok(())
    }
}

fn recorder(fail_after: Option<usize>) -> (Box<dyn Observer>, Arc<Mutex<Vec<Event>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    (
        Box::new(Recorder {
            seen: Arc::clone(&seen),
            fail_after,
        }),
        seen,
    )
}

fn texts(events: &[Event]) -> Vec<String> {
    events.iter().map(|e| e.text.clone()).collect()
}

#[test]
fn test_events_arrive_in_publish_order() {
    let hub = BroadcastHub::new(64, 64);
    let sub = hub.subscribe();
    for i in 0..20 {
        hub.log(format!("line {i}"));
    }
    hub.flush();
    let expected: Vec<String> = (0..20).map(|i| format!("line {i}")).collect();
    assert_eq!(texts(&sub.drain()), expected);
}

#[test]
fn test_failing_observer_is_dropped_others_continue() {
    let hub = BroadcastHub::new(64, 64);
    let (bad, bad_seen) = recorder(Some(1));
    let (good, good_seen) = recorder(None);
    hub.register(bad);
    hub.register(good);

    hub.log("a");
    hub.log("b");
    hub.log("c");
    hub.flush();

    assert_eq!(texts(&bad_seen.lock().unwrap()), vec!["a"]);
    assert_eq!(texts(&good_seen.lock().unwrap()), vec!["a", "b", "c"]);
}

#[test]
fn test_backlogged_subscriber_is_dropped() {
    let hub = BroadcastHub::new(64, 2);
    let slow = hub.subscribe();
    let fast = hub.subscribe();

    for i in 0..5 {
        hub.log(format!("e{i}"));
        hub.flush();
        fast.drain();
    }
    // Queue held two events; the third overflowed and the subscriber was removed for good.
    assert_eq!(texts(&slow.drain()), vec!["e0", "e1"]);
    hub.log("after");
    hub.flush();
    assert!(slow.drain().is_empty());
    assert_eq!(texts(&fast.drain()), vec!["after"]);
}

#[test]
fn test_unsubscribe_stops_delivery() {
    let hub = BroadcastHub::new(64, 64);
    let sub = hub.subscribe();
    hub.log("before");
    hub.unsubscribe(&sub);
    hub.log("after");
    hub.flush();
    assert_eq!(texts(&sub.drain()), vec!["before"]);
}

#[test]
fn test_dropped_subscription_does_not_block_hub() {
    let hub = BroadcastHub::new(64, 64);
    let (obs, seen) = recorder(None);
    hub.register(obs);
    drop(hub.subscribe());
    hub.log("x");
    hub.log("y");
    hub.flush();
    assert_eq!(texts(&seen.lock().unwrap()), vec!["x", "y"]);
}

#[test]
fn test_progress_event_carries_snapshot() {
    let hub = BroadcastHub::new(64, 64);
    let sub = hub.subscribe();
    let state = OperationState::new();
    state.start(CancelToken::new()).unwrap();
    state.set_total(4);
    state.increment_processed();
    hub.progress(&state, "Collected: a.txt");
    hub.flush();

    let events = sub.drain();
    assert_eq!(events.len(), 1);
    let e = &events[0];
    assert_eq!(e.kind, EventKind::Progress);
    assert_eq!((e.processed, e.total), (1, 4));
    assert_eq!(e.percentage, 25.0);
    assert_eq!(e.status, Some(OperationStatus::Running));
}

#[derive(Clone, Default)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl std::io::Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_json_lines_shape() -> anyhow::Result<()> {
    let hub = BroadcastHub::new(64, 64);
    let buf = SharedBuf::default();
    let (observer, writer) = JsonLinesObserver::spawn(buf.clone(), 16)?;
    let id = hub.register(Box::new(observer));
    let state = OperationState::new();
    state.start(CancelToken::new()).unwrap();
    hub.log("hello");
    hub.status(&state, "Paused");
    hub.unregister(id);
    hub.flush();
    writer.finish();

    let out = String::from_utf8(buf.0.lock().unwrap().clone())?;
    let lines: Vec<serde_json::Value> = out
        .lines()
        .map(serde_json::from_str)
        .collect::<Result<_, _>>()?;
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0]["type"], "log");
    assert_eq!(lines[0]["message"], "hello");
    assert!(lines[0].get("status").is_none());
    assert_eq!(lines[1]["type"], "status");
    assert_eq!(lines[1]["status"], "running");
    assert_eq!(lines[1]["percentage"], 0.0);
    Ok(())
}

/// Output that blocks until released, standing in for a stalled stdout pipe.
struct GatedWriter {
    gate: crossbeam_channel::Receiver<()>,
}

impl std::io::Write for GatedWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let _ = self.gate.recv();
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[test]
fn test_stalled_json_output_does_not_block_other_observers() -> anyhow::Result<()> {
    let hub = BroadcastHub::new(64, 64);
    let (release, gate) = crossbeam_channel::bounded::<()>(0);
    let (observer, writer) = JsonLinesObserver::spawn(GatedWriter { gate }, 2)?;
    hub.register(Box::new(observer));
    let sub = hub.subscribe();

    for i in 0..10 {
        hub.log(format!("e{i}"));
    }
    hub.flush();
    let expected: Vec<String> = (0..10).map(|i| format!("e{i}")).collect();
    assert_eq!(texts(&sub.drain()), expected);

    // The stalled observer overflowed and was removed; releasing the gate lets its writer end.
    drop(release);
    writer.finish();
    Ok(())
}
