//! Publish/subscribe fan-out with a single dispatch thread.
//!
//! Every mutation of the observer set and every publish is a command on one queue, consumed by
//! the dispatch thread in order. The set is therefore never touched concurrently with a fan-out,
//! and a `subscribe()` followed by a `publish()` on the same thread is always seen in that order.

use crossbeam_channel::{Receiver, Sender, bounded};
use log::debug;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use crate::error::DeliveryError;
use crate::state::OperationState;
use crate::utils::config::PackagePaths;

use super::event::Event;
use super::observers::ChannelObserver;

/// Receives events from the hub. Returning an error removes the observer for good.
pub trait Observer: Send {
    fn deliver(&mut self, event: &Event) -> Result<(), DeliveryError>;
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId(u64);

enum HubCommand {
    Register(ObserverId, Box<dyn Observer>),
    Unregister(ObserverId),
    Publish(Event),
    Flush(Sender<()>),
    Shutdown,
}

/// Channel-backed subscription returned by [`BroadcastHub::subscribe`].
/// Dropping it disconnects the channel; the hub drops the observer on its next delivery.
pub struct Subscription {
    id: ObserverId,
    events: Receiver<Event>,
}

impl Subscription {
    pub fn id(&self) -> ObserverId {
        self.id
    }

    pub fn receiver(&self) -> &Receiver<Event> {
        &self.events
    }

    /// Events already delivered, without blocking.
    pub fn drain(&self) -> Vec<Event> {
        self.events.try_iter().collect()
    }
}

struct HubInner {
    cmd_tx: Sender<HubCommand>,
    next_id: AtomicU64,
    subscriber_queue_cap: usize,
    dispatch: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for HubInner {
    fn drop(&mut self) {
        let _ = self.cmd_tx.send(HubCommand::Shutdown);
        let handle = self
            .dispatch
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(h) = handle {
            let _ = h.join();
        }
    }
}

/// Cloneable handle; the dispatch thread stops when the last handle is dropped.
#[derive(Clone)]
pub struct BroadcastHub {
    inner: Arc<HubInner>,
}

impl BroadcastHub {
    /// `buffer_cap`: command queue depth before publishers block.
    /// `subscriber_queue_cap`: per-subscriber backlog before that subscriber is dropped.
    pub fn new(buffer_cap: usize, subscriber_queue_cap: usize) -> Self {
        let (cmd_tx, cmd_rx) = bounded::<HubCommand>(buffer_cap.max(1));
        let dispatch = thread::Builder::new()
            .name(format!("{}-hub", PackagePaths::get().pkg_name()))
            .spawn(move || dispatch_loop(cmd_rx))
            .map_err(|e| log::error!("failed to spawn hub dispatch thread: {e}"))
            .ok();
        Self {
            inner: Arc::new(HubInner {
                cmd_tx,
                next_id: AtomicU64::new(1),
                subscriber_queue_cap: subscriber_queue_cap.max(1),
                dispatch: Mutex::new(dispatch),
            }),
        }
    }

    fn send(&self, cmd: HubCommand) {
        if self.inner.cmd_tx.send(cmd).is_err() {
            debug!("hub dispatch thread gone; command dropped");
        }
    }

    pub fn register(&self, observer: Box<dyn Observer>) -> ObserverId {
        let id = ObserverId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        self.send(HubCommand::Register(id, observer));
        id
    }

    pub fn unregister(&self, id: ObserverId) {
        self.send(HubCommand::Unregister(id));
    }

    /// Attach a bounded channel observer and return its receiving end.
    pub fn subscribe(&self) -> Subscription {
        let (observer, events) = ChannelObserver::new(self.inner.subscriber_queue_cap);
        let id = self.register(Box::new(observer));
        Subscription { id, events }
    }

    pub fn unsubscribe(&self, subscription: &Subscription) {
        self.unregister(subscription.id);
    }

    pub fn publish(&self, event: Event) {
        self.send(HubCommand::Publish(event));
    }

    pub fn log(&self, text: impl Into<String>) {
        self.publish(Event::log(text));
    }

    /// Publish a progress event carrying the current state snapshot.
    pub fn progress(&self, state: &OperationState, text: impl Into<String>) {
        self.publish(Event::progress(state.progress(), text));
    }

    /// Publish a status-change event carrying the current state snapshot.
    pub fn status(&self, state: &OperationState, text: impl Into<String>) {
        self.publish(Event::status(state.progress(), text));
    }

    /// Block until every command queued before this call has been dispatched.
    pub fn flush(&self) {
        let (ack_tx, ack_rx) = bounded::<()>(1);
        self.send(HubCommand::Flush(ack_tx));
        let _ = ack_rx.recv();
    }
}

fn dispatch_loop(cmd_rx: Receiver<HubCommand>) {
    let mut observers: Vec<(ObserverId, Box<dyn Observer>)> = Vec::new();
    while let Ok(cmd) = cmd_rx.recv() {
        match cmd {
            HubCommand::Register(id, observer) => observers.push((id, observer)),
            HubCommand::Unregister(id) => observers.retain(|(oid, _)| *oid != id),
            HubCommand::Publish(event) => {
                observers.retain_mut(|(id, observer)| match observer.deliver(&event) {
                    Ok(()) => true,
                    Err(e) => {
                        debug!("dropping observer {:?}: {}", id, e);
                        false
                    }
                });
            }
            HubCommand::Flush(ack) => {
                let _ = ack.send(());
            }
            HubCommand::Shutdown => break,
        }
    }
    debug!("hub dispatch stopped with {} observers attached", observers.len());
}
