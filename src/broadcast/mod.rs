//! Event fan-out to observers: event type, hub, and built-in observers.

pub mod event;
pub mod hub;
pub mod observers;

pub use event::{Event, EventKind};
pub use hub::{BroadcastHub, Observer, ObserverId, Subscription};
pub use observers::{
    ChannelObserver, JsonLinesObserver, JsonLinesWriter, LogObserver, ProgressBarObserver,
};
