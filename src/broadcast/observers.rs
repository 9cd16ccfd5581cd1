//! Built-in observers: bounded channel (subscriptions), JSON lines writer, log forwarder, and a
//! terminal progress bar.

use crossbeam_channel::{Receiver, Sender, TrySendError, bounded};
use kdam::Animation;
use log::{debug, info, warn};
use std::io::Write;
use std::thread::{self, JoinHandle};

use crate::engine::progress::{
    ProgressBar, ProgressBarConfig, create_progress_bar, refresh_bar, set_bar_desc,
    set_bar_position, set_bar_total,
};
use crate::error::DeliveryError;
use crate::state::OperationStatus;
use crate::utils::config::PackagePaths;

use super::event::{Event, EventKind};
use super::hub::Observer;

/// Forwards into a bounded queue with `try_send`. A full queue counts as a failed delivery, so a
/// stalled reader is dropped instead of holding up the others.
pub struct ChannelObserver {
    tx: Sender<Event>,
}

impl ChannelObserver {
    pub fn new(cap: usize) -> (Self, Receiver<Event>) {
        let (tx, rx) = bounded(cap);
        (Self { tx }, rx)
    }
}

impl Observer for ChannelObserver {
    fn deliver(&mut self, event: &Event) -> Result<(), DeliveryError> {
        self.tx.try_send(event.clone()).map_err(|e| match e {
            TrySendError::Full(_) => DeliveryError::Backlogged,
            TrySendError::Disconnected(_) => DeliveryError::Disconnected,
        })
    }
}

/// Writes each event as one JSON object per line on its own writer thread. Delivery only queues
/// the event, so a stalled output never holds up the hub; a full queue or a dead writer drops the
/// observer like any other.
pub struct JsonLinesObserver {
    tx: Sender<Event>,
}

/// Writer thread behind a [`JsonLinesObserver`]. Ends once the observer is dropped and the queue
/// is written out, or on the first write error.
pub struct JsonLinesWriter {
    handle: JoinHandle<()>,
}

impl JsonLinesWriter {
    /// Wait until every queued line is written. Drop or unregister the observer first.
    pub fn finish(self) {
        if self.handle.join().is_err() {
            warn!("json lines writer panicked");
        }
    }
}

impl JsonLinesObserver {
    pub fn spawn<W: Write + Send + 'static>(
        out: W,
        cap: usize,
    ) -> std::io::Result<(Self, JsonLinesWriter)> {
        let (tx, rx) = bounded::<Event>(cap.max(1));
        let handle = thread::Builder::new()
            .name(format!("{}-json", PackagePaths::get().pkg_name()))
            .spawn(move || write_json_lines(out, rx))?;
        Ok((Self { tx }, JsonLinesWriter { handle }))
    }
}

fn write_json_lines<W: Write>(mut out: W, rx: Receiver<Event>) {
    for event in rx.iter() {
        let written = serde_json::to_writer(&mut out, &event)
            .map_err(std::io::Error::from)
            .and_then(|()| out.write_all(b"\n"))
            .and_then(|()| out.flush());
        if let Err(e) = written {
            debug!("json lines writer stopped: {}", e);
            return;
        }
    }
}

impl Observer for JsonLinesObserver {
    fn deliver(&mut self, event: &Event) -> Result<(), DeliveryError> {
        self.tx.try_send(event.clone()).map_err(|e| match e {
            TrySendError::Full(_) => DeliveryError::Backlogged,
            TrySendError::Disconnected(_) => DeliveryError::Disconnected,
        })
    }
}

/// Sends log events to the `log` facade; progress only at debug.
pub struct LogObserver;

impl Observer for LogObserver {
    fn deliver(&mut self, event: &Event) -> Result<(), DeliveryError> {
        match event.kind {
            EventKind::Log if event.text.starts_with("ERROR") => warn!("{}", event.text),
            EventKind::Log | EventKind::Status => info!("{}", event.text),
            EventKind::Progress => debug!(
                "{} ({} / {}) {:.2}%",
                event.text, event.processed, event.total, event.percentage
            ),
        }
        Ok(())
    }
}

/// Drives a kdam bar from progress and status events.
pub struct ProgressBarObserver {
    bar: ProgressBar,
    total: u64,
}

impl ProgressBarObserver {
    pub fn new(desc: &'static str) -> Self {
        Self {
            bar: create_progress_bar(ProgressBarConfig::new(0, desc, Animation::Classic)),
            total: 0,
        }
    }
}

impl Observer for ProgressBarObserver {
    fn deliver(&mut self, event: &Event) -> Result<(), DeliveryError> {
        if event.kind == EventKind::Log {
            return Ok(());
        }
        if event.total != self.total {
            self.total = event.total;
            set_bar_total(&self.bar, event.total as usize);
        }
        set_bar_position(&self.bar, event.processed as usize)?;
        match event.status {
            Some(OperationStatus::Paused) => set_bar_desc(&self.bar, "Paused"),
            Some(OperationStatus::Running) if event.kind == EventKind::Status => {
                set_bar_desc(&self.bar, "Running")
            }
            Some(OperationStatus::Canceled) => set_bar_desc(&self.bar, "Canceled"),
            Some(OperationStatus::Finished) => set_bar_desc(&self.bar, "Done"),
            _ => refresh_bar(&self.bar),
        }
        Ok(())
    }
}
