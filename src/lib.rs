//! Syncscan: parallel file inventory with pause / resume / cancel and live progress events.
//!
//! A [`ScanSession`] runs one operation at a time (scan, compare, or copy) on background threads
//! and fans its events out to any number of observers:
//!
//! ```ignore
//! let session = syncscan::ScanSession::default();
//! let events = session.subscribe();
//! let handle = session.start_scan("/data", syncscan::ReportKind::Source)?;
//! session.pause();
//! session.resume();
//! if let syncscan::Outcome::Completed(report) = handle.wait()? {
//!     syncscan::engine::save_report(std::path::Path::new("collected_data"), &report)?;
//! }
//! ```

pub mod broadcast;
pub mod compare;
pub mod copy;
pub mod engine;
pub mod error;
pub mod pipeline;
pub mod session;
pub mod state;
pub mod types;
pub mod utils;

/// Re-export types for API
pub use types::*;

pub use broadcast::{Event, EventKind, Observer, ObserverId, Subscription};
pub use error::{DeliveryError, OperationError};
pub use session::{OperationHandle, ScanSession};
pub use state::{OperationStatus, ProgressSnapshot};
pub use utils::config::SessionConfig;

/// Result alias used by public syncscan API
pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, Error>;
