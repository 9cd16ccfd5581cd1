use serde::{Deserialize, Serialize};

use crate::state::{OperationStatus, ProgressSnapshot};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Log,
    Progress,
    Status,
}

/// Message carried to observers. Progress and status events embed a full state snapshot so each
/// one is self-describing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: EventKind,
    #[serde(rename = "message")]
    pub text: String,
    pub total: u64,
    pub processed: u64,
    pub percentage: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<OperationStatus>,
}

impl Event {
    pub fn log(text: impl Into<String>) -> Self {
        Self {
            kind: EventKind::Log,
            text: text.into(),
            total: 0,
            processed: 0,
            percentage: 0.0,
            status: None,
        }
    }

    pub fn progress(snapshot: ProgressSnapshot, text: impl Into<String>) -> Self {
        Self::with_snapshot(EventKind::Progress, snapshot, text)
    }

    pub fn status(snapshot: ProgressSnapshot, text: impl Into<String>) -> Self {
        Self::with_snapshot(EventKind::Status, snapshot, text)
    }

    fn with_snapshot(kind: EventKind, snapshot: ProgressSnapshot, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
            total: snapshot.total,
            processed: snapshot.processed,
            percentage: snapshot.percentage(),
            status: Some(snapshot.status),
        }
    }
}
