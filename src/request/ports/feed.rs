//! Change notification port.

use crate::request::domain::{RequestId, RequestStatus};
use serde::{Deserialize, Serialize};

/// What changed about a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChangeKind {
    /// The request moved to a new status (creation included).
    Status {
        /// Status after the change.
        status: RequestStatus,
    },
    /// A chat message was appended.
    Message,
    /// A rating was left.
    Rating,
}

/// Change cue. It carries identifiers only; subscribers re-read the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestChange {
    /// Changed request.
    pub request_id: RequestId,
    /// Kind of change.
    pub kind: ChangeKind,
}

/// Publishes change cues to subscribers.
pub trait ChangePublisher: Send + Sync {
    /// Publishes a change. Having no subscribers is not an error.
    fn publish(&self, change: RequestChange);
}
