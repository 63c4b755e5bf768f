//! Append-only audit records of applied transitions.

use super::{EventId, RequestId, RequestStatus};
use crate::account::domain::{Actor, Role, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One applied transition.
///
/// `from` is `None` for the creation event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestEvent {
    /// Event identifier.
    pub id: EventId,
    /// Request the event belongs to.
    pub request_id: RequestId,
    /// Who caused the transition.
    pub actor_id: UserId,
    /// Role the actor held at the time.
    pub actor_role: Role,
    /// Status before the transition.
    pub from: Option<RequestStatus>,
    /// Status after the transition.
    pub to: RequestStatus,
    /// Free-text context, such as a cancellation reason.
    pub note: Option<String>,
    /// When the transition was applied.
    pub occurred_at: DateTime<Utc>,
}

impl RequestEvent {
    pub(crate) fn new(
        request_id: RequestId,
        actor: &Actor,
        from: Option<RequestStatus>,
        to: RequestStatus,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: EventId::new(),
            request_id,
            actor_id: actor.user_id(),
            actor_role: actor.role(),
            from,
            to,
            note: None,
            occurred_at,
        }
    }

    #[must_use]
    pub(crate) fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}
