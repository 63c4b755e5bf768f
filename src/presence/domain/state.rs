//! Liveness classification of stored locations.

use super::OperatorLocation;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// Seconds after which an online location no longer counts as live.
pub const DEFAULT_STALE_AFTER_SECS: i64 = 60;

/// How much a stored location can be trusted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PresenceState {
    /// Online and recently updated.
    Live,
    /// Online but silent for longer than the stale window.
    Stale {
        /// Seconds since the last update.
        age_seconds: i64,
    },
    /// The operator went offline explicitly.
    Offline,
    /// No location was ever reported.
    Unknown,
}

/// Location plus its classification.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PresenceView {
    /// Stored location, when any.
    pub location: Option<OperatorLocation>,
    /// Classification at read time.
    pub state: PresenceState,
}

/// Classifies `location` at `now`.
///
/// A lapsed heartbeat is reported as [`PresenceState::Stale`], never as
/// offline; only an explicit sign-off is offline.
#[must_use]
pub fn presence_state(
    location: Option<&OperatorLocation>,
    now: DateTime<Utc>,
    stale_after: TimeDelta,
) -> PresenceState {
    location.map_or(PresenceState::Unknown, |found| {
        if !found.is_online {
            return PresenceState::Offline;
        }
        let age = now.signed_duration_since(found.updated_at);
        if age > stale_after {
            PresenceState::Stale {
                age_seconds: age.num_seconds(),
            }
        } else {
            PresenceState::Live
        }
    })
}
