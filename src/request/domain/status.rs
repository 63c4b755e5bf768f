//! Request lifecycle states and the transitions allowed between them.

use super::ParseRequestStatusError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a service request.
///
/// ```text
/// initiated -> assigned -> en_route -> active -> completed
///     \____________\___________\
///                               -> cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    /// Created and waiting for an operator.
    Initiated,
    /// Claimed by an operator.
    Assigned,
    /// The operator is driving to the pickup.
    EnRoute,
    /// The operator arrived and the PIN was verified.
    Active,
    /// Service delivered.
    Completed,
    /// Cancelled by the requester or the operator.
    Cancelled,
}

impl RequestStatus {
    /// Every status, in lifecycle order.
    pub const ALL: [Self; 6] = [
        Self::Initiated,
        Self::Assigned,
        Self::EnRoute,
        Self::Active,
        Self::Completed,
        Self::Cancelled,
    ];

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initiated => "initiated",
            Self::Assigned => "assigned",
            Self::EnRoute => "en_route",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    /// Returns `true` for states no transition leaves.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    /// Returns `true` while the request may still be cancelled.
    #[must_use]
    pub const fn is_cancellable(self) -> bool {
        matches!(self, Self::Initiated | Self::Assigned | Self::EnRoute)
    }

    /// Returns `true` while an operator is attached and working the request.
    #[must_use]
    pub const fn holds_operator(self) -> bool {
        matches!(self, Self::Assigned | Self::EnRoute | Self::Active)
    }

    /// Returns `true` when `next` directly follows `self`.
    #[must_use]
    pub const fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Initiated, Self::Assigned)
                | (Self::Assigned, Self::EnRoute)
                | (Self::EnRoute, Self::Active)
                | (Self::Active, Self::Completed)
                | (
                    Self::Initiated | Self::Assigned | Self::EnRoute,
                    Self::Cancelled
                )
        )
    }
}

impl TryFrom<&str> for RequestStatus {
    type Error = ParseRequestStatusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let normalized = value.trim().to_ascii_lowercase();
        match normalized.as_str() {
            "initiated" => Ok(Self::Initiated),
            "assigned" => Ok(Self::Assigned),
            "en_route" => Ok(Self::EnRoute),
            "active" => Ok(Self::Active),
            "completed" => Ok(Self::Completed),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(ParseRequestStatusError(value.to_owned())),
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
