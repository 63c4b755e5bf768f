//! Domain model for operator presence.

mod error;
mod location;
mod state;

pub use error::PresenceDomainError;
pub use location::{LocationFix, OperatorLocation};
pub use state::{DEFAULT_STALE_AFTER_SECS, PresenceState, PresenceView, presence_state};
