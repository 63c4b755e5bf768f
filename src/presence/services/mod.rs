//! Application services for operator presence.

mod presence;

pub use presence::{PresenceService, PresenceServiceError, PresenceServiceResult};
