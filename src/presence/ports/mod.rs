//! Port contracts for presence persistence.

mod repository;

pub use repository::{PresenceRepository, PresenceRepositoryError, PresenceRepositoryResult};
