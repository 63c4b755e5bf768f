//! Domain model for accounts and sessions.

mod actor;
mod error;
mod ids;
mod profile;
mod role;

pub use actor::Actor;
pub use error::{AccountDomainError, ParseRoleError};
pub use ids::{ProviderId, UserId};
pub use profile::{PersistedProfileData, Profile, Provider};
pub use role::Role;
