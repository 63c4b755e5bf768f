//! Repository port for profiles and providers.

use crate::account::domain::{Profile, Provider, ProviderId, UserId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for account repository operations.
pub type AccountRepositoryResult<T> = Result<T, AccountRepositoryError>;

/// Profile and provider persistence contract.
#[async_trait]
pub trait AccountRepository: Send + Sync {
    /// Stores a new provider.
    ///
    /// # Errors
    ///
    /// Returns [`AccountRepositoryError::DuplicateProvider`] when the
    /// identifier already exists.
    async fn store_provider(&self, provider: &Provider) -> AccountRepositoryResult<()>;

    /// Finds a provider by identifier.
    async fn find_provider(&self, id: ProviderId) -> AccountRepositoryResult<Option<Provider>>;

    /// Stores a new profile.
    ///
    /// # Errors
    ///
    /// Returns [`AccountRepositoryError::DuplicateProfile`] when a profile
    /// already exists for the user.
    async fn store_profile(&self, profile: &Profile) -> AccountRepositoryResult<()>;

    /// Persists role and contact changes to an existing profile.
    ///
    /// # Errors
    ///
    /// Returns [`AccountRepositoryError::ProfileNotFound`] when the profile
    /// does not exist.
    async fn update_profile(&self, profile: &Profile) -> AccountRepositoryResult<()>;

    /// Finds a profile by user identifier.
    async fn find_profile(&self, user_id: UserId) -> AccountRepositoryResult<Option<Profile>>;
}

/// Errors returned by account repository implementations.
#[derive(Debug, Clone, Error)]
pub enum AccountRepositoryError {
    /// A provider with the same identifier already exists.
    #[error("duplicate provider: {0}")]
    DuplicateProvider(ProviderId),

    /// A profile for the user already exists.
    #[error("duplicate profile for user {0}")]
    DuplicateProfile(UserId),

    /// The profile was not found.
    #[error("profile not found for user {0}")]
    ProfileNotFound(UserId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl AccountRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
