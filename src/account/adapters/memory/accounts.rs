//! In-memory repository for profiles and providers.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::account::{
    domain::{Profile, Provider, ProviderId, UserId},
    ports::{AccountRepository, AccountRepositoryError, AccountRepositoryResult},
};

/// Thread-safe in-memory account repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAccountRepository {
    state: Arc<RwLock<InMemoryAccountState>>,
}

#[derive(Debug, Default)]
struct InMemoryAccountState {
    providers: HashMap<ProviderId, Provider>,
    profiles: HashMap<UserId, Profile>,
}

impl InMemoryAccountRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(err: impl ToString) -> AccountRepositoryError {
    AccountRepositoryError::persistence(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl AccountRepository for InMemoryAccountRepository {
    async fn store_provider(&self, provider: &Provider) -> AccountRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.providers.contains_key(&provider.id()) {
            return Err(AccountRepositoryError::DuplicateProvider(provider.id()));
        }
        state.providers.insert(provider.id(), provider.clone());
        Ok(())
    }

    async fn find_provider(&self, id: ProviderId) -> AccountRepositoryResult<Option<Provider>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.providers.get(&id).cloned())
    }

    async fn store_profile(&self, profile: &Profile) -> AccountRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        if state.profiles.contains_key(&profile.user_id()) {
            return Err(AccountRepositoryError::DuplicateProfile(profile.user_id()));
        }
        state.profiles.insert(profile.user_id(), profile.clone());
        Ok(())
    }

    async fn update_profile(&self, profile: &Profile) -> AccountRepositoryResult<()> {
        let mut state = self.state.write().map_err(lock_error)?;
        let slot = state
            .profiles
            .get_mut(&profile.user_id())
            .ok_or(AccountRepositoryError::ProfileNotFound(profile.user_id()))?;
        *slot = profile.clone();
        Ok(())
    }

    async fn find_profile(&self, user_id: UserId) -> AccountRepositoryResult<Option<Profile>> {
        let state = self.state.read().map_err(lock_error)?;
        Ok(state.profiles.get(&user_id).cloned())
    }
}
