//! Service layer for provider registration and role administration.

use crate::account::{
    domain::{AccountDomainError, Actor, Profile, Provider, ProviderId, Role, UserId},
    ports::{AccountRepository, AccountRepositoryError},
};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// Request payload for registering a profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisterProfileRequest {
    user_id: UserId,
    full_name: String,
    role: Role,
    provider_id: Option<ProviderId>,
    phone: Option<String>,
}

impl RegisterProfileRequest {
    /// Creates a registration request for a plain user profile.
    #[must_use]
    pub fn new(user_id: UserId, full_name: impl Into<String>) -> Self {
        Self {
            user_id,
            full_name: full_name.into(),
            role: Role::User,
            provider_id: None,
            phone: None,
        }
    }

    /// Sets the role and provider association.
    #[must_use]
    pub const fn with_role(mut self, role: Role, provider_id: Option<ProviderId>) -> Self {
        self.role = role;
        self.provider_id = provider_id;
        self
    }

    /// Sets the contact phone number.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }
}

/// Request payload for an administrative role change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UpdateUserRoleRequest {
    /// Profile being changed.
    pub user_id: UserId,
    /// Role to assign.
    pub new_role: Role,
    /// Provider to attach; required iff `new_role` is operator.
    pub provider_id: Option<ProviderId>,
}

/// Service-level errors for account operations.
#[derive(Debug, Error)]
pub enum AccountServiceError {
    /// Domain validation failed.
    #[error(transparent)]
    Domain(#[from] AccountDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] AccountRepositoryError),
    /// The caller is not allowed to perform the operation.
    #[error("role {0} may not perform this operation")]
    Forbidden(Role),
    /// No profile exists for the user.
    #[error("profile not found for user {0}")]
    ProfileNotFound(UserId),
    /// The referenced provider does not exist.
    #[error("provider {0} not found")]
    ProviderNotFound(ProviderId),
}

/// Result type for account service operations.
pub type AccountServiceResult<T> = Result<T, AccountServiceError>;

/// Account administration service.
#[derive(Clone)]
pub struct AccountService<R, C>
where
    R: AccountRepository + ?Sized,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
}

impl<R, C> AccountService<R, C>
where
    R: AccountRepository + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a new account service.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self { repository, clock }
    }

    /// Registers a provider.
    ///
    /// # Errors
    ///
    /// Returns [`AccountServiceError`] when the name is blank or the
    /// repository rejects persistence.
    pub async fn register_provider(&self, name: &str) -> AccountServiceResult<Provider> {
        let provider = Provider::new(name, &*self.clock)?;
        self.repository.store_provider(&provider).await?;
        info!(provider_id = %provider.id(), "registered provider");
        Ok(provider)
    }

    /// Registers a profile, checking that an operator's provider exists.
    ///
    /// # Errors
    ///
    /// Returns [`AccountServiceError`] when validation fails, the provider is
    /// unknown, or the profile already exists.
    pub async fn register_profile(
        &self,
        request: RegisterProfileRequest,
    ) -> AccountServiceResult<Profile> {
        if let Some(provider_id) = request.provider_id {
            self.find_provider_or_error(provider_id).await?;
        }
        let mut profile = Profile::new(
            request.user_id,
            request.full_name,
            request.role,
            request.provider_id,
            &*self.clock,
        )?;
        if let Some(phone) = request.phone {
            profile = profile.with_phone(phone);
        }
        self.repository.store_profile(&profile).await?;
        Ok(profile)
    }

    /// Changes a user's role on behalf of an administrator.
    ///
    /// # Errors
    ///
    /// Returns [`AccountServiceError::Forbidden`] for non-admin callers,
    /// [`AccountServiceError::Domain`] when the provider is missing for an
    /// operator (or present for anyone else), and lookup errors for unknown
    /// profiles or providers.
    pub async fn update_user_role(
        &self,
        actor: &Actor,
        request: UpdateUserRoleRequest,
    ) -> AccountServiceResult<Profile> {
        if !actor.has_role(Role::Admin) {
            return Err(AccountServiceError::Forbidden(actor.role()));
        }
        let mut profile = self
            .repository
            .find_profile(request.user_id)
            .await?
            .ok_or(AccountServiceError::ProfileNotFound(request.user_id))?;
        if let Some(provider_id) = request.provider_id {
            self.find_provider_or_error(provider_id).await?;
        }
        profile.change_role(request.new_role, request.provider_id, &*self.clock)?;
        self.repository.update_profile(&profile).await?;
        info!(
            admin_id = %actor.user_id(),
            user_id = %request.user_id,
            role = %request.new_role,
            "updated user role"
        );
        Ok(profile)
    }

    /// Finds a profile by user identifier.
    ///
    /// # Errors
    ///
    /// Returns [`AccountServiceError::Repository`] when the lookup fails.
    pub async fn find_profile(&self, user_id: UserId) -> AccountServiceResult<Option<Profile>> {
        Ok(self.repository.find_profile(user_id).await?)
    }

    async fn find_provider_or_error(&self, id: ProviderId) -> AccountServiceResult<Provider> {
        self.repository
            .find_provider(id)
            .await?
            .ok_or(AccountServiceError::ProviderNotFound(id))
    }
}
