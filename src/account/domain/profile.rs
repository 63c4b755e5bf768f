//! Profiles and providers.

use super::{AccountDomainError, ProviderId, Role, UserId};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Fleet or company that employs operators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    id: ProviderId,
    name: String,
    created_at: DateTime<Utc>,
}

impl Provider {
    /// Creates a provider with a validated name.
    ///
    /// # Errors
    ///
    /// Returns [`AccountDomainError::EmptyProviderName`] when the trimmed
    /// name is empty.
    pub fn new(name: impl Into<String>, clock: &impl Clock) -> Result<Self, AccountDomainError> {
        let raw = name.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AccountDomainError::EmptyProviderName);
        }
        Ok(Self {
            id: ProviderId::new(),
            name: trimmed.to_owned(),
            created_at: clock.utc(),
        })
    }

    /// Reconstructs a provider from persisted storage.
    #[must_use]
    pub const fn from_persisted(id: ProviderId, name: String, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            created_at,
        }
    }

    /// Returns the provider identifier.
    #[must_use]
    pub const fn id(&self) -> ProviderId {
        self.id
    }

    /// Returns the display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Parameter object for reconstructing a persisted profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedProfileData {
    /// Persisted user identifier.
    pub user_id: UserId,
    /// Persisted display name.
    pub full_name: String,
    /// Persisted phone number.
    pub phone: Option<String>,
    /// Persisted role.
    pub role: Role,
    /// Persisted provider association.
    pub provider_id: Option<ProviderId>,
    /// Persisted creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Persisted update timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Account profile.
///
/// A profile holds a provider exactly when its role is [`Role::Operator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    user_id: UserId,
    full_name: String,
    phone: Option<String>,
    role: Role,
    provider_id: Option<ProviderId>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Profile {
    /// Creates a profile, enforcing the role/provider pairing.
    ///
    /// # Errors
    ///
    /// Returns [`AccountDomainError`] when the name is blank or the
    /// provider does not match the role.
    pub fn new(
        user_id: UserId,
        full_name: impl Into<String>,
        role: Role,
        provider_id: Option<ProviderId>,
        clock: &impl Clock,
    ) -> Result<Self, AccountDomainError> {
        let raw = full_name.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AccountDomainError::EmptyFullName);
        }
        check_provider_pairing(role, provider_id)?;
        let timestamp = clock.utc();
        Ok(Self {
            user_id,
            full_name: trimmed.to_owned(),
            phone: None,
            role,
            provider_id,
            created_at: timestamp,
            updated_at: timestamp,
        })
    }

    /// Sets the contact phone number shown to the counterparty.
    #[must_use]
    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        let raw = phone.into();
        let trimmed = raw.trim();
        self.phone = (!trimmed.is_empty()).then(|| trimmed.to_owned());
        self
    }

    /// Reconstructs a profile from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedProfileData) -> Self {
        Self {
            user_id: data.user_id,
            full_name: data.full_name,
            phone: data.phone,
            role: data.role,
            provider_id: data.provider_id,
            created_at: data.created_at,
            updated_at: data.updated_at,
        }
    }

    /// Returns the user identifier.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the display name.
    #[must_use]
    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Returns the contact phone number, if any.
    #[must_use]
    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    /// Returns the role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns the provider, present only for operators.
    #[must_use]
    pub const fn provider_id(&self) -> Option<ProviderId> {
        self.provider_id
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns the latest update timestamp.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Changes the role and provider together.
    ///
    /// # Errors
    ///
    /// Returns [`AccountDomainError::MissingProvider`] or
    /// [`AccountDomainError::UnexpectedProvider`] when the pairing is
    /// invalid; the profile is left untouched in that case.
    pub fn change_role(
        &mut self,
        role: Role,
        provider_id: Option<ProviderId>,
        clock: &impl Clock,
    ) -> Result<(), AccountDomainError> {
        check_provider_pairing(role, provider_id)?;
        self.role = role;
        self.provider_id = provider_id;
        self.updated_at = clock.utc();
        Ok(())
    }
}

fn check_provider_pairing(
    role: Role,
    provider_id: Option<ProviderId>,
) -> Result<(), AccountDomainError> {
    match (role.requires_provider(), provider_id) {
        (true, None) => Err(AccountDomainError::MissingProvider),
        (false, Some(_)) => Err(AccountDomainError::UnexpectedProvider { role }),
        _ => Ok(()),
    }
}
