//! The authenticated caller of an operation.

use super::{ProviderId, Role, UserId};
use serde::{Deserialize, Serialize};

/// Authenticated caller of a dispatch operation.
///
/// Actors are produced by the session layer and passed explicitly to every
/// service call; services never look up "the current user" on their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Actor {
    user_id: UserId,
    role: Role,
    provider_id: Option<ProviderId>,
}

impl Actor {
    /// Creates an actor from its raw parts.
    #[must_use]
    pub const fn new(user_id: UserId, role: Role, provider_id: Option<ProviderId>) -> Self {
        Self {
            user_id,
            role,
            provider_id,
        }
    }

    /// Creates a requesting customer.
    #[must_use]
    pub const fn user(user_id: UserId) -> Self {
        Self::new(user_id, Role::User, None)
    }

    /// Creates an operator working for `provider_id`.
    #[must_use]
    pub const fn operator(user_id: UserId, provider_id: ProviderId) -> Self {
        Self::new(user_id, Role::Operator, Some(provider_id))
    }

    /// Creates an administrator.
    #[must_use]
    pub const fn admin(user_id: UserId) -> Self {
        Self::new(user_id, Role::Admin, None)
    }

    /// Creates an oversight (MOP) actor.
    #[must_use]
    pub const fn mop(user_id: UserId) -> Self {
        Self::new(user_id, Role::Mop, None)
    }

    /// Returns the actor's user identifier.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the actor's role.
    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    /// Returns the provider the actor works for, if any.
    #[must_use]
    pub const fn provider_id(&self) -> Option<ProviderId> {
        self.provider_id
    }

    /// Returns `true` when the actor holds `role`.
    #[must_use]
    pub fn has_role(&self, role: Role) -> bool {
        self.role == role
    }

    /// Returns `true` for roles allowed to read any request and aggregate data.
    #[must_use]
    pub const fn is_overseer(&self) -> bool {
        matches!(self.role, Role::Admin | Role::Mop)
    }
}
