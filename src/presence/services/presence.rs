//! Location heartbeats and presence lookups.

use crate::account::domain::{Actor, Role, UserId};
use crate::presence::{
    domain::{
        DEFAULT_STALE_AFTER_SECS, LocationFix, OperatorLocation, PresenceDomainError,
        PresenceView, presence_state,
    },
    ports::{PresenceRepository, PresenceRepositoryError},
};
use chrono::TimeDelta;
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Service-level errors for presence operations.
#[derive(Debug, Error)]
pub enum PresenceServiceError {
    /// Validation failed.
    #[error(transparent)]
    Domain(#[from] PresenceDomainError),
    /// Repository operation failed.
    #[error(transparent)]
    Repository(#[from] PresenceRepositoryError),
}

/// Result type for presence operations.
pub type PresenceServiceResult<T> = Result<T, PresenceServiceError>;

/// Operator presence service.
#[derive(Clone)]
pub struct PresenceService<R, C>
where
    R: PresenceRepository + ?Sized,
    C: Clock + Send + Sync,
{
    repository: Arc<R>,
    clock: Arc<C>,
    stale_after: TimeDelta,
}

impl<R, C> PresenceService<R, C>
where
    R: PresenceRepository + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a presence service with the default stale window.
    #[must_use]
    pub const fn new(repository: Arc<R>, clock: Arc<C>) -> Self {
        Self {
            repository,
            clock,
            stale_after: TimeDelta::seconds(DEFAULT_STALE_AFTER_SECS),
        }
    }

    /// Replaces the stale window.
    #[must_use]
    pub const fn with_stale_after(mut self, stale_after: TimeDelta) -> Self {
        self.stale_after = stale_after;
        self
    }

    /// Records the calling operator's position.
    ///
    /// # Errors
    ///
    /// Returns [`PresenceDomainError::RoleNotAllowed`] for non-operators.
    pub async fn upsert_location(
        &self,
        actor: &Actor,
        fix: LocationFix,
        is_online: bool,
    ) -> PresenceServiceResult<OperatorLocation> {
        ensure_operator(actor)?;
        let location = OperatorLocation::reported(actor.user_id(), fix, is_online, self.clock.utc());
        self.repository.upsert(&location).await?;
        debug!(operator_id = %actor.user_id(), is_online, "location updated");
        Ok(location)
    }

    /// Signs the calling operator off, keeping the last coordinates.
    ///
    /// # Errors
    ///
    /// Returns [`PresenceDomainError::RoleNotAllowed`] for non-operators.
    pub async fn go_offline(&self, actor: &Actor) -> PresenceServiceResult<()> {
        ensure_operator(actor)?;
        let known = self
            .repository
            .mark_offline(actor.user_id(), self.clock.utc())
            .await?;
        info!(operator_id = %actor.user_id(), known, "operator went offline");
        Ok(())
    }

    /// Returns an operator's location and liveness.
    ///
    /// # Errors
    ///
    /// Returns [`PresenceServiceError::Repository`] when the lookup fails.
    pub async fn presence_of(&self, operator_id: UserId) -> PresenceServiceResult<PresenceView> {
        let location = self.repository.find(operator_id).await?;
        let state = presence_state(location.as_ref(), self.clock.utc(), self.stale_after);
        Ok(PresenceView { location, state })
    }
}

fn ensure_operator(actor: &Actor) -> Result<(), PresenceDomainError> {
    if actor.has_role(Role::Operator) {
        Ok(())
    } else {
        Err(PresenceDomainError::RoleNotAllowed(actor.role()))
    }
}
