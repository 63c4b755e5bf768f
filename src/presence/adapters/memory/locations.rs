//! In-memory repository for operator locations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::account::domain::UserId;
use crate::presence::{
    domain::OperatorLocation,
    ports::{PresenceRepository, PresenceRepositoryError, PresenceRepositoryResult},
};

/// Thread-safe in-memory presence repository.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPresenceRepository {
    locations: Arc<RwLock<HashMap<UserId, OperatorLocation>>>,
}

impl InMemoryPresenceRepository {
    /// Creates an empty repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(message: String) -> PresenceRepositoryError {
    PresenceRepositoryError::persistence(std::io::Error::other(message))
}

#[async_trait]
impl PresenceRepository for InMemoryPresenceRepository {
    async fn upsert(&self, location: &OperatorLocation) -> PresenceRepositoryResult<()> {
        let mut locations = self
            .locations
            .write()
            .map_err(|err| lock_error(err.to_string()))?;
        locations.insert(location.operator_id, *location);
        Ok(())
    }

    async fn find(&self, operator_id: UserId) -> PresenceRepositoryResult<Option<OperatorLocation>> {
        let locations = self
            .locations
            .read()
            .map_err(|err| lock_error(err.to_string()))?;
        Ok(locations.get(&operator_id).copied())
    }

    async fn mark_offline(
        &self,
        operator_id: UserId,
        at: DateTime<Utc>,
    ) -> PresenceRepositoryResult<bool> {
        let mut locations = self
            .locations
            .write()
            .map_err(|err| lock_error(err.to_string()))?;
        let Some(location) = locations.get_mut(&operator_id) else {
            return Ok(false);
        };
        location.is_online = false;
        location.updated_at = at;
        Ok(true)
    }
}
