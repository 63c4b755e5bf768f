//! Repository port for operator locations.

use crate::account::domain::UserId;
use crate::presence::domain::OperatorLocation;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for presence repository operations.
pub type PresenceRepositoryResult<T> = Result<T, PresenceRepositoryError>;

/// One location row per operator, overwritten on every report.
#[async_trait]
pub trait PresenceRepository: Send + Sync {
    /// Inserts or overwrites the operator's row.
    async fn upsert(&self, location: &OperatorLocation) -> PresenceRepositoryResult<()>;

    /// Returns the operator's row, if any.
    async fn find(&self, operator_id: UserId) -> PresenceRepositoryResult<Option<OperatorLocation>>;

    /// Flags the operator offline, keeping the last coordinates.
    ///
    /// Returns `false` when the operator never reported a location.
    async fn mark_offline(
        &self,
        operator_id: UserId,
        at: DateTime<Utc>,
    ) -> PresenceRepositoryResult<bool>;
}

/// Errors returned by presence repository implementations.
#[derive(Debug, Clone, Error)]
pub enum PresenceRepositoryError {
    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl PresenceRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
