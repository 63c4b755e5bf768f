//! Estimate cache port.

use crate::distance::domain::{DistanceEstimate, RouteKey};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for cache operations.
pub type DistanceCacheResult<T> = Result<T, DistanceCacheError>;

/// Cache of provider estimates keyed by rounded coordinates.
#[async_trait]
pub trait DistanceCache: Send + Sync {
    /// Looks up a cached estimate.
    async fn get(&self, key: &RouteKey) -> DistanceCacheResult<Option<DistanceEstimate>>;

    /// Stores an estimate, replacing any previous entry.
    async fn put(&self, key: &RouteKey, estimate: &DistanceEstimate) -> DistanceCacheResult<()>;
}

/// Cache storage failure.
#[derive(Debug, Clone, Error)]
#[error("distance cache error: {0}")]
pub struct DistanceCacheError(Arc<dyn std::error::Error + Send + Sync>);

impl DistanceCacheError {
    /// Wraps a storage error.
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Arc::new(err))
    }
}
