//! Two-tier estimate cache.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

use crate::distance::{
    domain::{DistanceEstimate, RouteKey},
    ports::{DistanceCache, DistanceCacheResult},
};

/// Fast tier in front of a durable tier.
///
/// Reads try the fast tier first and promote durable hits. Writes go to
/// both tiers; a durable-tier write failure is logged and does not fail the
/// write, since the fast tier already holds the entry.
#[derive(Clone)]
pub struct TieredDistanceCache {
    fast: Arc<dyn DistanceCache>,
    durable: Arc<dyn DistanceCache>,
}

impl TieredDistanceCache {
    /// Combines two caches.
    #[must_use]
    pub const fn new(fast: Arc<dyn DistanceCache>, durable: Arc<dyn DistanceCache>) -> Self {
        Self { fast, durable }
    }
}

#[async_trait]
impl DistanceCache for TieredDistanceCache {
    async fn get(&self, key: &RouteKey) -> DistanceCacheResult<Option<DistanceEstimate>> {
        if let Some(hit) = self.fast.get(key).await? {
            return Ok(Some(hit));
        }
        let durable_hit = self.durable.get(key).await?;
        if let Some(estimate) = durable_hit {
            self.fast.put(key, &estimate).await?;
        }
        Ok(durable_hit)
    }

    async fn put(&self, key: &RouteKey, estimate: &DistanceEstimate) -> DistanceCacheResult<()> {
        self.fast.put(key, estimate).await?;
        if let Err(err) = self.durable.put(key, estimate).await {
            warn!(%key, error = %err, "durable distance cache write failed");
        }
        Ok(())
    }
}
