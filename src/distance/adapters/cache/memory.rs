//! In-memory estimate cache.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::distance::{
    domain::{DistanceEstimate, RouteKey},
    ports::{DistanceCache, DistanceCacheError, DistanceCacheResult},
};

const DEFAULT_CAPACITY: usize = 10_000;

/// Bounded, thread-safe in-memory estimate cache.
///
/// When full, an arbitrary entry is evicted to make room; the durable tier
/// still holds it.
#[derive(Debug, Clone)]
pub struct InMemoryDistanceCache {
    entries: Arc<RwLock<HashMap<RouteKey, DistanceEstimate>>>,
    capacity: usize,
}

impl Default for InMemoryDistanceCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }
}

impl InMemoryDistanceCache {
    /// Creates a cache with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cache holding at most `capacity` entries (minimum one).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            capacity: capacity.max(1),
        }
    }

    /// Returns the number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().map_or(0, |entries| entries.len())
    }

    /// Returns `true` when nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn lock_error(message: String) -> DistanceCacheError {
    DistanceCacheError::storage(std::io::Error::other(message))
}

#[async_trait]
impl DistanceCache for InMemoryDistanceCache {
    async fn get(&self, key: &RouteKey) -> DistanceCacheResult<Option<DistanceEstimate>> {
        let entries = self
            .entries
            .read()
            .map_err(|err| lock_error(err.to_string()))?;
        Ok(entries.get(key).copied())
    }

    async fn put(&self, key: &RouteKey, estimate: &DistanceEstimate) -> DistanceCacheResult<()> {
        let mut entries = self
            .entries
            .write()
            .map_err(|err| lock_error(err.to_string()))?;
        if entries.len() >= self.capacity && !entries.contains_key(key) {
            let evicted = entries.keys().next().copied();
            if let Some(evicted_key) = evicted {
                entries.remove(&evicted_key);
            }
        }
        entries.insert(*key, *estimate);
        Ok(())
    }
}
