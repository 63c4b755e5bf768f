//! Durable estimate cache backed by one JSON file per key.

use async_trait::async_trait;
use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use std::io::ErrorKind;
use std::sync::Arc;

use crate::distance::{
    domain::{DistanceEstimate, RouteKey},
    ports::{DistanceCache, DistanceCacheError, DistanceCacheResult},
};

/// File-backed estimate cache confined to a single directory.
///
/// Entries survive restarts. The directory handle is capability-scoped, so
/// keys can never address files outside it.
#[derive(Debug, Clone)]
pub struct FileDistanceCache {
    dir: Arc<Dir>,
}

impl FileDistanceCache {
    /// Opens (creating if needed) the cache directory at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`DistanceCacheError`] when the directory cannot be created
    /// or opened.
    pub fn open(path: &Utf8Path) -> DistanceCacheResult<Self> {
        Dir::create_ambient_dir_all(path, ambient_authority())
            .map_err(DistanceCacheError::storage)?;
        let dir =
            Dir::open_ambient_dir(path, ambient_authority()).map_err(DistanceCacheError::storage)?;
        Ok(Self { dir: Arc::new(dir) })
    }

    /// Wraps an already opened directory.
    #[must_use]
    pub fn from_dir(dir: Dir) -> Self {
        Self { dir: Arc::new(dir) }
    }
}

fn entry_name(key: &RouteKey) -> String {
    format!("{key}.json")
}

#[async_trait]
impl DistanceCache for FileDistanceCache {
    async fn get(&self, key: &RouteKey) -> DistanceCacheResult<Option<DistanceEstimate>> {
        let dir = Arc::clone(&self.dir);
        let name = entry_name(key);
        tokio::task::spawn_blocking(move || match dir.read_to_string(&name) {
            Ok(contents) => serde_json::from_str::<DistanceEstimate>(&contents)
                .map(Some)
                .map_err(DistanceCacheError::storage),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(DistanceCacheError::storage(err)),
        })
        .await
        .map_err(DistanceCacheError::storage)?
    }

    async fn put(&self, key: &RouteKey, estimate: &DistanceEstimate) -> DistanceCacheResult<()> {
        let dir = Arc::clone(&self.dir);
        let name = entry_name(key);
        let contents = serde_json::to_vec(estimate).map_err(DistanceCacheError::storage)?;
        tokio::task::spawn_blocking(move || {
            dir.write(&name, contents)
                .map_err(DistanceCacheError::storage)
        })
        .await
        .map_err(DistanceCacheError::storage)?
    }
}
