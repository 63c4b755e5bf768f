//! Device-side storage for arrival PINs.
//!
//! The server returns a request's PIN exactly once, at creation. The client
//! keeps it so the customer can read it out when the operator arrives.

use async_trait::async_trait;
use camino::Utf8Path;
use cap_std::ambient_authority;
use cap_std::fs_utf8::Dir;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::request::domain::RequestId;

/// PIN storage failure.
#[derive(Debug, Clone, Error)]
#[error("pin storage error: {0}")]
pub struct PinStoreError(Arc<dyn std::error::Error + Send + Sync>);

impl PinStoreError {
    /// Wraps a storage error.
    pub fn storage(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self(Arc::new(err))
    }
}

/// Result type for PIN storage.
pub type PinStoreResult<T> = Result<T, PinStoreError>;

/// Keeps the PIN of each request the device created.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PinStore: Send + Sync {
    /// Remembers the PIN for a request, replacing any previous one.
    async fn save(&self, request_id: RequestId, pin: &str) -> PinStoreResult<()>;

    /// Returns the PIN for a request, if one was saved.
    async fn load(&self, request_id: RequestId) -> PinStoreResult<Option<String>>;

    /// Drops the PIN once the request is over.
    async fn forget(&self, request_id: RequestId) -> PinStoreResult<()>;
}

/// PINs held for the life of the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryPinStore {
    pins: Arc<RwLock<HashMap<RequestId, String>>>,
}

impl MemoryPinStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PinStore for MemoryPinStore {
    async fn save(&self, request_id: RequestId, pin: &str) -> PinStoreResult<()> {
        self.pins.write().await.insert(request_id, pin.to_owned());
        Ok(())
    }

    async fn load(&self, request_id: RequestId) -> PinStoreResult<Option<String>> {
        Ok(self.pins.read().await.get(&request_id).cloned())
    }

    async fn forget(&self, request_id: RequestId) -> PinStoreResult<()> {
        self.pins.write().await.remove(&request_id);
        Ok(())
    }
}

/// PINs kept as one small file per request inside a directory.
#[derive(Debug, Clone)]
pub struct FilePinStore {
    dir: Arc<Dir>,
}

impl FilePinStore {
    /// Opens (creating if needed) the PIN directory at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`PinStoreError`] when the directory cannot be created or
    /// opened.
    pub fn open(path: &Utf8Path) -> PinStoreResult<Self> {
        Dir::create_ambient_dir_all(path, ambient_authority()).map_err(PinStoreError::storage)?;
        let dir = Dir::open_ambient_dir(path, ambient_authority()).map_err(PinStoreError::storage)?;
        Ok(Self { dir: Arc::new(dir) })
    }
}

fn pin_file(request_id: RequestId) -> String {
    format!("{request_id}.pin")
}

#[async_trait]
impl PinStore for FilePinStore {
    async fn save(&self, request_id: RequestId, pin: &str) -> PinStoreResult<()> {
        let dir = Arc::clone(&self.dir);
        let name = pin_file(request_id);
        let contents = pin.to_owned();
        tokio::task::spawn_blocking(move || {
            dir.write(&name, contents).map_err(PinStoreError::storage)
        })
        .await
        .map_err(PinStoreError::storage)?
    }

    async fn load(&self, request_id: RequestId) -> PinStoreResult<Option<String>> {
        let dir = Arc::clone(&self.dir);
        let name = pin_file(request_id);
        tokio::task::spawn_blocking(move || match dir.read_to_string(&name) {
            Ok(contents) => Ok(Some(contents.trim().to_owned())),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(PinStoreError::storage(err)),
        })
        .await
        .map_err(PinStoreError::storage)?
    }

    async fn forget(&self, request_id: RequestId) -> PinStoreResult<()> {
        let dir = Arc::clone(&self.dir);
        let name = pin_file(request_id);
        tokio::task::spawn_blocking(move || match dir.remove_file(&name) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(PinStoreError::storage(err)),
        })
        .await
        .map_err(PinStoreError::storage)?
    }
}
