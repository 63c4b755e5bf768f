//! HTTP surface: one `POST /rpc/<name>` endpoint per remote procedure.
//!
//! Handlers are thin. They authenticate, decode the body, call exactly one
//! service operation, and map its error through [`ApiError`].

mod auth;
mod error;
mod handlers;
mod router;
pub mod wire;

pub use auth::{Claims, Session, SessionError, SessionKeys, TokenSubject};
pub use error::ApiError;
pub use router::{RpcLimits, router};

use crate::dispatch::Dispatch;
use axum::Json;
use axum::async_trait;
use axum::extract::{FromRequest, Request};
use serde::de::DeserializeOwned;
use std::sync::Arc;

/// State shared by every handler.
#[derive(Clone)]
pub struct RpcState {
    dispatch: Arc<Dispatch>,
    keys: Arc<SessionKeys>,
}

impl RpcState {
    /// Bundles the services with the session keys.
    #[must_use]
    pub fn new(dispatch: Arc<Dispatch>, keys: SessionKeys) -> Self {
        Self {
            dispatch,
            keys: Arc::new(keys),
        }
    }

    /// The wired services.
    #[must_use]
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }
}

/// JSON body whose rejections use the RPC error shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RpcBody<T>(pub T);

#[async_trait]
impl<S, T> FromRequest<S> for RpcBody<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, ApiError> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}

#[cfg(test)]
mod tests;
