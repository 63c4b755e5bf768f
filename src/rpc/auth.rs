//! Bearer-token sessions.
//!
//! Tokens are HS256 JWTs whose subject is a profile id. The role is not
//! trusted from the token: [`Session`] loads the profile on every call so
//! an administrator's role change applies to the very next request.

use super::{ApiError, RpcState};
use crate::account::domain::{Actor, UserId};
use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::{header, request::Parts};
use chrono::TimeDelta;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use mockable::Clock;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Registered claims carried by a session token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Profile id.
    pub sub: UserId,
    /// Issued-at, seconds since the epoch.
    pub iat: i64,
    /// Expiry, seconds since the epoch.
    pub exp: i64,
}

/// Token encoding and verification failures.
#[derive(Debug, Error)]
pub enum SessionError {
    /// No `Authorization: Bearer` header.
    #[error("missing bearer token")]
    Missing,
    /// The token is malformed, expired, or signed with another key.
    #[error("invalid session token: {0}")]
    Invalid(#[source] jsonwebtoken::errors::Error),
    /// Signing failed.
    #[error("could not sign session token: {0}")]
    Encode(#[source] jsonwebtoken::errors::Error),
}

impl From<SessionError> for ApiError {
    fn from(err: SessionError) -> Self {
        match err {
            SessionError::Missing | SessionError::Invalid(_) => {
                Self::unauthenticated(err.to_string())
            }
            SessionError::Encode(_) => Self::internal(&err),
        }
    }
}

/// Shared-secret keys for issuing and verifying tokens.
#[derive(Clone)]
pub struct SessionKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKeys").finish_non_exhaustive()
    }
}

impl SessionKeys {
    /// Derives both keys from `secret`.
    #[must_use]
    pub fn from_secret(secret: &[u8]) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Signs a token for `user_id` valid for `ttl`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Encode`] when signing fails.
    pub fn issue(
        &self,
        user_id: UserId,
        ttl: TimeDelta,
        clock: &impl Clock,
    ) -> Result<String, SessionError> {
        let now = clock.utc();
        let claims = Claims {
            sub: user_id,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(SessionError::Encode)
    }

    /// Checks the signature and expiry of `token`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Invalid`] for any rejected token.
    pub fn verify(&self, token: &str) -> Result<Claims, SessionError> {
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(SessionError::Invalid)
    }

    fn claims_from(&self, parts: &Parts) -> Result<Claims, SessionError> {
        let token = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.strip_prefix("Bearer "))
            .ok_or(SessionError::Missing)?;
        self.verify(token.trim())
    }
}

/// A verified token, before any profile lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenSubject(pub UserId);

#[async_trait]
impl FromRequestParts<RpcState> for TokenSubject {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &RpcState) -> Result<Self, ApiError> {
        Ok(Self(state.keys.claims_from(parts)?.sub))
    }
}

/// The caller behind a verified token, resolved against stored profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Session(pub Actor);

#[async_trait]
impl FromRequestParts<RpcState> for Session {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &RpcState) -> Result<Self, ApiError> {
        let claims = state.keys.claims_from(parts)?;
        let profile = state
            .dispatch
            .accounts
            .find_profile(claims.sub)
            .await?
            .ok_or_else(|| ApiError::unauthenticated("no profile for this session"))?;
        Ok(Self(Actor::new(
            profile.user_id(),
            profile.role(),
            profile.provider_id(),
        )))
    }
}
