//! PIN hashing port.

use crate::request::domain::{PinHash, RequestPin};
use thiserror::Error;

/// Hashing or verification failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("PIN hashing failed: {0}")]
pub struct PinHashError(pub String);

/// One-way PIN hashing.
///
/// Implementations are expected to be deliberately slow; callers run them
/// off the async executor.
pub trait PinHasher: Send + Sync {
    /// Hashes a PIN with a fresh salt.
    ///
    /// # Errors
    ///
    /// Returns [`PinHashError`] when hashing fails.
    fn hash(&self, pin: &RequestPin) -> Result<PinHash, PinHashError>;

    /// Checks a PIN against a stored hash.
    ///
    /// # Errors
    ///
    /// Returns [`PinHashError`] when the stored hash cannot be interpreted.
    fn verify(&self, pin: &RequestPin, hash: &PinHash) -> Result<bool, PinHashError>;
}
