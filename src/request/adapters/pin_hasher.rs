//! bcrypt-backed PIN hashing.

use crate::request::{
    domain::{PinHash, RequestPin},
    ports::{PinHashError, PinHasher},
};

/// Hashes PINs with bcrypt at a configurable cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BcryptPinHasher {
    cost: u32,
}

impl BcryptPinHasher {
    /// Creates a hasher; bcrypt accepts costs from 4 to 31.
    #[must_use]
    pub const fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptPinHasher {
    fn default() -> Self {
        Self::new(bcrypt::DEFAULT_COST)
    }
}

impl PinHasher for BcryptPinHasher {
    fn hash(&self, pin: &RequestPin) -> Result<PinHash, PinHashError> {
        bcrypt::hash(pin.expose(), self.cost)
            .map(PinHash::new)
            .map_err(|err| PinHashError(err.to_string()))
    }

    fn verify(&self, pin: &RequestPin, hash: &PinHash) -> Result<bool, PinHashError> {
        bcrypt::verify(pin.expose(), hash.as_str()).map_err(|err| PinHashError(err.to_string()))
    }
}
