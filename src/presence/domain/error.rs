//! Presence validation errors.

use crate::account::domain::Role;
use crate::distance::domain::DistanceError;
use thiserror::Error;

/// Errors raised while validating location reports.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PresenceDomainError {
    /// Coordinates failed validation.
    #[error(transparent)]
    Location(#[from] DistanceError),
    /// Heading outside `[0, 360)` degrees.
    #[error("heading {0} must be within [0, 360)")]
    InvalidHeading(f64),
    /// Only operators report locations.
    #[error("role {0} does not report a location")]
    RoleNotAllowed(Role),
}
