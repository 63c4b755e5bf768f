//! Error types for request validation and lifecycle transitions.

use super::{RequestId, RequestStatus, ServiceType};
use crate::account::domain::Role;
use thiserror::Error;

/// Errors returned by the request domain.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RequestDomainError {
    /// Tows need somewhere to take the vehicle.
    #[error("tow requests require a dropoff location")]
    MissingDropoff,

    /// Tows need a truck class.
    #[error("tow requests require a tow type")]
    MissingTowType,

    /// Only tows carry a truck class.
    #[error("tow type is not applicable to {0} requests")]
    UnexpectedTowType(ServiceType),

    /// The details do not belong to the service type.
    #[error("service details do not match service type {0}")]
    MismatchedDetails(ServiceType),

    /// Fuel quantity outside the accepted range.
    #[error("fuel delivery must be between 1 and {max} gallons, got {gallons}")]
    InvalidFuelAmount {
        /// Gallons requested.
        gallons: u32,
        /// Largest accepted quantity.
        max: u32,
    },

    /// A location lies outside the service area.
    #[error("location ({lat}, {lng}) is outside the service area")]
    OutsideServiceArea {
        /// Latitude in degrees.
        lat: f64,
        /// Longitude in degrees.
        lng: f64,
    },

    /// A free-text field exceeds its limit.
    #[error("{field} must be at most {max} characters")]
    FieldTooLong {
        /// Offending field.
        field: &'static str,
        /// Character limit.
        max: usize,
    },

    /// PIN input is not exactly four digits.
    #[error("PIN must be exactly four digits")]
    MalformedPin,

    /// Cancellation reason is empty after trimming.
    #[error("a cancellation reason is required")]
    EmptyCancellationReason,

    /// Star rating outside 1..=5.
    #[error("rating must be between 1 and 5 stars, got {0}")]
    InvalidStars(u8),

    /// Chat message is empty after trimming.
    #[error("message must not be empty")]
    EmptyMessage,

    /// The caller's role cannot perform the operation.
    #[error("role {0} may not perform this operation")]
    RoleNotAllowed(Role),

    /// An operator session carries no provider.
    #[error("operator is not attached to a provider")]
    OperatorWithoutProvider,

    /// The caller is neither the requester nor the assigned operator.
    #[error("caller is not a party to request {0}")]
    NotAParty(RequestId),

    /// The caller is not the operator assigned to the request.
    #[error("caller is not the operator assigned to request {0}")]
    NotAssignedOperator(RequestId),

    /// The lifecycle does not allow the move.
    #[error("request {id} cannot move from {from} to {to}")]
    InvalidStateTransition {
        /// Request identifier.
        id: RequestId,
        /// Current status.
        from: RequestStatus,
        /// Requested status.
        to: RequestStatus,
    },

    /// The request is completed or cancelled.
    #[error("request {id} is already {status}")]
    RequestClosed {
        /// Request identifier.
        id: RequestId,
        /// Terminal status.
        status: RequestStatus,
    },

    /// Ratings are accepted only after completion.
    #[error("request {id} is {status}; only completed requests can be rated")]
    NotRateable {
        /// Request identifier.
        id: RequestId,
        /// Current status.
        status: RequestStatus,
    },

    /// Chat is open only while an operator works the request.
    #[error("request {id} is {status}; messages are closed")]
    MessagingClosed {
        /// Request identifier.
        id: RequestId,
        /// Current status.
        status: RequestStatus,
    },
}

/// Error returned while parsing a request status.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown request status: {0}")]
pub struct ParseRequestStatusError(pub String);

/// Error returned while parsing a service type.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown service type: {0}")]
pub struct ParseServiceTypeError(pub String);

/// Error returned while parsing a tow type.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown tow type: {0}")]
pub struct ParseTowTypeError(pub String);
