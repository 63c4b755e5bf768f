//! Mapping from service errors to HTTP responses.
//!
//! Every failure leaves the server as `{success: false, error: {code,
//! message}}`. Codes are stable identifiers clients branch on; messages
//! are for people. Persistence details are logged and never sent.

use super::wire::{ErrorBody, ErrorDetail};
use crate::account::{
    domain::AccountDomainError, ports::AccountRepositoryError, services::AccountServiceError,
};
use crate::distance::domain::DistanceError;
use crate::presence::{
    domain::PresenceDomainError, ports::PresenceRepositoryError, services::PresenceServiceError,
};
use crate::pricing::{
    domain::PricingDomainError, ports::PricingRepositoryError, services::PricingServiceError,
};
use crate::request::{
    domain::RequestDomainError,
    ports::{FeedbackRepositoryError, RequestRepositoryError},
    services::{FeedbackServiceError, OversightServiceError, RequestServiceError},
};
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

/// A rejected RPC.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{code}: {message}")]
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    /// Creates an error with an explicit status and code.
    #[must_use]
    pub fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    /// 400 `validation_error`.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "validation_error", message)
    }

    /// 401 `unauthenticated`.
    #[must_use]
    pub fn unauthenticated(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "unauthenticated", message)
    }

    /// 403 `forbidden`.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "forbidden", message)
    }

    /// 404 `not_found`.
    #[must_use]
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "not_found", message)
    }

    /// 409 with the given conflict code.
    #[must_use]
    pub fn conflict(code: &'static str, message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, code, message)
    }

    /// 500 `internal`; the cause is logged, not returned.
    #[must_use]
    pub fn internal(cause: &dyn std::error::Error) -> Self {
        error!(error = %cause, "rpc failed");
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            "internal",
            "internal server error",
        )
    }

    /// HTTP status.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Stable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.code
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            error: ErrorDetail {
                code: self.code.to_owned(),
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<RequestDomainError> for ApiError {
    fn from(err: RequestDomainError) -> Self {
        let message = err.to_string();
        match err {
            RequestDomainError::MissingDropoff
            | RequestDomainError::MissingTowType
            | RequestDomainError::UnexpectedTowType(_)
            | RequestDomainError::MismatchedDetails(_)
            | RequestDomainError::InvalidFuelAmount { .. }
            | RequestDomainError::FieldTooLong { .. }
            | RequestDomainError::InvalidStars(_)
            | RequestDomainError::EmptyMessage => Self::validation(message),
            RequestDomainError::OutsideServiceArea { .. } => {
                Self::new(StatusCode::BAD_REQUEST, "outside_service_area", message)
            }
            RequestDomainError::MalformedPin => {
                Self::new(StatusCode::BAD_REQUEST, "malformed_pin", message)
            }
            RequestDomainError::EmptyCancellationReason => {
                Self::new(StatusCode::BAD_REQUEST, "missing_reason", message)
            }
            RequestDomainError::RoleNotAllowed(_)
            | RequestDomainError::OperatorWithoutProvider
            | RequestDomainError::NotAParty(_)
            | RequestDomainError::NotAssignedOperator(_) => Self::forbidden(message),
            RequestDomainError::InvalidStateTransition { .. } => {
                Self::conflict("invalid_transition", message)
            }
            RequestDomainError::RequestClosed { .. } => Self::conflict("request_closed", message),
            RequestDomainError::NotRateable { .. } => Self::conflict("not_rateable", message),
            RequestDomainError::MessagingClosed { .. } => {
                Self::conflict("messaging_closed", message)
            }
        }
    }
}

impl From<RequestRepositoryError> for ApiError {
    fn from(err: RequestRepositoryError) -> Self {
        match err {
            RequestRepositoryError::NotFound(_) => Self::not_found(err.to_string()),
            RequestRepositoryError::UserHasOpenRequest(_)
            | RequestRepositoryError::OperatorHasOpenRequest(_) => {
                Self::conflict("active_request_exists", err.to_string())
            }
            RequestRepositoryError::DuplicateRequest(_) => {
                Self::conflict("conflict", err.to_string())
            }
            RequestRepositoryError::Persistence(_) => Self::internal(&err),
        }
    }
}

impl From<RequestServiceError> for ApiError {
    fn from(err: RequestServiceError) -> Self {
        match err {
            RequestServiceError::Domain(inner) => inner.into(),
            RequestServiceError::Repository(inner) => inner.into(),
            RequestServiceError::Accounts(inner) => inner.into(),
            RequestServiceError::Hashing(inner) => Self::internal(&inner),
            RequestServiceError::NotFound(_) => Self::not_found(err.to_string()),
            RequestServiceError::Forbidden(_) => Self::forbidden(err.to_string()),
            RequestServiceError::RequestNoLongerAvailable(_) => {
                Self::conflict("request_no_longer_available", err.to_string())
            }
            RequestServiceError::PinLocked { .. } => {
                Self::new(StatusCode::LOCKED, "pin_locked", err.to_string())
            }
        }
    }
}

impl From<FeedbackRepositoryError> for ApiError {
    fn from(err: FeedbackRepositoryError) -> Self {
        match err {
            FeedbackRepositoryError::DuplicateRating(_) => {
                Self::conflict("already_rated", err.to_string())
            }
            FeedbackRepositoryError::Persistence(_) => Self::internal(&err),
        }
    }
}

impl From<FeedbackServiceError> for ApiError {
    fn from(err: FeedbackServiceError) -> Self {
        match err {
            FeedbackServiceError::Domain(inner) => inner.into(),
            FeedbackServiceError::Requests(inner) => inner.into(),
            FeedbackServiceError::Repository(inner) => inner.into(),
            FeedbackServiceError::NotFound(_) => Self::not_found(err.to_string()),
        }
    }
}

impl From<OversightServiceError> for ApiError {
    fn from(err: OversightServiceError) -> Self {
        match err {
            OversightServiceError::Forbidden(_) => Self::forbidden(err.to_string()),
            OversightServiceError::Requests(inner) => inner.into(),
            OversightServiceError::Feedback(inner) => inner.into(),
        }
    }
}

impl From<AccountDomainError> for ApiError {
    fn from(err: AccountDomainError) -> Self {
        Self::validation(err.to_string())
    }
}

impl From<AccountRepositoryError> for ApiError {
    fn from(err: AccountRepositoryError) -> Self {
        match err {
            AccountRepositoryError::ProfileNotFound(_) => Self::not_found(err.to_string()),
            AccountRepositoryError::DuplicateProfile(_)
            | AccountRepositoryError::DuplicateProvider(_) => {
                Self::conflict("conflict", err.to_string())
            }
            AccountRepositoryError::Persistence(_) => Self::internal(&err),
        }
    }
}

impl From<AccountServiceError> for ApiError {
    fn from(err: AccountServiceError) -> Self {
        match err {
            AccountServiceError::Domain(inner) => inner.into(),
            AccountServiceError::Repository(inner) => inner.into(),
            AccountServiceError::Forbidden(_) => Self::forbidden(err.to_string()),
            AccountServiceError::ProfileNotFound(_) | AccountServiceError::ProviderNotFound(_) => {
                Self::not_found(err.to_string())
            }
        }
    }
}

impl From<DistanceError> for ApiError {
    fn from(err: DistanceError) -> Self {
        let message = err.to_string();
        match err {
            DistanceError::InvalidCoordinate { .. } | DistanceError::InvalidBoundingBox => {
                Self::validation(message)
            }
            DistanceError::OutOfServiceArea { .. } => {
                Self::new(StatusCode::BAD_REQUEST, "outside_service_area", message)
            }
            DistanceError::TooClose { .. } => {
                Self::new(StatusCode::BAD_REQUEST, "invalid_trip", message)
            }
        }
    }
}

impl From<PricingDomainError> for ApiError {
    fn from(err: PricingDomainError) -> Self {
        Self::validation(err.to_string())
    }
}

impl From<PricingRepositoryError> for ApiError {
    fn from(err: PricingRepositoryError) -> Self {
        match err {
            PricingRepositoryError::RuleNotFound(_) => Self::not_found(err.to_string()),
            PricingRepositoryError::DuplicateRule(_) => Self::conflict("conflict", err.to_string()),
            PricingRepositoryError::Persistence(_) => Self::internal(&err),
        }
    }
}

impl From<PricingServiceError> for ApiError {
    fn from(err: PricingServiceError) -> Self {
        match err {
            PricingServiceError::Domain(inner) => inner.into(),
            PricingServiceError::Repository(inner) => inner.into(),
            PricingServiceError::Distance(inner) => inner.into(),
            PricingServiceError::Forbidden(_) => Self::forbidden(err.to_string()),
            PricingServiceError::NoActiveRule => Self::conflict("no_active_rule", err.to_string()),
            PricingServiceError::NoRate(_) => Self::conflict("no_rate", err.to_string()),
            PricingServiceError::MissingTowType => Self::validation(err.to_string()),
        }
    }
}

impl From<PresenceDomainError> for ApiError {
    fn from(err: PresenceDomainError) -> Self {
        match err {
            PresenceDomainError::Location(inner) => inner.into(),
            PresenceDomainError::InvalidHeading(_) => Self::validation(err.to_string()),
            PresenceDomainError::RoleNotAllowed(_) => Self::forbidden(err.to_string()),
        }
    }
}

impl From<PresenceServiceError> for ApiError {
    fn from(err: PresenceServiceError) -> Self {
        match err {
            PresenceServiceError::Domain(inner) => inner.into(),
            PresenceServiceError::Repository(PresenceRepositoryError::Persistence(_)) => {
                Self::internal(&err)
            }
        }
    }
}
