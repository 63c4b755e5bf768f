//! The remote procedures as seen from a client.

use crate::account::domain::{ProviderId, Role, UserId};
use crate::distance::domain::GeoPoint;
use crate::presence::domain::{LocationFix, PresenceView};
use crate::pricing::domain::PricingRuleId;
use crate::request::{
    domain::{RequestDraft, RequestEvent, RequestId, RequestMessage, RequestView, ServiceRequest},
    ports::RequestChange,
    services::ServiceStatistics,
};
use crate::rpc::{
    ApiError,
    wire::{CreatedRequestResponse, EstimateResponse},
};
use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;

/// Code the server uses when another operator won a claim.
pub const NO_LONGER_AVAILABLE: &str = "request_no_longer_available";

/// Why a backend call failed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BackendError {
    /// There is no valid session.
    #[error("not signed in")]
    Unauthenticated,
    /// The server refused the call; code and message are passed through.
    #[error("{code}: {message}")]
    Rejected {
        /// Stable error code.
        code: String,
        /// Server explanation.
        message: String,
    },
    /// The call never completed.
    #[error("transport failure: {0}")]
    Transport(String),
    /// The response could not be read.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl BackendError {
    /// Returns the server's error code for rejections.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Rejected { code, .. } => Some(code),
            Self::Unauthenticated | Self::Transport(_) | Self::Decode(_) => None,
        }
    }

    /// Whether another operator claimed the request first.
    #[must_use]
    pub fn is_no_longer_available(&self) -> bool {
        self.code() == Some(NO_LONGER_AVAILABLE)
    }

    pub(crate) fn rejected(code: &str, message: impl Into<String>) -> Self {
        if code == "unauthenticated" {
            return Self::Unauthenticated;
        }
        Self::Rejected {
            code: code.to_owned(),
            message: message.into(),
        }
    }
}

impl From<ApiError> for BackendError {
    fn from(err: ApiError) -> Self {
        Self::rejected(err.code(), err.message())
    }
}

/// Result type for backend calls.
pub type BackendResult<T> = Result<T, BackendError>;

/// Every remote procedure, on behalf of one signed-in caller.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DispatchBackend: Send + Sync {
    /// Creates a request; the response holds the only copy of the PIN.
    async fn create_service_request(
        &self,
        draft: &RequestDraft,
    ) -> BackendResult<CreatedRequestResponse>;

    /// Checks an arrival PIN.
    async fn verify_request_pin(&self, request_id: RequestId, pin: &str) -> BackendResult<bool>;

    /// Cancels with a reason.
    async fn cancel_service_request(&self, request_id: RequestId, reason: &str)
    -> BackendResult<()>;

    /// Claims an initiated request.
    async fn accept_request(&self, request_id: RequestId) -> BackendResult<ServiceRequest>;

    /// Marks the operator as driving to the pickup.
    async fn confirm_departure(&self, request_id: RequestId) -> BackendResult<ServiceRequest>;

    /// Finishes an active request.
    async fn complete_request(&self, request_id: RequestId) -> BackendResult<ServiceRequest>;

    /// Rates a completed request.
    async fn rate_service(
        &self,
        request_id: RequestId,
        stars: u8,
        comment: Option<String>,
    ) -> BackendResult<()>;

    /// Sends a chat message.
    async fn send_message(&self, request_id: RequestId, message: &str) -> BackendResult<()>;

    /// Reads a request with its resolved associations.
    async fn get_request(&self, request_id: RequestId) -> BackendResult<RequestView>;

    /// Reads the audit trail.
    async fn get_request_events(&self, request_id: RequestId) -> BackendResult<Vec<RequestEvent>>;

    /// Reads the conversation.
    async fn get_request_messages(
        &self,
        request_id: RequestId,
    ) -> BackendResult<Vec<RequestMessage>>;

    /// The caller's non-terminal request, if any.
    async fn get_active_request(&self) -> BackendResult<Option<ServiceRequest>>;

    /// Requests an operator may claim; empty while they are busy.
    async fn get_available_requests_for_operator(&self) -> BackendResult<Vec<ServiceRequest>>;

    /// Reports the operator's position.
    async fn upsert_operator_location(&self, fix: LocationFix, is_online: bool)
    -> BackendResult<()>;

    /// Signs the operator off.
    async fn go_offline(&self) -> BackendResult<()>;

    /// Reads an operator's presence.
    async fn get_operator_presence(&self, operator_id: UserId) -> BackendResult<PresenceView>;

    /// Trip-planning distance.
    async fn estimate_distance(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> BackendResult<EstimateResponse>;

    /// Traffic-aware arrival time.
    async fn estimate_eta(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> BackendResult<EstimateResponse>;

    /// Aggregate statistics for overseers.
    async fn get_service_statistics(&self) -> BackendResult<ServiceStatistics>;

    /// Makes a pricing rule the active one.
    async fn set_active_pricing_rule(&self, rule_id: PricingRuleId) -> BackendResult<()>;

    /// Changes another account's role.
    async fn admin_update_user_role(
        &self,
        user_id: UserId,
        new_role: Role,
        provider_id: Option<ProviderId>,
    ) -> BackendResult<()>;

    /// Change cues pushed by the backend, when it has a feed.
    ///
    /// Backends without one return `None` and callers poll instead.
    fn changes(&self) -> Option<broadcast::Receiver<RequestChange>>;
}
