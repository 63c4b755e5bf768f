//! Role-specific workflows built on a [`DispatchBackend`].

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use super::backend::{BackendError, DispatchBackend};
use super::pin_store::{PinStore, PinStoreError};
use crate::presence::domain::LocationFix;
use crate::request::domain::{
    CancellationReason, RequestDomainError, RequestDraft, RequestId, RequestMessage,
    ServiceRequest,
};

/// Errors raised by client workflows.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The user already has a request in progress.
    #[error("request {0} is still in progress")]
    ActiveRequestExists(RequestId),
    /// Input was rejected locally, before any call.
    #[error(transparent)]
    Invalid(#[from] RequestDomainError),
    /// The backend refused or failed the call.
    #[error(transparent)]
    Backend(#[from] BackendError),
    /// The device could not store or read a PIN.
    #[error(transparent)]
    Pins(#[from] PinStoreError),
}

/// Result type for client workflows.
pub type ClientResult<T> = Result<T, ClientError>;

/// A request the user just created, with the PIN to read out on arrival.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreatedRequest {
    /// New request.
    pub request_id: RequestId,
    /// Four-digit arrival PIN.
    pub pin: String,
}

/// Customer-side workflow.
#[derive(Clone)]
pub struct UserSession {
    backend: Arc<dyn DispatchBackend>,
    pins: Arc<dyn PinStore>,
}

impl UserSession {
    /// Creates a session over a backend and a PIN store.
    #[must_use]
    pub fn new(backend: Arc<dyn DispatchBackend>, pins: Arc<dyn PinStore>) -> Self {
        Self { backend, pins }
    }

    /// Creates a request unless one is already in progress.
    ///
    /// The open request is looked up first so the user is sent back to it
    /// rather than to a server conflict. The returned PIN is also saved on
    /// the device.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::ActiveRequestExists`] when the user already
    /// has a non-terminal request, or a backend/storage error.
    pub async fn create(&self, draft: &RequestDraft) -> ClientResult<CreatedRequest> {
        if let Some(active) = self.backend.get_active_request().await? {
            return Err(ClientError::ActiveRequestExists(active.id()));
        }
        let created = self.backend.create_service_request(draft).await?;
        self.pins.save(created.request_id, &created.pin).await?;
        info!(request_id = %created.request_id, "service request created");
        Ok(CreatedRequest {
            request_id: created.request_id,
            pin: created.pin,
        })
    }

    /// The request in progress, if any.
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub async fn active(&self) -> ClientResult<Option<ServiceRequest>> {
        Ok(self.backend.get_active_request().await?)
    }

    /// The saved PIN of a request created on this device.
    ///
    /// # Errors
    ///
    /// Propagates storage failures.
    pub async fn pin(&self, request_id: RequestId) -> ClientResult<Option<String>> {
        Ok(self.pins.load(request_id).await?)
    }

    /// Cancels a request.
    ///
    /// The reason is validated before any call is made.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Invalid`] for a blank or oversized reason, or
    /// a backend/storage error.
    pub async fn cancel(&self, request_id: RequestId, reason: &str) -> ClientResult<()> {
        let validated = CancellationReason::new(reason)?;
        self.backend
            .cancel_service_request(request_id, validated.as_str())
            .await?;
        self.pins.forget(request_id).await?;
        Ok(())
    }

    /// Rates a completed request and drops its PIN.
    ///
    /// # Errors
    ///
    /// Propagates backend and storage failures.
    pub async fn rate(
        &self,
        request_id: RequestId,
        stars: u8,
        comment: Option<String>,
    ) -> ClientResult<()> {
        self.backend.rate_service(request_id, stars, comment).await?;
        self.pins.forget(request_id).await?;
        Ok(())
    }

    /// Sends a chat message to the assigned operator.
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub async fn message(&self, request_id: RequestId, text: &str) -> ClientResult<()> {
        Ok(self.backend.send_message(request_id, text).await?)
    }

    /// Reads the conversation.
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub async fn messages(&self, request_id: RequestId) -> ClientResult<Vec<RequestMessage>> {
        Ok(self.backend.get_request_messages(request_id).await?)
    }
}

/// What happened to a claim.
#[derive(Debug, Clone, PartialEq)]
pub enum ClaimOutcome {
    /// The operator now holds the request.
    Claimed(ServiceRequest),
    /// Someone else got there first; here is the current list.
    NoLongerAvailable {
        /// Requests still open for claiming.
        refreshed: Vec<ServiceRequest>,
    },
}

/// Operator-side workflow.
#[derive(Clone)]
pub struct OperatorSession {
    backend: Arc<dyn DispatchBackend>,
}

impl OperatorSession {
    /// Creates a session over a backend.
    #[must_use]
    pub fn new(backend: Arc<dyn DispatchBackend>) -> Self {
        Self { backend }
    }

    /// Requests open for claiming.
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub async fn available(&self) -> ClientResult<Vec<ServiceRequest>> {
        Ok(self.backend.get_available_requests_for_operator().await?)
    }

    /// Tries to claim a request.
    ///
    /// Losing the race is an expected outcome, not an error: the list is
    /// refetched so the operator can pick another.
    ///
    /// # Errors
    ///
    /// Propagates every other backend failure.
    pub async fn accept(&self, request_id: RequestId) -> ClientResult<ClaimOutcome> {
        match self.backend.accept_request(request_id).await {
            Ok(request) => Ok(ClaimOutcome::Claimed(request)),
            Err(err) if err.is_no_longer_available() => {
                warn!(%request_id, "claim lost to another operator");
                let refreshed = self.backend.get_available_requests_for_operator().await?;
                Ok(ClaimOutcome::NoLongerAvailable { refreshed })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Reports leaving for the pickup.
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub async fn depart(&self, request_id: RequestId) -> ClientResult<ServiceRequest> {
        Ok(self.backend.confirm_departure(request_id).await?)
    }

    /// Checks the PIN the customer reads out.
    ///
    /// # Errors
    ///
    /// Propagates backend failures, including a lockout.
    pub async fn verify_pin(&self, request_id: RequestId, pin: &str) -> ClientResult<bool> {
        Ok(self.backend.verify_request_pin(request_id, pin).await?)
    }

    /// Finishes the job.
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub async fn complete(&self, request_id: RequestId) -> ClientResult<ServiceRequest> {
        Ok(self.backend.complete_request(request_id).await?)
    }

    /// Reports one position while online.
    ///
    /// # Errors
    ///
    /// Propagates backend failures.
    pub async fn report(&self, fix: LocationFix) -> ClientResult<()> {
        Ok(self.backend.upsert_operator_location(fix, true).await?)
    }
}
