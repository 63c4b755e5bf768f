//! Repository port for service requests, their audit trail, and PINs.

use crate::account::domain::UserId;
use crate::request::domain::{
    PinPolicy, PinRecord, PinReservation, RequestEvent, RequestId, RequestStatus, ServiceRequest,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use thiserror::Error;

/// Result type for request repository operations.
pub type RequestRepositoryResult<T> = Result<T, RequestRepositoryError>;

/// Outcome of a conditional transition write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionOutcome {
    /// The stored status matched and the write was applied.
    Applied,
    /// The stored status had moved on; nothing was written.
    Stale,
}

/// Service request persistence contract.
///
/// Implementations enforce the single-open-request invariants at the write
/// boundary: a user owns at most one non-terminal request and an operator
/// holds at most one assigned, en-route or active request.
#[async_trait]
pub trait ServiceRequestRepository: Send + Sync {
    /// Stores a new request together with its PIN record and creation event.
    ///
    /// # Errors
    ///
    /// Returns [`RequestRepositoryError::UserHasOpenRequest`] when the
    /// requester already has a non-terminal request.
    async fn create(
        &self,
        request: &ServiceRequest,
        pin: &PinRecord,
        event: &RequestEvent,
    ) -> RequestRepositoryResult<()>;

    /// Writes the request's new state and appends its event, but only if the
    /// stored status still equals `expected`.
    ///
    /// # Errors
    ///
    /// Returns [`RequestRepositoryError::NotFound`] for unknown requests and
    /// [`RequestRepositoryError::OperatorHasOpenRequest`] when the write
    /// would give the operator a second open request.
    async fn apply_transition(
        &self,
        request: &ServiceRequest,
        expected: RequestStatus,
        event: &RequestEvent,
    ) -> RequestRepositoryResult<TransitionOutcome>;

    /// Finds a request by identifier.
    async fn find_by_id(&self, id: RequestId) -> RequestRepositoryResult<Option<ServiceRequest>>;

    /// Finds the requester's non-terminal request.
    async fn find_open_for_user(
        &self,
        user_id: UserId,
    ) -> RequestRepositoryResult<Option<ServiceRequest>>;

    /// Finds the operator's assigned, en-route or active request.
    async fn find_open_for_operator(
        &self,
        operator_id: UserId,
    ) -> RequestRepositoryResult<Option<ServiceRequest>>;

    /// Lists requests in a status, oldest first.
    async fn list_by_status(
        &self,
        status: RequestStatus,
    ) -> RequestRepositoryResult<Vec<ServiceRequest>>;

    /// Lists every request, oldest first.
    async fn list_all(&self) -> RequestRepositoryResult<Vec<ServiceRequest>>;

    /// Returns a request's audit trail in append order.
    async fn events_for(&self, id: RequestId) -> RequestRepositoryResult<Vec<RequestEvent>>;

    /// Loads the PIN record of a request.
    async fn find_pin(&self, id: RequestId) -> RequestRepositoryResult<Option<PinRecord>>;

    /// Charges one verification attempt against a request's PIN.
    ///
    /// Releasing an expired lock, the lock check and the counter update
    /// happen in one atomic step (see [`PinRecord::reserve_attempt`]).
    /// Returns `None` when the request has no PIN record.
    async fn reserve_pin_attempt(
        &self,
        id: RequestId,
        now: DateTime<Utc>,
        policy: PinPolicy,
    ) -> RequestRepositoryResult<Option<PinReservation>>;

    /// Resets the attempt counter and lock after a correct guess.
    ///
    /// # Errors
    ///
    /// Returns [`RequestRepositoryError::NotFound`] when no record exists.
    async fn clear_pin_attempts(&self, id: RequestId) -> RequestRepositoryResult<()>;
}

/// Errors returned by request repository implementations.
#[derive(Debug, Clone, Error)]
pub enum RequestRepositoryError {
    /// A request with the same identifier already exists.
    #[error("duplicate service request: {0}")]
    DuplicateRequest(RequestId),

    /// The request was not found.
    #[error("service request not found: {0}")]
    NotFound(RequestId),

    /// The user already has a non-terminal request.
    #[error("user {0} already has an open service request")]
    UserHasOpenRequest(UserId),

    /// The operator already holds a non-terminal request.
    #[error("operator {0} already holds an open service request")]
    OperatorHasOpenRequest(UserId),

    /// Persistence-layer failure.
    #[error("persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl RequestRepositoryError {
    /// Wraps a persistence error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }
}
