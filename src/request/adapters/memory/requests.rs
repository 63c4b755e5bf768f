//! In-memory repository for service requests.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::account::domain::UserId;
use crate::request::{
    domain::{
        PinPolicy, PinRecord, PinReservation, RequestEvent, RequestId, RequestStatus,
        ServiceRequest,
    },
    ports::{
        RequestRepositoryError, RequestRepositoryResult, ServiceRequestRepository,
        TransitionOutcome,
    },
};

/// Thread-safe in-memory request repository.
///
/// Every write runs under one write lock, so the status check and the
/// single-open-request checks see the same snapshot as the write itself.
#[derive(Debug, Clone, Default)]
pub struct InMemoryServiceRequestRepository {
    state: Arc<RwLock<InMemoryRequestState>>,
}

#[derive(Debug, Default)]
struct InMemoryRequestState {
    requests: Vec<ServiceRequest>,
    events: Vec<RequestEvent>,
    pins: HashMap<RequestId, PinRecord>,
}

impl InMemoryRequestState {
    fn position(&self, id: RequestId) -> Option<usize> {
        self.requests.iter().position(|request| request.id() == id)
    }

    fn open_for_user(&self, user_id: UserId) -> Option<&ServiceRequest> {
        self.requests
            .iter()
            .find(|request| request.user_id() == user_id && !request.status().is_terminal())
    }

    fn open_for_operator(&self, operator_id: UserId) -> Option<&ServiceRequest> {
        self.requests.iter().find(|request| {
            request.operator_id() == Some(operator_id) && request.status().holds_operator()
        })
    }
}

impl InMemoryServiceRequestRepository {
    /// Creates an empty in-memory repository.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_error(message: String) -> RequestRepositoryError {
    RequestRepositoryError::persistence(std::io::Error::other(message))
}

#[async_trait]
impl ServiceRequestRepository for InMemoryServiceRequestRepository {
    async fn create(
        &self,
        request: &ServiceRequest,
        pin: &PinRecord,
        event: &RequestEvent,
    ) -> RequestRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| lock_error(err.to_string()))?;
        if state.position(request.id()).is_some() {
            return Err(RequestRepositoryError::DuplicateRequest(request.id()));
        }
        if state.open_for_user(request.user_id()).is_some() {
            return Err(RequestRepositoryError::UserHasOpenRequest(request.user_id()));
        }
        state.requests.push(request.clone());
        state.pins.insert(request.id(), pin.clone());
        state.events.push(event.clone());
        Ok(())
    }

    async fn apply_transition(
        &self,
        request: &ServiceRequest,
        expected: RequestStatus,
        event: &RequestEvent,
    ) -> RequestRepositoryResult<TransitionOutcome> {
        let mut state = self.state.write().map_err(|err| lock_error(err.to_string()))?;
        let index = state
            .position(request.id())
            .ok_or(RequestRepositoryError::NotFound(request.id()))?;
        let current = state
            .requests
            .get(index)
            .map(ServiceRequest::status)
            .ok_or(RequestRepositoryError::NotFound(request.id()))?;
        if current != expected {
            return Ok(TransitionOutcome::Stale);
        }
        if let Some(operator_id) = request.operator_id()
            && request.status().holds_operator()
            && state
                .open_for_operator(operator_id)
                .is_some_and(|held| held.id() != request.id())
        {
            return Err(RequestRepositoryError::OperatorHasOpenRequest(operator_id));
        }
        if let Some(slot) = state.requests.get_mut(index) {
            *slot = request.clone();
        }
        state.events.push(event.clone());
        Ok(TransitionOutcome::Applied)
    }

    async fn find_by_id(&self, id: RequestId) -> RequestRepositoryResult<Option<ServiceRequest>> {
        let state = self.state.read().map_err(|err| lock_error(err.to_string()))?;
        Ok(state.requests.iter().find(|request| request.id() == id).cloned())
    }

    async fn find_open_for_user(
        &self,
        user_id: UserId,
    ) -> RequestRepositoryResult<Option<ServiceRequest>> {
        let state = self.state.read().map_err(|err| lock_error(err.to_string()))?;
        Ok(state.open_for_user(user_id).cloned())
    }

    async fn find_open_for_operator(
        &self,
        operator_id: UserId,
    ) -> RequestRepositoryResult<Option<ServiceRequest>> {
        let state = self.state.read().map_err(|err| lock_error(err.to_string()))?;
        Ok(state.open_for_operator(operator_id).cloned())
    }

    async fn list_by_status(
        &self,
        status: RequestStatus,
    ) -> RequestRepositoryResult<Vec<ServiceRequest>> {
        let state = self.state.read().map_err(|err| lock_error(err.to_string()))?;
        Ok(state
            .requests
            .iter()
            .filter(|request| request.status() == status)
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> RequestRepositoryResult<Vec<ServiceRequest>> {
        let state = self.state.read().map_err(|err| lock_error(err.to_string()))?;
        Ok(state.requests.clone())
    }

    async fn events_for(&self, id: RequestId) -> RequestRepositoryResult<Vec<RequestEvent>> {
        let state = self.state.read().map_err(|err| lock_error(err.to_string()))?;
        Ok(state
            .events
            .iter()
            .filter(|event| event.request_id == id)
            .cloned()
            .collect())
    }

    async fn find_pin(&self, id: RequestId) -> RequestRepositoryResult<Option<PinRecord>> {
        let state = self.state.read().map_err(|err| lock_error(err.to_string()))?;
        Ok(state.pins.get(&id).cloned())
    }

    async fn reserve_pin_attempt(
        &self,
        id: RequestId,
        now: DateTime<Utc>,
        policy: PinPolicy,
    ) -> RequestRepositoryResult<Option<PinReservation>> {
        let mut state = self.state.write().map_err(|err| lock_error(err.to_string()))?;
        Ok(state
            .pins
            .get_mut(&id)
            .map(|record| record.reserve_attempt(now, &policy)))
    }

    async fn clear_pin_attempts(&self, id: RequestId) -> RequestRepositoryResult<()> {
        let mut state = self.state.write().map_err(|err| lock_error(err.to_string()))?;
        let record = state
            .pins
            .get_mut(&id)
            .ok_or(RequestRepositoryError::NotFound(id))?;
        record.register_success();
        Ok(())
    }
}
