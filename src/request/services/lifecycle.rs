//! Request lifecycle controller.
//!
//! Every status change goes through this service: it validates the move on
//! the aggregate, persists it with a conditional write keyed on the status
//! it read, and then fans out side effects. Side effects never undo an
//! applied transition; a failed push is logged and the caller still gets
//! the new state.

use crate::account::{
    domain::{Actor, Role},
    ports::{AccountRepository, AccountRepositoryError},
};
use crate::distance::domain::BoundingBox;
use crate::request::{
    domain::{
        CancellationReason, PartySummary, PinAttempt, PinHash, PinPolicy, PinRecord,
        PinReservation, ProviderSummary, RequestDomainError, RequestDraft, RequestEvent, RequestId, RequestPin,
        RequestStatus, RequestView, ServiceRequest, ServiceType,
    },
    ports::{
        ChangeKind, ChangePublisher, PinHashError, PinHasher, PushNotifier, RequestChange,
        RequestRepositoryError, ServiceRequestRepository, TransitionOutcome, TripQuoter,
    },
};
use chrono::{DateTime, Utc};
use mockable::Clock;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info, warn};

use super::notifications;

/// Service-level errors for lifecycle operations.
#[derive(Debug, Error)]
pub enum RequestServiceError {
    /// Validation or lifecycle rule violated.
    #[error(transparent)]
    Domain(#[from] RequestDomainError),
    /// Request persistence failed or rejected the write.
    #[error(transparent)]
    Repository(#[from] RequestRepositoryError),
    /// Profile lookup failed.
    #[error(transparent)]
    Accounts(#[from] AccountRepositoryError),
    /// PIN hashing failed.
    #[error(transparent)]
    Hashing(#[from] PinHashError),
    /// No request with this identifier exists.
    #[error("service request {0} not found")]
    NotFound(RequestId),
    /// The caller may not see the request.
    #[error("role {0} may not access this request")]
    Forbidden(Role),
    /// Another operator claimed the request first.
    #[error("service request {0} is no longer available")]
    RequestNoLongerAvailable(RequestId),
    /// Too many wrong PINs; verification is locked.
    #[error("PIN verification locked until {until}")]
    PinLocked {
        /// When verification reopens.
        until: DateTime<Utc>,
    },
}

/// Result type for lifecycle operations.
pub type RequestServiceResult<T> = Result<T, RequestServiceError>;

/// Tunables for the lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LifecyclePolicy {
    /// PIN attempt limits.
    pub pin: PinPolicy,
    /// Area pickups and dropoffs must fall inside.
    pub service_area: BoundingBox,
}

/// Collaborators the lifecycle calls out to.
#[derive(Clone)]
pub struct LifecycleDependencies {
    /// Profile and provider lookups for read models.
    pub accounts: Arc<dyn AccountRepository>,
    /// Pricing for new and completed requests.
    pub quoter: Arc<dyn TripQuoter>,
    /// PIN hashing.
    pub hasher: Arc<dyn PinHasher>,
    /// Push delivery.
    pub notifier: Arc<dyn PushNotifier>,
    /// Change feed.
    pub publisher: Arc<dyn ChangePublisher>,
}

/// A newly created request and the PIN handed to the requester.
///
/// This is the only place the plaintext PIN ever leaves the service.
#[derive(Debug, Clone)]
pub struct CreatedRequest {
    /// The stored request.
    pub request: ServiceRequest,
    /// Plaintext PIN for the requester.
    pub pin: RequestPin,
}

/// Lifecycle controller for service requests.
#[derive(Clone)]
pub struct RequestLifecycleService<R, C>
where
    R: ServiceRequestRepository + ?Sized,
    C: Clock + Send + Sync,
{
    requests: Arc<R>,
    deps: LifecycleDependencies,
    policy: LifecyclePolicy,
    clock: Arc<C>,
}

impl<R, C> RequestLifecycleService<R, C>
where
    R: ServiceRequestRepository + ?Sized,
    C: Clock + Send + Sync,
{
    /// Creates a lifecycle service with the default policy.
    #[must_use]
    pub fn new(requests: Arc<R>, deps: LifecycleDependencies, clock: Arc<C>) -> Self {
        Self {
            requests,
            deps,
            policy: LifecyclePolicy::default(),
            clock,
        }
    }

    /// Replaces the policy.
    #[must_use]
    pub const fn with_policy(mut self, policy: LifecyclePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Creates a request for the calling user.
    ///
    /// A pricing failure leaves the request unpriced rather than failing
    /// creation; the price is retried at completion.
    ///
    /// # Errors
    ///
    /// Returns [`RequestServiceError::Domain`] for invalid drafts or
    /// locations outside the service area, and
    /// [`RequestRepositoryError::UserHasOpenRequest`] when the user already
    /// has a non-terminal request.
    pub async fn create_request(
        &self,
        actor: &Actor,
        draft: RequestDraft,
    ) -> RequestServiceResult<CreatedRequest> {
        self.check_area(&draft)?;
        let (mut request, event) = ServiceRequest::create(draft, actor, &*self.clock)?;
        if self
            .requests
            .find_open_for_user(actor.user_id())
            .await?
            .is_some()
        {
            return Err(RequestRepositoryError::UserHasOpenRequest(actor.user_id()).into());
        }

        match self.deps.quoter.quote(&request.quote_input()).await {
            Ok(quote) => request.attach_quote(quote),
            Err(err) => warn!(request_id = %request.id(), error = %err, "request created without a price"),
        }

        let pin = RequestPin::generate();
        let hash = self.hash_pin(pin.clone()).await?;
        self.requests
            .create(&request, &PinRecord::new(hash), &event)
            .await?;
        info!(
            request_id = %request.id(),
            user_id = %actor.user_id(),
            service_type = %request.service_type(),
            "service request created"
        );
        self.publish(request.id(), RequestStatus::Initiated);
        Ok(CreatedRequest { request, pin })
    }

    /// Lists the requests an operator may claim.
    ///
    /// Operators already holding a request get an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`RequestDomainError::RoleNotAllowed`] for non-operators.
    pub async fn available_requests_for_operator(
        &self,
        actor: &Actor,
    ) -> RequestServiceResult<Vec<ServiceRequest>> {
        if !actor.has_role(Role::Operator) {
            return Err(RequestDomainError::RoleNotAllowed(actor.role()).into());
        }
        if let Some(held) = self.requests.find_open_for_operator(actor.user_id()).await? {
            debug!(operator_id = %actor.user_id(), request_id = %held.id(), "operator busy, offering nothing");
            return Ok(Vec::new());
        }
        Ok(self.requests.list_by_status(RequestStatus::Initiated).await?)
    }

    /// Claims an `initiated` request for the calling operator.
    ///
    /// Concurrent claims race on the conditional write; exactly one wins.
    ///
    /// # Errors
    ///
    /// Returns [`RequestServiceError::RequestNoLongerAvailable`] when the
    /// request was claimed or closed first, and
    /// [`RequestRepositoryError::OperatorHasOpenRequest`] when the operator
    /// already holds a request.
    pub async fn accept(&self, actor: &Actor, id: RequestId) -> RequestServiceResult<ServiceRequest> {
        let mut request = self.load(id).await?;
        let expected = request.status();
        let event = match request.assign(actor, &*self.clock) {
            Ok(event) => event,
            Err(
                RequestDomainError::InvalidStateTransition { .. }
                | RequestDomainError::RequestClosed { .. },
            ) => return Err(RequestServiceError::RequestNoLongerAvailable(id)),
            Err(err) => return Err(err.into()),
        };
        if self
            .requests
            .find_open_for_operator(actor.user_id())
            .await?
            .is_some()
        {
            return Err(RequestRepositoryError::OperatorHasOpenRequest(actor.user_id()).into());
        }
        match self.requests.apply_transition(&request, expected, &event).await? {
            TransitionOutcome::Applied => {}
            TransitionOutcome::Stale => {
                info!(request_id = %id, operator_id = %actor.user_id(), "claim lost to another operator");
                return Err(RequestServiceError::RequestNoLongerAvailable(id));
            }
        }
        self.after_transition(&request, &event).await;
        Ok(request)
    }

    /// Marks the assigned operator as departed.
    ///
    /// # Errors
    ///
    /// Returns [`RequestServiceError`] when the caller is not the assigned
    /// operator or the request is not `assigned`.
    pub async fn confirm_departure(
        &self,
        actor: &Actor,
        id: RequestId,
    ) -> RequestServiceResult<ServiceRequest> {
        let mut request = self.load(id).await?;
        let expected = request.status();
        let event = request.depart(actor, &*self.clock)?;
        self.persist(&request, expected, &event).await?;
        self.after_transition(&request, &event).await;
        Ok(request)
    }

    /// Verifies the arrival PIN entered by the assigned operator.
    ///
    /// A correct PIN moves an `en_route` request to `active`; repeating it
    /// on an `active` request answers `true` without a new event. A wrong
    /// PIN answers `false`. Every guess is charged before the hash is
    /// checked, so concurrent guesses cannot outrun the lockout; a correct
    /// PIN clears the counter. Malformed input is rejected before any
    /// attempt is charged.
    ///
    /// # Errors
    ///
    /// Returns [`RequestDomainError::MalformedPin`] for malformed input,
    /// [`RequestServiceError::PinLocked`] while locked out, and lifecycle
    /// errors when the request is not `en_route` or `active`.
    pub async fn verify_pin(
        &self,
        actor: &Actor,
        id: RequestId,
        raw_pin: &str,
    ) -> RequestServiceResult<bool> {
        let pin = RequestPin::parse(raw_pin)?;
        let mut request = self.load(id).await?;
        if !request.is_assigned_operator(actor) {
            return Err(RequestDomainError::NotAssignedOperator(id).into());
        }
        let expected = request.status();
        if expected != RequestStatus::Active {
            request.ensure_transition(RequestStatus::Active)?;
        }

        let reservation = self
            .requests
            .reserve_pin_attempt(id, self.clock.utc(), self.policy.pin)
            .await?
            .ok_or(RequestServiceError::NotFound(id))?;
        let (hash, attempt) = match reservation {
            PinReservation::Granted { hash, attempt } => (hash, attempt),
            PinReservation::Locked { until } => return Err(RequestServiceError::PinLocked { until }),
        };

        if !self.check_pin(pin, hash).await? {
            match attempt {
                PinAttempt::Granted { remaining } => {
                    debug!(request_id = %id, remaining, "wrong PIN");
                }
                PinAttempt::Final { until } => {
                    warn!(request_id = %id, operator_id = %actor.user_id(), %until, "PIN verification locked");
                }
            }
            return Ok(false);
        }
        self.requests.clear_pin_attempts(id).await?;
        if expected == RequestStatus::Active {
            return Ok(true);
        }

        let event = request.arrive(actor, &*self.clock)?;
        match self.requests.apply_transition(&request, expected, &event).await? {
            TransitionOutcome::Applied => self.after_transition(&request, &event).await,
            TransitionOutcome::Stale => {
                let fresh = self.load(id).await?;
                if fresh.status() != RequestStatus::Active {
                    return Err(stale_error(&fresh, RequestStatus::Active).into());
                }
            }
        }
        Ok(true)
    }

    /// Records delivery and finalizes the price.
    ///
    /// The trip is re-quoted at completion; when that fails the price from
    /// creation stands.
    ///
    /// # Errors
    ///
    /// Returns [`RequestServiceError`] when the caller is not the assigned
    /// operator or the request is not `active`.
    pub async fn complete(
        &self,
        actor: &Actor,
        id: RequestId,
    ) -> RequestServiceResult<ServiceRequest> {
        let mut request = self.load(id).await?;
        let expected = request.status();
        let event = request.complete(actor, &*self.clock)?;
        match self.deps.quoter.quote(&request.quote_input()).await {
            Ok(quote) => request.attach_quote(quote),
            Err(err) => warn!(request_id = %id, error = %err, "keeping creation-time price"),
        }
        self.persist(&request, expected, &event).await?;
        self.after_transition(&request, &event).await;
        Ok(request)
    }

    /// Cancels a request on behalf of the requester or assigned operator.
    ///
    /// # Errors
    ///
    /// Returns [`RequestDomainError::EmptyCancellationReason`] for a blank
    /// reason, [`RequestDomainError::RequestClosed`] for terminal requests,
    /// and [`RequestDomainError::InvalidStateTransition`] once the service
    /// has started.
    pub async fn cancel(
        &self,
        actor: &Actor,
        id: RequestId,
        reason: &str,
    ) -> RequestServiceResult<ServiceRequest> {
        let reason = CancellationReason::new(reason)?;
        let mut request = self.load(id).await?;
        let expected = request.status();
        let event = request.cancel(actor, reason, &*self.clock)?;
        self.persist(&request, expected, &event).await?;
        self.after_transition(&request, &event).await;
        Ok(request)
    }

    /// Returns a request with its operator and provider resolved.
    ///
    /// Parties, overseers, and operators browsing unclaimed requests may
    /// read it.
    ///
    /// # Errors
    ///
    /// Returns [`RequestServiceError::NotFound`] or
    /// [`RequestServiceError::Forbidden`].
    pub async fn find_request(&self, actor: &Actor, id: RequestId) -> RequestServiceResult<RequestView> {
        let request = self.load(id).await?;
        let browsing = actor.has_role(Role::Operator) && request.status() == RequestStatus::Initiated;
        if !(request.is_party(actor) || actor.is_overseer() || browsing) {
            return Err(RequestServiceError::Forbidden(actor.role()));
        }
        self.resolve_view(request).await
    }

    /// Returns the caller's own open request, if any.
    ///
    /// # Errors
    ///
    /// Returns [`RequestDomainError::RoleNotAllowed`] for admins and MOP.
    pub async fn active_request_for(
        &self,
        actor: &Actor,
    ) -> RequestServiceResult<Option<ServiceRequest>> {
        let found = match actor.role() {
            Role::User => self.requests.find_open_for_user(actor.user_id()).await?,
            Role::Operator => self.requests.find_open_for_operator(actor.user_id()).await?,
            role @ (Role::Admin | Role::Mop) => {
                return Err(RequestDomainError::RoleNotAllowed(role).into());
            }
        };
        Ok(found)
    }

    /// Returns a request's audit trail in append order.
    ///
    /// # Errors
    ///
    /// Returns [`RequestServiceError::Forbidden`] for callers that are
    /// neither a party nor an overseer.
    pub async fn events(&self, actor: &Actor, id: RequestId) -> RequestServiceResult<Vec<RequestEvent>> {
        let request = self.load(id).await?;
        if !(request.is_party(actor) || actor.is_overseer()) {
            return Err(RequestServiceError::Forbidden(actor.role()));
        }
        Ok(self.requests.events_for(id).await?)
    }

    async fn load(&self, id: RequestId) -> RequestServiceResult<ServiceRequest> {
        self.requests
            .find_by_id(id)
            .await?
            .ok_or(RequestServiceError::NotFound(id))
    }

    async fn persist(
        &self,
        request: &ServiceRequest,
        expected: RequestStatus,
        event: &RequestEvent,
    ) -> RequestServiceResult<()> {
        match self.requests.apply_transition(request, expected, event).await? {
            TransitionOutcome::Applied => Ok(()),
            TransitionOutcome::Stale => {
                let fresh = self.load(request.id()).await?;
                Err(stale_error(&fresh, event.to).into())
            }
        }
    }

    async fn after_transition(&self, request: &ServiceRequest, event: &RequestEvent) {
        info!(
            request_id = %request.id(),
            actor_id = %event.actor_id,
            from = ?event.from,
            to = %event.to,
            "request transition applied"
        );
        match notifications::compose(request, event) {
            Ok(Some(notification)) => {
                if let Err(err) = self.deps.notifier.notify(&notification).await {
                    warn!(request_id = %request.id(), error = %err, "push notification failed");
                }
            }
            Ok(None) => {}
            Err(err) => warn!(request_id = %request.id(), error = %err, "notification template failed"),
        }
        self.publish(request.id(), event.to);
    }

    fn publish(&self, request_id: RequestId, status: RequestStatus) {
        self.deps.publisher.publish(RequestChange {
            request_id,
            kind: ChangeKind::Status { status },
        });
    }

    fn check_area(&self, draft: &RequestDraft) -> Result<(), RequestDomainError> {
        let mut points = vec![draft.pickup.point];
        if draft.service_type == ServiceType::Tow
            && let Some(dropoff) = &draft.dropoff
        {
            points.push(dropoff.point);
        }
        match points
            .into_iter()
            .find(|point| !self.policy.service_area.contains(*point))
        {
            Some(outside) => Err(RequestDomainError::OutsideServiceArea {
                lat: outside.lat(),
                lng: outside.lng(),
            }),
            None => Ok(()),
        }
    }

    async fn resolve_view(&self, request: ServiceRequest) -> RequestServiceResult<RequestView> {
        let operator = match request.operator_id() {
            Some(operator_id) => self
                .deps
                .accounts
                .find_profile(operator_id)
                .await?
                .map(|profile| PartySummary {
                    user_id: profile.user_id(),
                    full_name: profile.full_name().to_owned(),
                    phone: profile.phone().map(str::to_owned),
                }),
            None => None,
        };
        let provider = match request.provider_id() {
            Some(provider_id) => self
                .deps
                .accounts
                .find_provider(provider_id)
                .await?
                .map(|found| ProviderSummary {
                    provider_id: found.id(),
                    name: found.name().to_owned(),
                }),
            None => None,
        };
        Ok(RequestView {
            request,
            operator,
            provider,
        })
    }

    async fn hash_pin(&self, pin: RequestPin) -> RequestServiceResult<PinHash> {
        let hasher = Arc::clone(&self.deps.hasher);
        let hash = tokio::task::spawn_blocking(move || hasher.hash(&pin))
            .await
            .map_err(|err| PinHashError(err.to_string()))??;
        Ok(hash)
    }

    async fn check_pin(&self, pin: RequestPin, hash: PinHash) -> RequestServiceResult<bool> {
        let hasher = Arc::clone(&self.deps.hasher);
        let matches = tokio::task::spawn_blocking(move || hasher.verify(&pin, &hash))
            .await
            .map_err(|err| PinHashError(err.to_string()))??;
        Ok(matches)
    }
}

/// Error describing why a transition to `to` lost against `fresh`.
fn stale_error(fresh: &ServiceRequest, to: RequestStatus) -> RequestDomainError {
    fresh
        .ensure_transition(to)
        .err()
        .unwrap_or(RequestDomainError::InvalidStateTransition {
            id: fresh.id(),
            from: fresh.status(),
            to,
        })
}
