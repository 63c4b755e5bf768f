//! Service request aggregate root.

use super::{
    Place, RequestDomainError, RequestEvent, RequestId, RequestStatus, ServiceDetails,
    ServiceType, TowType, MAX_FUEL_GALLONS,
};
use crate::account::domain::{Actor, ProviderId, Role, UserId};
use crate::pricing::domain::{PriceQuote, QuoteInput};
use chrono::{DateTime, Utc};
use mockable::Clock;
use serde::{Deserialize, Serialize};

/// Longest accepted cancellation reason, in characters.
pub const MAX_REASON_CHARS: usize = 500;
/// Longest accepted notes or incident description, in characters.
pub const MAX_NOTES_CHARS: usize = 1000;

/// Input for creating a request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDraft {
    /// Requested service.
    pub service_type: ServiceType,
    /// Truck class; required for tows and rejected otherwise.
    pub tow_type: Option<TowType>,
    /// Service-specific details.
    pub details: ServiceDetails,
    /// Where the vehicle is.
    pub pickup: Place,
    /// Where a towed vehicle goes; ignored for on-site services.
    pub dropoff: Option<Place>,
    /// What happened, in the requester's words.
    pub incident_type: Option<String>,
    /// Extra instructions for the operator.
    pub notes: Option<String>,
    /// Photo of the vehicle or scene.
    pub photo_url: Option<String>,
}

impl RequestDraft {
    /// Starts a draft for `service_type` at `pickup`.
    #[must_use]
    pub const fn new(service_type: ServiceType, pickup: Place) -> Self {
        Self {
            service_type,
            tow_type: None,
            details: ServiceDetails::None,
            pickup,
            dropoff: None,
            incident_type: None,
            notes: None,
            photo_url: None,
        }
    }

    /// Sets the tow destination and truck class.
    #[must_use]
    pub fn with_tow(mut self, tow_type: TowType, dropoff: Place) -> Self {
        self.tow_type = Some(tow_type);
        self.dropoff = Some(dropoff);
        self
    }

    /// Sets service-specific details.
    #[must_use]
    pub const fn with_details(mut self, details: ServiceDetails) -> Self {
        self.details = details;
        self
    }

    /// Sets the operator notes.
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    /// Sets the incident description.
    #[must_use]
    pub fn with_incident_type(mut self, incident_type: impl Into<String>) -> Self {
        self.incident_type = Some(incident_type.into());
        self
    }
}

/// Validated, trimmed cancellation reason.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CancellationReason(String);

impl CancellationReason {
    /// Validates a reason.
    ///
    /// # Errors
    ///
    /// Returns [`RequestDomainError::EmptyCancellationReason`] for blank input
    /// and [`RequestDomainError::FieldTooLong`] past
    /// [`MAX_REASON_CHARS`] characters.
    pub fn new(raw: &str) -> Result<Self, RequestDomainError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(RequestDomainError::EmptyCancellationReason);
        }
        if trimmed.chars().count() > MAX_REASON_CHARS {
            return Err(RequestDomainError::FieldTooLong {
                field: "reason",
                max: MAX_REASON_CHARS,
            });
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Returns the reason text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for CancellationReason {
    type Error = RequestDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(&value)
    }
}

impl From<CancellationReason> for String {
    fn from(reason: CancellationReason) -> Self {
        reason.0
    }
}

/// Who cancelled a request and why.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cancellation {
    /// Stated reason.
    pub reason: CancellationReason,
    /// Role of the cancelling party.
    pub cancelled_by: Role,
}

/// Lifecycle timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeline {
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Time of the latest change.
    pub updated_at: DateTime<Utc>,
    /// When an operator claimed the request.
    pub assigned_at: Option<DateTime<Utc>>,
    /// When the operator set off.
    pub en_route_at: Option<DateTime<Utc>>,
    /// When the PIN was verified on site.
    pub arrived_at: Option<DateTime<Utc>>,
    /// When the service was delivered.
    pub completed_at: Option<DateTime<Utc>>,
    /// When the request was cancelled.
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl Timeline {
    const fn started(at: DateTime<Utc>) -> Self {
        Self {
            created_at: at,
            updated_at: at,
            assigned_at: None,
            en_route_at: None,
            arrived_at: None,
            completed_at: None,
            cancelled_at: None,
        }
    }
}

/// Parameter object for reconstructing a persisted request.
#[derive(Debug, Clone, PartialEq)]
pub struct PersistedRequestData {
    /// Persisted identifier.
    pub id: RequestId,
    /// Requester.
    pub user_id: UserId,
    /// Assigned operator.
    pub operator_id: Option<UserId>,
    /// Provider of the assigned operator.
    pub provider_id: Option<ProviderId>,
    /// Requested service.
    pub service_type: ServiceType,
    /// Truck class.
    pub tow_type: Option<TowType>,
    /// Service-specific details.
    pub details: ServiceDetails,
    /// Pickup location.
    pub pickup: Place,
    /// Dropoff location.
    pub dropoff: Place,
    /// Incident description.
    pub incident_type: Option<String>,
    /// Operator notes.
    pub notes: Option<String>,
    /// Photo reference.
    pub photo_url: Option<String>,
    /// Lifecycle status.
    pub status: RequestStatus,
    /// Price, once computed.
    pub quote: Option<PriceQuote>,
    /// Cancellation details.
    pub cancellation: Option<Cancellation>,
    /// Lifecycle timestamps.
    pub timeline: Timeline,
}

/// A request for roadside assistance, tracked from creation to a terminal
/// state.
///
/// Transition methods validate the caller and the move, mutate the
/// aggregate, and return the audit event describing it. Persisting both is
/// the repository's job, conditioned on the status the caller read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRequest {
    id: RequestId,
    user_id: UserId,
    operator_id: Option<UserId>,
    provider_id: Option<ProviderId>,
    service_type: ServiceType,
    tow_type: Option<TowType>,
    details: ServiceDetails,
    pickup: Place,
    dropoff: Place,
    incident_type: Option<String>,
    notes: Option<String>,
    photo_url: Option<String>,
    status: RequestStatus,
    quote: Option<PriceQuote>,
    cancellation: Option<Cancellation>,
    timeline: Timeline,
}

impl ServiceRequest {
    /// Creates an `initiated` request on behalf of a user.
    ///
    /// Service-area checks belong to the caller, which knows the configured
    /// area.
    ///
    /// # Errors
    ///
    /// Returns [`RequestDomainError`] when the actor is not a user or the
    /// draft is inconsistent with its service type.
    pub fn create(
        draft: RequestDraft,
        actor: &Actor,
        clock: &impl Clock,
    ) -> Result<(Self, RequestEvent), RequestDomainError> {
        if !actor.has_role(Role::User) {
            return Err(RequestDomainError::RoleNotAllowed(actor.role()));
        }
        validate_classification(&draft)?;
        let incident_type = bounded_text(draft.incident_type, "incident_type")?;
        let notes = bounded_text(draft.notes, "notes")?;
        let photo_url = bounded_text(draft.photo_url, "photo_url")?;
        let dropoff = if draft.service_type.is_on_site() {
            draft.pickup.clone()
        } else {
            draft.dropoff.ok_or(RequestDomainError::MissingDropoff)?
        };

        let now = clock.utc();
        let request = Self {
            id: RequestId::new(),
            user_id: actor.user_id(),
            operator_id: None,
            provider_id: None,
            service_type: draft.service_type,
            tow_type: draft.tow_type,
            details: draft.details,
            pickup: draft.pickup,
            dropoff,
            incident_type,
            notes,
            photo_url,
            status: RequestStatus::Initiated,
            quote: None,
            cancellation: None,
            timeline: Timeline::started(now),
        };
        let event = RequestEvent::new(request.id, actor, None, RequestStatus::Initiated, now);
        Ok((request, event))
    }

    /// Reconstructs a request from persisted storage.
    #[must_use]
    pub fn from_persisted(data: PersistedRequestData) -> Self {
        Self {
            id: data.id,
            user_id: data.user_id,
            operator_id: data.operator_id,
            provider_id: data.provider_id,
            service_type: data.service_type,
            tow_type: data.tow_type,
            details: data.details,
            pickup: data.pickup,
            dropoff: data.dropoff,
            incident_type: data.incident_type,
            notes: data.notes,
            photo_url: data.photo_url,
            status: data.status,
            quote: data.quote,
            cancellation: data.cancellation,
            timeline: data.timeline,
        }
    }

    /// Returns the request identifier.
    #[must_use]
    pub const fn id(&self) -> RequestId {
        self.id
    }

    /// Returns the requester.
    #[must_use]
    pub const fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the assigned operator.
    #[must_use]
    pub const fn operator_id(&self) -> Option<UserId> {
        self.operator_id
    }

    /// Returns the assigned operator's provider.
    #[must_use]
    pub const fn provider_id(&self) -> Option<ProviderId> {
        self.provider_id
    }

    /// Returns the requested service.
    #[must_use]
    pub const fn service_type(&self) -> ServiceType {
        self.service_type
    }

    /// Returns the truck class for tows.
    #[must_use]
    pub const fn tow_type(&self) -> Option<TowType> {
        self.tow_type
    }

    /// Returns the service-specific details.
    #[must_use]
    pub const fn details(&self) -> ServiceDetails {
        self.details
    }

    /// Returns the pickup location.
    #[must_use]
    pub const fn pickup(&self) -> &Place {
        &self.pickup
    }

    /// Returns the dropoff location (the pickup for on-site services).
    #[must_use]
    pub const fn dropoff(&self) -> &Place {
        &self.dropoff
    }

    /// Returns the incident description.
    #[must_use]
    pub fn incident_type(&self) -> Option<&str> {
        self.incident_type.as_deref()
    }

    /// Returns the operator notes.
    #[must_use]
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    /// Returns the photo reference.
    #[must_use]
    pub fn photo_url(&self) -> Option<&str> {
        self.photo_url.as_deref()
    }

    /// Returns the lifecycle status.
    #[must_use]
    pub const fn status(&self) -> RequestStatus {
        self.status
    }

    /// Returns the price, once computed.
    #[must_use]
    pub const fn quote(&self) -> Option<&PriceQuote> {
        self.quote.as_ref()
    }

    /// Returns the cancellation details.
    #[must_use]
    pub const fn cancellation(&self) -> Option<&Cancellation> {
        self.cancellation.as_ref()
    }

    /// Returns the lifecycle timestamps.
    #[must_use]
    pub const fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    /// Returns `true` when the actor is the requester or assigned operator.
    #[must_use]
    pub fn is_party(&self, actor: &Actor) -> bool {
        actor.user_id() == self.user_id || self.is_assigned_operator(actor)
    }

    /// Returns `true` when the actor is the assigned operator.
    #[must_use]
    pub fn is_assigned_operator(&self, actor: &Actor) -> bool {
        actor.has_role(Role::Operator) && self.operator_id == Some(actor.user_id())
    }

    /// Returns the pricing input for this request.
    #[must_use]
    pub fn quote_input(&self) -> QuoteInput {
        QuoteInput {
            service_type: self.service_type,
            tow_type: self.tow_type,
            details: self.details,
            pickup: self.pickup.point,
            dropoff: self.dropoff.point,
        }
    }

    /// Attaches or replaces the price.
    pub fn attach_quote(&mut self, quote: PriceQuote) {
        self.quote = Some(quote);
    }

    /// Claims the request for an operator: `initiated -> assigned`.
    ///
    /// # Errors
    ///
    /// Returns [`RequestDomainError`] when the actor is not an operator with
    /// a provider or the request is no longer `initiated`.
    pub fn assign(
        &mut self,
        actor: &Actor,
        clock: &impl Clock,
    ) -> Result<RequestEvent, RequestDomainError> {
        if !actor.has_role(Role::Operator) {
            return Err(RequestDomainError::RoleNotAllowed(actor.role()));
        }
        let provider_id = actor
            .provider_id()
            .ok_or(RequestDomainError::OperatorWithoutProvider)?;
        let event = self.transition(actor, RequestStatus::Assigned, clock)?;
        self.operator_id = Some(actor.user_id());
        self.provider_id = Some(provider_id);
        self.timeline.assigned_at = Some(event.occurred_at);
        Ok(event)
    }

    /// Marks the operator as departed: `assigned -> en_route`.
    ///
    /// # Errors
    ///
    /// Returns [`RequestDomainError`] when the actor is not the assigned
    /// operator or the move is not allowed.
    pub fn depart(
        &mut self,
        actor: &Actor,
        clock: &impl Clock,
    ) -> Result<RequestEvent, RequestDomainError> {
        self.ensure_assigned_operator(actor)?;
        let event = self.transition(actor, RequestStatus::EnRoute, clock)?;
        self.timeline.en_route_at = Some(event.occurred_at);
        Ok(event)
    }

    /// Records on-site arrival after PIN verification: `en_route -> active`.
    ///
    /// # Errors
    ///
    /// Returns [`RequestDomainError`] when the actor is not the assigned
    /// operator or the move is not allowed.
    pub fn arrive(
        &mut self,
        actor: &Actor,
        clock: &impl Clock,
    ) -> Result<RequestEvent, RequestDomainError> {
        self.ensure_assigned_operator(actor)?;
        let event = self.transition(actor, RequestStatus::Active, clock)?;
        self.timeline.arrived_at = Some(event.occurred_at);
        Ok(event.with_note("pin verified"))
    }

    /// Records delivery: `active -> completed`.
    ///
    /// # Errors
    ///
    /// Returns [`RequestDomainError`] when the actor is not the assigned
    /// operator or the move is not allowed.
    pub fn complete(
        &mut self,
        actor: &Actor,
        clock: &impl Clock,
    ) -> Result<RequestEvent, RequestDomainError> {
        self.ensure_assigned_operator(actor)?;
        let event = self.transition(actor, RequestStatus::Completed, clock)?;
        self.timeline.completed_at = Some(event.occurred_at);
        Ok(event)
    }

    /// Cancels the request on behalf of either party.
    ///
    /// # Errors
    ///
    /// Returns [`RequestDomainError::NotAParty`] for outsiders,
    /// [`RequestDomainError::RequestClosed`] for terminal requests, and
    /// [`RequestDomainError::InvalidStateTransition`] once service is under
    /// way.
    pub fn cancel(
        &mut self,
        actor: &Actor,
        reason: CancellationReason,
        clock: &impl Clock,
    ) -> Result<RequestEvent, RequestDomainError> {
        if !self.is_party(actor) {
            return Err(RequestDomainError::NotAParty(self.id));
        }
        let event = self
            .transition(actor, RequestStatus::Cancelled, clock)?
            .with_note(reason.as_str());
        self.timeline.cancelled_at = Some(event.occurred_at);
        self.cancellation = Some(Cancellation {
            reason,
            cancelled_by: actor.role(),
        });
        Ok(event)
    }

    /// Checks that the lifecycle allows moving to `to`.
    ///
    /// # Errors
    ///
    /// Returns [`RequestDomainError::RequestClosed`] for terminal requests and
    /// [`RequestDomainError::InvalidStateTransition`] otherwise.
    pub const fn ensure_transition(&self, to: RequestStatus) -> Result<(), RequestDomainError> {
        if self.status.is_terminal() {
            return Err(RequestDomainError::RequestClosed {
                id: self.id,
                status: self.status,
            });
        }
        if !self.status.can_transition_to(to) {
            return Err(RequestDomainError::InvalidStateTransition {
                id: self.id,
                from: self.status,
                to,
            });
        }
        Ok(())
    }

    fn ensure_assigned_operator(&self, actor: &Actor) -> Result<(), RequestDomainError> {
        if self.is_assigned_operator(actor) {
            Ok(())
        } else {
            Err(RequestDomainError::NotAssignedOperator(self.id))
        }
    }

    fn transition(
        &mut self,
        actor: &Actor,
        to: RequestStatus,
        clock: &impl Clock,
    ) -> Result<RequestEvent, RequestDomainError> {
        self.ensure_transition(to)?;
        let now = clock.utc();
        let from = self.status;
        self.status = to;
        self.timeline.updated_at = now;
        Ok(RequestEvent::new(self.id, actor, Some(from), to, now))
    }
}

fn validate_classification(draft: &RequestDraft) -> Result<(), RequestDomainError> {
    match draft.service_type {
        ServiceType::Tow => {
            if draft.tow_type.is_none() {
                return Err(RequestDomainError::MissingTowType);
            }
        }
        other => {
            if draft.tow_type.is_some() {
                return Err(RequestDomainError::UnexpectedTowType(other));
            }
        }
    }
    match (draft.service_type, draft.details) {
        (ServiceType::Fuel, ServiceDetails::Fuel { gallons }) => {
            if gallons == 0 || gallons > MAX_FUEL_GALLONS {
                return Err(RequestDomainError::InvalidFuelAmount {
                    gallons,
                    max: MAX_FUEL_GALLONS,
                });
            }
            Ok(())
        }
        (ServiceType::Tire, ServiceDetails::Tire { .. })
        | (ServiceType::Tow | ServiceType::Battery | ServiceType::Locksmith, ServiceDetails::None) => {
            Ok(())
        }
        (service_type, _) => Err(RequestDomainError::MismatchedDetails(service_type)),
    }
}

fn bounded_text(
    value: Option<String>,
    field: &'static str,
) -> Result<Option<String>, RequestDomainError> {
    let Some(text) = value else {
        return Ok(None);
    };
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if trimmed.chars().count() > MAX_NOTES_CHARS {
        return Err(RequestDomainError::FieldTooLong {
            field,
            max: MAX_NOTES_CHARS,
        });
    }
    Ok(Some(trimmed.to_owned()))
}
