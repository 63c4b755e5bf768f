//! `PostgreSQL` repository implementation for service requests.

use super::{
    models::{PinRow, RequestEventRow, ServiceRequestRow, TransitionChangeset},
    schema::{request_events, request_pins, service_requests},
};
use crate::account::domain::{ProviderId, Role, UserId};
use crate::distance::domain::GeoPoint;
use crate::persistence::{CENTS, DispatchPgPool, PersistenceFailure, run_blocking, to_minor_units};
use crate::pricing::domain::PriceQuote;
use crate::request::{
    domain::{
        Cancellation, CancellationReason, EventId, PersistedRequestData, PinHash, PinPolicy,
        PinRecord, PinReservation, Place, RequestEvent, RequestId, RequestStatus, ServiceRequest, ServiceType, Timeline,
        TowType,
    },
    ports::{
        RequestRepositoryError, RequestRepositoryResult, ServiceRequestRepository,
        TransitionOutcome,
    },
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// Partial unique index allowing one non-terminal request per user.
const OPEN_PER_USER_INDEX: &str = "idx_service_requests_open_per_user";
/// Partial unique index allowing one held request per operator.
const OPEN_PER_OPERATOR_INDEX: &str = "idx_service_requests_open_per_operator";

const TERMINAL_STATUSES: [&str; 2] = ["completed", "cancelled"];
const OPERATOR_HELD_STATUSES: [&str; 3] = ["assigned", "en_route", "active"];

/// `PostgreSQL`-backed request repository.
///
/// Transitions are a single `UPDATE ... WHERE id = $1 AND status = $2`
/// followed by the event insert, in one transaction. An update touching no
/// row means another writer moved the request first. PIN attempts are
/// charged under a row lock on `request_pins`, so concurrent guesses queue
/// behind each other.
#[derive(Debug, Clone)]
pub struct PostgresServiceRequestRepository {
    pool: DispatchPgPool,
}

impl PostgresServiceRequestRepository {
    /// Creates a new repository from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: DispatchPgPool) -> Self {
        Self { pool }
    }
}

impl PersistenceFailure for RequestRepositoryError {
    fn from_persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::persistence(err)
    }
}

#[async_trait]
impl ServiceRequestRepository for PostgresServiceRequestRepository {
    async fn create(
        &self,
        request: &ServiceRequest,
        pin: &PinRecord,
        event: &RequestEvent,
    ) -> RequestRepositoryResult<()> {
        let request_id = request.id();
        let user_id = request.user_id();
        let row = to_request_row(request)?;
        let pin_row = to_pin_row(request_id, pin)?;
        let event_row = to_event_row(event);
        run_blocking(&self.pool, move |connection| {
            connection
                .transaction::<_, DieselError, _>(|tx| {
                    diesel::insert_into(service_requests::table)
                        .values(&row)
                        .execute(tx)?;
                    diesel::insert_into(request_pins::table)
                        .values(&pin_row)
                        .execute(tx)?;
                    diesel::insert_into(request_events::table)
                        .values(&event_row)
                        .execute(tx)?;
                    Ok(())
                })
                .map_err(|err| match violated_constraint(&err).as_deref() {
                    Some(OPEN_PER_USER_INDEX) => RequestRepositoryError::UserHasOpenRequest(user_id),
                    Some(_) => RequestRepositoryError::DuplicateRequest(request_id),
                    None => RequestRepositoryError::persistence(err),
                })
        })
        .await
    }

    async fn apply_transition(
        &self,
        request: &ServiceRequest,
        expected: RequestStatus,
        event: &RequestEvent,
    ) -> RequestRepositoryResult<TransitionOutcome> {
        let request_id = request.id();
        let operator_id = request.operator_id();
        let changes = to_changeset(request)?;
        let event_row = to_event_row(event);
        let expected_status = expected.as_str();
        run_blocking(&self.pool, move |connection| {
            let outcome = connection
                .transaction::<_, DieselError, _>(|tx| {
                    let target = service_requests::table
                        .filter(service_requests::id.eq(request_id.into_inner()));
                    let updated = diesel::update(
                        target
                            .clone()
                            .filter(service_requests::status.eq(expected_status)),
                    )
                    .set(&changes)
                    .execute(tx)?;
                    if updated == 0 {
                        let exists =
                            diesel::select(diesel::dsl::exists(target)).get_result::<bool>(tx)?;
                        return Ok(exists.then_some(TransitionOutcome::Stale));
                    }
                    diesel::insert_into(request_events::table)
                        .values(&event_row)
                        .execute(tx)?;
                    Ok(Some(TransitionOutcome::Applied))
                })
                .map_err(|err| match (violated_constraint(&err).as_deref(), operator_id) {
                    (Some(OPEN_PER_OPERATOR_INDEX), Some(operator)) => {
                        RequestRepositoryError::OperatorHasOpenRequest(operator)
                    }
                    _ => RequestRepositoryError::persistence(err),
                })?;
            outcome.ok_or(RequestRepositoryError::NotFound(request_id))
        })
        .await
    }

    async fn find_by_id(&self, id: RequestId) -> RequestRepositoryResult<Option<ServiceRequest>> {
        run_blocking(&self.pool, move |connection| {
            let row = service_requests::table
                .filter(service_requests::id.eq(id.into_inner()))
                .select(ServiceRequestRow::as_select())
                .first::<ServiceRequestRow>(connection)
                .optional()
                .map_err(RequestRepositoryError::persistence)?;
            row.map(row_to_request).transpose()
        })
        .await
    }

    async fn find_open_for_user(
        &self,
        user_id: UserId,
    ) -> RequestRepositoryResult<Option<ServiceRequest>> {
        run_blocking(&self.pool, move |connection| {
            let row = service_requests::table
                .filter(service_requests::user_id.eq(user_id.into_inner()))
                .filter(service_requests::status.ne_all(TERMINAL_STATUSES))
                .select(ServiceRequestRow::as_select())
                .first::<ServiceRequestRow>(connection)
                .optional()
                .map_err(RequestRepositoryError::persistence)?;
            row.map(row_to_request).transpose()
        })
        .await
    }

    async fn find_open_for_operator(
        &self,
        operator_id: UserId,
    ) -> RequestRepositoryResult<Option<ServiceRequest>> {
        run_blocking(&self.pool, move |connection| {
            let row = service_requests::table
                .filter(service_requests::operator_id.eq(operator_id.into_inner()))
                .filter(service_requests::status.eq_any(OPERATOR_HELD_STATUSES))
                .select(ServiceRequestRow::as_select())
                .first::<ServiceRequestRow>(connection)
                .optional()
                .map_err(RequestRepositoryError::persistence)?;
            row.map(row_to_request).transpose()
        })
        .await
    }

    async fn list_by_status(
        &self,
        status: RequestStatus,
    ) -> RequestRepositoryResult<Vec<ServiceRequest>> {
        run_blocking(&self.pool, move |connection| {
            let rows = service_requests::table
                .filter(service_requests::status.eq(status.as_str()))
                .order(service_requests::created_at.asc())
                .select(ServiceRequestRow::as_select())
                .load::<ServiceRequestRow>(connection)
                .map_err(RequestRepositoryError::persistence)?;
            rows.into_iter().map(row_to_request).collect()
        })
        .await
    }

    async fn list_all(&self) -> RequestRepositoryResult<Vec<ServiceRequest>> {
        run_blocking(&self.pool, move |connection| {
            let rows = service_requests::table
                .order(service_requests::created_at.asc())
                .select(ServiceRequestRow::as_select())
                .load::<ServiceRequestRow>(connection)
                .map_err(RequestRepositoryError::persistence)?;
            rows.into_iter().map(row_to_request).collect()
        })
        .await
    }

    async fn events_for(&self, id: RequestId) -> RequestRepositoryResult<Vec<RequestEvent>> {
        run_blocking(&self.pool, move |connection| {
            let rows = request_events::table
                .filter(request_events::request_id.eq(id.into_inner()))
                .order(request_events::sequence.asc())
                .select(RequestEventRow::as_select())
                .load::<RequestEventRow>(connection)
                .map_err(RequestRepositoryError::persistence)?;
            rows.into_iter().map(row_to_event).collect()
        })
        .await
    }

    async fn find_pin(&self, id: RequestId) -> RequestRepositoryResult<Option<PinRecord>> {
        run_blocking(&self.pool, move |connection| {
            let row = request_pins::table
                .filter(request_pins::request_id.eq(id.into_inner()))
                .select(PinRow::as_select())
                .first::<PinRow>(connection)
                .optional()
                .map_err(RequestRepositoryError::persistence)?;
            row.map(row_to_pin).transpose()
        })
        .await
    }

    async fn reserve_pin_attempt(
        &self,
        id: RequestId,
        now: DateTime<Utc>,
        policy: PinPolicy,
    ) -> RequestRepositoryResult<Option<PinReservation>> {
        run_blocking(&self.pool, move |connection| {
            connection
                .transaction::<_, DieselError, _>(|tx| {
                    let target =
                        request_pins::table.filter(request_pins::request_id.eq(id.into_inner()));
                    let Some(row) = target
                        .clone()
                        .select(PinRow::as_select())
                        .for_update()
                        .first::<PinRow>(tx)
                        .optional()?
                    else {
                        return Ok(None);
                    };
                    let stored_attempts = u32::try_from(row.failed_attempts)
                        .map_err(|err| DieselError::DeserializationError(Box::new(err)))?;
                    let mut record = PinRecord::from_persisted(
                        PinHash::new(row.pin_hash),
                        stored_attempts,
                        row.locked_until,
                    );
                    let reservation = record.reserve_attempt(now, &policy);
                    let charged = i32::try_from(record.failed_attempts())
                        .map_err(|err| DieselError::SerializationError(Box::new(err)))?;
                    diesel::update(target)
                        .set((
                            request_pins::failed_attempts.eq(charged),
                            request_pins::locked_until.eq(record.locked_until()),
                        ))
                        .execute(tx)?;
                    Ok(Some(reservation))
                })
                .map_err(RequestRepositoryError::persistence)
        })
        .await
    }

    async fn clear_pin_attempts(&self, id: RequestId) -> RequestRepositoryResult<()> {
        run_blocking(&self.pool, move |connection| {
            let updated = diesel::update(
                request_pins::table.filter(request_pins::request_id.eq(id.into_inner())),
            )
            .set((
                request_pins::failed_attempts.eq(0),
                request_pins::locked_until.eq(None::<DateTime<Utc>>),
            ))
            .execute(connection)
            .map_err(RequestRepositoryError::persistence)?;
            if updated == 0 {
                return Err(RequestRepositoryError::NotFound(id));
            }
            Ok(())
        })
        .await
    }
}

fn violated_constraint(err: &DieselError) -> Option<String> {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            Some(info.constraint_name().unwrap_or_default().to_owned())
        }
        _ => None,
    }
}

fn to_request_row(request: &ServiceRequest) -> RequestRepositoryResult<ServiceRequestRow> {
    let timeline = request.timeline();
    let (total_price_cents, price_quote) = quote_columns(request.quote())?;
    let (cancellation_reason, cancelled_by) = cancellation_columns(request.cancellation());
    Ok(ServiceRequestRow {
        id: request.id().into_inner(),
        user_id: request.user_id().into_inner(),
        operator_id: request.operator_id().map(UserId::into_inner),
        provider_id: request.provider_id().map(ProviderId::into_inner),
        service_type: request.service_type().as_str().to_owned(),
        tow_type: request.tow_type().map(|tow_type| tow_type.as_str().to_owned()),
        service_details: serde_json::to_value(request.details())
            .map_err(RequestRepositoryError::persistence)?,
        pickup_lat: request.pickup().point.lat(),
        pickup_lng: request.pickup().point.lng(),
        pickup_address: request.pickup().address.clone(),
        dropoff_lat: request.dropoff().point.lat(),
        dropoff_lng: request.dropoff().point.lng(),
        dropoff_address: request.dropoff().address.clone(),
        incident_type: request.incident_type().map(str::to_owned),
        notes: request.notes().map(str::to_owned),
        photo_url: request.photo_url().map(str::to_owned),
        status: request.status().as_str().to_owned(),
        total_price_cents,
        price_quote,
        cancellation_reason,
        cancelled_by,
        created_at: timeline.created_at,
        updated_at: timeline.updated_at,
        assigned_at: timeline.assigned_at,
        en_route_at: timeline.en_route_at,
        arrived_at: timeline.arrived_at,
        completed_at: timeline.completed_at,
        cancelled_at: timeline.cancelled_at,
    })
}

fn to_changeset(request: &ServiceRequest) -> RequestRepositoryResult<TransitionChangeset> {
    let timeline = request.timeline();
    let (total_price_cents, price_quote) = quote_columns(request.quote())?;
    let (cancellation_reason, cancelled_by) = cancellation_columns(request.cancellation());
    Ok(TransitionChangeset {
        operator_id: request.operator_id().map(UserId::into_inner),
        provider_id: request.provider_id().map(ProviderId::into_inner),
        status: request.status().as_str().to_owned(),
        total_price_cents,
        price_quote,
        cancellation_reason,
        cancelled_by,
        updated_at: timeline.updated_at,
        assigned_at: timeline.assigned_at,
        en_route_at: timeline.en_route_at,
        arrived_at: timeline.arrived_at,
        completed_at: timeline.completed_at,
        cancelled_at: timeline.cancelled_at,
    })
}

fn quote_columns(
    quote: Option<&PriceQuote>,
) -> RequestRepositoryResult<(Option<i64>, Option<serde_json::Value>)> {
    let Some(priced) = quote else {
        return Ok((None, None));
    };
    let cents = to_minor_units(priced.total, CENTS).map_err(RequestRepositoryError::persistence)?;
    let value = serde_json::to_value(priced).map_err(RequestRepositoryError::persistence)?;
    Ok((Some(cents), Some(value)))
}

fn cancellation_columns(cancellation: Option<&Cancellation>) -> (Option<String>, Option<String>) {
    cancellation.map_or((None, None), |cancelled| {
        (
            Some(cancelled.reason.as_str().to_owned()),
            Some(cancelled.cancelled_by.as_str().to_owned()),
        )
    })
}

fn row_to_request(row: ServiceRequestRow) -> RequestRepositoryResult<ServiceRequest> {
    let pickup = Place {
        point: geo_point(row.pickup_lat, row.pickup_lng)?,
        address: row.pickup_address,
    };
    let dropoff = Place {
        point: geo_point(row.dropoff_lat, row.dropoff_lng)?,
        address: row.dropoff_address,
    };
    let service_type = ServiceType::try_from(row.service_type.as_str())
        .map_err(RequestRepositoryError::persistence)?;
    let tow_type = row
        .tow_type
        .as_deref()
        .map(TowType::try_from)
        .transpose()
        .map_err(RequestRepositoryError::persistence)?;
    let details =
        serde_json::from_value(row.service_details).map_err(RequestRepositoryError::persistence)?;
    let status = RequestStatus::try_from(row.status.as_str())
        .map_err(RequestRepositoryError::persistence)?;
    let quote = row
        .price_quote
        .map(serde_json::from_value::<PriceQuote>)
        .transpose()
        .map_err(RequestRepositoryError::persistence)?;
    let cancellation = row
        .cancellation_reason
        .zip(row.cancelled_by)
        .map(|(reason, role)| -> RequestRepositoryResult<Cancellation> {
            Ok(Cancellation {
                reason: CancellationReason::new(&reason)
                    .map_err(RequestRepositoryError::persistence)?,
                cancelled_by: Role::try_from(role.as_str())
                    .map_err(RequestRepositoryError::persistence)?,
            })
        })
        .transpose()?;

    Ok(ServiceRequest::from_persisted(PersistedRequestData {
        id: RequestId::from_uuid(row.id),
        user_id: UserId::from_uuid(row.user_id),
        operator_id: row.operator_id.map(UserId::from_uuid),
        provider_id: row.provider_id.map(ProviderId::from_uuid),
        service_type,
        tow_type,
        details,
        pickup,
        dropoff,
        incident_type: row.incident_type,
        notes: row.notes,
        photo_url: row.photo_url,
        status,
        quote,
        cancellation,
        timeline: Timeline {
            created_at: row.created_at,
            updated_at: row.updated_at,
            assigned_at: row.assigned_at,
            en_route_at: row.en_route_at,
            arrived_at: row.arrived_at,
            completed_at: row.completed_at,
            cancelled_at: row.cancelled_at,
        },
    }))
}

fn geo_point(lat: f64, lng: f64) -> RequestRepositoryResult<GeoPoint> {
    GeoPoint::new(lat, lng).map_err(RequestRepositoryError::persistence)
}

fn to_event_row(event: &RequestEvent) -> RequestEventRow {
    RequestEventRow {
        id: event.id.into_inner(),
        request_id: event.request_id.into_inner(),
        actor_id: event.actor_id.into_inner(),
        actor_role: event.actor_role.as_str().to_owned(),
        from_status: event.from.map(|status| status.as_str().to_owned()),
        to_status: event.to.as_str().to_owned(),
        note: event.note.clone(),
        occurred_at: event.occurred_at,
    }
}

fn row_to_event(row: RequestEventRow) -> RequestRepositoryResult<RequestEvent> {
    let parse_status = |value: &str| {
        RequestStatus::try_from(value).map_err(RequestRepositoryError::persistence)
    };
    Ok(RequestEvent {
        id: EventId::from_uuid(row.id),
        request_id: RequestId::from_uuid(row.request_id),
        actor_id: UserId::from_uuid(row.actor_id),
        actor_role: Role::try_from(row.actor_role.as_str())
            .map_err(RequestRepositoryError::persistence)?,
        from: row.from_status.as_deref().map(parse_status).transpose()?,
        to: parse_status(&row.to_status)?,
        note: row.note,
        occurred_at: row.occurred_at,
    })
}

fn to_pin_row(request_id: RequestId, pin: &PinRecord) -> RequestRepositoryResult<PinRow> {
    Ok(PinRow {
        request_id: request_id.into_inner(),
        pin_hash: pin.hash().as_str().to_owned(),
        failed_attempts: i32::try_from(pin.failed_attempts())
            .map_err(RequestRepositoryError::persistence)?,
        locked_until: pin.locked_until(),
    })
}

fn row_to_pin(row: PinRow) -> RequestRepositoryResult<PinRecord> {
    let failed_attempts =
        u32::try_from(row.failed_attempts).map_err(RequestRepositoryError::persistence)?;
    Ok(PinRecord::from_persisted(
        PinHash::new(row.pin_hash),
        failed_attempts,
        row.locked_until,
    ))
}
