//! Unit tests for request domain rules.

use chrono::{DateTime, TimeDelta, Utc};
use mockable::DefaultClock;
use rstest::rstest;

use super::support::{fuel_draft, point, tow_draft};
use crate::account::domain::{Actor, ProviderId, Role, UserId};
use crate::request::domain::{
    CancellationReason, MAX_FUEL_GALLONS, MessageBody, PinAttempt, PinHash, PinPolicy, PinRecord,
    PinReservation, Place, Rating, RequestDomainError, RequestDraft, RequestMessage, RequestPin,
    RequestStatus, ServiceDetails, ServiceRequest, ServiceType, Stars, TowType,
};

fn create(draft: RequestDraft) -> Result<ServiceRequest, RequestDomainError> {
    ServiceRequest::create(draft, &Actor::user(UserId::new()), &DefaultClock).map(|(request, _)| request)
}

fn operator() -> Actor {
    Actor::operator(UserId::new(), ProviderId::new())
}

#[rstest]
#[case(RequestStatus::Initiated, RequestStatus::Assigned, true)]
#[case(RequestStatus::Assigned, RequestStatus::EnRoute, true)]
#[case(RequestStatus::EnRoute, RequestStatus::Active, true)]
#[case(RequestStatus::Active, RequestStatus::Completed, true)]
#[case(RequestStatus::Initiated, RequestStatus::Cancelled, true)]
#[case(RequestStatus::EnRoute, RequestStatus::Cancelled, true)]
#[case(RequestStatus::Active, RequestStatus::Cancelled, false)]
#[case(RequestStatus::Initiated, RequestStatus::EnRoute, false)]
#[case(RequestStatus::Assigned, RequestStatus::Active, false)]
#[case(RequestStatus::Completed, RequestStatus::Cancelled, false)]
#[case(RequestStatus::Cancelled, RequestStatus::Assigned, false)]
fn lifecycle_edges(#[case] from: RequestStatus, #[case] to: RequestStatus, #[case] allowed: bool) {
    assert_eq!(from.can_transition_to(to), allowed);
}

#[rstest]
fn terminal_statuses_admit_no_transition() {
    for terminal in [RequestStatus::Completed, RequestStatus::Cancelled] {
        assert!(terminal.is_terminal());
        assert!(
            RequestStatus::ALL
                .iter()
                .all(|next| !terminal.can_transition_to(*next))
        );
    }
}

#[rstest]
fn creation_starts_initiated_with_creation_event() -> eyre::Result<()> {
    let user = Actor::user(UserId::new());
    let (request, event) = ServiceRequest::create(tow_draft(), &user, &DefaultClock)?;

    eyre::ensure!(request.status() == RequestStatus::Initiated);
    eyre::ensure!(request.operator_id().is_none());
    eyre::ensure!(event.from.is_none());
    eyre::ensure!(event.to == RequestStatus::Initiated);
    eyre::ensure!(event.actor_id == user.user_id());
    Ok(())
}

#[rstest]
fn on_site_service_uses_pickup_as_dropoff() -> eyre::Result<()> {
    let request = create(fuel_draft(3))?;
    eyre::ensure!(request.dropoff() == request.pickup());
    Ok(())
}

#[rstest]
#[case::tow_with_fuel_details(
    RequestDraft::new(ServiceType::Tow, Place::new(point(18.48, -69.93)))
        .with_tow(TowType::Light, Place::new(point(18.52, -70.0)))
        .with_details(ServiceDetails::Fuel { gallons: 2 }),
    RequestDomainError::MismatchedDetails(ServiceType::Tow)
)]
#[case::battery_with_tow_type(
    RequestDraft::new(ServiceType::Battery, Place::new(point(18.48, -69.93)))
        .with_tow(TowType::Heavy, Place::new(point(18.52, -70.0))),
    RequestDomainError::UnexpectedTowType(ServiceType::Battery)
)]
#[case::fuel_over_limit(
    fuel_draft(MAX_FUEL_GALLONS + 1),
    RequestDomainError::InvalidFuelAmount { gallons: MAX_FUEL_GALLONS + 1, max: MAX_FUEL_GALLONS }
)]
#[case::fuel_zero(
    fuel_draft(0),
    RequestDomainError::InvalidFuelAmount { gallons: 0, max: MAX_FUEL_GALLONS }
)]
#[case::tire_without_details(
    RequestDraft::new(ServiceType::Tire, Place::new(point(18.48, -69.93))),
    RequestDomainError::MismatchedDetails(ServiceType::Tire)
)]
fn inconsistent_drafts_are_rejected(
    #[case] draft: RequestDraft,
    #[case] expected: RequestDomainError,
) {
    assert_eq!(create(draft), Err(expected));
}

#[rstest]
fn tow_without_dropoff_is_rejected() {
    let mut draft = tow_draft();
    draft.dropoff = None;
    assert_eq!(create(draft), Err(RequestDomainError::MissingDropoff));
}

#[rstest]
fn tow_without_tow_type_is_rejected() {
    let mut draft = tow_draft();
    draft.tow_type = None;
    assert_eq!(create(draft), Err(RequestDomainError::MissingTowType));
}

#[rstest]
fn only_users_create_requests() {
    let result = ServiceRequest::create(tow_draft(), &operator(), &DefaultClock);
    assert_eq!(
        result.map(|(request, _)| request),
        Err(RequestDomainError::RoleNotAllowed(Role::Operator))
    );
}

#[rstest]
#[case("")]
#[case("   \n\t")]
fn blank_cancellation_reason_is_rejected(#[case] raw: &str) {
    assert_eq!(
        CancellationReason::new(raw),
        Err(RequestDomainError::EmptyCancellationReason)
    );
}

#[rstest]
fn assignment_records_operator_and_provider() -> eyre::Result<()> {
    let mut request = create(tow_draft())?;
    let operator = operator();

    let event = request.assign(&operator, &DefaultClock)?;

    eyre::ensure!(request.status() == RequestStatus::Assigned);
    eyre::ensure!(request.operator_id() == Some(operator.user_id()));
    eyre::ensure!(request.provider_id() == operator.provider_id());
    eyre::ensure!(event.from == Some(RequestStatus::Initiated));
    eyre::ensure!(request.timeline().assigned_at.is_some());
    Ok(())
}

#[rstest]
fn operator_without_provider_cannot_claim() -> eyre::Result<()> {
    let mut request = create(tow_draft())?;
    let detached = Actor::new(UserId::new(), Role::Operator, None);
    eyre::ensure!(
        request.assign(&detached, &DefaultClock) == Err(RequestDomainError::OperatorWithoutProvider)
    );
    Ok(())
}

#[rstest]
fn only_the_assigned_operator_departs() -> eyre::Result<()> {
    let mut request = create(tow_draft())?;
    request.assign(&operator(), &DefaultClock)?;

    let result = request.depart(&operator(), &DefaultClock);

    eyre::ensure!(result == Err(RequestDomainError::NotAssignedOperator(request.id())));
    eyre::ensure!(request.status() == RequestStatus::Assigned);
    Ok(())
}

#[rstest]
fn cancellation_is_refused_once_service_started() -> eyre::Result<()> {
    let user = Actor::user(UserId::new());
    let operator = operator();
    let (mut request, _) = ServiceRequest::create(tow_draft(), &user, &DefaultClock)?;
    request.assign(&operator, &DefaultClock)?;
    request.depart(&operator, &DefaultClock)?;
    request.arrive(&operator, &DefaultClock)?;

    let result = request.cancel(&user, CancellationReason::new("changed my mind")?, &DefaultClock);

    eyre::ensure!(matches!(
        result,
        Err(RequestDomainError::InvalidStateTransition {
            from: RequestStatus::Active,
            to: RequestStatus::Cancelled,
            ..
        })
    ));
    Ok(())
}

#[rstest]
fn terminal_request_reports_closed() -> eyre::Result<()> {
    let user = Actor::user(UserId::new());
    let (mut request, _) = ServiceRequest::create(tow_draft(), &user, &DefaultClock)?;
    let event = request.cancel(&user, CancellationReason::new("found help")?, &DefaultClock)?;
    eyre::ensure!(event.note.as_deref() == Some("found help"));
    eyre::ensure!(request.cancellation().map(|c| c.cancelled_by) == Some(Role::User));

    let again = request.assign(&operator(), &DefaultClock);

    eyre::ensure!(again
        == Err(RequestDomainError::RequestClosed {
            id: request.id(),
            status: RequestStatus::Cancelled,
        }));
    Ok(())
}

#[rstest]
fn outsiders_cannot_cancel() -> eyre::Result<()> {
    let mut request = create(tow_draft())?;
    let result = request.cancel(
        &Actor::user(UserId::new()),
        CancellationReason::new("not mine")?,
        &DefaultClock,
    );
    eyre::ensure!(result == Err(RequestDomainError::NotAParty(request.id())));
    Ok(())
}

#[rstest]
#[case("1234", true)]
#[case(" 0042 ", true)]
#[case("123", false)]
#[case("12345", false)]
#[case("12a4", false)]
#[case("١٢٣٤", false)]
fn pin_parsing(#[case] raw: &str, #[case] valid: bool) {
    assert_eq!(RequestPin::parse(raw).is_ok(), valid);
}

#[rstest]
fn generated_pins_are_four_digits_and_redacted_in_debug() {
    for _ in 0..50 {
        let pin = RequestPin::generate();
        assert!(RequestPin::parse(pin.expose()).is_ok());
        assert!(!format!("{pin:?}").contains(pin.expose()));
    }
}

fn granted_allowance(reservation: PinReservation) -> Option<PinAttempt> {
    match reservation {
        PinReservation::Granted { attempt, .. } => Some(attempt),
        PinReservation::Locked { .. } => None,
    }
}

#[rstest]
fn pin_record_locks_after_policy_limit() {
    let policy = PinPolicy {
        max_attempts: 3,
        lockout: TimeDelta::minutes(15),
    };
    let now = Utc::now();
    let until = now + TimeDelta::minutes(15);
    let mut record = PinRecord::new(PinHash::new("hash".to_owned()));

    let first = granted_allowance(record.reserve_attempt(now, &policy));
    let second = granted_allowance(record.reserve_attempt(now, &policy));
    let third = granted_allowance(record.reserve_attempt(now, &policy));
    let fourth = record.reserve_attempt(now, &policy);

    assert_eq!(first, Some(PinAttempt::Granted { remaining: 2 }));
    assert_eq!(second, Some(PinAttempt::Granted { remaining: 1 }));
    assert_eq!(third, Some(PinAttempt::Final { until }));
    assert_eq!(fourth, PinReservation::Locked { until });
    assert_eq!(record.failed_attempts(), 3);

    let later = until + TimeDelta::seconds(1);
    assert!(record.lock_in_force(later).is_none());
    let reopened = granted_allowance(record.reserve_attempt(later, &policy));
    assert_eq!(reopened, Some(PinAttempt::Granted { remaining: 2 }));
    assert_eq!(record.failed_attempts(), 1);
}

#[rstest]
fn correct_guess_clears_charged_attempts() {
    let policy = PinPolicy::default();
    let now = Utc::now();
    let mut record = PinRecord::new(PinHash::new("hash".to_owned()));
    for _ in 0..2 {
        let charged = record.reserve_attempt(now, &policy);
        assert!(matches!(charged, PinReservation::Granted { .. }));
    }

    assert!(record.register_success());
    assert_eq!(record.failed_attempts(), 0);
    assert!(!record.register_success());
}

#[rstest]
fn oversized_lockout_saturates_instead_of_overflowing() {
    let policy = PinPolicy {
        max_attempts: 1,
        lockout: TimeDelta::MAX,
    };
    let mut record = PinRecord::new(PinHash::new("hash".to_owned()));

    let reservation = granted_allowance(record.reserve_attempt(Utc::now(), &policy));

    assert_eq!(
        reservation,
        Some(PinAttempt::Final {
            until: DateTime::<Utc>::MAX_UTC
        })
    );
}

#[rstest]
#[case(0, false)]
#[case(1, true)]
#[case(5, true)]
#[case(6, false)]
fn stars_range(#[case] value: u8, #[case] valid: bool) {
    assert_eq!(Stars::new(value).is_ok(), valid);
}

#[rstest]
fn ratings_need_a_completed_request() -> eyre::Result<()> {
    let user = Actor::user(UserId::new());
    let (request, _) = ServiceRequest::create(tow_draft(), &user, &DefaultClock)?;

    let result = Rating::new(&request, &user, Stars::new(5)?, None, &DefaultClock);

    eyre::ensure!(
        result
            == Err(RequestDomainError::NotRateable {
                id: request.id(),
                status: RequestStatus::Initiated,
            })
    );
    Ok(())
}

#[rstest]
fn messaging_waits_for_an_operator() -> eyre::Result<()> {
    let user = Actor::user(UserId::new());
    let (request, _) = ServiceRequest::create(tow_draft(), &user, &DefaultClock)?;

    let result = RequestMessage::new(&request, &user, MessageBody::new("hello")?, &DefaultClock);

    eyre::ensure!(matches!(result, Err(RequestDomainError::MessagingClosed { .. })));
    eyre::ensure!(MessageBody::new("  ") == Err(RequestDomainError::EmptyMessage));
    Ok(())
}
