//! Presence classification and service tests.

use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use mockable::DefaultClock;
use rstest::{fixture, rstest};

use crate::account::domain::{Actor, ProviderId, Role, UserId};
use crate::distance::domain::GeoPoint;
use crate::presence::{
    adapters::memory::InMemoryPresenceRepository,
    domain::{LocationFix, OperatorLocation, PresenceDomainError, PresenceState, presence_state},
    services::{PresenceService, PresenceServiceError},
};

type TestService = PresenceService<InMemoryPresenceRepository, DefaultClock>;

#[fixture]
fn service() -> TestService {
    PresenceService::new(Arc::new(InMemoryPresenceRepository::new()), Arc::new(DefaultClock))
}

fn operator() -> Actor {
    Actor::operator(UserId::new(), ProviderId::new())
}

#[rstest]
#[case::fresh(Some(true), 5, PresenceState::Live)]
#[case::silent(Some(true), 120, PresenceState::Stale { age_seconds: 120 })]
#[case::signed_off(Some(false), 5, PresenceState::Offline)]
#[case::signed_off_long_ago(Some(false), 10_800, PresenceState::Offline)]
#[case::never_reported(None, 0, PresenceState::Unknown)]
fn classification(
    #[case] online: Option<bool>,
    #[case] age_seconds: i64,
    #[case] expected: PresenceState,
) {
    let now = Utc::now();
    let stored = online.map(|is_online| OperatorLocation {
        operator_id: UserId::new(),
        point: GeoPoint::new(18.4861, -69.9312).expect("valid coordinate"),
        heading: None,
        is_online,
        updated_at: now - TimeDelta::seconds(age_seconds),
    });
    assert_eq!(
        presence_state(stored.as_ref(), now, TimeDelta::seconds(60)),
        expected
    );
}

#[rstest]
#[case(360.0)]
#[case(-1.0)]
fn heading_must_be_a_compass_bearing(#[case] heading: f64) {
    assert_eq!(
        LocationFix::new(18.48, -69.93, Some(heading)),
        Err(PresenceDomainError::InvalidHeading(heading))
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn heartbeat_overwrites_single_row(service: TestService) -> eyre::Result<()> {
    let operator = operator();
    service
        .upsert_location(&operator, LocationFix::new(18.48, -69.93, Some(90.0))?, true)
        .await?;
    service
        .upsert_location(&operator, LocationFix::new(18.50, -69.95, None)?, true)
        .await?;

    let view = service.presence_of(operator.user_id()).await?;

    let stored = view.location.ok_or_else(|| eyre::eyre!("location missing"))?;
    eyre::ensure!((stored.point.lat() - 18.50).abs() < 1e-9);
    eyre::ensure!(stored.heading.is_none());
    eyre::ensure!(view.state == PresenceState::Live);
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn going_offline_keeps_last_position(service: TestService) -> eyre::Result<()> {
    let operator = operator();
    service
        .upsert_location(&operator, LocationFix::new(18.48, -69.93, None)?, true)
        .await?;

    service.go_offline(&operator).await?;

    let view = service.presence_of(operator.user_id()).await?;
    eyre::ensure!(view.state == PresenceState::Offline);
    eyre::ensure!(view.location.is_some());
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn only_operators_report_locations(service: TestService) -> eyre::Result<()> {
    let result = service
        .upsert_location(&Actor::user(UserId::new()), LocationFix::new(18.48, -69.93, None)?, true)
        .await;

    eyre::ensure!(matches!(
        result,
        Err(PresenceServiceError::Domain(PresenceDomainError::RoleNotAllowed(Role::User)))
    ));
    Ok(())
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn unknown_operator_has_no_presence(service: TestService) -> eyre::Result<()> {
    let view = service.presence_of(UserId::new()).await?;
    eyre::ensure!(view.state == PresenceState::Unknown);
    eyre::ensure!(view.location.is_none());
    Ok(())
}
