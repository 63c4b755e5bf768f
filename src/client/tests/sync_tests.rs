//! Active request mirroring and position streaming.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::{broadcast, mpsc};

use super::support::{Core, GatedReports, initiated_request, point, tow_draft};
use crate::client::{DispatchBackend, LocationTracker, MockDispatchBackend, RequestSync};
use crate::presence::domain::{LocationFix, PresenceState};
use crate::request::{
    domain::{RequestId, RequestStatus, ServiceRequest},
    ports::{ChangeKind, RequestChange},
};

const SETTLE: Duration = Duration::from_secs(5);

fn has_status(held: &Option<ServiceRequest>, status: RequestStatus) -> bool {
    held.as_ref().is_some_and(|request| request.status() == status)
}

#[tokio::test(flavor = "multi_thread")]
async fn feed_cues_refresh_the_mirror() -> eyre::Result<()> {
    let core = Core::new().await;
    let user = core.backend(core.user);
    let operator = core.backend(core.operator);
    let created = user.create_service_request(&tow_draft()).await?;
    let sync = RequestSync::start(user, Duration::from_secs(3600));
    let mut watched = sync.subscribe();

    tokio::time::timeout(SETTLE, watched.wait_for(|held| has_status(held, RequestStatus::Initiated)))
        .await??;
    operator.accept_request(created.request_id).await?;
    tokio::time::timeout(SETTLE, watched.wait_for(|held| has_status(held, RequestStatus::Assigned)))
        .await??;

    assert_eq!(
        sync.current().map(|request| request.id()),
        Some(created.request_id)
    );
    sync.stop().await;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn lagging_feed_still_triggers_a_refetch() -> eyre::Result<()> {
    let (feed, _) = broadcast::channel(1);
    let request = initiated_request();
    let mut backend = MockDispatchBackend::new();
    let mut handed_out = Some(feed.subscribe());
    backend
        .expect_changes()
        .times(1)
        .returning(move || handed_out.take());
    let calls = AtomicUsize::new(0);
    backend.expect_get_active_request().returning(move || {
        let seen = calls.fetch_add(1, Ordering::SeqCst);
        Ok((seen > 0).then(|| request.clone()))
    });

    let sync = RequestSync::start(Arc::new(backend), Duration::from_secs(3600));
    let mut watched = sync.subscribe();
    for _ in 0..3 {
        feed.send(RequestChange {
            request_id: RequestId::new(),
            kind: ChangeKind::Message,
        })?;
    }

    tokio::time::timeout(SETTLE, watched.wait_for(Option::is_some)).await??;
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn backends_without_a_feed_are_polled() -> eyre::Result<()> {
    let request = initiated_request();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let mut backend = MockDispatchBackend::new();
    backend.expect_changes().returning(|| None);
    backend.expect_get_active_request().returning(move || {
        let seen = counter.fetch_add(1, Ordering::SeqCst);
        Ok((seen >= 2).then(|| request.clone()))
    });

    let sync = RequestSync::start(Arc::new(backend), Duration::from_millis(10));
    let mut watched = sync.subscribe();

    tokio::time::timeout(SETTLE, watched.wait_for(Option::is_some)).await??;
    assert!(calls.load(Ordering::SeqCst) >= 3);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn stopped_sync_no_longer_polls() -> eyre::Result<()> {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let mut backend = MockDispatchBackend::new();
    backend.expect_changes().returning(|| None);
    backend.expect_get_active_request().returning(move || {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(None)
    });
    let sync = RequestSync::start(Arc::new(backend), Duration::from_millis(5));
    tokio::time::timeout(SETTLE, async {
        while calls.load(Ordering::SeqCst) < 2 {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await?;

    sync.stop().await;
    let settled = calls.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_millis(50)).await;

    eyre::ensure!(calls.load(Ordering::SeqCst) == settled);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn tracker_reports_fixes_and_signs_off_on_stop() -> eyre::Result<()> {
    let core = Core::new().await;
    let operator = core.backend(core.operator);
    let (fixes, source) = mpsc::channel(4);
    let tracker = LocationTracker::start(Arc::clone(&operator) as Arc<dyn DispatchBackend>, source);

    let here = point(18.47, -69.90);
    fixes
        .send(LocationFix::new(here.lat(), here.lng(), Some(45.0))?)
        .await?;
    let operator_id = core.operator.user_id();
    tokio::time::timeout(SETTLE, async {
        loop {
            let view = operator.get_operator_presence(operator_id).await?;
            if view.state == PresenceState::Live {
                return Ok::<_, eyre::Report>(());
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await??;
    tracker.stop().await?;

    let after = operator.get_operator_presence(operator_id).await?;
    assert_eq!(after.state, PresenceState::Offline);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn tracker_stop_waits_for_the_report_in_flight() -> eyre::Result<()> {
    let core = Core::new().await;
    let operator = core.backend(core.operator);
    let gated = Arc::new(GatedReports::new(Arc::clone(&operator)));
    let (fixes, source) = mpsc::channel(4);
    let tracker = LocationTracker::start(Arc::clone(&gated) as Arc<dyn DispatchBackend>, source);
    fixes.send(LocationFix::new(18.47, -69.90, None)?).await?;
    tokio::time::timeout(SETTLE, gated.started.notified()).await?;

    let stopping = tokio::spawn(tracker.stop());
    tokio::time::sleep(Duration::from_millis(50)).await;
    eyre::ensure!(!stopping.is_finished(), "signed off while a report was pending");
    gated.release.add_permits(1);
    tokio::time::timeout(SETTLE, stopping).await???;

    let after = operator
        .get_operator_presence(core.operator.user_id())
        .await?;
    eyre::ensure!(after.state == PresenceState::Offline);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn tracker_stop_calls_go_offline_once() -> eyre::Result<()> {
    let mut backend = MockDispatchBackend::new();
    backend.expect_upsert_operator_location().never();
    backend.expect_go_offline().times(1).returning(|| Ok(()));
    let (_fixes, source) = mpsc::channel(1);

    let tracker = LocationTracker::start(Arc::new(backend), source);
    tracker.stop().await?;
    Ok(())
}
