//! The HTTP client against a live router on a loopback port.

use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use mockable::DefaultClock;
use tokio::net::TcpListener;
use towline::account::{
    domain::{Actor, UserId},
    services::RegisterProfileRequest,
};
use towline::client::{
    BackendError, ClaimOutcome, DispatchBackend, HttpBackend, MemoryPinStore, OperatorSession,
    RequestSync, UserSession,
};
use towline::dispatch::{Dispatch, DispatchIntegrations, DispatchSettings, DispatchStores};
use towline::distance::domain::GeoPoint;
use towline::request::domain::{Place, RequestDraft, RequestStatus, ServiceType, TowType};
use towline::rpc::{RpcLimits, RpcState, SessionKeys, router};

const SECRET: &[u8] = b"http-backend-test-secret";
const TIMEOUT: Duration = Duration::from_secs(10);

struct Server {
    base_url: String,
    keys: SessionKeys,
    dispatch: Arc<Dispatch>,
}

impl Server {
    async fn start() -> eyre::Result<Self> {
        let dispatch = Arc::new(Dispatch::new(
            DispatchStores::in_memory(),
            DispatchIntegrations::offline(4)?,
            DispatchSettings::default(),
        ));
        let keys = SessionKeys::from_secret(SECRET);
        let app = router(
            RpcState::new(Arc::clone(&dispatch), keys.clone()),
            RpcLimits::default(),
        );
        let listener = TcpListener::bind("127.0.0.1:0").await?;
        let base_url = format!("http://{}", listener.local_addr()?);
        tokio::spawn(async move { axum::serve(listener, app).await });
        Ok(Self {
            base_url,
            keys,
            dispatch,
        })
    }

    async fn enrol(&self, actor: Actor, name: &str) -> eyre::Result<HttpBackend> {
        self.dispatch
            .accounts
            .register_profile(
                RegisterProfileRequest::new(actor.user_id(), name)
                    .with_role(actor.role(), actor.provider_id()),
            )
            .await?;
        self.backend_for(actor.user_id())
    }

    fn backend_for(&self, user_id: UserId) -> eyre::Result<HttpBackend> {
        let token = self.keys.issue(user_id, TimeDelta::hours(1), &DefaultClock)?;
        Ok(HttpBackend::new(&self.base_url, token, TIMEOUT)?)
    }
}

fn light_tow() -> eyre::Result<RequestDraft> {
    let pickup = GeoPoint::new(18.4861, -69.9312)?;
    let dropoff = GeoPoint::new(18.5300, -70.0100)?;
    Ok(RequestDraft::new(ServiceType::Tow, Place::new(pickup))
        .with_tow(TowType::Light, Place::new(dropoff)))
}

#[tokio::test(flavor = "multi_thread")]
async fn lifecycle_round_trips_over_http() -> eyre::Result<()> {
    let server = Server::start().await?;
    let provider = server
        .dispatch
        .accounts
        .register_provider("Grúas del Este")
        .await?;
    let customer = Arc::new(server.enrol(Actor::user(UserId::new()), "Ana").await?);
    let operator = OperatorSession::new(Arc::new(
        server
            .enrol(Actor::operator(UserId::new(), provider.id()), "Luis")
            .await?,
    ));
    let rival = OperatorSession::new(Arc::new(
        server
            .enrol(Actor::operator(UserId::new(), provider.id()), "Ramón")
            .await?,
    ));
    let user = UserSession::new(
        Arc::clone(&customer) as Arc<dyn DispatchBackend>,
        Arc::new(MemoryPinStore::new()),
    );

    let created = user.create(&light_tow()?).await?;
    let claimed = operator.accept(created.request_id).await?;
    let lost = rival.accept(created.request_id).await?;
    operator.depart(created.request_id).await?;
    let pin = user
        .pin(created.request_id)
        .await?
        .ok_or_else(|| eyre::eyre!("PIN was not kept"))?;
    let verified = operator.verify_pin(created.request_id, &pin).await?;
    let completed = operator.complete(created.request_id).await?;
    user.rate(created.request_id, 5, Some("Muy amable".to_owned()))
        .await?;

    assert!(matches!(claimed, ClaimOutcome::Claimed(_)));
    assert_eq!(
        lost,
        ClaimOutcome::NoLongerAvailable {
            refreshed: Vec::new()
        }
    );
    assert!(verified);
    assert_eq!(completed.status(), RequestStatus::Completed);
    assert_eq!(user.pin(created.request_id).await?, None);
    assert_eq!(
        customer.get_request_events(created.request_id).await?.len(),
        5
    );
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn rejections_keep_their_codes() -> eyre::Result<()> {
    let server = Server::start().await?;
    let customer = server.enrol(Actor::user(UserId::new()), "Ana").await?;
    let created = customer.create_service_request(&light_tow()?).await?;

    let missing_reason = customer
        .cancel_service_request(created.request_id, "  ")
        .await
        .expect_err("blank reason is refused");
    let duplicate = customer
        .create_service_request(&light_tow()?)
        .await
        .expect_err("second open request is refused");
    let statistics = customer
        .get_service_statistics()
        .await
        .expect_err("users cannot read statistics");

    assert_eq!(missing_reason.code(), Some("missing_reason"));
    assert_eq!(duplicate.code(), Some("active_request_exists"));
    assert_eq!(statistics.code(), Some("forbidden"));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_callers_are_unauthenticated() -> eyre::Result<()> {
    let server = Server::start().await?;
    let stranger = server.backend_for(UserId::new())?;

    let err = stranger
        .get_active_request()
        .await
        .expect_err("no profile behind the token");

    assert_eq!(err, BackendError::Unauthenticated);
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn unreachable_server_is_a_transport_error() -> eyre::Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let address = listener.local_addr()?;
    drop(listener);
    let backend = HttpBackend::new(format!("http://{address}"), "token", TIMEOUT)?;

    let err = backend
        .get_active_request()
        .await
        .expect_err("nothing is listening");

    assert!(matches!(err, BackendError::Transport(_)));
    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn polling_sync_follows_remote_changes() -> eyre::Result<()> {
    let server = Server::start().await?;
    let customer: Arc<dyn DispatchBackend> =
        Arc::new(server.enrol(Actor::user(UserId::new()), "Ana").await?);
    assert!(customer.changes().is_none());
    let sync = RequestSync::start(Arc::clone(&customer), Duration::from_millis(20));
    let mut watched = sync.subscribe();

    let created = customer.create_service_request(&light_tow()?).await?;
    tokio::time::timeout(
        TIMEOUT,
        watched.wait_for(|held| {
            held.as_ref()
                .is_some_and(|request| request.id() == created.request_id)
        }),
    )
    .await??;
    customer
        .cancel_service_request(created.request_id, "Ya encendió el carro")
        .await?;
    tokio::time::timeout(TIMEOUT, watched.wait_for(Option::is_none)).await??;

    sync.stop().await;
    Ok(())
}
