//! Shared fixtures for client tests.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::DefaultClock;
use tokio::sync::{Notify, Semaphore, broadcast};

use crate::account::{
    domain::{Actor, ProviderId, Role, UserId},
    services::RegisterProfileRequest,
};
use crate::client::{BackendResult, DispatchBackend, LocalBackend};
use crate::dispatch::{Dispatch, DispatchIntegrations, DispatchSettings, DispatchStores};
use crate::distance::domain::GeoPoint;
use crate::presence::domain::{LocationFix, PresenceView};
use crate::pricing::domain::PricingRuleId;
use crate::request::{
    domain::{
        Place, RequestDraft, RequestEvent, RequestId, RequestMessage, RequestView, ServiceRequest,
        ServiceType, TowType,
    },
    ports::RequestChange,
    services::ServiceStatistics,
};
use crate::rpc::wire::{CreatedRequestResponse, EstimateResponse};

pub(super) fn point(lat: f64, lng: f64) -> GeoPoint {
    GeoPoint::new(lat, lng).expect("valid coordinate")
}

pub(super) fn tow_draft() -> RequestDraft {
    RequestDraft::new(ServiceType::Tow, Place::new(point(18.4861, -69.9312)))
        .with_tow(TowType::Light, Place::new(point(18.5300, -70.0100)))
}

/// A freshly initiated request owned by a random user.
pub(super) fn initiated_request() -> ServiceRequest {
    let (request, _) = ServiceRequest::create(tow_draft(), &Actor::user(UserId::new()), &DefaultClock)
        .expect("valid draft");
    request
}

/// An in-memory dispatch core with one user and one operator.
pub(super) struct Core {
    pub(super) dispatch: Arc<Dispatch>,
    pub(super) user: Actor,
    pub(super) operator: Actor,
}

impl Core {
    pub(super) async fn new() -> Self {
        let integrations = DispatchIntegrations::offline(4).expect("offline integrations");
        let dispatch = Arc::new(Dispatch::new(
            DispatchStores::in_memory(),
            integrations,
            DispatchSettings::default(),
        ));
        let provider = dispatch
            .accounts
            .register_provider("Auxilio Vial Cibao")
            .await
            .expect("provider");
        let user = Actor::user(UserId::new());
        let operator = Actor::operator(UserId::new(), provider.id());
        for (actor, name) in [(user, "Marisol"), (operator, "Wilkin")] {
            dispatch
                .accounts
                .register_profile(
                    RegisterProfileRequest::new(actor.user_id(), name)
                        .with_role(actor.role(), actor.provider_id()),
                )
                .await
                .expect("profile");
        }
        Self {
            dispatch,
            user,
            operator,
        }
    }

    pub(super) fn backend(&self, actor: Actor) -> Arc<LocalBackend> {
        Arc::new(LocalBackend::new(Arc::clone(&self.dispatch), actor))
    }
}

/// Backend whose location reports wait for the test to let them through.
///
/// Everything else goes straight to the wrapped backend.
pub(super) struct GatedReports {
    inner: Arc<LocalBackend>,
    pub(super) started: Notify,
    pub(super) release: Semaphore,
}

impl GatedReports {
    pub(super) fn new(inner: Arc<LocalBackend>) -> Self {
        Self {
            inner,
            started: Notify::new(),
            release: Semaphore::new(0),
        }
    }
}

#[async_trait]
impl DispatchBackend for GatedReports {
    async fn create_service_request(
        &self,
        draft: &RequestDraft,
    ) -> BackendResult<CreatedRequestResponse> {
        self.inner.create_service_request(draft).await
    }

    async fn verify_request_pin(&self, request_id: RequestId, pin: &str) -> BackendResult<bool> {
        self.inner.verify_request_pin(request_id, pin).await
    }

    async fn cancel_service_request(
        &self,
        request_id: RequestId,
        reason: &str,
    ) -> BackendResult<()> {
        self.inner.cancel_service_request(request_id, reason).await
    }

    async fn accept_request(&self, request_id: RequestId) -> BackendResult<ServiceRequest> {
        self.inner.accept_request(request_id).await
    }

    async fn confirm_departure(&self, request_id: RequestId) -> BackendResult<ServiceRequest> {
        self.inner.confirm_departure(request_id).await
    }

    async fn complete_request(&self, request_id: RequestId) -> BackendResult<ServiceRequest> {
        self.inner.complete_request(request_id).await
    }

    async fn rate_service(
        &self,
        request_id: RequestId,
        stars: u8,
        comment: Option<String>,
    ) -> BackendResult<()> {
        self.inner.rate_service(request_id, stars, comment).await
    }

    async fn send_message(&self, request_id: RequestId, message: &str) -> BackendResult<()> {
        self.inner.send_message(request_id, message).await
    }

    async fn get_request(&self, request_id: RequestId) -> BackendResult<RequestView> {
        self.inner.get_request(request_id).await
    }

    async fn get_request_events(&self, request_id: RequestId) -> BackendResult<Vec<RequestEvent>> {
        self.inner.get_request_events(request_id).await
    }

    async fn get_request_messages(
        &self,
        request_id: RequestId,
    ) -> BackendResult<Vec<RequestMessage>> {
        self.inner.get_request_messages(request_id).await
    }

    async fn get_active_request(&self) -> BackendResult<Option<ServiceRequest>> {
        self.inner.get_active_request().await
    }

    async fn get_available_requests_for_operator(&self) -> BackendResult<Vec<ServiceRequest>> {
        self.inner.get_available_requests_for_operator().await
    }

    async fn upsert_operator_location(
        &self,
        fix: LocationFix,
        is_online: bool,
    ) -> BackendResult<()> {
        self.started.notify_one();
        let permit = self.release.acquire().await.expect("gate open");
        permit.forget();
        self.inner.upsert_operator_location(fix, is_online).await
    }

    async fn go_offline(&self) -> BackendResult<()> {
        self.inner.go_offline().await
    }

    async fn get_operator_presence(&self, operator_id: UserId) -> BackendResult<PresenceView> {
        self.inner.get_operator_presence(operator_id).await
    }

    async fn estimate_distance(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> BackendResult<EstimateResponse> {
        self.inner.estimate_distance(origin, destination).await
    }

    async fn estimate_eta(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> BackendResult<EstimateResponse> {
        self.inner.estimate_eta(origin, destination).await
    }

    async fn get_service_statistics(&self) -> BackendResult<ServiceStatistics> {
        self.inner.get_service_statistics().await
    }

    async fn set_active_pricing_rule(&self, rule_id: PricingRuleId) -> BackendResult<()> {
        self.inner.set_active_pricing_rule(rule_id).await
    }

    async fn admin_update_user_role(
        &self,
        user_id: UserId,
        new_role: Role,
        provider_id: Option<ProviderId>,
    ) -> BackendResult<()> {
        self.inner
            .admin_update_user_role(user_id, new_role, provider_id)
            .await
    }

    fn changes(&self) -> Option<broadcast::Receiver<RequestChange>> {
        self.inner.changes()
    }
}
