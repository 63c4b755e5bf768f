//! In-process backend calling the services directly.

use super::backend::{BackendResult, DispatchBackend};
use crate::account::domain::{Actor, ProviderId, Role, UserId};
use crate::account::services::UpdateUserRoleRequest;
use crate::dispatch::Dispatch;
use crate::distance::domain::GeoPoint;
use crate::presence::domain::{LocationFix, PresenceView};
use crate::pricing::domain::PricingRuleId;
use crate::request::{
    domain::{RequestDraft, RequestEvent, RequestId, RequestMessage, RequestView, ServiceRequest},
    ports::RequestChange,
    services::ServiceStatistics,
};
use crate::rpc::{
    ApiError,
    wire::{CreatedRequestResponse, EstimateResponse},
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Backend bound to one actor over a shared [`Dispatch`].
///
/// Errors go through the same mapping as the HTTP surface, so callers see
/// identical codes in both deployments.
#[derive(Clone)]
pub struct LocalBackend {
    dispatch: Arc<Dispatch>,
    actor: Actor,
}

impl LocalBackend {
    /// Acts as `actor`.
    #[must_use]
    pub const fn new(dispatch: Arc<Dispatch>, actor: Actor) -> Self {
        Self { dispatch, actor }
    }

    /// The caller this backend acts for.
    #[must_use]
    pub const fn actor(&self) -> Actor {
        self.actor
    }
}

fn mapped<T, E>(result: Result<T, E>) -> BackendResult<T>
where
    ApiError: From<E>,
{
    result.map_err(|err| ApiError::from(err).into())
}

#[async_trait]
impl DispatchBackend for LocalBackend {
    async fn create_service_request(
        &self,
        draft: &RequestDraft,
    ) -> BackendResult<CreatedRequestResponse> {
        let created = mapped(
            self.dispatch
                .lifecycle
                .create_request(&self.actor, draft.clone())
                .await,
        )?;
        Ok(CreatedRequestResponse {
            success: true,
            request_id: created.request.id(),
            pin: created.pin.expose().to_owned(),
        })
    }

    async fn verify_request_pin(&self, request_id: RequestId, pin: &str) -> BackendResult<bool> {
        mapped(
            self.dispatch
                .lifecycle
                .verify_pin(&self.actor, request_id, pin)
                .await,
        )
    }

    async fn cancel_service_request(
        &self,
        request_id: RequestId,
        reason: &str,
    ) -> BackendResult<()> {
        mapped(
            self.dispatch
                .lifecycle
                .cancel(&self.actor, request_id, reason)
                .await,
        )
        .map(drop)
    }

    async fn accept_request(&self, request_id: RequestId) -> BackendResult<ServiceRequest> {
        mapped(self.dispatch.lifecycle.accept(&self.actor, request_id).await)
    }

    async fn confirm_departure(&self, request_id: RequestId) -> BackendResult<ServiceRequest> {
        mapped(
            self.dispatch
                .lifecycle
                .confirm_departure(&self.actor, request_id)
                .await,
        )
    }

    async fn complete_request(&self, request_id: RequestId) -> BackendResult<ServiceRequest> {
        mapped(self.dispatch.lifecycle.complete(&self.actor, request_id).await)
    }

    async fn rate_service(
        &self,
        request_id: RequestId,
        stars: u8,
        comment: Option<String>,
    ) -> BackendResult<()> {
        mapped(
            self.dispatch
                .feedback
                .rate(&self.actor, request_id, stars, comment.as_deref())
                .await,
        )
        .map(drop)
    }

    async fn send_message(&self, request_id: RequestId, message: &str) -> BackendResult<()> {
        mapped(
            self.dispatch
                .feedback
                .send_message(&self.actor, request_id, message)
                .await,
        )
        .map(drop)
    }

    async fn get_request(&self, request_id: RequestId) -> BackendResult<RequestView> {
        mapped(
            self.dispatch
                .lifecycle
                .find_request(&self.actor, request_id)
                .await,
        )
    }

    async fn get_request_events(&self, request_id: RequestId) -> BackendResult<Vec<RequestEvent>> {
        mapped(self.dispatch.lifecycle.events(&self.actor, request_id).await)
    }

    async fn get_request_messages(
        &self,
        request_id: RequestId,
    ) -> BackendResult<Vec<RequestMessage>> {
        mapped(
            self.dispatch
                .feedback
                .messages_for(&self.actor, request_id)
                .await,
        )
    }

    async fn get_active_request(&self) -> BackendResult<Option<ServiceRequest>> {
        mapped(self.dispatch.lifecycle.active_request_for(&self.actor).await)
    }

    async fn get_available_requests_for_operator(&self) -> BackendResult<Vec<ServiceRequest>> {
        mapped(
            self.dispatch
                .lifecycle
                .available_requests_for_operator(&self.actor)
                .await,
        )
    }

    async fn upsert_operator_location(
        &self,
        fix: LocationFix,
        is_online: bool,
    ) -> BackendResult<()> {
        mapped(
            self.dispatch
                .presence
                .upsert_location(&self.actor, fix, is_online)
                .await,
        )
        .map(drop)
    }

    async fn go_offline(&self) -> BackendResult<()> {
        mapped(self.dispatch.presence.go_offline(&self.actor).await)
    }

    async fn get_operator_presence(&self, operator_id: UserId) -> BackendResult<PresenceView> {
        mapped(self.dispatch.presence.presence_of(operator_id).await)
    }

    async fn estimate_distance(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> BackendResult<EstimateResponse> {
        mapped(
            self.dispatch
                .estimator
                .trip_distance(origin, destination)
                .await,
        )
        .map(EstimateResponse::from)
    }

    async fn estimate_eta(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> BackendResult<EstimateResponse> {
        mapped(self.dispatch.estimator.eta(origin, destination).await).map(EstimateResponse::from)
    }

    async fn get_service_statistics(&self) -> BackendResult<ServiceStatistics> {
        mapped(
            self.dispatch
                .oversight
                .service_statistics(&self.actor)
                .await,
        )
    }

    async fn set_active_pricing_rule(&self, rule_id: PricingRuleId) -> BackendResult<()> {
        mapped(
            self.dispatch
                .pricing
                .set_active_rule(&self.actor, rule_id)
                .await,
        )
        .map(drop)
    }

    async fn admin_update_user_role(
        &self,
        user_id: UserId,
        new_role: Role,
        provider_id: Option<ProviderId>,
    ) -> BackendResult<()> {
        let request = UpdateUserRoleRequest {
            user_id,
            new_role,
            provider_id,
        };
        mapped(
            self.dispatch
                .accounts
                .update_user_role(&self.actor, request)
                .await,
        )
        .map(drop)
    }

    fn changes(&self) -> Option<broadcast::Receiver<RequestChange>> {
        Some(self.dispatch.feed.subscribe())
    }
}
