//! Backend speaking JSON to a remote `/rpc/<name>` surface.

use super::backend::{BackendError, BackendResult, DispatchBackend};
use crate::account::domain::{ProviderId, Role, UserId};
use crate::distance::domain::GeoPoint;
use crate::presence::domain::{LocationFix, PresenceView};
use crate::pricing::domain::PricingRuleId;
use crate::request::{
    domain::{RequestDraft, RequestEvent, RequestId, RequestMessage, RequestView, ServiceRequest},
    ports::RequestChange,
    services::ServiceStatistics,
};
use crate::rpc::wire::{
    CancelBody, CreateServiceRequestBody, CreatedRequestResponse, ErrorBody, EstimateBody,
    EstimateResponse, OperatorPresenceBody, RateServiceBody, RequestIdBody, SendMessageBody,
    SetActivePricingRuleBody, SuccessResponse, UpdateUserRoleBody, UpsertLocationBody,
    VerifyPinBody, VerifyPinResponse,
};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::debug;

/// Remote backend authenticated with a bearer token.
///
/// There is no push channel over plain HTTP, so [`DispatchBackend::changes`]
/// returns `None` and watchers fall back to polling.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

impl HttpBackend {
    /// Creates a backend for the server at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns [`BackendError::Transport`] when the HTTP client cannot be
    /// built.
    pub fn new(
        base_url: impl Into<String>,
        token: impl Into<String>,
        timeout: Duration,
    ) -> BackendResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| BackendError::Transport(err.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            token: token.into(),
        })
    }

    async fn call<B, T>(&self, procedure: &str, body: &B) -> BackendResult<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}/rpc/{procedure}", self.base_url);
        debug!(%url, "calling remote procedure");
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await
            .map_err(|err| BackendError::Transport(err.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return response
                .json::<T>()
                .await
                .map_err(|err| BackendError::Decode(err.to_string()));
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(BackendError::Unauthenticated);
        }
        match response.json::<ErrorBody>().await {
            Ok(body) => Err(BackendError::rejected(&body.error.code, body.error.message)),
            Err(err) => Err(BackendError::Decode(format!("{status}: {err}"))),
        }
    }

    async fn command<B>(&self, procedure: &str, body: &B) -> BackendResult<()>
    where
        B: Serialize + Sync + ?Sized,
    {
        self.call::<B, SuccessResponse>(procedure, body)
            .await
            .map(drop)
    }
}

#[async_trait]
impl DispatchBackend for HttpBackend {
    async fn create_service_request(
        &self,
        draft: &RequestDraft,
    ) -> BackendResult<CreatedRequestResponse> {
        self.call(
            "create_service_request",
            &CreateServiceRequestBody::from(draft),
        )
        .await
    }

    async fn verify_request_pin(&self, request_id: RequestId, pin: &str) -> BackendResult<bool> {
        let body = VerifyPinBody {
            request_id,
            pin: pin.to_owned(),
        };
        self.call::<_, VerifyPinResponse>("verify_request_pin", &body)
            .await
            .map(|response| response.valid)
    }

    async fn cancel_service_request(
        &self,
        request_id: RequestId,
        reason: &str,
    ) -> BackendResult<()> {
        let body = CancelBody {
            request_id,
            reason: reason.to_owned(),
        };
        self.command("cancel_service_request", &body).await
    }

    async fn accept_request(&self, request_id: RequestId) -> BackendResult<ServiceRequest> {
        self.call("accept_request", &RequestIdBody { request_id })
            .await
    }

    async fn confirm_departure(&self, request_id: RequestId) -> BackendResult<ServiceRequest> {
        self.call("confirm_departure", &RequestIdBody { request_id })
            .await
    }

    async fn complete_request(&self, request_id: RequestId) -> BackendResult<ServiceRequest> {
        self.call("complete_request", &RequestIdBody { request_id })
            .await
    }

    async fn rate_service(
        &self,
        request_id: RequestId,
        stars: u8,
        comment: Option<String>,
    ) -> BackendResult<()> {
        let body = RateServiceBody {
            request_id,
            stars,
            comment,
        };
        self.command("rate_service", &body).await
    }

    async fn send_message(&self, request_id: RequestId, message: &str) -> BackendResult<()> {
        let body = SendMessageBody {
            request_id,
            message: message.to_owned(),
        };
        self.command("send_message", &body).await
    }

    async fn get_request(&self, request_id: RequestId) -> BackendResult<RequestView> {
        self.call("get_request", &RequestIdBody { request_id }).await
    }

    async fn get_request_events(&self, request_id: RequestId) -> BackendResult<Vec<RequestEvent>> {
        self.call("get_request_events", &RequestIdBody { request_id })
            .await
    }

    async fn get_request_messages(
        &self,
        request_id: RequestId,
    ) -> BackendResult<Vec<RequestMessage>> {
        self.call("get_request_messages", &RequestIdBody { request_id })
            .await
    }

    async fn get_active_request(&self) -> BackendResult<Option<ServiceRequest>> {
        self.call("get_active_request", &json!({})).await
    }

    async fn get_available_requests_for_operator(&self) -> BackendResult<Vec<ServiceRequest>> {
        self.call("get_available_requests_for_operator", &json!({}))
            .await
    }

    async fn upsert_operator_location(
        &self,
        fix: LocationFix,
        is_online: bool,
    ) -> BackendResult<()> {
        let body = UpsertLocationBody {
            lat: fix.point().lat(),
            lng: fix.point().lng(),
            heading: fix.heading(),
            is_online,
        };
        self.command("upsert_operator_location", &body).await
    }

    async fn go_offline(&self) -> BackendResult<()> {
        self.command("go_offline", &json!({})).await
    }

    async fn get_operator_presence(&self, operator_id: UserId) -> BackendResult<PresenceView> {
        self.call("get_operator_presence", &OperatorPresenceBody { operator_id })
            .await
    }

    async fn estimate_distance(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> BackendResult<EstimateResponse> {
        self.call(
            "estimate_distance",
            &EstimateBody {
                origin,
                destination,
            },
        )
        .await
    }

    async fn estimate_eta(
        &self,
        origin: GeoPoint,
        destination: GeoPoint,
    ) -> BackendResult<EstimateResponse> {
        self.call(
            "estimate_eta",
            &EstimateBody {
                origin,
                destination,
            },
        )
        .await
    }

    async fn get_service_statistics(&self) -> BackendResult<ServiceStatistics> {
        self.call("get_service_statistics", &json!({})).await
    }

    async fn set_active_pricing_rule(&self, rule_id: PricingRuleId) -> BackendResult<()> {
        self.command(
            "set_active_pricing_rule",
            &SetActivePricingRuleBody { rule_id },
        )
        .await
    }

    async fn admin_update_user_role(
        &self,
        user_id: UserId,
        new_role: Role,
        provider_id: Option<ProviderId>,
    ) -> BackendResult<()> {
        let body = UpdateUserRoleBody {
            user_id,
            new_role,
            provider_id,
        };
        self.command("admin_update_user_role", &body).await
    }

    fn changes(&self) -> Option<broadcast::Receiver<RequestChange>> {
        None
    }
}
