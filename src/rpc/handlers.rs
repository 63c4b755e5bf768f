//! One handler per remote procedure.

use super::wire::{
    CancelBody, CreatePricingRuleBody, CreateServiceRequestBody, CreatedRequestResponse,
    EstimateBody, EstimateResponse, OperatorPresenceBody, RateServiceBody, RegisterProfileBody,
    RegisterProviderBody, RequestIdBody, SendMessageBody, SetActivePricingRuleBody,
    SuccessResponse, UpdateUserRoleBody, UpsertLocationBody, UpsertServiceRateBody,
    VerifyPinBody, VerifyPinResponse,
};
use super::{ApiError, RpcBody, RpcState, Session, TokenSubject};
use crate::account::{
    domain::{Profile, Provider, Role},
    services::{RegisterProfileRequest, UpdateUserRoleRequest},
};
use crate::presence::domain::{LocationFix, PresenceView};
use crate::pricing::domain::{PricingRule, ServiceRate};
use crate::request::domain::{RequestEvent, RequestMessage, RequestView, ServiceRequest};
use crate::request::services::ServiceStatistics;
use axum::Json;
use axum::extract::State;

type RpcResult<T> = Result<Json<T>, ApiError>;

pub(super) async fn create_service_request(
    State(state): State<RpcState>,
    Session(actor): Session,
    RpcBody(body): RpcBody<CreateServiceRequestBody>,
) -> RpcResult<CreatedRequestResponse> {
    let draft = body.into_draft()?;
    let created = state.dispatch.lifecycle.create_request(&actor, draft).await?;
    Ok(Json(CreatedRequestResponse {
        success: true,
        request_id: created.request.id(),
        pin: created.pin.expose().to_owned(),
    }))
}

pub(super) async fn verify_request_pin(
    State(state): State<RpcState>,
    Session(actor): Session,
    RpcBody(body): RpcBody<VerifyPinBody>,
) -> RpcResult<VerifyPinResponse> {
    let valid = state
        .dispatch
        .lifecycle
        .verify_pin(&actor, body.request_id, &body.pin)
        .await?;
    Ok(Json(VerifyPinResponse { valid }))
}

pub(super) async fn cancel_service_request(
    State(state): State<RpcState>,
    Session(actor): Session,
    RpcBody(body): RpcBody<CancelBody>,
) -> RpcResult<SuccessResponse> {
    state
        .dispatch
        .lifecycle
        .cancel(&actor, body.request_id, &body.reason)
        .await?;
    Ok(Json(SuccessResponse::OK))
}

pub(super) async fn accept_request(
    State(state): State<RpcState>,
    Session(actor): Session,
    RpcBody(body): RpcBody<RequestIdBody>,
) -> RpcResult<ServiceRequest> {
    Ok(Json(
        state.dispatch.lifecycle.accept(&actor, body.request_id).await?,
    ))
}

pub(super) async fn confirm_departure(
    State(state): State<RpcState>,
    Session(actor): Session,
    RpcBody(body): RpcBody<RequestIdBody>,
) -> RpcResult<ServiceRequest> {
    Ok(Json(
        state
            .dispatch
            .lifecycle
            .confirm_departure(&actor, body.request_id)
            .await?,
    ))
}

pub(super) async fn complete_request(
    State(state): State<RpcState>,
    Session(actor): Session,
    RpcBody(body): RpcBody<RequestIdBody>,
) -> RpcResult<ServiceRequest> {
    Ok(Json(
        state.dispatch.lifecycle.complete(&actor, body.request_id).await?,
    ))
}

pub(super) async fn get_request(
    State(state): State<RpcState>,
    Session(actor): Session,
    RpcBody(body): RpcBody<RequestIdBody>,
) -> RpcResult<RequestView> {
    Ok(Json(
        state
            .dispatch
            .lifecycle
            .find_request(&actor, body.request_id)
            .await?,
    ))
}

pub(super) async fn get_request_events(
    State(state): State<RpcState>,
    Session(actor): Session,
    RpcBody(body): RpcBody<RequestIdBody>,
) -> RpcResult<Vec<RequestEvent>> {
    Ok(Json(
        state.dispatch.lifecycle.events(&actor, body.request_id).await?,
    ))
}

pub(super) async fn get_active_request(
    State(state): State<RpcState>,
    Session(actor): Session,
) -> RpcResult<Option<ServiceRequest>> {
    Ok(Json(state.dispatch.lifecycle.active_request_for(&actor).await?))
}

pub(super) async fn get_available_requests_for_operator(
    State(state): State<RpcState>,
    Session(actor): Session,
) -> RpcResult<Vec<ServiceRequest>> {
    Ok(Json(
        state
            .dispatch
            .lifecycle
            .available_requests_for_operator(&actor)
            .await?,
    ))
}

pub(super) async fn rate_service(
    State(state): State<RpcState>,
    Session(actor): Session,
    RpcBody(body): RpcBody<RateServiceBody>,
) -> RpcResult<SuccessResponse> {
    state
        .dispatch
        .feedback
        .rate(&actor, body.request_id, body.stars, body.comment.as_deref())
        .await?;
    Ok(Json(SuccessResponse::OK))
}

pub(super) async fn send_message(
    State(state): State<RpcState>,
    Session(actor): Session,
    RpcBody(body): RpcBody<SendMessageBody>,
) -> RpcResult<SuccessResponse> {
    state
        .dispatch
        .feedback
        .send_message(&actor, body.request_id, &body.message)
        .await?;
    Ok(Json(SuccessResponse::OK))
}

pub(super) async fn get_request_messages(
    State(state): State<RpcState>,
    Session(actor): Session,
    RpcBody(body): RpcBody<RequestIdBody>,
) -> RpcResult<Vec<RequestMessage>> {
    Ok(Json(
        state
            .dispatch
            .feedback
            .messages_for(&actor, body.request_id)
            .await?,
    ))
}

pub(super) async fn create_pricing_rule(
    State(state): State<RpcState>,
    Session(actor): Session,
    RpcBody(body): RpcBody<CreatePricingRuleBody>,
) -> RpcResult<PricingRule> {
    Ok(Json(
        state.dispatch.pricing.create_rule(&actor, body.into()).await?,
    ))
}

pub(super) async fn set_active_pricing_rule(
    State(state): State<RpcState>,
    Session(actor): Session,
    RpcBody(body): RpcBody<SetActivePricingRuleBody>,
) -> RpcResult<SuccessResponse> {
    state
        .dispatch
        .pricing
        .set_active_rule(&actor, body.rule_id)
        .await?;
    Ok(Json(SuccessResponse::OK))
}

pub(super) async fn get_pricing_rules(
    State(state): State<RpcState>,
    Session(actor): Session,
) -> RpcResult<Vec<PricingRule>> {
    Ok(Json(state.dispatch.pricing.list_rules(&actor).await?))
}

pub(super) async fn upsert_service_rate(
    State(state): State<RpcState>,
    Session(actor): Session,
    RpcBody(body): RpcBody<UpsertServiceRateBody>,
) -> RpcResult<ServiceRate> {
    Ok(Json(
        state
            .dispatch
            .pricing
            .upsert_rate(&actor, body.service_type, body.base_price, body.extra_fee)
            .await?,
    ))
}

pub(super) async fn admin_update_user_role(
    State(state): State<RpcState>,
    Session(actor): Session,
    RpcBody(body): RpcBody<UpdateUserRoleBody>,
) -> RpcResult<SuccessResponse> {
    state
        .dispatch
        .accounts
        .update_user_role(
            &actor,
            UpdateUserRoleRequest {
                user_id: body.user_id,
                new_role: body.new_role,
                provider_id: body.provider_id,
            },
        )
        .await?;
    Ok(Json(SuccessResponse::OK))
}

pub(super) async fn register_profile(
    State(state): State<RpcState>,
    TokenSubject(user_id): TokenSubject,
    RpcBody(body): RpcBody<RegisterProfileBody>,
) -> RpcResult<Profile> {
    let mut request = RegisterProfileRequest::new(user_id, body.full_name);
    if let Some(phone) = body.phone {
        request = request.with_phone(phone);
    }
    Ok(Json(state.dispatch.accounts.register_profile(request).await?))
}

pub(super) async fn register_provider(
    State(state): State<RpcState>,
    Session(actor): Session,
    RpcBody(body): RpcBody<RegisterProviderBody>,
) -> RpcResult<Provider> {
    if !actor.has_role(Role::Admin) {
        return Err(ApiError::forbidden(format!(
            "role {} may not register providers",
            actor.role()
        )));
    }
    Ok(Json(
        state.dispatch.accounts.register_provider(&body.name).await?,
    ))
}

pub(super) async fn upsert_operator_location(
    State(state): State<RpcState>,
    Session(actor): Session,
    RpcBody(body): RpcBody<UpsertLocationBody>,
) -> RpcResult<SuccessResponse> {
    let fix = LocationFix::new(body.lat, body.lng, body.heading)?;
    state
        .dispatch
        .presence
        .upsert_location(&actor, fix, body.is_online)
        .await?;
    Ok(Json(SuccessResponse::OK))
}

pub(super) async fn go_offline(
    State(state): State<RpcState>,
    Session(actor): Session,
) -> RpcResult<SuccessResponse> {
    state.dispatch.presence.go_offline(&actor).await?;
    Ok(Json(SuccessResponse::OK))
}

pub(super) async fn get_operator_presence(
    State(state): State<RpcState>,
    Session(_actor): Session,
    RpcBody(body): RpcBody<OperatorPresenceBody>,
) -> RpcResult<PresenceView> {
    Ok(Json(
        state.dispatch.presence.presence_of(body.operator_id).await?,
    ))
}

pub(super) async fn get_service_statistics(
    State(state): State<RpcState>,
    Session(actor): Session,
) -> RpcResult<ServiceStatistics> {
    Ok(Json(
        state.dispatch.oversight.service_statistics(&actor).await?,
    ))
}

pub(super) async fn estimate_distance(
    State(state): State<RpcState>,
    Session(_actor): Session,
    RpcBody(body): RpcBody<EstimateBody>,
) -> RpcResult<EstimateResponse> {
    let estimate = state
        .dispatch
        .estimator
        .trip_distance(body.origin, body.destination)
        .await?;
    Ok(Json(estimate.into()))
}

pub(super) async fn estimate_eta(
    State(state): State<RpcState>,
    Session(_actor): Session,
    RpcBody(body): RpcBody<EstimateBody>,
) -> RpcResult<EstimateResponse> {
    let estimate = state
        .dispatch
        .estimator
        .eta(body.origin, body.destination)
        .await?;
    Ok(Json(estimate.into()))
}
