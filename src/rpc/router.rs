//! Route table and middleware stack.

use super::{ApiError, RpcState, handlers};
use crate::config::DispatchConfig;
use axum::BoxError;
use axum::Router;
use axum::error_handling::HandleErrorLayer;
use axum::http::{StatusCode, Uri};
use axum::routing::post;
use std::time::Duration;
use tower::ServiceBuilder;
use tower::limit::ConcurrencyLimitLayer;
use tower::timeout::TimeoutLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Load limits applied in front of every handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RpcLimits {
    /// Upper bound on handling one call.
    pub request_timeout: Duration,
    /// Calls handled at once.
    pub max_concurrent_requests: usize,
}

impl Default for RpcLimits {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
            max_concurrent_requests: 1024,
        }
    }
}

impl RpcLimits {
    /// Reads the limits from process configuration.
    #[must_use]
    pub const fn from_config(config: &DispatchConfig) -> Self {
        Self {
            request_timeout: config.request_timeout,
            max_concurrent_requests: config.max_concurrent_requests,
        }
    }
}

/// Builds the `/rpc/<name>` router.
#[must_use]
pub fn router(state: RpcState, limits: RpcLimits) -> Router {
    Router::new()
        .route(
            "/rpc/create_service_request",
            post(handlers::create_service_request),
        )
        .route("/rpc/verify_request_pin", post(handlers::verify_request_pin))
        .route(
            "/rpc/cancel_service_request",
            post(handlers::cancel_service_request),
        )
        .route("/rpc/accept_request", post(handlers::accept_request))
        .route("/rpc/confirm_departure", post(handlers::confirm_departure))
        .route("/rpc/complete_request", post(handlers::complete_request))
        .route("/rpc/get_request", post(handlers::get_request))
        .route("/rpc/get_request_events", post(handlers::get_request_events))
        .route(
            "/rpc/get_request_messages",
            post(handlers::get_request_messages),
        )
        .route("/rpc/get_active_request", post(handlers::get_active_request))
        .route(
            "/rpc/get_available_requests_for_operator",
            post(handlers::get_available_requests_for_operator),
        )
        .route("/rpc/rate_service", post(handlers::rate_service))
        .route("/rpc/send_message", post(handlers::send_message))
        .route("/rpc/create_pricing_rule", post(handlers::create_pricing_rule))
        .route(
            "/rpc/set_active_pricing_rule",
            post(handlers::set_active_pricing_rule),
        )
        .route("/rpc/get_pricing_rules", post(handlers::get_pricing_rules))
        .route("/rpc/upsert_service_rate", post(handlers::upsert_service_rate))
        .route(
            "/rpc/admin_update_user_role",
            post(handlers::admin_update_user_role),
        )
        .route("/rpc/register_profile", post(handlers::register_profile))
        .route("/rpc/register_provider", post(handlers::register_provider))
        .route(
            "/rpc/upsert_operator_location",
            post(handlers::upsert_operator_location),
        )
        .route("/rpc/go_offline", post(handlers::go_offline))
        .route(
            "/rpc/get_operator_presence",
            post(handlers::get_operator_presence),
        )
        .route(
            "/rpc/get_service_statistics",
            post(handlers::get_service_statistics),
        )
        .route("/rpc/estimate_distance", post(handlers::estimate_distance))
        .route("/rpc/estimate_eta", post(handlers::estimate_eta))
        .fallback(unknown_procedure)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(ConcurrencyLimitLayer::new(limits.max_concurrent_requests))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_timeout))
                .layer(TimeoutLayer::new(limits.request_timeout)),
        )
        .with_state(state)
}

#[expect(clippy::unused_async, reason = "axum fallbacks are async handlers")]
async fn unknown_procedure(uri: Uri) -> ApiError {
    ApiError::not_found(format!("no procedure at {}", uri.path()))
}

#[expect(clippy::unused_async, reason = "HandleErrorLayer expects an async handler")]
async fn handle_timeout(err: BoxError) -> ApiError {
    if err.is::<tower::timeout::error::Elapsed>() {
        ApiError::new(StatusCode::GATEWAY_TIMEOUT, "timeout", "request timed out")
    } else {
        ApiError::internal(&*err)
    }
}
