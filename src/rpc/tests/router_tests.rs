//! End-to-end behaviour of the RPC router.

use axum::http::StatusCode;
use serde_json::{Value, json};

use super::support::{Api, error_code, tow_body};
use crate::account::domain::{Actor, UserId};

#[tokio::test(flavor = "multi_thread")]
async fn missing_token_is_rejected_before_any_service_call() {
    let api = Api::new().await;

    let (status, body) = api.call(None, "create_service_request", &tow_body()).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), Some("unauthenticated"));
    assert_eq!(body["success"], Value::Bool(false));
    assert!(
        api.dispatch
            .lifecycle
            .active_request_for(&Actor::user(api.user))
            .await
            .expect("lookup")
            .is_none()
    );
}

#[tokio::test(flavor = "multi_thread")]
async fn token_for_unknown_profile_is_rejected() {
    let api = Api::new().await;

    let (status, body) = api
        .call(Some(UserId::new()), "get_active_request", &json!({}))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), Some("unauthenticated"));
}

#[tokio::test(flavor = "multi_thread")]
async fn create_returns_a_four_digit_pin_once() {
    let api = Api::new().await;

    let (request_id, pin) = api.create_tow().await;
    let (status, view) = api
        .call(Some(api.user), "get_request", &json!({"request_id": request_id}))
        .await;

    assert_eq!(pin.len(), 4);
    assert!(pin.bytes().all(|byte| byte.is_ascii_digit()));
    assert_eq!(status, StatusCode::OK);
    assert!(!view.to_string().contains(&format!("\"{pin}\"")));
}

#[tokio::test(flavor = "multi_thread")]
async fn second_claim_reports_no_longer_available() {
    let api = Api::new().await;
    let (request_id, _) = api.create_tow().await;
    let body = json!({"request_id": request_id});

    let (won, request) = api.call(Some(api.operator), "accept_request", &body).await;
    let (lost, error) = api.call(Some(api.rival), "accept_request", &body).await;

    assert_eq!(won, StatusCode::OK);
    assert_eq!(request["status"], "assigned");
    assert_eq!(lost, StatusCode::CONFLICT);
    assert_eq!(error_code(&error), Some("request_no_longer_available"));
}

#[tokio::test(flavor = "multi_thread")]
async fn blank_cancellation_reason_is_a_validation_error() {
    let api = Api::new().await;
    let (request_id, _) = api.create_tow().await;

    let (status, body) = api
        .call(
            Some(api.user),
            "cancel_service_request",
            &json!({"request_id": request_id, "reason": "   "}),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), Some("missing_reason"));
}

#[tokio::test(flavor = "multi_thread")]
async fn full_lifecycle_over_http() {
    let api = Api::new().await;
    let (request_id, pin) = api.create_tow().await;
    let id = json!({"request_id": request_id});

    for (caller, procedure) in [
        (api.operator, "accept_request"),
        (api.operator, "confirm_departure"),
    ] {
        let (status, body) = api.call(Some(caller), procedure, &id).await;
        assert_eq!(status, StatusCode::OK, "{procedure}: {body}");
    }
    let wrong_pin = if pin == "0000" { "1111" } else { "0000" };
    let (_, wrong) = api
        .call(
            Some(api.operator),
            "verify_request_pin",
            &json!({"request_id": request_id, "pin": wrong_pin}),
        )
        .await;
    let (_, right) = api
        .call(
            Some(api.operator),
            "verify_request_pin",
            &json!({"request_id": request_id, "pin": pin}),
        )
        .await;
    let (status, completed) = api.call(Some(api.operator), "complete_request", &id).await;
    let (rated, _) = api
        .call(
            Some(api.user),
            "rate_service",
            &json!({"request_id": request_id, "stars": 5, "comment": "Rápido"}),
        )
        .await;
    let (_, events) = api.call(Some(api.user), "get_request_events", &id).await;

    assert_eq!(wrong, json!({"valid": false}));
    assert_eq!(right, json!({"valid": true}));
    assert_eq!(status, StatusCode::OK);
    assert_eq!(completed["status"], "completed");
    assert_eq!(rated, StatusCode::OK);
    assert_eq!(events.as_array().map(Vec::len), Some(5));
}

#[tokio::test(flavor = "multi_thread")]
async fn malformed_body_uses_the_error_shape() {
    let api = Api::new().await;

    let (status, body) = api
        .call(Some(api.user), "verify_request_pin", &json!({"pin": 1234}))
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), Some("validation_error"));
}

#[tokio::test(flavor = "multi_thread")]
async fn unknown_procedure_is_not_found() {
    let api = Api::new().await;

    let (status, body) = api.call(Some(api.user), "drop_tables", &json!({})).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(error_code(&body), Some("not_found"));
}

#[tokio::test(flavor = "multi_thread")]
async fn estimates_fall_back_without_a_provider_key() {
    let api = Api::new().await;
    let body = json!({
        "origin": {"lat": 18.4861, "lng": -69.9312},
        "destination": {"lat": 18.53, "lng": -70.01}
    });

    let (status, estimate) = api.call(Some(api.user), "estimate_distance", &body).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(estimate["is_fallback"], Value::Bool(true));
    assert!(estimate["distance_km"].as_f64().is_some_and(|km| km > 0.0));
}

#[tokio::test(flavor = "multi_thread")]
async fn role_changes_apply_to_the_next_call() {
    let api = Api::new().await;

    let (before, _) = api
        .call(Some(api.user), "get_service_statistics", &json!({}))
        .await;
    let (changed, _) = api
        .call(
            Some(api.admin),
            "admin_update_user_role",
            &json!({"user_id": api.user, "new_role": "mop"}),
        )
        .await;
    let (after, stats) = api
        .call(Some(api.user), "get_service_statistics", &json!({}))
        .await;

    assert_eq!(before, StatusCode::FORBIDDEN);
    assert_eq!(changed, StatusCode::OK);
    assert_eq!(after, StatusCode::OK);
    assert_eq!(stats["total_requests"], json!(0));
}

#[tokio::test(flavor = "multi_thread")]
async fn operator_role_requires_a_provider() {
    let api = Api::new().await;

    let (status, body) = api
        .call(
            Some(api.admin),
            "admin_update_user_role",
            &json!({"user_id": api.user, "new_role": "operator"}),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(error_code(&body), Some("validation_error"));
}

#[tokio::test(flavor = "multi_thread")]
async fn presence_reports_live_then_offline() {
    let api = Api::new().await;
    let lookup = json!({"operator_id": api.operator});

    let (_, unknown) = api
        .call(Some(api.user), "get_operator_presence", &lookup)
        .await;
    let (reported, _) = api
        .call(
            Some(api.operator),
            "upsert_operator_location",
            &json!({"lat": 18.47, "lng": -69.9, "heading": 90.0, "is_online": true}),
        )
        .await;
    let (_, live) = api
        .call(Some(api.user), "get_operator_presence", &lookup)
        .await;
    let (signed_off, _) = api.call(Some(api.operator), "go_offline", &json!({})).await;
    let (_, offline) = api
        .call(Some(api.user), "get_operator_presence", &lookup)
        .await;

    assert_eq!(unknown["state"]["state"], "unknown");
    assert_eq!(reported, StatusCode::OK);
    assert_eq!(live["state"]["state"], "live");
    assert_eq!(signed_off, StatusCode::OK);
    assert_eq!(offline["state"]["state"], "offline");
}

#[tokio::test(flavor = "multi_thread")]
async fn users_cannot_report_locations() {
    let api = Api::new().await;

    let (status, body) = api
        .call(
            Some(api.user),
            "upsert_operator_location",
            &json!({"lat": 18.47, "lng": -69.9, "is_online": true}),
        )
        .await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), Some("forbidden"));
}
