//! In-memory router with a seeded cast of callers.

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use chrono::TimeDelta;
use mockable::DefaultClock;
use serde_json::Value;
use tower::ServiceExt;

use crate::account::{
    domain::{Role, UserId},
    services::RegisterProfileRequest,
};
use crate::dispatch::{Dispatch, DispatchIntegrations, DispatchSettings, DispatchStores};
use crate::rpc::{RpcLimits, RpcState, SessionKeys, router};

pub(super) const SECRET: &[u8] = b"router-test-secret";

pub(super) struct Api {
    pub(super) app: Router,
    pub(super) dispatch: Arc<Dispatch>,
    pub(super) keys: SessionKeys,
    pub(super) user: UserId,
    pub(super) operator: UserId,
    pub(super) rival: UserId,
    pub(super) admin: UserId,
}

impl Api {
    pub(super) async fn new() -> Self {
        let integrations = DispatchIntegrations::offline(4).expect("offline integrations");
        let dispatch = Arc::new(Dispatch::new(
            DispatchStores::in_memory(),
            integrations,
            DispatchSettings::default(),
        ));
        let provider = dispatch
            .accounts
            .register_provider("Grúas del Este")
            .await
            .expect("provider");

        let user = UserId::new();
        let operator = UserId::new();
        let rival = UserId::new();
        let admin = UserId::new();
        let cast = [
            (user, "Ana", Role::User, None),
            (operator, "Luis", Role::Operator, Some(provider.id())),
            (rival, "Ramón", Role::Operator, Some(provider.id())),
            (admin, "Carmen", Role::Admin, None),
        ];
        for (id, name, role, provider_id) in cast {
            dispatch
                .accounts
                .register_profile(RegisterProfileRequest::new(id, name).with_role(role, provider_id))
                .await
                .expect("profile");
        }

        let keys = SessionKeys::from_secret(SECRET);
        let app = router(
            RpcState::new(Arc::clone(&dispatch), keys.clone()),
            RpcLimits::default(),
        );
        Self {
            app,
            dispatch,
            keys,
            user,
            operator,
            rival,
            admin,
        }
    }

    pub(super) fn token(&self, user_id: UserId) -> String {
        self.keys
            .issue(user_id, TimeDelta::hours(1), &DefaultClock)
            .expect("token")
    }

    pub(super) async fn call(
        &self,
        caller: Option<UserId>,
        procedure: &str,
        body: &Value,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder()
            .method("POST")
            .uri(format!("/rpc/{procedure}"))
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(id) = caller {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", self.token(id)));
        }
        let request = builder
            .body(Body::from(body.to_string()))
            .expect("request");
        let response = self.app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        let payload = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json payload")
        };
        (status, payload)
    }

    /// Creates a tow for the seeded user and returns `(request_id, pin)`.
    pub(super) async fn create_tow(&self) -> (String, String) {
        let (status, body) = self
            .call(Some(self.user), "create_service_request", &tow_body())
            .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        (
            body["request_id"].as_str().expect("request id").to_owned(),
            body["pin"].as_str().expect("pin").to_owned(),
        )
    }
}

pub(super) fn tow_body() -> Value {
    serde_json::json!({
        "pickup": {"lat": 18.4861, "lng": -69.9312, "address": "Av. Winston Churchill"},
        "dropoff": {"lat": 18.53, "lng": -70.01},
        "service_type": "tow",
        "tow_type": "light"
    })
}

pub(super) fn error_code(body: &Value) -> Option<&str> {
    body.pointer("/error/code").and_then(Value::as_str)
}
