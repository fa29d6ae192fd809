//! Shared helpers for router-level integration tests.

#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    body::Body,
    http::{Request, Response, StatusCode},
};
use serde_json::Value;
use tower::util::ServiceExt;

use call_gateway::{
    ServerConfig,
    config::{AssistantConfig, AuthApiSecret},
    routes,
    state::AppState,
};

/// Configuration pointing the telephony client at `base_url`
pub fn create_test_config(base_url: &str) -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        tls: None,
        vapi_token: Some("test-vapi-token".to_string()),
        vapi_base_url: base_url.to_string(),
        assistant_id: Some("asst-default".to_string()),
        phone_number_id: Some("pn-default".to_string()),
        transfer_phone_number: None,
        telephony_timeout_seconds: 5,
        webhook_secret: None,
        livekit_url: None,
        livekit_api_key: None,
        livekit_api_secret: None,
        sip_outbound_trunk_id: None,
        assistant: AssistantConfig::default(),
        auth_api_secrets: Vec::new(),
        auth_required: false,
        cors_allowed_origins: None,
        rate_limit_requests_per_second: 60,
        rate_limit_burst_size: 10,
    }
}

pub fn with_api_secret(mut config: ServerConfig, id: &str, secret: &str) -> ServerConfig {
    config.auth_required = true;
    config.auth_api_secrets = vec![AuthApiSecret {
        id: id.to_string(),
        secret: secret.to_string(),
    }];
    config
}

pub fn create_app(config: ServerConfig) -> (Router, Arc<AppState>) {
    let state = AppState::new(config).expect("telephony client");
    (routes::create_router(state.clone()), state)
}

pub async fn send(app: &Router, request: Request<Body>) -> Response<Body> {
    app.clone().oneshot(request).await.expect("router is infallible")
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub fn delete(uri: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// GET `uri` and return status plus JSON body
pub async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
    let response = send(app, get(uri)).await;
    let status = response.status();
    (status, body_json(response).await)
}

/// Poll until the tracked call reaches `status`; webhooks are applied asynchronously
pub async fn wait_for_status(state: &AppState, call_id: &str, status: &str) -> bool {
    for _ in 0..100 {
        if let Ok(record) = state.calls.get_call(call_id) {
            if record.status.as_str() == status {
                return true;
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    false
}
