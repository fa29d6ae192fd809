//! Webhook Tests
//!
//! Event intake, payload shapes and shared-secret verification.

mod common;

use axum::{body::Body, http::Request, http::StatusCode};
use serde_json::json;

use call_gateway::middleware::{apply_rate_limit, webhook::MAX_WEBHOOK_BODY_BYTES};
use call_gateway::utils::signature::sign_body;
use common::{body_json, create_app, create_test_config, post_json, send, wait_for_status};

fn webhook_request(body: &str, headers: &[(&str, &str)]) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/webhooks/inbound")
        .header("content-type", "application/json");
    for (name, value) in headers {
        builder = builder.header(*name, *value);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

#[tokio::test]
async fn test_first_event_creates_inbound_call() {
    let (app, state) = create_app(create_test_config("http://127.0.0.1:9"));

    let response = send(
        &app,
        post_json(
            "/webhooks/inbound",
            &json!({
                "type": "call.started",
                "call": {"id": "in-1", "customer": {"number": "+14155550123"}}
            }),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"status": "received"}));

    assert!(wait_for_status(&state, "in-1", "in_progress").await);
    let record = state.calls.get_call("in-1").unwrap();
    assert_eq!(record.direction.as_str(), "inbound");
    assert_eq!(record.phone_number, "+14155550123");
}

#[tokio::test]
async fn test_server_message_status_updates() {
    let (app, state) = create_app(create_test_config("http://127.0.0.1:9"));

    let status_update = |status: &str| {
        post_json(
            "/webhooks/inbound",
            &json!({"message": {"type": "status-update", "status": status, "call": {"id": "in-2"}}}),
        )
    };

    send(&app, status_update("ringing")).await;
    assert!(wait_for_status(&state, "in-2", "ringing").await);

    send(&app, status_update("in-progress")).await;
    assert!(wait_for_status(&state, "in-2", "in_progress").await);

    send(
        &app,
        post_json(
            "/webhooks/inbound",
            &json!({"message": {"type": "end-of-call-report", "call": {"id": "in-2"}}}),
        ),
    )
    .await;
    assert!(wait_for_status(&state, "in-2", "completed").await);
}

#[tokio::test]
async fn test_failed_event_records_error() {
    let (app, state) = create_app(create_test_config("http://127.0.0.1:9"));

    send(
        &app,
        post_json(
            "/webhooks/inbound",
            &json!({"call_id": "c-9", "event_type": "call.failed", "error": "busy"}),
        ),
    )
    .await;

    assert!(wait_for_status(&state, "c-9", "failed").await);
    assert_eq!(
        state.calls.get_call("c-9").unwrap().last_error.as_deref(),
        Some("busy")
    );
}

#[tokio::test]
async fn test_malformed_payloads_are_acknowledged() {
    let (app, state) = create_app(create_test_config("http://127.0.0.1:9"));

    for body in ["not json", "[]", r#"{"event_type": "call.started"}"#, "{}"] {
        let response = send(&app, webhook_request(body, &[])).await;
        assert_eq!(response.status(), StatusCode::OK, "{body}");
        assert_eq!(body_json(response).await["status"], "received");
    }

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(state.calls.store().is_empty());
}

#[tokio::test]
async fn test_unknown_event_type_is_ignored() {
    let (app, state) = create_app(create_test_config("http://127.0.0.1:9"));

    let response = send(
        &app,
        post_json(
            "/webhooks/inbound",
            &json!({"call_id": "c-1", "event_type": "call.transcript"}),
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(state.calls.store().is_empty());
}

#[tokio::test]
async fn test_webhook_secret_required_when_configured() {
    let mut config = create_test_config("http://127.0.0.1:9");
    config.webhook_secret = Some("hook-secret".to_string());
    let (app, state) = create_app(config);

    let body = r#"{"call_id": "c-2", "event_type": "call.started"}"#;

    let response = send(&app, webhook_request(body, &[])).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(&app, webhook_request(body, &[("x-vapi-secret", "wrong")])).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(
        &app,
        webhook_request(body, &[("x-vapi-secret", "hook-secret")]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(wait_for_status(&state, "c-2", "in_progress").await);
}

#[tokio::test]
async fn test_webhook_signature_verification() {
    let mut config = create_test_config("http://127.0.0.1:9");
    config.webhook_secret = Some("hook-secret".to_string());
    let (app, state) = create_app(config);

    let body = r#"{"call_id": "c-3", "event_type": "call.ringing"}"#;
    let signature = sign_body("hook-secret", body.as_bytes());

    let response = send(
        &app,
        webhook_request(body, &[("x-vapi-signature", signature.as_str())]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(wait_for_status(&state, "c-3", "ringing").await);

    let tampered = r#"{"call_id": "c-3", "event_type": "call.ended"}"#;
    let response = send(
        &app,
        webhook_request(tampered, &[("x-vapi-signature", signature.as_str())]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_transcript_kept_as_latest_payload() {
    let (app, state) = create_app(create_test_config("http://127.0.0.1:9"));

    send(
        &app,
        post_json(
            "/webhooks/inbound",
            &json!({"type": "call.started", "call": {"id": "in-5"}}),
        ),
    )
    .await;
    assert!(wait_for_status(&state, "in-5", "in_progress").await);

    let transcript = json!({
        "type": "transcript",
        "call": {"id": "in-5"},
        "transcript": {"role": "user", "text": "Where is my order?"}
    });
    send(&app, post_json("/webhooks/inbound", &transcript)).await;

    let mut stored = None;
    for _ in 0..100 {
        stored = state.calls.get_call("in-5").unwrap().last_event;
        if stored.as_ref() == Some(&transcript) {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert_eq!(stored, Some(transcript));
    assert_eq!(
        state.calls.get_call("in-5").unwrap().status.as_str(),
        "in_progress"
    );
}

#[tokio::test]
async fn test_oversized_delivery_acknowledged_and_dropped() {
    let padding = "x".repeat(MAX_WEBHOOK_BODY_BYTES * 3);
    let body = json!({"call_id": "big-1", "event_type": "call.started", "padding": padding})
        .to_string();

    let (app, state) = create_app(create_test_config("http://127.0.0.1:9"));
    let response = send(&app, webhook_request(&body, &[])).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"status": "received"}));

    let mut config = create_test_config("http://127.0.0.1:9");
    config.webhook_secret = Some("hook-secret".to_string());
    let (secured, secured_state) = create_app(config);
    let response = send(
        &secured,
        webhook_request(&body, &[("x-vapi-secret", "hook-secret")]),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "received");

    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
    assert!(state.calls.get_call("big-1").is_err());
    assert!(secured_state.calls.get_call("big-1").is_err());
}

#[tokio::test]
async fn test_webhook_bursts_within_rate_limit_recover() {
    let (router, _state) = create_app(create_test_config("http://127.0.0.1:9"));
    // 60 requests/s with a burst of 10, as configured by default
    let app = apply_rate_limit(router, 60, 10).unwrap();

    let delivery = |n: usize| {
        webhook_request(
            &json!({"call_id": format!("burst-{n}"), "event_type": "call.ringing"}).to_string(),
            &[("x-forwarded-for", "203.0.113.7")],
        )
    };

    let mut limited = 0;
    for n in 0..15 {
        let status = send(&app, delivery(n)).await.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            limited += 1;
        } else {
            assert_eq!(status, StatusCode::OK);
        }
    }
    assert!(limited > 0, "burst beyond the quota should be limited");

    // One request is replenished roughly every 17ms
    tokio::time::sleep(std::time::Duration::from_millis(200)).await;
    let response = send(&app, delivery(15)).await;
    assert_eq!(response.status(), StatusCode::OK);
}
