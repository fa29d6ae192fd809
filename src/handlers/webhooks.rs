use axum::{
    body::{Body, to_bytes},
    extract::State,
    response::Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::core::calls::{CallEvent, EventOutcome};
use crate::middleware::webhook::MAX_WEBHOOK_BODY_BYTES;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub status: &'static str,
}

impl WebhookAck {
    pub fn received() -> Self {
        Self { status: "received" }
    }
}

/// Telephony event intake
///
/// Every delivery is acknowledged with `{"status": "received"}`, including
/// payloads that cannot be parsed and bodies over [`MAX_WEBHOOK_BODY_BYTES`],
/// which are dropped. Parsing and the state transition run on a spawned task
/// so the platform is never kept waiting.
pub async fn inbound_webhook(State(state): State<Arc<AppState>>, body: Body) -> Json<WebhookAck> {
    match to_bytes(body, MAX_WEBHOOK_BODY_BYTES).await {
        Ok(bytes) => {
            tokio::spawn(async move {
                process_webhook(&state, &bytes);
            });
        }
        Err(e) => {
            warn!(error = %e, limit = MAX_WEBHOOK_BODY_BYTES, "Dropping unreadable webhook body");
        }
    }

    Json(WebhookAck::received())
}

fn process_webhook(state: &AppState, body: &[u8]) -> Option<EventOutcome> {
    let payload: serde_json::Value = match serde_json::from_slice(body) {
        Ok(payload) => payload,
        Err(e) => {
            warn!(error = %e, bytes = body.len(), "Ignoring webhook with invalid JSON");
            return None;
        }
    };

    let event = match CallEvent::from_webhook(payload) {
        Ok(event) => event,
        Err(e) => {
            warn!(error = %e, "Ignoring webhook without a call event");
            return None;
        }
    };

    debug!(call_id = %event.call_id, event_type = %event.kind.name(), "Webhook event received");
    Some(state.calls.apply_event(event))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;
    use crate::core::calls::CallStatus;

    fn state() -> Arc<AppState> {
        AppState::new(ServerConfig::default()).unwrap()
    }

    #[test]
    fn test_process_webhook_applies_event() {
        let state = state();
        let outcome = process_webhook(
            &state,
            br#"{"call_id": "c-1", "event_type": "call.started"}"#,
        );
        assert!(matches!(outcome, Some(EventOutcome::Applied { .. })));
        assert_eq!(
            state.calls.get_call("c-1").unwrap().status,
            CallStatus::InProgress
        );
    }

    #[test]
    fn test_process_webhook_ignores_garbage() {
        let state = state();
        assert!(process_webhook(&state, b"not json").is_none());
        assert!(process_webhook(&state, br#"{"hello": "world"}"#).is_none());
        assert!(state.calls.store().is_empty());
    }
}
