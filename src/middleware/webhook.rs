use crate::errors::auth_error::AuthError;
use crate::handlers::webhooks::WebhookAck;
use crate::state::AppState;
use crate::utils::verify_webhook_request;
use axum::{
    body::{Body, to_bytes},
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Json, Response},
};
use std::sync::Arc;

/// Largest webhook body accepted for verification
pub const MAX_WEBHOOK_BODY_BYTES: usize = 1024 * 1024;

/// Verify webhook deliveries against the configured shared secret
///
/// Without a `webhook_secret` every delivery is accepted. With one, the body is
/// buffered so the signature can be checked, then handed on unchanged. Bodies
/// that cannot be buffered within [`MAX_WEBHOOK_BODY_BYTES`] are acknowledged
/// and dropped.
pub async fn webhook_auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let Some(secret) = state.config.webhook_secret.as_deref() else {
        return Ok(next.run(request).await);
    };

    let (parts, body) = request.into_parts();
    let bytes = match to_bytes(body, MAX_WEBHOOK_BODY_BYTES).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(error = %e, limit = MAX_WEBHOOK_BODY_BYTES, "Dropping unreadable webhook body");
            return Ok(Json(WebhookAck::received()).into_response());
        }
    };

    if let Err(e) = verify_webhook_request(secret, &parts.headers, &bytes) {
        tracing::warn!(path = %parts.uri.path(), error = %e, "Rejected webhook delivery");
        return Err(e.into());
    }

    let request = Request::from_parts(parts, Body::from(bytes));
    Ok(next.run(request).await)
}
