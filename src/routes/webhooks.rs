use axum::{Router, middleware, routing::post};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::handlers::webhooks;
use crate::middleware::webhook_auth_middleware;
use crate::state::AppState;

/// Webhook routes, verified against the shared secret when one is configured
pub fn create_webhook_router(state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/webhooks/inbound", post(webhooks::inbound_webhook))
        .layer(middleware::from_fn_with_state(state, webhook_auth_middleware))
        .layer(TraceLayer::new_for_http())
}
