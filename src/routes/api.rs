use axum::{
    Router,
    routing::{get, post},
};
use tower_http::trace::TraceLayer;

use crate::handlers::{assistant, calls};
use crate::state::AppState;
use std::sync::Arc;

/// Create the API router with protected routes
///
/// Authentication middleware is applied in main.rs once state is available.
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/calls", get(calls::list_calls))
        .route("/calls/outbound", post(calls::create_outbound_call))
        .route("/calls/active", get(calls::list_active_calls))
        .route("/calls/configure-inbound", post(assistant::configure_inbound))
        .route(
            "/calls/{call_id}",
            get(calls::get_call).delete(calls::end_call),
        )
        .route("/assistant/create", post(assistant::create_assistant))
        .route("/config", get(assistant::get_config))
        .layer(TraceLayer::new_for_http())
}
