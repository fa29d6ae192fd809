pub mod api;
pub mod webhooks;

use axum::{Router, middleware, routing::get};
use std::sync::Arc;

use crate::handlers::api::{health_check, root};
use crate::middleware::auth_middleware;
use crate::state::AppState;

/// Assemble public, webhook and protected routes around `state`
///
/// Server-wide layers (CORS, rate limiting, security headers) are added by the
/// binary on top of this router.
pub fn create_router(state: Arc<AppState>) -> Router {
    let protected_routes = api::create_api_router().layer(middleware::from_fn_with_state(
        state.clone(),
        auth_middleware,
    ));

    let webhook_routes = webhooks::create_webhook_router(state.clone());

    let public_routes = Router::new()
        .route("/", get(root))
        .route("/health", get(health_check));

    public_routes
        .merge(webhook_routes)
        .merge(protected_routes)
        .with_state(state)
}
