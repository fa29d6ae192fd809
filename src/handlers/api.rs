use axum::{extract::State, response::Json};
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct RootResponse {
    pub message: &'static str,
    pub status: &'static str,
    pub active_calls: usize,
}

/// Which external integrations have credentials configured
#[derive(Debug, Serialize)]
pub struct ServicesStatus {
    pub telephony: bool,
    pub livekit: bool,
    pub webhook_verification: bool,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "healthy" or "degraded"
    pub status: &'static str,
    pub active_calls: usize,
    pub total_calls: usize,
    pub services: ServicesStatus,
}

/// Liveness check
pub async fn root(State(state): State<Arc<AppState>>) -> Json<RootResponse> {
    Json(RootResponse {
        message: "Call gateway is running",
        status: "ok",
        active_calls: state.calls.store().active_count(),
    })
}

/// Aggregate health: integration status plus active call count
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let report = state.calls.health();
    Json(HealthResponse {
        status: report.status,
        active_calls: report.active_calls,
        total_calls: report.total_calls,
        services: ServicesStatus {
            telephony: state.config.is_telephony_configured(),
            livekit: state.config.is_livekit_configured(),
            webhook_verification: state.config.webhook_secret.is_some(),
        },
    })
}
