use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::config::AssistantConfig;
use crate::errors::app_error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct CreateAssistantResponse {
    pub success: bool,
    pub assistant_id: String,
    pub name: Option<String>,
}

/// Body of `POST /calls/configure-inbound`; both fields fall back to configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ConfigureInboundBody {
    #[serde(default)]
    pub phone_number_id: Option<String>,
    #[serde(default)]
    pub assistant_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ConfigureInboundResponse {
    pub success: bool,
    pub phone_number_id: String,
    pub phone_number: Option<String>,
    pub assistant_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct IntegrationsStatus {
    pub telephony: bool,
    pub livekit: bool,
    pub sip_outbound_trunk: bool,
}

/// Static echo of the persona; never includes secrets
#[derive(Debug, Serialize)]
pub struct ConfigResponse {
    pub assistant: AssistantConfig,
    pub assistant_id: Option<String>,
    pub phone_number_id: Option<String>,
    pub transfer_phone_number: Option<String>,
    pub integrations: IntegrationsStatus,
}

/// Provision the configured persona on the telephony platform
pub async fn create_assistant(
    State(state): State<Arc<AppState>>,
) -> AppResult<Json<CreateAssistantResponse>> {
    let assistant = state.calls.create_assistant().await?;
    Ok(Json(CreateAssistantResponse {
        success: true,
        assistant_id: assistant.id,
        name: assistant.name,
    }))
}

/// Route inbound calls on the configured phone number to the assistant
pub async fn configure_inbound(
    State(state): State<Arc<AppState>>,
    body: Option<Json<ConfigureInboundBody>>,
) -> AppResult<Json<ConfigureInboundResponse>> {
    let body = body.map(|Json(body)| body).unwrap_or_default();

    let phone_number_id = body
        .phone_number_id
        .or_else(|| state.config.phone_number_id.clone())
        .ok_or_else(|| AppError::BadRequest("Phone number ID is required".to_string()))?;

    let number = state
        .calls
        .configure_inbound(&phone_number_id, body.assistant_id.as_deref())
        .await?;

    Ok(Json(ConfigureInboundResponse {
        success: true,
        phone_number_id: number.id,
        phone_number: number.number,
        assistant_id: number.assistant_id,
    }))
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<ConfigResponse> {
    let config = &state.config;
    Json(ConfigResponse {
        assistant: state.calls.assistant().clone(),
        assistant_id: config.assistant_id.clone(),
        phone_number_id: config.phone_number_id.clone(),
        transfer_phone_number: config.transfer_phone_number.clone(),
        integrations: IntegrationsStatus {
            telephony: config.is_telephony_configured(),
            livekit: config.is_livekit_configured(),
            sip_outbound_trunk: config.sip_outbound_trunk_id.is_some(),
        },
    })
}
