//! One-shot provisioning commands run from the CLI instead of starting the
//! server.
//!
//! ```text
//! $ call-gateway create-assistant
//! $ ASSISTANT_ID=asst-123 PHONE_NUMBER_ID=pn-456 call-gateway configure-inbound
//! $ call-gateway call +14155550100 --message "Hi, this is a reminder call"
//! ```
//!
//! Each command builds the same [`AppState`] the server uses, so it goes
//! through the same validation and logging as the REST endpoints.

use anyhow::{Context, Result, anyhow};

use crate::config::ServerConfig;
use crate::core::calls::OutboundCallRequest;
use crate::state::AppState;

fn build_state(config: ServerConfig) -> Result<std::sync::Arc<AppState>> {
    if !config.is_telephony_configured() {
        return Err(anyhow!(
            "VAPI_TOKEN must be set to talk to the telephony platform"
        ));
    }
    AppState::new(config).context("Failed to initialize telephony client")
}

/// Provision the configured persona and return the new assistant id
pub async fn create_assistant(config: ServerConfig) -> Result<String> {
    let state = build_state(config)?;
    let assistant = state.calls.create_assistant().await?;
    Ok(assistant.id)
}

/// Bind `PHONE_NUMBER_ID` to `ASSISTANT_ID` for inbound calls
pub async fn configure_inbound(config: ServerConfig) -> Result<String> {
    let phone_number_id = config
        .phone_number_id
        .clone()
        .context("PHONE_NUMBER_ID must be set to configure inbound calls")?;

    let state = build_state(config)?;
    let number = state.calls.configure_inbound(&phone_number_id, None).await?;
    Ok(number.id)
}

/// Place a single outbound call and return its call id
pub async fn place_call(
    config: ServerConfig,
    phone_number: String,
    message: Option<String>,
) -> Result<String> {
    let state = build_state(config)?;

    let mut request = OutboundCallRequest::new(phone_number);
    request.message = message;

    let record = state.calls.request_outbound(request).await?;
    Ok(record.call_id)
}
