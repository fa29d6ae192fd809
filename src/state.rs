use std::sync::Arc;

use crate::config::ServerConfig;
use crate::core::calls::CallController;
use crate::core::telephony::{TelephonyProvider, TelephonyResult, VapiClient};

/// Shared state handed to every handler
pub struct AppState {
    pub config: ServerConfig,
    pub calls: CallController,
}

impl AppState {
    /// Build state with the Vapi client configured from `config`
    pub fn new(config: ServerConfig) -> TelephonyResult<Arc<Self>> {
        let client = VapiClient::new(config.vapi_config())?;
        Ok(Self::with_provider(config, Arc::new(client)))
    }

    /// Build state around an existing telephony provider
    pub fn with_provider(config: ServerConfig, telephony: Arc<dyn TelephonyProvider>) -> Arc<Self> {
        let calls = CallController::new(
            telephony,
            config.assistant.clone(),
            config.assistant_id.clone(),
        )
        .with_transfer_number(config.transfer_phone_number.clone());

        Arc::new(Self { config, calls })
    }
}
