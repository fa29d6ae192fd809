//! Environment variable loading.

use std::path::PathBuf;

use super::assistant::AssistantConfig;
use super::utils::{env_var, parse_auth_api_secrets_json, parse_env, parse_env_bool};
use super::validation;
use super::{AuthApiSecret, ServerConfig, TlsConfig};
use crate::core::telephony::vapi::{DEFAULT_TIMEOUT_SECONDS, VAPI_BASE_URL};

pub(super) const DEFAULT_HOST: &str = "0.0.0.0";
pub(super) const DEFAULT_PORT: u16 = 8000;
pub(super) const DEFAULT_API_SECRET_ID: &str = "default";
pub(super) const DEFAULT_RATE_LIMIT_RPS: u32 = 60;
pub(super) const DEFAULT_RATE_LIMIT_BURST: u32 = 10;

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// `.env` is expected to have been loaded into the process environment
    /// already. Unset variables fall back to defaults; the result is validated.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let config = load_from_env()?;
        validation::validate_server_config(&config)?;
        Ok(config)
    }
}

/// Build a configuration from the environment without validating it
pub(super) fn load_from_env() -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let host = env_var("HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = parse_env("PORT", DEFAULT_PORT)?;

    let tls = if parse_env_bool("TLS_ENABLED", false)? {
        let cert_path = env_var("TLS_CERT_PATH")
            .ok_or("TLS_ENABLED is true but TLS_CERT_PATH is not set")?;
        let key_path =
            env_var("TLS_KEY_PATH").ok_or("TLS_ENABLED is true but TLS_KEY_PATH is not set")?;
        Some(TlsConfig {
            cert_path: PathBuf::from(cert_path),
            key_path: PathBuf::from(key_path),
        })
    } else {
        None
    };

    let auth_api_secrets = match env_var("AUTH_API_SECRETS_JSON") {
        Some(raw) => parse_auth_api_secrets_json(&raw)?,
        None => env_var("AUTH_API_SECRET")
            .map(|secret| {
                vec![AuthApiSecret {
                    id: env_var("AUTH_API_SECRET_ID")
                        .unwrap_or_else(|| DEFAULT_API_SECRET_ID.to_string()),
                    secret,
                }]
            })
            .unwrap_or_default(),
    };

    Ok(ServerConfig {
        host,
        port,
        tls,
        vapi_token: env_var("VAPI_TOKEN"),
        vapi_base_url: env_var("VAPI_BASE_URL").unwrap_or_else(|| VAPI_BASE_URL.to_string()),
        assistant_id: env_var("ASSISTANT_ID"),
        phone_number_id: env_var("PHONE_NUMBER_ID"),
        transfer_phone_number: env_var("TRANSFER_PHONE_NUMBER"),
        telephony_timeout_seconds: parse_env("TELEPHONY_TIMEOUT_SECONDS", DEFAULT_TIMEOUT_SECONDS)?,
        webhook_secret: env_var("WEBHOOK_SECRET"),
        livekit_url: env_var("LIVEKIT_URL"),
        livekit_api_key: env_var("LIVEKIT_API_KEY"),
        livekit_api_secret: env_var("LIVEKIT_API_SECRET"),
        sip_outbound_trunk_id: env_var("SIP_OUTBOUND_TRUNK_ID"),
        assistant: load_assistant_from_env()?,
        auth_api_secrets,
        auth_required: parse_env_bool("AUTH_REQUIRED", false)?,
        cors_allowed_origins: env_var("CORS_ALLOWED_ORIGINS"),
        rate_limit_requests_per_second: parse_env(
            "RATE_LIMIT_REQUESTS_PER_SECOND",
            DEFAULT_RATE_LIMIT_RPS,
        )?,
        rate_limit_burst_size: parse_env("RATE_LIMIT_BURST_SIZE", DEFAULT_RATE_LIMIT_BURST)?,
    })
}

fn load_assistant_from_env() -> Result<AssistantConfig, String> {
    let mut assistant = AssistantConfig::default();

    if let Some(name) = env_var("ASSISTANT_NAME") {
        assistant.name = name;
    }
    if let Some(prompt) = env_var("ASSISTANT_SYSTEM_PROMPT") {
        assistant.system_prompt = prompt;
    }
    if let Some(message) = env_var("ASSISTANT_FIRST_MESSAGE") {
        assistant.first_message = message;
    }
    if let Some(provider) = env_var("ASSISTANT_MODEL_PROVIDER") {
        assistant.model.provider = provider;
    }
    if let Some(model) = env_var("ASSISTANT_MODEL") {
        assistant.model.model = model;
    }
    if let Some(raw) = env_var("ASSISTANT_MODEL_TEMPERATURE") {
        let temperature = raw
            .parse::<f32>()
            .map_err(|e| format!("Invalid value for ASSISTANT_MODEL_TEMPERATURE ({raw:?}): {e}"))?;
        assistant.model.temperature = Some(temperature);
    }
    if let Some(provider) = env_var("ASSISTANT_VOICE_PROVIDER") {
        assistant.voice.provider = provider;
    }
    if let Some(voice_id) = env_var("ASSISTANT_VOICE_ID") {
        assistant.voice.voice_id = voice_id;
    }

    Ok(assistant)
}
