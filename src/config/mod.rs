//! Configuration module for the call gateway
//!
//! This module handles server configuration from various sources: .env files, YAML files,
//! and environment variables. Priority: YAML > ENV vars > .env values > defaults.
//!
//! # Modules
//! - `assistant`: assistant persona and voice settings
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable loading
//! - `merge`: Merging YAML and environment configurations
//! - `validation`: Configuration validation logic
//! - `utils`: Utility functions for configuration parsing
//!
//! # Example
//! ```rust,no_run
//! use call_gateway::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file with environment variable overrides
//! let config_path = PathBuf::from("config.yaml");
//! let config = ServerConfig::from_file(&config_path)?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;
use std::time::Duration;

pub mod assistant;
mod env;
mod merge;
mod utils;
mod validation;
mod yaml;

pub use assistant::{AssistantConfig, ModelConfig, VoiceConfig};
pub use utils::parse_auth_api_secrets_json;

use crate::core::telephony::VapiConfig;

/// TLS configuration for HTTPS
#[derive(Debug, Clone)]
pub struct TlsConfig {
    /// Path to the TLS certificate file (PEM format)
    pub cert_path: PathBuf,
    /// Path to the TLS private key file (PEM format)
    pub key_path: PathBuf,
}

/// API secret authentication entry with a client identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthApiSecret {
    pub id: String,
    pub secret: String,
}

/// Server configuration
///
/// Contains all configuration needed to run the call gateway:
/// - Server settings (host, port, TLS)
/// - Telephony platform credentials and defaults
/// - LiveKit voice platform credentials
/// - Assistant persona
/// - Authentication settings
/// - Security settings (CORS, rate limiting)
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,

    // TLS configuration (optional)
    pub tls: Option<TlsConfig>,

    // Telephony platform settings
    /// Private API token for the telephony platform
    pub vapi_token: Option<String>,
    pub vapi_base_url: String,
    /// Default assistant for outbound and inbound calls
    pub assistant_id: Option<String>,
    /// Phone number used as caller id and for inbound routing
    pub phone_number_id: Option<String>,
    /// Default transfer destination (E.164)
    pub transfer_phone_number: Option<String>,
    pub telephony_timeout_seconds: u64,
    /// Shared secret expected on webhook deliveries; unset disables the check
    pub webhook_secret: Option<String>,

    // LiveKit settings
    pub livekit_url: Option<String>,
    pub livekit_api_key: Option<String>,
    pub livekit_api_secret: Option<String>,
    pub sip_outbound_trunk_id: Option<String>,

    // Assistant persona
    pub assistant: AssistantConfig,

    // Authentication configuration
    pub auth_api_secrets: Vec<AuthApiSecret>,
    pub auth_required: bool,

    // Security configuration
    /// CORS allowed origins (comma-separated list or "*" for all)
    /// Default: None (CORS disabled, same-origin only)
    pub cors_allowed_origins: Option<String>,

    // Rate limiting configuration
    /// Maximum requests per second per IP address
    /// Default: 60
    pub rate_limit_requests_per_second: u32,
    /// Maximum burst size for rate limiting
    /// Default: 10
    pub rate_limit_burst_size: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: env::DEFAULT_HOST.to_string(),
            port: env::DEFAULT_PORT,
            tls: None,
            vapi_token: None,
            vapi_base_url: crate::core::telephony::vapi::VAPI_BASE_URL.to_string(),
            assistant_id: None,
            phone_number_id: None,
            transfer_phone_number: None,
            telephony_timeout_seconds: crate::core::telephony::vapi::DEFAULT_TIMEOUT_SECONDS,
            webhook_secret: None,
            livekit_url: None,
            livekit_api_key: None,
            livekit_api_secret: None,
            sip_outbound_trunk_id: None,
            assistant: AssistantConfig::default(),
            auth_api_secrets: Vec::new(),
            auth_required: false,
            cors_allowed_origins: None,
            rate_limit_requests_per_second: env::DEFAULT_RATE_LIMIT_RPS,
            rate_limit_burst_size: env::DEFAULT_RATE_LIMIT_BURST,
        }
    }
}

/// Zeroize secret fields when ServerConfig is dropped.
impl Drop for ServerConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        if let Some(ref mut token) = self.vapi_token {
            token.zeroize();
        }
        if let Some(ref mut secret) = self.webhook_secret {
            secret.zeroize();
        }
        if let Some(ref mut key) = self.livekit_api_key {
            key.zeroize();
        }
        if let Some(ref mut secret) = self.livekit_api_secret {
            secret.zeroize();
        }
        for secret in &mut self.auth_api_secrets {
            secret.secret.zeroize();
        }
    }
}

impl ServerConfig {
    /// Load configuration from a YAML file with environment variable base
    ///
    /// Environment variables (and `.env`, loaded in `main`) provide the base
    /// configuration; values present in the YAML file override them. The merged
    /// configuration is validated before it is returned.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The YAML file cannot be read or is malformed
    /// - Environment variables have invalid formats
    /// - Configuration validation fails
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let yaml_config = yaml::YamlConfig::from_file(path)?;
        let config = merge::merge_config(Some(yaml_config))?;
        validation::validate_server_config(&config)?;
        Ok(config)
    }

    /// Get the server address as "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn is_tls_enabled(&self) -> bool {
        self.tls.is_some()
    }

    /// Check if API secret authentication is configured
    pub fn has_api_secret_auth(&self) -> bool {
        !self.auth_api_secrets.is_empty()
    }

    /// Find the API secret identifier that matches a bearer token
    pub fn find_api_secret_id(&self, token: &str) -> Option<&str> {
        crate::auth::match_api_secret_id(token, &self.auth_api_secrets)
    }

    /// Whether the telephony platform token is present
    pub fn is_telephony_configured(&self) -> bool {
        self.vapi_token.as_deref().is_some_and(|t| !t.is_empty())
    }

    /// Whether LiveKit URL and credentials are all present
    pub fn is_livekit_configured(&self) -> bool {
        self.livekit_url.is_some()
            && self.livekit_api_key.is_some()
            && self.livekit_api_secret.is_some()
    }

    /// Telephony client configuration derived from this server configuration
    pub fn vapi_config(&self) -> VapiConfig {
        let mut config = VapiConfig::default();
        config.api_token = self.vapi_token.clone();
        config.base_url = self.vapi_base_url.clone();
        config.phone_number_id = self.phone_number_id.clone();
        config.timeout = Duration::from_secs(self.telephony_timeout_seconds);
        config
    }
}
