//! Telephony platform integration
//!
//! The telephony platform owns dialing, PSTN signaling and webhook delivery. The
//! gateway only talks to it through [`TelephonyProvider`]: placing and ending
//! calls, provisioning assistants and binding phone numbers to them.

pub mod vapi;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::AssistantConfig;

pub use vapi::{VapiClient, VapiConfig};

/// Errors returned by telephony providers
#[derive(Debug, Error)]
pub enum TelephonyError {
    /// Credentials for the platform are missing
    #[error("Telephony platform not configured: {0}")]
    NotConfigured(String),

    /// The request never produced a response (connect, TLS, timeout)
    #[error("Telephony request failed: {0}")]
    Request(String),

    /// The platform answered with a non-success status
    #[error("Telephony API error ({status}): {body}")]
    Api { status: u16, body: String },

    /// The platform answered with a body we could not interpret
    #[error("Failed to parse telephony response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for TelephonyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else {
            Self::Request(err.to_string())
        }
    }
}

pub type TelephonyResult<T> = Result<T, TelephonyError>;

/// Parameters for placing an outbound call
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OutboundCallParams {
    /// Destination number in E.164 form
    pub phone_number: String,
    pub assistant_id: String,
    /// Overrides the assistant's greeting for this call only
    pub first_message: Option<String>,
    /// Free-form context forwarded with the call
    pub metadata: serde_json::Value,
}

/// A call as acknowledged by the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderCall {
    pub id: String,
    pub status: Option<String>,
}

/// An assistant provisioned on the platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderAssistant {
    pub id: String,
    pub name: Option<String>,
}

/// A phone number as returned after (re)configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderPhoneNumber {
    pub id: String,
    pub number: Option<String>,
    pub assistant_id: Option<String>,
}

/// Operations the gateway needs from the telephony platform
#[async_trait]
pub trait TelephonyProvider: Send + Sync {
    /// Provider name for logs and health output
    fn name(&self) -> &'static str;

    /// Whether credentials are present
    fn is_configured(&self) -> bool;

    /// Ask the platform to dial `params.phone_number`
    async fn create_call(&self, params: &OutboundCallParams) -> TelephonyResult<ProviderCall>;

    /// Hang up a live call
    async fn end_call(&self, call_id: &str) -> TelephonyResult<()>;

    /// Route inbound calls on `phone_number_id` to `assistant_id`
    async fn configure_inbound(
        &self,
        phone_number_id: &str,
        assistant_id: &str,
    ) -> TelephonyResult<ProviderPhoneNumber>;

    /// Provision an assistant with the given persona
    async fn create_assistant(
        &self,
        assistant: &AssistantConfig,
    ) -> TelephonyResult<ProviderAssistant>;
}
