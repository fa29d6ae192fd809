//! Vapi REST API client.
//!
//! # API Reference
//!
//! - `POST /call` places an outbound phone call
//! - `DELETE /call/{id}` ends a call
//! - `PATCH /phone-number/{id}` binds a number to an assistant for inbound calls
//! - `POST /assistant` provisions an assistant

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::{debug, error, info};

use super::config::VapiConfig;
use super::messages::{
    AssistantOverrides, AssistantResponse, CallResponse, CreateAssistantRequest,
    CreateCallRequest, Customer, PhoneNumberResponse, UpdatePhoneNumberRequest,
};
use crate::config::AssistantConfig;
use crate::core::telephony::{
    OutboundCallParams, ProviderAssistant, ProviderCall, ProviderPhoneNumber, TelephonyError,
    TelephonyProvider, TelephonyResult,
};

/// Error bodies are truncated to this many bytes before being surfaced
const MAX_ERROR_BODY_LEN: usize = 512;

pub struct VapiClient {
    config: VapiConfig,
    http: Client,
}

impl VapiClient {
    pub fn new(config: VapiConfig) -> TelephonyResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| TelephonyError::Request(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { config, http })
    }

    fn token(&self) -> TelephonyResult<&str> {
        self.config
            .api_token
            .as_deref()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| TelephonyError::NotConfigured("VAPI_TOKEN is not set".to_string()))
    }

    fn authorized(&self, builder: RequestBuilder) -> TelephonyResult<RequestBuilder> {
        Ok(builder.bearer_auth(self.token()?))
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> TelephonyResult<T> {
        let response = Self::check_status(builder.send().await?).await?;
        let bytes = response.bytes().await?;
        serde_json::from_slice(&bytes).map_err(|e| TelephonyError::InvalidResponse(e.to_string()))
    }

    /// Send a request whose response body is not needed
    async fn send_discarding_body(&self, builder: RequestBuilder) -> TelephonyResult<()> {
        Self::check_status(builder.send().await?).await.map(|_| ())
    }

    async fn check_status(response: Response) -> TelephonyResult<Response> {
        let status = response.status();
        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            if body.len() > MAX_ERROR_BODY_LEN {
                let mut cut = MAX_ERROR_BODY_LEN;
                while !body.is_char_boundary(cut) {
                    cut -= 1;
                }
                body.truncate(cut);
            }
            return Err(TelephonyError::Api {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }
}

#[async_trait]
impl TelephonyProvider for VapiClient {
    fn name(&self) -> &'static str {
        "vapi"
    }

    fn is_configured(&self) -> bool {
        self.token().is_ok()
    }

    async fn create_call(&self, params: &OutboundCallParams) -> TelephonyResult<ProviderCall> {
        let body = CreateCallRequest {
            assistant_id: &params.assistant_id,
            phone_number_id: self.config.phone_number_id.as_deref(),
            customer: Customer {
                number: &params.phone_number,
            },
            metadata: &params.metadata,
            assistant_overrides: params
                .first_message
                .as_deref()
                .map(|first_message| AssistantOverrides { first_message }),
        };

        info!(
            phone_number = %params.phone_number,
            assistant_id = %params.assistant_id,
            "Placing outbound call"
        );

        let request = self.authorized(self.http.post(self.config.endpoint("call")))?;
        let call: CallResponse = self.send(request.json(&body)).await.inspect_err(|e| {
            error!(phone_number = %params.phone_number, error = %e, "Outbound call request failed");
        })?;

        debug!(call_id = %call.id, status = ?call.status, "Outbound call accepted");

        Ok(ProviderCall {
            id: call.id,
            status: call.status,
        })
    }

    async fn end_call(&self, call_id: &str) -> TelephonyResult<()> {
        let url = self.config.endpoint(&format!("call/{call_id}"));
        let request = self.authorized(self.http.delete(url))?;
        self.send_discarding_body(request).await.inspect_err(|e| {
            error!(call_id = %call_id, error = %e, "End call request failed");
        })?;

        info!(call_id = %call_id, "Call ended at provider");
        Ok(())
    }

    async fn configure_inbound(
        &self,
        phone_number_id: &str,
        assistant_id: &str,
    ) -> TelephonyResult<ProviderPhoneNumber> {
        let url = self
            .config
            .endpoint(&format!("phone-number/{phone_number_id}"));
        let request = self.authorized(self.http.patch(url))?;
        let number: PhoneNumberResponse = self
            .send(request.json(&UpdatePhoneNumberRequest { assistant_id }))
            .await?;

        info!(
            phone_number_id = %phone_number_id,
            assistant_id = %assistant_id,
            "Phone number configured for inbound calls"
        );

        Ok(ProviderPhoneNumber {
            id: number.id,
            number: number.number,
            assistant_id: number.assistant_id,
        })
    }

    async fn create_assistant(
        &self,
        assistant: &AssistantConfig,
    ) -> TelephonyResult<ProviderAssistant> {
        let request = self.authorized(self.http.post(self.config.endpoint("assistant")))?;
        let created: AssistantResponse = self
            .send(request.json(&CreateAssistantRequest::from(assistant)))
            .await?;

        debug!(assistant_id = %created.id, name = %assistant.name, "Assistant provisioned");

        Ok(ProviderAssistant {
            id: created.id,
            name: created.name,
        })
    }
}
