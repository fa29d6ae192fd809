//! Configuration for the Vapi REST API client.

use std::time::Duration;

use zeroize::Zeroize;

/// Default Vapi API base URL
pub const VAPI_BASE_URL: &str = "https://api.vapi.ai";

/// Default request timeout in seconds
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[derive(Clone)]
pub struct VapiConfig {
    /// Private API token (`Authorization: Bearer <token>`)
    pub api_token: Option<String>,
    /// API base URL without trailing slash
    pub base_url: String,
    /// Phone number used as caller id for outbound calls
    pub phone_number_id: Option<String>,
    pub timeout: Duration,
}

impl Default for VapiConfig {
    fn default() -> Self {
        Self {
            api_token: None,
            base_url: VAPI_BASE_URL.to_string(),
            phone_number_id: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECONDS),
        }
    }
}

impl VapiConfig {
    /// Join `path` onto the base URL
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

impl std::fmt::Debug for VapiConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VapiConfig")
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("phone_number_id", &self.phone_number_id)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Drop for VapiConfig {
    fn drop(&mut self) {
        if let Some(ref mut token) = self.api_token {
            token.zeroize();
        }
    }
}
