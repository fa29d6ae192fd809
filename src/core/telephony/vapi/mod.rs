mod client;
mod config;
mod messages;

pub use client::VapiClient;
pub use config::{DEFAULT_TIMEOUT_SECONDS, VAPI_BASE_URL, VapiConfig};
