//! HTTP request handlers
//!
//! - `api` - Liveness and health endpoints
//! - `calls` - Outbound calls and call queries
//! - `webhooks` - Telephony event intake
//! - `assistant` - Assistant provisioning, inbound routing and config echo

pub mod api;
pub mod assistant;
pub mod calls;
pub mod webhooks;
