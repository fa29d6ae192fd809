//! Request authentication context and API secret matching.

use subtle::ConstantTimeEq;

use crate::config::AuthApiSecret;

/// Identity attached to a request by the auth middleware
///
/// Handlers read it through `Extension<Auth>`. `id` is `None` when
/// authentication is disabled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Auth {
    pub id: Option<String>,
}

impl Auth {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
        }
    }

    /// Context for requests served while authentication is disabled
    pub fn empty() -> Self {
        Self::default()
    }
}

/// Find the id of the API secret matching `token`.
///
/// Every configured secret is compared in constant time, so the response time
/// does not depend on which entry (if any) matched.
pub fn match_api_secret_id<'a>(token: &str, secrets: &'a [AuthApiSecret]) -> Option<&'a str> {
    let mut matched = None;
    for entry in secrets {
        let equal: bool = entry.secret.as_bytes().ct_eq(token.as_bytes()).into();
        if equal && matched.is_none() {
            matched = Some(entry.id.as_str());
        }
    }
    matched
}
