//! Webhook authenticity checks
//!
//! The telephony platform can authenticate its webhook deliveries in two ways:
//! - `x-vapi-secret`: the shared secret sent verbatim in a header
//! - `x-vapi-signature`: hex-encoded HMAC-SHA256 of the raw request body, keyed
//!   with the shared secret
//!
//! Both comparisons are constant-time.

use hmac::{Hmac, Mac};
use http::HeaderMap;
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the shared webhook secret verbatim
pub const SECRET_HEADER: &str = "x-vapi-secret";
/// Header carrying the hex HMAC-SHA256 of the request body
pub const SIGNATURE_HEADER: &str = "x-vapi-signature";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WebhookSignatureError {
    #[error("Webhook request carries neither x-vapi-secret nor x-vapi-signature")]
    MissingCredentials,

    #[error("Webhook secret does not match")]
    SecretMismatch,

    #[error("Webhook signature is not valid hex")]
    MalformedSignature,

    #[error("Webhook signature does not match request body")]
    SignatureMismatch,
}

/// Compute the hex HMAC-SHA256 signature of `body` keyed with `secret`
pub fn sign_body(secret: &str, body: &[u8]) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC can take key of any size");
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}

/// Verify a webhook request against the configured shared secret.
///
/// The signature header takes precedence when both headers are present.
pub fn verify_webhook_request(
    secret: &str,
    headers: &HeaderMap,
    body: &[u8],
) -> Result<(), WebhookSignatureError> {
    if let Some(signature) = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
    {
        let provided = hex::decode(signature.trim().trim_start_matches("sha256="))
            .map_err(|_| WebhookSignatureError::MalformedSignature)?;

        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .expect("HMAC can take key of any size");
        mac.update(body);
        return mac
            .verify_slice(&provided)
            .map_err(|_| WebhookSignatureError::SignatureMismatch);
    }

    if let Some(provided) = headers.get(SECRET_HEADER).and_then(|v| v.to_str().ok()) {
        if bool::from(provided.as_bytes().ct_eq(secret.as_bytes())) {
            return Ok(());
        }
        return Err(WebhookSignatureError::SecretMismatch);
    }

    Err(WebhookSignatureError::MissingCredentials)
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    const SECRET: &str = "whsec-test";
    const BODY: &[u8] = br#"{"type":"call.started","call":{"id":"abc"}}"#;

    #[test]
    fn test_secret_header_match() {
        let mut headers = HeaderMap::new();
        headers.insert(SECRET_HEADER, HeaderValue::from_static(SECRET));
        assert!(verify_webhook_request(SECRET, &headers, BODY).is_ok());
    }

    #[test]
    fn test_secret_header_mismatch() {
        let mut headers = HeaderMap::new();
        headers.insert(SECRET_HEADER, HeaderValue::from_static("wrong"));
        assert_eq!(
            verify_webhook_request(SECRET, &headers, BODY),
            Err(WebhookSignatureError::SecretMismatch)
        );
    }

    #[test]
    fn test_signature_header_match() {
        let signature = sign_body(SECRET, BODY);
        let mut headers = HeaderMap::new();
        headers.insert(SIGNATURE_HEADER, HeaderValue::from_str(&signature).unwrap());
        assert!(verify_webhook_request(SECRET, &headers, BODY).is_ok());

        let mut prefixed = HeaderMap::new();
        prefixed.insert(
            SIGNATURE_HEADER,
            HeaderValue::from_str(&format!("sha256={signature}")).unwrap(),
        );
        assert!(verify_webhook_request(SECRET, &prefixed, BODY).is_ok());
    }

    #[test]
    fn test_signature_over_different_body_fails() {
        let signature = sign_body(SECRET, b"{}");
        let mut headers = HeaderMap::new();
        headers.insert(SIGNATURE_HEADER, HeaderValue::from_str(&signature).unwrap());
        assert_eq!(
            verify_webhook_request(SECRET, &headers, BODY),
            Err(WebhookSignatureError::SignatureMismatch)
        );
    }

    #[test]
    fn test_malformed_signature() {
        let mut headers = HeaderMap::new();
        headers.insert(SIGNATURE_HEADER, HeaderValue::from_static("not-hex"));
        assert_eq!(
            verify_webhook_request(SECRET, &headers, BODY),
            Err(WebhookSignatureError::MalformedSignature)
        );
    }

    #[test]
    fn test_missing_credentials() {
        assert_eq!(
            verify_webhook_request(SECRET, &HeaderMap::new(), BODY),
            Err(WebhookSignatureError::MissingCredentials)
        );
    }
}
