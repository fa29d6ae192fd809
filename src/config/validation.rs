//! Configuration validation.

use std::collections::HashSet;

use super::{AuthApiSecret, ServerConfig, TlsConfig};
use crate::utils::validate_phone_number;

/// Run every check against a fully merged configuration
pub(super) fn validate_server_config(config: &ServerConfig) -> Result<(), String> {
    validate_tls(&config.tls)?;
    validate_auth_api_secrets(&config.auth_api_secrets)?;
    validate_auth_required(config.auth_required, &config.auth_api_secrets)?;
    validate_base_url(&config.vapi_base_url)?;
    validate_transfer_number(&config.transfer_phone_number)?;
    if config.telephony_timeout_seconds == 0 {
        return Err("TELEPHONY_TIMEOUT_SECONDS must be greater than zero".to_string());
    }
    validate_rate_limit(
        config.rate_limit_requests_per_second,
        config.rate_limit_burst_size,
    )?;
    config.assistant.validate()
}

pub(super) fn validate_rate_limit(requests_per_second: u32, burst_size: u32) -> Result<(), String> {
    if requests_per_second == 0 {
        return Err("RATE_LIMIT_REQUESTS_PER_SECOND must be greater than zero".to_string());
    }
    if burst_size == 0 {
        return Err("RATE_LIMIT_BURST_SIZE must be greater than zero".to_string());
    }
    Ok(())
}

/// Certificate and key files must exist when TLS is enabled
pub(super) fn validate_tls(tls: &Option<TlsConfig>) -> Result<(), String> {
    let Some(tls) = tls else {
        return Ok(());
    };

    if !tls.cert_path.exists() {
        return Err(format!(
            "TLS certificate file not found: {}",
            tls.cert_path.display()
        ));
    }
    if !tls.key_path.exists() {
        return Err(format!(
            "TLS private key file not found: {}",
            tls.key_path.display()
        ));
    }
    Ok(())
}

/// API secret ids must be non-empty and unique, secrets non-empty
pub(super) fn validate_auth_api_secrets(secrets: &[AuthApiSecret]) -> Result<(), String> {
    let mut seen = HashSet::new();
    for entry in secrets {
        if entry.id.trim().is_empty() {
            return Err("API secret id must not be empty".to_string());
        }
        if entry.secret.is_empty() {
            return Err(format!("API secret for id '{}' must not be empty", entry.id));
        }
        if !seen.insert(entry.id.as_str()) {
            return Err(format!("Duplicate API secret id: {}", entry.id));
        }
    }
    Ok(())
}

pub(super) fn validate_auth_required(
    auth_required: bool,
    secrets: &[AuthApiSecret],
) -> Result<(), String> {
    if auth_required && secrets.is_empty() {
        return Err(
            "AUTH_REQUIRED is true but no API secret is configured (set AUTH_API_SECRET or AUTH_API_SECRETS_JSON)"
                .to_string(),
        );
    }
    Ok(())
}

/// The telephony base URL must be an absolute http(s) URL
pub(super) fn validate_base_url(base_url: &str) -> Result<(), String> {
    let url = url::Url::parse(base_url)
        .map_err(|e| format!("Invalid telephony base URL {base_url:?}: {e}"))?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(format!(
            "Telephony base URL must use http or https, got {scheme}"
        )),
    }
}

pub(super) fn validate_transfer_number(number: &Option<String>) -> Result<(), String> {
    match number {
        Some(number) => validate_phone_number(number)
            .map(|_| ())
            .map_err(|e| format!("Invalid transfer phone number: {e}")),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn secret(id: &str, secret: &str) -> AuthApiSecret {
        AuthApiSecret {
            id: id.to_string(),
            secret: secret.to_string(),
        }
    }

    #[test]
    fn test_validate_tls_missing_files() {
        let tls = Some(TlsConfig {
            cert_path: PathBuf::from("/nonexistent/cert.pem"),
            key_path: PathBuf::from("/nonexistent/key.pem"),
        });
        let err = validate_tls(&tls).unwrap_err();
        assert!(err.contains("certificate"));
        assert!(validate_tls(&None).is_ok());
    }

    #[test]
    fn test_validate_tls_existing_files() {
        let temp_dir = TempDir::new().unwrap();
        let cert_path = temp_dir.path().join("cert.pem");
        let key_path = temp_dir.path().join("key.pem");
        std::fs::write(&cert_path, "cert").unwrap();
        std::fs::write(&key_path, "key").unwrap();

        let tls = Some(TlsConfig {
            cert_path,
            key_path,
        });
        assert!(validate_tls(&tls).is_ok());
    }

    #[test]
    fn test_validate_auth_api_secrets() {
        assert!(validate_auth_api_secrets(&[secret("a", "1"), secret("b", "2")]).is_ok());
        assert!(
            validate_auth_api_secrets(&[secret("a", "1"), secret("a", "2")])
                .unwrap_err()
                .contains("Duplicate")
        );
        assert!(validate_auth_api_secrets(&[secret(" ", "1")]).is_err());
        assert!(validate_auth_api_secrets(&[secret("a", "")]).is_err());
    }

    #[test]
    fn test_validate_auth_required() {
        assert!(validate_auth_required(false, &[]).is_ok());
        assert!(validate_auth_required(true, &[]).is_err());
        assert!(validate_auth_required(true, &[secret("a", "1")]).is_ok());
    }

    #[test]
    fn test_validate_base_url() {
        assert!(validate_base_url("https://api.vapi.ai").is_ok());
        assert!(validate_base_url("http://127.0.0.1:9000").is_ok());
        assert!(validate_base_url("ftp://api.vapi.ai").is_err());
        assert!(validate_base_url("not a url").is_err());
    }

    #[test]
    fn test_validate_rate_limit() {
        assert!(validate_rate_limit(60, 10).is_ok());
        assert!(validate_rate_limit(0, 10).unwrap_err().contains("REQUESTS_PER_SECOND"));
        assert!(validate_rate_limit(60, 0).unwrap_err().contains("BURST_SIZE"));
    }

    #[test]
    fn test_validate_transfer_number() {
        assert!(validate_transfer_number(&None).is_ok());
        assert!(validate_transfer_number(&Some("+14155550199".to_string())).is_ok());
        assert!(validate_transfer_number(&Some("4155550199".to_string())).is_err());
    }
}
