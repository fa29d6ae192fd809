//! Parsing helpers shared by the environment and YAML loaders.

use std::str::FromStr;

use serde::Deserialize;

use super::AuthApiSecret;

/// Read an environment variable, treating blank values as unset
pub(super) fn env_var(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Parse an environment variable, falling back to `default` when unset
pub(super) fn parse_env<T>(key: &str, default: T) -> Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_var(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| format!("Invalid value for {key} ({raw:?}): {e}")),
        None => Ok(default),
    }
}

/// Parse a boolean flag ("true"/"false", "1"/"0", "yes"/"no", "on"/"off")
pub(super) fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a boolean environment variable, falling back to `default` when unset
pub(super) fn parse_env_bool(key: &str, default: bool) -> Result<bool, String> {
    match env_var(key) {
        Some(raw) => parse_bool(&raw)
            .ok_or_else(|| format!("Invalid boolean for {key}: {raw:?}")),
        None => Ok(default),
    }
}

#[derive(Deserialize)]
struct AuthApiSecretJson {
    id: String,
    secret: String,
}

/// Parse `AUTH_API_SECRETS_JSON`: `[{"id": "client-a", "secret": "..."}, ...]`
pub fn parse_auth_api_secrets_json(raw: &str) -> Result<Vec<AuthApiSecret>, String> {
    let entries: Vec<AuthApiSecretJson> = serde_json::from_str(raw)
        .map_err(|e| format!("Invalid AUTH_API_SECRETS_JSON: {e}"))?;

    Ok(entries
        .into_iter()
        .map(|entry| AuthApiSecret {
            id: entry.id.trim().to_string(),
            secret: entry.secret,
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_bool() {
        assert_eq!(parse_bool("TRUE"), Some(true));
        assert_eq!(parse_bool(" yes "), Some(true));
        assert_eq!(parse_bool("0"), Some(false));
        assert_eq!(parse_bool("off"), Some(false));
        assert_eq!(parse_bool("maybe"), None);
    }

    #[test]
    fn test_parse_auth_api_secrets_json() {
        let secrets = parse_auth_api_secrets_json(
            r#"[{"id": " client-a ", "secret": "a"}, {"id": "client-b", "secret": "b"}]"#,
        )
        .unwrap();

        assert_eq!(secrets.len(), 2);
        assert_eq!(secrets[0].id, "client-a");
        assert_eq!(secrets[1].secret, "b");
    }

    #[test]
    fn test_parse_auth_api_secrets_json_invalid() {
        let err = parse_auth_api_secrets_json(r#"{"id": "a"}"#).unwrap_err();
        assert!(err.contains("AUTH_API_SECRETS_JSON"));
    }
}
