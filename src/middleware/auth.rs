use crate::auth::{Auth, match_api_secret_id};
use crate::errors::auth_error::AuthError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Extract the bearer token from the `Authorization` header
fn extract_token(request: &Request) -> Result<&str, AuthError> {
    let auth_header = request
        .headers()
        .get("authorization")
        .ok_or(AuthError::MissingAuthHeader)?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    auth_str
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or(AuthError::InvalidAuthHeader)
}

/// Authentication middleware that validates bearer tokens against the
/// configured API secrets
///
/// When `auth_required` is off, an empty [`Auth`] is inserted and the request
/// passes through. Otherwise the token must match one of the API secrets; the
/// matching secret id is inserted into request extensions as [`Auth`].
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    if !state.config.auth_required {
        tracing::debug!("Authentication disabled, inserting empty Auth context");
        request.extensions_mut().insert(Auth::empty());
        return Ok(next.run(request).await);
    }

    if !state.config.has_api_secret_auth() {
        return Err(AuthError::ConfigError(
            "Authentication required but no API secret configured".to_string(),
        ));
    }

    let method = request.method().to_string();
    let path = request.uri().path().to_string();

    let token = extract_token(&request).inspect_err(|e| {
        tracing::warn!(method = %method, path = %path, error = %e, "Rejected request without valid credentials");
    })?;

    match match_api_secret_id(token, &state.config.auth_api_secrets) {
        Some(secret_id) => {
            tracing::debug!(
                method = %method,
                path = %path,
                auth_id = %secret_id,
                "API secret authentication successful"
            );
            let auth = Auth::new(secret_id);
            request.extensions_mut().insert(auth);
            Ok(next.run(request).await)
        }
        None => {
            tracing::warn!(
                method = %method,
                path = %path,
                "API secret authentication failed: token mismatch"
            );
            Err(AuthError::Unauthorized("Invalid API secret".to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_with_header(value: Option<&str>) -> Request {
        let mut builder = Request::builder().uri("/calls");
        if let Some(value) = value {
            builder = builder.header("authorization", value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_extract_token() {
        let request = request_with_header(Some("Bearer test-token"));
        assert_eq!(extract_token(&request).unwrap(), "test-token");
    }

    #[test]
    fn test_extract_token_missing_or_malformed() {
        assert!(matches!(
            extract_token(&request_with_header(None)),
            Err(AuthError::MissingAuthHeader)
        ));
        assert!(matches!(
            extract_token(&request_with_header(Some("Basic abc"))),
            Err(AuthError::InvalidAuthHeader)
        ));
        assert!(matches!(
            extract_token(&request_with_header(Some("Bearer   "))),
            Err(AuthError::InvalidAuthHeader)
        ));
    }
}
