use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::core::telephony::TelephonyError;
use crate::utils::PhoneValidationError;

/// Errors surfaced by call lifecycle operations and REST handlers
#[derive(Debug, Error)]
pub enum AppError {
    /// The destination number is not a valid E.164 number
    #[error("Invalid phone number: {0}")]
    InvalidNumber(#[from] PhoneValidationError),

    /// The telephony platform rejected or failed the request.
    ///
    /// `call_id` names the tracked call the failure concerns, when there is one.
    #[error("Telephony provider error: {source}")]
    Provider {
        call_id: Option<String>,
        #[source]
        source: TelephonyError,
    },

    /// Unknown call identifier
    #[error("Call not found: {0}")]
    NotFound(String),

    /// The request is missing information or is otherwise malformed
    #[error("{0}")]
    BadRequest(String),

    /// The server is not configured for the requested operation
    #[error("Configuration error: {0}")]
    Config(String),
}

pub type AppResult<T> = Result<T, AppError>;

impl From<TelephonyError> for AppError {
    fn from(source: TelephonyError) -> Self {
        Self::Provider {
            call_id: None,
            source,
        }
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidNumber(_) | Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Provider { .. } => StatusCode::BAD_GATEWAY,
            Self::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = match &self {
            Self::Provider { call_id, .. } => json!({
                "success": false,
                "call_id": call_id,
                "message": self.to_string(),
            }),
            _ => json!({
                "success": false,
                "message": self.to_string(),
            }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::InvalidNumber(PhoneValidationError::Empty).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::NotFound("x".into()).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::from(TelephonyError::Request("timeout".into())).status_code(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::Config("missing".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[tokio::test]
    async fn test_provider_error_body_carries_call_id() {
        let response = AppError::Provider {
            call_id: Some("local-1".into()),
            source: TelephonyError::Api {
                status: 500,
                body: "boom".into(),
            },
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["call_id"], "local-1");
        assert!(json["message"].as_str().unwrap().contains("boom"));
    }
}
