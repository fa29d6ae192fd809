use axum::{
    Extension,
    extract::{Path, State},
    response::Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;

use crate::auth::Auth;
use crate::core::calls::{CallRecord, OutboundCallRequest};
use crate::errors::app_error::AppResult;
use crate::state::AppState;

/// Body of `POST /calls/outbound`
#[derive(Debug, Clone, Deserialize)]
pub struct OutboundCallBody {
    pub phone_number: String,
    /// Greeting override for this call
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub assistant_id: Option<String>,
    /// Number the assistant may transfer the caller to
    #[serde(default)]
    pub transfer_to: Option<String>,
    /// Free-form context stored with the call
    #[serde(default)]
    pub call_context: Option<serde_json::Value>,
}

impl From<OutboundCallBody> for OutboundCallRequest {
    fn from(body: OutboundCallBody) -> Self {
        let mut request = OutboundCallRequest::new(body.phone_number);
        request.message = body.message;
        request.assistant_id = body.assistant_id;
        request.transfer_to = body.transfer_to;
        if let Some(context) = body.call_context {
            request.metadata = context;
        }
        request
    }
}

#[derive(Debug, Serialize)]
pub struct OutboundCallResponse {
    pub success: bool,
    pub call_id: String,
    pub message: String,
    pub details: CallRecord,
}

#[derive(Debug, Serialize)]
pub struct EndCallResponse {
    pub success: bool,
    pub message: String,
    pub call: CallRecord,
}

#[derive(Debug, Serialize)]
pub struct CallListResponse {
    pub calls: Vec<CallRecord>,
    pub count: usize,
}

impl From<Vec<CallRecord>> for CallListResponse {
    fn from(calls: Vec<CallRecord>) -> Self {
        Self {
            count: calls.len(),
            calls,
        }
    }
}

/// Place an outbound call
///
/// The authenticated client id, when there is one, is kept as `requested_by`.
pub async fn create_outbound_call(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<Auth>,
    Json(body): Json<OutboundCallBody>,
) -> AppResult<Json<OutboundCallResponse>> {
    let mut request = OutboundCallRequest::from(body);
    request.requested_by = auth.id;
    let record = state.calls.request_outbound(request).await?;

    info!(
        call_id = %record.call_id,
        requested_by = ?record.metadata.get("requested_by"),
        "Outbound call accepted"
    );
    Ok(Json(OutboundCallResponse {
        success: true,
        call_id: record.call_id.clone(),
        message: format!("Call initiated to {}", record.phone_number),
        details: record,
    }))
}

/// Calls that have not reached a terminal status
pub async fn list_active_calls(State(state): State<Arc<AppState>>) -> Json<CallListResponse> {
    Json(state.calls.active_calls().into())
}

/// Every call tracked since startup
pub async fn list_calls(State(state): State<Arc<AppState>>) -> Json<CallListResponse> {
    Json(state.calls.list_calls().into())
}

pub async fn get_call(
    State(state): State<Arc<AppState>>,
    Path(call_id): Path<String>,
) -> AppResult<Json<CallRecord>> {
    state.calls.get_call(&call_id).map(Json)
}

/// Hang up a call; the record is kept with status `completed`
pub async fn end_call(
    State(state): State<Arc<AppState>>,
    Path(call_id): Path<String>,
) -> AppResult<Json<EndCallResponse>> {
    let record = state.calls.end_call(&call_id).await?;

    Ok(Json(EndCallResponse {
        success: true,
        message: format!("Call {} ended", record.call_id),
        call: record,
    }))
}
