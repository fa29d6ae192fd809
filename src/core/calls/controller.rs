//! Call lifecycle controller.
//!
//! Owns the call registry and applies every state change to it: outbound call
//! requests placed through the telephony provider, and webhook events reported
//! back by the platform. Read-only queries (`get_call`, `health`) live here too.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::events::{CallEvent, CallEventKind};
use super::record::{CallRecord, CallStatus, Transition};
use super::store::CallStore;
use crate::config::AssistantConfig;
use crate::core::telephony::{
    OutboundCallParams, ProviderAssistant, ProviderPhoneNumber, TelephonyProvider,
};
use crate::errors::app_error::{AppError, AppResult};
use crate::utils::validate_phone_number;

/// Caller-supplied options for an outbound call
#[derive(Debug, Clone, Default)]
pub struct OutboundCallRequest {
    pub phone_number: String,
    /// Assistant to use; falls back to the configured default
    pub assistant_id: Option<String>,
    /// Greeting override for this call
    pub message: Option<String>,
    /// Number the assistant may hand the caller off to
    pub transfer_to: Option<String>,
    /// Context stored on the record and forwarded to the platform
    pub metadata: serde_json::Value,
    /// API secret id of the client placing the call
    pub requested_by: Option<String>,
}

impl OutboundCallRequest {
    pub fn new(phone_number: impl Into<String>) -> Self {
        Self {
            phone_number: phone_number.into(),
            assistant_id: None,
            message: None,
            transfer_to: None,
            metadata: serde_json::Value::Object(Default::default()),
            requested_by: None,
        }
    }
}

/// What `apply_event` did with an event
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    /// The record changed status
    Applied {
        record: CallRecord,
        from: CallStatus,
    },
    /// The event was valid but did not change the record
    /// (terminal record, repeat or out-of-order delivery)
    Ignored { record: CallRecord },
    /// The event name is outside the fixed taxonomy
    Unrecognized { event_type: String },
}

/// Aggregate liveness report
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct HealthReport {
    /// "healthy" when the telephony platform is configured, "degraded" otherwise
    pub status: &'static str,
    pub active_calls: usize,
    pub total_calls: usize,
}

pub struct CallController {
    store: CallStore,
    telephony: Arc<dyn TelephonyProvider>,
    assistant: Arc<AssistantConfig>,
    default_assistant_id: Option<String>,
    default_transfer_to: Option<String>,
}

impl CallController {
    pub fn new(
        telephony: Arc<dyn TelephonyProvider>,
        assistant: AssistantConfig,
        default_assistant_id: Option<String>,
    ) -> Self {
        Self {
            store: CallStore::new(),
            telephony,
            assistant: Arc::new(assistant),
            default_assistant_id,
            default_transfer_to: None,
        }
    }

    /// Transfer destination used when a request does not name one
    pub fn with_transfer_number(mut self, transfer_to: Option<String>) -> Self {
        self.default_transfer_to = transfer_to;
        self
    }

    pub fn store(&self) -> &CallStore {
        &self.store
    }

    pub fn assistant(&self) -> &AssistantConfig {
        &self.assistant
    }

    /// Place an outbound call and start tracking it.
    ///
    /// The number is validated before the provider is contacted; an invalid
    /// number creates no record. When the provider fails, a record with a
    /// locally generated id is stored as `failed` and the error carries that id.
    pub async fn request_outbound(&self, request: OutboundCallRequest) -> AppResult<CallRecord> {
        let phone_number = validate_phone_number(&request.phone_number).inspect_err(|e| {
            warn!(phone_number = %request.phone_number, error = %e, "Rejected outbound call request");
        })?;

        let transfer_to = match request.transfer_to.filter(|t| !t.trim().is_empty()) {
            Some(number) => Some(validate_phone_number(&number)?),
            None => self.default_transfer_to.clone(),
        };

        let assistant_id = request
            .assistant_id
            .filter(|id| !id.trim().is_empty())
            .or_else(|| self.default_assistant_id.clone())
            .ok_or_else(|| AppError::BadRequest("Assistant ID is required".to_string()))?;

        let mut metadata = match request.metadata {
            serde_json::Value::Object(map) => map,
            serde_json::Value::Null => serde_json::Map::new(),
            other => {
                let mut map = serde_json::Map::new();
                map.insert("call_context".to_string(), other);
                map
            }
        };
        if let Some(number) = transfer_to {
            metadata.insert("transfer_to".to_string(), serde_json::Value::String(number));
        }
        if let Some(client) = request.requested_by {
            metadata.insert("requested_by".to_string(), serde_json::Value::String(client));
        }

        let params = OutboundCallParams {
            phone_number: phone_number.clone(),
            assistant_id: assistant_id.clone(),
            first_message: request.message.filter(|m| !m.trim().is_empty()),
            metadata: serde_json::Value::Object(metadata),
        };

        match self.telephony.create_call(&params).await {
            Ok(call) => {
                let record = CallRecord::outbound(call.id, phone_number)
                    .with_assistant_id(Some(assistant_id))
                    .with_metadata(params.metadata);

                if !self.store.insert_new(record.clone()) {
                    // A webhook for this call beat the API response; keep its progress.
                    debug!(call_id = %record.call_id, "Call already tracked from webhook");
                    return self
                        .store
                        .update(&record.call_id, |existing| {
                            existing.merge_outbound(&record);
                            existing.clone()
                        })
                        .ok_or_else(|| AppError::NotFound(record.call_id.clone()));
                }

                info!(
                    call_id = %record.call_id,
                    phone_number = %record.phone_number,
                    "Outbound call requested"
                );
                Ok(record)
            }
            Err(source) => {
                let call_id = format!("outbound-{}", uuid::Uuid::new_v4());
                let mut record = CallRecord::outbound(call_id.clone(), phone_number)
                    .with_assistant_id(Some(assistant_id))
                    .with_metadata(params.metadata);
                record.transition(CallStatus::Failed, Some(source.to_string()));
                self.store.put(record);

                error!(call_id = %call_id, error = %source, "Outbound call failed at provider");
                Err(AppError::Provider {
                    call_id: Some(call_id),
                    source,
                })
            }
        }
    }

    /// Apply a webhook event to the call it names.
    ///
    /// Unknown calls are created as inbound calls in `ringing`. Unrecognized
    /// event names and transitions out of terminal states are ignored.
    pub fn apply_event(&self, event: CallEvent) -> EventOutcome {
        let Some(target) = event.kind.target_status() else {
            return self.note_event(&event);
        };

        let error = match event.kind {
            CallEventKind::Failed => event.error_message(),
            _ => None,
        };
        let phone_number = event.phone_number.clone().unwrap_or_default();
        let call_id = event.call_id.clone();
        let payload = event.retained_payload();

        let (transition, record) = self.store.upsert_with(
            &call_id,
            || {
                info!(call_id = %call_id, "First event for unknown call, tracking as inbound");
                CallRecord::inbound(call_id.clone(), phone_number)
            },
            |record| {
                if record.phone_number.is_empty() {
                    if let Some(number) = &event.phone_number {
                        record.phone_number = number.clone();
                    }
                }
                let transition = record.transition(target, error);
                if transition.is_applied() {
                    record.record_event(payload);
                }
                transition
            },
        );

        match transition {
            Transition::Applied { from, to } => {
                if to == CallStatus::Failed {
                    warn!(
                        call_id = %record.call_id,
                        error = ?record.last_error,
                        "Call failed"
                    );
                } else {
                    info!(
                        call_id = %record.call_id,
                        direction = %record.direction,
                        from = %from,
                        to = %to,
                        "Call status updated"
                    );
                }
                EventOutcome::Applied { record, from }
            }
            Transition::Ignored { current } => {
                debug!(
                    call_id = %record.call_id,
                    current = %current,
                    event_type = %event.kind.name(),
                    "Ignoring stale or duplicate call event"
                );
                EventOutcome::Ignored { record }
            }
        }
    }

    /// Events outside the transition table: transcripts are logged, and the
    /// payload is kept on a known, active call. No record is created.
    fn note_event(&self, event: &CallEvent) -> EventOutcome {
        let event_type = event.kind.name().to_string();
        match event.transcript() {
            Some(line) => info!(
                call_id = %event.call_id,
                role = %line.role,
                text = %line.text,
                "Transcript"
            ),
            None => debug!(
                call_id = %event.call_id,
                event_type = %event_type,
                "Ignoring unrecognized call event"
            ),
        }

        self.store
            .update(&event.call_id, |record| record.record_event(event.retained_payload()));
        EventOutcome::Unrecognized { event_type }
    }

    /// Hang up a tracked call.
    ///
    /// Calls already completed or failed are returned as they are, without
    /// contacting the provider. When the provider accepts the hangup the record
    /// moves to `completed`; when it refuses, the record is left untouched.
    pub async fn end_call(&self, call_id: &str) -> AppResult<CallRecord> {
        let record = self.get_call(call_id)?;
        if !record.is_active() {
            debug!(call_id = %call_id, status = %record.status, "Call already ended");
            return Ok(record);
        }

        self.telephony.end_call(call_id).await.map_err(|source| {
            error!(call_id = %call_id, error = %source, "Failed to end call at provider");
            AppError::Provider {
                call_id: Some(call_id.to_string()),
                source,
            }
        })?;

        let (transition, record) = self
            .store
            .update(call_id, |record| {
                (record.transition(CallStatus::Completed, None), record.clone())
            })
            .ok_or_else(|| AppError::NotFound(call_id.to_string()))?;

        match transition {
            Transition::Applied { from, .. } => {
                info!(call_id = %call_id, from = %from, "Call ended");
            }
            Transition::Ignored { current } => {
                debug!(call_id = %call_id, current = %current, "Call finished before hangup");
            }
        }
        Ok(record)
    }

    /// Provision the configured assistant persona on the telephony platform
    pub async fn create_assistant(&self) -> AppResult<ProviderAssistant> {
        self.assistant.validate().map_err(AppError::Config)?;
        let assistant = self.telephony.create_assistant(&self.assistant).await?;
        info!(assistant_id = %assistant.id, provider = self.telephony.name(), "Assistant created");
        Ok(assistant)
    }

    /// Route inbound calls on a phone number to an assistant.
    ///
    /// Falls back to the default assistant when `assistant_id` is not given.
    pub async fn configure_inbound(
        &self,
        phone_number_id: &str,
        assistant_id: Option<&str>,
    ) -> AppResult<ProviderPhoneNumber> {
        if phone_number_id.trim().is_empty() {
            return Err(AppError::BadRequest("Phone number ID is required".to_string()));
        }
        let assistant_id = assistant_id
            .filter(|id| !id.trim().is_empty())
            .or(self.default_assistant_id.as_deref())
            .ok_or_else(|| AppError::BadRequest("Assistant ID is required".to_string()))?;

        let number = self
            .telephony
            .configure_inbound(phone_number_id, assistant_id)
            .await?;
        info!(
            phone_number_id = %number.id,
            assistant_id = %assistant_id,
            "Inbound calls configured"
        );
        Ok(number)
    }

    pub fn get_call(&self, call_id: &str) -> AppResult<CallRecord> {
        self.store
            .get(call_id)
            .ok_or_else(|| AppError::NotFound(call_id.to_string()))
    }

    /// Every tracked call, in no particular order
    pub fn list_calls(&self) -> Vec<CallRecord> {
        self.store.list().collect()
    }

    /// Calls not yet completed or failed
    pub fn active_calls(&self) -> Vec<CallRecord> {
        self.store.list().filter(CallRecord::is_active).collect()
    }

    pub fn health(&self) -> HealthReport {
        HealthReport {
            status: if self.telephony.is_configured() {
                "healthy"
            } else {
                "degraded"
            },
            active_calls: self.store.active_count(),
            total_calls: self.store.len(),
        }
    }
}
