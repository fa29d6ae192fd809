//! Webhook event taxonomy.
//!
//! The telephony platform reports call progress through independent, possibly
//! duplicated or reordered webhook deliveries. Each delivery is reduced to a
//! [`CallEvent`] and applied to the call's state machine on its own.
//!
//! Only the event names below cause transitions; everything else is recorded
//! as [`CallEventKind::Other`] and treated as a no-op.
//!
//! | event            | status       |
//! |------------------|--------------|
//! | `call.ringing`   | ringing      |
//! | `call.started`   | in_progress  |
//! | `call.ended`     | completed    |
//! | `call.failed`    | failed       |
//!
//! `transcript` events carry one spoken line and are logged without a transition.

use serde_json::Value;
use thiserror::Error;

use super::record::CallStatus;

pub const CALL_RINGING: &str = "call.ringing";
pub const CALL_STARTED: &str = "call.started";
pub const CALL_ENDED: &str = "call.ended";
pub const CALL_FAILED: &str = "call.failed";
pub const TRANSCRIPT: &str = "transcript";

/// Payloads larger than this are summarized rather than kept on the record
pub const MAX_RETAINED_PAYLOAD_BYTES: usize = 16 * 1024;

/// Recognized event kinds
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallEventKind {
    Ringing,
    Started,
    Ended,
    Failed,
    /// Any event name outside the fixed mapping, e.g. `transcript`
    Other(String),
}

impl CallEventKind {
    pub fn from_name(name: &str) -> Self {
        match name {
            CALL_RINGING => Self::Ringing,
            CALL_STARTED => Self::Started,
            CALL_ENDED => Self::Ended,
            CALL_FAILED => Self::Failed,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Self::Ringing => CALL_RINGING,
            Self::Started => CALL_STARTED,
            Self::Ended => CALL_ENDED,
            Self::Failed => CALL_FAILED,
            Self::Other(name) => name,
        }
    }

    /// Status this event moves a call to, if any
    pub fn target_status(&self) -> Option<CallStatus> {
        match self {
            Self::Ringing => Some(CallStatus::Ringing),
            Self::Started => Some(CallStatus::InProgress),
            Self::Ended => Some(CallStatus::Completed),
            Self::Failed => Some(CallStatus::Failed),
            Self::Other(_) => None,
        }
    }
}

/// A single call event extracted from a webhook delivery
#[derive(Debug, Clone, PartialEq)]
pub struct CallEvent {
    pub call_id: String,
    pub kind: CallEventKind,
    /// Caller number, when the payload carries one
    pub phone_number: Option<String>,
    /// The full webhook payload
    pub payload: Value,
}

/// One line of conversation reported by a `transcript` event
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptLine {
    pub role: String,
    pub text: String,
}

/// Reasons a webhook payload could not be reduced to a [`CallEvent`]
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EventParseError {
    #[error("Webhook payload is not a JSON object")]
    NotAnObject,

    #[error("Webhook payload has no call identifier")]
    MissingCallId,

    #[error("Webhook payload has no event type")]
    MissingEventType,
}

impl CallEvent {
    pub fn new(call_id: impl Into<String>, event_type: &str, payload: Value) -> Self {
        Self {
            call_id: call_id.into(),
            kind: CallEventKind::from_name(event_type),
            phone_number: None,
            payload,
        }
    }

    /// Error description carried by a failure event.
    ///
    /// Looks at the `error` fields first, then `endedReason`, accepting either a
    /// string or an object with a `message` field.
    pub fn error_message(&self) -> Option<String> {
        let candidates = [
            self.payload.get("error"),
            self.payload.pointer("/message/error"),
            self.payload.pointer("/call/endedReason"),
            self.payload.pointer("/message/endedReason"),
        ];

        candidates.into_iter().flatten().find_map(|value| match value {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Object(map) => map
                .get("message")
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        })
    }

    /// The spoken line carried by a `transcript` event.
    ///
    /// Reads `{"transcript": {"role", "text"}}`, or `{"message": {"role", "transcript"}}`
    /// for server messages.
    pub fn transcript(&self) -> Option<TranscriptLine> {
        if self.kind.name() != TRANSCRIPT {
            return None;
        }

        let (source, text_key) = match self.payload.get("transcript") {
            Some(transcript) if transcript.is_object() => (transcript, "text"),
            _ => (self.payload.get("message")?, "transcript"),
        };

        Some(TranscriptLine {
            role: str_field(source, "role").unwrap_or_else(|| "unknown".to_string()),
            text: source
                .get(text_key)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
        })
    }

    /// The payload as it should be kept on the call record.
    ///
    /// Oversized payloads are replaced by a summary naming the event and its size.
    pub fn retained_payload(&self) -> Value {
        let size = serde_json::to_vec(&self.payload)
            .map(|bytes| bytes.len())
            .unwrap_or(usize::MAX);
        if size <= MAX_RETAINED_PAYLOAD_BYTES {
            return self.payload.clone();
        }

        serde_json::json!({
            "type": self.kind.name(),
            "truncated": true,
            "bytes": size,
        })
    }

    /// Reduce a webhook payload to a call event.
    ///
    /// Three shapes are understood, tried in order:
    /// 1. flat: `{"call_id": "...", "event_type": "call.started"}` (`status` is
    ///    accepted in place of `event_type`)
    /// 2. envelope: `{"type": "call.started", "call": {"id": "...", "customer": {"number": "..."}}}`
    /// 3. server message: `{"message": {"type": "status-update", "call": {...}, "status": "..."}}`
    pub fn from_webhook(payload: Value) -> Result<Self, EventParseError> {
        if !payload.is_object() {
            return Err(EventParseError::NotAnObject);
        }

        if let Some(message) = payload.get("message").filter(|m| m.is_object()) {
            let (call_id, event_type, phone_number) = parse_server_message(message)?;
            return Ok(Self {
                call_id,
                kind: CallEventKind::from_name(&event_type),
                phone_number,
                payload,
            });
        }

        let call = payload.get("call");
        let call_id = str_field(&payload, "call_id")
            .or_else(|| call.and_then(|c| str_field(c, "id")))
            .ok_or(EventParseError::MissingCallId)?;

        let event_type = str_field(&payload, "event_type")
            .or_else(|| str_field(&payload, "type"))
            .or_else(|| str_field(&payload, "status"))
            .ok_or(EventParseError::MissingEventType)?;

        let phone_number = str_field(&payload, "phone_number")
            .or_else(|| call.and_then(customer_number));

        Ok(Self {
            call_id,
            kind: CallEventKind::from_name(&event_type),
            phone_number,
            payload,
        })
    }
}

fn str_field(value: &Value, key: &str) -> Option<String> {
    value
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn customer_number(call: &Value) -> Option<String> {
    call.get("customer").and_then(|c| str_field(c, "number"))
}

/// Map the server-message envelope onto the fixed event names
fn parse_server_message(
    message: &Value,
) -> Result<(String, String, Option<String>), EventParseError> {
    let call = message.get("call");
    let call_id = call
        .and_then(|c| str_field(c, "id"))
        .ok_or(EventParseError::MissingCallId)?;
    let message_type = str_field(message, "type").ok_or(EventParseError::MissingEventType)?;

    let event_type = match message_type.as_str() {
        "status-update" => {
            let status = str_field(message, "status")
                .or_else(|| call.and_then(|c| str_field(c, "status")))
                .ok_or(EventParseError::MissingEventType)?;
            match status.as_str() {
                "ringing" => CALL_RINGING.to_string(),
                "in-progress" => CALL_STARTED.to_string(),
                "ended" => CALL_ENDED.to_string(),
                other => format!("status-update.{other}"),
            }
        }
        "end-of-call-report" => CALL_ENDED.to_string(),
        other => other.to_string(),
    };

    Ok((call_id, event_type, call.and_then(customer_number)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_flat_payload() {
        let event = CallEvent::from_webhook(json!({
            "call_id": "c-1",
            "event_type": "call.started",
            "phone_number": "+14155550100"
        }))
        .unwrap();

        assert_eq!(event.call_id, "c-1");
        assert_eq!(event.kind, CallEventKind::Started);
        assert_eq!(event.phone_number.as_deref(), Some("+14155550100"));
    }

    #[test]
    fn test_flat_payload_with_status_alias() {
        let event =
            CallEvent::from_webhook(json!({"call_id": "c-1", "status": "call.ended"})).unwrap();
        assert_eq!(event.kind, CallEventKind::Ended);
    }

    #[test]
    fn test_envelope_payload() {
        let event = CallEvent::from_webhook(json!({
            "type": "call.started",
            "call": {"id": "test-call-123", "customer": {"number": "+1234567890"}}
        }))
        .unwrap();

        assert_eq!(event.call_id, "test-call-123");
        assert_eq!(event.kind, CallEventKind::Started);
        assert_eq!(event.phone_number.as_deref(), Some("+1234567890"));
    }

    #[test]
    fn test_server_message_status_updates() {
        for (status, kind) in [
            ("ringing", CallEventKind::Ringing),
            ("in-progress", CallEventKind::Started),
            ("ended", CallEventKind::Ended),
        ] {
            let event = CallEvent::from_webhook(json!({
                "message": {"type": "status-update", "status": status, "call": {"id": "c-9"}}
            }))
            .unwrap();
            assert_eq!(event.call_id, "c-9");
            assert_eq!(event.kind, kind);
        }
    }

    #[test]
    fn test_server_message_unknown_status_is_other() {
        let event = CallEvent::from_webhook(json!({
            "message": {"type": "status-update", "call": {"id": "c-9", "status": "queued"}}
        }))
        .unwrap();
        assert_eq!(
            event.kind,
            CallEventKind::Other("status-update.queued".to_string())
        );
        assert_eq!(event.kind.target_status(), None);
    }

    #[test]
    fn test_end_of_call_report_maps_to_ended() {
        let event = CallEvent::from_webhook(json!({
            "message": {"type": "end-of-call-report", "call": {"id": "c-9"}}
        }))
        .unwrap();
        assert_eq!(event.kind, CallEventKind::Ended);
    }

    #[test]
    fn test_unknown_event_names() {
        let event = CallEvent::from_webhook(json!({
            "type": "transcript",
            "call": {"id": "c-1"},
            "transcript": {"text": "hello", "role": "user"}
        }))
        .unwrap();
        assert_eq!(event.kind, CallEventKind::Other("transcript".to_string()));
        assert_eq!(event.kind.name(), "transcript");
    }

    #[test]
    fn test_transcript_lines() {
        let event = CallEvent::from_webhook(json!({
            "type": "transcript",
            "call": {"id": "c-1"},
            "transcript": {"text": "I need help with my order", "role": "user"}
        }))
        .unwrap();
        assert_eq!(
            event.transcript(),
            Some(TranscriptLine {
                role: "user".to_string(),
                text: "I need help with my order".to_string()
            })
        );

        let event = CallEvent::from_webhook(json!({
            "message": {
                "type": "transcript",
                "role": "assistant",
                "transcript": "Happy to help",
                "call": {"id": "c-1"}
            }
        }))
        .unwrap();
        let line = event.transcript().unwrap();
        assert_eq!(line.role, "assistant");
        assert_eq!(line.text, "Happy to help");

        let event = CallEvent::new("c-1", CALL_STARTED, json!({"transcript": {"text": "x"}}));
        assert_eq!(event.transcript(), None);
    }

    #[test]
    fn test_retained_payload_is_bounded() {
        let small = CallEvent::new("c-1", CALL_STARTED, json!({"call_id": "c-1"}));
        assert_eq!(small.retained_payload(), json!({"call_id": "c-1"}));

        let padding = "x".repeat(MAX_RETAINED_PAYLOAD_BYTES);
        let large = CallEvent::new("c-1", CALL_STARTED, json!({"padding": padding}));
        let retained = large.retained_payload();
        assert_eq!(retained["type"], CALL_STARTED);
        assert_eq!(retained["truncated"], true);
        assert!(retained["bytes"].as_u64().unwrap() > MAX_RETAINED_PAYLOAD_BYTES as u64);
    }

    #[test]
    fn test_malformed_payloads() {
        assert_eq!(
            CallEvent::from_webhook(json!([1, 2, 3])),
            Err(EventParseError::NotAnObject)
        );
        assert_eq!(
            CallEvent::from_webhook(json!({"type": "call.started"})),
            Err(EventParseError::MissingCallId)
        );
        assert_eq!(
            CallEvent::from_webhook(json!({"call_id": "c-1"})),
            Err(EventParseError::MissingEventType)
        );
        assert_eq!(
            CallEvent::from_webhook(json!({"call_id": "   ", "type": "call.ended"})),
            Err(EventParseError::MissingCallId)
        );
    }

    #[test]
    fn test_error_message_extraction() {
        let event = CallEvent::new("c", CALL_FAILED, json!({"error": "busy"}));
        assert_eq!(event.error_message().as_deref(), Some("busy"));

        let event = CallEvent::new("c", CALL_FAILED, json!({"error": {"message": "no-answer"}}));
        assert_eq!(event.error_message().as_deref(), Some("no-answer"));

        let event = CallEvent::new(
            "c",
            CALL_FAILED,
            json!({"call": {"endedReason": "customer-busy"}}),
        );
        assert_eq!(event.error_message().as_deref(), Some("customer-busy"));

        let event = CallEvent::new("c", CALL_FAILED, json!({}));
        assert_eq!(event.error_message(), None);
    }
}
