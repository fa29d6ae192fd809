//! Call record and status state machine.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Which side placed the call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallDirection {
    Inbound,
    Outbound,
}

impl CallDirection {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Inbound => "inbound",
            Self::Outbound => "outbound",
        }
    }
}

impl std::fmt::Display for CallDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lifecycle status of a call.
///
/// Progress is monotonic along `Requested -> Ringing -> InProgress -> Completed`.
/// `Failed` is reachable from any non-terminal status. `Completed` and `Failed`
/// are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    Requested,
    Ringing,
    InProgress,
    Completed,
    Failed,
}

impl CallStatus {
    #[inline]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::Ringing => "ringing",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Whether no further transition is accepted from this status
    #[inline]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Position along the happy path; `Failed` sits outside it
    fn rank(&self) -> u8 {
        match self {
            Self::Requested => 0,
            Self::Ringing => 1,
            Self::InProgress => 2,
            Self::Completed => 3,
            Self::Failed => u8::MAX,
        }
    }

    /// Whether moving from `self` to `next` is an accepted transition.
    ///
    /// Repeats and moves backwards along the happy path are rejected so that
    /// duplicated or reordered webhook deliveries cannot regress a call.
    pub fn can_transition_to(&self, next: CallStatus) -> bool {
        if self.is_terminal() {
            return false;
        }
        match next {
            Self::Failed => true,
            _ => next.rank() > self.rank(),
        }
    }
}

impl std::fmt::Display for CallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Outcome of attempting a status transition on a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The record moved from `from` to `to`
    Applied { from: CallStatus, to: CallStatus },
    /// The record was left untouched
    Ignored { current: CallStatus },
}

impl Transition {
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }
}

/// A tracked call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
    /// Identifier assigned by the telephony platform
    pub call_id: String,
    pub direction: CallDirection,
    pub status: CallStatus,
    /// Destination (outbound) or caller (inbound) number
    pub phone_number: String,
    /// Assistant handling the call, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assistant_id: Option<String>,
    #[serde(default)]
    pub metadata: serde_json::Value,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
    /// Set only when `status` is `Failed`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
    /// Most recent webhook payload seen for this call
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_event: Option<serde_json::Value>,
}

impl CallRecord {
    /// A freshly requested outbound call
    pub fn outbound(call_id: impl Into<String>, phone_number: impl Into<String>) -> Self {
        Self::new(
            call_id.into(),
            CallDirection::Outbound,
            CallStatus::Requested,
            phone_number.into(),
        )
    }

    /// An inbound call seen for the first time
    pub fn inbound(call_id: impl Into<String>, phone_number: impl Into<String>) -> Self {
        Self::new(
            call_id.into(),
            CallDirection::Inbound,
            CallStatus::Ringing,
            phone_number.into(),
        )
    }

    fn new(
        call_id: String,
        direction: CallDirection,
        status: CallStatus,
        phone_number: String,
    ) -> Self {
        let now = OffsetDateTime::now_utc();
        Self {
            call_id,
            direction,
            status,
            phone_number,
            assistant_id: None,
            metadata: serde_json::Value::Object(Default::default()),
            created_at: now,
            updated_at: now,
            last_error: None,
            last_event: None,
        }
    }

    pub fn with_assistant_id(mut self, assistant_id: Option<String>) -> Self {
        self.assistant_id = assistant_id;
        self
    }

    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn is_active(&self) -> bool {
        !self.status.is_terminal()
    }

    /// Fold an outbound request into a record first created from a webhook.
    ///
    /// The call becomes outbound, an empty number is filled in and the request's
    /// metadata is merged over the existing keys. Status is left alone.
    pub fn merge_outbound(&mut self, requested: &CallRecord) {
        self.direction = CallDirection::Outbound;
        if self.phone_number.is_empty() {
            self.phone_number = requested.phone_number.clone();
        }
        if self.assistant_id.is_none() {
            self.assistant_id = requested.assistant_id.clone();
        }

        match (&mut self.metadata, &requested.metadata) {
            (serde_json::Value::Object(existing), serde_json::Value::Object(incoming)) => {
                for (key, value) in incoming {
                    existing.insert(key.clone(), value.clone());
                }
            }
            (existing, incoming) if !incoming.is_null() => *existing = incoming.clone(),
            _ => {}
        }
    }

    /// Keep `payload` as the latest webhook delivery; terminal records are frozen
    pub fn record_event(&mut self, payload: serde_json::Value) -> bool {
        if !self.is_active() {
            return false;
        }
        self.last_event = Some(payload);
        true
    }

    /// Attempt to move the record to `next`.
    ///
    /// On acceptance the status and `updated_at` change, and `last_error` is set
    /// when `next` is `Failed`. A rejected transition leaves every field as it was.
    pub fn transition(&mut self, next: CallStatus, error: Option<String>) -> Transition {
        let current = self.status;
        if !current.can_transition_to(next) {
            return Transition::Ignored { current };
        }

        self.status = next;
        self.updated_at = OffsetDateTime::now_utc().max(self.updated_at);
        if next == CallStatus::Failed {
            self.last_error = Some(error.unwrap_or_else(|| "Unknown error".to_string()));
        }

        Transition::Applied {
            from: current,
            to: next,
        }
    }
}
