//! Call lifecycle tracking
//!
//! Records are created when an outbound call is requested or when the first
//! webhook for an unknown call arrives, and move through a monotonic status
//! machine as events are applied. Records are kept for the life of the process.

pub mod controller;
pub mod events;
pub mod record;
pub mod store;

pub use controller::{CallController, EventOutcome, HealthReport, OutboundCallRequest};
pub use events::{CallEvent, CallEventKind, EventParseError, TranscriptLine};
pub use record::{CallDirection, CallRecord, CallStatus, Transition};
pub use store::CallStore;
