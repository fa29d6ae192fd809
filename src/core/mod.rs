pub mod calls;
pub mod telephony;

pub use calls::{
    CallController, CallDirection, CallEvent, CallRecord, CallStatus, CallStore, EventOutcome,
    HealthReport, OutboundCallRequest,
};
pub use telephony::{
    TelephonyError, TelephonyProvider, TelephonyResult, VapiClient, VapiConfig,
};
