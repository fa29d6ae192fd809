pub mod phone_validation;
pub use phone_validation::{PhoneValidationError, validate_phone_number};
pub mod signature;
pub use signature::{WebhookSignatureError, verify_webhook_request};
