//! Phone number validation
//!
//! Destination and origin numbers are exchanged with the telephony platform in
//! E.164 form: a leading `+`, a non-zero country code digit, and at most fifteen
//! digits in total (e.g. `+14155550100`).

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static E164_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+[1-9][0-9]{1,14}$").expect("E.164 pattern is valid"));

/// Errors that can occur during phone number validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PhoneValidationError {
    #[error("Phone number is empty")]
    Empty,

    #[error("Phone number must start with '+' followed by the country code: {0}")]
    MissingPlusPrefix(String),

    #[error("Phone number is not a valid E.164 number: {0}")]
    InvalidFormat(String),
}

/// Validate that `phone_number` is an E.164 number.
///
/// Surrounding whitespace is tolerated and stripped; the returned string is the
/// normalized number that should be sent to the telephony platform. Separators
/// such as spaces, dashes or parentheses inside the number are rejected rather
/// than silently removed.
pub fn validate_phone_number(phone_number: &str) -> Result<String, PhoneValidationError> {
    let trimmed = phone_number.trim();

    if trimmed.is_empty() {
        return Err(PhoneValidationError::Empty);
    }

    if !trimmed.starts_with('+') {
        return Err(PhoneValidationError::MissingPlusPrefix(trimmed.to_string()));
    }

    if !E164_PATTERN.is_match(trimmed) {
        return Err(PhoneValidationError::InvalidFormat(trimmed.to_string()));
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_numbers() {
        assert_eq!(
            validate_phone_number("+14155550100").unwrap(),
            "+14155550100"
        );
        assert_eq!(
            validate_phone_number("+917204218098").unwrap(),
            "+917204218098"
        );
        assert!(validate_phone_number("+44").is_ok());
        assert!(validate_phone_number("+123456789012345").is_ok());
    }

    #[test]
    fn test_surrounding_whitespace_is_trimmed() {
        assert_eq!(
            validate_phone_number("  +14155550100\n").unwrap(),
            "+14155550100"
        );
    }

    #[test]
    fn test_empty_number() {
        assert_eq!(validate_phone_number(""), Err(PhoneValidationError::Empty));
        assert_eq!(
            validate_phone_number("   "),
            Err(PhoneValidationError::Empty)
        );
    }

    #[test]
    fn test_missing_plus_prefix() {
        assert!(matches!(
            validate_phone_number("14155550100"),
            Err(PhoneValidationError::MissingPlusPrefix(_))
        ));
    }

    #[test]
    fn test_invalid_formats() {
        for number in [
            "+",
            "+0123456789",
            "+1",
            "+1234567890123456",
            "+1 415 555 0100",
            "+1-415-555-0100",
            "+1415555010a",
            "++14155550100",
        ] {
            assert!(
                matches!(
                    validate_phone_number(number),
                    Err(PhoneValidationError::InvalidFormat(_))
                ),
                "expected {number:?} to be rejected"
            );
        }
    }
}
