//! Field-level input validation shared by lead forms and the CSV importer.
//!
//! The `validate_*` functions follow the `validator` crate's custom-function
//! signature so DTOs can reference them from `#[validate(custom(...))]`.
//! The `normalize_*` helpers return the canonical stored form.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;
use validator::{ValidateEmail, ValidationError};

/// US ZIP code: five digits, optionally followed by `-` and four digits.
static ZIP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{5}(-\d{4})?$").expect("valid regex"));

/// Two-letter US state / territory codes.
pub const US_STATE_CODES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "DC", "FL", "GA", "HI", "ID", "IL", "IN", "IA",
    "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH", "NJ", "NM",
    "NY", "NC", "ND", "OH", "OK", "OR", "PA", "PR", "RI", "SC", "SD", "TN", "TX", "UT", "VT", "VA",
    "WA", "WV", "WI", "WY",
];

fn error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

/// Reduce a phone number to its ten national digits.
///
/// Accepts common punctuation (`(555) 123-4567`, `555.123.4567`) and an
/// optional leading country code `1` / `+1`. Returns `None` when the digits
/// do not form a ten-digit US number.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    let national = match digits.len() {
        10 => digits,
        11 if digits.starts_with('1') => digits[1..].to_string(),
        _ => return None,
    };
    // Area codes and exchanges never start with 0 or 1.
    let bytes = national.as_bytes();
    if bytes[0] < b'2' || bytes[3] < b'2' {
        return None;
    }
    Some(national)
}

/// Lower-case and trim an email address.
pub fn normalize_email(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Whether `raw` is a syntactically valid email address.
pub fn is_valid_email(raw: &str) -> bool {
    raw.trim().validate_email()
}

pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    match normalize_phone(value) {
        Some(_) => Ok(()),
        None => Err(error("phone", "Phone number must have 10 digits")),
    }
}

pub fn validate_zip(value: &str) -> Result<(), ValidationError> {
    if ZIP_RE.is_match(value.trim()) {
        Ok(())
    } else {
        Err(error("zip", "ZIP code must be 12345 or 12345-6789"))
    }
}

pub fn validate_state(value: &str) -> Result<(), ValidationError> {
    let upper = value.trim().to_ascii_uppercase();
    if US_STATE_CODES.contains(&upper.as_str()) {
        Ok(())
    } else {
        Err(error("state", "State must be a two-letter US state code"))
    }
}

/// Flatten `validator` errors into a single human-readable message.
///
/// Produces `field: message; field: message` in field-name order so the
/// output is stable across runs.
pub fn describe_errors(errors: &validator::ValidationErrors) -> String {
    let mut parts: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("invalid value ({})", e.code));
                format!("{field}: {message}")
            })
        })
        .collect();
    parts.sort();
    parts.join("; ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_accepts_common_formats() {
        assert_eq!(normalize_phone("(555) 234-5678").as_deref(), Some("5552345678"));
        assert_eq!(normalize_phone("555.234.5678").as_deref(), Some("5552345678"));
        assert_eq!(normalize_phone("+1 555 234 5678").as_deref(), Some("5552345678"));
    }

    #[test]
    fn phone_rejects_malformed_numbers() {
        assert!(normalize_phone("12345").is_none());
        assert!(normalize_phone("2345678901234").is_none());
        assert!(normalize_phone("055-234-5678").is_none());
        assert!(normalize_phone("555-134-5678").is_none());
        assert!(validate_phone("not a phone").is_err());
    }

    #[test]
    fn zip_accepts_five_and_nine_digit_forms() {
        assert!(validate_zip("94110").is_ok());
        assert!(validate_zip("94110-1234").is_ok());
    }

    #[test]
    fn zip_rejects_malformed_input() {
        assert!(validate_zip("9411").is_err());
        assert!(validate_zip("94110-12").is_err());
        assert!(validate_zip("ABCDE").is_err());
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("jane@example.com"));
        assert!(!is_valid_email("jane@"));
        assert!(!is_valid_email("not an email"));
        assert_eq!(normalize_email("  Jane@Example.COM "), "jane@example.com");
    }

    #[test]
    fn state_codes_are_case_insensitive() {
        assert!(validate_state("ca").is_ok());
        assert!(validate_state("TX").is_ok());
        assert!(validate_state("Calif").is_err());
    }
}
