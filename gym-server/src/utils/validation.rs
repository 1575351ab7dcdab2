//! Input validation helpers
//!
//! Centralized text length constants and validation functions.
//! Limits are chosen based on:
//! - Reasonable UX limits for names, notes, phone numbers
//! - SurrealDB schemaless fields have no built-in length enforcement

use crate::utils::AppError;

// ── Text length limits ──────────────────────────────────────────────

/// Entity names: member, trainer, plan, etc.
pub const MAX_NAME_LEN: usize = 200;

/// Notes, descriptions, remarks
pub const MAX_NOTE_LEN: usize = 500;

/// Short identifiers: phone, payment mode, receipt number, etc.
pub const MAX_SHORT_TEXT_LEN: usize = 100;

/// Email addresses (RFC 5321)
pub const MAX_EMAIL_LEN: usize = 254;

/// URLs / photo paths
pub const MAX_URL_LEN: usize = 2048;

/// Addresses
pub const MAX_ADDRESS_LEN: usize = 500;

// ── Validation helpers (CRUD handlers) ──────────────────────────────

/// Validate that a required string is non-empty and within the length limit.
pub fn validate_required_text(value: &str, field: &str, max_len: usize) -> Result<(), AppError> {
    if value.trim().is_empty() {
        return Err(AppError::validation(format!("{field} must not be empty")));
    }
    if value.len() > max_len {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            value.len()
        )));
    }
    Ok(())
}

/// Validate that an optional string, if present, is within the length limit.
pub fn validate_optional_text(
    value: &Option<String>,
    field: &str,
    max_len: usize,
) -> Result<(), AppError> {
    if let Some(v) = value
        && v.len() > max_len
    {
        return Err(AppError::validation(format!(
            "{field} is too long ({} chars, max {max_len})",
            v.len()
        )));
    }
    Ok(())
}

/// Validate that a monetary amount is a finite, non-negative number.
pub fn validate_amount(value: f64, field: &str) -> Result<(), AppError> {
    if !value.is_finite() || value < 0.0 {
        return Err(AppError::validation(format!(
            "{field} must be a non-negative amount"
        )));
    }
    Ok(())
}

/// Validate a phone number: digits with optional leading `+`, 7 to 15 digits.
pub fn validate_phone(value: &str, field: &str) -> Result<(), AppError> {
    let digits = value.strip_prefix('+').unwrap_or(value);
    if digits.is_empty()
        || !digits.chars().all(|c| c.is_ascii_digit())
        || !(7..=15).contains(&digits.len())
    {
        return Err(AppError::validation(format!(
            "{field} must be a phone number (7-15 digits)"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn required_text_rejects_blank_and_overlong() {
        assert!(validate_required_text("Anil", "name", MAX_NAME_LEN).is_ok());
        assert!(validate_required_text("   ", "name", MAX_NAME_LEN).is_err());
        assert!(validate_required_text(&"x".repeat(201), "name", MAX_NAME_LEN).is_err());
    }

    #[test]
    fn phone_accepts_plus_prefix() {
        assert!(validate_phone("+919812345678", "phone").is_ok());
        assert!(validate_phone("9812345678", "phone").is_ok());
        assert!(validate_phone("98-123", "phone").is_err());
        assert!(validate_phone("12345", "phone").is_err());
    }

    #[test]
    fn amount_rejects_negative_and_nan() {
        assert!(validate_amount(0.0, "amount").is_ok());
        assert!(validate_amount(1500.5, "amount").is_ok());
        assert!(validate_amount(-1.0, "amount").is_err());
        assert!(validate_amount(f64::NAN, "amount").is_err());
    }
}
