//! Input validation for API requests.
//!
//! Validators run before any side effect; a failure maps to HTTP 400 in the
//! handlers. Password validation deliberately returns one generic message so
//! the response cannot be used as an oracle for the password policy.

use crate::db::SavedItemType;

/// Generic message for any password-change input violation
const PASSWORD_REQUEST_INVALID: &str = "Invalid password change request";

/// Minimum length for a new password
const MIN_PASSWORD_LENGTH: usize = 8;

/// Validate a password-change payload.
///
/// The current password only needs to be non-empty (its real check is the
/// hash comparison); the new password must meet the minimum length. Both
/// violations report the same message.
pub fn validate_password_change(current_password: &str, new_password: &str) -> Result<(), String> {
    if current_password.is_empty() {
        return Err(PASSWORD_REQUEST_INVALID.to_string());
    }

    if new_password.len() < MIN_PASSWORD_LENGTH {
        return Err(PASSWORD_REQUEST_INVALID.to_string());
    }

    Ok(())
}

/// Parse a listing id path parameter. Must be a positive integer.
pub fn parse_listing_id(raw: &str) -> Result<i64, String> {
    match raw.parse::<i64>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err("Invalid listing id".to_string()),
    }
}

/// Parse a saved-item type field
pub fn parse_item_type(raw: &str) -> Result<SavedItemType, String> {
    match raw {
        "LISTING" => Ok(SavedItemType::Listing),
        "ARTICLE" => Ok(SavedItemType::Article),
        _ => Err("Item type must be LISTING or ARTICLE".to_string()),
    }
}

/// Validate an optional referrer string (optional field)
pub fn validate_referrer(referrer: &Option<String>) -> Result<(), String> {
    if let Some(r) = referrer {
        if r.len() > 2048 {
            return Err("Referrer is too long (max 2048 characters)".to_string());
        }
    }

    Ok(())
}
