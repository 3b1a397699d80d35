// ============================
// crates/auth-lib/src/validation.rs
// ============================
//! Input validation module.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

// RFC-loose: local part without '@', domain labels without '@' or empty
// segments. The acceptance set is normative; no length cap on top of it.
static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@]+@[^@.]+(\.[^@.]+)*$").unwrap());

/// Possible validation errors
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Invalid email: {0}")]
    InvalidEmail(String),
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Validate an e-mail address
pub fn validate_email(email: &str) -> ValidationResult<&str> {
    if !EMAIL_REGEX.is_match(email) {
        return Err(ValidationError::InvalidEmail(
            "Invalid email address format".to_string(),
        ));
    }

    Ok(email)
}
