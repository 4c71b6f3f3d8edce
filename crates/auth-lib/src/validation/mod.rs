// ============================
// crates/auth-lib/src/validation/mod.rs
// ============================
//! Input validation and normalization.

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321 SMTP limit

static EMAIL_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}$").unwrap());

/// Possible validation errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Invalid email: {0}")]
    InvalidEmail(String),
}

/// Result type for validation operations
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Normalize an email address for storage and lookup.
///
/// Surrounding whitespace is dropped and ASCII letters are lowercased, so
/// `" Bob@Example.COM "` and `"bob@example.com"` name the same user.
pub fn normalize_email(email: &str) -> ValidationResult<String> {
    let normalized = email.trim().to_ascii_lowercase();

    if normalized.is_empty() {
        return Err(ValidationError::InvalidEmail(
            "Email must not be empty".to_string(),
        ));
    }

    if normalized.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::InvalidEmail(format!(
            "Email cannot exceed {MAX_EMAIL_LENGTH} characters"
        )));
    }

    if !EMAIL_REGEX.is_match(&normalized) {
        return Err(ValidationError::InvalidEmail(
            "Invalid email format".to_string(),
        ));
    }

    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_email() {
        assert_eq!(
            normalize_email("bob@example.com").unwrap(),
            "bob@example.com"
        );
        assert_eq!(
            normalize_email("  Bob.Smith+tag@Example.COM ").unwrap(),
            "bob.smith+tag@example.com"
        );
    }

    #[test]
    fn test_invalid_emails() {
        assert!(normalize_email("").is_err());
        assert!(normalize_email("   ").is_err());
        assert!(normalize_email("not-an-email").is_err());
        assert!(normalize_email("missing@tld").is_err());
        assert!(normalize_email("two@@example.com").is_err());

        let long_email = format!("{}@example.com", "a".repeat(250));
        assert!(normalize_email(&long_email).is_err());
    }
}
