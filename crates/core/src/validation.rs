//! Local form validation.
//!
//! Every submission form is checked here before a single byte goes over the
//! network. The messages are what the pages show inline.

use crate::types::{EmailError, RatingError};

/// Minimum password length the backend enforces on registration.
pub const MIN_PASSWORD_LEN: usize = 8;

/// Earliest publication year accepted by the upload and edit forms.
pub const MIN_PUBLICATION_YEAR: i32 = 1000;

/// Latest publication year accepted by the upload and edit forms.
pub const MAX_PUBLICATION_YEAR: i32 = 2100;

/// A local validation failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("password must be at least {min} characters")]
    PasswordTooShort { min: usize },

    #[error("invalid email address: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error(transparent)]
    Rating(#[from] RatingError),

    #[error("publication year must be a number between {MIN_PUBLICATION_YEAR} and {MAX_PUBLICATION_YEAR}")]
    InvalidYear,
}

/// Trim `value` and reject it when nothing is left.
///
/// # Errors
///
/// Returns [`ValidationError::MissingField`] naming `field`.
pub fn require<'a>(field: &'static str, value: &'a str) -> Result<&'a str, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(trimmed)
    }
}

/// Trim `value`, mapping blank input to `None`.
#[must_use]
pub fn optional(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

/// Check a password against [`MIN_PASSWORD_LEN`]. Passwords are not trimmed.
///
/// # Errors
///
/// Returns `MissingField` for an empty password, `PasswordTooShort` otherwise.
pub fn require_password(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Err(ValidationError::MissingField("password"));
    }
    if value.chars().count() < MIN_PASSWORD_LEN {
        return Err(ValidationError::PasswordTooShort {
            min: MIN_PASSWORD_LEN,
        });
    }
    Ok(())
}

/// Parse an optional publication year. Blank input is `Ok(None)`.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidYear`] for non-numeric or out-of-range input.
pub fn publication_year(value: &str) -> Result<Option<i32>, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let year: i32 = trimmed.parse().map_err(|_| ValidationError::InvalidYear)?;
    if (MIN_PUBLICATION_YEAR..=MAX_PUBLICATION_YEAR).contains(&year) {
        Ok(Some(year))
    } else {
        Err(ValidationError::InvalidYear)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_require_trims() {
        assert_eq!(require("title", "  Dune ").unwrap(), "Dune");
        assert_eq!(
            require("title", "   "),
            Err(ValidationError::MissingField("title"))
        );
    }

    #[test]
    fn test_optional() {
        assert_eq!(optional(" x "), Some("x".to_owned()));
        assert_eq!(optional(""), None);
    }

    #[test]
    fn test_password_rules() {
        assert_eq!(
            require_password(""),
            Err(ValidationError::MissingField("password"))
        );
        assert_eq!(
            require_password("short"),
            Err(ValidationError::PasswordTooShort { min: 8 })
        );
        assert!(require_password("long enough").is_ok());
    }

    #[test]
    fn test_publication_year() {
        assert_eq!(publication_year("").unwrap(), None);
        assert_eq!(publication_year("1954").unwrap(), Some(1954));
        assert_eq!(publication_year("soon"), Err(ValidationError::InvalidYear));
        assert_eq!(publication_year("99999"), Err(ValidationError::InvalidYear));
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ValidationError::MissingField("comment").to_string(),
            "comment is required"
        );
        assert_eq!(
            ValidationError::PasswordTooShort { min: 8 }.to_string(),
            "password must be at least 8 characters"
        );
    }
}
