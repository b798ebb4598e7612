//! Error types for the API gateway.

use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when talking to the backend.
///
/// Non-success responses keep their status and raw body untouched; callers
/// decide how to present them.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// Transport failure: connect, timeout, or body read.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {body}")]
    Status {
        /// Response status.
        status: StatusCode,
        /// Raw response body.
        body: String,
    },

    /// A success response whose body did not match the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured base address cannot have paths appended to it.
    #[error("invalid backend base URL: {0}")]
    InvalidBaseUrl(String),
}

/// Error body produced by the backend framework.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: Detail,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Detail {
    Message(String),
    Fields(Vec<FieldError>),
}

#[derive(Debug, Deserialize)]
struct FieldError {
    msg: String,
}

impl GatewayError {
    /// HTTP status of the failed response, if the backend answered at all.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// `true` for 401 responses.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// `true` for 404 responses.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// The backend's `detail` message, when the body carries one.
    ///
    /// Validation failures list one message per field; they are joined with `; `.
    #[must_use]
    pub fn detail(&self) -> Option<String> {
        let Self::Status { body, .. } = self else {
            return None;
        };
        match serde_json::from_str::<ErrorBody>(body).ok()?.detail {
            Detail::Message(message) => Some(message),
            Detail::Fields(fields) if !fields.is_empty() => Some(
                fields
                    .into_iter()
                    .map(|f| f.msg)
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            Detail::Fields(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn status(code: StatusCode, body: &str) -> GatewayError {
        GatewayError::Status {
            status: code,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_display_keeps_raw_body() {
        let err = status(StatusCode::BAD_REQUEST, r#"{"detail":"Email already registered"}"#);
        assert_eq!(
            err.to_string(),
            r#"backend returned 400 Bad Request: {"detail":"Email already registered"}"#
        );
    }

    #[test]
    fn test_detail_message() {
        let err = status(StatusCode::BAD_REQUEST, r#"{"detail":"Email already registered"}"#);
        assert_eq!(err.detail().as_deref(), Some("Email already registered"));
    }

    #[test]
    fn test_detail_field_errors() {
        let err = status(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"detail":[{"loc":["body","rating"],"msg":"too big","type":"x"},{"msg":"missing"}]}"#,
        );
        assert_eq!(err.detail().as_deref(), Some("too big; missing"));
    }

    #[test]
    fn test_detail_absent_for_plain_body() {
        let err = status(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
        assert_eq!(err.detail(), None);
        assert_eq!(err.status(), Some(StatusCode::INTERNAL_SERVER_ERROR));
    }

    #[test]
    fn test_status_predicates() {
        assert!(status(StatusCode::UNAUTHORIZED, "").is_unauthorized());
        assert!(status(StatusCode::NOT_FOUND, "").is_not_found());
        assert!(!GatewayError::InvalidBaseUrl("x".to_string()).is_unauthorized());
    }
}
