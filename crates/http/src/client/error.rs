//! Client error types

use crate::token::TokenStoreError;
use reqwest::StatusCode;
use thiserror::Error;

/// Client error types
#[derive(Debug, Error)]
pub enum ClientError {
    /// No response was received (connect, timeout, or body read failure)
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The request could not be built (body serialization, invalid URL); nothing was sent
    #[error("Invalid request: {0}")]
    InvalidRequest(#[source] reqwest::Error),

    /// Server returned an error status not covered by a dedicated variant
    #[error("Server error {status}: {message}")]
    ServerError { status: u16, message: String },

    /// Authentication failed (401)
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Forbidden (403)
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Resource not found
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Bad request
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// A successful response carried a body that could not be decoded
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// The token store could not be updated
    #[error("Token store error: {0}")]
    TokenStore(#[from] TokenStoreError),
}

impl ClientError {
    /// Create error from HTTP status code
    pub fn from_status(status: StatusCode, message: String) -> Self {
        match status.as_u16() {
            400 => Self::BadRequest(message),
            401 => Self::AuthenticationFailed(message),
            403 => Self::Forbidden(message),
            404 => Self::NotFound(message),
            _ => Self::ServerError {
                status: status.as_u16(),
                message,
            },
        }
    }

    /// Build an error from a failed response body.
    ///
    /// Backends report failures as `{ "message": "..." }`; anything else is
    /// kept as raw text, and an empty body falls back to the status reason.
    pub fn from_body(status: StatusCode, body: &str) -> Self {
        Self::from_status(status, extract_message(status, body))
    }

    /// HTTP status of the failure, if a response was received
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::BadRequest(_) => Some(400),
            Self::AuthenticationFailed(_) => Some(401),
            Self::Forbidden(_) => Some(403),
            Self::NotFound(_) => Some(404),
            Self::ServerError { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Server-provided message for HTTP failures
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::BadRequest(m)
            | Self::AuthenticationFailed(m)
            | Self::Forbidden(m)
            | Self::NotFound(m)
            | Self::ServerError { message: m, .. } => Some(m),
            _ => None,
        }
    }

    /// Whether the server rejected the caller's credentials (401 or 403)
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Self::AuthenticationFailed(_) | Self::Forbidden(_))
    }
}

fn extract_message(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() {
        return status
            .canonical_reason()
            .map_or_else(|| status.to_string(), str::to_string);
    }

    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            value
                .get("message")
                .and_then(serde_json::Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_message_is_preferred() {
        let err = ClientError::from_body(
            StatusCode::UNPROCESSABLE_ENTITY,
            r#"{"message":"Estoque insuficiente","status":422}"#,
        );
        assert_eq!(err.status(), Some(422));
        assert_eq!(err.message(), Some("Estoque insuficiente"));
    }

    #[test]
    fn raw_body_is_kept_when_not_json() {
        let err = ClientError::from_body(StatusCode::UNAUTHORIZED, "Unauthorized");
        assert!(matches!(err, ClientError::AuthenticationFailed(ref m) if m == "Unauthorized"));
        assert!(err.is_auth_failure());
    }

    #[test]
    fn empty_body_falls_back_to_reason() {
        let err = ClientError::from_body(StatusCode::FORBIDDEN, "  ");
        assert_eq!(err.message(), Some("Forbidden"));
        assert!(err.is_auth_failure());
    }

    #[test]
    fn other_statuses_are_not_auth_failures() {
        let err = ClientError::from_body(StatusCode::INTERNAL_SERVER_ERROR, "boom");
        assert!(!err.is_auth_failure());
        assert!(matches!(err, ClientError::ServerError { status: 500, .. }));
        assert!(!ClientError::from_body(StatusCode::NOT_FOUND, "").is_auth_failure());
    }
}
