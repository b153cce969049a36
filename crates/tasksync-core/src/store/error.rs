//! Store error handling
//!
//! Typed errors for realtime store operations, with recovery suggestions the
//! display layer can show next to the message.

use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur while talking to the realtime store
#[derive(Error, Debug)]
pub enum StoreError {
    /// Transport failure (DNS, TLS, connection reset, ...)
    #[error("Request to database failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The database answered with a non-success status
    #[error("Database returned {status}: {message}")]
    Status { status: StatusCode, message: String },

    /// The event stream delivered something unreadable or ended abruptly
    #[error("Event stream error: {0}")]
    Stream(String),

    /// The database cancelled the listener (usually a rules violation)
    #[error("Listener cancelled by database: {0}")]
    Cancelled(String),

    /// Credentials expired while listening
    #[error("Authentication revoked. Sign in again to keep receiving updates.")]
    AuthRevoked,

    /// Payload could not be encoded or decoded
    #[error("Invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),

    /// Database URL could not be used to build a request
    #[error("Invalid database URL '{0}'")]
    InvalidUrl(String),

    /// The store refused the operation
    #[error("Store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    /// Build a status error from an HTTP response body
    ///
    /// The database reports failures as `{"error": "..."}`; other bodies are
    /// used verbatim.
    pub fn from_response(status: StatusCode, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
            .unwrap_or_else(|| body.trim().to_string());

        StoreError::Status { status, message }
    }

    /// Check if retrying later could succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            StoreError::Http(_) | StoreError::Stream(_) | StoreError::Unavailable(_) => true,
            StoreError::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            _ => false,
        }
    }

    /// Get a recovery suggestion for this error
    pub fn recovery_suggestion(&self) -> Option<&'static str> {
        match self {
            StoreError::Http(_) => Some("Check your network connection and the database URL."),
            StoreError::Status { status, .. }
                if *status == StatusCode::UNAUTHORIZED || *status == StatusCode::FORBIDDEN =>
            {
                Some("Check the auth token and the database security rules.")
            }
            StoreError::Cancelled(_) | StoreError::AuthRevoked => {
                Some("Update the auth token with `tasksync config set auth_token <token>`.")
            }
            StoreError::InvalidUrl(_) => Some(
                "Set a URL like https://<project>.firebaseio.com with `tasksync config set database_url <url>`.",
            ),
            _ => None,
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_response_extracts_error_field() {
        let err = StoreError::from_response(
            StatusCode::UNAUTHORIZED,
            r#"{"error" : "Permission denied"}"#,
        );
        match &err {
            StoreError::Status { status, message } => {
                assert_eq!(*status, StatusCode::UNAUTHORIZED);
                assert_eq!(message, "Permission denied");
            }
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(err.to_string().contains("Permission denied"));
        assert!(err.recovery_suggestion().is_some());
    }

    #[test]
    fn test_from_response_plain_body() {
        let err = StoreError::from_response(StatusCode::BAD_GATEWAY, "upstream down\n");
        assert!(err.to_string().contains("upstream down"));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_recoverable_classification() {
        assert!(StoreError::Unavailable("offline".into()).is_recoverable());
        assert!(!StoreError::AuthRevoked.is_recoverable());
        assert!(!StoreError::Cancelled("rules".into()).is_recoverable());
        assert!(!StoreError::from_response(StatusCode::BAD_REQUEST, "{}").is_recoverable());
    }
}
