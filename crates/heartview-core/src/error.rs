//! Error types for the Heartview client.
//!
//! This module defines the error types surfaced by the client library and
//! provides meaningful messages for the view layer.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Heartview client operations.
#[derive(Debug, Error)]
pub enum HeartviewError {
    // Transport errors
    #[error("Network error: {message}")]
    Network {
        message: String,
        /// Underlying cause, when known.
        cause: Option<String>,
    },

    #[error("Request timed out after {0:?}")]
    Timeout(std::time::Duration),

    // Filesystem errors
    #[error("I/O error at {path:?}: {message}")]
    Io {
        message: String,
        path: Option<PathBuf>,
        #[source]
        source: Option<std::io::Error>,
    },

    // Wire format errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: Option<serde_json::Error>,
    },

    // Identity provider errors
    #[error("Authentication failed: {message}")]
    Auth {
        /// Provider error code, e.g. "INVALID_PASSWORD" or "EMAIL_EXISTS".
        code: Option<String>,
        message: String,
    },

    #[error("Session expired, sign in again")]
    SessionExpired,

    #[error("No saved session, sign in first")]
    NotSignedIn,

    // Backend errors
    #[error("Record not found: {id}")]
    RecordNotFound { id: String },

    #[error("Backend returned {status}: {message}")]
    Backend { status: u16, message: String },

    // Configuration
    #[error("Configuration error: {message}")]
    Config { message: String },

    // Form validation
    #[error("Invalid value for {field}: {message}")]
    Validation { field: String, message: String },

    // Catch-all
    #[error("{0}")]
    Other(String),
}

/// Result type alias for Heartview operations.
pub type Result<T> = std::result::Result<T, HeartviewError>;

// Conversions from std and stack error types

impl From<std::io::Error> for HeartviewError {
    fn from(err: std::io::Error) -> Self {
        HeartviewError::Io {
            message: err.to_string(),
            path: None,
            source: Some(err),
        }
    }
}

impl From<serde_json::Error> for HeartviewError {
    fn from(err: serde_json::Error) -> Self {
        HeartviewError::Json {
            message: err.to_string(),
            source: Some(err),
        }
    }
}

impl From<reqwest::Error> for HeartviewError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            // Every client is built with the same request timeout.
            HeartviewError::Timeout(crate::config::NetworkConfig::REQUEST_TIMEOUT)
        } else {
            HeartviewError::Network {
                message: err.to_string(),
                cause: std::error::Error::source(&err).map(|c| c.to_string()),
            }
        }
    }
}

impl HeartviewError {
    /// Attach the offending path to an I/O error.
    pub fn io_with_path(err: std::io::Error, path: impl Into<PathBuf>) -> Self {
        HeartviewError::Io {
            message: err.to_string(),
            path: Some(path.into()),
            source: Some(err),
        }
    }

    /// Create a validation error for a named form field.
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        HeartviewError::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// True for transient transport failures worth retrying.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            HeartviewError::Network { .. } | HeartviewError::Timeout(_)
        )
    }

    /// Check if this error means the user must sign in (again).
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            HeartviewError::Auth { .. }
                | HeartviewError::SessionExpired
                | HeartviewError::NotSignedIn
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_record_id() {
        let err = HeartviewError::RecordNotFound {
            id: "64fa3b".into(),
        };
        assert_eq!(err.to_string(), "Record not found: 64fa3b");
    }

    #[test]
    fn test_validation_display_names_the_field() {
        let err = HeartviewError::validation("feature2", "Gender must be M or F");
        assert_eq!(
            err.to_string(),
            "Invalid value for feature2: Gender must be M or F"
        );
    }

    #[test]
    fn test_retryable_covers_network_and_timeout() {
        assert!(HeartviewError::Timeout(std::time::Duration::from_secs(5)).is_retryable());
        assert!(!HeartviewError::RecordNotFound { id: "x".into() }.is_retryable());
    }

    #[test]
    fn test_auth_failures() {
        assert!(HeartviewError::SessionExpired.is_auth_failure());
        assert!(HeartviewError::Auth {
            code: Some("INVALID_PASSWORD".into()),
            message: "Invalid credentials".into()
        }
        .is_auth_failure());
        assert!(!HeartviewError::Other("boom".into()).is_auth_failure());
    }
}
