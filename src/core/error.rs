//! Error handling for release distribution
//!
//! This module provides the error types for the upload/commit/distribute
//! pipeline using the thiserror crate for ergonomic error handling.

use thiserror::Error;

/// Main error type for release distribution operations
#[derive(Error, Debug)]
pub enum DistributeError {
    /// The distribution API rejected the token (HTTP 401)
    #[error("authentication failed, the provided API token was rejected")]
    Auth,

    /// A named remote resource does not exist (HTTP 404)
    #[error("not found: {resource}")]
    NotFound { resource: String },

    /// Any other unexpected HTTP status from an API call
    #[error("unexpected response during {step}: HTTP {status}: {body}")]
    Remote {
        step: String,
        status: u16,
        body: String,
    },

    /// The binary transfer returned a non-2xx status and the release
    /// session was aborted
    #[error("binary upload failed with HTTP {status}: {body}")]
    TransferFailed { status: u16, body: String },

    /// Pipeline input failed validation before any network call
    #[error("invalid input: {message}")]
    InvalidInput { message: String },

    /// Transport-level failure (connection, TLS, request construction)
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Local file access failure for the binary or symbol artifact
    #[error("artifact file error: {0}")]
    Io(#[from] std::io::Error),
}

impl DistributeError {
    /// Get error code for this error
    pub fn code(&self) -> &'static str {
        match self {
            Self::Auth => "AUTH_ERROR",
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Remote { .. } => "REMOTE_ERROR",
            Self::TransferFailed { .. } => "TRANSFER_FAILED",
            Self::InvalidInput { .. } => "INVALID_INPUT",
            Self::Network(_) => "NETWORK_ERROR",
            Self::Io(_) => "IO_ERROR",
        }
    }

    /// Get suggested actions for this error
    pub fn suggested_actions(&self) -> Vec<&'static str> {
        match self {
            Self::Auth => vec![
                "Check that the API token is valid and has not expired",
                "Generate a new token in the account settings of the distribution service",
            ],
            Self::NotFound { .. } => vec![
                "Check the owner name, app name and distribution group spelling",
                "Confirm the app exists under the given owner",
            ],
            Self::Remote { .. } => vec![
                "Check the response body for details",
                "Check the distribution service status page",
            ],
            Self::TransferFailed { .. } => vec![
                "Check the artifact is a valid .apk or .ipa package",
                "Re-run the pipeline, a fresh upload session is created on every run",
            ],
            Self::InvalidInput { .. } => {
                vec!["Fix the reported parameter and run again"]
            }
            Self::Network(_) => vec![
                "Check your internet connection",
                "Re-run the pipeline once connectivity is restored",
            ],
            Self::Io(_) => {
                vec!["Check the artifact path exists and is readable"]
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_error() {
        let error = DistributeError::Auth;

        assert_eq!(error.code(), "AUTH_ERROR");
        assert!(error.to_string().contains("API token"));
    }

    #[test]
    fn test_not_found_error() {
        let error = DistributeError::NotFound {
            resource: "distribution group 'Testers'".to_string(),
        };

        assert_eq!(error.code(), "NOT_FOUND");
        assert!(error.to_string().contains("Testers"));
    }

    #[test]
    fn test_remote_error_with_body() {
        let error = DistributeError::Remote {
            step: "commit release".to_string(),
            status: 500,
            body: "internal error".to_string(),
        };

        assert_eq!(error.code(), "REMOTE_ERROR");
        let message = error.to_string();
        assert!(message.contains("commit release"));
        assert!(message.contains("500"));
        assert!(message.contains("internal error"));
    }

    #[test]
    fn test_transfer_failed_error() {
        let error = DistributeError::TransferFailed {
            status: 400,
            body: "bad package".to_string(),
        };

        assert_eq!(error.code(), "TRANSFER_FAILED");
        assert!(error.to_string().contains("400"));
        let actions = error.suggested_actions();
        assert!(actions.iter().any(|a| a.contains("fresh upload session")));
    }

    #[test]
    fn test_invalid_input_error() {
        let error = DistributeError::InvalidInput {
            message: "no API token given".to_string(),
        };

        assert_eq!(error.code(), "INVALID_INPUT");
        assert!(error.to_string().contains("no API token given"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let error = DistributeError::from(io);

        assert_eq!(error.code(), "IO_ERROR");
        assert!(!error.suggested_actions().is_empty());
    }
}
