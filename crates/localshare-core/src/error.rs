//! Error types module
//!
//! All failures surfaced to the UI are unified under the `AppError` enum.
//! Library crates keep their own error types at their seams (the preview
//! store and the transport) and convert into `AppError` at the boundary, so
//! nothing propagates to the caller as an unhandled fault.

use std::io;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Empty or malformed input, e.g. a folder selection with no usable
    /// paths. Never reaches the network.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Network failure or non-success HTTP status. Staged files are retained
    /// so the user can retry.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Preview store failure (spool directory, handle lifecycle).
    #[error("Preview error: {0}")]
    Preview(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether retrying the same operation can succeed without the user
    /// changing their selection.
    pub fn is_retryable(&self) -> bool {
        matches!(self, AppError::Transport(_))
    }

    /// Get the error type name for structured reporting
    pub fn error_type(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::Transport(_) => "Transport",
            AppError::Preview(_) => "Preview",
            AppError::Internal(_) => "Internal",
        }
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InvalidInput(format!("JSON parsing error: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_is_retryable() {
        let err = AppError::Transport("connection reset".to_string());
        assert!(err.is_retryable());
        assert_eq!(err.error_type(), "Transport");
    }

    #[test]
    fn test_invalid_input_is_not_retryable() {
        let err = AppError::InvalidInput("folder selection is empty".to_string());
        assert!(!err.is_retryable());
        assert_eq!(err.error_type(), "InvalidInput");
        assert_eq!(err.to_string(), "Invalid input: folder selection is empty");
    }

    #[test]
    fn test_io_error_conversion() {
        let err: AppError = io::Error::new(io::ErrorKind::NotFound, "missing").into();
        assert_eq!(err.error_type(), "Internal");
        assert!(err.to_string().contains("missing"));
    }
}
