//! Error types module
//!
//! Every error that reaches the HTTP boundary is unified under `AppError`.
//! Each variant self-describes how it is presented (status, code, client
//! message, log level) through `ErrorMetadata`.

use crate::constants::VIDEO_CREATION_FAILED_MESSAGE;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like resource limits
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "VIDEO_CREATION_FAILED")
    fn error_code(&self) -> &'static str;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Whether details should be hidden from clients
    fn is_sensitive(&self) -> bool;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The slideshow pipeline failed; the message carries the full cause.
    #[error("Video creation failed: {0}")]
    VideoCreation(String),

    #[error("Service busy: {0}")]
    ServiceBusy(String),

    #[error("Internal error: {message}")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::InternalWithSource {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(format!("Validation error: {}", err))
    }
}

/// Static metadata for each variant: (http_status, error_code, sensitive, log_level).
fn app_error_static_metadata(err: &AppError) -> (u16, &'static str, bool, LogLevel) {
    match err {
        AppError::InvalidInput(_) => (400, "INVALID_INPUT", false, LogLevel::Debug),
        AppError::VideoCreation(_) => (500, "VIDEO_CREATION_FAILED", true, LogLevel::Error),
        AppError::ServiceBusy(_) => (503, "SERVICE_BUSY", false, LogLevel::Warn),
        AppError::InternalWithSource { .. } => (500, "INTERNAL_ERROR", true, LogLevel::Error),
    }
}

impl AppError {
    /// Get the error type name for detailed error responses
    pub fn error_type(&self) -> &str {
        match self {
            AppError::InvalidInput(_) => "InvalidInput",
            AppError::VideoCreation(_) => "VideoCreation",
            AppError::ServiceBusy(_) => "ServiceBusy",
            AppError::InternalWithSource { .. } => "Internal",
        }
    }

    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        app_error_static_metadata(self).0
    }

    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).1
    }

    fn is_sensitive(&self) -> bool {
        app_error_static_metadata(self).2
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).3
    }

    fn client_message(&self) -> String {
        match self {
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::VideoCreation(_) => VIDEO_CREATION_FAILED_MESSAGE.to_string(),
            AppError::ServiceBusy(_) => "Server is busy, try again later".to_string(),
            AppError::InternalWithSource { .. } => "Internal server error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_video_creation_hides_cause_from_client() {
        let err = AppError::VideoCreation("ffmpeg exited with code 1".to_string());
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.client_message(), "Failed to create video");
        assert!(err.is_sensitive());
        assert!(err.to_string().contains("ffmpeg exited"));
    }

    #[test]
    fn test_invalid_input_is_shown_to_client() {
        let err = AppError::InvalidInput("duration must be greater than 1".to_string());
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.client_message(), "duration must be greater than 1");
        assert!(!err.is_sensitive());
        assert_eq!(err.log_level(), LogLevel::Debug);
    }

    #[test]
    fn test_service_busy_maps_to_503() {
        let err = AppError::ServiceBusy("admission timed out".to_string());
        assert_eq!(err.http_status_code(), 503);
        assert_eq!(err.error_code(), "SERVICE_BUSY");
        assert_eq!(err.log_level(), LogLevel::Warn);
    }

    #[test]
    fn test_detailed_message_includes_source_chain() {
        let source = anyhow::anyhow!("disk full").context("writing scratch file");
        let err = AppError::from(source);
        assert_eq!(err.http_status_code(), 500);
        assert_eq!(err.client_message(), "Internal server error");
        let details = err.detailed_message();
        assert!(details.contains("Caused by: disk full"));
    }
}
