//! HTTP error body
//!
//! `IntoResponse` for `AppError` lives in the API crate; the orphan rule
//! keeps it out of here.

use serde::Serialize;
use utoipa::ToSchema;

/// Standard error response format for HTTP APIs
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}
