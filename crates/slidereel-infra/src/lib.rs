//! Slidereel Infrastructure Library
//!
//! Shared infrastructure for the Slidereel service:
//! - Middleware (request ID)
//! - Telemetry initialization
//! - HTTP error body

#[cfg(feature = "middleware")]
pub mod middleware;

#[cfg(feature = "observability-basic")]
pub mod telemetry;

pub mod error;

#[cfg(feature = "middleware")]
pub use middleware::{request_id_middleware, RequestId, REQUEST_ID_HEADER};

#[cfg(feature = "observability-basic")]
pub use telemetry::{init_telemetry, shutdown_telemetry, LogFormat};

pub use error::ErrorResponse;
