//! API constants

/// Body of `GET /`.
pub const LIVENESS_MESSAGE: &str = "Slidereel video service is running";

/// Path of the served OpenAPI document.
pub const OPENAPI_PATH: &str = "/api/openapi.json";

/// Upper bound on the storage probe in `GET /health`, in seconds.
pub const HEALTH_CHECK_TIMEOUT_SECS: u64 = 5;

/// Key probed by the storage health check; never written.
pub const HEALTH_CHECK_PROBE_KEY: &str = "health-check-non-existent-key";
