//! Health check handler and response type.

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::constants::{HEALTH_CHECK_PROBE_KEY, HEALTH_CHECK_TIMEOUT_SECS};
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthCheckResponse {
    pub status: String,
    pub storage: String,
    pub storage_backend: String,
    pub available_job_slots: usize,
}

/// Storage is probed with a bounded `exists` call on a key that is never
/// written. Storage problems degrade the report but keep a 200.
#[utoipa::path(
    get,
    path = "/health",
    tag = "service",
    responses((status = 200, description = "Service health", body = HealthCheckResponse))
)]
pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let timeout = Duration::from_secs(HEALTH_CHECK_TIMEOUT_SECS);

    let storage = match tokio::time::timeout(timeout, state.storage.exists(HEALTH_CHECK_PROBE_KEY))
        .await
    {
        Ok(Ok(_)) => "healthy".to_string(),
        Ok(Err(e)) => {
            tracing::warn!(error = %e, "Storage health check warning");
            format!("degraded: {}", e)
        }
        Err(_) => {
            tracing::warn!("Storage health check timed out");
            "timeout".to_string()
        }
    };

    let response = HealthCheckResponse {
        status: "healthy".to_string(),
        storage,
        storage_backend: state.storage.backend_type().to_string(),
        available_job_slots: state.admission.available(),
    };

    (StatusCode::OK, Json(response))
}
