//! Application setup and initialization

pub mod pipeline;
pub mod routes;
pub mod server;
pub mod storage;

use std::sync::Arc;

use anyhow::{Context, Result};
use slidereel_core::Config;
use slidereel_infra::LogFormat;
use tokio_util::sync::CancellationToken;

use crate::admission::AdmissionGate;
use crate::state::AppState;

/// Initialize the entire application
pub async fn initialize_app(config: Config) -> Result<(Arc<AppState>, axum::Router)> {
    config.validate().context("Configuration validation failed")?;

    let log_format: LogFormat = config
        .log_format()
        .parse()
        .map_err(|e| anyhow::anyhow!("Invalid LOG_FORMAT: {}", e))?;
    slidereel_infra::init_telemetry(log_format)
        .map_err(|e| anyhow::anyhow!("Failed to initialize telemetry: {}", e))?;

    tracing::info!(
        environment = %config.environment(),
        "Configuration loaded and validated successfully"
    );

    let storage = storage::setup_storage(&config).await?;
    let orchestrator = pipeline::setup_orchestrator(&config, storage.clone())?;

    let state = Arc::new(AppState {
        admission: AdmissionGate::new(config.max_concurrent_jobs(), config.admission_timeout()),
        shutdown: CancellationToken::new(),
        orchestrator: Arc::new(orchestrator),
        storage,
        config,
    });

    let router = routes::setup_routes(state.clone())?;

    Ok((state, router))
}
