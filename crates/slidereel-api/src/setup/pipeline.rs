//! Encoder resolution and orchestrator wiring.

use std::sync::Arc;

use anyhow::{Context, Result};
use slidereel_core::Config;
use slidereel_processing::{FfmpegEncoder, SlideshowOrchestrator, SlideshowOrchestratorConfig};
use slidereel_storage::Storage;

/// HTTP client used for image downloads. Each request is bounded by the
/// fetch timeout.
pub fn build_http_client(config: &Config) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(config.fetch_timeout())
        .user_agent(concat!("slidereel/", env!("CARGO_PKG_VERSION")))
        .build()
        .context("Failed to build HTTP client")
}

pub fn orchestrator_config(config: &Config) -> SlideshowOrchestratorConfig {
    SlideshowOrchestratorConfig {
        scratch_root: config.scratch_dir().clone(),
        fetch_concurrency: config.fetch_concurrency(),
        max_image_size_bytes: config.max_image_size_bytes(),
        fetch_timeout: config.fetch_timeout(),
        encode_timeout: config.encode_timeout(),
        upload_timeout: config.upload_timeout(),
    }
}

/// Resolve the encoder binary (fails startup if missing) and build the
/// orchestrator.
pub fn setup_orchestrator(
    config: &Config,
    storage: Arc<dyn Storage>,
) -> Result<SlideshowOrchestrator> {
    let encoder = FfmpegEncoder::resolve(config.ffmpeg_path())
        .with_context(|| format!("Cannot use FFMPEG_PATH '{}'", config.ffmpeg_path()))?;
    tracing::info!(ffmpeg = %encoder.binary().display(), "Encoder resolved");

    Ok(SlideshowOrchestrator::new(
        build_http_client(config)?,
        encoder,
        storage,
        orchestrator_config(config),
    ))
}
