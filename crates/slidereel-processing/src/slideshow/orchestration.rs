//! Slideshow orchestration: download → encode → upload → clean up.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use slidereel_core::constants::VIDEO_CONTENT_TYPE;
use slidereel_storage::{generate_video_key, Storage};
use tokio_util::sync::CancellationToken;

use super::encoder::FfmpegEncoder;
use super::fetcher::{image_file_name, ImageFetcher};
use super::scratch::{CleanupReport, ScratchSpace};
use crate::error::{PipelineError, PipelineStage};

const OUTPUT_FILE_NAME: &str = "output.mp4";

/// Limits and locations for slideshow runs.
#[derive(Debug, Clone)]
pub struct SlideshowOrchestratorConfig {
    pub scratch_root: PathBuf,
    pub fetch_concurrency: usize,
    pub max_image_size_bytes: u64,
    pub fetch_timeout: Duration,
    pub encode_timeout: Duration,
    pub upload_timeout: Duration,
}

/// A video that made it to storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedVideo {
    pub key: String,
    pub url: String,
}

/// Everything that happened during one run.
#[derive(Debug)]
pub struct PipelineReport {
    pub outcome: Result<PublishedVideo, PipelineError>,
    /// `Done` or `Failed`.
    pub final_stage: PipelineStage,
    /// Stage that produced the error, if any.
    pub failed_at: Option<PipelineStage>,
    pub cleanup: CleanupReport,
}

/// Runs the full slideshow pipeline for one request.
pub struct SlideshowOrchestrator {
    fetcher: ImageFetcher,
    encoder: FfmpegEncoder,
    storage: Arc<dyn Storage>,
    config: SlideshowOrchestratorConfig,
}

impl SlideshowOrchestrator {
    pub fn new(
        http_client: reqwest::Client,
        encoder: FfmpegEncoder,
        storage: Arc<dyn Storage>,
        config: SlideshowOrchestratorConfig,
    ) -> Self {
        let fetcher = ImageFetcher::new(
            http_client,
            config.fetch_concurrency,
            config.max_image_size_bytes,
        );
        Self {
            fetcher,
            encoder,
            storage,
            config,
        }
    }

    pub fn storage(&self) -> &Arc<dyn Storage> {
        &self.storage
    }

    /// Render and publish a slideshow, returning only the outcome.
    pub async fn create_video(
        &self,
        images: &[String],
        duration_secs: f64,
        cancel: &CancellationToken,
    ) -> Result<PublishedVideo, PipelineError> {
        self.run(images, duration_secs, cancel).await.outcome
    }

    /// Render and publish a slideshow.
    ///
    /// Scratch files are cleaned up on every path, including cancellation
    /// and timeouts.
    #[tracing::instrument(skip(self, images, cancel), fields(image_count = images.len()))]
    pub async fn run(
        &self,
        images: &[String],
        duration_secs: f64,
        cancel: &CancellationToken,
    ) -> PipelineReport {
        let mut scratch = match ScratchSpace::create_in(&self.config.scratch_root) {
            Ok(scratch) => scratch,
            Err(e) => {
                tracing::error!(
                    scratch_root = %self.config.scratch_root.display(),
                    error = %e,
                    "Failed to create scratch directory"
                );
                return PipelineReport {
                    outcome: Err(PipelineError::Scratch(e)),
                    final_stage: PipelineStage::Failed,
                    failed_at: Some(PipelineStage::Fetching),
                    cleanup: CleanupReport::default(),
                };
            }
        };

        let image_paths: Vec<PathBuf> = images
            .iter()
            .enumerate()
            .map(|(i, url)| scratch.reserve(&image_file_name(i, url)))
            .collect();
        let output_path = scratch.reserve(OUTPUT_FILE_NAME);

        let result = self
            .execute(images, &image_paths, output_path, duration_secs, cancel)
            .await;

        tracing::debug!(stage = %PipelineStage::CleaningUp, "Removing scratch files");
        let cleanup = scratch.cleanup().await;
        if !cleanup.is_clean() {
            tracing::warn!(
                failed = cleanup.failed.len(),
                directory_removed = cleanup.directory_removed,
                "Scratch cleanup incomplete"
            );
        }

        match result {
            Ok(video) => {
                tracing::info!(key = %video.key, url = %video.url, "Slideshow published");
                PipelineReport {
                    outcome: Ok(video),
                    final_stage: PipelineStage::Done,
                    failed_at: None,
                    cleanup,
                }
            }
            Err((stage, error)) => {
                tracing::error!(stage = %stage, error = %error, "Slideshow pipeline failed");
                PipelineReport {
                    outcome: Err(error),
                    final_stage: PipelineStage::Failed,
                    failed_at: Some(stage),
                    cleanup,
                }
            }
        }
    }

    async fn execute(
        &self,
        images: &[String],
        image_paths: &[PathBuf],
        output_path: PathBuf,
        duration_secs: f64,
        cancel: &CancellationToken,
    ) -> Result<PublishedVideo, (PipelineStage, PipelineError)> {
        let stage = PipelineStage::Fetching;
        tracing::info!(stage = %stage, "Downloading images");
        let downloaded = run_stage(
            stage,
            self.config.fetch_timeout,
            cancel,
            self.fetcher.fetch_all(images, image_paths),
        )
        .await
        .map_err(|e| (stage, e))?;

        let stage = PipelineStage::Encoding;
        tracing::info!(stage = %stage, "Encoding slideshow");
        run_stage(
            stage,
            self.config.encode_timeout,
            cancel,
            self.encoder.encode(&downloaded, duration_secs, &output_path),
        )
        .await
        .map_err(|e| (stage, e))?;

        let stage = PipelineStage::Uploading;
        tracing::info!(stage = %stage, "Uploading video");
        run_stage(
            stage,
            self.config.upload_timeout,
            cancel,
            self.upload(&output_path),
        )
        .await
        .map_err(|e| (stage, e))
    }

    async fn upload(&self, output_path: &Path) -> Result<PublishedVideo, PipelineError> {
        let data = tokio::fs::read(output_path)
            .await
            .map_err(PipelineError::Scratch)?;
        let key = generate_video_key();
        let url = self
            .storage
            .upload_with_key(&key, data, VIDEO_CONTENT_TYPE)
            .await?;
        Ok(PublishedVideo { key, url })
    }
}

/// Drive one stage, racing it against cancellation and a deadline.
async fn run_stage<T, E, F>(
    stage: PipelineStage,
    after: Duration,
    cancel: &CancellationToken,
    fut: F,
) -> Result<T, PipelineError>
where
    F: Future<Output = Result<T, E>>,
    E: Into<PipelineError>,
{
    let bounded = async {
        match tokio::time::timeout(after, fut).await {
            Ok(result) => result.map_err(Into::<PipelineError>::into),
            Err(_) => Err(PipelineError::Timeout { stage, after }),
        }
    };

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(PipelineError::Cancelled { stage }),
        result = bounded => result,
    }
}
