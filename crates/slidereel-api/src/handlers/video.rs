use std::sync::Arc;

use axum::{extract::State, response::IntoResponse, Json};
use slidereel_core::{AppError, VideoRequest, VideoResponse};
use slidereel_infra::ErrorResponse;

use crate::constants::LIVENESS_MESSAGE;
use crate::error::{HttpAppError, ValidatedJson};
use crate::state::AppState;

/// Liveness string.
#[utoipa::path(
    get,
    path = "/",
    tag = "service",
    responses((status = 200, description = "Service is running", body = String, content_type = "text/plain"))
)]
pub async fn root() -> &'static str {
    LIVENESS_MESSAGE
}

#[utoipa::path(
    post,
    path = "/create-video",
    tag = "videos",
    request_body = VideoRequest,
    responses(
        (status = 200, description = "Video created and published", body = VideoResponse),
        (status = 400, description = "Malformed or invalid request body", body = ErrorResponse),
        (status = 500, description = "Video creation failed", body = ErrorResponse),
        (status = 503, description = "No job slot available", body = ErrorResponse)
    )
)]
#[tracing::instrument(
    skip(state, request),
    fields(
        image_count = request.images.len(),
        duration = request.duration,
        operation = "create_video"
    )
)]
pub async fn create_video(
    State(state): State<Arc<AppState>>,
    ValidatedJson(request): ValidatedJson<VideoRequest>,
) -> Result<impl IntoResponse, HttpAppError> {
    let permit = state.admission.admit().await?;

    // The run owns its permit and finishes cleanup even if the client goes
    // away; a dropped handler only cancels it.
    let job = state.shutdown.child_token();
    let _cancel_on_drop = job.clone().drop_guard();
    let orchestrator = state.orchestrator.clone();

    let report = tokio::spawn(async move {
        let _permit = permit;
        orchestrator
            .run(&request.images, request.duration, &job)
            .await
    })
    .await
    .map_err(|e| anyhow::Error::new(e).context("pipeline task failed"))?;

    match report.outcome {
        Ok(video) => Ok(Json(VideoResponse { url: video.url })),
        Err(error) => Err(AppError::VideoCreation(error.to_string()).into()),
    }
}
