//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::handlers;
use crate::handlers::health::HealthCheckResponse;
use slidereel_core::{VideoRequest, VideoResponse};
use slidereel_infra::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Slidereel API",
        version = "0.1.0",
        description = "Turns a list of image URLs into a fading MP4 slideshow and publishes it to object storage."
    ),
    paths(
        handlers::video::root,
        handlers::video::create_video,
        handlers::health::health_check,
    ),
    components(schemas(VideoRequest, VideoResponse, ErrorResponse, HealthCheckResponse)),
    tags(
        (name = "videos", description = "Slideshow rendering"),
        (name = "service", description = "Liveness and health")
    )
)]
pub struct ApiDoc;
