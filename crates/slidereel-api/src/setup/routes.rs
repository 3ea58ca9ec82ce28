//! Route configuration and setup

use std::sync::Arc;

use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Json, Router,
};
use slidereel_infra::request_id_middleware;
use tower::limit::ConcurrencyLimitLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::api_doc::ApiDoc;
use crate::constants::OPENAPI_PATH;
use crate::error::hide_error_details;
use crate::handlers;
use crate::state::AppState;

/// Setup all application routes
pub fn setup_routes(state: Arc<AppState>) -> Result<Router<()>, anyhow::Error> {
    let cors = setup_cors(state.config.cors_origins())?;

    let http_concurrency_limit = state.config.http_concurrency_limit();
    tracing::info!(
        http_concurrency_limit = http_concurrency_limit,
        max_request_body_bytes = state.config.max_request_body_bytes(),
        "HTTP limits enabled"
    );

    let app = Router::new()
        .route("/", get(handlers::video::root))
        .route("/create-video", post(handlers::video::create_video))
        .route("/health", get(handlers::health::health_check))
        .route(OPENAPI_PATH, get(|| async { Json(ApiDoc::openapi()) }))
        .layer(axum::middleware::map_response_with_state(
            state.config.is_production(),
            hide_error_details,
        ))
        .layer(ConcurrencyLimitLayer::new(http_concurrency_limit))
        .layer(RequestBodyLimitLayer::new(state.config.max_request_body_bytes()))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(request_id_middleware))
        .with_state(state);

    Ok(app)
}

/// Setup CORS configuration
fn setup_cors(origins: &[String]) -> Result<CorsLayer, anyhow::Error> {
    let cors = if origins.iter().any(|o| o == "*") {
        tracing::warn!("CORS configured to allow all origins - not recommended for production");
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    } else {
        let origins = origins
            .iter()
            .map(|o| {
                o.parse::<HeaderValue>()
                    .map_err(|e| anyhow::anyhow!("Invalid CORS origin '{}': {}", o, e))
            })
            .collect::<Result<Vec<_>, _>>()?;

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
            .allow_headers(Any)
    };
    Ok(cors)
}
