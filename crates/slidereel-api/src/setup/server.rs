//! Server startup and graceful shutdown

use std::sync::Arc;

use anyhow::Result;
use axum::Router;

use crate::state::AppState;

/// Start the server with graceful shutdown. Once a signal arrives the
/// admission gate closes and in-flight jobs are cancelled so they clean up.
pub async fn start_server(state: Arc<AppState>, app: Router) -> Result<()> {
    let config = &state.config;
    let addr = format!("0.0.0.0:{}", config.server_port());
    tracing::info!(addr = %addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(&addr).await?;

    tracing::info!(
        storage_backend = %config.storage_backend(),
        ffmpeg_path = %config.ffmpeg_path(),
        scratch_dir = %config.scratch_dir().display(),
        max_concurrent_jobs = config.max_concurrent_jobs(),
        fetch_concurrency = config.fetch_concurrency(),
        max_image_mb = config.max_image_size_bytes() / 1024 / 1024,
        "Server ready and accepting connections"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(state.clone()))
        .await?;

    slidereel_infra::shutdown_telemetry().await;
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM and starts shutting the app state down.
///
/// # Panics
/// - Panics if Ctrl+C signal handler cannot be installed (unrecoverable system error)
/// - On Unix systems, panics if SIGTERM signal handler cannot be installed (unrecoverable system error)
async fn shutdown_signal(state: Arc<AppState>) {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal");
        },
    }

    tracing::info!("Shutting down gracefully, cancelling in-flight jobs...");
    state.begin_shutdown();
}
