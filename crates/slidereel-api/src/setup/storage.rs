//! Storage setup and initialization

use std::sync::Arc;

use anyhow::{Context, Result};
use slidereel_core::Config;
use slidereel_storage::{create_storage, Storage};

pub async fn setup_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    tracing::info!("Initializing storage abstraction...");
    let storage = create_storage(config)
        .await
        .context("Failed to initialize storage backend")?;
    tracing::info!(
        backend = %storage.backend_type(),
        "Storage abstraction initialized successfully"
    );
    Ok(storage)
}
