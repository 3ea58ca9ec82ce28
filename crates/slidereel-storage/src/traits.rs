//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must implement.

use crate::StorageBackend;
use async_trait::async_trait;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// The pipeline only ever writes new objects; there is no delete path. Keys
/// come from [`crate::keys::generate_video_key`].
#[async_trait]
pub trait Storage: Send + Sync {
    /// Write `data` under `storage_key` and return its public URL.
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String>;

    /// Check if an object exists
    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// Public URL for a key, without touching the backend.
    fn public_url(&self, storage_key: &str) -> String;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
