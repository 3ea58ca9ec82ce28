use crate::keys::{is_safe_key, join_public_url};
use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage implementation
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for file storage (e.g., "/var/lib/slidereel/media")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:3000/media")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    /// Convert storage key to filesystem path, refusing traversal.
    fn key_to_path(&self, storage_key: &str) -> StorageResult<PathBuf> {
        if !is_safe_key(storage_key) {
            return Err(StorageError::InvalidKey(
                "Storage key contains invalid characters".to_string(),
            ));
        }
        Ok(self.base_path.join(storage_key))
    }

    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        _content_type: &str,
    ) -> StorageResult<String> {
        let path = self.key_to_path(storage_key)?;
        let size = data.len();

        self.ensure_parent_dir(&path).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&path).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to create file {}: {}", path.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to write file {}: {}", path.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::UploadFailed(format!("Failed to sync file {}: {}", path.display(), e))
        })?;

        let url = self.public_url(storage_key);

        tracing::info!(
            path = %path.display(),
            key = %storage_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage upload successful"
        );

        Ok(url)
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let path = self.key_to_path(storage_key)?;
        Ok(fs::try_exists(&path).await?)
    }

    fn public_url(&self, storage_key: &str) -> String {
        join_public_url(&self.base_url, storage_key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generate_video_key;
    use tempfile::TempDir;

    async fn create_test_storage() -> (LocalStorage, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(
            temp_dir.path().to_path_buf(),
            "http://localhost:3000/media".to_string(),
        )
        .await
        .unwrap();
        (storage, temp_dir)
    }

    #[tokio::test]
    async fn test_upload_with_key_writes_file_and_returns_url() {
        let (storage, temp_dir) = create_test_storage().await;
        let key = generate_video_key();

        let url = storage
            .upload_with_key(&key, b"mp4 bytes".to_vec(), "video/mp4")
            .await
            .unwrap();

        assert_eq!(url, format!("http://localhost:3000/media/{}", key));
        let written = std::fs::read(temp_dir.path().join(&key)).unwrap();
        assert_eq!(written, b"mp4 bytes");
        assert!(storage.exists(&key).await.unwrap());
    }

    #[tokio::test]
    async fn test_exists_false_for_missing_key() {
        let (storage, _temp_dir) = create_test_storage().await;
        assert!(!storage.exists("videos/missing.mp4").await.unwrap());
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let (storage, _temp_dir) = create_test_storage().await;
        let result = storage
            .upload_with_key("../outside.mp4", vec![0], "video/mp4")
            .await;
        assert!(matches!(result, Err(StorageError::InvalidKey(_))));
    }
}
