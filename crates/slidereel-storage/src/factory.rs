#[cfg(feature = "storage-local")]
use crate::LocalStorage;
#[cfg(feature = "storage-s3")]
use crate::{s3::S3Settings, S3Storage};
use crate::{Storage, StorageBackend, StorageError, StorageResult};
use slidereel_core::Config;
use std::sync::Arc;

fn required(value: Option<&str>, name: &str) -> StorageResult<String> {
    value
        .map(String::from)
        .ok_or_else(|| StorageError::ConfigError(format!("{} not configured", name)))
}

/// Create a storage backend based on configuration
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn Storage>> {
    match config.storage_backend() {
        #[cfg(feature = "storage-s3")]
        StorageBackend::S3 => {
            let settings = S3Settings {
                bucket: required(config.s3_bucket(), "S3_BUCKET")?,
                region: required(config.s3_region(), "S3_REGION")?,
                endpoint_url: config.s3_endpoint(),
                access_key_id: required(config.aws_access_key_id(), "AWS_ACCESS_KEY_ID")?,
                secret_access_key: required(
                    config.aws_secret_access_key(),
                    "AWS_SECRET_ACCESS_KEY",
                )?,
                public_base_url: required(config.public_base_url(), "PUBLIC_BASE_URL")?,
            };
            Ok(Arc::new(S3Storage::new(settings)?))
        }

        #[cfg(not(feature = "storage-s3"))]
        StorageBackend::S3 => Err(StorageError::ConfigError(
            "S3 storage backend not available (storage-s3 feature not enabled)".to_string(),
        )),

        #[cfg(feature = "storage-local")]
        StorageBackend::Local => {
            let base_path = required(config.local_storage_path(), "LOCAL_STORAGE_PATH")?;
            let base_url = required(config.local_storage_base_url(), "LOCAL_STORAGE_BASE_URL")?;
            let storage = LocalStorage::new(base_path, base_url).await?;
            Ok(Arc::new(storage))
        }

        #[cfg(not(feature = "storage-local"))]
        StorageBackend::Local => Err(StorageError::ConfigError(
            "Local storage backend not available (storage-local feature not enabled)".to_string(),
        )),
    }
}

#[cfg(all(test, feature = "storage-local"))]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_create_local_storage_from_config() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().to_string_lossy().to_string();
        let config = Config::from_lookup(|key| match key {
            "STORAGE_BACKEND" => Some("local".to_string()),
            "LOCAL_STORAGE_PATH" => Some(path.clone()),
            "LOCAL_STORAGE_BASE_URL" => Some("http://localhost:3000/media".to_string()),
            _ => None,
        })
        .unwrap();

        let storage = create_storage(&config).await.unwrap();
        assert_eq!(storage.backend_type(), StorageBackend::Local);
        assert_eq!(
            storage.public_url("videos/a.mp4"),
            "http://localhost:3000/media/videos/a.mp4"
        );
    }
}
