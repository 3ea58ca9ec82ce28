use crate::keys::{is_safe_key, join_public_url};
use crate::traits::{Storage, StorageError, StorageResult};
use crate::StorageBackend;
use async_trait::async_trait;
use bytes::Bytes;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{
    Attribute, AttributeValue, Attributes, ObjectStore, ObjectStoreExt, PutOptions, PutPayload,
    Result as ObjectResult,
};

/// Credentials and addressing for an S3-compatible bucket.
#[derive(Clone, Debug)]
pub struct S3Settings {
    pub bucket: String,
    pub region: String,
    /// Custom endpoint for S3-compatible providers (R2, MinIO, ...)
    pub endpoint_url: Option<String>,
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Host that serves the bucket publicly.
    pub public_base_url: String,
}

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    bucket: String,
    public_base_url: String,
}

impl S3Storage {
    /// Create a new S3Storage instance.
    ///
    /// No request is made here; credentials are only exercised by the first
    /// upload.
    pub fn new(settings: S3Settings) -> StorageResult<Self> {
        let mut builder = AmazonS3Builder::new()
            .with_region(settings.region.clone())
            .with_bucket_name(settings.bucket.clone())
            .with_access_key_id(settings.access_key_id)
            .with_secret_access_key(settings.secret_access_key);

        if let Some(ref endpoint) = settings.endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        tracing::debug!(
            bucket = %settings.bucket,
            region = %settings.region,
            endpoint = ?settings.endpoint_url,
            "S3 storage client built"
        );

        Ok(S3Storage {
            store,
            bucket: settings.bucket,
            public_base_url: settings.public_base_url,
        })
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String> {
        if !is_safe_key(storage_key) {
            return Err(StorageError::InvalidKey(storage_key.to_string()));
        }

        let size = data.len() as u64;
        let location = Path::from(storage_key.to_string());
        let start = std::time::Instant::now();

        let attributes = Attributes::from_iter([(
            Attribute::ContentType,
            AttributeValue::from(content_type.to_string()),
        )]);
        let options = PutOptions {
            attributes,
            ..Default::default()
        };

        let result: ObjectResult<_> = self
            .store
            .put_opts(&location, PutPayload::from(Bytes::from(data)), options)
            .await;

        result.map_err(|e| {
            tracing::error!(
                error = %e,
                bucket = %self.bucket,
                key = %storage_key,
                size_bytes = size,
                duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                "S3 upload failed"
            );
            StorageError::UploadFailed(e.to_string())
        })?;

        let url = self.public_url(storage_key);

        tracing::info!(
            bucket = %self.bucket,
            key = %storage_key,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 upload successful"
        );

        Ok(url)
    }

    async fn exists(&self, storage_key: &str) -> StorageResult<bool> {
        let location = Path::from(storage_key.to_string());
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    fn public_url(&self, storage_key: &str) -> String {
        join_public_url(&self.public_base_url, storage_key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
