//! Configuration module
//!
//! Configuration is read once at startup from the environment (after loading
//! an optional `.env` file) and validated before anything else starts. Missing
//! credentials or malformed numbers fail startup instead of silently falling
//! back to empty values.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::storage_types::StorageBackend;

// Common constants
const SERVER_PORT: u16 = 3000;
const HTTP_CONCURRENCY_LIMIT: usize = 1024;
const MAX_REQUEST_BODY_KB: usize = 256;
const MAX_CONCURRENT_JOBS: usize = 2;
const ADMISSION_TIMEOUT_SECS: u64 = 30;
const FETCH_CONCURRENCY: usize = 8;
const MAX_IMAGE_SIZE_MB: u64 = 20;
const FETCH_TIMEOUT_SECS: u64 = 30;
const ENCODE_TIMEOUT_SECS: u64 = 600;
const UPLOAD_TIMEOUT_SECS: u64 = 120;

/// HTTP server settings
#[derive(Clone, Debug)]
pub struct BaseConfig {
    pub server_port: u16,
    pub environment: String,
    pub cors_origins: Vec<String>,
    pub http_concurrency_limit: usize,
    pub max_request_body_bytes: usize,
    pub log_format: String,
}

/// Object storage settings
#[derive(Clone, Debug)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    /// Account identifier of an R2-style provider; used to derive the endpoint
    /// when `s3_endpoint` is not set.
    pub s3_account_id: Option<String>,
    pub s3_endpoint: Option<String>,
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    /// Host that serves uploaded objects; public URLs are `{public_base_url}/{key}`.
    pub public_base_url: Option<String>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
}

/// Slideshow pipeline settings
#[derive(Clone, Debug)]
pub struct PipelineSettings {
    pub ffmpeg_path: String,
    pub scratch_dir: PathBuf,
    pub max_concurrent_jobs: usize,
    pub admission_timeout_secs: u64,
    pub fetch_concurrency: usize,
    pub max_image_size_bytes: u64,
    pub fetch_timeout_secs: u64,
    pub encode_timeout_secs: u64,
    pub upload_timeout_secs: u64,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    pub base: BaseConfig,
    pub storage: StorageSettings,
    pub pipeline: PipelineSettings,
}

impl Config {
    /// Load from the process environment (and `.env`, if present), then validate.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from an arbitrary key lookup, then validate.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, anyhow::Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let environment = get("ENVIRONMENT")
            .or_else(|| get("APP_ENV"))
            .unwrap_or_else(|| "development".to_string());

        let cors_origins = get("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let base = BaseConfig {
            server_port: parse_or("PORT", get("PORT"), SERVER_PORT)?,
            environment,
            cors_origins,
            http_concurrency_limit: parse_or(
                "HTTP_CONCURRENCY_LIMIT",
                get("HTTP_CONCURRENCY_LIMIT"),
                HTTP_CONCURRENCY_LIMIT,
            )?,
            max_request_body_bytes: parse_or::<usize>(
                "MAX_REQUEST_BODY_KB",
                get("MAX_REQUEST_BODY_KB"),
                MAX_REQUEST_BODY_KB,
            )? * 1024,
            log_format: get("LOG_FORMAT")
                .unwrap_or_else(|| "text".to_string())
                .to_lowercase(),
        };

        let backend = match get("STORAGE_BACKEND") {
            Some(raw) => raw.parse::<StorageBackend>()?,
            None => StorageBackend::S3,
        };

        let storage = StorageSettings {
            backend,
            s3_bucket: get("S3_BUCKET"),
            s3_region: get("S3_REGION").or_else(|| get("AWS_REGION")),
            s3_account_id: get("S3_ACCOUNT_ID"),
            s3_endpoint: get("S3_ENDPOINT"),
            aws_access_key_id: get("AWS_ACCESS_KEY_ID"),
            aws_secret_access_key: get("AWS_SECRET_ACCESS_KEY"),
            public_base_url: get("PUBLIC_BASE_URL"),
            local_storage_path: get("LOCAL_STORAGE_PATH"),
            local_storage_base_url: get("LOCAL_STORAGE_BASE_URL"),
        };

        let pipeline = PipelineSettings {
            ffmpeg_path: get("FFMPEG_PATH").unwrap_or_else(|| "ffmpeg".to_string()),
            scratch_dir: get("SCRATCH_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(env::temp_dir),
            max_concurrent_jobs: parse_or(
                "MAX_CONCURRENT_JOBS",
                get("MAX_CONCURRENT_JOBS"),
                MAX_CONCURRENT_JOBS,
            )?,
            admission_timeout_secs: parse_or(
                "ADMISSION_TIMEOUT_SECS",
                get("ADMISSION_TIMEOUT_SECS"),
                ADMISSION_TIMEOUT_SECS,
            )?,
            fetch_concurrency: parse_or(
                "FETCH_CONCURRENCY",
                get("FETCH_CONCURRENCY"),
                FETCH_CONCURRENCY,
            )?,
            max_image_size_bytes: parse_or::<u64>(
                "MAX_IMAGE_SIZE_MB",
                get("MAX_IMAGE_SIZE_MB"),
                MAX_IMAGE_SIZE_MB,
            )? * 1024
                * 1024,
            fetch_timeout_secs: parse_or(
                "FETCH_TIMEOUT_SECS",
                get("FETCH_TIMEOUT_SECS"),
                FETCH_TIMEOUT_SECS,
            )?,
            encode_timeout_secs: parse_or(
                "ENCODE_TIMEOUT_SECS",
                get("ENCODE_TIMEOUT_SECS"),
                ENCODE_TIMEOUT_SECS,
            )?,
            upload_timeout_secs: parse_or(
                "UPLOAD_TIMEOUT_SECS",
                get("UPLOAD_TIMEOUT_SECS"),
                UPLOAD_TIMEOUT_SECS,
            )?,
        };

        let config = Config {
            base,
            storage,
            pipeline,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.is_production() && self.base.cors_origins.iter().any(|o| o == "*") {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        if !matches!(self.base.log_format.as_str(), "text" | "json") {
            return Err(anyhow::anyhow!("LOG_FORMAT must be 'text' or 'json'"));
        }

        if self.base.http_concurrency_limit == 0 {
            return Err(anyhow::anyhow!("HTTP_CONCURRENCY_LIMIT must be at least 1"));
        }

        let pipeline = &self.pipeline;
        if pipeline.ffmpeg_path.is_empty() {
            return Err(anyhow::anyhow!("FFMPEG_PATH cannot be empty"));
        }
        if pipeline.max_concurrent_jobs == 0 {
            return Err(anyhow::anyhow!("MAX_CONCURRENT_JOBS must be at least 1"));
        }
        if pipeline.fetch_concurrency == 0 {
            return Err(anyhow::anyhow!("FETCH_CONCURRENCY must be at least 1"));
        }
        if pipeline.max_image_size_bytes == 0 {
            return Err(anyhow::anyhow!("MAX_IMAGE_SIZE_MB must be at least 1"));
        }
        for (name, secs) in [
            ("ADMISSION_TIMEOUT_SECS", pipeline.admission_timeout_secs),
            ("FETCH_TIMEOUT_SECS", pipeline.fetch_timeout_secs),
            ("ENCODE_TIMEOUT_SECS", pipeline.encode_timeout_secs),
            ("UPLOAD_TIMEOUT_SECS", pipeline.upload_timeout_secs),
        ] {
            if secs == 0 {
                return Err(anyhow::anyhow!("{} must be at least 1", name));
            }
        }

        let storage = &self.storage;
        match storage.backend {
            StorageBackend::S3 => {
                let required = [
                    ("S3_BUCKET", &storage.s3_bucket),
                    ("S3_REGION or AWS_REGION", &storage.s3_region),
                    ("AWS_ACCESS_KEY_ID", &storage.aws_access_key_id),
                    ("AWS_SECRET_ACCESS_KEY", &storage.aws_secret_access_key),
                    ("PUBLIC_BASE_URL", &storage.public_base_url),
                ];
                let missing: Vec<&str> = required
                    .iter()
                    .filter(|(_, value)| value.is_none())
                    .map(|(name, _)| *name)
                    .collect();
                if !missing.is_empty() {
                    return Err(anyhow::anyhow!(
                        "Missing required S3 storage settings: {}",
                        missing.join(", ")
                    ));
                }
                if let Some(endpoint) = storage.s3_endpoint.as_deref() {
                    validate_http_url("S3_ENDPOINT", endpoint)?;
                }
                if let Some(base_url) = storage.public_base_url.as_deref() {
                    validate_http_url("PUBLIC_BASE_URL", base_url)?;
                }
            }
            StorageBackend::Local => {
                if storage.local_storage_path.is_none() {
                    return Err(anyhow::anyhow!(
                        "LOCAL_STORAGE_PATH must be set when using local storage backend"
                    ));
                }
                match storage.local_storage_base_url.as_deref() {
                    Some(base_url) => validate_http_url("LOCAL_STORAGE_BASE_URL", base_url)?,
                    None => {
                        return Err(anyhow::anyhow!(
                            "LOCAL_STORAGE_BASE_URL must be set when using local storage backend"
                        ))
                    }
                }
            }
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.base.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    // Convenience getters for common fields
    pub fn server_port(&self) -> u16 {
        self.base.server_port
    }

    pub fn environment(&self) -> &str {
        &self.base.environment
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.base.cors_origins
    }

    pub fn http_concurrency_limit(&self) -> usize {
        self.base.http_concurrency_limit
    }

    pub fn max_request_body_bytes(&self) -> usize {
        self.base.max_request_body_bytes
    }

    pub fn log_format(&self) -> &str {
        &self.base.log_format
    }

    pub fn storage_backend(&self) -> StorageBackend {
        self.storage.backend
    }

    pub fn s3_bucket(&self) -> Option<&str> {
        self.storage.s3_bucket.as_deref()
    }

    pub fn s3_region(&self) -> Option<&str> {
        self.storage.s3_region.as_deref()
    }

    /// Explicit endpoint, or the R2 endpoint derived from the account id.
    pub fn s3_endpoint(&self) -> Option<String> {
        self.storage.s3_endpoint.clone().or_else(|| {
            self.storage
                .s3_account_id
                .as_ref()
                .map(|account| format!("https://{}.r2.cloudflarestorage.com", account))
        })
    }

    pub fn aws_access_key_id(&self) -> Option<&str> {
        self.storage.aws_access_key_id.as_deref()
    }

    pub fn aws_secret_access_key(&self) -> Option<&str> {
        self.storage.aws_secret_access_key.as_deref()
    }

    pub fn public_base_url(&self) -> Option<&str> {
        self.storage.public_base_url.as_deref()
    }

    pub fn local_storage_path(&self) -> Option<&str> {
        self.storage.local_storage_path.as_deref()
    }

    pub fn local_storage_base_url(&self) -> Option<&str> {
        self.storage.local_storage_base_url.as_deref()
    }

    pub fn ffmpeg_path(&self) -> &str {
        &self.pipeline.ffmpeg_path
    }

    pub fn scratch_dir(&self) -> &PathBuf {
        &self.pipeline.scratch_dir
    }

    pub fn max_concurrent_jobs(&self) -> usize {
        self.pipeline.max_concurrent_jobs
    }

    pub fn admission_timeout(&self) -> Duration {
        Duration::from_secs(self.pipeline.admission_timeout_secs)
    }

    pub fn fetch_concurrency(&self) -> usize {
        self.pipeline.fetch_concurrency
    }

    pub fn max_image_size_bytes(&self) -> u64 {
        self.pipeline.max_image_size_bytes
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.pipeline.fetch_timeout_secs)
    }

    pub fn encode_timeout(&self) -> Duration {
        Duration::from_secs(self.pipeline.encode_timeout_secs)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.pipeline.upload_timeout_secs)
    }
}

fn parse_or<T>(name: &str, raw: Option<String>, default: T) -> Result<T, anyhow::Error>
where
    T: std::str::FromStr,
{
    match raw {
        Some(value) => value
            .parse()
            .map_err(|_| anyhow::anyhow!("{} must be a valid number, got '{}'", name, value)),
        None => Ok(default),
    }
}

fn validate_http_url(name: &str, value: &str) -> Result<(), anyhow::Error> {
    let parsed = url::Url::parse(value)
        .map_err(|e| anyhow::anyhow!("{} is not a valid URL: {}", name, e))?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(anyhow::anyhow!("{} must be an http or https URL", name));
    }
    Ok(())
}
