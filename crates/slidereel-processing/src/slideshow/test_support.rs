//! Fakes shared by the pipeline tests.

use std::path::Path;

use async_trait::async_trait;
use slidereel_storage::{Storage, StorageBackend, StorageError, StorageResult};

use super::encoder::FfmpegEncoder;

/// Encoder backed by a shell script with the given body.
#[cfg(unix)]
pub(crate) fn fake_encoder_script(dir: &Path, body: &str) -> FfmpegEncoder {
    use std::os::unix::fs::PermissionsExt;

    let path = dir.join("fake-ffmpeg.sh");
    std::fs::write(&path, format!("#!/bin/sh\n{}\n", body)).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    FfmpegEncoder::new(path)
}

/// Encoder that writes its last argument (the output path) and exits with
/// `exit_code`.
#[cfg(unix)]
pub(crate) fn fake_encoder(dir: &Path, exit_code: i32) -> FfmpegEncoder {
    fake_encoder_script(
        dir,
        &format!(
            "for last; do :; done\necho 'encoding' >&2\nprintf 'fake-mp4' > \"$last\"\nexit {}",
            exit_code
        ),
    )
}

/// Storage that rejects every upload.
pub(crate) struct FailingStorage;

#[async_trait]
impl Storage for FailingStorage {
    async fn upload_with_key(
        &self,
        key: &str,
        _data: Vec<u8>,
        _content_type: &str,
    ) -> StorageResult<String> {
        Err(StorageError::UploadFailed(format!("refused {}", key)))
    }

    async fn exists(&self, _key: &str) -> StorageResult<bool> {
        Ok(false)
    }

    fn public_url(&self, key: &str) -> String {
        format!("https://failing.test/{}", key)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
