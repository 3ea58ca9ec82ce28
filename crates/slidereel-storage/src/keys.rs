//! Shared key generation for storage backends.
//!
//! Key format: `videos/{uuid}.mp4`, with a fresh v4 UUID per upload.

use slidereel_core::constants::VIDEO_KEY_PREFIX;
use uuid::Uuid;

/// Generate a fresh storage key for an encoded video.
pub fn generate_video_key() -> String {
    format!("{}/{}.mp4", VIDEO_KEY_PREFIX, Uuid::new_v4())
}

/// Reject keys that could escape a backend's namespace.
pub(crate) fn is_safe_key(key: &str) -> bool {
    !key.is_empty() && !key.contains("..") && !key.starts_with('/')
}

/// Join a base URL and a key with exactly one slash between them.
pub(crate) fn join_public_url(base_url: &str, key: &str) -> String {
    format!("{}/{}", base_url.trim_end_matches('/'), key)
}
