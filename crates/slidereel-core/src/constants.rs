//! Fixed rendering parameters and request limits.

/// Output frame width in pixels.
pub const OUTPUT_WIDTH: u32 = 1280;

/// Output frame height in pixels.
pub const OUTPUT_HEIGHT: u32 = 720;

/// Length of the fade-in and fade-out applied to every slide, in seconds.
pub const FADE_SECONDS: f64 = 1.0;

/// Pixel format of the encoded stream.
pub const OUTPUT_PIXEL_FORMAT: &str = "yuv420p";

/// Video codec passed to the encoder.
pub const OUTPUT_VIDEO_CODEC: &str = "libx264";

/// Content type of every uploaded video.
pub const VIDEO_CONTENT_TYPE: &str = "video/mp4";

/// Prefix of every stored video key.
pub const VIDEO_KEY_PREFIX: &str = "videos";

/// Upper bound on images in a single request.
pub const MAX_IMAGES_PER_VIDEO: u64 = 100;

/// Upper bound on the per-image display time.
pub const MAX_IMAGE_DURATION_SECS: f64 = 300.0;

/// Client-facing message for any pipeline failure.
pub const VIDEO_CREATION_FAILED_MESSAGE: &str = "Failed to create video";
