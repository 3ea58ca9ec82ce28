//! Request and response bodies of the video endpoint.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use utoipa::ToSchema;
use validator::{Validate, ValidationError};

use crate::constants::{MAX_IMAGES_PER_VIDEO, MAX_IMAGE_DURATION_SECS};

/// Body of `POST /create-video`.
///
/// Bounds come from `constants`; the messages are attribute literals and
/// have to be kept in step with them by hand.
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct VideoRequest {
    /// Image URLs, shown in order.
    #[validate(
        length(min = 1, max = MAX_IMAGES_PER_VIDEO, message = "between 1 and 100 images are required"),
        custom(function = "validate_image_urls")
    )]
    pub images: Vec<String>,

    /// Seconds each image stays on screen, fades included.
    #[validate(range(
        exclusive_min = 1.0,
        max = MAX_IMAGE_DURATION_SECS,
        message = "duration must be greater than 1 and at most 300 seconds"
    ))]
    pub duration: f64,
}

/// Body of a successful `POST /create-video`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct VideoResponse {
    /// Public URL of the uploaded MP4.
    pub url: String,
}

fn validate_image_urls(images: &[String]) -> Result<(), ValidationError> {
    for (index, raw) in images.iter().enumerate() {
        let parsed = url::Url::parse(raw.trim()).map_err(|_| {
            ValidationError::new("invalid_url")
                .with_message(Cow::Owned(format!("images[{}] is not a valid URL", index)))
        })?;

        if parsed.scheme() != "http" && parsed.scheme() != "https" {
            return Err(ValidationError::new("invalid_scheme").with_message(Cow::Owned(
                format!("images[{}] must use http or https", index),
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(images: &[&str], duration: f64) -> VideoRequest {
        VideoRequest {
            images: images.iter().map(|s| s.to_string()).collect(),
            duration,
        }
    }

    #[test]
    fn test_valid_request() {
        let req = request(
            &["https://example.com/a.jpg", "http://example.com/b.png"],
            3.0,
        );
        assert!(req.validate().is_ok());
    }

    #[test]
    fn test_rejects_empty_image_list() {
        assert!(request(&[], 3.0).validate().is_err());
    }

    #[test]
    fn test_duration_must_exceed_fade_length() {
        assert!(request(&["https://example.com/a.jpg"], 1.0).validate().is_err());
        assert!(request(&["https://example.com/a.jpg"], 0.5).validate().is_err());
        assert!(request(&["https://example.com/a.jpg"], 1.5).validate().is_ok());
    }

    #[test]
    fn test_duration_upper_bound_matches_constant() {
        let url = ["https://example.com/a.jpg"];
        assert!(request(&url, MAX_IMAGE_DURATION_SECS).validate().is_ok());
        assert!(request(&url, MAX_IMAGE_DURATION_SECS + 0.5)
            .validate()
            .is_err());
    }

    #[test]
    fn test_image_count_upper_bound_matches_constant() {
        let urls: Vec<String> = (0..=MAX_IMAGES_PER_VIDEO)
            .map(|i| format!("https://example.com/{}.jpg", i))
            .collect();
        let too_many = VideoRequest {
            images: urls.clone(),
            duration: 2.0,
        };
        assert!(too_many.validate().is_err());

        let at_limit = VideoRequest {
            images: urls[..MAX_IMAGES_PER_VIDEO as usize].to_vec(),
            duration: 2.0,
        };
        assert!(at_limit.validate().is_ok());
    }

    #[test]
    fn test_rejects_non_http_urls() {
        assert!(request(&["ftp://example.com/a.jpg"], 3.0).validate().is_err());
        assert!(request(&["not a url"], 3.0).validate().is_err());
        assert!(request(&["file:///etc/passwd"], 3.0).validate().is_err());
    }

    #[test]
    fn test_deserializes_wire_format() {
        let req: VideoRequest = serde_json::from_str(
            r#"{"images":["https://example.com/a.jpg"],"duration":3}"#,
        )
        .expect("deserialize");
        assert_eq!(req.images.len(), 1);
        assert_eq!(req.duration, 3.0);
    }
}
