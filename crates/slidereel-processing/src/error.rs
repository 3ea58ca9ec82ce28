//! Pipeline error types.

use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::time::Duration;

use slidereel_storage::StorageError;
use thiserror::Error;

/// Stages of a single slideshow run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Fetching,
    Encoding,
    Uploading,
    CleaningUp,
    Done,
    Failed,
}

impl PipelineStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStage::Fetching => "fetching",
            PipelineStage::Encoding => "encoding",
            PipelineStage::Uploading => "uploading",
            PipelineStage::CleaningUp => "cleaning_up",
            PipelineStage::Done => "done",
            PipelineStage::Failed => "failed",
        }
    }
}

impl Display for PipelineStage {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A source image could not be downloaded.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request for image {index} ({url}) failed: {source}")]
    Request {
        index: usize,
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("image {index} ({url}) returned HTTP {status}")]
    Status {
        index: usize,
        url: String,
        status: u16,
    },

    #[error("image {index} ({url}) exceeds the {limit} byte limit")]
    TooLarge {
        index: usize,
        url: String,
        limit: u64,
    },

    #[error("failed to write image {index} to {}: {source}", path.display())]
    Write {
        index: usize,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl FetchError {
    /// Position of the failed image in the request.
    pub fn index(&self) -> usize {
        match self {
            FetchError::Request { index, .. }
            | FetchError::Status { index, .. }
            | FetchError::TooLarge { index, .. }
            | FetchError::Write { index, .. } => *index,
        }
    }
}

/// The encoder could not produce the video.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("encoder binary '{binary}' not found")]
    NotFound { binary: String },

    #[error("failed to spawn encoder '{binary}': {source}")]
    Spawn {
        binary: String,
        #[source]
        source: std::io::Error,
    },

    #[error("encoder exited with code {}: {stderr_tail}", code.map(|c| c.to_string()).unwrap_or_else(|| "none (killed by signal)".to_string()))]
    Exit {
        code: Option<i32>,
        stderr_tail: String,
    },

    #[error("failed waiting for encoder: {0}")]
    Io(#[from] std::io::Error),
}

/// Any failure of a slideshow run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    #[error("encode failed: {0}")]
    Encode(#[from] EncodeError),

    #[error("upload failed: {0}")]
    Upload(#[from] StorageError),

    #[error("scratch file error: {0}")]
    Scratch(#[source] std::io::Error),

    #[error("{stage} timed out after {}s", after.as_secs_f64())]
    Timeout {
        stage: PipelineStage,
        after: Duration,
    },

    #[error("{stage} cancelled")]
    Cancelled { stage: PipelineStage },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_error_mentions_code_and_tail() {
        let err = EncodeError::Exit {
            code: Some(1),
            stderr_tail: "Invalid data found when processing input".to_string(),
        };
        let message = err.to_string();
        assert!(message.contains("code 1"));
        assert!(message.contains("Invalid data"));
    }

    #[test]
    fn test_exit_error_without_code() {
        let err = EncodeError::Exit {
            code: None,
            stderr_tail: String::new(),
        };
        assert!(err.to_string().contains("killed by signal"));
    }

    #[test]
    fn test_timeout_message_names_stage() {
        let err = PipelineError::Timeout {
            stage: PipelineStage::Encoding,
            after: Duration::from_secs(600),
        };
        assert_eq!(err.to_string(), "encoding timed out after 600s");
    }

    #[test]
    fn test_fetch_error_index() {
        let err = FetchError::Status {
            index: 3,
            url: "https://example.com/x.jpg".to_string(),
            status: 404,
        };
        assert_eq!(err.index(), 3);
        assert!(PipelineError::from(err).to_string().contains("HTTP 404"));
    }
}
