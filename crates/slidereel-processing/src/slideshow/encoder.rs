//! ffmpeg invocation for slideshow rendering.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use slidereel_core::constants::{OUTPUT_PIXEL_FORMAT, OUTPUT_VIDEO_CODEC};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;

use super::filter_graph::build_filter_graph;
use crate::error::EncodeError;

/// Lines of encoder stderr kept for error reports.
const STDERR_TAIL_LINES: usize = 20;

/// Runs the ffmpeg binary to turn still images into an MP4.
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    binary: PathBuf,
}

impl FfmpegEncoder {
    /// Wrap a binary path as-is. Use [`FfmpegEncoder::resolve`] to check it first.
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Locate the configured binary. Values with a path separator must point
    /// at an existing file; bare names are looked up on `PATH`.
    pub fn resolve(configured: &str) -> Result<Self, EncodeError> {
        let candidate = Path::new(configured);
        let not_found = || EncodeError::NotFound {
            binary: configured.to_string(),
        };

        if candidate.components().count() > 1 || candidate.is_absolute() {
            return if candidate.is_file() {
                Ok(Self::new(candidate))
            } else {
                Err(not_found())
            };
        }

        let path_var = std::env::var_os("PATH").ok_or_else(not_found)?;
        std::env::split_paths(&path_var)
            .map(|dir| dir.join(configured))
            .find(|full| full.is_file())
            .map(Self::new)
            .ok_or_else(not_found)
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Full argument list: each image is looped for `duration_secs`, run
    /// through the slideshow filter graph, and encoded as H.264.
    pub fn build_args(images: &[PathBuf], duration_secs: f64, output: &Path) -> Vec<String> {
        let mut args = Vec::with_capacity(images.len() * 6 + 12);
        args.push("-y".to_string());

        for image in images {
            args.extend_from_slice(&[
                "-loop".to_string(),
                "1".to_string(),
                "-t".to_string(),
                duration_secs.to_string(),
                "-i".to_string(),
                image.to_string_lossy().to_string(),
            ]);
        }

        args.extend_from_slice(&[
            "-filter_complex".to_string(),
            build_filter_graph(images.len(), duration_secs),
            "-map".to_string(),
            "[v]".to_string(),
            "-c:v".to_string(),
            OUTPUT_VIDEO_CODEC.to_string(),
            "-pix_fmt".to_string(),
            OUTPUT_PIXEL_FORMAT.to_string(),
            output.to_string_lossy().to_string(),
        ]);

        args
    }

    /// Render `images` into `output`. Stderr is streamed to debug logs and
    /// its tail is attached to the error on a non-zero exit. The child is
    /// killed if this future is dropped.
    #[tracing::instrument(skip(self, images, output), fields(image_count = images.len()))]
    pub async fn encode(
        &self,
        images: &[PathBuf],
        duration_secs: f64,
        output: &Path,
    ) -> Result<(), EncodeError> {
        let args = Self::build_args(images, duration_secs, output);
        let binary = self.binary.to_string_lossy().to_string();

        tracing::debug!(binary = %binary, args = ?args, "Spawning encoder");

        let mut child = Command::new(&self.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| EncodeError::Spawn {
                binary: binary.clone(),
                source,
            })?;

        let stderr = child.stderr.take();
        let (status, tail) = tokio::join!(child.wait(), drain_stderr(stderr));
        let status = status?;

        if !status.success() {
            tracing::warn!(code = ?status.code(), "Encoder exited unsuccessfully");
            return Err(EncodeError::Exit {
                code: status.code(),
                stderr_tail: tail,
            });
        }

        tracing::info!(output = %output.display(), "Slideshow encoded");
        Ok(())
    }
}

async fn drain_stderr<R: AsyncRead + Unpin>(stderr: Option<R>) -> String {
    let Some(stderr) = stderr else {
        return String::new();
    };

    let mut tail: VecDeque<String> = VecDeque::with_capacity(STDERR_TAIL_LINES);
    let mut lines = BufReader::new(stderr).lines();

    while let Ok(Some(line)) = lines.next_line().await {
        tracing::debug!(target: "slidereel::ffmpeg", "{}", line);
        if tail.len() == STDERR_TAIL_LINES {
            tail.pop_front();
        }
        tail.push_back(line);
    }

    tail.into_iter().collect::<Vec<_>>().join("\n")
}
