//! Slidereel Processing Library
//!
//! The slideshow pipeline: download images, render them into an MP4 with
//! ffmpeg, publish the result to object storage, and clean up after itself.

pub mod error;
pub mod slideshow;

pub use error::{EncodeError, FetchError, PipelineError, PipelineStage};
pub use slideshow::{
    build_filter_graph, CleanupReport, FfmpegEncoder, ImageFetcher, PipelineReport,
    PublishedVideo, ScratchSpace, SlideshowOrchestrator, SlideshowOrchestratorConfig,
};
