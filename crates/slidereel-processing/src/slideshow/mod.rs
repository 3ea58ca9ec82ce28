//! Slideshow rendering module

pub mod encoder;
pub mod fetcher;
pub mod filter_graph;
pub mod orchestration;
pub mod scratch;

#[cfg(test)]
pub(crate) mod test_support;

pub use encoder::FfmpegEncoder;
pub use fetcher::ImageFetcher;
pub use filter_graph::build_filter_graph;
pub use orchestration::{
    PipelineReport, PublishedVideo, SlideshowOrchestrator, SlideshowOrchestratorConfig,
};
pub use scratch::{CleanupFailure, CleanupReport, ScratchSpace};
