//! Slidereel Storage Library
//!
//! This crate provides the storage abstraction used to publish rendered
//! videos, with an S3-compatible backend and a local filesystem backend.
//!
//! # Storage key format
//!
//! Every video lands under `videos/{uuid}.mp4`. Keys must not contain `..` or
//! a leading `/`. Key generation is centralized in the `keys` module so all
//! backends stay consistent.

pub mod factory;
pub mod keys;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use keys::generate_video_key;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use slidereel_core::StorageBackend;
pub use traits::{Storage, StorageError, StorageResult};
