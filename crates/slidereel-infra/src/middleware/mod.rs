//! Shared HTTP middleware for Slidereel services

pub mod request_id;

pub use request_id::{request_id_middleware, RequestId, REQUEST_ID_HEADER};
