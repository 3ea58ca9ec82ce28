//! Slidereel API Library
//!
//! HTTP handlers, application state, admission control and startup for the
//! slideshow video service.

pub mod admission;
mod api_doc;
pub mod constants;
pub mod error;
mod handlers;
pub mod setup;
pub mod state;

pub use admission::AdmissionGate;
pub use api_doc::ApiDoc;
pub use error::{HttpAppError, ValidatedJson};
pub use state::AppState;
