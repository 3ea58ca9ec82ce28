//! Application state shared by every handler.

use std::sync::Arc;

use slidereel_core::Config;
use slidereel_processing::SlideshowOrchestrator;
use slidereel_storage::Storage;
use tokio_util::sync::CancellationToken;

use crate::admission::AdmissionGate;

/// Read-only after startup.
pub struct AppState {
    pub config: Config,
    pub orchestrator: Arc<SlideshowOrchestrator>,
    pub storage: Arc<dyn Storage>,
    pub admission: AdmissionGate,
    /// Root token; cancelled on graceful shutdown. Every job runs on a child.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Stop admitting jobs and cancel the ones in flight. Callers waiting on
    /// the gate are turned away immediately.
    pub fn begin_shutdown(&self) {
        self.admission.close();
        self.shutdown.cancel();
    }
}
