//! Admission control for pipeline runs.
//!
//! Each run holds one permit from start to cleanup. Callers that cannot get a
//! permit within the configured wait are turned away as busy.

use std::sync::Arc;
use std::time::Duration;

use slidereel_core::AppError;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};

#[derive(Clone)]
pub struct AdmissionGate {
    permits: Arc<Semaphore>,
    capacity: usize,
    wait: Duration,
}

impl AdmissionGate {
    pub fn new(capacity: usize, wait: Duration) -> Self {
        let capacity = capacity.max(1);
        tracing::info!(
            max_concurrent_jobs = capacity,
            admission_timeout_secs = wait.as_secs(),
            "Admission gate initialized"
        );
        Self {
            permits: Arc::new(Semaphore::new(capacity)),
            capacity,
            wait,
        }
    }

    /// Wait up to the configured timeout for a job slot.
    pub async fn admit(&self) -> Result<OwnedSemaphorePermit, AppError> {
        match tokio::time::timeout(self.wait, self.permits.clone().acquire_owned()).await {
            Ok(Ok(permit)) => Ok(permit),
            Ok(Err(_)) => Err(AppError::ServiceBusy(
                "service is shutting down".to_string(),
            )),
            Err(_) => {
                tracing::warn!(
                    max_concurrent_jobs = self.capacity,
                    waited_secs = self.wait.as_secs_f64(),
                    "No job slot available, rejecting request"
                );
                Err(AppError::ServiceBusy(format!(
                    "no job slot freed up within {}s",
                    self.wait.as_secs_f64()
                )))
            }
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }

    /// Reject every pending and future admission.
    pub fn close(&self) {
        self.permits.close();
    }
}
