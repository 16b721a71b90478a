//! Single-in-flight report client.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

use certforge_utils::error::GenerationError;

use crate::types::{GenerationRequest, ReportBackend};

/// Client wrapper enforcing at most one generation request at a time.
///
/// A second `generate` call while one is pending fails fast with
/// [`GenerationError::RequestInFlight`] and never reaches the backend. Clones
/// share the in-flight flag, so the invariant holds across the UI and any
/// spawned task.
#[derive(Clone)]
pub struct ReportClient {
    backend: Arc<dyn ReportBackend>,
    in_flight: Arc<AtomicBool>,
}

/// Clears the in-flight flag when the request resolves, on success or error.
struct InFlightGuard(Arc<AtomicBool>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

impl ReportClient {
    #[must_use]
    pub fn new(backend: Arc<dyn ReportBackend>) -> Self {
        Self {
            backend,
            in_flight: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Whether a generation request is currently pending.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Generate the report, enforcing the single-in-flight invariant.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::RequestInFlight` without touching the
    /// backend when a request is already pending; otherwise propagates the
    /// backend's result unchanged.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            debug!("Generation request refused: one already in flight");
            return Err(GenerationError::RequestInFlight);
        }

        let _guard = InFlightGuard(Arc::clone(&self.in_flight));
        self.backend.generate(request).await
    }
}
