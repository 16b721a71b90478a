//! Deterministic stub backend for dry runs and tests.
//!
//! Assembles a plausible markdown report from the request without any
//! network access, and counts invocations so tests can assert the
//! single-in-flight invariant.

use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use certforge_utils::error::GenerationError;

use crate::types::{GenerationRequest, ReportBackend};

/// Stub backend producing a deterministic markdown report.
#[derive(Debug, Default)]
pub struct StubBackend {
    calls: AtomicU64,
    delay: Option<Duration>,
}

impl StubBackend {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stub that sleeps before replying, for exercising pending-state
    /// behavior.
    #[must_use]
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            calls: AtomicU64::new(0),
            delay: Some(delay),
        }
    }

    /// Number of times `generate` was invoked.
    #[must_use]
    pub fn calls(&self) -> u64 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReportBackend for StubBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        let mut report = format!(
            "# {} (draft)\n\nThis report was produced locally without contacting the \
             generation endpoint.\n\n## Details\n\n| Field | Value |\n| --- | --- |\n",
            request.template
        );
        for (key, value) in &request.form_data {
            let value = value.replace('\n', "; ");
            report.push_str(&format!("| {key} | {value} |\n"));
        }
        if !request.additional_notes.trim().is_empty() {
            report.push_str(&format!("\n## Additional notes\n\n{}\n", request.additional_notes));
        }
        report.push_str("\n---\n\n*Draft output. Verify all values before issuing.*\n");

        Ok(report)
    }
}
