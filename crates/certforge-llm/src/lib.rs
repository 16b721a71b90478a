//! Report generation client for certforge.
//!
//! This module provides a trait-based boundary to the remote AI report
//! endpoint. The endpoint is opaque: it accepts a flat payload assembled from
//! the wizard data and returns report text or an error message. The call is
//! all-or-nothing (no automatic retry, no partial result) and at most one
//! request is in flight at a time.

mod client;
mod http_backend;
pub(crate) mod http_client;
mod stub_backend;
mod types;

pub use certforge_utils::error::GenerationError;
pub use client::ReportClient;
pub use http_backend::HttpReportBackend;
pub use stub_backend::StubBackend;
pub use types::{GenerationRequest, ReportBackend};

// Test seam; not part of public API stability guarantees.
#[doc(hidden)]
pub use http_client::redact_error_message_for_testing;

use certforge_config::Config;
use std::sync::Arc;

/// Construct a report client from configuration.
///
/// `dry_run` selects the deterministic stub backend; otherwise the HTTP
/// backend is built against the configured endpoint.
///
/// # Errors
///
/// Returns `GenerationError::Misconfiguration` if the endpoint is not
/// configured or the HTTP client cannot be constructed.
pub fn client_from_config(config: &Config, dry_run: bool) -> Result<ReportClient, GenerationError> {
    if dry_run {
        return Ok(ReportClient::new(Arc::new(StubBackend::new())));
    }

    let backend = HttpReportBackend::new_from_config(config)?;
    Ok(ReportClient::new(Arc::new(backend)))
}
