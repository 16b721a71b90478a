//! Core types for the report generation boundary.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use certforge_utils::error::GenerationError;
use certforge_utils::types::WizardData;

/// Payload sent to the remote report endpoint.
///
/// Serializes as `{ "template": ..., "formData": { ... }, "additionalNotes":
/// ... }`. `formData` is a flat string mapping: client details and inspection
/// scalars merged, with the fault list folded into a single `recordedFaults`
/// entry (one formatted line per fault).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationRequest {
    /// Template id.
    pub template: String,
    /// Flat mapping of collected fields.
    pub form_data: BTreeMap<String, String>,
    /// Free text passed verbatim.
    pub additional_notes: String,
}

impl GenerationRequest {
    /// Assemble the payload from the wizard data.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::Misconfiguration` when no template has been
    /// selected; generation cannot proceed without one.
    pub fn from_wizard(data: &WizardData) -> Result<Self, GenerationError> {
        let template = data.template.clone().ok_or_else(|| {
            GenerationError::Misconfiguration("No report template selected".to_string())
        })?;

        let mut form_data = data.client_details.clone();
        for (key, value) in &data.inspection_details.fields {
            form_data.insert(key.clone(), value.clone());
        }

        if !data.inspection_details.faults.is_empty() {
            let lines: Vec<String> = data
                .inspection_details
                .faults
                .iter()
                .map(|fault| {
                    let mut line = format!(
                        "[{}] {} @ {}",
                        fault.code.as_str(),
                        fault.description,
                        fault.location
                    );
                    if let Some(recommendation) = &fault.recommendation {
                        line.push_str(&format!(" - {recommendation}"));
                    }
                    line
                })
                .collect();
            form_data.insert("recordedFaults".to_string(), lines.join("\n"));
        }

        Ok(Self {
            template,
            form_data,
            additional_notes: data.additional_notes.clone(),
        })
    }
}

/// Trait for report backend implementations.
///
/// Both the HTTP endpoint and the dry-run stub implement this trait, so
/// callers never know which is behind the boundary.
#[async_trait]
pub trait ReportBackend: Send + Sync {
    /// Generate the report text for the given request.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError` for any failure: transport errors, endpoint
    /// auth/quota/outage, timeout, or an unusable response body. The call is
    /// never retried automatically.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError>;
}
