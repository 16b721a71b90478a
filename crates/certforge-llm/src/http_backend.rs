//! HTTP backend for the remote report endpoint.
//!
//! Sends the assembled payload as JSON and expects `{ "report": "..." }` on
//! success or an error object with a `message` field on failure.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use certforge_config::Config;
use certforge_utils::error::GenerationError;

use crate::http_client::{HttpClient, map_error_status};
use crate::types::{GenerationRequest, ReportBackend};

/// HTTP-based report backend.
pub struct HttpReportBackend {
    client: HttpClient,
    endpoint_url: String,
    api_key: Option<String>,
    timeout: Duration,
}

/// Endpoint reply shape. No schema beyond this is assumed.
#[derive(Debug, Deserialize)]
struct EndpointReply {
    #[serde(default)]
    report: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

impl HttpReportBackend {
    /// Create a backend against an explicit endpoint.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::Misconfiguration` if the HTTP client cannot
    /// be constructed.
    pub fn new(
        endpoint_url: String,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, GenerationError> {
        let client = HttpClient::with_max_timeout(timeout)?;
        Ok(Self {
            client,
            endpoint_url,
            api_key,
            timeout,
        })
    }

    /// Create a backend from configuration.
    ///
    /// # Errors
    ///
    /// Returns `GenerationError::Misconfiguration` if:
    /// - The endpoint URL is not configured
    /// - A configured API-key environment variable is not set
    /// - The HTTP client cannot be constructed
    pub fn new_from_config(config: &Config) -> Result<Self, GenerationError> {
        if config.endpoint_url.is_empty() {
            return Err(GenerationError::Misconfiguration(
                "Report endpoint not configured. Set [generation] endpoint_url in \
                 .certforge/config.toml, or use --dry-run."
                    .to_string(),
            ));
        }

        let api_key = match &config.api_key_env {
            Some(env_name) => Some(std::env::var(env_name).map_err(|_| {
                GenerationError::Misconfiguration(format!(
                    "API key not found in environment variable '{env_name}'. \
                     Set this variable or remove api_key_env from [generation]."
                ))
            })?),
            None => None,
        };

        Self::new(config.endpoint_url.clone(), api_key, config.request_timeout)
    }
}

#[async_trait]
impl ReportBackend for HttpReportBackend {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        debug!(
            template = %request.template,
            fields = request.form_data.len(),
            "Invoking report endpoint"
        );

        let mut builder = reqwest::Client::new().post(&self.endpoint_url).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = self.client.execute(builder, self.timeout).await?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| GenerationError::Transport(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            // Prefer the endpoint's own message when the body parses.
            let detail = serde_json::from_str::<EndpointReply>(&body)
                .ok()
                .and_then(|r| r.message)
                .unwrap_or_else(|| "report generation failed".to_string());
            return Err(map_error_status(status, &detail));
        }

        let reply: EndpointReply = serde_json::from_str(&body).map_err(|e| {
            GenerationError::MalformedResponse(format!("Response was not valid JSON: {e}"))
        })?;

        match reply.report {
            Some(report) if !report.trim().is_empty() => Ok(report),
            Some(_) => Err(GenerationError::EmptyReport),
            None => Err(GenerationError::MalformedResponse(
                reply
                    .message
                    .unwrap_or_else(|| "Response carried no report field".to_string()),
            )),
        }
    }
}
