//! Logging and observability infrastructure for certforge.
//!
//! Structured logging via `tracing`, with a compact human format by default
//! and a verbose format carrying wizard step and timing fields.

use std::io::IsTerminal;
use tracing_subscriber::{
    EnvFilter,
    fmt,
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Check if colored output should be used.
///
/// Returns true only if:
/// - stderr is a terminal (TTY)
/// - NO_COLOR environment variable is not set
#[must_use]
pub fn use_color() -> bool {
    std::io::stderr().is_terminal() && std::env::var_os("NO_COLOR").is_none()
}

/// Initialize the tracing subscriber for structured logging.
///
/// Sets up tracing with either compact (default) or verbose format. The
/// verbose format includes targets and debug-level wizard events.
///
/// # Errors
///
/// Returns an error if a global subscriber has already been installed.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            if verbose {
                EnvFilter::try_new("certforge=debug,info")
            } else {
                EnvFilter::try_new("certforge=info,warn")
            }
        })
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if verbose {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_ansi(use_color())
                    .compact(),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_ansi(use_color())
                    .compact(),
            )
            .try_init()?;
    }

    Ok(())
}

/// Log a wizard step transition with structured fields.
pub fn log_step_transition(from: &str, to: &str) {
    tracing::info!(from = %from, to = %to, "Wizard step transition");
}

/// Log the start of a report generation call.
pub fn log_generation_start(template: &str, endpoint: &str) {
    tracing::info!(template = %template, endpoint = %endpoint, "Starting report generation");
}

/// Log generation completion with duration.
pub fn log_generation_complete(template: &str, duration_ms: u128, report_bytes: usize) {
    tracing::info!(
        template = %template,
        duration_ms = %duration_ms,
        report_bytes = %report_bytes,
        "Report generation completed"
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracing_initialization() {
        // May fail if a subscriber is already installed, which is okay in tests
        let result = init_tracing(false);
        assert!(result.is_ok() || result.is_err());
    }

    #[test]
    fn test_structured_logging_functions() {
        log_step_transition("template", "client");
        log_generation_start("eicr", "https://example.test/generate");
        log_generation_complete("eicr", 1200, 4096);
    }
}
