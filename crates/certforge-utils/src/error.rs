use std::fmt;
use std::time::Duration;
use thiserror::Error;

use crate::exit_codes::ExitCode;

/// Library-level error type with rich context and user-friendly reporting.
///
/// `CertForgeError` is the primary error type returned by certforge library
/// operations. It provides:
/// - Detailed error information for programmatic handling
/// - User-friendly messages with context and suggestions
/// - Mapping to CLI exit codes for consistent error reporting
///
/// # Exit Code Mapping
///
/// | Exit Code | Error Type |
/// |-----------|------------|
/// | 2 | Configuration/CLI argument errors |
/// | 3 | Step incomplete (navigation or generation blocked) |
/// | 70 | Report generation failure |
/// | 1 | Other errors |
///
/// Library code returns `CertForgeError` and does NOT call
/// `std::process::exit()`; only the CLI maps errors to exit codes.
#[derive(Error, Debug)]
pub enum CertForgeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Wizard error: {0}")]
    Wizard(#[from] WizardError),

    #[error("Report generation error: {0}")]
    Generation(#[from] GenerationError),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CertForgeError {
    /// Map this error to the documented CLI exit code.
    #[must_use]
    pub fn to_exit_code(&self) -> ExitCode {
        match self {
            Self::Config(_) => ExitCode::CLI_ARGS,
            Self::Wizard(WizardError::StepIncomplete { .. }) => ExitCode::STEP_INCOMPLETE,
            Self::Wizard(_) => ExitCode::CLI_ARGS,
            Self::Generation(_) => ExitCode::GENERATION_FAILURE,
            Self::Clipboard(_) | Self::Io(_) => ExitCode::INTERNAL,
        }
    }
}

/// Configuration file or CLI argument errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid config file {path}: {reason}")]
    InvalidFile { path: String, reason: String },

    #[error("Invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },

    #[error("Failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Wizard navigation and data-entry errors.
#[derive(Error, Debug)]
pub enum WizardError {
    #[error("Unknown template '{0}'")]
    UnknownTemplate(String),

    #[error("Unknown step '{0}'")]
    UnknownStep(String),

    #[error("Step '{step}' is incomplete: missing {}", missing.join(", "))]
    StepIncomplete { step: String, missing: Vec<String> },

    #[error("Fault entry rejected: missing {}", missing.join(", "))]
    FaultRejected { missing: Vec<String> },

    #[error("Template cannot be changed after report generation has begun")]
    TemplateLocked,
}

/// Report-generation failures from the remote endpoint.
///
/// The generation call is all-or-nothing: there is no automatic retry and no
/// partial result. The wizard stays on the review step so the user can retry
/// manually.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// Network-level failure (connect, DNS, TLS, body read).
    #[error("Transport error: {0}")]
    Transport(String),

    /// Endpoint authentication failure (401, 403, missing API key).
    #[error("Endpoint authentication error: {0}")]
    EndpointAuth(String),

    /// Endpoint quota/rate limit exceeded (429).
    #[error("Endpoint quota exceeded: {0}")]
    EndpointQuota(String),

    /// Endpoint service outage (5xx errors).
    #[error("Endpoint outage: {0}")]
    EndpointOutage(String),

    /// Request timed out.
    #[error("Timeout after {duration:?}")]
    Timeout { duration: Duration },

    /// The endpoint replied without a usable `report` field.
    #[error("Malformed response from endpoint: {0}")]
    MalformedResponse(String),

    /// The endpoint replied with an empty report body.
    #[error("Endpoint returned an empty report")]
    EmptyReport,

    /// A generation request is already pending; no second request was sent.
    #[error("A report generation request is already in flight")]
    RequestInFlight,

    /// Missing or invalid client-side configuration.
    #[error("Misconfiguration: {0}")]
    Misconfiguration(String),
}

/// Trait for providing user-friendly error reporting with context and
/// suggestions.
pub trait UserFriendlyError {
    /// Get a user-friendly error message.
    fn user_message(&self) -> String;

    /// Get contextual information about the error.
    fn context(&self) -> Option<String>;

    /// Get suggested actions to resolve the error.
    fn suggestions(&self) -> Vec<String>;

    /// Get the error category for grouping similar errors.
    fn category(&self) -> ErrorCategory;
}

/// Categories of errors for better organization and handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Wizard,
    Generation,
    FileSystem,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::Wizard => write!(f, "Wizard"),
            Self::Generation => write!(f, "Report Generation"),
            Self::FileSystem => write!(f, "File System"),
        }
    }
}

impl UserFriendlyError for CertForgeError {
    fn user_message(&self) -> String {
        match self {
            Self::Config(e) => format!("Configuration problem: {e}"),
            Self::Wizard(WizardError::StepIncomplete { step, missing }) => format!(
                "The '{step}' step is missing required fields: {}",
                missing.join(", ")
            ),
            Self::Wizard(e) => e.to_string(),
            Self::Generation(e) => generation_user_message(e),
            Self::Clipboard(_) => "Copy failed".to_string(),
            Self::Io(e) => format!("File system error: {e}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Generation(GenerationError::RequestInFlight) => {
                Some("Only one generation request runs at a time.".to_string())
            }
            Self::Generation(_) => {
                Some("The wizard keeps your entered data; nothing was lost.".to_string())
            }
            _ => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Config(_) => vec![
                "Check .certforge/config.toml for typos".to_string(),
                "Run 'certforge status' to see the effective state directory".to_string(),
            ],
            Self::Wizard(WizardError::StepIncomplete { missing, .. }) => missing
                .iter()
                .map(|key| format!("Fill in '{key}' before continuing"))
                .collect(),
            Self::Wizard(WizardError::UnknownTemplate(_)) => {
                vec!["Run 'certforge templates' to list available templates".to_string()]
            }
            Self::Wizard(_) => Vec::new(),
            Self::Generation(GenerationError::Misconfiguration(_)) => vec![
                "Set [generation] endpoint_url in .certforge/config.toml".to_string(),
                "Or use --dry-run to produce a stub report locally".to_string(),
            ],
            Self::Generation(GenerationError::RequestInFlight) => {
                vec!["Wait for the current request to finish, then retry".to_string()]
            }
            Self::Generation(_) => {
                vec!["Retry from the review step; the request is not retried automatically".to_string()]
            }
            Self::Clipboard(_) => {
                vec!["Use 'certforge export' to write the report to a file instead".to_string()]
            }
            Self::Io(_) => Vec::new(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(_) => ErrorCategory::Configuration,
            Self::Wizard(_) => ErrorCategory::Wizard,
            Self::Generation(_) => ErrorCategory::Generation,
            Self::Clipboard(_) | Self::Io(_) => ErrorCategory::FileSystem,
        }
    }
}

fn generation_user_message(err: &GenerationError) -> String {
    match err {
        GenerationError::Transport(msg) => format!("Could not reach the report endpoint: {msg}"),
        GenerationError::EndpointAuth(msg) => format!("Report endpoint rejected the request: {msg}"),
        GenerationError::EndpointQuota(msg) => format!("Report endpoint rate limit hit: {msg}"),
        GenerationError::EndpointOutage(msg) => format!("Report endpoint unavailable: {msg}"),
        GenerationError::Timeout { duration } => {
            format!("Report generation timed out after {}s", duration.as_secs())
        }
        GenerationError::MalformedResponse(msg) => {
            format!("Report endpoint returned an unexpected reply: {msg}")
        }
        GenerationError::EmptyReport => "Report endpoint returned an empty report".to_string(),
        GenerationError::RequestInFlight => {
            "A report is already being generated".to_string()
        }
        GenerationError::Misconfiguration(msg) => msg.clone(),
    }
}
