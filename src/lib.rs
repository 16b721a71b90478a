//! certforge - Electrical certificate report wizard
//!
//! certforge walks an electrician through a multi-step report wizard
//! (template selection, client details, inspection details, review) and
//! calls a remote AI report endpoint to produce a BS 7671-style certificate
//! (EICR, minor works, and others). Wizard state persists across runs;
//! generated reports can be viewed, exported as plain text or print HTML,
//! and copied to the clipboard.
//!
//! certforge can be used in two ways:
//! - **CLI**: Install via `cargo install certforge` and run from command line
//! - **Library**: Add as a dependency and drive the wizard controller
//!   directly
//!
//! # Quick Start (CLI)
//!
//! ```bash
//! # List available certificate templates
//! certforge templates
//!
//! # Run the interactive wizard
//! certforge wizard
//!
//! # Or drive it from scripts
//! certforge template minor-works
//! certforge set client clientName="J. Smith" clientAddress="1 Test St"
//! certforge status --json
//! certforge generate --dry-run
//! ```
//!
//! # Stable Public API
//!
//! The following types are part of the stable public API:
//!
//! - [`StepId`] - Wizard step identifiers (Template, Client, Inspection, Review)
//! - [`WizardData`] / [`WizardController`] - Canonical wizard state and its owner
//! - [`Config`] and [`ConfigBuilder`] - Configuration management
//! - [`CertForgeError`] - Library error type
//! - [`ExitCode`] - CLI exit codes
//! - [`StatusOutput`] - Wizard session status contract

/// Wizard step identifiers for the report workflow.
///
/// Steps execute in the fixed order Template → Client → Inspection → Review,
/// with forward navigation gated on each earlier step's completion predicate.
pub use certforge_utils::types::StepId;

/// The full aggregate state of one in-progress report.
pub use certforge_utils::types::WizardData;

/// Canonical owner of the wizard data and current step.
///
/// Step views emit discrete change events into the controller; it stamps and
/// persists every mutation and owns navigation, progress, and the autosave
/// display stamp.
pub use certforge_wizard::WizardController;

/// Configuration for certforge operations.
///
/// Hierarchical configuration with discovery and precedence:
/// CLI arguments > config file > built-in defaults. Use
/// [`Config::discover()`] for CLI-like behavior or [`Config::builder()`] for
/// programmatic configuration in embedding scenarios.
pub use certforge_config::Config;

/// Builder for programmatic configuration.
pub use certforge_config::ConfigBuilder;

/// Library-level error type with rich context.
///
/// Library code returns `CertForgeError` and does NOT call
/// `std::process::exit()`.
pub use certforge_utils::error::CertForgeError;

/// Exit codes matching the documented exit code table.
pub use certforge_utils::exit_codes::ExitCode;

/// Status output contract for `certforge status --json`.
pub use certforge_utils::types::StatusOutput;

// Additional stable re-exports for convenience

/// CLI argument structure for configuration override.
pub use certforge_config::CliArgs;

/// Error categories for grouping similar errors.
pub use certforge_utils::error::ErrorCategory;

/// Trait for providing user-friendly error reporting.
pub use certforge_utils::error::UserFriendlyError;

/// Returns the certforge version.
#[must_use]
pub fn certforge_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

// ============================================================================
// Internal modules - accessible but not stable
// ============================================================================

#[doc(hidden)]
pub use certforge_utils::{atomic_write, error, exit_codes, logging, paths, types};

#[doc(hidden)]
pub use certforge_config as config;

#[doc(hidden)]
pub use certforge_llm as llm;

#[doc(hidden)]
pub use certforge_render as render;

#[doc(hidden)]
pub use certforge_templates as templates;

#[doc(hidden)]
pub use certforge_validation as validation;

#[doc(hidden)]
pub use certforge_wizard as wizard;

// CLI module - internal implementation detail, not part of stable public API
#[doc(hidden)]
pub mod cli;
#[doc(hidden)]
pub mod error_reporter;
#[doc(hidden)]
pub mod tui;
