//! User-facing error reporting.
//!
//! Formats library errors into a message, optional context, and suggested
//! actions, written to stderr. Color is applied only on a TTY with NO_COLOR
//! unset.

use crossterm::style::Stylize;

use crate::{CertForgeError, UserFriendlyError};
use certforge_utils::logging::use_color;

/// A formatted error report ready for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorReport {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
    pub category: String,
}

impl ErrorReport {
    /// Build a report from a library error.
    #[must_use]
    pub fn from_error(err: &CertForgeError) -> Self {
        Self {
            message: err.user_message(),
            context: err.context(),
            suggestions: err.suggestions(),
            category: err.category().to_string(),
        }
    }

    /// Render the report as plain text (no color).
    #[must_use]
    pub fn to_plain_text(&self) -> String {
        let mut out = format!("error [{}]: {}\n", self.category, self.message);
        if let Some(context) = &self.context {
            out.push_str(&format!("  {context}\n"));
        }
        for suggestion in &self.suggestions {
            out.push_str(&format!("  hint: {suggestion}\n"));
        }
        out
    }
}

/// Print a library error to stderr in user-friendly form.
pub fn report(err: &CertForgeError) {
    let report = ErrorReport::from_error(err);

    if use_color() {
        eprintln!(
            "{} {}",
            format!("error [{}]:", report.category).red().bold(),
            report.message
        );
        if let Some(context) = &report.context {
            eprintln!("  {context}");
        }
        for suggestion in &report.suggestions {
            eprintln!("  {} {}", "hint:".yellow(), suggestion);
        }
    } else {
        eprint!("{}", report.to_plain_text());
    }
}

/// Print a transient, non-blocking notice (e.g. "copy failed") to stderr.
pub fn notice(message: &str) {
    if use_color() {
        eprintln!("{} {}", "note:".yellow().bold(), message);
    } else {
        eprintln!("note: {message}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use certforge_utils::error::WizardError;

    #[test]
    fn test_report_carries_missing_fields() {
        let err = CertForgeError::Wizard(WizardError::StepIncomplete {
            step: "inspection".to_string(),
            missing: vec!["overallAssessment".to_string()],
        });
        let report = ErrorReport::from_error(&err);
        assert!(report.message.contains("overallAssessment"));
        assert!(!report.suggestions.is_empty());
    }

    #[test]
    fn test_plain_text_shape() {
        let err = CertForgeError::Clipboard("no terminal".to_string());
        let text = ErrorReport::from_error(&err).to_plain_text();
        assert!(text.starts_with("error [File System]: Copy failed"));
        assert!(text.contains("hint:"));
    }
}
