//! Exit code constants for certforge.
//!
//! # Exit Code Table
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | Operation completed successfully |
//! | 1 | `INTERNAL` | General/internal failure |
//! | 2 | `CLI_ARGS` | Invalid CLI arguments or configuration |
//! | 3 | `STEP_INCOMPLETE` | A wizard step's required fields are missing |
//! | 70 | `GENERATION_FAILURE` | Remote report generation failed |

/// Exit codes matching the documented exit code table.
///
/// `ExitCode` provides type-safe exit code handling. Use the named constants
/// or [`as_i32()`](Self::as_i32) to get the numeric value for
/// `std::process::exit()`. The numeric values are part of the public contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Success - operation completed successfully
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// General/internal failure
    pub const INTERNAL: ExitCode = ExitCode(1);

    /// Invalid or missing command-line arguments or configuration
    pub const CLI_ARGS: ExitCode = ExitCode(2);

    /// A wizard step's completion predicate does not hold
    pub const STEP_INCOMPLETE: ExitCode = ExitCode(3);

    /// Remote report generation failed
    pub const GENERATION_FAILURE: ExitCode = ExitCode(70);

    /// Get the numeric exit code value.
    #[must_use]
    pub const fn as_i32(&self) -> i32 {
        self.0
    }

    /// Construct from a raw numeric value.
    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        Self(code)
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
