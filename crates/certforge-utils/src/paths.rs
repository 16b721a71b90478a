//! State-directory resolution.
//!
//! certforge keeps wizard state, generated reports, and configuration under a
//! `.certforge/` directory. Discovery walks upward from the working directory
//! so the tool can be invoked from anywhere inside a project.

use camino::{Utf8Path, Utf8PathBuf};

/// Directory name holding certforge state and configuration.
pub const STATE_DIR_NAME: &str = ".certforge";

/// Config file name inside the state directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Find an existing `.certforge/` directory by walking upward from `start`.
///
/// Returns `None` when no ancestor contains one; callers then fall back to
/// `<start>/.certforge`.
#[must_use]
pub fn discover_state_dir(start: &Utf8Path) -> Option<Utf8PathBuf> {
    let mut current = Some(start);
    while let Some(dir) = current {
        let candidate = dir.join(STATE_DIR_NAME);
        if candidate.is_dir() {
            return Some(candidate);
        }
        current = dir.parent();
    }
    None
}

/// The state directory to use for `start`: a discovered ancestor's
/// `.certforge/` or, failing that, `<start>/.certforge`.
#[must_use]
pub fn resolve_state_dir(start: &Utf8Path) -> Utf8PathBuf {
    discover_state_dir(start).unwrap_or_else(|| start.join(STATE_DIR_NAME))
}

/// Path of the config file for a given state directory.
#[must_use]
pub fn config_file(state_dir: &Utf8Path) -> Utf8PathBuf {
    state_dir.join(CONFIG_FILE_NAME)
}

/// Current working directory as a UTF-8 path.
///
/// # Errors
///
/// Returns an error if the working directory cannot be read or is not valid
/// UTF-8.
pub fn current_dir_utf8() -> anyhow::Result<Utf8PathBuf> {
    let cwd = std::env::current_dir()?;
    Utf8PathBuf::from_path_buf(cwd)
        .map_err(|p| anyhow::anyhow!("Working directory is not valid UTF-8: {}", p.display()))
}
