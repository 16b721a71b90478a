use camino::{Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

use certforge_utils::error::ConfigError;
use certforge_utils::paths;

/// Default request timeout for the generation endpoint, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

/// Minimum accepted request timeout, in seconds.
pub const MIN_TIMEOUT_SECS: u64 = 5;

/// Default autosave display debounce, in seconds.
pub const DEFAULT_AUTOSAVE_DEBOUNCE_SECS: u64 = 2;

/// Configuration for certforge operations.
///
/// `Config` provides hierarchical configuration with discovery and
/// precedence: CLI arguments > config file > built-in defaults.
///
/// Use [`Config::discover()`] for CLI-like behavior or [`Config::builder()`]
/// for programmatic configuration where deterministic behavior is required
/// (tests, embedding).
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding wizard state, generated reports, and config.
    pub state_dir: Utf8PathBuf,
    /// Remote report-generation endpoint URL. Empty means unconfigured.
    pub endpoint_url: String,
    /// Environment variable holding the endpoint bearer key, if any.
    pub api_key_env: Option<String>,
    /// Timeout applied to the generation request.
    pub request_timeout: Duration,
    /// Debounce window for the "last saved" display stamp.
    pub autosave_debounce: Duration,
    /// Verbose logging requested.
    pub verbose: bool,
}

impl Config {
    /// Builder for programmatic configuration.
    #[must_use]
    pub fn builder() -> ConfigBuilder {
        ConfigBuilder::default()
    }

    /// Discover configuration with CLI-like precedence.
    ///
    /// Searches upward from the working directory for `.certforge/`, loads
    /// `config.toml` from it when present, then applies CLI overrides.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` when the config file exists but cannot be read
    /// or parsed, or when a merged value is invalid.
    pub fn discover(args: &CliArgs) -> Result<Self, ConfigError> {
        let cwd = paths::current_dir_utf8().map_err(|e| ConfigError::InvalidValue {
            key: "working directory".to_string(),
            reason: e.to_string(),
        })?;

        let state_dir = match &args.state_dir {
            Some(dir) => dir.clone(),
            None => paths::resolve_state_dir(&cwd),
        };

        let config_path = match &args.config {
            Some(path) => path.clone(),
            None => paths::config_file(&state_dir),
        };

        let file = if config_path.is_file() {
            debug!(path = %config_path, "Loading config file");
            Some(ConfigFile::load(&config_path)?)
        } else if args.config.is_some() {
            // An explicit --config path must exist.
            return Err(ConfigError::Io {
                path: config_path.to_string(),
                source: std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "config file not found",
                ),
            });
        } else {
            None
        };

        let mut builder = ConfigBuilder::default().state_dir(state_dir);

        if let Some(file) = &file {
            if let Some(generation) = &file.generation {
                if let Some(url) = &generation.endpoint_url {
                    builder = builder.endpoint_url(url.clone());
                }
                if let Some(env) = &generation.api_key_env {
                    builder = builder.api_key_env(env.clone());
                }
                if let Some(secs) = generation.timeout_secs {
                    builder = builder.request_timeout(Duration::from_secs(secs));
                }
            }
            if let Some(wizard) = &file.wizard {
                if let Some(dir) = &wizard.state_dir {
                    // CLI --state-dir still wins below.
                    if args.state_dir.is_none() {
                        builder = builder.state_dir(Utf8PathBuf::from(dir));
                    }
                }
                if let Some(secs) = wizard.autosave_debounce_secs {
                    builder = builder.autosave_debounce(Duration::from_secs(secs));
                }
            }
        }

        // CLI arguments take highest precedence.
        if let Some(url) = &args.endpoint_url {
            builder = builder.endpoint_url(url.clone());
        }
        if let Some(secs) = args.timeout_secs {
            builder = builder.request_timeout(Duration::from_secs(secs));
        }
        builder = builder.verbose(args.verbose);

        builder.build()
    }
}

/// CLI argument structure for configuration override.
///
/// Carries only the flags that participate in config precedence; the CLI
/// layer maps its parsed arguments into this.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    /// Explicit config file path (overrides discovery).
    pub config: Option<Utf8PathBuf>,
    /// Explicit state directory (overrides discovery).
    pub state_dir: Option<Utf8PathBuf>,
    /// Generation endpoint URL override.
    pub endpoint_url: Option<String>,
    /// Generation timeout override, in seconds.
    pub timeout_secs: Option<u64>,
    /// Verbose logging.
    pub verbose: bool,
}

/// Builder for programmatic configuration.
///
/// Constructs a [`Config`] without environment or file discovery.
#[derive(Debug, Clone)]
pub struct ConfigBuilder {
    state_dir: Utf8PathBuf,
    endpoint_url: String,
    api_key_env: Option<String>,
    request_timeout: Duration,
    autosave_debounce: Duration,
    verbose: bool,
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self {
            state_dir: Utf8PathBuf::from(paths::STATE_DIR_NAME),
            endpoint_url: String::new(),
            api_key_env: None,
            request_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            autosave_debounce: Duration::from_secs(DEFAULT_AUTOSAVE_DEBOUNCE_SECS),
            verbose: false,
        }
    }
}

impl ConfigBuilder {
    #[must_use]
    pub fn state_dir(mut self, dir: impl Into<Utf8PathBuf>) -> Self {
        self.state_dir = dir.into();
        self
    }

    #[must_use]
    pub fn endpoint_url(mut self, url: impl Into<String>) -> Self {
        self.endpoint_url = url.into();
        self
    }

    #[must_use]
    pub fn api_key_env(mut self, env: impl Into<String>) -> Self {
        self.api_key_env = Some(env.into());
        self
    }

    #[must_use]
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    #[must_use]
    pub fn autosave_debounce(mut self, debounce: Duration) -> Self {
        self.autosave_debounce = debounce;
        self
    }

    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    /// Validate and build the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` when the endpoint URL is present
    /// but not http(s), or the timeout is below the minimum.
    pub fn build(self) -> Result<Config, ConfigError> {
        if !self.endpoint_url.is_empty()
            && !self.endpoint_url.starts_with("http://")
            && !self.endpoint_url.starts_with("https://")
        {
            return Err(ConfigError::InvalidValue {
                key: "generation.endpoint_url".to_string(),
                reason: format!("'{}' is not an http(s) URL", self.endpoint_url),
            });
        }

        if self.request_timeout < Duration::from_secs(MIN_TIMEOUT_SECS) {
            return Err(ConfigError::InvalidValue {
                key: "generation.timeout_secs".to_string(),
                reason: format!("must be at least {MIN_TIMEOUT_SECS} seconds"),
            });
        }

        Ok(Config {
            state_dir: self.state_dir,
            endpoint_url: self.endpoint_url,
            api_key_env: self.api_key_env,
            request_timeout: self.request_timeout,
            autosave_debounce: self.autosave_debounce,
            verbose: self.verbose,
        })
    }
}

/// On-disk config file shape (`.certforge/config.toml`).
#[derive(Debug, Clone, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    generation: Option<GenerationSection>,
    #[serde(default)]
    wizard: Option<WizardSection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct GenerationSection {
    #[serde(default)]
    endpoint_url: Option<String>,
    #[serde(default)]
    api_key_env: Option<String>,
    #[serde(default)]
    timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct WizardSection {
    #[serde(default)]
    state_dir: Option<String>,
    #[serde(default)]
    autosave_debounce_secs: Option<u64>,
}

impl ConfigFile {
    fn load(path: &Utf8Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_std_path()).map_err(|e| ConfigError::Io {
            path: path.to_string(),
            source: e,
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::InvalidFile {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_defaults() {
        let config = Config::builder().build().unwrap();
        assert_eq!(config.request_timeout, Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        assert_eq!(
            config.autosave_debounce,
            Duration::from_secs(DEFAULT_AUTOSAVE_DEBOUNCE_SECS)
        );
        assert!(config.endpoint_url.is_empty());
        assert!(config.api_key_env.is_none());
    }

    #[test]
    fn test_builder_rejects_short_timeout() {
        let result = Config::builder()
            .request_timeout(Duration::from_secs(1))
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_builder_rejects_non_http_endpoint() {
        let result = Config::builder().endpoint_url("ftp://reports.test").build();
        assert!(result.is_err());
    }

    #[test]
    fn test_config_file_parse() {
        let file: ConfigFile = toml::from_str(
            r#"
            [generation]
            endpoint_url = "https://reports.example.test/generate"
            api_key_env = "CERTFORGE_API_KEY"
            timeout_secs = 120

            [wizard]
            autosave_debounce_secs = 3
            "#,
        )
        .unwrap();

        let generation = file.generation.unwrap();
        assert_eq!(
            generation.endpoint_url.as_deref(),
            Some("https://reports.example.test/generate")
        );
        assert_eq!(generation.timeout_secs, Some(120));
        assert_eq!(file.wizard.unwrap().autosave_debounce_secs, Some(3));
    }

    #[test]
    fn test_config_file_rejects_unparseable_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = Utf8PathBuf::from_path_buf(dir.path().join("config.toml")).unwrap();
        std::fs::write(path.as_std_path(), "generation = not toml").unwrap();

        assert!(ConfigFile::load(&path).is_err());
    }
}
