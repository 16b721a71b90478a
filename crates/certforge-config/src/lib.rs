//! Configuration management for certforge.
//!
//! Hierarchical configuration with discovery and precedence:
//! CLI arguments > config file > built-in defaults. The config file is
//! `.certforge/config.toml`, discovered by walking upward from the working
//! directory, with `[generation]` and `[wizard]` sections.

mod config;

pub use config::{CliArgs, Config, ConfigBuilder};
