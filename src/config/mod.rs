//! Configuration management for the client.
//!
//! This module handles loading and validating the connection settings for
//! a Targetprocess account from a TOML file or the environment.

mod settings;

pub use settings::{ClientConfig, CONFIG_FILE_NAME, ENV_PREFIX};

use thiserror::Error;

/// Errors raised while loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform has no configuration directory.
    #[error("could not determine configuration directory")]
    NoConfigDir,

    /// The configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    ReadError(#[from] std::io::Error),

    /// The configuration file is not valid TOML for [`ClientConfig`].
    #[error("failed to parse configuration: {0}")]
    ParseError(#[from] toml::de::Error),

    /// An environment variable has an unusable value.
    #[error("invalid environment variable {name}: {message}")]
    EnvError { name: String, message: String },

    /// The configuration is well-formed but unusable.
    #[error("invalid configuration: {0}")]
    ValidationError(String),
}

/// Result type for configuration operations.
pub type Result<T> = std::result::Result<T, ConfigError>;
