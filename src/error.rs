//! Crate-level error type.
//!
//! Aggregates the API and configuration errors for callers that use both
//! halves of the crate. All error types use `thiserror`.

use thiserror::Error;

use crate::api::error::ApiError;
use crate::config::ConfigError;

/// Any error produced by this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration-related errors.
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// API-related errors.
    #[error("{0}")]
    Api(#[from] ApiError),
}

impl Error {
    /// True when the server answered 404.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::Api(e) if e.is_not_found())
    }

    /// True when the server answered 401.
    pub fn is_permission_denied(&self) -> bool {
        matches!(self, Error::Api(e) if e.is_permission_denied())
    }

    /// True when a lookup by name matched nothing.
    pub fn is_entity_not_found(&self) -> bool {
        matches!(self, Error::Api(e) if e.is_entity_not_found())
    }

    /// Get a suggested action for the user.
    pub fn suggested_action(&self) -> Option<&'static str> {
        match self {
            Error::Config(ConfigError::NoConfigDir) | Error::Config(ConfigError::ReadError(_)) => {
                Some("Create ~/.config/targetprocess/config.toml or set TP_ACCOUNT.")
            }
            Error::Api(e) if e.is_permission_denied() => Some(
                "Check your access token: https://dev.targetprocess.com/docs/authentication#token-authentication",
            ),
            _ => None,
        }
    }
}

impl<T> From<crate::api::PartialPages<T>> for Error {
    fn from(partial: crate::api::PartialPages<T>) -> Self {
        Error::Api(partial.into_error())
    }
}

/// Result type for crate-level operations.
pub type Result<T> = std::result::Result<T, Error>;
