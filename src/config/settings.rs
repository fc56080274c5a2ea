//! Client connection settings.

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{ConfigError, Result};
use crate::api::{AccessToken, Client, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT};

/// The configuration file name.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Prefix of the environment variables read by [`ClientConfig::from_env`].
pub const ENV_PREFIX: &str = "TP_";

/// Connection settings for one Targetprocess account.
///
/// The token may be left out and stored in the OS keyring instead; see
/// [`crate::api::auth::store_token`].
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ClientConfig {
    /// The account name, as in `https://{account}.tpondemand.com`.
    pub account: String,

    /// The user access token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// `User-Agent` header. Empty disables it.
    pub user_agent: String,

    /// Origin replacing `https://{account}.tpondemand.com`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            account: String::new(),
            token: None,
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            host: None,
        }
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("account", &self.account)
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("timeout_secs", &self.timeout_secs)
            .field("user_agent", &self.user_agent)
            .field("host", &self.host)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Validate this configuration.
    ///
    /// Checks that:
    /// - The account is non-empty and has no whitespace
    /// - The timeout is positive
    /// - The host, if set, is an http(s) URL
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError::ValidationError` with details if validation fails.
    pub fn validate(&self) -> Result<()> {
        if self.account.is_empty() {
            return Err(ConfigError::ValidationError(
                "account cannot be empty".to_string(),
            ));
        }

        if self.account.contains(char::is_whitespace) {
            return Err(ConfigError::ValidationError(format!(
                "account '{}' cannot contain whitespace",
                self.account
            )));
        }

        if self.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }

        if let Some(host) = &self.host {
            if !host.starts_with("https://") && !host.starts_with("http://") {
                return Err(ConfigError::ValidationError(format!(
                    "host '{}' must start with http:// or https://",
                    host
                )));
            }
        }

        Ok(())
    }

    /// Load and validate a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML, or
    /// fails validation.
    pub fn load(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading configuration");
        let contents = std::fs::read_to_string(path)?;
        let config: ClientConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `<config dir>/targetprocess/config.toml`.
    pub fn load_default() -> Result<Self> {
        Self::load(&Self::default_path()?)
    }

    /// Platform-specific path of the default configuration file.
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("targetprocess").join(CONFIG_FILE_NAME))
            .ok_or(ConfigError::NoConfigDir)
    }

    /// Read the configuration from `TP_ACCOUNT`, `TP_TOKEN`,
    /// `TP_TIMEOUT_SECS`, `TP_USER_AGENT` and `TP_HOST`.
    ///
    /// Only `TP_ACCOUNT` is required.
    pub fn from_env() -> Result<Self> {
        let var = |name: &str| env::var(format!("{ENV_PREFIX}{name}")).ok();

        let account = var("ACCOUNT").ok_or_else(|| ConfigError::EnvError {
            name: format!("{ENV_PREFIX}ACCOUNT"),
            message: "not set".to_string(),
        })?;

        let mut config = Self::new(account);
        config.token = var("TOKEN").filter(|t| !t.is_empty());
        config.host = var("HOST").filter(|h| !h.is_empty());
        if let Some(user_agent) = var("USER_AGENT") {
            config.user_agent = user_agent;
        }
        if let Some(timeout) = var("TIMEOUT_SECS") {
            config.timeout_secs = timeout.trim().parse().map_err(|e| ConfigError::EnvError {
                name: format!("{ENV_PREFIX}TIMEOUT_SECS"),
                message: format!("'{}': {}", timeout, e),
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// The configured token, falling back to the OS keyring.
    fn resolve_token(&self) -> Option<AccessToken> {
        if let Some(token) = self.token.as_deref().filter(|t| !t.is_empty()) {
            return Some(AccessToken::new(token));
        }
        match AccessToken::from_keyring(&self.account) {
            Ok(token) => Some(token),
            Err(e) => {
                debug!(account = %self.account, error = %e, "No access token available");
                None
            }
        }
    }
}

impl Client {
    /// Build a client from validated configuration.
    ///
    /// Without a configured token, the token stored in the OS keyring for
    /// the account is used; without either, requests are unauthenticated.
    pub fn from_config(config: &ClientConfig) -> crate::Result<Self> {
        config.validate()?;

        let mut builder = Client::builder(config.account.as_str())
            .timeout(config.timeout())
            .user_agent(config.user_agent.as_str());
        if let Some(token) = config.resolve_token() {
            builder = builder.access_token(token);
        }
        if let Some(host) = &config.host {
            builder = builder.host(host.as_str());
        }

        let client = builder.build()?;
        info!(account = %config.account, "Targetprocess client configured");
        Ok(client)
    }
}
