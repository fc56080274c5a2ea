//! Access token handling for the Targetprocess API.
//!
//! Targetprocess authenticates with a personal access token sent as the
//! `accessToken` query parameter. Tokens can be kept in the OS keyring,
//! keyed by account name.

use std::fmt;

use super::error::{ApiError, Result};

/// The keyring service name for Targetprocess tokens.
const KEYRING_SERVICE: &str = "targetprocess";

/// Query parameter carrying the token.
pub(crate) const ACCESS_TOKEN_PARAM: &str = "accessToken";

/// A user access token.
///
/// See <https://dev.targetprocess.com/docs/authentication#token-authentication>.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    /// Load the token stored for `account` in the OS keyring.
    ///
    /// # Errors
    ///
    /// Returns an error if the token cannot be retrieved from the keyring.
    pub fn from_keyring(account: &str) -> Result<Self> {
        get_token(account).map(Self)
    }

    /// The raw token, for the query string.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AccessToken(***)")
    }
}

/// Store an access token in the OS keyring.
///
/// # Errors
///
/// Returns an error if the token cannot be stored in the keyring.
pub fn store_token(account: &str, token: &str) -> Result<()> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, account)
        .map_err(|e| ApiError::Keyring(format!("failed to create keyring entry: {}", e)))?;

    entry
        .set_password(token)
        .map_err(|e| ApiError::Keyring(format!("failed to store token: {}", e)))?;

    Ok(())
}

/// Retrieve an access token from the OS keyring.
///
/// # Errors
///
/// Returns an error if the token cannot be retrieved from the keyring.
pub fn get_token(account: &str) -> Result<String> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, account)
        .map_err(|e| ApiError::Keyring(format!("failed to access keyring: {}", e)))?;

    entry
        .get_password()
        .map_err(|e| ApiError::Keyring(format!("failed to retrieve token: {}", e)))
}

/// Delete an access token from the OS keyring.
///
/// # Errors
///
/// Returns an error if the token cannot be deleted from the keyring.
pub fn delete_token(account: &str) -> Result<()> {
    let entry = keyring::Entry::new(KEYRING_SERVICE, account)
        .map_err(|e| ApiError::Keyring(format!("failed to access keyring: {}", e)))?;

    entry
        .delete_password()
        .map_err(|e| ApiError::Keyring(format!("failed to delete token: {}", e)))?;

    Ok(())
}

/// Check if a token exists in the OS keyring for an account.
pub fn has_token(account: &str) -> bool {
    get_token(account).is_ok()
}
