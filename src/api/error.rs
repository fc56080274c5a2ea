//! API error types for the Targetprocess client.

use std::fmt;

use thiserror::Error;

/// Maximum number of response body bytes kept on an HTTP error.
const MAX_ERROR_BODY_BYTES: usize = 1024;

/// Errors that can occur when interacting with the Targetprocess API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// The account name does not produce a valid base URL.
    #[error("Invalid account '{account}': {source}")]
    InvalidAccount {
        account: String,
        #[source]
        source: url::ParseError,
    },

    /// The entity type cannot be used as a URL path segment.
    #[error("Error parsing entity type: {0}")]
    InvalidEntityType(String),

    /// A pagination link could not be parsed.
    #[error("Invalid Next URL: {url}")]
    InvalidNextUrl {
        url: String,
        #[source]
        source: Option<url::ParseError>,
    },

    /// A query filter refused the parameter set.
    #[error("Error running query filter: {0}")]
    Filter(String),

    /// Network-level failure (DNS, connection refused, timeout).
    #[error("HTTP request failure on {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The server answered with a non-2xx status.
    #[error("HTTP request failure on {entity_type}:\n{status}: {body}")]
    Http {
        entity_type: String,
        status: u16,
        body: String,
    },

    /// The response body did not decode into the requested type.
    #[error("JSON decode failed on {entity_type}: {source}\n{body}")]
    Decode {
        entity_type: String,
        body: String,
        #[source]
        source: serde_json::Error,
    },

    /// A record could not be encoded for a POST body.
    #[error("error marshaling POST body for {entity}: {source}")]
    Encode {
        entity: String,
        #[source]
        source: serde_json::Error,
    },

    /// A lookup by name matched nothing.
    ///
    /// The API answers such queries with 200 and an empty list, so this is
    /// distinct from an HTTP 404.
    #[error("no {entity_type} found with the name '{name}'")]
    EntityNotFound { entity_type: String, name: String },

    /// A lookup expected exactly one match.
    #[error("expected exactly one {entity_type}, got {count}")]
    UnexpectedCount { entity_type: String, count: usize },

    /// The request was aborted through its context.
    #[error("request cancelled")]
    Cancelled,

    /// The context deadline passed before the request finished.
    #[error("request deadline exceeded")]
    DeadlineExceeded,

    /// The record is not attached to a live client.
    #[error("record is not attached to a client")]
    Detached,

    /// Keyring error when storing/retrieving tokens.
    #[error("Keyring error: {0}")]
    Keyring(String),

    /// A lower-level error with a description of what was being attempted.
    #[error("{message}: {source}")]
    Context {
        message: String,
        #[source]
        source: Box<ApiError>,
    },
}

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;

impl ApiError {
    /// Build an HTTP error from a status and a raw response body.
    ///
    /// The body is truncated so a large HTML error page doesn't end up in
    /// every log line.
    pub fn from_response(entity_type: &str, status: u16, body: &[u8]) -> Self {
        let text = String::from_utf8_lossy(body);
        ApiError::Http {
            entity_type: entity_type.to_string(),
            status,
            body: truncate(&text, MAX_ERROR_BODY_BYTES).to_string(),
        }
    }

    /// Wrap an error with a message describing the failed operation.
    pub fn context(message: impl fmt::Display, source: ApiError) -> Self {
        ApiError::Context {
            message: message.to_string(),
            source: Box::new(source),
        }
    }

    /// The HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            ApiError::Context { source, .. } => source.status(),
            _ => None,
        }
    }

    /// True when the server answered 404.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// True when the server answered 401.
    pub fn is_permission_denied(&self) -> bool {
        self.status() == Some(401)
    }

    /// True when a lookup by name matched nothing.
    pub fn is_entity_not_found(&self) -> bool {
        match self {
            ApiError::EntityNotFound { .. } => true,
            ApiError::Context { source, .. } => source.is_entity_not_found(),
            _ => false,
        }
    }
}

/// Returns true if the error is an HTTP 404.
pub fn is_not_found(err: &ApiError) -> bool {
    err.is_not_found()
}

/// Returns true if the error is an HTTP 401.
pub fn is_permission_denied(err: &ApiError) -> bool {
    err.is_permission_denied()
}

/// Extension for attaching context to API results.
pub trait ResultExt<T> {
    /// Wrap the error (if any) with a lazily built message.
    fn context_with<M, F>(self, f: F) -> Result<T>
    where
        M: fmt::Display,
        F: FnOnce() -> M;
}

impl<T> ResultExt<T> for Result<T> {
    fn context_with<M, F>(self, f: F) -> Result<T>
    where
        M: fmt::Display,
        F: FnOnce() -> M,
    {
        self.map_err(|e| ApiError::context(f(), e))
    }
}

/// Cut `s` to at most `max` bytes on a char boundary.
fn truncate(s: &str, max: usize) -> &str {
    if s.len() <= max {
        return s;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Items gathered before a paginated listing failed.
///
/// A failing first fetch yields an empty `items`.
#[derive(Debug)]
pub struct PartialPages<T> {
    /// Items from every page fetched before the failure.
    pub items: Vec<T>,
    /// The error that stopped the walk.
    pub source: ApiError,
}

impl<T> PartialPages<T> {
    /// A failure with no items collected.
    pub fn empty(source: ApiError) -> Self {
        Self {
            items: Vec::new(),
            source,
        }
    }

    /// Drop the partial items and keep the error.
    pub fn into_error(self) -> ApiError {
        self.source
    }

    /// Wrap the underlying error with a message.
    pub fn context(self, message: impl fmt::Display) -> Self {
        Self {
            items: self.items,
            source: ApiError::context(message, self.source),
        }
    }
}

impl<T> fmt::Display for PartialPages<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "listing stopped after {} items: {}",
            self.items.len(),
            self.source
        )
    }
}

impl<T: fmt::Debug> std::error::Error for PartialPages<T> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.source)
    }
}

impl<T> From<PartialPages<T>> for ApiError {
    fn from(partial: PartialPages<T>) -> Self {
        partial.source
    }
}

/// Result of a paginated listing.
pub type ListResult<T> = std::result::Result<Vec<T>, PartialPages<T>>;
