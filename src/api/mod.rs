//! Targetprocess API transport.
//!
//! This module provides the client, query filters, pagination and error
//! types every entity accessor is built on.

pub mod auth;
mod client;
mod context;
pub mod error;
pub mod filters;
mod pagination;

pub use auth::AccessToken;
pub use client::{
    generate_url, Client, ClientBuilder, ClientRef, DEFAULT_TIMEOUT, DEFAULT_USER_AGENT,
};
pub use context::{CancelHandle, Context};
pub use error::{
    is_not_found, is_permission_denied, ApiError, ListResult, PartialPages, Result, ResultExt,
};
pub use filters::{QueryFilter, QueryParams};
pub use pagination::{collect_pages, PagedResponse};
