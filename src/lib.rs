//! A typed client for the Targetprocess REST API.
//!
//! Entities (projects, teams, bugs, user stories, ...) are fetched with
//! accessors on [`Client`], narrowed with composable [`QueryFilter`]s and
//! paged transparently.
//!
//! ```no_run
//! use targetprocess::filters::{include, where_clause};
//! use targetprocess::Client;
//!
//! # async fn run() -> targetprocess::Result<()> {
//! let client = Client::new("exampleCompany", "superSecretToken")?;
//! let stories = client
//!     .user_stories(
//!         true,
//!         &[
//!             // Any predicate the API accepts, see
//!             // https://dev.targetprocess.com/docs/sorting-and-filters
//!             where_clause(["EntityState.Name != 'Done'"]),
//!             where_clause(["EntityState.Name != 'Backlog'"]),
//!             include(["Team", "Name", "ModifyDate"]),
//!         ],
//!     )
//!     .await?;
//! println!("{} open stories", stories.len());
//! # Ok(())
//! # }
//! ```
//!
//! Shapes without a built-in record can be decoded with [`Client::get`]
//! into any `serde` type.
//!
//! Debug output goes to an optional [`logging::Logger`];
//! [`logging::TracingLogger`] forwards it to `tracing`.

pub mod api;
pub mod config;
pub mod entities;
pub mod error;
pub mod logging;

pub use api::{
    filters, generate_url, is_not_found, is_permission_denied, AccessToken, ApiError,
    CancelHandle, Client, ClientBuilder, ClientRef, Context, ListResult, PagedResponse,
    PartialPages, QueryFilter, QueryParams,
};
pub use config::{ClientConfig, ConfigError};
pub use entities::{
    AssignedTeams, AssignedUser, Assignment, Assignments, Bug, BugList, CreatedEntity,
    CustomField, DateTime, EntityState, Feature, Priority, Process, Project, Record, Release,
    Team, TeamAssignment, User, UserStory, UserStoryList, Workflow,
};
pub use error::{Error, Result};
