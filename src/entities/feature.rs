use serde::{Deserialize, Serialize};

use super::general::{is_zero, null_as_default};
use super::{Project, Record};
use crate::api::{Client, ClientRef, ListResult, QueryFilter, Result};

/// A Targetprocess Feature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Feature {
    #[serde(skip)]
    pub(crate) client: ClientRef,

    #[serde(alias = "id", skip_serializing_if = "is_zero")]
    pub id: i32,
    #[serde(
        alias = "name",
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub name: String,
    #[serde(alias = "description", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(alias = "effort", skip_serializing_if = "Option::is_none")]
    pub effort: Option<f64>,
    /// Only present when requested, e.g. with `include([..., "UserStories-Count"])`.
    #[serde(
        rename = "UserStories-Count",
        alias = "userStories-Count",
        skip_serializing_if = "Option::is_none"
    )]
    pub user_stories_count: Option<f64>,
    #[serde(alias = "project", skip_serializing_if = "Option::is_none")]
    pub project: Option<Box<Project>>,
}

impl Record for Feature {
    fn attach(&mut self, client: &ClientRef) {
        self.client = client.clone();
    }
}

impl Client {
    /// All features.
    pub async fn features(&self, filters: &[QueryFilter]) -> ListResult<Feature> {
        self.list("Feature", true, filters).await
    }

    /// The feature named `name`.
    pub async fn feature(&self, name: &str) -> Result<Feature> {
        self.find_by_name("Feature", name, &[]).await
    }
}
