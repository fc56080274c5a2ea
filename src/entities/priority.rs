use serde::{Deserialize, Serialize};

use super::general::{is_zero, null_as_default};
use super::Record;
use crate::api::filters::where_clause;
use crate::api::{Client, ListResult, QueryFilter, Result};

/// Importance level, defined separately for each assignable entity type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Priority {
    #[serde(alias = "id", skip_serializing_if = "is_zero")]
    pub id: i32,
    #[serde(
        alias = "name",
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub name: String,
    #[serde(alias = "importance", skip_serializing_if = "Option::is_none")]
    pub importance: Option<i32>,
    #[serde(alias = "isDefault", skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
}

impl Record for Priority {}

impl Client {
    /// All priorities.
    pub async fn priorities(&self, filters: &[QueryFilter]) -> ListResult<Priority> {
        self.list("Priority", true, filters).await
    }

    /// The priority named `name` for `entity_type`, e.g. `"UserStory"`.
    pub async fn priority(&self, name: &str, entity_type: &str) -> Result<Priority> {
        self.debug_log(format_args!(
            "[targetprocess] attempting to get Priority: {}, for EntityType: {}",
            name, entity_type
        ));
        self.find_by_name(
            "Priority",
            name,
            &[where_clause([format!("EntityType.Name == '{entity_type}'")])],
        )
        .await
    }
}
