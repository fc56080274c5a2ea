use serde::{Deserialize, Serialize};

use super::general::{is_zero, null_as_default};
use super::{Process, Record};
use crate::api::{Client, ListResult, QueryFilter};

/// One state of an entity workflow. A Bug, for example, moves through Open,
/// Fixed, Invalid and Done by default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct EntityState {
    #[serde(alias = "id", skip_serializing_if = "is_zero")]
    pub id: i32,
    #[serde(
        alias = "name",
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub name: String,
    #[serde(alias = "numericPriority", skip_serializing_if = "Option::is_none")]
    pub numeric_priority: Option<f64>,
    #[serde(alias = "parentEntityState", skip_serializing_if = "Option::is_none")]
    pub parent_entity_state: Option<Box<EntityState>>,
    #[serde(alias = "process", skip_serializing_if = "Option::is_none")]
    pub process: Option<Box<Process>>,
    #[serde(alias = "isInitial", skip_serializing_if = "Option::is_none")]
    pub is_initial: Option<bool>,
    #[serde(alias = "isFinal", skip_serializing_if = "Option::is_none")]
    pub is_final: Option<bool>,
    #[serde(alias = "isPlanned", skip_serializing_if = "Option::is_none")]
    pub is_planned: Option<bool>,
    #[serde(alias = "isCommentRequired", skip_serializing_if = "Option::is_none")]
    pub is_comment_required: Option<bool>,
}

impl Record for EntityState {}

impl Client {
    /// All entity states.
    pub async fn entity_states(&self, filters: &[QueryFilter]) -> ListResult<EntityState> {
        self.list("EntityState", true, filters).await
    }
}
