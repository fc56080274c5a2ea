use serde::{Deserialize, Serialize};

use super::general::{is_zero, null_as_default};
use super::Record;
use crate::api::{Client, ListResult, QueryFilter};

/// A Process: the practices (workflows, terms, fields) a project follows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Process {
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
}

impl Record for Process {}

impl Client {
    /// All processes.
    pub async fn processes(&self, filters: &[QueryFilter]) -> ListResult<Process> {
        self.list("Process", true, filters).await
    }
}
