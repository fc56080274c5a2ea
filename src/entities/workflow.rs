use serde::{Deserialize, Serialize};

use super::general::{is_zero, null_as_default};
use super::{Process, Record};
use crate::api::{Client, ListResult, QueryFilter};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Workflow {
    #[serde(alias = "id", skip_serializing_if = "is_zero")]
    pub id: i32,
    #[serde(
        alias = "name",
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub name: String,
    #[serde(alias = "process", skip_serializing_if = "Option::is_none")]
    pub process: Option<Box<Process>>,
}

impl Record for Workflow {}

impl Client {
    /// All workflows.
    pub async fn workflows(&self, filters: &[QueryFilter]) -> ListResult<Workflow> {
        self.list("Workflow", true, filters).await
    }
}
