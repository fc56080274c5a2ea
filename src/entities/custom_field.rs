use serde::{Deserialize, Serialize};

use super::general::{is_zero, null_as_default};
use super::Record;
use crate::api::{Client, ListResult, QueryFilter, Result};

/// A user-defined field. Its value type depends on `field_type`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct CustomField {
    #[serde(alias = "id", skip_serializing_if = "is_zero")]
    pub id: i32,
    #[serde(rename = "Type", alias = "type", skip_serializing_if = "Option::is_none")]
    pub field_type: Option<String>,
    #[serde(
        alias = "name",
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub name: String,
    #[serde(alias = "value", skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

impl Record for CustomField {}

impl Client {
    /// All custom field definitions.
    pub async fn custom_fields(&self, filters: &[QueryFilter]) -> ListResult<CustomField> {
        self.list("CustomField", true, filters).await
    }

    /// The custom field named `name`.
    pub async fn custom_field(&self, name: &str) -> Result<CustomField> {
        self.debug_log(format_args!(
            "[targetprocess] attempting to get CustomField: {}",
            name
        ));
        self.find_by_name("CustomField", name, &[]).await
    }
}
