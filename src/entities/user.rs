use serde::{Deserialize, Serialize};

use super::general::is_zero;
use super::{CustomField, DateTime, Record};
use crate::api::{Client, ListResult, QueryFilter};

/// A Targetprocess User.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct User {
    #[serde(alias = "id", skip_serializing_if = "is_zero")]
    pub id: i32,
    #[serde(alias = "firstName", skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(alias = "lastName", skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(alias = "email", skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(alias = "login", skip_serializing_if = "Option::is_none")]
    pub login: Option<String>,
    #[serde(alias = "globalId", skip_serializing_if = "Option::is_none")]
    pub global_id: Option<String>,
    #[serde(alias = "locale", skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,
    #[serde(alias = "isActive", skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(alias = "isAdministrator", skip_serializing_if = "Option::is_none")]
    pub is_administrator: Option<bool>,
    #[serde(alias = "createDate", skip_serializing_if = "Option::is_none")]
    pub create_date: Option<DateTime>,
    #[serde(alias = "modifyDate", skip_serializing_if = "Option::is_none")]
    pub modify_date: Option<DateTime>,
    #[serde(alias = "deleteDate", skip_serializing_if = "Option::is_none")]
    pub delete_date: Option<DateTime>,
    #[serde(alias = "customFields", skip_serializing_if = "Option::is_none")]
    pub custom_fields: Option<Vec<CustomField>>,
}

impl Record for User {}

impl Client {
    /// All users.
    pub async fn users(&self, filters: &[QueryFilter]) -> ListResult<User> {
        self.list("User", true, filters).await
    }
}
