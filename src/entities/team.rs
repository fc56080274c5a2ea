use serde::{Deserialize, Serialize};

use super::general::{is_zero, null_as_default};
use super::{CustomField, DateTime, Record, UserStory};
use crate::api::{Client, ClientRef, ListResult, QueryFilter, Result};

/// A Targetprocess Team.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Team {
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
    #[serde(alias = "startDate", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime>,
    #[serde(alias = "endDate", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime>,
    #[serde(alias = "createDate", skip_serializing_if = "Option::is_none")]
    pub create_date: Option<DateTime>,
    #[serde(alias = "modifyDate", skip_serializing_if = "Option::is_none")]
    pub modify_date: Option<DateTime>,
    #[serde(alias = "numericPriority", skip_serializing_if = "Option::is_none")]
    pub numeric_priority: Option<f64>,
    #[serde(
        alias = "customFields",
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub custom_fields: Vec<CustomField>,
    #[serde(alias = "abbreviation", skip_serializing_if = "Option::is_none")]
    pub abbreviation: Option<String>,
}

impl Record for Team {
    fn attach(&mut self, client: &ClientRef) {
        self.client = client.clone();
    }
}

impl Client {
    /// All teams.
    pub async fn teams(&self, filters: &[QueryFilter]) -> ListResult<Team> {
        self.list("Team", true, filters).await
    }

    /// The team named `name`.
    pub async fn team(&self, name: &str) -> Result<Team> {
        self.find_by_name("Team", name, &[]).await
    }
}

impl Team {
    /// A new, unsaved user story for this team in the project named
    /// `project`.
    pub async fn new_user_story(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
        project: &str,
    ) -> Result<UserStory> {
        let client = self.client.client()?;
        client.debug_log(format_args!(
            "[targetprocess] Attempting to Get Project: {}",
            project
        ));
        let project = client.project(project).await?;

        Ok(UserStory {
            client: self.client.clone(),
            name: name.into(),
            description: Some(description.into()),
            project: Some(Box::new(project)),
            team: Some(Box::new(self.clone())),
            ..UserStory::default()
        })
    }
}
