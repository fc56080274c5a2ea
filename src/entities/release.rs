use serde::{Deserialize, Serialize};

use super::general::{is_zero, null_as_default};
use super::{CreatedEntity, CustomField, Project, Record, UserStory};
use crate::api::filters::where_clause;
use crate::api::{Client, ClientRef, ListResult, QueryFilter, Result, ResultExt};

/// A Targetprocess Release.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Release {
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
    #[serde(alias = "numericPriority", skip_serializing_if = "Option::is_none")]
    pub numeric_priority: Option<f64>,
    #[serde(
        alias = "customFields",
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub custom_fields: Vec<CustomField>,
    #[serde(alias = "project", skip_serializing_if = "Option::is_none")]
    pub project: Option<Box<Project>>,
}

impl Record for Release {
    fn attach(&mut self, client: &ClientRef) {
        self.client = client.clone();
    }
}

impl Client {
    /// All releases.
    pub async fn releases(&self, filters: &[QueryFilter]) -> ListResult<Release> {
        self.list("Release", true, filters).await
    }

    /// The release named `name` in the project named `project_name`.
    pub async fn release(&self, project_name: &str, name: &str) -> Result<Release> {
        self.debug_log(format_args!(
            "[targetprocess] Attempting to Get Project: {}",
            project_name
        ));
        let project = self.project(project_name).await.context_with(|| {
            format!("error getting release with name '{name}' for project '{project_name}'")
        })?;
        self.release_in_project(&project, name).await
    }

    pub(crate) async fn release_in_project(&self, project: &Project, name: &str) -> Result<Release> {
        self.debug_log(format_args!(
            "[targetprocess] Attempting to Get Release: {}, for Project: {}",
            name, project.name
        ));
        self.find_by_name(
            "Release",
            name,
            &[where_clause([format!("Project.Id == {}", project.id)])],
        )
        .await
    }
}

impl Release {
    /// A new, unsaved release in the project named `project`.
    pub async fn new(
        client: &Client,
        name: impl Into<String>,
        description: impl Into<String>,
        project: &str,
    ) -> Result<Self> {
        client.debug_log(format_args!(
            "[targetprocess] Attempting to Get Project: {}",
            project
        ));
        let project = client.project(project).await?;
        Ok(Self {
            client: client.downgrade(),
            name: name.into(),
            description: Some(description.into()),
            project: Some(Box::new(project)),
            ..Self::default()
        })
    }

    /// A new, unsaved user story in this release and the project named
    /// `project`.
    pub async fn new_user_story(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
        project: &str,
    ) -> Result<UserStory> {
        let client = self.client.client()?;
        let mut story = UserStory::new(&client, name, description, project).await?;
        story.release = Some(Box::new(self.clone()));
        Ok(story)
    }

    /// Create this release.
    pub async fn create(&self) -> Result<CreatedEntity> {
        let client = self.client.client()?;
        client.create_entity("Release", &self.name, self).await
    }
}
