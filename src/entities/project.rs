use serde::{Deserialize, Serialize};

use super::general::{is_zero, null_as_default};
use super::{CustomField, DateTime, Feature, Process, Record, Release, UserStory};
use crate::api::filters::where_clause;
use crate::api::{ApiError, Client, ClientRef, ListResult, QueryFilter, Result};

/// A Targetprocess Project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Project {
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
    #[serde(alias = "effort", skip_serializing_if = "Option::is_none")]
    pub effort: Option<f64>,
    #[serde(alias = "effortCompleted", skip_serializing_if = "Option::is_none")]
    pub effort_completed: Option<f64>,
    #[serde(alias = "effortToDo", skip_serializing_if = "Option::is_none")]
    pub effort_to_do: Option<f64>,
    #[serde(alias = "isActive", skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(alias = "abbreviation", skip_serializing_if = "Option::is_none")]
    pub abbreviation: Option<String>,
    #[serde(alias = "color", skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(alias = "process", skip_serializing_if = "Option::is_none")]
    pub process: Option<Box<Process>>,
}

impl Record for Project {
    fn attach(&mut self, client: &ClientRef) {
        self.client = client.clone();
    }
}

impl Client {
    /// All projects.
    pub async fn projects(&self, filters: &[QueryFilter]) -> ListResult<Project> {
        self.list("Project", true, filters).await
    }

    /// The project named `name`. If several share the name, the first one
    /// is returned.
    pub async fn project(&self, name: &str) -> Result<Project> {
        self.find_by_name("Project", name, &[]).await
    }
}

impl Project {
    /// A new, unsaved feature in this project.
    pub fn new_feature(&self, name: impl Into<String>, description: impl Into<String>) -> Feature {
        Feature {
            client: self.client.clone(),
            name: name.into(),
            description: Some(description.into()),
            project: Some(Box::new(self.clone())),
            ..Feature::default()
        }
    }

    /// A new, unsaved user story in this project for the team named `team`.
    pub async fn new_user_story(
        &self,
        name: impl Into<String>,
        description: impl Into<String>,
        team: &str,
    ) -> Result<UserStory> {
        let client = self.client.client()?;
        client.debug_log(format_args!("[targetprocess] Attempting to Get Team: {}", team));
        let team = client.team(team).await?;

        Ok(UserStory {
            client: self.client.clone(),
            name: name.into(),
            description: Some(description.into()),
            project: Some(Box::new(self.clone())),
            team: Some(Box::new(team)),
            ..UserStory::default()
        })
    }

    /// The process this project follows, fetched in full.
    ///
    /// # Errors
    ///
    /// [`ApiError::UnexpectedCount`] unless exactly one process matches.
    pub async fn process(&self) -> Result<Process> {
        let client = self.client.client()?;
        let Some(id) = self.process.as_ref().map(|p| p.id) else {
            return Err(ApiError::UnexpectedCount {
                entity_type: "Process".to_string(),
                count: 0,
            });
        };

        let mut processes = client
            .processes(&[where_clause([format!("Id == {id}")])])
            .await?;
        if processes.len() != 1 {
            return Err(ApiError::UnexpectedCount {
                entity_type: "Process".to_string(),
                count: processes.len(),
            });
        }
        Ok(processes.remove(0))
    }

    /// The release named `name` in this project.
    pub async fn release(&self, name: &str) -> Result<Release> {
        let client = self.client.client()?;
        client.release_in_project(self, name).await
    }

    pub fn client(&self) -> &ClientRef {
        &self.client
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MOCK_PROJECT: &str = r#"{
        "ResourceType": "Project",
        "Id": 2,
        "Name": "MockProject2",
        "Description": null,
        "StartDate": null,
        "CreateDate": "/Date(1599065469000-0500)/",
        "NumericPriority": 2.0,
        "CustomFields": null,
        "IsActive": true,
        "Abbreviation": "MP2",
        "Color": null,
        "Process": {"ResourceType": "Process", "Id": 2}
    }"#;

    #[test]
    fn test_decode_tolerates_nulls() {
        let project: Project = serde_json::from_str(MOCK_PROJECT).unwrap();
        assert_eq!(project.id, 2);
        assert_eq!(project.name, "MockProject2");
        assert_eq!(project.description, None);
        assert!(project.custom_fields.is_empty());
        assert_eq!(project.is_active, Some(true));
        assert_eq!(project.process.as_ref().map(|p| p.id), Some(2));
        assert!(!project.client.is_attached());
    }

    #[test]
    fn test_encode_skips_unset_fields() {
        let project = Project {
            id: 2,
            name: "MockProject2".to_string(),
            ..Project::default()
        };
        let json = serde_json::to_value(&project).unwrap();
        assert_eq!(json, serde_json::json!({"Id": 2, "Name": "MockProject2"}));
    }

    #[test]
    fn test_new_feature_links_project() {
        let project = Project {
            id: 1,
            name: "MockProject1".to_string(),
            ..Project::default()
        };
        let feature = project.new_feature("Checkout", "Pay for things");
        assert_eq!(feature.name, "Checkout");
        assert_eq!(feature.project.as_deref(), Some(&project));
    }

    #[tokio::test]
    async fn test_detached_project_cannot_fetch() {
        let err = Project::default().release("1.0").await.unwrap_err();
        assert!(matches!(err, ApiError::Detached));
    }
}
