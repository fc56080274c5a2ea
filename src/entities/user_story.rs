use serde::{Deserialize, Serialize};

use super::general::{is_zero, null_as_default};
use super::{
    AssignedTeams, Assignment, Assignments, CreatedEntity, CustomField, DateTime, EntityState,
    Feature, Priority, Project, Record, Release, Team,
};
use crate::api::{Client, ClientRef, ListResult, QueryFilter, Result};

/// A Targetprocess UserStory.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct UserStory {
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
    #[serde(alias = "progress", skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,
    #[serde(alias = "timeSpent", skip_serializing_if = "Option::is_none")]
    pub time_spent: Option<f64>,
    #[serde(alias = "timeRemain", skip_serializing_if = "Option::is_none")]
    pub time_remain: Option<f64>,
    #[serde(alias = "lastStateChangeDate", skip_serializing_if = "Option::is_none")]
    pub last_state_change_date: Option<DateTime>,
    #[serde(alias = "initialEstimate", skip_serializing_if = "Option::is_none")]
    pub initial_estimate: Option<f64>,
    #[serde(alias = "project", skip_serializing_if = "Option::is_none")]
    pub project: Option<Box<Project>>,
    /// Deprecated upstream in favour of `assigned_teams`.
    #[serde(alias = "team", skip_serializing_if = "Option::is_none")]
    pub team: Option<Box<Team>>,
    #[serde(alias = "assignedTeams", skip_serializing_if = "Option::is_none")]
    pub assigned_teams: Option<AssignedTeams>,
    #[serde(alias = "assignments", skip_serializing_if = "Option::is_none")]
    pub assignments: Option<Assignments>,
    #[serde(alias = "priority", skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(alias = "entityState", skip_serializing_if = "Option::is_none")]
    pub entity_state: Option<Box<EntityState>>,
    #[serde(alias = "feature", skip_serializing_if = "Option::is_none")]
    pub feature: Option<Box<Feature>>,
    #[serde(alias = "release", skip_serializing_if = "Option::is_none")]
    pub release: Option<Box<Release>>,
}

impl Record for UserStory {
    fn attach(&mut self, client: &ClientRef) {
        self.client = client.clone();
    }
}

/// User stories created together through `UserStories/bulk`.
#[derive(Debug, Clone, Default)]
pub struct UserStoryList {
    client: ClientRef,
    pub stories: Vec<UserStory>,
}

impl Client {
    /// User stories, following every `Next` link when `page` is set.
    ///
    /// Accounts with many stories take many requests; raise the page size
    /// with [`crate::filters::max_per_page`] or pass `page = false`.
    pub async fn user_stories(&self, page: bool, filters: &[QueryFilter]) -> ListResult<UserStory> {
        self.list("UserStories", page, filters).await
    }

    /// Group `stories` for a single bulk create.
    pub fn new_user_story_list(&self, stories: Vec<UserStory>) -> UserStoryList {
        UserStoryList {
            client: self.downgrade(),
            stories,
        }
    }
}

impl UserStory {
    /// A new, unsaved user story in the project named `project`.
    ///
    /// Set further relations with the `set_*` methods before calling
    /// [`UserStory::create`].
    pub async fn new(
        client: &Client,
        name: impl Into<String>,
        description: impl Into<String>,
        project: &str,
    ) -> Result<Self> {
        let mut story = Self {
            client: client.downgrade(),
            name: name.into(),
            description: Some(description.into()),
            ..Self::default()
        };
        story.set_project(project).await?;
        Ok(story)
    }

    pub async fn set_project(&mut self, project: &str) -> Result<()> {
        let client = self.client.client()?;
        client.debug_log(format_args!(
            "[targetprocess] Attempting to Get Project: {}",
            project
        ));
        self.project = Some(Box::new(client.project(project).await?));
        Ok(())
    }

    pub async fn set_team(&mut self, team: &str) -> Result<()> {
        let client = self.client.client()?;
        client.debug_log(format_args!("[targetprocess] Attempting to Get Team: {}", team));
        self.team = Some(Box::new(client.team(team).await?));
        Ok(())
    }

    pub async fn set_feature(&mut self, feature: &str) -> Result<()> {
        let client = self.client.client()?;
        self.feature = Some(Box::new(client.feature(feature).await?));
        Ok(())
    }

    /// Look up the UserStory priority named `priority` and assign it.
    pub async fn set_priority(&mut self, priority: &str) -> Result<()> {
        let client = self.client.client()?;
        self.priority = Some(client.priority(priority, "UserStory").await?);
        Ok(())
    }

    /// Assign the release named `release`, looked up in this story's project
    /// when one is set.
    pub async fn set_release(&mut self, release: &str) -> Result<()> {
        let client = self.client.client()?;
        let release = match &self.project {
            Some(project) => client.release_in_project(project, release).await?,
            None => client.find_by_name("Release", release, &[]).await?,
        };
        self.release = Some(Box::new(release));
        Ok(())
    }

    /// Assign the story to the user with `user_id`, replacing any other
    /// assignment.
    pub fn set_assigned_user_id(&mut self, user_id: i32) {
        self.assignments = Some(Assignments {
            items: vec![Assignment::user(user_id)],
        });
    }

    /// Create this user story.
    pub async fn create(&self) -> Result<CreatedEntity> {
        let client = self.client.client()?;
        client.create_entity("UserStory", &self.name, self).await
    }
}

impl UserStoryList {
    /// Create every story in one request.
    pub async fn create(&self) -> Result<Vec<CreatedEntity>> {
        let client = self.client.client()?;
        client.create_bulk("UserStories", &self.stories).await
    }
}
