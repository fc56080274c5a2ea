use serde::{Deserialize, Serialize};

use super::general::{is_zero, null_as_default};
use super::{
    AssignedUser, Assignment, Assignments, CreatedEntity, CustomField, DateTime, EntityState,
    Feature, Priority, Project, Record, Release, Team, TeamAssignment,
};
use crate::api::{Client, ClientRef, ListResult, QueryFilter, Result};

/// A Targetprocess Bug.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Bug {
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
    #[serde(alias = "assignments", skip_serializing_if = "Option::is_none")]
    pub assignments: Option<Assignments>,
    #[serde(alias = "responsibleTeam", skip_serializing_if = "Option::is_none")]
    pub responsible_team: Option<TeamAssignment>,
    #[serde(alias = "team", skip_serializing_if = "Option::is_none")]
    pub team: Option<Box<Team>>,
    #[serde(alias = "priority", skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    #[serde(alias = "entityState", skip_serializing_if = "Option::is_none")]
    pub entity_state: Option<Box<EntityState>>,
    #[serde(alias = "assignedUser", skip_serializing_if = "Option::is_none")]
    pub assigned_user: Option<AssignedUser>,
    #[serde(alias = "feature", skip_serializing_if = "Option::is_none")]
    pub feature: Option<Box<Feature>>,
    #[serde(alias = "release", skip_serializing_if = "Option::is_none")]
    pub release: Option<Box<Release>>,
}

impl Record for Bug {
    fn attach(&mut self, client: &ClientRef) {
        self.client = client.clone();
    }
}

/// Bugs created together through `Bugs/bulk`.
#[derive(Debug, Clone, Default)]
pub struct BugList {
    client: ClientRef,
    pub bugs: Vec<Bug>,
}

impl Client {
    /// Bugs, following every `Next` link when `page` is set.
    ///
    /// With many bugs, pair with [`crate::filters::max_per_page`] to keep
    /// the number of requests down.
    pub async fn bugs(&self, page: bool, filters: &[QueryFilter]) -> ListResult<Bug> {
        self.list("Bugs", page, filters).await
    }

    /// Group `bugs` for a single bulk create.
    pub fn new_bug_list(&self, bugs: Vec<Bug>) -> BugList {
        BugList {
            client: self.downgrade(),
            bugs,
        }
    }
}

impl Bug {
    /// A new, unsaved bug in the project named `project`.
    pub async fn new(
        client: &Client,
        name: impl Into<String>,
        description: impl Into<String>,
        project: &str,
    ) -> Result<Self> {
        let mut bug = Self {
            client: client.downgrade(),
            name: name.into(),
            description: Some(description.into()),
            ..Self::default()
        };
        bug.set_project(project).await?;
        Ok(bug)
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
        client.debug_log(format_args!(
            "[targetprocess] Attempting to Get Feature: {}",
            feature
        ));
        self.feature = Some(Box::new(client.feature(feature).await?));
        Ok(())
    }

    /// Look up the Bug priority named `priority` and assign it.
    pub async fn set_priority(&mut self, priority: &str) -> Result<()> {
        let client = self.client.client()?;
        self.priority = Some(client.priority(priority, "Bug").await?);
        Ok(())
    }

    /// Assign the release named `release`, looked up in this bug's project
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

    /// Assign the bug to the user with `user_id`.
    pub fn set_assigned_user_id(&mut self, user_id: i32) {
        self.assignments = Some(Assignments {
            items: vec![Assignment::user(user_id)],
        });
    }

    /// Create this bug.
    pub async fn create(&self) -> Result<CreatedEntity> {
        let client = self.client.client()?;
        client.create_entity("Bug", &self.name, self).await
    }
}

impl BugList {
    /// Create every bug in one request.
    pub async fn create(&self) -> Result<Vec<CreatedEntity>> {
        let client = self.client.client()?;
        client.create_bulk("Bugs", &self.bugs).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_bug_relations() {
        let bug: Bug = serde_json::from_str(
            r#"{
                "Id": 501,
                "Name": "Crash on save",
                "Project": {"Id": 1, "Name": "MockProject1"},
                "ResponsibleTeam": {"Id": 12, "Team": {"Id": 1, "Name": "MockTeam1"}},
                "EntityState": {"Id": 3, "Name": "Open", "IsInitial": true},
                "AssignedUser": {"Items": [{"Id": 9, "Login": "jane"}]},
                "Release": null
            }"#,
        )
        .unwrap();
        assert_eq!(bug.responsible_team.unwrap().team.unwrap().name, "MockTeam1");
        assert_eq!(bug.entity_state.unwrap().is_initial, Some(true));
        assert_eq!(bug.assigned_user.unwrap().items[0].login.as_deref(), Some("jane"));
        assert_eq!(bug.release, None);
    }

    #[test]
    fn test_set_assigned_user_id_replaces_assignments() {
        let mut bug = Bug::default();
        bug.set_assigned_user_id(1);
        bug.set_assigned_user_id(2);
        let items = &bug.assignments.as_ref().unwrap().items;
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].general_user.as_ref().unwrap().id, 2);
    }
}
