//! Types shared by several entities.

use serde::{Deserialize, Deserializer, Serialize};

use super::team::Team;
use super::user::User;

/// A Targetprocess date as sent on the wire, e.g. `/Date(1599065504000-0500)/`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DateTime(pub String);

impl DateTime {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Milliseconds since the Unix epoch, for `/Date(ms[+-]zzzz)/` values.
    pub fn timestamp_millis(&self) -> Option<i64> {
        let inner = self.0.strip_prefix("/Date(")?.strip_suffix(")/")?;
        // The offset only says which zone the author was in.
        let end = inner
            .get(1..)?
            .find(['+', '-'])
            .map_or(inner.len(), |i| i + 1);
        inner[..end].parse().ok()
    }
}

impl From<&str> for DateTime {
    fn from(s: &str) -> Self {
        DateTime(s.to_string())
    }
}

/// Teams assigned to an assignable. Replaces the deprecated `Team` field on
/// user stories.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AssignedTeams {
    #[serde(alias = "items")]
    pub items: Vec<TeamAssignment>,
}

/// One team assignment. Has its own Id besides the team's.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct TeamAssignment {
    #[serde(alias = "id", skip_serializing_if = "is_zero")]
    pub id: i32,
    #[serde(alias = "startDate", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<DateTime>,
    #[serde(alias = "endDate", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<DateTime>,
    #[serde(alias = "team", skip_serializing_if = "Option::is_none")]
    pub team: Option<Box<Team>>,
}

/// People assigned to an assignable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Assignments {
    #[serde(alias = "items")]
    pub items: Vec<Assignment>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct Assignment {
    #[serde(alias = "id", skip_serializing_if = "is_zero")]
    pub id: i32,
    #[serde(alias = "generalUser", skip_serializing_if = "Option::is_none")]
    pub general_user: Option<User>,
}

impl Assignment {
    /// Assign the user with `user_id`.
    pub fn user(user_id: i32) -> Self {
        Self {
            id: 0,
            general_user: Some(User {
                id: user_id,
                ..User::default()
            }),
        }
    }
}

/// Users assigned to an assignable, as returned by v1.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AssignedUser {
    #[serde(alias = "items")]
    pub items: Vec<User>,
}

pub(crate) fn is_zero(n: &i32) -> bool {
    *n == 0
}

/// Decode `null` as the type's default.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}
