//! Typed records for Targetprocess entities and their accessors.
//!
//! Every accessor is a thin layer over [`Client::get`], [`Client::post`] and
//! [`collect_pages`]. Records returned by an accessor carry a
//! [`ClientRef`] so follow-up calls (setting a relation by name, creating)
//! can be made on the record itself.
//!
//! Records are written with the PascalCase keys of the v1 API and also read
//! the camelCase keys the v2 API answers with.

mod bug;
mod custom_field;
mod entity_state;
mod feature;
mod general;
mod priority;
mod process;
mod project;
mod release;
mod team;
mod user;
mod user_story;
mod workflow;

pub use bug::{Bug, BugList};
pub use custom_field::CustomField;
pub use entity_state::EntityState;
pub use feature::Feature;
pub use general::{AssignedTeams, AssignedUser, Assignment, Assignments, DateTime, TeamAssignment};
pub use priority::Priority;
pub use process::Process;
pub use project::Project;
pub use release::Release;
pub use team::Team;
pub use user::User;
pub use user_story::{UserStory, UserStoryList};
pub use workflow::Workflow;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::api::filters::{first, where_clause};
use crate::api::{
    collect_pages, generate_url, ApiError, Client, ClientRef, ListResult, PagedResponse,
    PartialPages, QueryFilter, Result, ResultExt,
};

/// A record decoded from a list or lookup response.
pub trait Record: DeserializeOwned {
    /// Remember the client the record came from. Records without follow-up
    /// operations ignore it.
    fn attach(&mut self, _client: &ClientRef) {}
}

/// Identifier and browser link of a newly created entity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedEntity {
    pub id: i32,
    pub link: String,
}

impl CreatedEntity {
    fn new(account: &str, id: i32) -> Self {
        Self {
            id,
            link: generate_url(account, id),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreatedId {
    #[serde(rename = "Id", alias = "id")]
    id: i32,
}

/// Bulk endpoints answer with an envelope; some deployments send the bare
/// array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BulkResponse {
    Ids(Vec<CreatedId>),
    Envelope(PagedResponse<CreatedId>),
}

impl BulkResponse {
    fn into_ids(self) -> Vec<i32> {
        let items = match self {
            BulkResponse::Ids(items) => items,
            BulkResponse::Envelope(page) => page.items,
        };
        items.into_iter().map(|created| created.id).collect()
    }
}

/// `Name == '{name}'`. Names are passed through verbatim.
pub(crate) fn name_is(name: &str) -> String {
    format!("Name == '{name}'")
}

impl Client {
    /// List `entity_type`, following `Next` links when `page` is set.
    pub(crate) async fn list<T: Record>(
        &self,
        entity_type: &str,
        page: bool,
        filters: &[QueryFilter],
    ) -> ListResult<T> {
        let first_page: PagedResponse<T> = self
            .get(entity_type, None, filters)
            .await
            .map_err(PartialPages::empty)?;

        let handle = self.downgrade();
        let stamp = |items: Vec<T>| -> Vec<T> {
            items
                .into_iter()
                .map(|mut record| {
                    record.attach(&handle);
                    record
                })
                .collect()
        };

        match collect_pages(self, first_page, page).await {
            Ok(items) => Ok(stamp(items)),
            Err(PartialPages { items, source }) => Err(PartialPages {
                items: stamp(items),
                source,
            }),
        }
    }

    /// The first `entity_type` named `name` that also matches `filters`.
    ///
    /// No match is [`ApiError::EntityNotFound`].
    pub(crate) async fn find_by_name<T: Record>(
        &self,
        entity_type: &str,
        name: &str,
        filters: &[QueryFilter],
    ) -> Result<T> {
        let mut all = Vec::with_capacity(filters.len() + 2);
        all.push(where_clause([name_is(name)]));
        all.extend_from_slice(filters);
        all.push(first());

        let response: PagedResponse<T> = self
            .get(entity_type, None, &all)
            .await
            .context_with(|| format!("error getting {entity_type} with name '{name}'"))?;

        let mut record = response
            .items
            .into_iter()
            .next()
            .ok_or_else(|| ApiError::EntityNotFound {
                entity_type: entity_type.to_string(),
                name: name.to_string(),
            })?;
        record.attach(&self.downgrade());
        Ok(record)
    }

    /// POST `record` to the singular `entity_type` endpoint.
    pub(crate) async fn create_entity<R: Serialize>(
        &self,
        entity_type: &str,
        name: &str,
        record: &R,
    ) -> Result<CreatedEntity> {
        let body = serde_json::to_vec(record).map_err(|source| ApiError::Encode {
            entity: format!("{entity_type} {name}"),
            source,
        })?;

        self.debug_log(format_args!(
            "[targetprocess] Attempting to POST {}: {}",
            entity_type, name
        ));
        let created: CreatedId = self
            .post(entity_type, None, body)
            .await
            .context_with(|| format!("error POSTing {entity_type} {name}"))?;
        self.info_log(format_args!(
            "[targetprocess] {} created. ID: {}",
            entity_type, created.id
        ));

        Ok(CreatedEntity::new(self.account(), created.id))
    }

    /// POST `records` as one array to a `/bulk` endpoint.
    pub(crate) async fn create_bulk<R: Serialize>(
        &self,
        entity_type: &str,
        records: &[R],
    ) -> Result<Vec<CreatedEntity>> {
        let endpoint = format!("{entity_type}/bulk");
        let body = serde_json::to_vec(records).map_err(|source| ApiError::Encode {
            entity: endpoint.clone(),
            source,
        })?;

        self.debug_log(format_args!(
            "[targetprocess] Attempting to POST {} {}",
            records.len(),
            entity_type
        ));
        let response: BulkResponse = self
            .post(&endpoint, None, body)
            .await
            .context_with(|| format!("error POSTing {} {}", records.len(), entity_type))?;

        let ids = response.into_ids();
        self.info_log(format_args!(
            "[targetprocess] {} created with IDs: {:?}",
            entity_type, ids
        ));
        Ok(ids
            .into_iter()
            .map(|id| CreatedEntity::new(self.account(), id))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::logging::testing::CaptureLogger;

    #[test]
    fn test_paged_response_of_created_ids() {
        let page: PagedResponse<CreatedId> =
            serde_json::from_str(r#"{"Items":[{"Id":3}],"Next":""}"#).unwrap();
        assert_eq!(page.items[0].id, 3);
        assert!(!page.has_more());
    }

    #[tokio::test]
    async fn test_create_logs_new_id_at_info() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/Feature/"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "Id": 41 })))
            .mount(&server)
            .await;

        let logger = Arc::new(CaptureLogger::default());
        let client = Client::builder("example")
            .host(server.uri())
            .logger(logger.clone())
            .build()
            .unwrap();
        let created = client
            .create_entity("Feature", "Search", &json!({ "Name": "Search" }))
            .await
            .unwrap();
        assert_eq!(created.id, 41);
        assert!(logger
            .lines()
            .contains(&"INFO [targetprocess] Feature created. ID: 41".to_string()));
    }

    #[test]
    fn test_bulk_response_envelope() {
        let resp: BulkResponse =
            serde_json::from_str(r#"{"Items":[{"Id":1,"Name":"a"},{"Id":2}],"Next":null}"#)
                .unwrap();
        assert_eq!(resp.into_ids(), vec![1, 2]);
    }

    #[test]
    fn test_bulk_response_bare_array() {
        let resp: BulkResponse = serde_json::from_str(r#"[{"Id":5},{"Id":6}]"#).unwrap();
        assert_eq!(resp.into_ids(), vec![5, 6]);
    }

    #[test]
    fn test_created_entity_link() {
        let created = CreatedEntity::new("example", 12);
        assert_eq!(
            created.link,
            "https://example.tpondemand.com/entity/12/RestUI/board.aspx"
        );
    }

    #[test]
    fn test_name_is() {
        assert_eq!(name_is("MockProject1"), "Name == 'MockProject1'");
    }
}
