//! Paged response envelope and the walker that follows its `Next` links.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::client::Client;
use super::error::{ListResult, PartialPages};

/// A page of results.
///
/// Returned by every list endpoint as `{"Items": [...], "Next": "...",
/// "Prev": "..."}`. v2 uses lowercase keys.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct PagedResponse<T> {
    #[serde(rename = "Items", alias = "items", default)]
    pub items: Vec<T>,
    /// Link to the following page, empty or absent on the last one.
    #[serde(rename = "Next", alias = "next", default)]
    pub next: Option<String>,
    #[serde(rename = "Prev", alias = "prev", default)]
    pub prev: Option<String>,
}

impl<T> Default for PagedResponse<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            next: None,
            prev: None,
        }
    }
}

impl<T> PagedResponse<T> {
    /// The continuation link, if there are more pages.
    pub fn next_link(&self) -> Option<&str> {
        self.next.as_deref().filter(|next| !next.is_empty())
    }

    /// Check if there are more pages of results.
    pub fn has_more(&self) -> bool {
        self.next_link().is_some()
    }
}

/// Collect the items of `first` and, when `page` is set, of every page
/// after it.
///
/// Pages are fetched one at a time. If a fetch fails the items gathered so
/// far are returned with the error.
pub async fn collect_pages<T: DeserializeOwned>(
    client: &Client,
    first: PagedResponse<T>,
    page: bool,
) -> ListResult<T> {
    let mut items = first.items;
    if !page {
        return Ok(items);
    }

    let mut next = first.next;
    while let Some(link) = next.filter(|link| !link.is_empty()) {
        debug!(next = %link, collected = items.len(), "Fetching next page");
        match client.get_next::<PagedResponse<T>>(&link).await {
            Ok(response) => {
                items.extend(response.items);
                next = response.next;
            }
            Err(source) => return Err(PartialPages { items, source }),
        }
    }
    Ok(items)
}
