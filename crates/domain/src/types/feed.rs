//! Paged collection responses

use serde::{Deserialize, Serialize};

/// Paging metadata of a collection response
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedData {
    pub next_page_token: Option<String>,
    pub next_sync_token: Option<String>,
}

/// One page of a collection (`{"items": [...], "nextPageToken": "..."}`).
/// Drive names the collection `files`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Feed<T> {
    #[serde(default = "Vec::new", alias = "files")]
    pub items: Vec<T>,
    pub next_page_token: Option<String>,
    pub next_sync_token: Option<String>,
}

impl<T> Feed<T> {
    pub fn data(&self) -> FeedData {
        FeedData {
            next_page_token: self.next_page_token.clone(),
            next_sync_token: self.next_sync_token.clone(),
        }
    }

    /// Split the page into its items and paging metadata.
    pub fn into_parts(self) -> (Vec<T>, FeedData) {
        let data = FeedData {
            next_page_token: self.next_page_token,
            next_sync_token: self.next_sync_token,
        };
        (self.items, data)
    }
}
