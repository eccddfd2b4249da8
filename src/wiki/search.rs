//! Full-text search via `list=search`.

use crate::base::neterror::NetError;
use crate::client::WikiClient;
use crate::wiki::extract;
use serde::Deserialize;

/// Largest `srlimit` the API accepts for regular users.
pub const MAX_SEARCH_LIMIT: u32 = 500;

/// One search result.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchHit {
    #[serde(rename = "ns")]
    pub namespace: i64,
    pub title: String,
    #[serde(rename = "pageid")]
    pub page_id: u64,
    #[serde(default)]
    pub size: u64,
    #[serde(rename = "wordcount", default)]
    pub word_count: u64,
    /// HTML fragment with matches wrapped in `<span class="searchmatch">`.
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub timestamp: String,
}

impl WikiClient {
    /// Search page text for `query`, returning at most `limit` hits in
    /// relevance order.
    pub async fn search(&self, query: &str, limit: u32) -> Result<Vec<SearchHit>, NetError> {
        if query.trim().is_empty() {
            return Err(NetError::invalid_parameter("query", "must not be empty"));
        }
        if limit == 0 || limit > MAX_SEARCH_LIMIT {
            return Err(NetError::invalid_parameter(
                "limit",
                format!("expected 1 to {}, got {}", MAX_SEARCH_LIMIT, limit),
            ));
        }

        let mut body = self
            .get([
                ("action", "query".to_string()),
                ("list", "search".to_string()),
                ("srsearch", query.to_string()),
                ("srlimit", limit.to_string()),
                ("srprop", "size|wordcount|timestamp|snippet".to_string()),
            ])
            .await?;

        extract(&mut body, "/query/search")
    }
}
