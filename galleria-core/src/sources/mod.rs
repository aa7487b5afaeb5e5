use async_trait::async_trait;

use crate::error::Result;
use crate::models::SearchResultRecord;
use crate::query::SearchQuery;

#[async_trait]
pub trait ArtworkSource: Send + Sync {
    /// Display name (e.g. "iTunes")
    fn name(&self) -> &str;
    /// Full request URL for `query`, shown in status text and diagnostics.
    fn query_url(&self, query: &SearchQuery) -> String;
    async fn search(&self, query: &SearchQuery) -> Result<Vec<SearchResultRecord>>;
    async fn download(&self, url: &str) -> Result<bytes::Bytes>;
}
