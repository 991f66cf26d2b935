use crate::types::{Listing, Result};
use async_trait::async_trait;

/// Trait for searching one retailer for laptop listings
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    /// Unique identifier for this source
    fn source_id(&self) -> String;

    /// Human-readable name stamped on every listing and used in cache keys
    fn source_name(&self) -> String;

    /// Country code of the storefront
    fn country(&self) -> String;

    /// Fetch one page of search results.
    /// Listings are deduplicated by canonical URL within the call.
    async fn search(&self, query: &str, page: u32) -> Result<Vec<Listing>>;

    /// Fetch every result page this source is configured for and merge them.
    async fn search_all(&self, query: &str) -> Result<Vec<Listing>> {
        self.search(query, 1).await
    }

    /// Get metadata about the source
    fn metadata(&self) -> SourceMetadata;
}

/// Metadata about a retailer source
#[derive(Debug, Clone, serde::Serialize)]
pub struct SourceMetadata {
    pub id: String,
    pub name: String,
    pub country: String,
    pub website_url: Option<String>,
    pub max_pages: u32,
    pub tags: Vec<String>,
}
