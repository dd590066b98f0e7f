use crate::backend::types::{SearchPage, SearchRequest};
use crate::error::Result;
use crate::models::{ContentElement, ListingRow};
use async_trait::async_trait;

/// Data source behind the search page.
/// Implemented by the hosted backend and by the in-memory fixture store.
#[async_trait]
pub trait ListingBackend: Send + Sync {
    /// Every listing currently visible to the public
    async fn fetch_public_listings(&self) -> Result<Vec<ListingRow>>;

    /// Active curated tiles, in editorial order
    async fn fetch_featured_tiles(&self) -> Result<Vec<ContentElement>>;

    /// Run the parametrized search
    async fn search_listings(&self, request: &SearchRequest) -> Result<SearchPage>;

    /// Get the name of the backend
    fn source_name(&self) -> &'static str;
}
