use crate::backend::traits::ListingBackend;
use crate::backend::types::{SearchPage, SearchRequest};
use crate::error::{Result, SearchError};
use crate::models::{normalize_token, BhkType, ContentElement, ListingRow, ListingTab, PropertyType};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Mutex;
use tracing::info;

/// On-disk fixture layout
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub listings: Vec<ListingRow>,
    #[serde(default)]
    pub featured: Vec<ContentElement>,
}

#[derive(Debug, Default)]
struct CallCounts {
    listings: AtomicUsize,
    tiles: AtomicUsize,
    searches: AtomicUsize,
}

/// In-memory backend for offline runs and tests. Emulates the search
/// endpoint over its own rows and records every request it receives.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    listings: Vec<ListingRow>,
    featured: Vec<ContentElement>,
    fail_listings: AtomicBool,
    fail_tiles: AtomicBool,
    fail_search: AtomicBool,
    calls: CallCounts,
    requests: Mutex<Vec<SearchRequest>>,
}

impl MemoryBackend {
    pub fn new(listings: Vec<ListingRow>, featured: Vec<ContentElement>) -> Self {
        Self {
            listings,
            featured,
            ..Default::default()
        }
    }

    pub fn from_fixture(fixture: Fixture) -> Self {
        Self::new(fixture.listings, fixture.featured)
    }

    /// Load a JSON fixture of `{ "listings": [...], "featured": [...] }`
    pub async fn from_fixture_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path.as_ref()).await?;
        let fixture: Fixture = serde_json::from_str(&raw)?;
        info!(
            "📋 Loaded fixture with {} listings and {} featured tiles",
            fixture.listings.len(),
            fixture.featured.len()
        );
        Ok(Self::from_fixture(fixture))
    }

    pub fn fail_listings(&self, fail: bool) {
        self.fail_listings.store(fail, AtomicOrdering::SeqCst);
    }

    pub fn fail_tiles(&self, fail: bool) {
        self.fail_tiles.store(fail, AtomicOrdering::SeqCst);
    }

    pub fn fail_search(&self, fail: bool) {
        self.fail_search.store(fail, AtomicOrdering::SeqCst);
    }

    pub fn listing_calls(&self) -> usize {
        self.calls.listings.load(AtomicOrdering::SeqCst)
    }

    pub fn tile_calls(&self) -> usize {
        self.calls.tiles.load(AtomicOrdering::SeqCst)
    }

    pub fn search_calls(&self) -> usize {
        self.calls.searches.load(AtomicOrdering::SeqCst)
    }

    /// Every search request received so far, oldest first
    pub fn search_requests(&self) -> Vec<SearchRequest> {
        self.requests
            .lock()
            .map(|guard| guard.clone())
            .unwrap_or_default()
    }

    fn matches(row: &ListingRow, request: &SearchRequest) -> bool {
        if let Ok(tab) = request.intent.parse::<ListingTab>() {
            if !tab.admits(row.listing_type.as_deref(), row.property_type.as_deref()) {
                return false;
            }
        }

        if !request.property_types.is_empty() {
            let row_type = row
                .property_type
                .as_deref()
                .map(|t| {
                    PropertyType::from_label(t)
                        .map(|p| p.backend_value().to_string())
                        .unwrap_or_else(|_| normalize_token(t))
                })
                .unwrap_or_default();
            if !request.property_types.iter().any(|t| *t == row_type) {
                return false;
            }
        }

        if let Some(city) = request.city.as_deref() {
            let needle = city.trim().to_lowercase();
            let haystacks = [&row.city, &row.locality, &row.title];
            if !haystacks
                .iter()
                .any(|h| h.as_deref().map(|v| v.to_lowercase().contains(&needle)).unwrap_or(false))
            {
                return false;
            }
        }

        if let Some(locality) = request.locality.as_deref() {
            let needle = locality.trim().to_lowercase();
            let hit = row
                .locality
                .as_deref()
                .map(|v| v.to_lowercase().contains(&needle))
                .unwrap_or(false);
            if !hit {
                return false;
            }
        }

        if let Some(price) = row.expected_price {
            let min = request.budget_min.parse::<f64>().unwrap_or(0.0);
            let max = request.budget_max.parse::<f64>().unwrap_or(f64::MAX);
            if price < min || price > max {
                return false;
            }
        }

        if let Some(bhk) = request.bhk_type.as_deref() {
            let row_bhk = row.bhk_type.as_deref().and_then(|b| BhkType::from_label(b).ok());
            if row_bhk.map(|b| b.backend_value()) != Some(bhk) {
                return false;
            }
        }

        true
    }

    fn sort(rows: &mut [ListingRow], sort_by: Option<&str>) {
        let price = |r: &ListingRow| r.expected_price.unwrap_or(0.0);
        match sort_by {
            Some("price_asc") => rows.sort_by(|a, b| price(a).partial_cmp(&price(b)).unwrap_or(Ordering::Equal)),
            Some("price_desc") => rows.sort_by(|a, b| price(b).partial_cmp(&price(a)).unwrap_or(Ordering::Equal)),
            Some("newest") => rows.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
            _ => {}
        }
    }
}

fn unavailable(what: &str) -> SearchError {
    SearchError::Backend {
        status: 503,
        message: format!("{} unavailable", what),
    }
}

#[async_trait]
impl ListingBackend for MemoryBackend {
    async fn fetch_public_listings(&self) -> Result<Vec<ListingRow>> {
        self.calls.listings.fetch_add(1, AtomicOrdering::SeqCst);
        if self.fail_listings.load(AtomicOrdering::SeqCst) {
            return Err(unavailable("listings"));
        }
        Ok(self
            .listings
            .iter()
            .filter(|row| row.is_visible != Some(false))
            .cloned()
            .collect())
    }

    async fn fetch_featured_tiles(&self) -> Result<Vec<ContentElement>> {
        self.calls.tiles.fetch_add(1, AtomicOrdering::SeqCst);
        if self.fail_tiles.load(AtomicOrdering::SeqCst) {
            return Err(unavailable("featured tiles"));
        }
        let mut tiles: Vec<ContentElement> =
            self.featured.iter().filter(|t| t.is_active).cloned().collect();
        tiles.sort_by_key(|t| t.sort_order.unwrap_or(i64::MAX));
        Ok(tiles)
    }

    async fn search_listings(&self, request: &SearchRequest) -> Result<SearchPage> {
        self.calls.searches.fetch_add(1, AtomicOrdering::SeqCst);
        if let Ok(mut guard) = self.requests.lock() {
            guard.push(request.clone());
        }
        if self.fail_search.load(AtomicOrdering::SeqCst) {
            return Err(unavailable("search"));
        }

        let mut hits: Vec<ListingRow> = self
            .listings
            .iter()
            .filter(|row| Self::matches(row, request))
            .cloned()
            .collect();
        Self::sort(&mut hits, request.sort_by.as_deref());

        let total = hits.len();
        let size = request.page_size_number() as usize;
        let start = (request.page_number() as usize - 1) * size;
        let properties: Vec<ListingRow> = hits.into_iter().skip(start).take(size).collect();

        Ok(SearchPage {
            has_more: Some(start + properties.len() < total),
            total: Some(total as u64),
            properties,
        })
    }

    fn source_name(&self) -> &'static str {
        "Memory"
    }
}
