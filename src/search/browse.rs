use crate::backend::ListingBackend;
use crate::error::Result;
use crate::models::{ContentElement, ListingRow, ListingTab, SearchResponse};
use crate::search::normalize::{dedupe_by_id, Normalizer};
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Unfiltered retrieval: every public listing plus featured tiles,
/// narrowed only by the active tab
pub struct BrowseFetcher<B> {
    backend: Arc<B>,
    normalizer: Normalizer,
    limit: usize,
}

impl<B: ListingBackend> BrowseFetcher<B> {
    pub fn new(backend: Arc<B>, normalizer: Normalizer, limit: usize) -> Self {
        Self {
            backend,
            normalizer,
            limit,
        }
    }

    pub async fn fetch(&self, tab: ListingTab, now: DateTime<Utc>) -> Result<SearchResponse> {
        info!("Browsing {} listings from {}", tab, self.backend.source_name());

        let (rows, tiles) = tokio::try_join!(
            self.backend.fetch_public_listings(),
            self.backend.fetch_featured_tiles()
        )?;
        debug!("Fetched {} listings and {} tiles", rows.len(), tiles.len());

        let live: HashMap<&str, &ListingRow> = rows.iter().map(|r| (r.id.as_str(), r)).collect();

        let featured = tiles
            .iter()
            .filter(|tile| tile.is_active)
            .filter(|tile| {
                tab.admits(
                    tile.content.listing_type.as_deref(),
                    tile.content.property_type.as_deref(),
                )
            })
            .filter(|tile| references_live_listing(tile, &live))
            .map(|tile| self.normalizer.tile(tile));

        let listings = rows
            .iter()
            .filter(|row| row.is_publicly_visible())
            .filter(|row| tab.admits(row.listing_type.as_deref(), row.property_type.as_deref()))
            .map(|row| self.normalizer.listing(row, now));

        let mut records = dedupe_by_id(featured.chain(listings).collect());
        let total = records.len();
        records.truncate(self.limit);

        info!("✅ Browse returned {} of {} records", records.len(), total);
        Ok(SearchResponse {
            has_more: total > records.len(),
            total,
            records,
        })
    }
}

/// A tile that points at a listing is only shown while that listing is
/// still present and publicly visible. Tiles without a reference pass.
fn references_live_listing(tile: &ContentElement, live: &HashMap<&str, &ListingRow>) -> bool {
    match tile.content.property_id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
        Some(id) => {
            let current = live.get(id).map(|row| row.is_publicly_visible()).unwrap_or(false);
            if !current {
                debug!("Dropping stale featured tile {} -> {}", tile.id, id);
            }
            current
        }
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::models::TileContent;
    use serde_json::json;

    fn row(id: &str, listing_type: &str, property_type: &str) -> ListingRow {
        ListingRow {
            id: id.into(),
            title: Some(format!("Listing {}", id)),
            listing_type: Some(listing_type.into()),
            property_type: Some(property_type.into()),
            expected_price: Some(5_000_000.0),
            ..Default::default()
        }
    }

    fn tile(id: &str, listing_type: &str, property_type: &str, property_id: Option<&str>) -> ContentElement {
        ContentElement {
            id: id.into(),
            title: Some(format!("Featured {}", id)),
            content: TileContent {
                listing_type: Some(listing_type.into()),
                property_type: Some(property_type.into()),
                price: Some(json!(7_500_000)),
                property_id: property_id.map(str::to_string),
                ..Default::default()
            },
            is_active: true,
            ..Default::default()
        }
    }

    fn fetcher(backend: MemoryBackend, limit: usize) -> (Arc<MemoryBackend>, BrowseFetcher<MemoryBackend>) {
        let backend = Arc::new(backend);
        (backend.clone(), BrowseFetcher::new(backend, Normalizer::new(7), limit))
    }

    #[tokio::test]
    async fn test_buy_and_rent_tabs_filter_by_listing_type() {
        let (_, browse) = fetcher(
            MemoryBackend::new(
                vec![row("s1", "sale", "apartment"), row("r1", "rent", "apartment"), row("b1", "buy", "villa")],
                vec![],
            ),
            50,
        );

        let buy = browse.fetch(ListingTab::Buy, Utc::now()).await.unwrap();
        let ids: Vec<_> = buy.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["s1", "b1"]);

        let rent = browse.fetch(ListingTab::Rent, Utc::now()).await.unwrap();
        assert_eq!(rent.records.len(), 1);
        assert_eq!(rent.records[0].id, "r1");
    }

    #[tokio::test]
    async fn test_commercial_tab_takes_sale_and_rent() {
        let (_, browse) = fetcher(
            MemoryBackend::new(
                vec![
                    row("o1", "sale", "office"),
                    row("s1", "rent", "shop"),
                    row("w1", "rent", "warehouse"),
                    row("sh1", "sale", "showroom"),
                    row("c1", "sale", "commercial"),
                    row("a1", "sale", "apartment"),
                ],
                vec![],
            ),
            50,
        );

        let response = browse.fetch(ListingTab::Commercial, Utc::now()).await.unwrap();
        let ids: Vec<_> = response.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["o1", "s1", "w1", "sh1", "c1"]);
    }

    #[tokio::test]
    async fn test_stale_featured_tiles_are_dropped() {
        let mut pending = row("p2", "sale", "villa");
        pending.status = Some("pending".into());
        let (_, browse) = fetcher(
            MemoryBackend::new(
                vec![row("p1", "sale", "apartment"), pending],
                vec![
                    tile("t-live", "sale", "apartment", Some("p1")),
                    tile("t-deleted", "sale", "apartment", Some("gone")),
                    tile("t-unapproved", "sale", "villa", Some("p2")),
                    tile("t-free", "sale", "villa", None),
                ],
            ),
            50,
        );

        let response = browse.fetch(ListingTab::Buy, Utc::now()).await.unwrap();
        let ids: Vec<_> = response.records.iter().map(|r| r.id.as_str()).collect();
        // the live tile takes its listing's id and the listing itself collapses into it
        assert_eq!(ids, vec!["p1", "t-free"]);
        assert_eq!(response.records[0].title, "Featured t-live");
    }

    #[tokio::test]
    async fn test_sample_fixture_buy_tab() {
        let fixture = serde_json::from_str(include_str!("../../fixtures/sample.json")).unwrap();
        let (_, browse) = fetcher(MemoryBackend::from_fixture(fixture), 50);

        let response = browse.fetch(ListingTab::Buy, Utc::now()).await.unwrap();
        let ids: Vec<_> = response.records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["lst-1006", "lst-1001", "lst-1005"]);
        assert_eq!(response.records[0].price, "₹1 Cr");
        assert!(!response.has_more);
    }

    #[tokio::test]
    async fn test_truncates_to_limit() {
        let rows = (0..60).map(|i| row(&format!("r{}", i), "sale", "apartment")).collect();
        let (_, browse) = fetcher(MemoryBackend::new(rows, vec![]), 50);

        let response = browse.fetch(ListingTab::Buy, Utc::now()).await.unwrap();
        assert_eq!(response.records.len(), 50);
        assert_eq!(response.total, 60);
        assert!(response.has_more);
    }

    #[tokio::test]
    async fn test_any_source_failure_fails_the_fetch() {
        let (backend, browse) = fetcher(MemoryBackend::new(vec![row("a", "sale", "plot")], vec![]), 50);
        backend.fail_tiles(true);
        assert!(browse.fetch(ListingTab::Buy, Utc::now()).await.is_err());

        backend.fail_tiles(false);
        backend.fail_listings(true);
        assert!(browse.fetch(ListingTab::Buy, Utc::now()).await.is_err());
    }
}
