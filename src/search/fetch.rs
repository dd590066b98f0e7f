use crate::backend::{ListingBackend, SearchRequest};
use crate::error::Result;
use crate::models::{normalize_token, ContentElement, ListingTab, PropertyType, SearchResponse};
use crate::search::filters::FilterState;
use crate::search::normalize::{dedupe_by_id, Normalizer};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Parametrized retrieval through the backend search endpoint
pub struct SearchFetcher<B> {
    backend: Arc<B>,
    normalizer: Normalizer,
    page_size: u32,
    country: Option<String>,
}

impl<B: ListingBackend> SearchFetcher<B> {
    pub fn new(backend: Arc<B>, normalizer: Normalizer, page_size: u32, country: Option<String>) -> Self {
        Self {
            backend,
            normalizer,
            page_size,
            country,
        }
    }

    /// Translate filter state into the backend's vocabulary. Multi-select
    /// fields other than property type send their first selection only.
    pub fn build_request(&self, state: &FilterState, tab: ListingTab, debounced_location: &str, page: u32) -> SearchRequest {
        let property_types: Vec<String> = state
            .property_type
            .iter()
            .map(|t| t.backend_value().to_string())
            .collect();
        let city = debounced_location.trim();

        SearchRequest {
            intent: tab.as_str().to_string(),
            property_type: property_types.first().cloned(),
            property_types,
            country: self.country.clone(),
            state: None,
            city: (!city.is_empty()).then(|| city.to_string()),
            budget_min: state.budget.min.to_string(),
            budget_max: state.budget.max.to_string(),
            page: page.max(1).to_string(),
            page_size: self.page_size.to_string(),
            bhk_type: state.bhk_type.first().map(|v| v.backend_value().to_string()),
            furnished: state.furnished.first().map(|v| v.backend_value().to_string()),
            availability: state.availability.first().map(|v| v.backend_value().to_string()),
            age_of_property: state.construction.first().map(|v| v.backend_value().to_string()),
            locality: state
                .locality
                .iter()
                .map(|l| l.trim())
                .find(|l| !l.is_empty())
                .map(str::to_string),
            sort_by: Some(state.sort_by.backend_value().to_string()),
        }
    }

    /// Run the search and merge in matching featured tiles. The tile fetch
    /// runs alongside and a failure there only costs the tiles.
    pub async fn fetch(
        &self,
        request: &SearchRequest,
        property_types: &[PropertyType],
        tab: ListingTab,
        now: DateTime<Utc>,
    ) -> Result<SearchResponse> {
        info!("Searching {} via {}", tab, self.backend.source_name());
        debug!("Search request: {:?}", request);

        let (primary, featured) = tokio::join!(
            self.backend.search_listings(request),
            self.backend.fetch_featured_tiles()
        );
        let page = primary?;

        let listings: Vec<_> = page
            .properties
            .iter()
            .filter(|row| row.is_publicly_visible())
            .map(|row| self.normalizer.listing(row, now))
            .collect();
        let listing_count = listings.len();

        let tiles = match featured {
            Ok(tiles) => tiles,
            Err(e) => {
                warn!("Featured tiles unavailable, showing search results only: {}", e);
                Vec::new()
            }
        };
        let matched_tiles = tiles
            .iter()
            .filter(|tile| tile.is_active)
            .filter(|tile| {
                tab.admits(
                    tile.content.listing_type.as_deref(),
                    tile.content.property_type.as_deref(),
                )
            })
            .filter(|tile| matches_property_types(tile, property_types))
            .map(|tile| self.normalizer.tile(tile));

        let records = dedupe_by_id(listings.into_iter().chain(matched_tiles).collect());
        let added_tiles = records.len().saturating_sub(listing_count);

        let listed_total = page.total.map(|t| t as usize).unwrap_or(listing_count);
        let has_more = page
            .has_more
            .unwrap_or_else(|| (request.page_number() as usize) * (request.page_size_number() as usize) < listed_total);

        info!("✅ Search returned {} records ({} featured)", records.len(), added_tiles);
        Ok(SearchResponse {
            records,
            total: listed_total + added_tiles,
            has_more,
        })
    }
}

/// Match a tile against the selected property types. A tile type that
/// parses through the vocabulary must be one of the selections; anything
/// else falls back to whole-word matching of each kind's backend value,
/// label and aliases against the tile's type and title.
fn matches_property_types(tile: &ContentElement, selected: &[PropertyType]) -> bool {
    if selected.is_empty() {
        return true;
    }
    let declared = tile.content.property_type.as_deref();
    if let Some(kind) = declared.and_then(|t| PropertyType::from_label(t).ok()) {
        if selected.contains(&kind) {
            return true;
        }
    }

    let haystacks: Vec<String> = [declared, tile.title.as_deref()]
        .into_iter()
        .flatten()
        .map(|h| format!("_{}_", normalize_token(h)))
        .collect();

    selected.iter().any(|kind| {
        let label = normalize_token(kind.label());
        std::iter::once(kind.backend_value())
            .chain(std::iter::once(label.as_str()))
            .chain(kind.aliases().iter().copied())
            .map(|needle| format!("_{}_", needle))
            .any(|needle| haystacks.iter().any(|h| h.contains(&needle)))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::MemoryBackend;
    use crate::models::{Availability, BhkType, Furnishing, ListingRow, PropertyAge, SortBy, TileContent};
    use crate::search::filters::BudgetRange;
    use serde_json::json;

    fn fetcher(backend: MemoryBackend) -> (Arc<MemoryBackend>, SearchFetcher<MemoryBackend>) {
        let backend = Arc::new(backend);
        (
            backend.clone(),
            SearchFetcher::new(backend, Normalizer::new(7), 20, Some("India".into())),
        )
    }

    fn row(id: &str, listing_type: &str, property_type: &str, city: &str) -> ListingRow {
        ListingRow {
            id: id.into(),
            title: Some(format!("Listing {}", id)),
            listing_type: Some(listing_type.into()),
            property_type: Some(property_type.into()),
            city: Some(city.into()),
            expected_price: Some(2_000_000.0),
            ..Default::default()
        }
    }

    fn tile(id: &str, title: &str, listing_type: &str, property_type: &str) -> ContentElement {
        ContentElement {
            id: id.into(),
            title: Some(title.into()),
            content: TileContent {
                listing_type: Some(listing_type.into()),
                property_type: Some(property_type.into()),
                price: Some(json!(12_000)),
                ..Default::default()
            },
            is_active: true,
            ..Default::default()
        }
    }

    #[test]
    fn test_request_translates_vocabulary_and_narrows_multi_select() {
        let (_, search) = fetcher(MemoryBackend::default());
        let mut state = FilterState::new(100_000_000);
        state.property_type = vec![PropertyType::PgHostel, PropertyType::Flatmates];
        state.bhk_type = vec![BhkType::Three, BhkType::Two];
        state.furnished = vec![Furnishing::SemiFurnished, Furnishing::Furnished];
        state.availability = vec![Availability::Within15Days];
        state.construction = vec![PropertyAge::OneToFiveYears];
        state.locality = vec!["  ".into(), "Viman Nagar".into()];
        state.budget = BudgetRange::new(5_000, 20_000).unwrap();
        state.sort_by = SortBy::PriceLowToHigh;

        let request = search.build_request(&state, ListingTab::Rent, " Pune ", 1);

        assert_eq!(request.intent, "rent");
        assert_eq!(request.property_type.as_deref(), Some("pg_hostel"));
        assert_eq!(request.property_types, vec!["pg_hostel", "flatmates"]);
        assert_eq!(request.country.as_deref(), Some("India"));
        assert_eq!(request.city.as_deref(), Some("Pune"));
        assert_eq!(request.budget_min, "5000");
        assert_eq!(request.budget_max, "20000");
        assert_eq!(request.page, "1");
        assert_eq!(request.page_size, "20");
        assert_eq!(request.bhk_type.as_deref(), Some("3bhk"));
        assert_eq!(request.furnished.as_deref(), Some("semi_furnished"));
        assert_eq!(request.availability.as_deref(), Some("within_15_days"));
        assert_eq!(request.age_of_property.as_deref(), Some("1_to_5_years"));
        assert_eq!(request.locality.as_deref(), Some("Viman Nagar"));
        assert_eq!(request.sort_by.as_deref(), Some("price_asc"));
    }

    #[test]
    fn test_empty_location_sends_no_city() {
        let (_, search) = fetcher(MemoryBackend::default());
        let state = FilterState::new(100_000_000);
        let request = search.build_request(&state, ListingTab::Buy, "", 0);
        assert_eq!(request.city, None);
        assert_eq!(request.property_type, None);
        assert_eq!(request.page, "1");
    }

    #[tokio::test]
    async fn test_merges_matching_tiles_after_results() {
        let mut hidden = row("h1", "rent", "pg_hostel", "Pune");
        hidden.is_visible = Some(false);
        let (_, search) = fetcher(MemoryBackend::new(
            vec![row("a1", "rent", "pg_hostel", "Pune"), hidden],
            vec![
                tile("t1", "Boys PG in Kothrud", "rent", "PG/Hostel"),
                tile("t2", "Luxury villa", "rent", "Villa"),
                tile("t3", "PG near station", "sale", "PG Hostel"),
            ],
        ));
        let mut state = FilterState::new(100_000_000);
        state.property_type = vec![PropertyType::PgHostel];
        let request = search.build_request(&state, ListingTab::Rent, "Pune", 1);

        let response = search
            .fetch(&request, &state.property_type, ListingTab::Rent, Utc::now())
            .await
            .unwrap();
        let ids: Vec<_> = response.records.iter().map(|r| r.id.as_str()).collect();

        assert_eq!(ids, vec!["a1", "t1"]);
        assert_eq!(response.records[1].price, "₹12,000/month");
        assert_eq!(response.total, 3);
    }

    #[tokio::test]
    async fn test_tile_failure_keeps_primary_results() {
        let (backend, search) = fetcher(MemoryBackend::new(
            vec![row("a1", "sale", "villa", "Goa")],
            vec![tile("t1", "Villa", "sale", "villa")],
        ));
        backend.fail_tiles(true);
        let state = FilterState::new(100_000_000);
        let request = search.build_request(&state, ListingTab::Buy, "Goa", 1);

        let response = search.fetch(&request, &[], ListingTab::Buy, Utc::now()).await.unwrap();
        assert_eq!(response.records.len(), 1);
        assert_eq!(response.records[0].id, "a1");
    }

    #[tokio::test]
    async fn test_primary_failure_is_an_error() {
        let (backend, search) = fetcher(MemoryBackend::default());
        backend.fail_search(true);
        let request = search.build_request(&FilterState::new(1_000), ListingTab::Buy, "Goa", 1);
        assert!(search.fetch(&request, &[], ListingTab::Buy, Utc::now()).await.is_err());
    }

    #[test]
    fn test_fuzzy_type_match() {
        let t = tile("t", "Office space on MG Road", "rent", "Commercial");
        assert!(matches_property_types(&t, &[PropertyType::Office]));
        assert!(matches_property_types(&t, &[PropertyType::Commercial]));
        assert!(!matches_property_types(&t, &[PropertyType::Shop]));
        assert!(matches_property_types(&t, &[]));
    }

    #[test]
    fn test_alias_typed_tiles_match_their_kind() {
        let cases = [
            ("PG", PropertyType::PgHostel),
            ("Flat", PropertyType::Apartment),
            ("Farmhouse", PropertyType::FarmHouse),
        ];
        for (declared, kind) in cases {
            let t = tile("t", "Featured listing", "rent", declared);
            assert!(matches_property_types(&t, &[kind]), "{} should match {:?}", declared, kind);
            assert!(!matches_property_types(&t, &[PropertyType::Warehouse]));
        }
    }

    #[test]
    fn test_alias_in_title_matches_on_word_boundaries() {
        let hostel = tile("t", "Girls hostel near campus", "rent", "Residential");
        assert!(matches_property_types(&hostel, &[PropertyType::PgHostel]));

        let upgrade = tile("t", "Upgraded interiors", "rent", "Residential");
        assert!(!matches_property_types(&upgrade, &[PropertyType::PgHostel]));
    }

    #[tokio::test]
    async fn test_search_keeps_alias_typed_tile() {
        let (_, search) = fetcher(MemoryBackend::new(
            vec![],
            vec![tile("t-pg", "Boys accommodation", "rent", "PG")],
        ));
        let mut state = FilterState::new(100_000_000);
        state.property_type = vec![PropertyType::PgHostel];
        let request = search.build_request(&state, ListingTab::Rent, "Pune", 1);

        let response = search
            .fetch(&request, &state.property_type, ListingTab::Rent, Utc::now())
            .await
            .unwrap();
        assert_eq!(response.records.len(), 1);
        assert_eq!(response.records[0].id, "t-pg");
    }
}
