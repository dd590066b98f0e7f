pub mod rows;
pub mod vocab;

use crate::error::{Result, SearchError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use rows::{ContentElement, ListingRow, TileContent};
pub use vocab::{Availability, BhkType, Furnishing, PropertyAge, PropertyType, SortBy};

/// Listing tab active on the search page
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ListingTab {
    #[default]
    Buy,
    Rent,
    Commercial,
}

impl ListingTab {
    pub fn as_str(&self) -> &'static str {
        match self {
            ListingTab::Buy => "buy",
            ListingTab::Rent => "rent",
            ListingTab::Commercial => "commercial",
        }
    }

    /// Whether a record with the given listing category and property type
    /// belongs on this tab. Commercial filters by property category and
    /// accepts both sale and rent.
    pub fn admits(&self, listing_type: Option<&str>, property_type: Option<&str>) -> bool {
        match self {
            ListingTab::Buy => matches!(
                listing_type.map(normalize_token).as_deref(),
                Some("sale") | Some("buy")
            ),
            ListingTab::Rent => listing_type.map(normalize_token).as_deref() == Some("rent"),
            ListingTab::Commercial => property_type
                .and_then(|t| PropertyType::from_label(t).ok())
                .map(|t| t.is_commercial())
                .unwrap_or(false),
        }
    }
}

impl fmt::Display for ListingTab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ListingTab {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self> {
        match normalize_token(s).as_str() {
            "buy" | "sale" => Ok(ListingTab::Buy),
            "rent" => Ok(ListingTab::Rent),
            "commercial" => Ok(ListingTab::Commercial),
            _ => Err(SearchError::unknown_label("tab", s)),
        }
    }
}

/// Display-ready property summary. Everything the view renders comes
/// through the normalizer in this shape.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListingRecord {
    pub id: String,
    pub title: String,
    pub location: String,
    pub price: String,
    pub area: String,
    pub bedrooms: Option<u32>,
    pub bathrooms: Option<u32>,
    pub image: String,
    pub property_type: String,
    pub is_new: bool,
}

/// Outcome of one fetch cycle
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub records: Vec<ListingRecord>,
    pub total: usize,
    pub has_more: bool,
}

impl SearchResponse {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Lowercase, trim, and collapse separators to `_` so labels from the view
/// and values from the backend compare equal.
pub(crate) fn normalize_token(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_sep = false;
    for c in raw.trim().chars() {
        if c.is_alphanumeric() || c == '+' {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.extend(c.to_lowercase());
        } else {
            pending_sep = true;
        }
    }
    out
}
