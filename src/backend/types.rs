use crate::models::ListingRow;
use serde::{Deserialize, Serialize};

/// Parameters of one search-path request. Every value travels as a string;
/// multi-select filters carry only their first selection.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchRequest {
    /// Active tab: buy, rent or commercial
    pub intent: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_type: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub property_types: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Debounced location text
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    pub budget_min: String,
    pub budget_max: String,
    pub page: String,
    pub page_size: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bhk_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub furnished: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub availability: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_of_property: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locality: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
}

impl SearchRequest {
    pub fn page_number(&self) -> u32 {
        self.page.parse().unwrap_or(1).max(1)
    }

    pub fn page_size_number(&self) -> u32 {
        self.page_size.parse().unwrap_or(20).max(1)
    }
}

/// Body returned by the search endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    #[serde(default)]
    pub properties: Vec<ListingRow>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub has_more: Option<bool>,
}
