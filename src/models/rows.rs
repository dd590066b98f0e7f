//! Inbound record shapes as the backend returns them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Statuses under which a listing counts as live
const APPROVED_STATUSES: &[&str] = &["approved", "active", "published"];

/// Raw row from the `properties` table
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ListingRow {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub locality: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
    #[serde(default)]
    pub property_type: Option<String>,
    #[serde(default)]
    pub listing_type: Option<String>,
    #[serde(default, deserialize_with = "number_or_string")]
    pub expected_price: Option<f64>,
    #[serde(default, deserialize_with = "number_or_string")]
    pub super_area: Option<f64>,
    #[serde(default)]
    pub bhk_type: Option<String>,
    #[serde(default, deserialize_with = "number_or_string")]
    pub bathrooms: Option<f64>,
    /// Rooms on offer, only filled for PG/hostel listings
    #[serde(default, deserialize_with = "number_or_string")]
    pub available_rooms: Option<f64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_visible: Option<bool>,
    #[serde(default)]
    pub status: Option<String>,
}

impl ListingRow {
    /// Visible to the public: not hidden, and approved when a status is set
    pub fn is_publicly_visible(&self) -> bool {
        if self.is_visible == Some(false) {
            return false;
        }
        match self.status.as_deref() {
            Some(status) => APPROVED_STATUSES.contains(&status.trim().to_lowercase().as_str()),
            None => true,
        }
    }
}

/// Curated "content element" row backing a featured tile
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ContentElement {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub content: TileContent,
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<String>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub sort_order: Option<i64>,
}

/// Free-form JSON payload of a featured tile. Price and area are typed
/// loosely because editors enter either numbers or preformatted text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TileContent {
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default)]
    pub area: Option<Value>,
    #[serde(default)]
    pub size: Option<Value>,
    #[serde(default, deserialize_with = "number_or_string")]
    pub bedrooms: Option<f64>,
    #[serde(default)]
    pub bhk: Option<String>,
    #[serde(default)]
    pub property_type: Option<String>,
    #[serde(default)]
    pub listing_type: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub is_new: bool,
    /// Live listing this tile promotes, if any
    #[serde(default, alias = "property_id", alias = "listingId")]
    pub property_id: Option<String>,
}

fn default_true() -> bool {
    true
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts `12`, `12.5`, `"12"`, `"1,200"`, `""` or `null`.
fn number_or_string<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(value) => value_as_f64(&value),
        None => None,
    })
}

/// Read a loosely typed numeric JSON value
pub(crate) fn value_as_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => {
            let cleaned: String = s.trim().chars().filter(|c| *c != ',').collect();
            cleaned.parse::<f64>().ok()
        }
        _ => None,
    }
}
