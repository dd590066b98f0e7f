//! Maps raw listing rows and curated tiles into [`ListingRecord`].

use crate::config::MAX_NEW_LISTING_DAYS;
use crate::models::rows::value_as_f64;
use crate::models::{BhkType, ContentElement, ListingRecord, ListingRow, PropertyType};
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::collections::HashSet;

pub const PLACEHOLDER_IMAGE: &str = "/placeholder.svg";
const PRICE_ON_REQUEST: &str = "Price on Request";
const AREA_UNKNOWN: &str = "N/A";

const CRORE: u64 = 10_000_000;
const LAKH: u64 = 100_000;
const THOUSAND: u64 = 1_000;

/// Compact rupee price: `₹1.2 Cr`, `₹45.5 L`, `₹25K`, `₹950`.
/// Crore and lakh values are truncated to one decimal and a trailing `.0`
/// is dropped, so `10_000_000` is `₹1 Cr` and `9_999_999` is `₹99.9 L`.
pub fn format_price(value: f64) -> String {
    let v = whole(value);
    if v >= CRORE {
        format!("₹{} Cr", tenths(v / (CRORE / 10)))
    } else if v >= LAKH {
        format!("₹{} L", tenths(v / (LAKH / 10)))
    } else if v >= THOUSAND {
        format!("₹{}K", v / THOUSAND)
    } else {
        format!("₹{}", group_indian(v))
    }
}

/// PG/hostel rent: always the full grouped amount per month
pub fn format_monthly_price(value: f64) -> String {
    format!("₹{}/month", group_indian(whole(value)))
}

pub fn format_area(sq_ft: f64) -> String {
    format!("{} sq ft", group_indian(whole(sq_ft)))
}

pub fn format_rooms(rooms: u32) -> String {
    if rooms == 1 {
        "1 Room".to_string()
    } else {
        format!("{} Rooms", rooms)
    }
}

/// Digits grouped the en-IN way: `12,34,567`
pub fn group_indian(value: u64) -> String {
    let digits = value.to_string();
    if digits.len() <= 3 {
        return digits;
    }
    let (head, last3) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 2 {
        groups.push(&head[end - 2..end]);
        end -= 2;
    }
    groups.push(&head[..end]);
    groups.reverse();
    format!("{},{}", groups.join(","), last3)
}

fn whole(value: f64) -> u64 {
    if value.is_finite() && value > 0.0 {
        value.floor() as u64
    } else {
        0
    }
}

fn tenths(count: u64) -> String {
    match count % 10 {
        0 => format!("{}", count / 10),
        frac => format!("{}.{}", count / 10, frac),
    }
}

/// Bedrooms from a `bhk_type` value such as `2bhk` or `3 BHK`
fn bedrooms_from_bhk(raw: &str) -> Option<u32> {
    if let Ok(bhk) = BhkType::from_label(raw) {
        return Some(bhk.bedrooms());
    }
    let digits: String = raw.trim().chars().take_while(|c| c.is_ascii_digit()).collect();
    digits.parse().ok()
}

fn type_label(raw: Option<&str>) -> String {
    match raw {
        Some(raw) => PropertyType::from_label(raw)
            .map(|t| t.label().to_string())
            .unwrap_or_else(|_| raw.trim().to_string()),
        None => "Property".to_string(),
    }
}

fn is_pg(raw: Option<&str>) -> bool {
    raw.and_then(|t| PropertyType::from_label(t).ok())
        .map(|t| t.is_pg())
        .unwrap_or(false)
}

fn non_empty(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|s| !s.is_empty())
}

/// Shapes raw records for display; `new_within` sets the "is new" window
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    new_within: Duration,
}

impl Normalizer {
    /// The window is clamped to `0..=MAX_NEW_LISTING_DAYS`
    pub fn new(new_listing_days: i64) -> Self {
        Self {
            new_within: Duration::days(new_listing_days.clamp(0, MAX_NEW_LISTING_DAYS)),
        }
    }

    pub fn listing(&self, row: &ListingRow, now: DateTime<Utc>) -> ListingRecord {
        let pg = is_pg(row.property_type.as_deref());
        let bedrooms = row.bhk_type.as_deref().and_then(bedrooms_from_bhk);

        let price = match row.expected_price {
            Some(p) if pg => format_monthly_price(p),
            Some(p) => format_price(p),
            None => PRICE_ON_REQUEST.to_string(),
        };

        let area = if pg {
            let rooms = row
                .available_rooms
                .map(|r| whole(r) as u32)
                .filter(|r| *r > 0)
                .or(bedrooms)
                .unwrap_or(1);
            format_rooms(rooms)
        } else {
            row.super_area
                .filter(|a| *a > 0.0)
                .map(format_area)
                .unwrap_or_else(|| AREA_UNKNOWN.to_string())
        };

        let location = [row.locality.as_deref(), row.city.as_deref()]
            .into_iter()
            .filter_map(non_empty)
            .collect::<Vec<_>>()
            .join(", ");

        let title = non_empty(row.title.as_deref())
            .map(str::to_string)
            .unwrap_or_else(|| match row.bhk_type.as_deref().and_then(|b| BhkType::from_label(b).ok()) {
                Some(bhk) => format!("{} {}", bhk.label(), type_label(row.property_type.as_deref())),
                None => type_label(row.property_type.as_deref()),
            });

        ListingRecord {
            id: row.id.clone(),
            title,
            location,
            price,
            area,
            bedrooms,
            bathrooms: row.bathrooms.map(|b| whole(b) as u32),
            image: row
                .images
                .first()
                .cloned()
                .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
            property_type: type_label(row.property_type.as_deref()),
            is_new: row
                .created_at
                .map(|created| created <= now && now - created <= self.new_within)
                .unwrap_or(false),
        }
    }

    /// Tiles that promote a live listing take that listing's id, so the two
    /// collapse under de-duplication.
    pub fn tile(&self, tile: &ContentElement) -> ListingRecord {
        let content = &tile.content;
        let pg = is_pg(content.property_type.as_deref());
        let bedrooms = content
            .bedrooms
            .map(whole)
            .map(|b| b as u32)
            .or_else(|| content.bhk.as_deref().and_then(bedrooms_from_bhk));

        let price = match content.price.as_ref() {
            Some(value) => match value_as_f64(value) {
                Some(p) if pg => format_monthly_price(p),
                Some(p) => format_price(p),
                None => text_or(value, PRICE_ON_REQUEST),
            },
            None => PRICE_ON_REQUEST.to_string(),
        };

        let area_source = content.area.as_ref().or(content.size.as_ref());
        let area = match area_source {
            Some(value) => match value_as_f64(value) {
                Some(n) if pg => format_rooms(whole(n).max(1) as u32),
                Some(n) => format_area(n),
                None => text_or(value, AREA_UNKNOWN),
            },
            None if pg => format_rooms(bedrooms.unwrap_or(1)),
            None => AREA_UNKNOWN.to_string(),
        };

        ListingRecord {
            id: non_empty(content.property_id.as_deref())
                .unwrap_or(tile.id.as_str())
                .to_string(),
            title: non_empty(tile.title.as_deref())
                .unwrap_or("Featured Property")
                .to_string(),
            location: non_empty(content.location.as_deref()).unwrap_or_default().to_string(),
            price,
            area,
            bedrooms,
            bathrooms: None,
            image: non_empty(content.image.as_deref())
                .map(str::to_string)
                .or_else(|| tile.images.first().cloned())
                .unwrap_or_else(|| PLACEHOLDER_IMAGE.to_string()),
            property_type: type_label(content.property_type.as_deref()),
            is_new: content.is_new,
        }
    }
}

fn text_or(value: &Value, fallback: &str) -> String {
    value
        .as_str()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(fallback)
        .to_string()
}

/// Drop records whose id was already seen; the first occurrence wins
pub fn dedupe_by_id(records: Vec<ListingRecord>) -> Vec<ListingRecord> {
    let mut seen = HashSet::new();
    records
        .into_iter()
        .filter(|record| seen.insert(record.id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TileContent;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 16, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_price_thresholds() {
        assert_eq!(format_price(9_999_999.0), "₹99.9 L");
        assert_eq!(format_price(10_000_000.0), "₹1 Cr");
        assert_eq!(format_price(12_500_000.0), "₹1.2 Cr");
        assert_eq!(format_price(20_000_000.0), "₹2 Cr");
        assert_eq!(format_price(4_500_000.0), "₹45 L");
        assert_eq!(format_price(4_550_000.0), "₹45.5 L");
        assert_eq!(format_price(100_000.0), "₹1 L");
        assert_eq!(format_price(25_000.0), "₹25K");
        assert_eq!(format_price(999.0), "₹999");
        assert_eq!(format_price(0.0), "₹0");
    }

    #[test]
    fn test_crore_never_shows_trailing_zero() {
        for v in [10_000_000.0, 10_050_000.0, 30_000_000.0, 990_000_000.0] {
            let out = format_price(v);
            assert!(!out.contains(".0"), "{} -> {}", v, out);
        }
    }

    #[test]
    fn test_indian_grouping() {
        assert_eq!(group_indian(0), "0");
        assert_eq!(group_indian(999), "999");
        assert_eq!(group_indian(8_500), "8,500");
        assert_eq!(group_indian(1_234_567), "12,34,567");
        assert_eq!(group_indian(123_456_789), "12,34,56,789");
    }

    #[test]
    fn test_pg_listing_priced_monthly_and_sized_in_rooms() {
        let row = ListingRow {
            id: "pg1".into(),
            title: Some("Girls PG near campus".into()),
            property_type: Some("pg_hostel".into()),
            expected_price: Some(15_000_000.0),
            super_area: Some(900.0),
            available_rooms: Some(3.0),
            ..Default::default()
        };
        let record = Normalizer::new(7).listing(&row, now());
        assert_eq!(record.price, "₹1,50,00,000/month");
        assert_eq!(record.area, "3 Rooms");
        assert_eq!(record.property_type, "PG Hostel");

        let single = ListingRow {
            available_rooms: None,
            ..row
        };
        assert_eq!(Normalizer::new(7).listing(&single, now()).area, "1 Room");
    }

    #[test]
    fn test_listing_fields() {
        let row = ListingRow {
            id: "a1".into(),
            locality: Some("Baner".into()),
            city: Some("Pune".into()),
            images: vec!["https://img/1.jpg".into(), "https://img/2.jpg".into()],
            property_type: Some("apartment".into()),
            listing_type: Some("sale".into()),
            expected_price: Some(8_200_000.0),
            super_area: Some(1_250.0),
            bhk_type: Some("2bhk".into()),
            bathrooms: Some(2.0),
            created_at: Some(now() - Duration::days(2)),
            ..Default::default()
        };
        let record = Normalizer::new(7).listing(&row, now());

        assert_eq!(record.title, "2 BHK Apartment");
        assert_eq!(record.location, "Baner, Pune");
        assert_eq!(record.price, "₹82 L");
        assert_eq!(record.area, "1,250 sq ft");
        assert_eq!(record.bedrooms, Some(2));
        assert_eq!(record.bathrooms, Some(2));
        assert_eq!(record.image, "https://img/1.jpg");
        assert!(record.is_new);
    }

    #[test]
    fn test_is_new_window() {
        let mut row = ListingRow {
            id: "old".into(),
            created_at: Some(now() - Duration::days(8)),
            ..Default::default()
        };
        let normalizer = Normalizer::new(7);
        assert!(!normalizer.listing(&row, now()).is_new);

        row.created_at = None;
        let record = normalizer.listing(&row, now());
        assert!(!record.is_new);
        assert_eq!(record.price, "Price on Request");
        assert_eq!(record.area, "N/A");
        assert_eq!(record.image, PLACEHOLDER_IMAGE);
    }

    #[test]
    fn test_out_of_range_window_is_clamped() {
        let row = ListingRow {
            id: "old".into(),
            created_at: Some(now() - Duration::days(8)),
            ..Default::default()
        };
        assert!(Normalizer::new(i64::MAX).listing(&row, now()).is_new);
        assert!(!Normalizer::new(-5).listing(&row, now()).is_new);
    }

    #[test]
    fn test_tile_uses_manual_flag_and_keeps_text_price() {
        let tile = ContentElement {
            id: "t1".into(),
            title: Some("Sea-facing villa".into()),
            content: TileContent {
                location: Some("Alibaug".into()),
                price: Some(json!("₹1 Cr")),
                size: Some(json!(2400)),
                bhk: Some("4 BHK".into()),
                property_type: Some("Villa".into()),
                is_new: true,
                ..Default::default()
            },
            images: vec!["https://img/v.jpg".into()],
            is_active: true,
            sort_order: Some(1),
        };
        let record = Normalizer::new(7).tile(&tile);

        assert_eq!(record.id, "t1");
        assert_eq!(record.price, "₹1 Cr");
        assert_eq!(record.area, "2,400 sq ft");
        assert_eq!(record.bedrooms, Some(4));
        assert_eq!(record.image, "https://img/v.jpg");
        assert!(record.is_new);
    }

    #[test]
    fn test_tile_numeric_price_and_listing_reference() {
        let tile = ContentElement {
            id: "t2".into(),
            content: TileContent {
                price: Some(json!(10_000_000)),
                property_id: Some("p42".into()),
                property_type: Some("PG HOSTEL".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let record = Normalizer::new(7).tile(&tile);
        assert_eq!(record.id, "p42");
        assert_eq!(record.price, "₹1,00,00,000/month");
        assert_eq!(record.area, "1 Room");
        assert_eq!(record.title, "Featured Property");
    }

    #[test]
    fn test_dedupe_first_wins_and_is_idempotent() {
        let record = |id: &str, title: &str| ListingRecord {
            id: id.into(),
            title: title.into(),
            location: String::new(),
            price: String::new(),
            area: String::new(),
            bedrooms: None,
            bathrooms: None,
            image: String::new(),
            property_type: String::new(),
            is_new: false,
        };
        let once = dedupe_by_id(vec![
            record("a", "first"),
            record("b", "b"),
            record("a", "second"),
        ]);
        assert_eq!(once.len(), 2);
        assert_eq!(once[0].title, "first");

        let twice = dedupe_by_id(once.clone());
        assert_eq!(twice, once);
    }
}
