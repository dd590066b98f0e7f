use crate::error::{Result, SearchError};
use crate::models::{ListingTab, PropertyType};
use crate::search::filters::FilterState;
use serde::{Deserialize, Serialize};

/// The slice of search state carried in a shareable link: active tab,
/// location text and first selected property type
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShareableUrl {
    pub tab: ListingTab,
    pub location: Option<String>,
    pub property_type: Option<PropertyType>,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QueryParams {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    tab: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    property_type: Option<String>,
}

impl ShareableUrl {
    pub fn mirror(tab: ListingTab, state: &FilterState) -> Self {
        let location = state.location.trim();
        Self {
            tab,
            location: (!location.is_empty()).then(|| location.to_string()),
            property_type: state.property_type.first().copied(),
        }
    }

    /// Encode as `type=..&location=..&propertyType=..`
    pub fn to_query(&self) -> Result<String> {
        let params = QueryParams {
            tab: Some(self.tab.as_str().to_string()),
            location: self.location.clone(),
            property_type: self.property_type.map(|p| p.label().to_string()),
        };
        serde_urlencoded::to_string(&params)
            .map_err(|e| SearchError::config(format!("cannot encode share link: {}", e)))
    }

    /// Parse a query string, with or without a leading `?`. A missing tab
    /// falls back to buy; unknown labels are errors.
    pub fn parse(query: &str) -> Result<Self> {
        let params: QueryParams = serde_urlencoded::from_str(query.trim_start_matches('?'))
            .map_err(|e| SearchError::config(format!("malformed share link: {}", e)))?;

        let tab = match params.tab.as_deref() {
            Some(raw) if !raw.trim().is_empty() => raw.parse()?,
            _ => ListingTab::default(),
        };
        let property_type = match params.property_type.as_deref() {
            Some(raw) if !raw.trim().is_empty() => Some(PropertyType::from_label(raw)?),
            _ => None,
        };
        let location = params
            .location
            .map(|l| l.trim().to_string())
            .filter(|l| !l.is_empty());

        Ok(Self {
            tab,
            location,
            property_type,
        })
    }
}
