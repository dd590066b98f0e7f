use crate::search::filters::FilterState;
use serde::Serialize;
use std::fmt;

/// Which retrieval route a fetch cycle takes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FetchPath {
    /// All public listings plus featured tiles, filtered by tab only
    Browse,
    /// Parametrized backend search
    Search,
}

impl fmt::Display for FetchPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchPath::Browse => f.write_str("browse"),
            FetchPath::Search => f.write_str("search"),
        }
    }
}

/// Browse when nothing is constrained: no property type, empty debounced
/// location, every other field at its default. Otherwise search.
pub fn choose_path(state: &FilterState, debounced_location: &str, budget_ceiling: u64) -> FetchPath {
    if state.property_type.is_empty()
        && debounced_location.trim().is_empty()
        && !state.has_criteria(budget_ceiling)
    {
        FetchPath::Browse
    } else {
        FetchPath::Search
    }
}
