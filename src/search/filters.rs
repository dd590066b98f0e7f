//! Filter state for the search page and the store that owns it.

use crate::error::{Result, SearchError};
use crate::models::{Availability, BhkType, Furnishing, ListingTab, PropertyAge, PropertyType, SortBy};
use crate::search::share::ShareableUrl;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Inclusive price range in rupees
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetRange {
    pub min: u64,
    pub max: u64,
}

impl BudgetRange {
    /// Checked constructor; the store itself never validates ranges
    pub fn new(min: u64, max: u64) -> Result<Self> {
        if min > max {
            return Err(SearchError::InvalidBudget { min, max });
        }
        Ok(Self { min, max })
    }

    /// `[0, ceiling]`
    pub fn full(ceiling: u64) -> Self {
        Self { min: 0, max: ceiling }
    }

    pub fn is_full(&self, ceiling: u64) -> bool {
        self.min == 0 && self.max >= ceiling
    }
}

/// What the user is currently searching for. Multi-select fields keep
/// selection order; the first entry is what gets sent to the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterState {
    pub property_type: Vec<PropertyType>,
    pub bhk_type: Vec<BhkType>,
    pub furnished: Vec<Furnishing>,
    pub availability: Vec<Availability>,
    pub construction: Vec<PropertyAge>,
    pub budget: BudgetRange,
    pub locality: Vec<String>,
    /// Raw text as typed; only its debounced mirror drives fetching
    pub location: String,
    pub sort_by: SortBy,
}

impl FilterState {
    pub fn new(budget_ceiling: u64) -> Self {
        Self {
            property_type: Vec::new(),
            bhk_type: Vec::new(),
            furnished: Vec::new(),
            availability: Vec::new(),
            construction: Vec::new(),
            budget: BudgetRange::full(budget_ceiling),
            locality: Vec::new(),
            location: String::new(),
            sort_by: SortBy::default(),
        }
    }

    /// True when some criterion other than the raw location text differs
    /// from its default
    pub fn has_criteria(&self, budget_ceiling: u64) -> bool {
        !self.property_type.is_empty()
            || !self.bhk_type.is_empty()
            || !self.furnished.is_empty()
            || !self.availability.is_empty()
            || !self.construction.is_empty()
            || !self.locality.is_empty()
            || !self.budget.is_full(budget_ceiling)
            || self.sort_by != SortBy::default()
    }
}

/// One named field and its replacement value
#[derive(Debug, Clone, PartialEq)]
pub enum FilterUpdate {
    PropertyType(Vec<PropertyType>),
    BhkType(Vec<BhkType>),
    Furnished(Vec<Furnishing>),
    Availability(Vec<Availability>),
    Construction(Vec<PropertyAge>),
    Budget(BudgetRange),
    Locality(Vec<String>),
    Location(String),
    SortBy(SortBy),
}

impl FilterUpdate {
    fn field(&self) -> &'static str {
        match self {
            FilterUpdate::PropertyType(_) => "propertyType",
            FilterUpdate::BhkType(_) => "bhkType",
            FilterUpdate::Furnished(_) => "furnished",
            FilterUpdate::Availability(_) => "availability",
            FilterUpdate::Construction(_) => "construction",
            FilterUpdate::Budget(_) => "budget",
            FilterUpdate::Locality(_) => "locality",
            FilterUpdate::Location(_) => "location",
            FilterUpdate::SortBy(_) => "sortBy",
        }
    }
}

/// Owns the filter state and active tab for one page session, and keeps
/// the shareable link in step with every mutation.
#[derive(Debug, Clone)]
pub struct FilterStore {
    state: FilterState,
    tab: ListingTab,
    budget_ceiling: u64,
    share: ShareableUrl,
}

impl FilterStore {
    pub fn new(budget_ceiling: u64) -> Self {
        let state = FilterState::new(budget_ceiling);
        let tab = ListingTab::default();
        Self {
            share: ShareableUrl::mirror(tab, &state),
            state,
            tab,
            budget_ceiling,
        }
    }

    /// Seed a store from a shared link
    pub fn from_share_url(url: &ShareableUrl, budget_ceiling: u64) -> Self {
        let mut store = Self::new(budget_ceiling);
        store.tab = url.tab;
        if let Some(location) = &url.location {
            store.state.location = location.clone();
        }
        if let Some(kind) = url.property_type {
            store.state.property_type = vec![kind];
        }
        store.sync_share();
        store
    }

    pub fn state(&self) -> &FilterState {
        &self.state
    }

    pub fn tab(&self) -> ListingTab {
        self.tab
    }

    pub fn budget_ceiling(&self) -> u64 {
        self.budget_ceiling
    }

    pub fn share_url(&self) -> &ShareableUrl {
        &self.share
    }

    pub fn set_tab(&mut self, tab: ListingTab) {
        self.tab = tab;
        self.sync_share();
    }

    /// Replace exactly one field
    pub fn update(&mut self, update: FilterUpdate) {
        debug!("Filter update: {}", update.field());
        match update {
            FilterUpdate::PropertyType(v) => self.state.property_type = v,
            FilterUpdate::BhkType(v) => self.state.bhk_type = v,
            FilterUpdate::Furnished(v) => self.state.furnished = v,
            FilterUpdate::Availability(v) => self.state.availability = v,
            FilterUpdate::Construction(v) => self.state.construction = v,
            FilterUpdate::Budget(v) => self.state.budget = v,
            FilterUpdate::Locality(v) => self.state.locality = v,
            FilterUpdate::Location(v) => self.state.location = v,
            FilterUpdate::SortBy(v) => self.state.sort_by = v,
        }
        self.sync_share();
    }

    /// Reset every filter field; the active tab is kept
    pub fn clear(&mut self) {
        self.state = FilterState::new(self.budget_ceiling);
        self.sync_share();
    }

    fn sync_share(&mut self) {
        self.share = ShareableUrl::mirror(self.tab, &self.state);
    }
}
