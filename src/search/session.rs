//! Per-page search session: owns filter state, results and the fetch cycle.

use crate::backend::{ListingBackend, SearchRequest};
use crate::config::Config;
use crate::error::{Result, FAILED_TO_LOAD};
use crate::models::{ListingTab, PropertyType, SearchResponse};
use crate::search::browse::BrowseFetcher;
use crate::search::debounce::Debouncer;
use crate::search::fetch::SearchFetcher;
use crate::search::filters::{FilterState, FilterStore, FilterUpdate};
use crate::search::normalize::Normalizer;
use crate::search::router::{choose_path, FetchPath};
use crate::search::share::ShareableUrl;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Where the session is in its fetch cycle. Routing and normalization run
/// synchronously inside a cycle and are not observable as phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CyclePhase {
    Idle,
    Fetching,
    Rendered,
    /// Last cycle failed; results are empty and the error string is set
    Failed,
}

#[derive(Debug, Clone)]
enum FetchPlan {
    Browse {
        tab: ListingTab,
    },
    Search {
        request: SearchRequest,
        property_types: Vec<PropertyType>,
        tab: ListingTab,
    },
}

/// A fetch cycle that has been decided but not yet applied
#[derive(Debug, Clone)]
pub struct CycleTicket {
    pub seq: u64,
    pub path: FetchPath,
    plan: FetchPlan,
}

/// Both fetch paths over one backend. Shared between overlapping cycles.
pub struct SearchEngine<B> {
    browse: BrowseFetcher<B>,
    search: SearchFetcher<B>,
}

impl<B: ListingBackend> SearchEngine<B> {
    pub fn new(backend: Arc<B>, config: &Config) -> Self {
        let normalizer = Normalizer::new(config.new_listing_days);
        Self {
            browse: BrowseFetcher::new(backend.clone(), normalizer, config.browse_limit),
            search: SearchFetcher::new(
                backend,
                normalizer,
                config.page_size,
                config.default_country.clone(),
            ),
        }
    }

    /// Run the fetch a ticket describes
    pub async fn execute(&self, ticket: &CycleTicket) -> Result<SearchResponse> {
        let now = Utc::now();
        match &ticket.plan {
            FetchPlan::Browse { tab } => self.browse.fetch(*tab, now).await,
            FetchPlan::Search {
                request,
                property_types,
                tab,
            } => self.search.fetch(request, property_types, *tab, now).await,
        }
    }
}

/// Search state for one page view. Construct one per session; nothing in
/// here is global.
///
/// `set_tab`, `update` and `clear` only edit state so several edits can be
/// batched into one cycle; call `refresh` afterwards. `switch_tab` and
/// `update_and_refresh` edit and run the cycle in one step. Location typing
/// runs its cycle from `settle_location` once the text settles.
pub struct SearchSession<B> {
    engine: Arc<SearchEngine<B>>,
    store: FilterStore,
    location_gate: Debouncer<String>,
    debounced_location: String,
    results: SearchResponse,
    error: Option<String>,
    phase: CyclePhase,
    issued: u64,
    discard_stale: bool,
}

impl<B: ListingBackend> SearchSession<B> {
    pub fn new(backend: Arc<B>, config: &Config) -> Self {
        Self::with_store(backend, config, FilterStore::new(config.budget_max))
    }

    /// Start from a shared link; its location counts as already settled
    pub fn from_share_url(backend: Arc<B>, config: &Config, url: &ShareableUrl) -> Self {
        let mut session = Self::with_store(backend, config, FilterStore::from_share_url(url, config.budget_max));
        session.debounced_location = session.store.state().location.clone();
        session
    }

    fn with_store(backend: Arc<B>, config: &Config, store: FilterStore) -> Self {
        Self {
            engine: Arc::new(SearchEngine::new(backend, config)),
            store,
            location_gate: Debouncer::new(config.debounce),
            debounced_location: String::new(),
            results: SearchResponse::default(),
            error: None,
            phase: CyclePhase::Idle,
            issued: 0,
            discard_stale: config.discard_stale_responses,
        }
    }

    pub fn filters(&self) -> &FilterState {
        self.store.state()
    }

    pub fn tab(&self) -> ListingTab {
        self.store.tab()
    }

    pub fn share_url(&self) -> &ShareableUrl {
        self.store.share_url()
    }

    pub fn results(&self) -> &SearchResponse {
        &self.results
    }

    /// Generic failure message from the last cycle, if it failed
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn phase(&self) -> CyclePhase {
        self.phase
    }

    pub fn debounced_location(&self) -> &str {
        &self.debounced_location
    }

    pub fn engine(&self) -> Arc<SearchEngine<B>> {
        self.engine.clone()
    }

    pub fn set_tab(&mut self, tab: ListingTab) {
        self.store.set_tab(tab);
    }

    /// Switch tabs and fetch for the new tab
    pub async fn switch_tab(&mut self, tab: ListingTab) -> &SearchResponse {
        self.set_tab(tab);
        self.refresh().await
    }

    /// Apply one edit and fetch. A location edit still waits for the
    /// debounce gate; this cycle uses the last settled location.
    pub async fn update_and_refresh(&mut self, update: FilterUpdate) -> &SearchResponse {
        self.update(update);
        self.refresh().await
    }

    /// Replace one filter field. Location edits go through the debounce gate.
    pub fn update(&mut self, update: FilterUpdate) {
        if let FilterUpdate::Location(text) = &update {
            self.location_gate.push(text.clone());
        }
        self.store.update(update);
    }

    /// Record a keystroke in the location box
    pub fn type_location(&mut self, text: impl Into<String>) {
        self.update(FilterUpdate::Location(text.into()));
    }

    /// Set the location and skip the debounce window
    pub fn commit_location(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.location_gate.cancel();
        self.debounced_location = text.clone();
        self.store.update(FilterUpdate::Location(text));
    }

    pub fn clear(&mut self) {
        self.location_gate.cancel();
        self.debounced_location.clear();
        self.store.clear();
    }

    /// Wait for typed location text to settle. Runs a cycle and returns
    /// true only when the settled text differs from the previous one.
    pub async fn settle_location(&mut self) -> bool {
        let Some(settled) = self.location_gate.next().await else {
            return false;
        };
        if settled == self.debounced_location {
            return false;
        }
        debug!("Location settled: '{}'", settled);
        self.debounced_location = settled;
        self.refresh().await;
        true
    }

    /// Run one complete fetch cycle
    pub async fn refresh(&mut self) -> &SearchResponse {
        let ticket = self.begin_cycle();
        let outcome = self.engine.execute(&ticket).await;
        self.apply(&ticket, outcome);
        &self.results
    }

    /// Decide the path for the current state and issue a numbered ticket
    pub fn begin_cycle(&mut self) -> CycleTicket {
        let state = self.store.state();
        let tab = self.store.tab();
        let path = choose_path(state, &self.debounced_location, self.store.budget_ceiling());

        let plan = match path {
            FetchPath::Browse => FetchPlan::Browse { tab },
            FetchPath::Search => FetchPlan::Search {
                request: self.engine.search.build_request(state, tab, &self.debounced_location, 1),
                property_types: state.property_type.clone(),
                tab,
            },
        };

        self.issued += 1;
        self.phase = CyclePhase::Fetching;
        debug!("Cycle {} routed to {} path", self.issued, path);

        CycleTicket {
            seq: self.issued,
            path,
            plan,
        }
    }

    /// Store a cycle's outcome. Returns false when the outcome was discarded
    /// because a newer cycle has been issued since.
    pub fn apply(&mut self, ticket: &CycleTicket, outcome: Result<SearchResponse>) -> bool {
        if self.discard_stale && ticket.seq != self.issued {
            warn!(
                "Discarding response for cycle {}; cycle {} is newer",
                ticket.seq, self.issued
            );
            return false;
        }

        match outcome {
            Ok(response) => {
                info!(
                    "Cycle {} rendered {} records via {}",
                    ticket.seq,
                    response.records.len(),
                    ticket.path
                );
                self.results = response;
                self.error = None;
                self.phase = CyclePhase::Rendered;
            }
            Err(e) => {
                error!("Cycle {} failed: {}", ticket.seq, e);
                self.results = SearchResponse::default();
                self.error = Some(FAILED_TO_LOAD.to_string());
                self.phase = CyclePhase::Failed;
            }
        }
        true
    }
}
