pub mod browse;
pub mod debounce;
pub mod fetch;
pub mod filters;
pub mod normalize;
pub mod router;
pub mod session;
pub mod share;

pub use browse::BrowseFetcher;
pub use debounce::{Debouncer, LOCATION_DEBOUNCE};
pub use fetch::SearchFetcher;
pub use filters::{BudgetRange, FilterState, FilterStore, FilterUpdate};
pub use normalize::{dedupe_by_id, format_price, Normalizer};
pub use router::{choose_path, FetchPath};
pub use session::{CyclePhase, CycleTicket, SearchEngine, SearchSession};
pub use share::ShareableUrl;
