//! Property search for the listings marketplace: filter state, routing
//! between the browse and search paths, result normalization, and the
//! backend clients behind them.

pub mod backend;
pub mod config;
pub mod error;
pub mod models;
pub mod search;

pub use backend::{ListingBackend, MemoryBackend, SupabaseBackend};
pub use config::Config;
pub use error::{Result, SearchError, FAILED_TO_LOAD};
pub use models::{ListingRecord, ListingTab, SearchResponse};
pub use search::{FilterUpdate, SearchSession};
