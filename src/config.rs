use crate::error::{Result, SearchError};
use crate::search::debounce::LOCATION_DEBOUNCE;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_DEBOUNCE_MS: u64 = 300;
pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const DEFAULT_BROWSE_LIMIT: usize = 50;
/// ₹10 Cr, the top of the budget slider.
pub const DEFAULT_BUDGET_MAX: u64 = 100_000_000;
pub const DEFAULT_NEW_LISTING_DAYS: i64 = 7;
/// Upper bound for `NEW_LISTING_DAYS`, about a century.
pub const MAX_NEW_LISTING_DAYS: i64 = 36_500;
pub const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 30;

/// Connection details for the managed backend
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub url: String,
    pub anon_key: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone)]
pub struct Config {
    /// `None` when no backend URL is configured (fixture runs)
    pub backend: Option<BackendConfig>,
    pub debounce: Duration,
    pub page_size: u32,
    pub browse_limit: usize,
    pub budget_max: u64,
    pub new_listing_days: i64,
    pub default_country: Option<String>,
    pub discard_stale_responses: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend: None,
            debounce: LOCATION_DEBOUNCE,
            page_size: DEFAULT_PAGE_SIZE,
            browse_limit: DEFAULT_BROWSE_LIMIT,
            budget_max: DEFAULT_BUDGET_MAX,
            new_listing_days: DEFAULT_NEW_LISTING_DAYS,
            default_country: None,
            discard_stale_responses: true,
        }
    }
}

impl Config {
    /// Load from the process environment, reading `.env` first if present.
    pub fn init() -> Result<Config> {
        dotenv::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let backend = match (read("SUPABASE_URL"), read("SUPABASE_ANON_KEY")) {
            (Some(url), Some(anon_key)) => Some(BackendConfig {
                url: url.trim_end_matches('/').to_string(),
                anon_key,
                timeout: Duration::from_secs(parse_or(
                    read("HTTP_TIMEOUT_SECS"),
                    "HTTP_TIMEOUT_SECS",
                    DEFAULT_HTTP_TIMEOUT_SECS,
                )?),
            }),
            (Some(_), None) => {
                return Err(SearchError::config(
                    "SUPABASE_ANON_KEY must be set when SUPABASE_URL is set",
                ))
            }
            (None, _) => None,
        };

        let debounce_ms = parse_or(read("SEARCH_DEBOUNCE_MS"), "SEARCH_DEBOUNCE_MS", DEFAULT_DEBOUNCE_MS)?;
        let page_size = parse_or(read("SEARCH_PAGE_SIZE"), "SEARCH_PAGE_SIZE", DEFAULT_PAGE_SIZE)?;
        if page_size == 0 {
            return Err(SearchError::config("SEARCH_PAGE_SIZE must be greater than 0"));
        }

        let browse_limit = parse_or(read("BROWSE_LIMIT"), "BROWSE_LIMIT", DEFAULT_BROWSE_LIMIT)?;
        if browse_limit == 0 {
            return Err(SearchError::config("BROWSE_LIMIT must be greater than 0"));
        }
        let new_listing_days = parse_or(read("NEW_LISTING_DAYS"), "NEW_LISTING_DAYS", DEFAULT_NEW_LISTING_DAYS)?;
        if !(1..=MAX_NEW_LISTING_DAYS).contains(&new_listing_days) {
            return Err(SearchError::config(format!(
                "NEW_LISTING_DAYS must be between 1 and {}, got {}",
                MAX_NEW_LISTING_DAYS, new_listing_days
            )));
        }

        Ok(Config {
            backend,
            debounce: Duration::from_millis(debounce_ms),
            page_size,
            browse_limit,
            budget_max: parse_or(read("BUDGET_MAX"), "BUDGET_MAX", DEFAULT_BUDGET_MAX)?,
            new_listing_days,
            default_country: read("DEFAULT_COUNTRY"),
            discard_stale_responses: parse_or(
                read("DISCARD_STALE_RESPONSES"),
                "DISCARD_STALE_RESPONSES",
                true,
            )?,
        })
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, key: &str, default: T) -> Result<T> {
    match raw {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|_| SearchError::config(format!("{} has an invalid value: '{}'", key, value))),
        None => Ok(default),
    }
}
