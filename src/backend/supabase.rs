use crate::backend::traits::ListingBackend;
use crate::backend::types::{SearchPage, SearchRequest};
use crate::config::BackendConfig;
use crate::error::{Result, SearchError};
use crate::models::{ContentElement, ListingRow};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::{Client, Request};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

const LISTINGS_TABLE: &str = "properties";
const TILES_TABLE: &str = "content_elements";
const SEARCH_FUNCTION: &str = "search-properties";

/// Client for the hosted backend: PostgREST tables plus the search edge function
pub struct SupabaseBackend {
    client: Client,
    base_url: String,
    headers: HeaderMap,
}

impl SupabaseBackend {
    pub fn new(config: &BackendConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("estate-search/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let mut headers = HeaderMap::new();
        headers.insert("apikey", header_value(&config.anon_key)?);
        headers.insert(
            AUTHORIZATION,
            header_value(&format!("Bearer {}", config.anon_key))?,
        );

        Ok(Self {
            client,
            base_url: config.url.trim_end_matches('/').to_string(),
            headers,
        })
    }

    fn listings_request(&self) -> Result<Request> {
        Ok(self
            .client
            .get(format!("{}/rest/v1/{}", self.base_url, LISTINGS_TABLE))
            .headers(self.headers.clone())
            .query(&[
                ("select", "*"),
                ("is_visible", "eq.true"),
                ("order", "created_at.desc"),
            ])
            .build()?)
    }

    fn tiles_request(&self) -> Result<Request> {
        Ok(self
            .client
            .get(format!("{}/rest/v1/{}", self.base_url, TILES_TABLE))
            .headers(self.headers.clone())
            .query(&[
                ("select", "*"),
                ("element_type", "eq.featured_property"),
                ("is_active", "eq.true"),
                ("order", "sort_order.asc"),
            ])
            .build()?)
    }

    fn search_request(&self, request: &SearchRequest) -> Result<Request> {
        Ok(self
            .client
            .post(format!("{}/functions/v1/{}", self.base_url, SEARCH_FUNCTION))
            .headers(self.headers.clone())
            .json(request)
            .build()?)
    }

    async fn execute<T: DeserializeOwned>(&self, request: Request) -> Result<T> {
        debug!("{} {}", request.method(), request.url());

        let response = self.client.execute(request).await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            warn!("Backend returned status: {}", status);
            return Err(SearchError::Backend {
                status: status.as_u16(),
                message: body,
            });
        }

        debug!("Downloaded {} bytes", body.len());
        Ok(serde_json::from_str(&body)?)
    }
}

fn header_value(raw: &str) -> Result<HeaderValue> {
    HeaderValue::from_str(raw).map_err(|_| SearchError::config("API key contains invalid header characters"))
}

#[async_trait]
impl ListingBackend for SupabaseBackend {
    async fn fetch_public_listings(&self) -> Result<Vec<ListingRow>> {
        let request = self.listings_request()?;
        self.execute(request).await
    }

    async fn fetch_featured_tiles(&self) -> Result<Vec<ContentElement>> {
        let request = self.tiles_request()?;
        self.execute(request).await
    }

    async fn search_listings(&self, request: &SearchRequest) -> Result<SearchPage> {
        let request = self.search_request(request)?;
        self.execute(request).await
    }

    fn source_name(&self) -> &'static str {
        "Supabase"
    }
}
