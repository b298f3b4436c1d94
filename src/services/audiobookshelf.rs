//! AudioBookShelf API client for library series data
//!
//! Talks to a self-hosted AudioBookShelf server. Every request carries the
//! user's API token as a bearer header; the series listing is paginated.

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Results per page on the series listing.
const PAGE_SIZE: u32 = 100;

/// Source of owned-library series data.
#[async_trait]
pub trait LibraryClient: Send + Sync {
    /// Fetch every series in the configured library.
    async fn list_series(&self) -> Result<Vec<AbsSeries>>;
}

/// AudioBookShelf API client
pub struct AbsClient {
    client: Client,
    base_url: String,
    library_id: String,
    api_key: String,
}

/// A series from the library, with its member items
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AbsSeries {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub books: Vec<AbsLibraryItem>,
}

/// One audiobook inside a series
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AbsLibraryItem {
    pub path: Option<String>,
    #[serde(default)]
    pub media: AbsMedia,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AbsMedia {
    #[serde(default)]
    pub metadata: AbsMetadata,
}

/// Item metadata. `series_name` holds one comma-separated entry per series
/// the book belongs to, each with its `#order` marker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AbsMetadata {
    pub asin: Option<String>,
    pub title: Option<String>,
    #[serde(rename = "seriesName")]
    pub series_name: Option<String>,
}

/// One page of the series listing
#[derive(Debug, Deserialize)]
struct SeriesPage {
    #[serde(default)]
    results: Vec<AbsSeries>,
    #[serde(default)]
    total: usize,
}

impl AbsClient {
    pub fn new(base_url: &str, library_id: &str, api_key: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            library_id: library_id.to_string(),
            api_key: api_key.to_string(),
        }
    }

    async fn fetch_series_page(&self, page: u32) -> Result<SeriesPage> {
        let url = format!("{}/api/libraries/{}/series", self.base_url, self.library_id);
        let response = self
            .client
            .get(&url)
            .bearer_auth(&self.api_key)
            .query(&[("limit", PAGE_SIZE.to_string()), ("page", page.to_string())])
            .send()
            .await
            .context("Failed to fetch series from AudioBookShelf")?;

        if !response.status().is_success() {
            anyhow::bail!(
                "AudioBookShelf series request failed with status: {}",
                response.status()
            );
        }

        response
            .json()
            .await
            .context("Failed to parse AudioBookShelf series page")
    }
}

#[async_trait]
impl LibraryClient for AbsClient {
    async fn list_series(&self) -> Result<Vec<AbsSeries>> {
        info!("Fetching series from AudioBookShelf");

        let mut all_series = Vec::new();
        let mut page = 0;

        loop {
            let batch = self.fetch_series_page(page).await?;
            let page_len = batch.results.len();
            all_series.extend(batch.results);

            if all_series.len() >= batch.total || page_len == 0 {
                break;
            }
            page += 1;
        }

        debug!(count = all_series.len(), "AudioBookShelf returned series");
        Ok(all_series)
    }
}
