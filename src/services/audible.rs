//! Audible catalog API client for product and series lookups
//!
//! Uses the public catalog endpoints, which serve product metadata without
//! authentication. Base URL: https://api.audible.com/1.0

use std::collections::HashMap;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Response groups requested on every product call: `series` carries the
/// affiliation list, `product_attrs` the release date and `media` the
/// cover image map.
const RESPONSE_GROUPS: &str = "series,product_attrs,media";

/// Source of catalog metadata.
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Look up a single product by ASIN. `None` means the catalog carries
    /// no such product; transport and decode failures are errors.
    async fn get_product(&self, asin: &str) -> Result<Option<Product>>;

    /// Relevance-sorted title search.
    async fn search_by_title(&self, title: &str, limit: u32) -> Result<Vec<Product>>;
}

/// Audible catalog API client
pub struct AudibleClient {
    client: Client,
    base_url: String,
}

/// A catalog product
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub asin: String,
    pub title: Option<String>,
    pub series: Option<Vec<ProductSeries>>,
    pub relationships: Option<Vec<Relationship>>,
    pub product_images: Option<HashMap<String, String>>,
    pub issue_date: Option<String>,
}

/// Series affiliation from the product's `series` field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductSeries {
    pub asin: Option<String>,
    pub title: Option<String>,
    pub sequence: Option<String>,
}

/// Entry from the product's `relationships` field
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Relationship {
    pub asin: Option<String>,
    pub title: Option<String>,
    pub sequence: Option<String>,
    pub relationship_type: Option<String>,
    pub relationship_to_product: Option<String>,
}

/// A series affiliation with its sequence parsed to a number
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesAffiliation {
    pub asin: String,
    pub title: String,
    pub sequence: f64,
}

#[derive(Debug, Deserialize)]
struct ProductsResponse {
    #[serde(default)]
    products: Vec<Product>,
}

impl AudibleClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl CatalogClient for AudibleClient {
    async fn get_product(&self, asin: &str) -> Result<Option<Product>> {
        debug!(asin = %asin, "Fetching product from Audible");

        let url = format!("{}/catalog/products", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[("asins", asin), ("response_groups", RESPONSE_GROUPS)])
            .send()
            .await
            .context("Failed to fetch product from Audible")?;

        if !response.status().is_success() {
            anyhow::bail!(
                "Audible product request failed with status: {}",
                response.status()
            );
        }

        let body: ProductsResponse = response
            .json()
            .await
            .context("Failed to parse Audible product response")?;

        Ok(body.products.into_iter().next())
    }

    async fn search_by_title(&self, title: &str, limit: u32) -> Result<Vec<Product>> {
        info!(title = %title, "Searching Audible catalog");

        let url = format!("{}/catalog/products", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("num_results", limit.to_string()),
                ("products_sort_by", "Relevance".to_string()),
                ("title", title.to_string()),
                ("response_groups", RESPONSE_GROUPS.to_string()),
            ])
            .send()
            .await
            .context("Failed to search Audible catalog")?;

        if !response.status().is_success() {
            anyhow::bail!("Audible search failed with status: {}", response.status());
        }

        let body: ProductsResponse = response
            .json()
            .await
            .context("Failed to parse Audible search response")?;

        debug!(count = body.products.len(), "Audible search returned products");
        Ok(body.products)
    }
}

impl Product {
    /// Series affiliations with usable numeric sequences.
    ///
    /// The `series` field is the cleaner source and wins when it yields
    /// anything; `relationships` entries of type `series` are the fallback,
    /// minus `merchant_title_authority` listings. In both sources a
    /// "Dramatized Adaptation" sequence disqualifies the entry, an empty
    /// sequence counts as 0 and a non-numeric one is dropped.
    pub fn series_affiliations(&self) -> Vec<SeriesAffiliation> {
        let mut affiliations = Vec::new();

        for entry in self.series.as_deref().unwrap_or_default() {
            if let Some(parsed) = parse_affiliation(
                entry.asin.as_deref(),
                entry.title.as_deref(),
                entry.sequence.as_deref(),
            ) {
                affiliations.push(parsed);
            }
        }

        if affiliations.is_empty() {
            for rel in self.relationships.as_deref().unwrap_or_default() {
                if rel.relationship_type.as_deref() != Some("series") {
                    continue;
                }
                if rel.relationship_to_product.as_deref() == Some("merchant_title_authority") {
                    continue;
                }
                if let Some(parsed) = parse_affiliation(
                    rel.asin.as_deref(),
                    rel.title.as_deref(),
                    rel.sequence.as_deref(),
                ) {
                    affiliations.push(parsed);
                }
            }
        }

        affiliations
    }

    /// Cover image URL at the 500px size, when the media group returned one.
    pub fn cover_url(&self) -> Option<String> {
        self.product_images
            .as_ref()
            .and_then(|images| images.get("500").cloned())
    }
}

fn parse_affiliation(
    asin: Option<&str>,
    title: Option<&str>,
    sequence: Option<&str>,
) -> Option<SeriesAffiliation> {
    let sequence = sequence.unwrap_or("");
    if sequence.to_lowercase().contains("dramatized") {
        return None;
    }

    let sequence = if sequence.is_empty() {
        0.0
    } else {
        sequence.parse().ok()?
    };

    Some(SeriesAffiliation {
        asin: asin.unwrap_or_default().to_string(),
        title: title.unwrap_or_default().to_string(),
        sequence,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare_product() -> Product {
        Product {
            asin: "B000000000".to_string(),
            title: Some("Some Book".to_string()),
            series: None,
            relationships: None,
            product_images: None,
            issue_date: None,
        }
    }

    fn series_entry(asin: &str, title: &str, sequence: &str) -> ProductSeries {
        ProductSeries {
            asin: Some(asin.to_string()),
            title: Some(title.to_string()),
            sequence: Some(sequence.to_string()),
        }
    }

    fn relationship(asin: &str, rel_type: &str, to_product: &str, sequence: &str) -> Relationship {
        Relationship {
            asin: Some(asin.to_string()),
            title: Some("Rel Series".to_string()),
            sequence: Some(sequence.to_string()),
            relationship_type: Some(rel_type.to_string()),
            relationship_to_product: Some(to_product.to_string()),
        }
    }

    #[test]
    fn test_series_field_preferred_over_relationships() {
        let mut product = bare_product();
        product.series = Some(vec![series_entry("S1", "Series One", "3")]);
        product.relationships = Some(vec![relationship("S2", "series", "child", "4")]);

        let affiliations = product.series_affiliations();
        assert_eq!(affiliations.len(), 1);
        assert_eq!(affiliations[0].asin, "S1");
        assert_eq!(affiliations[0].sequence, 3.0);
    }

    #[test]
    fn test_relationships_used_when_series_yields_nothing() {
        let mut product = bare_product();
        // Only a dramatized entry in the series field, so it contributes nothing.
        product.series = Some(vec![series_entry(
            "S1",
            "Series One",
            "Dramatized Adaptation",
        )]);
        product.relationships = Some(vec![
            relationship("S2", "series", "child", "4"),
            relationship("X1", "season", "child", "1"),
        ]);

        let affiliations = product.series_affiliations();
        assert_eq!(affiliations.len(), 1);
        assert_eq!(affiliations[0].asin, "S2");
        assert_eq!(affiliations[0].sequence, 4.0);
    }

    #[test]
    fn test_merchant_title_authority_excluded() {
        let mut product = bare_product();
        product.relationships = Some(vec![relationship(
            "S1",
            "series",
            "merchant_title_authority",
            "2",
        )]);
        assert!(product.series_affiliations().is_empty());
    }

    #[test]
    fn test_empty_sequence_parses_as_zero() {
        let mut product = bare_product();
        product.series = Some(vec![series_entry("S1", "Series One", "")]);
        assert_eq!(product.series_affiliations()[0].sequence, 0.0);
    }

    #[test]
    fn test_non_numeric_sequence_dropped() {
        let mut product = bare_product();
        product.series = Some(vec![
            series_entry("S1", "Series One", "bonus"),
            series_entry("S2", "Series Two", "2.5"),
        ]);

        let affiliations = product.series_affiliations();
        assert_eq!(affiliations.len(), 1);
        assert_eq!(affiliations[0].asin, "S2");
        assert_eq!(affiliations[0].sequence, 2.5);
    }

    #[test]
    fn test_cover_url_picks_500_variant() {
        let mut product = bare_product();
        assert_eq!(product.cover_url(), None);

        let mut images = HashMap::new();
        images.insert("252".to_string(), "https://img/252.jpg".to_string());
        images.insert("500".to_string(), "https://img/500.jpg".to_string());
        product.product_images = Some(images);
        assert_eq!(product.cover_url().as_deref(), Some("https://img/500.jpg"));
    }
}
