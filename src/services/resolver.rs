//! Resolves a series' full catalog membership from one owned sample book

use std::cmp::Ordering;

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::services::audible::CatalogClient;

/// How many relevance-sorted search results to sift for series members.
const SEARCH_LIMIT: u32 = 50;

/// A catalog book positioned within a series.
///
/// Doubles as the persisted next-book record. Cover and release date stay
/// absent when the catalog has none, rather than collapsing to empty
/// strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesBook {
    pub asin: String,
    pub title: String,
    pub sequence: f64,
    pub cover_url: Option<String>,
    pub issue_date: Option<String>,
}

/// Enumerate the catalog's view of a series, sorted by sequence.
///
/// The sample book's affiliations name the series; the affiliation whose
/// title contains the library's series name is preferred, else the first
/// one. A title search then casts a wide net and only results affiliated
/// with that series ASIN are kept.
///
/// An empty list means the series could not be resolved (sample missing
/// from the catalog, no usable affiliation, or nothing matched). A failing
/// collaborator surfaces as an error so callers can tell the two apart.
pub async fn resolve_series_books(
    catalog: &dyn CatalogClient,
    series_name: &str,
    sample_asin: &str,
) -> Result<Vec<SeriesBook>> {
    let Some(product) = catalog.get_product(sample_asin).await? else {
        debug!(asin = %sample_asin, "Sample book not in catalog");
        return Ok(Vec::new());
    };

    let affiliations = product.series_affiliations();
    let wanted = series_name.to_lowercase();
    let candidate = affiliations
        .iter()
        .find(|s| s.title.to_lowercase().contains(&wanted))
        .or_else(|| affiliations.first());

    let Some(candidate) = candidate else {
        debug!(series = %series_name, "Sample book carries no series affiliation");
        return Ok(Vec::new());
    };
    if candidate.asin.is_empty() {
        debug!(series = %series_name, "Series affiliation has no ASIN");
        return Ok(Vec::new());
    }

    let results = catalog.search_by_title(&candidate.title, SEARCH_LIMIT).await?;

    let mut books = Vec::new();
    for item in results {
        let Some(membership) = item
            .series_affiliations()
            .into_iter()
            .find(|s| s.asin == candidate.asin)
        else {
            continue;
        };

        let cover_url = item.cover_url();
        books.push(SeriesBook {
            asin: item.asin,
            title: item.title.unwrap_or_default(),
            sequence: membership.sequence,
            cover_url,
            issue_date: item.issue_date,
        });
    }

    books.sort_by(|a, b| a.sequence.partial_cmp(&b.sequence).unwrap_or(Ordering::Equal));

    debug!(series = %series_name, count = books.len(), "Resolved series membership");
    Ok(books)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::audible::{Product, ProductSeries};
    use std::collections::HashMap;

    struct MockCatalog {
        product: Option<Product>,
        search_results: Vec<Product>,
        fail_lookup: bool,
        fail_search: bool,
    }

    impl MockCatalog {
        fn new(product: Option<Product>, search_results: Vec<Product>) -> Self {
            Self {
                product,
                search_results,
                fail_lookup: false,
                fail_search: false,
            }
        }
    }

    #[async_trait::async_trait]
    impl CatalogClient for MockCatalog {
        async fn get_product(&self, _asin: &str) -> Result<Option<Product>> {
            if self.fail_lookup {
                anyhow::bail!("catalog unreachable");
            }
            Ok(self.product.clone())
        }

        async fn search_by_title(&self, _title: &str, _limit: u32) -> Result<Vec<Product>> {
            if self.fail_search {
                anyhow::bail!("catalog unreachable");
            }
            Ok(self.search_results.clone())
        }
    }

    fn make_product(asin: &str, title: &str, series: Vec<(&str, &str, &str)>) -> Product {
        Product {
            asin: asin.to_string(),
            title: Some(title.to_string()),
            series: Some(
                series
                    .into_iter()
                    .map(|(s_asin, s_title, seq)| ProductSeries {
                        asin: Some(s_asin.to_string()),
                        title: Some(s_title.to_string()),
                        sequence: Some(seq.to_string()),
                    })
                    .collect(),
            ),
            relationships: None,
            product_images: None,
            issue_date: None,
        }
    }

    #[tokio::test]
    async fn test_missing_sample_resolves_empty() {
        let catalog = MockCatalog::new(None, vec![]);
        let books = resolve_series_books(&catalog, "Cradle", "B0GONE").await.unwrap();
        assert!(books.is_empty());
    }

    #[tokio::test]
    async fn test_no_affiliation_resolves_empty() {
        let mut sample = make_product("B01", "Unsouled", vec![]);
        sample.series = None;
        let catalog = MockCatalog::new(Some(sample), vec![]);
        let books = resolve_series_books(&catalog, "Cradle", "B01").await.unwrap();
        assert!(books.is_empty());
    }

    #[tokio::test]
    async fn test_filters_and_sorts_by_series_membership() {
        let sample = make_product("B02", "Soulsmith", vec![("SER1", "Cradle", "2")]);
        let results = vec![
            make_product("B03", "Blackflame", vec![("SER1", "Cradle", "3")]),
            make_product("B01", "Unsouled", vec![("SER1", "Cradle", "1")]),
            make_product("BXX", "Unrelated", vec![("OTHER", "Elsewhere", "9")]),
        ];
        let catalog = MockCatalog::new(Some(sample), results);

        let books = resolve_series_books(&catalog, "Cradle", "B02").await.unwrap();
        assert_eq!(books.len(), 2);
        assert_eq!(books[0].asin, "B01");
        assert_eq!(books[0].sequence, 1.0);
        assert_eq!(books[1].asin, "B03");
    }

    #[tokio::test]
    async fn test_candidate_matched_by_name_over_first() {
        // Sample sits in two series; the one whose title contains the
        // library name wins even though it is listed second.
        let sample = make_product(
            "B02",
            "Crossover Book",
            vec![("OMNI", "Big Omnibus Collection", "1"), ("SER1", "Cradle", "2")],
        );
        let results = vec![make_product("B03", "Blackflame", vec![("SER1", "Cradle", "3")])];
        let catalog = MockCatalog::new(Some(sample), results);

        let books = resolve_series_books(&catalog, "Cradle", "B02").await.unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].asin, "B03");
    }

    #[tokio::test]
    async fn test_falls_back_to_first_affiliation() {
        let sample = make_product("B02", "Soulsmith", vec![("SER9", "Renamed Series", "2")]);
        let results = vec![make_product("B03", "Book 3", vec![("SER9", "Renamed Series", "3")])];
        let catalog = MockCatalog::new(Some(sample), results);

        let books = resolve_series_books(&catalog, "Cradle", "B02").await.unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].asin, "B03");
    }

    #[tokio::test]
    async fn test_affiliation_without_asin_resolves_empty() {
        let mut sample = make_product("B02", "Soulsmith", vec![]);
        sample.series = Some(vec![ProductSeries {
            asin: None,
            title: Some("Cradle".to_string()),
            sequence: Some("2".to_string()),
        }]);
        let catalog = MockCatalog::new(Some(sample), vec![]);

        let books = resolve_series_books(&catalog, "Cradle", "B02").await.unwrap();
        assert!(books.is_empty());
    }

    #[tokio::test]
    async fn test_carries_cover_and_issue_date() {
        let sample = make_product("B02", "Soulsmith", vec![("SER1", "Cradle", "2")]);
        let mut hit = make_product("B03", "Blackflame", vec![("SER1", "Cradle", "3")]);
        let mut images = HashMap::new();
        images.insert("500".to_string(), "https://img/3.jpg".to_string());
        hit.product_images = Some(images);
        hit.issue_date = Some("2026-09-01".to_string());
        let catalog = MockCatalog::new(Some(sample), vec![hit]);

        let books = resolve_series_books(&catalog, "Cradle", "B02").await.unwrap();
        assert_eq!(books[0].cover_url.as_deref(), Some("https://img/3.jpg"));
        assert_eq!(books[0].issue_date.as_deref(), Some("2026-09-01"));
    }

    #[tokio::test]
    async fn test_lookup_failure_is_an_error() {
        let mut catalog = MockCatalog::new(None, vec![]);
        catalog.fail_lookup = true;
        assert!(resolve_series_books(&catalog, "Cradle", "B02").await.is_err());
    }

    #[tokio::test]
    async fn test_search_failure_is_an_error() {
        let sample = make_product("B02", "Soulsmith", vec![("SER1", "Cradle", "2")]);
        let mut catalog = MockCatalog::new(Some(sample), vec![]);
        catalog.fail_search = true;
        assert!(resolve_series_books(&catalog, "Cradle", "B02").await.is_err());
    }
}
