//! Reduces raw library series data to per-series ownership snapshots

use tracing::debug;

use crate::services::audiobookshelf::AbsSeries;
use crate::services::series_parser::{extract_asin_from_path, parse_series_label};

/// One owned book within a series
#[derive(Debug, Clone, PartialEq)]
pub struct OwnedBook {
    pub asin: String,
    pub order: f64,
    pub title: String,
}

/// Ownership snapshot for one series: what the user has and which book
/// can stand in for the series on catalog lookups
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSnapshot {
    pub name: String,
    pub max_order: f64,
    pub sample_asin: String,
    pub books: Vec<OwnedBook>,
}

/// Build ownership snapshots, one per named series, in listing order.
///
/// A book needs an ASIN to count: the metadata ASIN when set, otherwise
/// one recovered from the file path. The representative `sample_asin` is
/// the first book to push the running order maximum up, falling back to
/// the first resolvable book when nothing is numbered. Series where no
/// book yields an ASIN are dropped.
pub fn build_series_snapshots(series_list: &[AbsSeries]) -> Vec<SeriesSnapshot> {
    let mut snapshots = Vec::new();

    for series in series_list {
        if series.name.is_empty() {
            continue;
        }

        let mut books = Vec::new();
        let mut max_order = 0.0_f64;
        let mut sample_asin: Option<String> = None;

        for item in &series.books {
            let metadata = &item.media.metadata;
            let asin = metadata
                .asin
                .as_deref()
                .filter(|a| !a.is_empty())
                .map(str::to_string)
                .or_else(|| item.path.as_deref().and_then(extract_asin_from_path));

            let Some(asin) = asin else {
                continue;
            };

            let label = metadata.series_name.as_deref().unwrap_or("");
            let order = order_within(label, &series.name);

            if order > max_order {
                max_order = order;
                sample_asin = Some(asin.clone());
            }
            if sample_asin.is_none() {
                sample_asin = Some(asin.clone());
            }

            books.push(OwnedBook {
                asin,
                order,
                title: metadata
                    .title
                    .clone()
                    .unwrap_or_else(|| "Unknown".to_string()),
            });
        }

        match sample_asin {
            Some(sample_asin) => snapshots.push(SeriesSnapshot {
                name: series.name.clone(),
                max_order,
                sample_asin,
                books,
            }),
            None => {
                debug!(series = %series.name, "No book with a resolvable ASIN, dropping series");
            }
        }
    }

    snapshots
}

/// Find a book's order within the named series.
///
/// The label is split on commas since a book can sit in several series at
/// once. An exact name match settles the order immediately; a substring
/// match in either direction holds as the current answer but keeps
/// scanning, so an exact match later in the label still wins.
fn order_within(label: &str, series_name: &str) -> f64 {
    let wanted = series_name.to_lowercase();
    let mut order = 0.0;

    for entry in label.split(',') {
        let (name, parsed_order) = parse_series_label(entry);
        let name = name.to_lowercase();

        if name == wanted {
            return parsed_order;
        }
        if wanted.contains(&name) || name.contains(&wanted) {
            order = parsed_order;
        }
    }

    order
}
