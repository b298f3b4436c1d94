//! Series reconciliation run
//!
//! Walks every owned series in listing order, resolves the ones whose
//! cached state is stale, picks the next unowned book and records the
//! result. One series at a time; a slow catalog hurts nothing but the
//! clock.

use std::collections::BTreeMap;

use anyhow::Result;
use tracing::{debug, error, info};

use crate::services::audible::CatalogClient;
use crate::services::audiobookshelf::LibraryClient;
use crate::services::library::build_series_snapshots;
use crate::services::next_book::select_next_book;
use crate::services::resolver::resolve_series_books;
use crate::storage::{CacheEntry, ReleaseCache, ReleaseNotice};

/// Counters for one reconciliation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckStats {
    pub updated: u32,
    pub skipped: u32,
    pub excluded: u32,
    pub degraded: u32,
}

/// Everything a run produced
#[derive(Debug)]
pub struct CheckOutcome {
    /// Full cached state after the run, for reporting.
    pub series: BTreeMap<String, CacheEntry>,
    /// Series that flipped from no next book to having one.
    pub new_releases: Vec<ReleaseNotice>,
    pub stats: CheckStats,
}

/// Main series-check entry point.
///
/// Collaborator failures degrade: a dead library means an empty run, a
/// failed resolution means that one series records no next book this
/// time. Only cache writes abort, since losing state defeats the point.
pub async fn run_series_check(
    library: &dyn LibraryClient,
    catalog: &dyn CatalogClient,
    cache: &ReleaseCache,
    excluded: &[String],
    force: bool,
) -> Result<CheckOutcome> {
    info!(job = "series_check", force = force, "Starting series check");

    let series_list = match library.list_series().await {
        Ok(series_list) => series_list,
        Err(e) => {
            error!(
                job = "series_check",
                error = %e,
                "Failed to list library series, nothing to process"
            );
            Vec::new()
        }
    };

    let snapshots = build_series_snapshots(&series_list);
    info!(
        job = "series_check",
        series_count = series_list.len(),
        resolvable = snapshots.len(),
        "Built library snapshots"
    );

    let mut stats = CheckStats::default();
    let mut new_releases = Vec::new();

    for snapshot in &snapshots {
        if excluded.contains(&snapshot.name) {
            info!(series = %snapshot.name, "Skipping excluded series");
            stats.excluded += 1;
            continue;
        }

        if !force && !cache.needs_update(&snapshot.name, snapshot.max_order) {
            debug!(series = %snapshot.name, "Cached state current, skipping");
            stats.skipped += 1;
            continue;
        }

        info!(
            series = %snapshot.name,
            owned_max = snapshot.max_order,
            "Processing series"
        );

        let books = match resolve_series_books(catalog, &snapshot.name, &snapshot.sample_asin).await
        {
            Ok(books) => books,
            Err(e) => {
                error!(
                    series = %snapshot.name,
                    error = %e,
                    "Series resolution failed, treating as unresolved"
                );
                stats.degraded += 1;
                Vec::new()
            }
        };

        let next_book = select_next_book(snapshot.max_order, &books);

        match &next_book {
            Some(book) => {
                info!(
                    series = %snapshot.name,
                    sequence = book.sequence,
                    title = %book.title,
                    "Next book found"
                );
                if cache.is_new_release(&snapshot.name, next_book.as_ref()) {
                    info!(series = %snapshot.name, "New release detected");
                    new_releases.push(ReleaseNotice::for_book(&snapshot.name, book));
                }
            }
            None => {
                debug!(series = %snapshot.name, "No next book (series complete or unresolved)");
            }
        }

        // Always record the pass, even with nothing found, so the grown
        // owned_max keeps future runs from re-resolving needlessly.
        cache.upsert(&snapshot.name, snapshot.max_order, next_book)?;
        stats.updated += 1;
    }

    info!(
        job = "series_check",
        updated = stats.updated,
        skipped = stats.skipped,
        excluded = stats.excluded,
        degraded = stats.degraded,
        releases = new_releases.len(),
        "Series check complete"
    );

    Ok(CheckOutcome {
        series: cache.all_series(),
        new_releases,
        stats,
    })
}
