//! JSON-file cache of per-series next-book state
//!
//! One document holds everything: the per-series entries, the notices from
//! the last run and a freshness stamp. Every mutation rewrites the whole
//! document so a run interrupted halfway keeps the series it already
//! processed.

use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::services::resolver::SeriesBook;

/// Failure writing or encoding the cache document.
///
/// Read-side problems are absorbed (a missing or corrupt cache rebuilds
/// from scratch on the next full pass); write-side problems would silently
/// lose run state, so they surface to the caller.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("failed to write cache file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode cache file: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Cached state for one series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub owned_max: f64,
    pub next_book: Option<SeriesBook>,
}

/// A next book that became available, as handed to notification sinks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReleaseNotice {
    pub series_name: String,
    pub asin: String,
    pub title: String,
    pub sequence: f64,
    pub cover_url: Option<String>,
    pub issue_date: Option<String>,
}

impl ReleaseNotice {
    /// Notice payload for a series' next book.
    pub fn for_book(series_name: &str, book: &SeriesBook) -> Self {
        Self {
            series_name: series_name.to_string(),
            asin: book.asin.clone(),
            title: book.title.clone(),
            sequence: book.sequence,
            cover_url: book.cover_url.clone(),
            issue_date: book.issue_date.clone(),
        }
    }
}

/// The whole persisted document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CacheFile {
    pub last_updated: Option<String>,
    #[serde(default)]
    pub series: BTreeMap<String, CacheEntry>,
    #[serde(default)]
    pub new_releases: Vec<ReleaseNotice>,
}

/// Cache handle bound to a file path
pub struct ReleaseCache {
    path: PathBuf,
}

impl ReleaseCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Read the whole document. Unreadable or corrupt state degrades to an
    /// empty document.
    pub fn load(&self) -> CacheFile {
        if !self.path.exists() {
            return CacheFile::default();
        }

        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Failed to read cache, starting empty");
                return CacheFile::default();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(cache) => cache,
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "Cache file corrupt, starting empty");
                CacheFile::default()
            }
        }
    }

    /// Write the whole document, stamping `last_updated`.
    pub fn save(&self, cache: &mut CacheFile) -> Result<(), CacheError> {
        cache.last_updated = Some(Utc::now().to_rfc3339());
        let body = serde_json::to_string_pretty(cache)?;
        fs::write(&self.path, body)?;
        Ok(())
    }

    /// Cached state for one series, if any.
    pub fn entry(&self, series_name: &str) -> Option<CacheEntry> {
        self.load().series.get(series_name).cloned()
    }

    /// Whether the series needs a catalog pass: unknown series always do,
    /// known ones only once the owned maximum has grown.
    pub fn needs_update(&self, series_name: &str, current_owned_max: f64) -> bool {
        match self.entry(series_name) {
            None => true,
            Some(entry) => current_owned_max > entry.owned_max,
        }
    }

    /// Record the latest state for a series. Read-modify-write of the
    /// whole document, so each processed series is durable on its own.
    pub fn upsert(
        &self,
        series_name: &str,
        owned_max: f64,
        next_book: Option<SeriesBook>,
    ) -> Result<(), CacheError> {
        let mut cache = self.load();
        cache.series.insert(
            series_name.to_string(),
            CacheEntry {
                owned_max,
                next_book,
            },
        );
        self.save(&mut cache)
    }

    /// All cached series state.
    pub fn all_series(&self) -> BTreeMap<String, CacheEntry> {
        self.load().series
    }

    /// Whether this run's result flips the series from "nothing to buy"
    /// to "next book available". First sightings of a series don't count,
    /// and neither does one next book replacing another.
    pub fn is_new_release(&self, series_name: &str, new_next_book: Option<&SeriesBook>) -> bool {
        if new_next_book.is_none() {
            return false;
        }
        match self.entry(series_name) {
            None => false,
            Some(entry) => entry.next_book.is_none(),
        }
    }

    /// Replace the stored list of last-run notices.
    pub fn set_new_releases(&self, releases: Vec<ReleaseNotice>) -> Result<(), CacheError> {
        let mut cache = self.load();
        cache.new_releases = releases;
        self.save(&mut cache)
    }

    /// Notices captured by the most recent full run.
    pub fn new_releases(&self) -> Vec<ReleaseNotice> {
        self.load().new_releases
    }

    /// Cached next books whose release date matches the given day.
    pub fn releasing_today(&self, today: NaiveDate) -> Vec<ReleaseNotice> {
        let date = today.format("%Y-%m-%d").to_string();
        let mut releases = Vec::new();

        for (name, entry) in self.load().series {
            let Some(book) = entry.next_book else {
                continue;
            };
            if book.issue_date.as_deref() == Some(date.as_str()) {
                releases.push(ReleaseNotice::for_book(&name, &book));
            }
        }

        releases
    }
}
