//! Series label and path parsing for audiobook library metadata
//!
//! Parses series labels like:
//! - "The Stormlight Archive #3"
//! - "Dungeon Crawler Carl #1-3"
//! - "Expeditionary Force #7.5"

use once_cell::sync::Lazy;
use regex::Regex;

static SERIES_LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)\s*#(\d+(?:\.\d+)?)(?:-(\d+(?:\.\d+)?))?$").unwrap());

static PATH_ASIN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)_([A-Z0-9]{10})_LC_").unwrap());

/// Parse a series label into its name and order.
///
/// A trailing `#<order>` marker supplies the order; a range like `#1-3`
/// yields the upper bound. Labels without a parseable marker come back
/// whole with order 0, so an unnumbered entry sorts below every numbered
/// one rather than failing the scan.
pub fn parse_series_label(label: &str) -> (String, f64) {
    let trimmed = label.trim();
    let Some(caps) = SERIES_LABEL_RE.captures(trimmed) else {
        return (trimmed.to_string(), 0.0);
    };

    let name = caps[1].trim().to_string();
    let start: f64 = caps[2].parse().unwrap_or(0.0);
    let order = match caps.get(3) {
        Some(end) => start.max(end.as_str().parse().unwrap_or(0.0)),
        None => start,
    };

    (name, order)
}

/// Pull an ASIN out of a download-style file path (`..._B0ABCDEF12_LC_...`).
///
/// Fallback for items whose metadata carries no ASIN. The token is returned
/// as it appears in the path.
pub fn extract_asin_from_path(path: &str) -> Option<String> {
    PATH_ASIN_RE.captures(path).map(|caps| caps[1].to_string())
}
