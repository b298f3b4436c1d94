//! Console output for run results and cached state

use std::collections::BTreeMap;

use crate::storage::{CacheEntry, ReleaseNotice};

const BANNER_WIDTH: usize = 60;

pub fn print_run_header() {
    println!("{}", "=".repeat(BANNER_WIDTH));
    println!("nextbook - Finding next books in your series");
    println!("{}", "=".repeat(BANNER_WIDTH));
    println!();
}

/// Per-series rundown of owned progress and the next unowned book,
/// alphabetical by series name.
pub fn print_next_books(series: &BTreeMap<String, CacheEntry>) {
    if series.is_empty() {
        println!("No next books found.");
        return;
    }

    println!("\n{}", "=".repeat(BANNER_WIDTH));
    println!("NEXT BOOKS IN YOUR SERIES");
    println!("{}", "=".repeat(BANNER_WIDTH));

    for (name, entry) in series {
        println!("\n{name}");
        println!("  Currently own up to: #{}", entry.owned_max);

        match &entry.next_book {
            Some(book) => {
                println!("  Next book: #{} - {}", book.sequence, book.title);
                println!("  ASIN: {}", book.asin);
                if let Some(date) = book.issue_date.as_deref() {
                    println!("  Release date: {date}");
                }
                if let Some(cover) = book.cover_url.as_deref() {
                    println!("  Cover: {cover}");
                }
            }
            None => println!("  No next book available (series complete or not found)"),
        }
    }

    println!("\n{}", "=".repeat(BANNER_WIDTH));
}

/// Loud banner for series that just gained a next book. Prints nothing
/// when there are none.
pub fn print_new_releases(releases: &[ReleaseNotice]) {
    if releases.is_empty() {
        return;
    }

    println!("\n{}", "*".repeat(BANNER_WIDTH));
    println!("NEW RELEASES DETECTED!");
    println!("{}", "*".repeat(BANNER_WIDTH));

    for release in releases {
        println!("\n  {}", release.series_name);
        println!("    Book #{}: {}", release.sequence, release.title);
        println!("    ASIN: {}", release.asin);
    }

    println!("\n{}", "*".repeat(BANNER_WIDTH));
}

pub fn print_releasing_today(releases: &[ReleaseNotice]) {
    if releases.is_empty() {
        println!("No books releasing today.");
        return;
    }

    println!("Books releasing today:");
    for release in releases {
        println!("\n  {}", release.series_name);
        println!("    Book #{}: {}", release.sequence, release.title);
        println!("    ASIN: {}", release.asin);
        if let Some(date) = release.issue_date.as_deref() {
            println!("    Release date: {date}");
        }
    }
}
