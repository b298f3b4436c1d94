//! Application configuration management

use std::env;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    /// AudioBookShelf server base URL
    pub abs_base_url: String,

    /// UUID of the AudioBookShelf library holding the audiobooks
    pub abs_library_id: String,

    /// AudioBookShelf API token
    pub abs_api_key: String,

    /// Audible catalog API base URL
    pub audible_api_url: String,

    /// Discord webhook for new-release notifications (unset = disabled)
    pub discord_webhook_url: Option<String>,

    /// JSON file where per-series state is cached between runs
    pub cache_file: String,

    /// Series names to skip entirely
    pub excluded_series: Vec<String>,

    /// Directory for daily log files
    pub log_dir: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            abs_base_url: env::var("ABS_BASE_URL").context("ABS_BASE_URL is required")?,

            abs_library_id: env::var("ABS_LIBRARY_ID").context("ABS_LIBRARY_ID is required")?,

            abs_api_key: env::var("ABS_API_KEY").context("ABS_API_KEY is required")?,

            audible_api_url: env::var("AUDIBLE_API_URL")
                .unwrap_or_else(|_| "https://api.audible.com/1.0".to_string()),

            discord_webhook_url: env::var("DISCORD_WEBHOOK_URL")
                .ok()
                .filter(|url| !url.is_empty()),

            cache_file: env::var("CACHE_FILE").unwrap_or_else(|_| "./next_books.json".to_string()),

            excluded_series: env::var("EXCLUDED_SERIES")
                .map(|raw| parse_series_list(&raw))
                .unwrap_or_default(),

            log_dir: env::var("LOG_DIR").unwrap_or_else(|_| "./logs".to_string()),
        })
    }
}

/// Split a comma-separated series list, dropping blanks.
fn parse_series_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}
