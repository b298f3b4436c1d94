//! nextbook - find the next book in your audiobook series
//!
//! Reconciles an AudioBookShelf library against the Audible catalog to
//! work out the next unowned book in every series, remembers the
//! results between runs, and calls out series that just gained one.

mod cli;
mod config;
mod jobs;
mod report;
mod services;
mod storage;

use std::fs::{self, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::Args;
use crate::config::Config;
use crate::services::{AbsClient, AudibleClient, DiscordNotifier};
use crate::storage::ReleaseCache;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let config = Config::from_env()?;
    init_tracing(&config.log_dir)?;

    let cache = ReleaseCache::new(&config.cache_file);

    if args.show {
        report::print_next_books(&cache.all_series());
        return Ok(());
    }

    if args.releasing_today {
        return run_releasing_today(&config, &cache).await;
    }

    run_check(&args, &config, &cache).await
}

/// The normal run: reconcile, report, notify, persist.
async fn run_check(args: &Args, config: &Config, cache: &ReleaseCache) -> Result<()> {
    report::print_run_header();

    let library = AbsClient::new(
        &config.abs_base_url,
        &config.abs_library_id,
        &config.abs_api_key,
    );
    let catalog = AudibleClient::new(&config.audible_api_url);

    let outcome = jobs::run_series_check(
        &library,
        &catalog,
        cache,
        &config.excluded_series,
        args.force,
    )
    .await?;

    report::print_new_releases(&outcome.new_releases);
    report::print_next_books(&outcome.series);

    if !outcome.new_releases.is_empty() {
        let notifier = DiscordNotifier::new(config.discord_webhook_url.clone());
        notifier.notify_new_releases(&outcome.new_releases).await;
    }

    if !args.console_only {
        cache.set_new_releases(outcome.new_releases)?;
        println!("\nResults saved to {}", config.cache_file);
    }

    Ok(())
}

/// Check cached next books for release dates matching today.
async fn run_releasing_today(config: &Config, cache: &ReleaseCache) -> Result<()> {
    let today = Local::now().date_naive();
    let releases = cache.releasing_today(today);

    report::print_releasing_today(&releases);

    if !releases.is_empty() {
        let notifier = DiscordNotifier::new(config.discord_webhook_url.clone());
        notifier.notify_releasing_today(&releases).await;
    }

    Ok(())
}

/// Console output plus a daily append-mode log file under `log_dir`.
fn init_tracing(log_dir: &str) -> Result<()> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("Failed to create log directory {log_dir}"))?;

    let log_path = Path::new(log_dir).join(format!("{}.log", Local::now().format("%Y-%m-%d")));
    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("Failed to open log file {}", log_path.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nextbook=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Arc::new(log_file)),
        )
        .init();

    info!(log_file = %log_path.display(), "Logging initialized");
    Ok(())
}
