//! Command-line arguments

use clap::Parser;

/// Command-line arguments for nextbook
#[derive(Parser, Debug)]
#[command(name = "nextbook")]
#[command(about = "Find the next book in each of your audiobook series")]
#[command(version)]
pub struct Args {
    /// Only output to console, don't save results to the cache file
    #[arg(long)]
    pub console_only: bool,

    /// Force update all series, ignoring cached state
    #[arg(long)]
    pub force: bool,

    /// Show cached results without fetching new data
    #[arg(long)]
    pub show: bool,

    /// List cached books releasing today and send notifications for them
    #[arg(long)]
    pub releasing_today: bool,
}
