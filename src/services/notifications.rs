//! Discord webhook notifications for new and releasing books
//!
//! A single webhook URL is the only configuration; when it is absent every
//! send is a no-op. Delivery problems are logged and reported through the
//! return value, never escalated.

use std::time::Duration;

use reqwest::Client;
use serde_json::{Value as JsonValue, json};
use tracing::{error, info};

use crate::storage::ReleaseNotice;

/// Discord caps embeds at 10 per message.
const EMBED_BATCH: usize = 10;
/// Embed accent colors: blue for fresh releases, green for release-day.
const COLOR_NEW_RELEASE: u32 = 5814783;
const COLOR_RELEASING_TODAY: u32 = 3066993;

const WEBHOOK_USERNAME: &str = "NextBook";
const WEBHOOK_TIMEOUT: Duration = Duration::from_secs(10);

/// Sends release alerts to a Discord webhook
pub struct DiscordNotifier {
    client: Client,
    webhook_url: Option<String>,
}

impl DiscordNotifier {
    pub fn new(webhook_url: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(WEBHOOK_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            webhook_url,
        }
    }

    /// Announce newly available next books. Returns whether every batch
    /// was delivered.
    pub async fn notify_new_releases(&self, releases: &[ReleaseNotice]) -> bool {
        self.send_embeds(
            "New Audiobook Released!",
            COLOR_NEW_RELEASE,
            releases,
            "new release(s)",
        )
        .await
    }

    /// Announce books whose release date is today.
    pub async fn notify_releasing_today(&self, releases: &[ReleaseNotice]) -> bool {
        self.send_embeds(
            "Book Releasing Today!",
            COLOR_RELEASING_TODAY,
            releases,
            "book(s) releasing today",
        )
        .await
    }

    async fn send_embeds(
        &self,
        title: &str,
        color: u32,
        releases: &[ReleaseNotice],
        what: &str,
    ) -> bool {
        let Some(url) = self.webhook_url.as_deref() else {
            return false;
        };
        if releases.is_empty() {
            return false;
        }

        let embeds: Vec<JsonValue> = releases
            .iter()
            .map(|release| build_embed(title, color, release))
            .collect();

        for batch in embeds.chunks(EMBED_BATCH) {
            let payload = json!({
                "username": WEBHOOK_USERNAME,
                "embeds": batch,
            });

            match self.client.post(url).json(&payload).send().await {
                Ok(response) if response.status().is_success() => {}
                Ok(response) => {
                    error!(
                        status = %response.status(),
                        "Discord webhook rejected notification"
                    );
                    return false;
                }
                Err(e) => {
                    error!(error = %e, "Failed to send Discord notification");
                    return false;
                }
            }
        }

        info!(count = releases.len(), "Discord notification sent for {}", what);
        true
    }
}

fn build_embed(title: &str, color: u32, release: &ReleaseNotice) -> JsonValue {
    let link = format!("https://www.audible.com/pd/{}", release.asin);
    let mut embed = json!({
        "title": title,
        "description": format!(
            "**{}** Book #{}: {}\n\n[View on Audible]({})",
            release.series_name, release.sequence, release.title, link
        ),
        "color": color,
        "url": link,
    });

    if let Some(cover) = release.cover_url.as_deref() {
        embed["image"] = json!({ "url": cover });
    }

    embed
}
