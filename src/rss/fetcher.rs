//! Retrieval of the configured feed.

use anyhow::{anyhow, Result};
use reqwest::header;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use super::client::fetch_with_fallback;
use super::parser::parse_feed;
use super::types::{FeedEntry, MAX_RETRIES, RETRY_DELAY};
use super::util::{decode_body, decompress_body, is_valid_url};
use crate::TARGET_WEB_REQUEST;

/// Download and parse a feed, retrying transient failures.
pub async fn fetch_feed(feed_url: &str) -> Result<Vec<FeedEntry>> {
    if !is_valid_url(feed_url) {
        return Err(anyhow!("Invalid feed URL: {}", feed_url));
    }

    let mut last_error = None;

    for attempt in 1..=MAX_RETRIES {
        info!(target: TARGET_WEB_REQUEST, "Loading feed from {}", feed_url);

        match fetch_once(feed_url).await {
            Ok(entries) => {
                info!(target: TARGET_WEB_REQUEST, "Loaded {} entries from {}", entries.len(), feed_url);
                return Ok(entries);
            }
            Err(err) => {
                warn!(target: TARGET_WEB_REQUEST, "Attempt {}/{} for {} failed: {}", attempt, MAX_RETRIES, feed_url, err);
                last_error = Some(err);
            }
        }

        if attempt < MAX_RETRIES {
            debug!(target: TARGET_WEB_REQUEST, "Retrying {} in {:?}", feed_url, RETRY_DELAY);
            sleep(RETRY_DELAY).await;
        }
    }

    error!(target: TARGET_WEB_REQUEST, "Max retries reached for URL: {}", feed_url);
    Err(last_error
        .unwrap_or_else(|| anyhow!("no attempt was made"))
        .context(format!("Failed to load feed from {}", feed_url)))
}

async fn fetch_once(feed_url: &str) -> Result<Vec<FeedEntry>> {
    let (response, browser_emulation_used) = fetch_with_fallback(feed_url).await?;
    if browser_emulation_used {
        info!(target: TARGET_WEB_REQUEST, "Browser emulation was required for {}", feed_url);
    }

    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|s| s.to_lowercase());
    let content_encoding = response
        .headers()
        .get(header::CONTENT_ENCODING)
        .and_then(|value| value.to_str().ok())
        .map(|s| s.to_lowercase());

    let bytes = response
        .bytes()
        .await
        .map_err(|e| anyhow!("Failed to read response body: {}", e))?;

    let decompressed = decompress_body(&bytes, content_encoding.as_deref(), feed_url);
    let body = decode_body(&decompressed, content_type.as_deref());
    debug!(target: TARGET_WEB_REQUEST, "First 500 characters of response body: {}", body.chars().take(500).collect::<String>());

    parse_feed(&body)
}
