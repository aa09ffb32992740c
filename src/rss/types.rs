//! Type definitions for the RSS module.

use chrono::{DateTime, Utc};
use tokio::time::Duration;

/// A single article from the source feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedEntry {
    pub title: String,
    pub link: String,
    pub published_at: DateTime<Utc>,
    pub thumbnail_url: Option<String>,
}

impl FeedEntry {
    /// Thumbnail URL, or an empty string when the feed carried none.
    pub fn thumbnail_or_empty(&self) -> &str {
        self.thumbnail_url.as_deref().unwrap_or("")
    }
}

// Constants
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);
pub const RETRY_DELAY: Duration = Duration::from_secs(5);
pub const MAX_RETRIES: usize = 3;
