//! Selection of feed entries published within a trailing time window.

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use super::types::FeedEntry;
use crate::TARGET_WEB_REQUEST;

pub const DEFAULT_RECENCY_HOURS: i64 = 24;
/// A century; wider windows are rejected at startup.
pub const MAX_RECENCY_HOURS: i64 = 24 * 365 * 100;

/// Returns the entries published in `[now - window, now]`, both ends included,
/// in their original order. A window reaching past the earliest representable
/// instant starts there.
pub fn filter_recent(entries: &[FeedEntry], now: DateTime<Utc>, window: Duration) -> Vec<&FeedEntry> {
    let oldest = now
        .checked_sub_signed(window)
        .unwrap_or(DateTime::<Utc>::MIN_UTC);

    let recent: Vec<&FeedEntry> = entries
        .iter()
        .filter(|entry| oldest <= entry.published_at && entry.published_at <= now)
        .collect();

    debug!(target: TARGET_WEB_REQUEST, "{} of {} entries published since {}", recent.len(), entries.len(), oldest);
    recent
}
