//! Feed retrieval for newsdesk.
//!
//! This module fetches the configured feed, parses it into [`FeedEntry`]
//! values and selects the entries that are recent enough for a run.

mod client;
mod fetcher;
mod parser;
mod recency;
mod types;
mod util;

pub use self::types::*;

pub use self::client::{create_http_client, fetch_with_fallback};
pub use self::fetcher::fetch_feed;
pub use self::parser::{parse_feed, resolve_thumbnail};
pub use self::recency::{filter_recent, DEFAULT_RECENCY_HOURS, MAX_RECENCY_HOURS};
pub use self::util::*;
