//! Feed parsing for RSS and Atom documents.

use anyhow::{anyhow, Result};
use feed_rs::model::{Entry, MediaObject};
use feed_rs::parser;
use std::io::Cursor;
use tracing::{debug, warn};

use super::types::FeedEntry;
use super::util::cleanup_xml;
use crate::TARGET_WEB_REQUEST;

/// Parse a feed body into entries, retrying once on a cleaned-up copy of the
/// XML when the first attempt fails.
pub fn parse_feed(body: &str) -> Result<Vec<FeedEntry>> {
    let feed = match parser::parse(Cursor::new(body.as_bytes())) {
        Ok(feed) => feed,
        Err(first_err) => {
            let cleaned_xml = cleanup_xml(body);
            if !(cleaned_xml.contains("<rss")
                || cleaned_xml.contains("<feed")
                || cleaned_xml.contains("<rdf:RDF"))
            {
                let preview = if body
                    .chars()
                    .all(|c| c.is_ascii_graphic() || c.is_whitespace())
                {
                    body.chars().take(100).collect::<String>()
                } else {
                    "[binary data]".to_string()
                };
                return Err(anyhow!(
                    "Content is not an RSS or Atom feed. Content preview: {}",
                    preview
                ));
            }

            parser::parse(Cursor::new(cleaned_xml.as_bytes())).map_err(|second_err| {
                anyhow!(
                    "Failed to parse feed even after cleanup. First error: {}. Second error: {}",
                    first_err,
                    second_err
                )
            })?
        }
    };

    let total = feed.entries.len();
    let entries: Vec<FeedEntry> = feed.entries.into_iter().filter_map(map_entry).collect();
    debug!(target: TARGET_WEB_REQUEST, "Parsed feed with {} entries, {} usable", total, entries.len());

    Ok(entries)
}

/// Entries need a title, a link and a publication (or update) timestamp to
/// take part in a run.
fn map_entry(entry: Entry) -> Option<FeedEntry> {
    let Some(link) = entry.links.first().map(|link| link.href.clone()) else {
        warn!(target: TARGET_WEB_REQUEST, "Feed entry {} missing link, skipping", entry.id);
        return None;
    };

    let title = entry
        .title
        .as_ref()
        .map(|t| t.content.trim().to_string())
        .unwrap_or_default();
    if title.is_empty() {
        warn!(target: TARGET_WEB_REQUEST, "Feed entry {} missing title, skipping", link);
        return None;
    }

    let Some(published_at) = entry.published.or(entry.updated) else {
        warn!(target: TARGET_WEB_REQUEST, "Feed entry {} has no publication date, skipping", link);
        return None;
    };

    Some(FeedEntry {
        title,
        link,
        published_at,
        thumbnail_url: resolve_thumbnail(&entry.media),
    })
}

/// A media thumbnail wins over media content; either may live in any of the
/// entry's media objects.
pub fn resolve_thumbnail(media: &[MediaObject]) -> Option<String> {
    let thumbnail = media
        .iter()
        .flat_map(|object| object.thumbnails.iter())
        .map(|thumbnail| thumbnail.image.uri.trim())
        .find(|uri| !uri.is_empty());
    if let Some(uri) = thumbnail {
        return Some(uri.to_string());
    }

    media
        .iter()
        .flat_map(|object| object.content.iter())
        .filter_map(|content| content.url.as_ref().map(|url| url.to_string()))
        .find(|url| !url.is_empty())
}
