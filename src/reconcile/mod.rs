//! Matching model-selected titles back to the feed entries they came from.
//!
//! The ranking model answers in free text: it may paraphrase, truncate or
//! re-case a title, so there is no join key between its answer and the feed.
//! Entries are paired with ranked titles by approximate string similarity
//! instead.

mod similarity;

pub use self::similarity::{levenshtein_ratio, SimilarityMetric};

use serde::Serialize;
use tracing::debug;

use crate::ranking::RankedTitle;
use crate::rss::FeedEntry;

pub const DEFAULT_MATCH_THRESHOLD: u8 = 60;

/// A feed entry the ranking model picked, ready for presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectedArticle {
    /// Rank of the title this entry matched, starting at 1.
    pub rank: usize,
    pub title: String,
    pub link: String,
    /// Empty when the feed carried no thumbnail.
    pub thumbnail_url: String,
}

/// Normalization applied to both sides before scoring.
pub fn normalize_title(title: &str) -> String {
    title.trim().to_lowercase()
}

/// Pair feed entries with ranked titles.
///
/// Entries are visited in feed order and each one is compared with the ranked
/// titles in rank order; the first title scoring at least `threshold`
/// (inclusive) selects the entry. Entries that match nothing are dropped.
/// Entries are matched independently of each other, so two entries can match
/// the same ranked title.
pub fn reconcile<F>(
    entries: &[FeedEntry],
    ranked: &[RankedTitle],
    threshold: u8,
    similarity: F,
) -> Vec<SelectedArticle>
where
    F: Fn(&str, &str) -> u8,
{
    let normalized_ranked: Vec<(usize, String)> = ranked
        .iter()
        .map(|title| (title.rank, normalize_title(&title.text)))
        .collect();

    let mut selected = Vec::new();

    for entry in entries {
        let entry_title = normalize_title(&entry.title);

        for (rank, ranked_title) in &normalized_ranked {
            let score = similarity(&entry_title, ranked_title);
            if score >= threshold {
                debug!(
                    "Matched '{}' to ranked title #{} '{}' (score {})",
                    entry.title, rank, ranked_title, score
                );
                selected.push(SelectedArticle {
                    rank: *rank,
                    title: entry.title.clone(),
                    link: entry.link.clone(),
                    thumbnail_url: entry.thumbnail_or_empty().to_string(),
                });
                break;
            }
        }
    }

    let unmatched: Vec<&str> = ranked
        .iter()
        .filter(|title| !selected.iter().any(|article| article.rank == title.rank))
        .map(|title| title.text.as_str())
        .collect();
    if !unmatched.is_empty() {
        debug!("Ranked titles without a matching entry: {:?}", unmatched);
    }

    selected
}
