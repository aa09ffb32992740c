//! One newsletter run, from a feed snapshot to finished narrative.
//!
//! Fetching the feed and writing or publishing the result happen outside this
//! module, so a run can be driven entirely from memory.

#[cfg(test)]
mod tests;

use anyhow::Result;
use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::environment::Config;
use crate::llm::TextGenerator;
use crate::narrative::generate_narrative;
use crate::ranking::{request_ranking, RankedTitle};
use crate::reconcile::{reconcile, SelectedArticle, SimilarityMetric};
use crate::rss::{filter_recent, FeedEntry};

/// Tunables for a single run.
#[derive(Debug, Clone)]
pub struct PipelineSettings {
    pub model: String,
    pub limit: usize,
    pub temperature: f32,
    pub match_threshold: u8,
    pub similarity: SimilarityMetric,
    pub recency_window: Duration,
    pub social_titles: usize,
}

impl PipelineSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            model: config.llm.model.clone(),
            limit: config.selection.limit,
            temperature: config.selection.temperature,
            match_threshold: config.selection.match_threshold,
            similarity: config.selection.similarity,
            recency_window: Duration::hours(config.selection.recency_hours),
            social_titles: config.selection.social_titles,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Newsletter {
    pub issue_date: NaiveDate,
    pub headline: String,
    pub introduction: String,
    pub conclusion: String,
    pub social_post: String,
    pub ranked_titles: Vec<RankedTitle>,
    pub articles: Vec<SelectedArticle>,
}

/// How a run ended. Only `Completed` has anything to render; the others are
/// ordinary outcomes, not errors.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RunOutcome {
    NoRecentArticles,
    NoSelections,
    NoMatchingArticles { ranked_titles: Vec<RankedTitle> },
    Completed(Newsletter),
}

impl RunOutcome {
    pub fn newsletter(&self) -> Option<&Newsletter> {
        match self {
            RunOutcome::Completed(newsletter) => Some(newsletter),
            _ => None,
        }
    }
}

/// Calendar date of `now` in `tz`. Headlines, file names and commit messages
/// use the local date.
pub fn issue_date<Tz: TimeZone>(now: DateTime<Utc>, tz: &Tz) -> NaiveDate {
    now.with_timezone(tz).date_naive()
}

/// Run the selection pipeline over `entries` as of `now`.
///
/// Only recent entries are offered to the ranking model, but reconciliation
/// searches the whole feed. Any text-generation failure fails the run.
pub async fn run<G: TextGenerator>(
    entries: &[FeedEntry],
    now: DateTime<Utc>,
    generator: &G,
    settings: &PipelineSettings,
) -> Result<RunOutcome> {
    let recent = filter_recent(entries, now, settings.recency_window);
    if recent.is_empty() {
        warn!("No articles published in the last {} hours", settings.recency_window.num_hours());
        return Ok(RunOutcome::NoRecentArticles);
    }
    info!("{} recent articles out of {} in the feed", recent.len(), entries.len());

    let titles = recent
        .iter()
        .map(|entry| entry.title.as_str())
        .collect::<Vec<_>>()
        .join("\n");

    let ranked = request_ranking(
        generator,
        &settings.model,
        &titles,
        settings.limit,
        settings.temperature,
    )
    .await?;
    if ranked.is_empty() {
        warn!("Ranking response contained no usable titles");
        return Ok(RunOutcome::NoSelections);
    }

    let metric = settings.similarity;
    let articles = reconcile(entries, &ranked, settings.match_threshold, |a, b| {
        metric.score(a, b)
    });
    if articles.is_empty() {
        warn!(
            "None of the {} ranked titles matched a feed entry at threshold {}",
            ranked.len(),
            settings.match_threshold
        );
        return Ok(RunOutcome::NoMatchingArticles {
            ranked_titles: ranked,
        });
    }
    info!("Reconciled {} articles from {} ranked titles", articles.len(), ranked.len());

    let today = issue_date(now, &Local);
    let narrative = generate_narrative(
        generator,
        &settings.model,
        &ranked,
        settings.social_titles,
        today,
    )
    .await?;

    Ok(RunOutcome::Completed(Newsletter {
        issue_date: today,
        headline: narrative.headline,
        introduction: narrative.introduction,
        conclusion: narrative.conclusion,
        social_post: narrative.social_post,
        ranked_titles: ranked,
        articles,
    }))
}
