//! Headline, introduction, conclusion and social post for a newsletter issue.

use anyhow::Result;
use chrono::NaiveDate;
use serde::Serialize;
use tracing::info;

use crate::llm::{strip_emphasis, CompletionRequest, RequestKind, TextGenerator};
use crate::prompt::{
    conclusion_prompt, display_date, headline_prompt, introduction_prompt, social_post_prompt,
    CONCLUSION_SYSTEM_ROLE, HEADLINE_SYSTEM_ROLE, INTRODUCTION_SYSTEM_ROLE,
    SOCIAL_POST_SYSTEM_ROLE,
};
use crate::ranking::RankedTitle;
use crate::TARGET_LLM_REQUEST;

pub const HEADLINE_TEMPERATURE: f32 = 0.7;
pub const INTRODUCTION_TEMPERATURE: f32 = 0.4;
pub const CONCLUSION_TEMPERATURE: f32 = 0.4;
pub const SOCIAL_POST_TEMPERATURE: f32 = 0.5;
pub const DEFAULT_SOCIAL_POST_TITLES: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Narrative {
    pub headline: String,
    /// HTML-ready: line breaks are already `<br>`.
    pub introduction: String,
    /// HTML-ready: line breaks are already `<br>`.
    pub conclusion: String,
    pub social_post: String,
}

/// Issue the four narrative requests concurrently. Any failure fails the
/// whole set.
pub async fn generate_narrative<G: TextGenerator>(
    generator: &G,
    model: &str,
    ranked: &[RankedTitle],
    social_titles: usize,
    issue_date: NaiveDate,
) -> Result<Narrative> {
    info!(target: TARGET_LLM_REQUEST, "Generating newsletter narrative with {}", model);

    let (headline, introduction, conclusion, social_post) = tokio::try_join!(
        generate_headline(generator, model, ranked, issue_date),
        generate_introduction(generator, model),
        generate_conclusion(generator, model),
        generate_social_post(generator, model, ranked, social_titles),
    )?;

    Ok(Narrative {
        headline,
        introduction,
        conclusion,
        social_post,
    })
}

pub async fn generate_headline<G: TextGenerator>(
    generator: &G,
    model: &str,
    ranked: &[RankedTitle],
    issue_date: NaiveDate,
) -> Result<String> {
    let titles: Vec<&str> = ranked.iter().map(|t| t.text.as_str()).collect();
    let request = CompletionRequest {
        kind: RequestKind::Headline,
        model: model.to_string(),
        system: HEADLINE_SYSTEM_ROLE.to_string(),
        prompt: headline_prompt(&titles),
        temperature: HEADLINE_TEMPERATURE,
    };

    let response = generator.generate(&request).await?;
    let headline = strip_emphasis(response.trim()).replace('"', "");
    Ok(format!("{} - {}", headline.trim(), display_date(issue_date)))
}

pub async fn generate_introduction<G: TextGenerator>(generator: &G, model: &str) -> Result<String> {
    let request = CompletionRequest {
        kind: RequestKind::Introduction,
        model: model.to_string(),
        system: INTRODUCTION_SYSTEM_ROLE.to_string(),
        prompt: introduction_prompt(),
        temperature: INTRODUCTION_TEMPERATURE,
    };

    let response = generator.generate(&request).await?;
    Ok(html_line_breaks(&strip_emphasis(response.trim())))
}

pub async fn generate_conclusion<G: TextGenerator>(generator: &G, model: &str) -> Result<String> {
    let request = CompletionRequest {
        kind: RequestKind::Conclusion,
        model: model.to_string(),
        system: CONCLUSION_SYSTEM_ROLE.to_string(),
        prompt: conclusion_prompt(),
        temperature: CONCLUSION_TEMPERATURE,
    };

    let response = generator.generate(&request).await?;
    Ok(html_line_breaks(&strip_emphasis(response.trim())))
}

/// Uses the model's own ranked titles, not the reconciled articles, so the
/// post may mention a title that found no feed entry.
pub async fn generate_social_post<G: TextGenerator>(
    generator: &G,
    model: &str,
    ranked: &[RankedTitle],
    max_titles: usize,
) -> Result<String> {
    let titles: Vec<&str> = ranked
        .iter()
        .take(max_titles)
        .map(|t| t.text.as_str())
        .collect();
    let request = CompletionRequest {
        kind: RequestKind::SocialPost,
        model: model.to_string(),
        system: SOCIAL_POST_SYSTEM_ROLE.to_string(),
        prompt: social_post_prompt(&titles),
        temperature: SOCIAL_POST_TEMPERATURE,
    };

    let response = generator.generate(&request).await?;
    Ok(strip_emphasis(response.trim()))
}

fn html_line_breaks(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\n', "<br>")
}
