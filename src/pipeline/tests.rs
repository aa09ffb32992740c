use super::*;
use crate::llm::{CompletionRequest, RequestKind};
use crate::prompt::display_date;
use anyhow::anyhow;
use chrono::FixedOffset;
use std::collections::HashMap;
use std::sync::Mutex;

/// Answers each request kind with a canned response and remembers every
/// request it was sent.
struct StubGenerator {
    responses: HashMap<RequestKind, String>,
    failing: Option<RequestKind>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl StubGenerator {
    fn new(ranking: &str) -> Self {
        let mut responses = HashMap::new();
        responses.insert(RequestKind::Ranking, ranking.to_string());
        responses.insert(RequestKind::Headline, "**\"Today in Tech\"**".to_string());
        responses.insert(
            RequestKind::Introduction,
            "Welcome to **today's** issue.\nEnjoy!".to_string(),
        );
        responses.insert(
            RequestKind::Conclusion,
            "Thanks for reading.\n#Tech #AI".to_string(),
        );
        responses.insert(
            RequestKind::SocialPost,
            "Read today's picks:\n- 🤖 AI\n- 💰 Funding".to_string(),
        );
        Self {
            responses,
            failing: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    fn failing_on(mut self, kind: RequestKind) -> Self {
        self.failing = Some(kind);
        self
    }

    fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn request_for(&self, kind: RequestKind) -> Option<CompletionRequest> {
        self.requests().into_iter().find(|r| r.kind == kind)
    }
}

impl TextGenerator for StubGenerator {
    async fn generate(&self, request: &CompletionRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        if self.failing == Some(request.kind) {
            return Err(anyhow!("service unavailable"));
        }
        Ok(self.responses.get(&request.kind).cloned().unwrap_or_default())
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 10, 15, 12, 0, 0).unwrap()
}

fn entry(title: &str, slug: &str, hours_ago: i64, thumbnail: Option<&str>) -> FeedEntry {
    FeedEntry {
        title: title.to_string(),
        link: format!("https://example.com/{}", slug),
        published_at: now() - Duration::hours(hours_ago),
        thumbnail_url: thumbnail.map(str::to_string),
    }
}

fn feed() -> Vec<FeedEntry> {
    vec![
        entry("AI breakthroughs in 2024", "ai", 2, Some("https://example.com/ai.jpg")),
        entry("New programming language released", "lang", 5, None),
        entry("Startup funding trends", "funding", 20, None),
    ]
}

fn settings() -> PipelineSettings {
    PipelineSettings {
        model: "test-model".to_string(),
        limit: 15,
        temperature: 0.7,
        match_threshold: 60,
        similarity: SimilarityMetric::Levenshtein,
        recency_window: Duration::hours(24),
        social_titles: 5,
    }
}

#[tokio::test]
async fn test_end_to_end_with_verbatim_selections() {
    let generator = StubGenerator::new("AI breakthroughs in 2024\nStartup funding trends");

    let outcome = run(&feed(), now(), &generator, &settings()).await.unwrap();

    let newsletter = outcome.newsletter().expect("run should complete");
    let links: Vec<&str> = newsletter.articles.iter().map(|a| a.link.as_str()).collect();
    assert_eq!(
        links,
        vec!["https://example.com/ai", "https://example.com/funding"]
    );
    assert_eq!(newsletter.articles[0].thumbnail_url, "https://example.com/ai.jpg");
    assert_eq!(newsletter.articles[1].thumbnail_url, "");

    let expected_date = issue_date(now(), &Local);
    assert_eq!(newsletter.issue_date, expected_date);
    assert_eq!(
        newsletter.headline,
        format!("Today in Tech - {}", display_date(expected_date))
    );
    assert_eq!(newsletter.introduction, "Welcome to today's issue.<br>Enjoy!");
    assert_eq!(newsletter.conclusion, "Thanks for reading.<br>#Tech #AI");
    assert!(!newsletter.social_post.is_empty());

    // one ranking call and four narrative calls
    assert_eq!(generator.requests().len(), 5);
}

#[tokio::test]
async fn test_ranking_prompt_lists_recent_titles_only() {
    let mut entries = feed();
    entries.push(entry("Last week's news", "old", 24 * 7, None));
    let generator = StubGenerator::new("AI breakthroughs in 2024");

    run(&entries, now(), &generator, &settings()).await.unwrap();

    let ranking = generator.request_for(RequestKind::Ranking).unwrap();
    assert!(ranking.prompt.contains(
        "AI breakthroughs in 2024\nNew programming language released\nStartup funding trends"
    ));
    assert!(!ranking.prompt.contains("Last week's news"));
    assert_eq!(ranking.temperature, 0.7);
    assert_eq!(ranking.model, "test-model");
}

#[tokio::test]
async fn test_reconciliation_searches_the_whole_feed() {
    let mut entries = feed();
    entries.push(entry("Last week's news", "old", 24 * 7, None));
    let generator = StubGenerator::new("Last week's news");

    let outcome = run(&entries, now(), &generator, &settings()).await.unwrap();

    let newsletter = outcome.newsletter().unwrap();
    assert_eq!(newsletter.articles.len(), 1);
    assert_eq!(newsletter.articles[0].link, "https://example.com/old");
}

#[tokio::test]
async fn test_no_recent_entries_makes_no_calls() {
    let entries = vec![entry("Old story", "old", 48, None)];
    let generator = StubGenerator::new("Old story");

    let outcome = run(&entries, now(), &generator, &settings()).await.unwrap();

    assert_eq!(outcome, RunOutcome::NoRecentArticles);
    assert!(outcome.newsletter().is_none());
    assert!(generator.requests().is_empty());
}

#[tokio::test]
async fn test_empty_feed_makes_no_calls() {
    let generator = StubGenerator::new("anything");

    let outcome = run(&[], now(), &generator, &settings()).await.unwrap();

    assert_eq!(outcome, RunOutcome::NoRecentArticles);
    assert!(generator.requests().is_empty());
}

#[tokio::test]
async fn test_blank_ranking_is_no_selections() {
    let generator = StubGenerator::new("**\n\n\"\"\n");

    let outcome = run(&feed(), now(), &generator, &settings()).await.unwrap();

    assert_eq!(outcome, RunOutcome::NoSelections);
    assert_eq!(generator.requests().len(), 1);
}

#[tokio::test]
async fn test_unmatched_ranking_halts_before_narrative() {
    let generator = StubGenerator::new("Completely different headline about gardening");

    let outcome = run(&feed(), now(), &generator, &settings()).await.unwrap();

    match outcome {
        RunOutcome::NoMatchingArticles { ranked_titles } => {
            assert_eq!(ranked_titles.len(), 1);
            assert_eq!(ranked_titles[0].rank, 1);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(generator.requests().len(), 1);
}

#[tokio::test]
async fn test_ranking_failure_fails_the_run() {
    let generator = StubGenerator::new("AI breakthroughs in 2024").failing_on(RequestKind::Ranking);

    assert!(run(&feed(), now(), &generator, &settings()).await.is_err());
    assert_eq!(generator.requests().len(), 1);
}

#[tokio::test]
async fn test_narrative_failure_fails_the_run() {
    let generator =
        StubGenerator::new("AI breakthroughs in 2024").failing_on(RequestKind::Conclusion);

    assert!(run(&feed(), now(), &generator, &settings()).await.is_err());
}

#[tokio::test]
async fn test_social_post_uses_at_most_five_titles() {
    let ranking = "AI breakthroughs in 2024\nTitle two\nTitle three\nTitle four\nTitle five\nTitle six\nTitle seven";
    let generator = StubGenerator::new(ranking);

    run(&feed(), now(), &generator, &settings()).await.unwrap();

    let social = generator.request_for(RequestKind::SocialPost).unwrap();
    assert!(social.prompt.contains("Title five"));
    assert!(!social.prompt.contains("Title six"));
    assert!(!social.prompt.contains("Title seven"));
    assert_eq!(social.temperature, 0.5);

    // headline sees every ranked title
    let headline = generator.request_for(RequestKind::Headline).unwrap();
    assert!(headline.prompt.contains("Title seven"));
}

#[tokio::test]
async fn test_narrative_temperatures_and_intro_without_titles() {
    let generator = StubGenerator::new("AI breakthroughs in 2024");

    run(&feed(), now(), &generator, &settings()).await.unwrap();

    let intro = generator.request_for(RequestKind::Introduction).unwrap();
    assert_eq!(intro.temperature, 0.4);
    assert!(!intro.prompt.contains("AI breakthroughs"));
    let conclusion = generator.request_for(RequestKind::Conclusion).unwrap();
    assert_eq!(conclusion.temperature, 0.4);
    let headline = generator.request_for(RequestKind::Headline).unwrap();
    assert_eq!(headline.temperature, 0.7);
}

#[tokio::test]
async fn test_limit_is_passed_to_the_prompt() {
    let generator = StubGenerator::new("one\ntwo\nthree");
    let settings = PipelineSettings {
        limit: 2,
        ..settings()
    };

    let outcome = run(&feed(), now(), &generator, &settings).await.unwrap();

    let ranking = generator.request_for(RequestKind::Ranking).unwrap();
    assert!(ranking.prompt.contains("select the 2 titles"));
    match outcome {
        RunOutcome::NoMatchingArticles { ranked_titles } => assert_eq!(ranked_titles.len(), 2),
        other => panic!("unexpected outcome: {:?}", other),
    }
}

#[test]
fn test_issue_date_follows_the_time_zone() {
    let late_evening = Utc.with_ymd_and_hms(2024, 10, 15, 23, 30, 0).unwrap();

    assert_eq!(
        issue_date(late_evening, &Utc),
        NaiveDate::from_ymd_opt(2024, 10, 15).unwrap()
    );
    let paris_summer = FixedOffset::east_opt(2 * 3600).unwrap();
    assert_eq!(
        issue_date(late_evening, &paris_summer),
        NaiveDate::from_ymd_opt(2024, 10, 16).unwrap()
    );
}

#[test]
fn test_outcome_serializes_with_status_tag() {
    let json = serde_json::to_value(RunOutcome::NoSelections).unwrap();
    assert_eq!(json["status"], "no_selections");

    let json = serde_json::to_value(RunOutcome::NoMatchingArticles {
        ranked_titles: vec![RankedTitle {
            rank: 1,
            text: "x".to_string(),
        }],
    })
    .unwrap();
    assert_eq!(json["status"], "no_matching_articles");
    assert_eq!(json["ranked_titles"][0]["text"], "x");
}
