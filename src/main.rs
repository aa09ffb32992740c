use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::Parser;
use colored::Colorize;
use serde::Serialize;
use std::env;
use tracing::info;

use newsdesk::environment::Config;
use newsdesk::logging;
use newsdesk::pipeline::{self, PipelineSettings, RunOutcome};
use newsdesk::publish::{self, PublishStatus};
use newsdesk::reconcile::SimilarityMetric;
use newsdesk::render::{self, WrittenPages};
use newsdesk::rss;

#[derive(Parser)]
#[clap(
    name = "newsdesk",
    version,
    about = "Build a daily newsletter from the freshest entries of an RSS feed"
)]
struct Cli {
    /// Feed to read (overrides FEED_URL)
    #[clap(long)]
    feed_url: Option<String>,

    /// Number of titles the model should select (overrides SELECTION_LIMIT)
    #[clap(short, long)]
    limit: Option<usize>,

    /// Minimum 0-100 similarity for a ranked title to match an entry (overrides MATCH_THRESHOLD)
    #[clap(short, long)]
    threshold: Option<u8>,

    /// Title similarity metric (overrides SIMILARITY_METRIC)
    #[clap(long, value_enum)]
    similarity: Option<SimilarityMetric>,

    /// Width of the recency window in hours (overrides RECENCY_HOURS)
    #[clap(long)]
    recency_hours: Option<i64>,

    /// Reference instant in RFC 3339, defaults to the current time
    #[clap(long)]
    now: Option<DateTime<Utc>>,

    /// Write the pages but do not commit or push them
    #[clap(long)]
    no_publish: bool,

    /// Print the run report as JSON
    #[clap(long)]
    json: bool,
}

impl Cli {
    /// Command line flags shadow the environment variable of the same setting.
    fn override_for(&self, key: &str) -> Option<String> {
        match key {
            "FEED_URL" => self.feed_url.clone(),
            "SELECTION_LIMIT" => self.limit.map(|v| v.to_string()),
            "MATCH_THRESHOLD" => self.threshold.map(|v| v.to_string()),
            "SIMILARITY_METRIC" => self.similarity.map(|v| v.to_string()),
            "RECENCY_HOURS" => self.recency_hours.map(|v| v.to_string()),
            "PUBLISH_ENABLED" if self.no_publish => Some("false".to_string()),
            _ => None,
        }
    }
}

#[derive(Serialize)]
struct RunReport<'a> {
    reference_time: DateTime<Utc>,
    outcome: &'a RunOutcome,
    pages: Option<&'a WrittenPages>,
    publish: &'a PublishStatus,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    logging::configure_logging();
    info!(
        "newsdesk {} (git {}, built {})",
        env!("CARGO_PKG_VERSION"),
        option_env!("NEWSDESK_GIT_HASH").unwrap_or("unknown"),
        option_env!("NEWSDESK_BUILD_TIMESTAMP").unwrap_or("unknown")
    );

    let config = Config::from_lookup(|key| cli.override_for(key).or_else(|| env::var(key).ok()))
        .context("Invalid configuration")?;
    info!("Configuration: {:?}", config);

    let now = cli.now.unwrap_or_else(Utc::now);
    let generator = config.llm.build_params();
    let settings = PipelineSettings::from_config(&config);

    let entries = rss::fetch_feed(&config.feed_url).await?;
    info!("Fetched {} entries from {}", entries.len(), config.feed_url);

    let outcome = pipeline::run(&entries, now, &generator, &settings).await?;

    let mut pages = None;
    let mut publish_status = PublishStatus::Skipped;
    if let Some(newsletter) = outcome.newsletter() {
        let written = render::write_pages(newsletter, &config.output).await?;
        publish_status = publish::publish(
            config.publish.as_ref(),
            std::slice::from_ref(&written.blog_page),
            newsletter.issue_date,
        )
        .await;
        pages = Some(written);
    }

    let report = RunReport {
        reference_time: now,
        outcome: &outcome,
        pages: pages.as_ref(),
        publish: &publish_status,
    };
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_report(&report);
    }

    Ok(())
}

fn print_report(report: &RunReport) {
    println!("\n{}", "═".repeat(80).bright_blue());
    println!(
        "{}  {}",
        "NEWSDESK RUN".bright_blue(),
        report.reference_time.to_rfc3339().bright_yellow()
    );
    println!("{}", "═".repeat(80).bright_blue());

    match report.outcome {
        RunOutcome::NoRecentArticles => {
            println!("{}", "No recent articles found in the feed".bright_yellow());
        }
        RunOutcome::NoSelections => {
            println!("{}", "The model selected no titles".bright_yellow());
        }
        RunOutcome::NoMatchingArticles { ranked_titles } => {
            println!(
                "{}",
                "No feed entry matched the selected titles".bright_yellow()
            );
            for title in ranked_titles {
                println!("{}. {}", title.rank, title.text.dimmed());
            }
        }
        RunOutcome::Completed(newsletter) => {
            println!("{}: {}", "Headline".bright_blue(), newsletter.headline.bright_white());
            println!(
                "{}: {}",
                "Ranked titles".bright_blue(),
                newsletter.ranked_titles.len()
            );

            println!("\n{}", "Articles".bright_green());
            println!("{}", "─".repeat(80).dimmed());
            for article in &newsletter.articles {
                println!(
                    "#{} {}\n   {}",
                    article.rank,
                    article.title.bright_white(),
                    article.link.bright_cyan()
                );
            }

            println!("\n{}", "Social post".bright_green());
            println!("{}", "─".repeat(80).dimmed());
            println!("{}", newsletter.social_post);
        }
    }

    if let Some(pages) = report.pages {
        println!("\n{}: {}", "Newsletter page".bright_blue(), pages.newsletter_page.display());
        println!("{}: {}", "Blog page".bright_blue(), pages.blog_page.display());
    }

    let status = match report.publish {
        PublishStatus::Skipped => "skipped".dimmed(),
        PublishStatus::Pushed => "pushed".bright_green(),
        PublishStatus::Failed(reason) => format!("failed: {}", reason).bright_red(),
    };
    println!("{}: {}", "Publish".bright_blue(), status);
    println!("{}", "═".repeat(80).bright_blue());
}
