//! Process configuration, read once from the environment at startup.

use anyhow::{anyhow, Context, Result};
use async_openai::{config::OpenAIConfig, Client as OpenAIClient};
use ollama_rs::Ollama;
use std::env;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::narrative::DEFAULT_SOCIAL_POST_TITLES;
use crate::ranking::{DEFAULT_SELECTION_LIMIT, DEFAULT_SELECTION_TEMPERATURE};
use crate::reconcile::{SimilarityMetric, DEFAULT_MATCH_THRESHOLD};
use crate::rss::{DEFAULT_RECENCY_HOURS, MAX_RECENCY_HOURS};
use crate::{LLMClient, LLMParams};

pub const DEFAULT_MODEL: &str = "gpt-4o-mini-2024-07-18";
pub const DEFAULT_OLLAMA_HOST: &str = "localhost";
pub const DEFAULT_OLLAMA_PORT: u16 = 11434;
pub const DEFAULT_LLM_MAX_RETRIES: u32 = 3;
pub const DEFAULT_LLM_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone)]
pub struct Config {
    pub feed_url: String,
    pub llm: LlmConfig,
    pub selection: SelectionConfig,
    pub output: OutputConfig,
    /// `None` when publishing is disabled.
    pub publish: Option<PublishConfig>,
}

#[derive(Clone)]
pub enum LlmBackend {
    OpenAI { api_key: String },
    Ollama { host: String, port: u16 },
}

impl fmt::Debug for LlmBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LlmBackend::OpenAI { .. } => f
                .debug_struct("OpenAI")
                .field("api_key", &"<redacted>")
                .finish(),
            LlmBackend::Ollama { host, port } => f
                .debug_struct("Ollama")
                .field("host", host)
                .field("port", port)
                .finish(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub backend: LlmBackend,
    pub model: String,
    pub max_retries: u32,
    pub request_timeout: Duration,
}

impl LlmConfig {
    pub fn build_params(&self) -> LLMParams {
        let llm_client = match &self.backend {
            LlmBackend::OpenAI { api_key } => {
                let config = OpenAIConfig::new().with_api_key(api_key.clone());
                LLMClient::OpenAI(OpenAIClient::with_config(config))
            }
            LlmBackend::Ollama { host, port } => LLMClient::Ollama(Ollama::new(host.clone(), *port)),
        };

        LLMParams {
            llm_client,
            max_retries: self.max_retries,
            request_timeout: self.request_timeout,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SelectionConfig {
    pub limit: usize,
    pub temperature: f32,
    pub match_threshold: u8,
    pub similarity: SimilarityMetric,
    pub recency_hours: i64,
    pub social_titles: usize,
}

#[derive(Debug, Clone)]
pub struct OutputConfig {
    pub newsletter_dir: PathBuf,
    pub blog_dir: PathBuf,
}

#[derive(Clone)]
pub struct PublishConfig {
    pub repo_path: PathBuf,
    /// Remote without scheme, e.g. `github.com/owner/repo.git`.
    pub remote: String,
    pub branch: String,
    pub token: String,
}

impl fmt::Debug for PublishConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublishConfig")
            .field("repo_path", &self.repo_path)
            .field("remote", &self.remote)
            .field("branch", &self.branch)
            .field("token", &"<redacted>")
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key/value source. Missing required
    /// values and unparseable numbers are errors.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let feed_url = required(&lookup, "FEED_URL")?;

        let backend = match optional(&lookup, "LLM_TYPE")
            .unwrap_or_else(|| "openai".to_string())
            .to_lowercase()
            .as_str()
        {
            "openai" => LlmBackend::OpenAI {
                api_key: required(&lookup, "OPENAI_API_KEY")?,
            },
            "ollama" => LlmBackend::Ollama {
                host: ollama_host(optional(&lookup, "OLLAMA_HOST"))?,
                port: parsed_or(&lookup, "OLLAMA_PORT", DEFAULT_OLLAMA_PORT)?,
            },
            other => return Err(anyhow!("LLM_TYPE must be 'openai' or 'ollama', got '{}'", other)),
        };

        let max_retries = parsed_or(&lookup, "LLM_MAX_RETRIES", DEFAULT_LLM_MAX_RETRIES)?;
        if max_retries == 0 {
            return Err(anyhow!("LLM_MAX_RETRIES must be at least 1"));
        }

        let llm = LlmConfig {
            backend,
            model: optional(&lookup, "LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            max_retries,
            request_timeout: Duration::from_secs(parsed_or(
                &lookup,
                "LLM_TIMEOUT_SECS",
                DEFAULT_LLM_TIMEOUT_SECS,
            )?),
        };

        let similarity = match optional(&lookup, "SIMILARITY_METRIC") {
            Some(name) => SimilarityMetric::parse(&name)
                .ok_or_else(|| anyhow!("Unknown SIMILARITY_METRIC '{}'", name))?,
            None => SimilarityMetric::default(),
        };

        let selection = SelectionConfig {
            limit: parsed_or(&lookup, "SELECTION_LIMIT", DEFAULT_SELECTION_LIMIT)?,
            temperature: parsed_or(&lookup, "SELECTION_TEMPERATURE", DEFAULT_SELECTION_TEMPERATURE)?,
            match_threshold: parsed_or(&lookup, "MATCH_THRESHOLD", DEFAULT_MATCH_THRESHOLD)?,
            similarity,
            recency_hours: parsed_or(&lookup, "RECENCY_HOURS", DEFAULT_RECENCY_HOURS)?,
            social_titles: DEFAULT_SOCIAL_POST_TITLES,
        };
        selection.validate()?;

        let output = OutputConfig {
            newsletter_dir: optional(&lookup, "NEWSLETTER_DIR")
                .unwrap_or_else(|| "newsletter".to_string())
                .into(),
            blog_dir: optional(&lookup, "BLOG_DIR")
                .unwrap_or_else(|| "newsletter-blog".to_string())
                .into(),
        };

        let publish = if flag_or(&lookup, "PUBLISH_ENABLED", true)? {
            Some(PublishConfig {
                repo_path: optional(&lookup, "PUBLISH_REPO")
                    .unwrap_or_else(|| ".".to_string())
                    .into(),
                remote: required(&lookup, "PUBLISH_REMOTE")?,
                branch: optional(&lookup, "PUBLISH_BRANCH").unwrap_or_else(|| "main".to_string()),
                token: required(&lookup, "GIT_TOKEN")?,
            })
        } else {
            None
        };

        Ok(Config {
            feed_url,
            llm,
            selection,
            output,
            publish,
        })
    }
}

impl SelectionConfig {
    pub fn validate(&self) -> Result<()> {
        if self.limit == 0 {
            return Err(anyhow!("SELECTION_LIMIT must be at least 1"));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(anyhow!(
                "SELECTION_TEMPERATURE must be between 0.0 and 2.0, got {}",
                self.temperature
            ));
        }
        if self.match_threshold > 100 {
            return Err(anyhow!(
                "MATCH_THRESHOLD must be between 0 and 100, got {}",
                self.match_threshold
            ));
        }
        if !(1..=MAX_RECENCY_HOURS).contains(&self.recency_hours) {
            return Err(anyhow!(
                "RECENCY_HOURS must be between 1 and {}, got {}",
                MAX_RECENCY_HOURS,
                self.recency_hours
            ));
        }
        Ok(())
    }
}

/// The Ollama client wants a URL; a bare host name gets `http://`.
fn ollama_host(host: Option<String>) -> Result<String> {
    let host = host.unwrap_or_else(|| DEFAULT_OLLAMA_HOST.to_string());
    let host = if host.contains("://") {
        host
    } else {
        format!("http://{}", host)
    };
    url::Url::parse(&host).with_context(|| format!("Invalid OLLAMA_HOST '{}'", host))?;
    Ok(host)
}

/// A variable that is unset or blank counts as missing.
fn optional<F>(lookup: &F, key: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    optional(lookup, key).ok_or_else(|| anyhow!("{} environment variable must be set", key))
}

fn parsed_or<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional(lookup, key) {
        Some(value) => value
            .parse()
            .with_context(|| format!("Invalid value '{}' for {}", value, key)),
        None => Ok(default),
    }
}

fn flag_or<F>(lookup: &F, key: &str, default: bool) -> Result<bool>
where
    F: Fn(&str) -> Option<String>,
{
    match optional(lookup, key).map(|value| value.to_lowercase()) {
        None => Ok(default),
        Some(value) => match value.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(anyhow!("Invalid boolean '{}' for {}", value, key)),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const MINIMAL: &[(&str, &str)] = &[
        ("FEED_URL", "https://example.com/feed.xml"),
        ("OPENAI_API_KEY", "sk-test"),
        ("PUBLISH_ENABLED", "false"),
    ];

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(MINIMAL)).unwrap();

        assert_eq!(config.feed_url, "https://example.com/feed.xml");
        assert_eq!(config.llm.model, DEFAULT_MODEL);
        assert_eq!(config.llm.max_retries, 3);
        assert_eq!(config.selection.limit, 15);
        assert_eq!(config.selection.temperature, 0.7);
        assert_eq!(config.selection.match_threshold, 60);
        assert_eq!(config.selection.similarity, SimilarityMetric::Levenshtein);
        assert_eq!(config.selection.recency_hours, 24);
        assert_eq!(config.selection.social_titles, 5);
        assert_eq!(config.output.newsletter_dir, PathBuf::from("newsletter"));
        assert!(config.publish.is_none());
        assert!(matches!(config.llm.backend, LlmBackend::OpenAI { .. }));
    }

    #[test]
    fn test_missing_feed_url_is_fatal() {
        let err = Config::from_lookup(lookup_from(&[("OPENAI_API_KEY", "sk-test")])).unwrap_err();
        assert!(err.to_string().contains("FEED_URL"));
    }

    #[test]
    fn test_openai_requires_api_key() {
        let err = Config::from_lookup(lookup_from(&[
            ("FEED_URL", "https://example.com/feed.xml"),
            ("PUBLISH_ENABLED", "false"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_ollama_backend_needs_no_key() {
        let config = Config::from_lookup(lookup_from(&[
            ("FEED_URL", "https://example.com/feed.xml"),
            ("LLM_TYPE", "Ollama"),
            ("OLLAMA_HOST", "gpu-box"),
            ("OLLAMA_PORT", "11500"),
            ("LLM_MODEL", "llama3"),
            ("PUBLISH_ENABLED", "no"),
        ]))
        .unwrap();

        match config.llm.backend {
            LlmBackend::Ollama { ref host, port } => {
                assert_eq!(host, "http://gpu-box");
                assert_eq!(port, 11500);
            }
            _ => panic!("expected the Ollama backend"),
        }
        assert_eq!(config.llm.model, "llama3");
    }

    #[test]
    fn test_publishing_requires_token_and_remote() {
        let err = Config::from_lookup(lookup_from(&[
            ("FEED_URL", "https://example.com/feed.xml"),
            ("OPENAI_API_KEY", "sk-test"),
            ("PUBLISH_REMOTE", "github.com/owner/site.git"),
        ]))
        .unwrap_err();
        assert!(err.to_string().contains("GIT_TOKEN"));

        let config = Config::from_lookup(lookup_from(&[
            ("FEED_URL", "https://example.com/feed.xml"),
            ("OPENAI_API_KEY", "sk-test"),
            ("PUBLISH_REMOTE", "github.com/owner/site.git"),
            ("GIT_TOKEN", "ghp_secret"),
        ]))
        .unwrap();
        let publish = config.publish.unwrap();
        assert_eq!(publish.branch, "main");
        assert_eq!(publish.repo_path, PathBuf::from("."));
        assert!(!format!("{:?}", publish).contains("ghp_secret"));
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("MATCH_THRESHOLD", "sixty"));
        let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(err.to_string().contains("MATCH_THRESHOLD"));

        let mut pairs = MINIMAL.to_vec();
        pairs.push(("MATCH_THRESHOLD", "101"));
        assert!(Config::from_lookup(lookup_from(&pairs)).is_err());

        let mut pairs = MINIMAL.to_vec();
        pairs.push(("SELECTION_LIMIT", "0"));
        assert!(Config::from_lookup(lookup_from(&pairs)).is_err());
    }

    #[test]
    fn test_recency_window_is_bounded() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("RECENCY_HOURS", "3000000000"));
        let err = Config::from_lookup(lookup_from(&pairs)).unwrap_err();
        assert!(err.to_string().contains("RECENCY_HOURS"));

        let mut pairs = MINIMAL.to_vec();
        pairs.push(("RECENCY_HOURS", "0"));
        assert!(Config::from_lookup(lookup_from(&pairs)).is_err());

        let mut pairs = MINIMAL.to_vec();
        pairs.push(("RECENCY_HOURS", "876000"));
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.selection.recency_hours, MAX_RECENCY_HOURS);
    }

    #[test]
    fn test_similarity_metric_from_env() {
        let mut pairs = MINIMAL.to_vec();
        pairs.push(("SIMILARITY_METRIC", "jaro-winkler"));
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(config.selection.similarity, SimilarityMetric::JaroWinkler);
    }

    #[test]
    fn test_api_key_is_not_debug_printed() {
        let config = Config::from_lookup(lookup_from(MINIMAL)).unwrap();
        assert!(!format!("{:?}", config).contains("sk-test"));
    }
}
