pub mod environment;
pub mod llm;
pub mod logging;
pub mod narrative;
pub mod pipeline;
pub mod prompt;
pub mod publish;
pub mod ranking;
pub mod reconcile;
pub mod render;
pub mod rss;

use async_openai::{config::OpenAIConfig, Client as OpenAIClient};
use ollama_rs::Ollama;
use std::time::Duration;

pub const TARGET_WEB_REQUEST: &str = "web_request";
pub const TARGET_LLM_REQUEST: &str = "llm_request";
pub const TARGET_PUBLISH: &str = "publish";

#[derive(Clone, Debug)]
pub enum LLMClient {
    Ollama(Ollama),
    OpenAI(OpenAIClient<OpenAIConfig>),
}

/// A configured language model backend. Model identity and temperature travel
/// with each request, so one `LLMParams` serves every stage of a run.
#[derive(Clone, Debug)]
pub struct LLMParams {
    pub llm_client: LLMClient,
    pub max_retries: u32,
    pub request_timeout: Duration,
}
