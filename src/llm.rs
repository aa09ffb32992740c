use anyhow::{anyhow, Result};
use async_openai::types::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use ollama_rs::generation::completion::request::GenerationRequest;
use ollama_rs::generation::options::GenerationOptions;
use std::fmt;
use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{debug, error, info, warn};

use crate::{LLMClient, LLMParams, TARGET_LLM_REQUEST};

/// Which stage of the pipeline issued a request. Used for logging and by test
/// doubles that answer differently per stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    Ranking,
    Headline,
    Introduction,
    Conclusion,
    SocialPost,
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RequestKind::Ranking => "ranking",
            RequestKind::Headline => "headline",
            RequestKind::Introduction => "introduction",
            RequestKind::Conclusion => "conclusion",
            RequestKind::SocialPost => "social post",
        };
        f.write_str(label)
    }
}

/// One system-role + user-prompt exchange with a language model.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub kind: RequestKind,
    pub model: String,
    pub system: String,
    pub prompt: String,
    pub temperature: f32,
}

/// Text generation capability: a prompt goes in, a single block of text
/// comes out. Transport errors are returned as `Err`; an empty string is a
/// valid (if useless) answer.
pub trait TextGenerator: Send + Sync {
    fn generate(
        &self,
        request: &CompletionRequest,
    ) -> impl Future<Output = Result<String>> + Send;
}

impl TextGenerator for LLMParams {
    async fn generate(&self, request: &CompletionRequest) -> Result<String> {
        let max_retries = self.max_retries.max(1);
        let mut backoff = 2;
        let mut last_error = None;

        debug!(target: TARGET_LLM_REQUEST, "Sending {} request to {} with prompt: {}", request.kind, request.model, request.prompt);

        for attempt in 1..=max_retries {
            match timeout(self.request_timeout, send_once(&self.llm_client, request)).await {
                Ok(Ok(text)) => {
                    debug!(target: TARGET_LLM_REQUEST, "{} response received: {}", request.kind, text);
                    return Ok(text);
                }
                Ok(Err(err)) => {
                    warn!(target: TARGET_LLM_REQUEST, "Error generating {} response: {}", request.kind, err);
                    last_error = Some(err);
                }
                Err(_) => {
                    warn!(target: TARGET_LLM_REQUEST, "{} request timed out after {:?}", request.kind, self.request_timeout);
                    last_error = Some(anyhow!(
                        "request timed out after {} seconds",
                        self.request_timeout.as_secs()
                    ));
                }
            }

            if attempt < max_retries {
                info!(target: TARGET_LLM_REQUEST, "Retrying {} request in {}s ({}/{})", request.kind, backoff, attempt, max_retries);
                sleep(Duration::from_secs(backoff)).await;
                backoff *= 2;
            }
        }

        error!(target: TARGET_LLM_REQUEST, "Failed to generate {} response after {} attempts", request.kind, max_retries);
        let err = last_error.unwrap_or_else(|| anyhow!("no attempt was made"));
        Err(err.context(format!(
            "{} request failed after {} attempts",
            request.kind, max_retries
        )))
    }
}

async fn send_once(client: &LLMClient, request: &CompletionRequest) -> Result<String> {
    match client {
        LLMClient::Ollama(ollama) => {
            let mut generation =
                GenerationRequest::new(request.model.clone(), request.prompt.clone());
            generation.system = Some(request.system.clone().into());
            generation.options =
                Some(GenerationOptions::default().temperature(request.temperature));

            let response = ollama
                .generate(generation)
                .await
                .map_err(|e| anyhow!("Ollama error: {}", e))?;
            Ok(response.response)
        }
        LLMClient::OpenAI(openai) => {
            let messages: Vec<ChatCompletionRequestMessage> = vec![
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(request.system.as_str())
                    .build()?
                    .into(),
                ChatCompletionRequestUserMessageArgs::default()
                    .content(request.prompt.as_str())
                    .build()?
                    .into(),
            ];
            let chat = CreateChatCompletionRequestArgs::default()
                .model(request.model.as_str())
                .temperature(request.temperature)
                .messages(messages)
                .build()?;

            let response = openai.chat().create(chat).await?;
            Ok(response
                .choices
                .into_iter()
                .next()
                .and_then(|choice| choice.message.content)
                .unwrap_or_default())
        }
    }
}

/// Remove markdown bold markers, which the model likes to sprinkle anywhere.
pub fn strip_emphasis(text: &str) -> String {
    text.replace("**", "")
}
