//! Chat-completion client for Groq's OpenAI-compatible API.
//!
//! The client sends one prompt and turns the model's message content into a
//! `serde_json::Value`. Every failure mode comes back as a typed
//! [`CompletionError`]. Nothing here panics.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::{debug, warn};

use crate::config::CompletionConfig;
use crate::prompts::Prompt;
use crate::protocols::chat::{ChatCompletionRequest, ChatCompletionResponse, ResponseFormat};

const MAX_ERROR_BODY_CHARS: usize = 512;

#[derive(Debug, thiserror::Error)]
pub enum CompletionError {
    #[error("completion request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("completion API returned status {status}: {body}")]
    UpstreamStatus { status: u16, body: String },

    #[error("malformed completion response: {0}")]
    MalformedEnvelope(String),

    #[error("model returned invalid JSON: {0}")]
    InvalidJson(String),
}

impl CompletionError {
    /// Whether another attempt could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            CompletionError::Transport(_)
            | CompletionError::MalformedEnvelope(_)
            | CompletionError::InvalidJson(_) => true,
            CompletionError::UpstreamStatus { status, .. } => {
                matches!(*status, 408 | 429) || (500..=599).contains(status)
            }
        }
    }

    /// The model answered, but not with parseable JSON
    pub fn is_parse_failure(&self) -> bool {
        matches!(
            self,
            CompletionError::MalformedEnvelope(_) | CompletionError::InvalidJson(_)
        )
    }
}

pub type CompletionResult<T> = Result<T, CompletionError>;

/// Anything that can turn a prompt into a JSON value
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(&self, prompt: &Prompt) -> CompletionResult<Value>;

    /// Model identifier, for logging
    fn model(&self) -> &str;
}

#[derive(Debug, Clone)]
pub struct GroqClient {
    client: reqwest::Client,
    config: CompletionConfig,
    endpoint: String,
}

impl GroqClient {
    /// Build a client with its own connection pool and the configured timeout
    pub fn new(config: CompletionConfig) -> CompletionResult<Self> {
        let client = reqwest::Client::builder()
            .pool_idle_timeout(Some(Duration::from_secs(50)))
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: reqwest::Client, config: CompletionConfig) -> Self {
        let endpoint = config.endpoint();
        Self {
            client,
            config,
            endpoint,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn build_request(&self, prompt: &Prompt) -> ChatCompletionRequest {
        ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: prompt.to_messages(),
            temperature: self.config.temperature,
            response_format: self.config.json_mode.then(ResponseFormat::json_object),
        }
    }
}

#[async_trait]
impl CompletionBackend for GroqClient {
    async fn complete(&self, prompt: &Prompt) -> CompletionResult<Value> {
        let request = self.build_request(prompt);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            let body = truncate(&String::from_utf8_lossy(&body), MAX_ERROR_BODY_CHARS);
            warn!(status = status.as_u16(), body = %body, "Completion API returned an error status");
            return Err(CompletionError::UpstreamStatus {
                status: status.as_u16(),
                body,
            });
        }

        parse_completion_body(&body)
    }

    fn model(&self) -> &str {
        &self.config.model
    }
}

/// Extract `choices[0].message.content` from a raw response body and parse it as JSON
pub fn parse_completion_body(body: &[u8]) -> CompletionResult<Value> {
    let envelope: ChatCompletionResponse = serde_json::from_slice(body)
        .map_err(|e| CompletionError::MalformedEnvelope(e.to_string()))?;

    let content = envelope.first_content().ok_or_else(|| {
        CompletionError::MalformedEnvelope("missing choices[0].message.content".to_string())
    })?;

    parse_content(content)
}

/// Parse model output as JSON, tolerating surrounding whitespace and a markdown code fence
pub fn parse_content(content: &str) -> CompletionResult<Value> {
    let text = strip_code_fence(content);
    serde_json::from_str(text).map_err(|e| {
        debug!(content = %truncate(content, MAX_ERROR_BODY_CHARS), "Model content is not JSON");
        CompletionError::InvalidJson(e.to_string())
    })
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let Some(inner) = rest.strip_suffix("```") else {
        return trimmed;
    };
    // drop an info string such as `json` on the opening fence line
    match inner.split_once('\n') {
        Some((info, body)) if !info.trim_start().starts_with(['{', '[']) => body.trim(),
        _ => inner.trim(),
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let mut cut: String = text.chars().take(max_chars).collect();
        cut.push('…');
        cut
    }
}
