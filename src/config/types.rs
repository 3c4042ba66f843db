use std::fmt;

use serde::{Deserialize, Serialize};

pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";

/// Main gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Maximum request body size in bytes
    pub max_payload_size: usize,
    /// Log directory (None = stdout only)
    pub log_dir: Option<String>,
    /// Log level (None = info)
    pub log_level: Option<String>,
    /// Emit logs as JSON lines
    #[serde(default)]
    pub log_json: bool,
    /// Request headers checked, in order, for a caller-supplied request id
    pub request_id_headers: Vec<String>,
    /// Upstream chat-completion settings
    pub completion: CompletionConfig,
    /// Retry settings for upstream calls
    pub retry: RetryConfig,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            max_payload_size: 1024 * 1024,
            log_dir: None,
            log_level: None,
            log_json: false,
            request_id_headers: vec!["x-request-id".to_string(), "x-correlation-id".to_string()],
            completion: CompletionConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

/// Settings for the OpenAI-compatible chat-completion endpoint.
///
/// The api key is redacted from the `Debug` output so the config can be
/// logged at startup.
#[derive(Clone, Serialize, Deserialize)]
pub struct CompletionConfig {
    pub api_key: String,
    /// Base URL up to and including the version segment, e.g. `https://api.groq.com/openai/v1`
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    /// Ask the model for a `json_object` response format
    pub json_mode: bool,
    pub request_timeout_secs: u64,
}

impl CompletionConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Full URL of the chat completions endpoint
    pub fn endpoint(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }
}

impl Default for CompletionConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_GROQ_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            json_mode: true,
            request_timeout_secs: 30,
        }
    }
}

impl fmt::Debug for CompletionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompletionConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("json_mode", &self.json_mode)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .finish()
    }
}

/// Retry configuration for upstream completion calls
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetryConfig {
    /// Total attempts including the first one; 2 means one retry
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub backoff_multiplier: f32,
    pub jitter_factor: f32,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            initial_backoff_ms: 200,
            max_backoff_ms: 2000,
            backoff_multiplier: 2.0,
            jitter_factor: 0.1,
        }
    }
}
