use clap::Parser;
use sweetsteps_gateway_rs::config::{
    CompletionConfig, ConfigValidator, GatewayConfig, RetryConfig, DEFAULT_GROQ_BASE_URL,
    DEFAULT_MODEL,
};
use sweetsteps_gateway_rs::server;

#[derive(Parser, Debug)]
#[command(name = "sweetsteps-gateway")]
#[command(about = "SweetSteps gateway - turns vague goals into weekly mountains and daily steps")]
#[command(long_about = r#"
SweetSteps gateway - turns vague goals into weekly mountains and daily steps

Forwards goal text to a Groq (OpenAI-compatible) chat-completion model and relays
the JSON reply as {success, data} or {success, error}.

Examples:
  # Minimal, key from the environment
  GROQ_API_KEY=gsk_... sweetsteps-gateway

  # Local development against an OpenAI-compatible mock
  sweetsteps-gateway --host 127.0.0.1 --port 8080 \
    --base-url http://127.0.0.1:9000/v1 --max-attempts 3 --log-level debug
"#)]
struct CliArgs {
    /// Host address to bind the gateway
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port number to bind the gateway
    #[arg(long, env = "PORT", default_value_t = 5000)]
    port: u16,

    /// Groq API key
    #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Base URL of the OpenAI-compatible API, including the version segment
    #[arg(long, env = "GROQ_BASE_URL", default_value = DEFAULT_GROQ_BASE_URL)]
    base_url: String,

    /// Chat model id
    #[arg(long, env = "GROQ_MODEL", default_value = DEFAULT_MODEL)]
    model: String,

    /// Sampling temperature (0.0-2.0)
    #[arg(long, default_value_t = 0.7)]
    temperature: f32,

    /// Do not request `response_format: json_object` from the model
    #[arg(long, default_value_t = false)]
    disable_json_mode: bool,

    /// Timeout in seconds for each completion request
    #[arg(long, default_value_t = 30)]
    request_timeout_secs: u64,

    /// Total attempts per completion, including the first one (1 disables retries)
    #[arg(long, default_value_t = 2)]
    max_attempts: u32,

    /// Initial backoff in milliseconds between attempts
    #[arg(long, default_value_t = 200)]
    retry_initial_backoff_ms: u64,

    /// Maximum backoff in milliseconds between attempts
    #[arg(long, default_value_t = 2000)]
    retry_max_backoff_ms: u64,

    /// Maximum request body size in bytes
    #[arg(long, default_value_t = 1024 * 1024)]
    max_payload_size: usize,

    /// Log level (trace, debug, info, warn, error); RUST_LOG overrides it
    #[arg(long, default_value = "info", value_parser = ["trace", "debug", "info", "warn", "error"])]
    log_level: String,

    /// Directory for daily-rotated log files
    #[arg(long)]
    log_dir: Option<String>,

    /// Emit logs as JSON lines
    #[arg(long, default_value_t = false)]
    log_json: bool,

    /// Headers checked, in order, for a caller-supplied request id
    #[arg(long, value_delimiter = ',', default_value = "x-request-id,x-correlation-id")]
    request_id_headers: Vec<String>,
}

impl CliArgs {
    fn to_gateway_config(&self) -> GatewayConfig {
        GatewayConfig {
            host: self.host.clone(),
            port: self.port,
            max_payload_size: self.max_payload_size,
            log_dir: self.log_dir.clone(),
            log_level: Some(self.log_level.clone()),
            log_json: self.log_json,
            request_id_headers: self.request_id_headers.clone(),
            completion: CompletionConfig {
                api_key: self.api_key.clone(),
                base_url: self.base_url.clone(),
                model: self.model.clone(),
                temperature: self.temperature,
                json_mode: !self.disable_json_mode,
                request_timeout_secs: self.request_timeout_secs,
            },
            retry: RetryConfig {
                max_attempts: self.max_attempts,
                initial_backoff_ms: self.retry_initial_backoff_ms,
                max_backoff_ms: self.retry_max_backoff_ms,
                ..RetryConfig::default()
            },
        }
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let args = CliArgs::parse();
    let config = args.to_gateway_config();
    ConfigValidator::validate(&config)?;

    server::startup(config).await?;
    Ok(())
}
