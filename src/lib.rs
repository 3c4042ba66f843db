pub mod coach;
pub mod completion;
pub mod config;
pub mod error;
pub mod logging;
pub mod middleware;
pub mod prompts;
pub mod protocols;
pub mod retry;
pub mod server;

pub use completion::{CompletionBackend, CompletionError, CompletionResult, GroqClient};
pub use config::{CompletionConfig, GatewayConfig, RetryConfig};
pub use server::AppState;
