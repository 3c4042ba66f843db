use std::collections::VecDeque;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

use async_trait::async_trait;
use serde_json::Value;
use sweetsteps_gateway_rs::{
    prompts::Prompt, CompletionBackend, CompletionError, CompletionResult,
};

/// What the scripted backend answers on one call
#[derive(Debug, Clone)]
pub enum Reply {
    Json(Value),
    InvalidJson,
    Status(u16),
}

impl Reply {
    fn into_result(self) -> CompletionResult<Value> {
        match self {
            Reply::Json(value) => Ok(value),
            Reply::InvalidJson => Err(CompletionError::InvalidJson(
                "expected value at line 1 column 1".to_string(),
            )),
            Reply::Status(status) => Err(CompletionError::UpstreamStatus {
                status,
                body: "scripted failure".to_string(),
            }),
        }
    }
}

/// Completion backend that replays a fixed script and records every prompt.
/// Once the script runs out it answers with invalid JSON.
pub struct ScriptedBackend {
    replies: Mutex<VecDeque<Reply>>,
    prompts: Mutex<Vec<Prompt>>,
    calls: AtomicUsize,
}

impl ScriptedBackend {
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn prompts(&self) -> Vec<Prompt> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl CompletionBackend for ScriptedBackend {
    async fn complete(&self, prompt: &Prompt) -> CompletionResult<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.prompts.lock().unwrap().push(prompt.clone());
        let reply = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Reply::InvalidJson);
        reply.into_result()
    }

    fn model(&self) -> &str {
        "scripted"
    }
}
