//! Mock Groq (OpenAI-compatible) server for end-to-end client tests

use std::collections::VecDeque;
use std::net::{SocketAddr, TcpListener};
use std::sync::Mutex;
use std::time::Duration;

use actix_web::{dev::ServerHandle, web, App, HttpRequest, HttpResponse, HttpServer};
use serde_json::{json, Value};

/// Scripted answer for one chat completion call
#[derive(Debug, Clone)]
pub enum MockReply {
    /// 200 with a well-formed envelope whose message content is this text
    Content(String),
    /// Non-2xx status with a plain body
    Status(u16, String),
    /// 200 with this exact body
    RawBody(String),
    /// Well-formed content, sent only after the delay
    Delayed(Duration, String),
}

#[derive(Debug, Clone)]
pub struct CapturedRequest {
    pub authorization: Option<String>,
    pub body: Value,
}

struct MockGroqState {
    replies: Mutex<VecDeque<MockReply>>,
    requests: Mutex<Vec<CapturedRequest>>,
}

pub struct MockGroqServer {
    addr: SocketAddr,
    handle: ServerHandle,
    state: web::Data<MockGroqState>,
}

impl MockGroqServer {
    /// Start the mock on a random local port; must run inside an actix system
    pub async fn start(replies: Vec<MockReply>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();

        let state = web::Data::new(MockGroqState {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        });

        let app_state = state.clone();
        let server = HttpServer::new(move || {
            App::new()
                .app_data(app_state.clone())
                .route("/openai/v1/chat/completions", web::post().to(chat_completions))
        })
        .workers(1)
        .shutdown_timeout(1)
        .disable_signals()
        .listen(listener)
        .unwrap()
        .run();

        let handle = server.handle();
        actix_web::rt::spawn(server);

        Self {
            addr,
            handle,
            state,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/openai/v1", self.addr)
    }

    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.state.requests.lock().unwrap().clone()
    }

    pub async fn stop(self) {
        self.handle.stop(true).await;
    }
}

fn envelope(content: &str) -> Value {
    json!({
        "id": "chatcmpl-mock",
        "object": "chat.completion",
        "created": 1677652288,
        "model": "llama-3.1-8b-instant",
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }],
        "usage": {"prompt_tokens": 10, "completion_tokens": 20, "total_tokens": 30}
    })
}

async fn chat_completions(
    req: HttpRequest,
    body: web::Json<Value>,
    state: web::Data<MockGroqState>,
) -> HttpResponse {
    let authorization = req
        .headers()
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    state.requests.lock().unwrap().push(CapturedRequest {
        authorization,
        body: body.into_inner(),
    });

    let reply = state.replies.lock().unwrap().pop_front();
    match reply {
        Some(MockReply::Content(content)) => HttpResponse::Ok().json(envelope(&content)),
        Some(MockReply::Status(status, body)) => {
            let status = actix_web::http::StatusCode::from_u16(status)
                .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR);
            HttpResponse::build(status).body(body)
        }
        Some(MockReply::RawBody(body)) => HttpResponse::Ok()
            .content_type("application/json")
            .body(body),
        Some(MockReply::Delayed(delay, content)) => {
            actix_web::rt::time::sleep(delay).await;
            HttpResponse::Ok().json(envelope(&content))
        }
        None => HttpResponse::InternalServerError().body("no scripted reply"),
    }
}
