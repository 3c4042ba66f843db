#![allow(dead_code)]

pub mod mock_groq_server;
pub mod scripted_backend;

use std::sync::Arc;

use actix_web::{
    http::{header::HeaderMap, StatusCode},
    test, web, App,
};
use bytes::Bytes;
use serde_json::Value;
use sweetsteps_gateway_rs::{
    middleware::{CorsMiddleware, RequestIdMiddleware},
    server, AppState, CompletionBackend, GatewayConfig, RetryConfig,
};

/// One attempt plus one retry, with no meaningful backoff
pub fn fast_retry_config() -> RetryConfig {
    RetryConfig {
        max_attempts: 2,
        initial_backoff_ms: 1,
        max_backoff_ms: 1,
        backoff_multiplier: 1.0,
        jitter_factor: 0.0,
    }
}

pub fn app_state(backend: Arc<dyn CompletionBackend>) -> web::Data<AppState> {
    web::Data::new(AppState::new(backend, fast_retry_config()))
}

pub struct TestReply {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestReply {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.body).expect("response body is not JSON")
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Run one request through the full middleware stack and route table
pub async fn send(state: web::Data<AppState>, req: test::TestRequest) -> TestReply {
    send_with_payload_limit(state, GatewayConfig::default().max_payload_size, req).await
}

/// Same as [`send`] with an explicit request body limit
pub async fn send_with_payload_limit(
    state: web::Data<AppState>,
    max_payload_size: usize,
    req: test::TestRequest,
) -> TestReply {
    let app = test::init_service(
        App::new()
            .app_data(state)
            .app_data(web::PayloadConfig::new(max_payload_size))
            .configure(server::configure)
            .wrap(CorsMiddleware)
            .wrap(RequestIdMiddleware::new(vec![
                "x-request-id".to_string(),
                "x-correlation-id".to_string(),
            ])),
    )
    .await;

    let resp = test::call_service(&app, req.to_request()).await;
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = test::read_body(resp).await;

    TestReply {
        status,
        headers,
        body,
    }
}
