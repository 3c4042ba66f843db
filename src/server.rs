use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use actix_web::{
    middleware::Logger, web, App, HttpRequest, HttpResponse, HttpServer, Resource, Responder,
};
use bytes::Bytes;
use tracing::info;

use crate::coach::{self, CoachRoute, DAILY_STEPS, ONBOARDING_PLAN, WEEKLY_MOUNTAIN};
use crate::completion::{CompletionBackend, GroqClient};
use crate::config::{GatewayConfig, RetryConfig};
use crate::error::ApiError;
use crate::logging::{self, LoggingConfig};
use crate::middleware::{get_request_id, CorsMiddleware, RequestIdMiddleware};
use crate::protocols::coach::HealthStatus;

/// Shared per-process state; requests never mutate it
pub struct AppState {
    pub backend: Arc<dyn CompletionBackend>,
    pub retry: RetryConfig,
}

impl AppState {
    pub fn new(backend: Arc<dyn CompletionBackend>, retry: RetryConfig) -> Self {
        Self { backend, retry }
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("model", &self.backend.model())
            .field("retry", &self.retry)
            .finish()
    }
}

pub async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthStatus::alive())
}

async fn not_found(req: HttpRequest) -> Result<HttpResponse, ApiError> {
    Err(ApiError::NotFound(req.path().to_string()))
}

/// POST resource serving a coach route under its primary path and its alias
fn coach_resource(route: CoachRoute) -> Resource {
    web::resource([route.path, route.alias]).route(web::post().to(
        move |req: HttpRequest, body: Bytes, data: web::Data<AppState>| async move {
            coach::dispatch(&route, &data, &body, &get_request_id(&req)).await
        },
    ))
}

/// Register every route; shared by `startup` and the integration tests
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(web::resource(["/", "/health"]).route(web::get().to(health)))
        .service(coach_resource(ONBOARDING_PLAN))
        .service(coach_resource(WEEKLY_MOUNTAIN))
        .service(coach_resource(DAILY_STEPS))
        .default_service(web::route().to(not_found));
}

pub async fn startup(config: GatewayConfig) -> std::io::Result<()> {
    // Only initialize logging once, even if startup is called again in-process
    static LOGGING_INITIALIZED: AtomicBool = AtomicBool::new(false);

    let _log_guard = if !LOGGING_INITIALIZED.swap(true, Ordering::SeqCst) {
        Some(logging::init_logging(LoggingConfig {
            level: logging::parse_level(config.log_level.as_deref()),
            json_format: config.log_json,
            log_dir: config.log_dir.clone(),
            ..LoggingConfig::default()
        }))
    } else {
        None
    };

    info!("🚧 Initializing gateway on {}:{}", config.host, config.port);
    info!("🚧 Completion config: {:?}", config.completion);
    info!("🚧 Retry config: {:?}", config.retry);
    info!(
        "🚧 Max payload size: {} KB",
        config.max_payload_size / 1024
    );

    let client = GroqClient::new(config.completion.clone()).map_err(std::io::Error::other)?;
    let app_state = web::Data::new(AppState::new(Arc::new(client), config.retry.clone()));

    let request_id_headers = config.request_id_headers.clone();
    let max_payload_size = config.max_payload_size;

    info!("✅ Serving gateway on {}:{}", config.host, config.port);

    HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .app_data(web::PayloadConfig::new(max_payload_size))
            .configure(configure)
            .wrap(CorsMiddleware)
            .wrap(Logger::default())
            .wrap(RequestIdMiddleware::new(request_id_headers.clone()))
    })
    .bind((config.host, config.port))?
    .run()
    .await
}
