use actix_web::{http::StatusCode, HttpResponse, ResponseError};

use crate::completion::CompletionError;
use crate::protocols::coach::ApiEnvelope;

/// Errors a coach route can answer with. Rendered as `{success: false, error}`.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{message}")]
    MissingFields {
        message: &'static str,
        missing: Vec<&'static str>,
    },

    #[error("Invalid request body: {0}")]
    InvalidBody(String),

    #[error("Upstream completion failed: {0}")]
    Upstream(#[from] CompletionError),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::MissingFields { .. } | ApiError::InvalidBody(_) => StatusCode::BAD_REQUEST,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(ApiEnvelope::failure(self.to_string()))
    }
}
