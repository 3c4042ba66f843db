//! Route descriptors and the shared handler behind every coach endpoint.
//!
//! Each endpoint differs only in how its body is validated and turned into a
//! prompt, and in whether a static fallback is served when the model fails.
//! [`CoachRoute`] captures exactly that; [`dispatch`] does the rest.

use std::cell::Cell;

use actix_web::HttpResponse;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, info, warn};

use crate::completion::CompletionError;
use crate::error::ApiError;
use crate::prompts::{self, Prompt};
use crate::protocols::coach::{
    fallback_daily_steps, ApiEnvelope, DailyStepsRequest, GoalRequest, WeeklyMountainRequest,
};
use crate::retry::RetryExecutor;
use crate::server::AppState;

/// A request body that can be validated and turned into a prompt
pub trait CoachRequest: DeserializeOwned {
    /// Error message returned when any required field is absent
    const REQUIRED_MESSAGE: &'static str;

    fn missing_fields(&self) -> Vec<&'static str>;

    fn prompt(&self) -> Prompt;
}

impl CoachRequest for GoalRequest {
    const REQUIRED_MESSAGE: &'static str = "vagueGoal, currentProgress, and timeLimit are required";

    fn missing_fields(&self) -> Vec<&'static str> {
        GoalRequest::missing_fields(self)
    }

    fn prompt(&self) -> Prompt {
        prompts::onboarding_prompt(self)
    }
}

impl CoachRequest for WeeklyMountainRequest {
    const REQUIRED_MESSAGE: &'static str = "bigGoal required";

    fn missing_fields(&self) -> Vec<&'static str> {
        WeeklyMountainRequest::missing_fields(self)
    }

    fn prompt(&self) -> Prompt {
        prompts::weekly_mountain_prompt(self)
    }
}

impl CoachRequest for DailyStepsRequest {
    const REQUIRED_MESSAGE: &'static str = "bigGoal and weeklyMountain required";

    fn missing_fields(&self) -> Vec<&'static str> {
        DailyStepsRequest::missing_fields(self)
    }

    fn prompt(&self) -> Prompt {
        prompts::daily_steps_prompt(self)
    }
}

/// Deserialize, validate and build the prompt for one request type
pub fn prepare<R: CoachRequest>(body: Value) -> Result<Prompt, ApiError> {
    let request: R =
        serde_json::from_value(body).map_err(|e| ApiError::InvalidBody(e.to_string()))?;

    let missing = request.missing_fields();
    if !missing.is_empty() {
        return Err(ApiError::MissingFields {
            message: R::REQUIRED_MESSAGE,
            missing,
        });
    }

    Ok(request.prompt())
}

#[derive(Debug, Clone, Copy)]
pub struct CoachRoute {
    pub name: &'static str,
    pub path: &'static str,
    pub alias: &'static str,
    pub prepare: fn(Value) -> Result<Prompt, ApiError>,
    /// Served with a 500 when every attempt fails
    pub fallback: Option<fn() -> Value>,
}

pub const ONBOARDING_PLAN: CoachRoute = CoachRoute {
    name: "onboarding_plan",
    path: "/onboarding-plan",
    alias: "/generate-plan",
    prepare: prepare::<GoalRequest>,
    fallback: None,
};

pub const WEEKLY_MOUNTAIN: CoachRoute = CoachRoute {
    name: "weekly_mountain",
    path: "/weekly-mountain",
    alias: "/generate-weekly-mountain",
    prepare: prepare::<WeeklyMountainRequest>,
    fallback: None,
};

pub const DAILY_STEPS: CoachRoute = CoachRoute {
    name: "daily_steps",
    path: "/daily-steps",
    alias: "/generate-daily-steps",
    prepare: prepare::<DailyStepsRequest>,
    fallback: Some(fallback_daily_steps),
};

/// Parse a request body regardless of content type. Anything that is not a
/// JSON object is treated as `{}` so it fails field validation instead.
pub fn parse_body(raw: &[u8]) -> Value {
    if raw.iter().all(u8::is_ascii_whitespace) {
        return Value::Object(Map::new());
    }

    match serde_json::from_slice::<Value>(raw) {
        Ok(value @ Value::Object(_)) => value,
        Ok(other) => {
            debug!(body = %other, "Request body is JSON but not an object");
            Value::Object(Map::new())
        }
        Err(e) => {
            debug!(
                body = %String::from_utf8_lossy(raw),
                error = %e,
                "Request body is not valid JSON"
            );
            Value::Object(Map::new())
        }
    }
}

/// Error text for a failed route, worded by the last error and by how many
/// attempts actually came back unparseable
fn exhausted_message(err: &CompletionError, parse_failures: u32) -> String {
    if !err.is_parse_failure() {
        return err.to_string();
    }
    match parse_failures.max(1) {
        1 => "Groq returned invalid JSON".to_string(),
        2 => "Groq returned invalid JSON twice".to_string(),
        n => format!("Groq returned invalid JSON {} times", n),
    }
}

/// Validate, prompt the model under the retry policy and wrap the outcome
pub async fn dispatch(
    route: &CoachRoute,
    state: &AppState,
    raw_body: &[u8],
    request_id: &str,
) -> Result<HttpResponse, ApiError> {
    let prompt = (route.prepare)(parse_body(raw_body)).inspect_err(|e| match e {
        ApiError::MissingFields { missing, .. } => {
            info!(route = route.name, request_id, ?missing, "Rejected coach request");
        }
        other => {
            info!(route = route.name, request_id, error = %other, "Rejected coach request");
        }
    })?;

    let backend = &state.backend;
    let prompt = &prompt;
    let parse_failures = &Cell::new(0u32);
    let result = RetryExecutor::execute_with_retry(
        &state.retry,
        move |attempt| async move {
            debug!(route = route.name, request_id, attempt, model = backend.model(), "Calling completion API");
            let outcome = backend.complete(prompt).await;
            if let Err(err) = &outcome {
                if err.is_parse_failure() {
                    parse_failures.set(parse_failures.get() + 1);
                }
                warn!(route = route.name, request_id, attempt, error = %err, "Completion attempt failed");
            }
            outcome
        },
        |err: &CompletionError, _attempt| err.is_retryable(),
    )
    .await;

    match result {
        Ok(data) => Ok(HttpResponse::Ok().json(ApiEnvelope::success(data))),
        Err(err) => match route.fallback {
            Some(fallback) => {
                warn!(route = route.name, request_id, error = %err, "Serving static fallback");
                let message = exhausted_message(&err, parse_failures.get());
                Ok(HttpResponse::InternalServerError()
                    .json(ApiEnvelope::failure(message).with_fallback(fallback())))
            }
            None => {
                warn!(route = route.name, request_id, error = %err, "Completion failed");
                Err(ApiError::Upstream(err))
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_body_lenient() {
        assert_eq!(parse_body(b""), json!({}));
        assert_eq!(parse_body(b"  \n"), json!({}));
        assert_eq!(parse_body(b"not json"), json!({}));
        assert_eq!(parse_body(b"[1,2]"), json!({}));
        assert_eq!(parse_body(br#"{"bigGoal":"x"}"#), json!({"bigGoal": "x"}));
    }

    #[test]
    fn test_prepare_reports_required_message() {
        let err = (ONBOARDING_PLAN.prepare)(json!({"vagueGoal": "x"})).unwrap_err();
        match err {
            ApiError::MissingFields { message, missing } => {
                assert_eq!(message, "vagueGoal, currentProgress, and timeLimit are required");
                assert_eq!(missing, vec!["currentProgress", "timeLimit"]);
            }
            other => panic!("unexpected error: {:?}", other),
        }

        let err = (DAILY_STEPS.prepare)(json!({})).unwrap_err();
        assert_eq!(err.to_string(), "bigGoal and weeklyMountain required");
    }

    #[test]
    fn test_prepare_invalid_types() {
        let err = (WEEKLY_MOUNTAIN.prepare)(json!({"bigGoal": ["a", "b"]})).unwrap_err();
        assert!(matches!(err, ApiError::InvalidBody(_)));
    }

    #[test]
    fn test_prepare_builds_prompt() {
        let prompt = (WEEKLY_MOUNTAIN.prepare)(json!({"bigGoal": "Learn piano"})).unwrap();
        assert_eq!(prompt.user, "Big Goal: Learn piano");
    }

    #[test]
    fn test_only_daily_steps_has_fallback() {
        assert!(ONBOARDING_PLAN.fallback.is_none());
        assert!(WEEKLY_MOUNTAIN.fallback.is_none());
        assert!(DAILY_STEPS.fallback.is_some());
    }

    #[test]
    fn test_exhausted_message() {
        let invalid = CompletionError::InvalidJson("eof".to_string());
        assert_eq!(exhausted_message(&invalid, 1), "Groq returned invalid JSON");
        assert_eq!(exhausted_message(&invalid, 2), "Groq returned invalid JSON twice");
        assert_eq!(exhausted_message(&invalid, 3), "Groq returned invalid JSON 3 times");

        let status = CompletionError::UpstreamStatus {
            status: 503,
            body: "overloaded".to_string(),
        };
        assert_eq!(
            exhausted_message(&status, 2),
            "completion API returned status 503: overloaded"
        );
    }
}
