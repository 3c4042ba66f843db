use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{json, Map, Value};

/// A field callers send either as one string or as a list of strings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum StringOrList {
    Single(String),
    List(Vec<String>),
}

impl StringOrList {
    pub fn is_blank(&self) -> bool {
        match self {
            StringOrList::Single(text) => text.is_empty(),
            StringOrList::List(items) => items.is_empty(),
        }
    }

    /// Flatten into prompt text; list entries are joined with "; "
    pub fn render(&self) -> String {
        match self {
            StringOrList::Single(text) => text.clone(),
            StringOrList::List(items) => items.join("; "),
        }
    }
}

/// Only absent, null and empty strings are missing; whitespace is kept as sent
fn is_blank(text: &Option<String>) -> bool {
    text.as_deref().is_none_or(str::is_empty)
}

/// Body of `POST /onboarding-plan`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GoalRequest {
    pub vague_goal: Option<String>,
    #[serde(alias = "clarifications")]
    pub current_progress: Option<StringOrList>,
    pub time_limit: Option<String>,
}

impl GoalRequest {
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.vague_goal) {
            missing.push("vagueGoal");
        }
        if self.current_progress.as_ref().is_none_or(|p| p.is_blank()) {
            missing.push("currentProgress");
        }
        if is_blank(&self.time_limit) {
            missing.push("timeLimit");
        }
        missing
    }
}

/// Body of `POST /weekly-mountain`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyMountainRequest {
    pub big_goal: Option<String>,
}

impl WeeklyMountainRequest {
    pub fn missing_fields(&self) -> Vec<&'static str> {
        if is_blank(&self.big_goal) {
            vec!["bigGoal"]
        } else {
            Vec::new()
        }
    }
}

/// Intermediate weekly milestone, usually echoed back from an earlier
/// weekly-mountain or onboarding response.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyMountain {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weekly_target: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tasks: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WeeklyMountain {
    /// True when no field survived deserialization, e.g. `{"name": null}`
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.weekly_target.is_none()
            && self.note.is_none()
            && self.tasks.is_none()
            && self.extra.is_empty()
    }
}

/// How callers may pass the weekly mountain to `POST /daily-steps`.
///
/// Model output is not schema-checked, so anything that is not a well-typed
/// mountain object is kept as raw JSON and rendered into the prompt verbatim.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum MountainInput {
    /// A non-empty object matching the mountain shape
    Detailed(WeeklyMountain),
    Named(String),
    Raw(Value),
}

impl From<Value> for MountainInput {
    fn from(value: Value) -> Self {
        match value {
            Value::String(name) => MountainInput::Named(name),
            Value::Object(map) if !map.is_empty() => {
                let value = Value::Object(map);
                match WeeklyMountain::deserialize(&value) {
                    Ok(mountain) if !mountain.is_empty() => MountainInput::Detailed(mountain),
                    _ => MountainInput::Raw(value),
                }
            }
            other => MountainInput::Raw(other),
        }
    }
}

impl<'de> Deserialize<'de> for MountainInput {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(MountainInput::from)
    }
}

impl MountainInput {
    /// Mirrors JSON truthiness: null, false, zero and empty containers are blank
    pub fn is_blank(&self) -> bool {
        match self {
            MountainInput::Detailed(_) => false,
            MountainInput::Named(name) => name.is_empty(),
            MountainInput::Raw(value) => match value {
                Value::Null | Value::Bool(false) => true,
                Value::Number(n) => n.as_f64() == Some(0.0),
                Value::String(text) => text.is_empty(),
                Value::Array(items) => items.is_empty(),
                Value::Object(map) => map.is_empty(),
                Value::Bool(true) => false,
            },
        }
    }

    pub fn render(&self) -> String {
        match self {
            MountainInput::Detailed(mountain) => {
                serde_json::to_string(mountain).unwrap_or_default()
            }
            MountainInput::Named(name) => name.clone(),
            MountainInput::Raw(value) => value.to_string(),
        }
    }
}

/// Body of `POST /daily-steps`
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStepsRequest {
    pub big_goal: Option<String>,
    pub weekly_mountain: Option<MountainInput>,
}

impl DailyStepsRequest {
    pub fn missing_fields(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_blank(&self.big_goal) {
            missing.push("bigGoal");
        }
        if self.weekly_mountain.as_ref().is_none_or(|m| m.is_blank()) {
            missing.push("weeklyMountain");
        }
        missing
    }
}

/// Response envelope shared by every coach route
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ApiEnvelope {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fallback: Option<Value>,
}

impl ApiEnvelope {
    pub fn success(data: Value) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            fallback: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            fallback: None,
        }
    }

    pub fn with_fallback(mut self, fallback: Value) -> Self {
        self.fallback = Some(fallback);
        self
    }
}

/// Static plan served when the model cannot produce usable daily steps
pub fn fallback_daily_steps() -> Value {
    json!({
        "steps": [
            {"title": "Warm up", "description": "Start small", "minutes": 5},
            {"title": "Main push", "description": "Move goal forward", "minutes": 15}
        ],
        "coachNote": "Fallback activated; keep pushing!"
    })
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct HealthStatus {
    pub status: String,
}

impl HealthStatus {
    pub fn alive() -> Self {
        Self {
            status: "alive".to_string(),
        }
    }
}
