//! System instructions and user messages for each coach route.

use crate::protocols::chat::ChatMessage;
use crate::protocols::coach::{DailyStepsRequest, GoalRequest, WeeklyMountainRequest};

pub const ONBOARDING_SYSTEM_PROMPT: &str = "Generate a big goal, weekly mountain info, and daily sample step. \
Return strict JSON: { bigGoal, weeklyMountain { name, weeklyTarget, note }, dailyStep }";

pub const WEEKLY_MOUNTAIN_SYSTEM_PROMPT: &str = "Return strict JSON: { name, weeklyTarget, note }";

pub const DAILY_STEPS_SYSTEM_PROMPT: &str = "Generate today's daily SweetSteps using BOTH the big goal and weekly mountain.\n\
Return JSON: { steps: [ {title, description, minutes} ], coachNote }";

/// A system instruction plus the user message built from the caller's fields
#[derive(Debug, Clone, PartialEq)]
pub struct Prompt {
    pub system: &'static str,
    pub user: String,
}

impl Prompt {
    pub fn to_messages(&self) -> Vec<ChatMessage> {
        vec![
            ChatMessage::system(self.system),
            ChatMessage::user(self.user.clone()),
        ]
    }
}

fn field(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or_default()
}

pub fn onboarding_prompt(request: &GoalRequest) -> Prompt {
    let progress = request
        .current_progress
        .as_ref()
        .map(|p| p.render())
        .unwrap_or_default();

    Prompt {
        system: ONBOARDING_SYSTEM_PROMPT,
        user: format!(
            "Vague Goal: {}\nCurrent Progress: {}\nTime Limit: {}",
            field(&request.vague_goal),
            progress,
            field(&request.time_limit)
        ),
    }
}

pub fn weekly_mountain_prompt(request: &WeeklyMountainRequest) -> Prompt {
    Prompt {
        system: WEEKLY_MOUNTAIN_SYSTEM_PROMPT,
        user: format!("Big Goal: {}", field(&request.big_goal)),
    }
}

pub fn daily_steps_prompt(request: &DailyStepsRequest) -> Prompt {
    let mountain = request
        .weekly_mountain
        .as_ref()
        .map(|m| m.render())
        .unwrap_or_default();

    Prompt {
        system: DAILY_STEPS_SYSTEM_PROMPT,
        user: format!(
            "Big Goal: {}\nWeekly Mountain: {}",
            field(&request.big_goal),
            mountain
        ),
    }
}
