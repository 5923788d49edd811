// wire.rs - Request and response bodies that are not plain Goal/Step records.

use chrono::{DateTime, Utc};
use gt_goal::{SkipInfo, Step};
use serde::{Deserialize, Deserializer, Serialize};

/// Partial step update sent to `PUT /api/goals/steps/:id`.
///
/// Absent fields are left untouched by the service. `due_date` and `skip`
/// distinguish "leave alone" (`None`) from "clear" (`Some(None)`, sent as
/// `null`).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StepPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_field"
    )]
    pub due_date: Option<Option<DateTime<Utc>>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "present_field"
    )]
    pub skip: Option<Option<SkipInfo>>,
}

impl StepPatch {
    /// `{ "completed": true }`
    pub fn complete() -> Self {
        Self {
            completed: Some(true),
            ..Self::default()
        }
    }

    /// `{ "completed": false, "skip": null }`
    pub fn reset() -> Self {
        Self {
            completed: Some(false),
            skip: Some(None),
            ..Self::default()
        }
    }

    /// Every editable field of `step`, used when saving an edited goal.
    pub fn from_step(step: &Step) -> Self {
        Self {
            title: Some(step.title.clone()),
            description: Some(step.description.clone()),
            due_date: Some(step.due_date),
            completed: Some(step.completed),
            skip: Some(step.skip.clone()),
        }
    }

    /// Apply the patch to a local copy of the step.
    pub fn apply_to(&self, step: &mut Step) {
        if let Some(title) = &self.title {
            step.title = title.clone();
        }
        if let Some(description) = &self.description {
            step.description = description.clone();
        }
        if let Some(due) = self.due_date {
            step.due_date = due;
        }
        if let Some(completed) = self.completed {
            step.completed = completed;
        }
        if let Some(skip) = &self.skip {
            step.skip = skip.clone();
        }
    }
}

// A present `null` becomes `Some(None)`; a missing key stays `None` via `default`.
fn present_field<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Body of `POST /api/ai/generate-steps`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct GenerateStepsRequest {
    /// Goal description (or title) the steps should work towards.
    pub goal: String,
    pub total_days: i64,
}

/// Response of `POST /api/ai/generate-steps`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerateStepsResponse {
    #[serde(default)]
    pub steps: Vec<Step>,
}
