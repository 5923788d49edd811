// model.rs - Goal and Step: the records exchanged with the goals service.
//
// The client never owns these records. Every copy held here is a cache of
// server state that gets reconciled after a successful mutation, so the
// types mirror the service's JSON shape (camelCase, `_id` accepted in place
// of or alongside `id`) rather than an internal representation. Decoding
// goes through the *Record structs so a document carrying both keys is
// still accepted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::GoalError;

/// Metadata recorded when a user skips a step.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SkipInfo {
    /// Whether the user flagged the skipped step as important.
    #[serde(default)]
    pub important: bool,

    /// Free-form reason given for skipping.
    #[serde(default)]
    pub reason: String,
}

/// An ordered sub-task of a [`Goal`].
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", from = "StepRecord")]
pub struct Step {
    /// Identifier. Server-assigned for persisted steps, sequential for
    /// steps added in the form.
    #[serde(default)]
    pub id: String,

    /// Short title, e.g. "Day 3: run 5km".
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Due date as a canonical timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub due_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub completed: bool,

    /// Present only when the step was skipped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skip: Option<SkipInfo>,
}

impl Step {
    /// A blank step as appended by the step editor.
    pub fn blank(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Create a titled, not-yet-completed step.
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            ..Self::default()
        }
    }

    /// Put completion and skip fields back to their defaults.
    pub fn reset_progress(&mut self) {
        self.completed = false;
        self.skip = None;
    }
}

/// A user-defined objective with a day-based deadline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", from = "GoalRecord")]
pub struct Goal {
    /// Server-assigned identifier. Empty for a goal that has not been created yet.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub id: String,

    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Total duration in days. A valid goal has `total_days > 0`.
    #[serde(default)]
    pub total_days: i64,

    /// When the goal was created; the elapsed-day clock starts here.
    #[serde(default = "Utc::now")]
    pub created_at: DateTime<Utc>,

    /// Owner of the goal.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,

    /// Steps in stored order.
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl Goal {
    /// Create a new, unsaved goal with no steps.
    pub fn new(title: impl Into<String>, description: impl Into<String>, total_days: i64) -> Self {
        Self {
            id: String::new(),
            title: title.into(),
            description: description.into(),
            total_days,
            created_at: Utc::now(),
            user_id: None,
            steps: Vec::new(),
        }
    }

    /// True when the goal satisfies the `total_days > 0` invariant.
    pub fn is_valid(&self) -> bool {
        self.total_days > 0
    }

    pub fn step(&self, step_id: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == step_id)
    }

    /// Number of steps marked completed.
    pub fn completed_steps(&self) -> usize {
        self.steps.iter().filter(|s| s.completed).count()
    }

    /// Mark one of this goal's steps completed.
    ///
    /// Only this goal's steps are searched, so equal step ids in other
    /// goals are never touched. Returns `true` if the flag changed.
    pub fn complete_step(&mut self, step_id: &str) -> Result<bool, GoalError> {
        let goal_id = self.id.clone();
        let step = self
            .steps
            .iter_mut()
            .find(|s| s.id == step_id)
            .ok_or_else(|| GoalError::StepNotFound {
                goal_id,
                step_id: step_id.to_string(),
            })?;
        let changed = !step.completed;
        step.completed = true;
        Ok(changed)
    }

    /// Reset completion and skip metadata on every step.
    pub fn reset_progress(&mut self) {
        for step in &mut self.steps {
            step.reset_progress();
        }
    }

    /// Reset only the listed steps (used when a bulk reset partially fails).
    pub fn reset_steps<'a>(&mut self, step_ids: impl IntoIterator<Item = &'a str>) {
        for id in step_ids {
            if let Some(step) = self.steps.iter_mut().find(|s| s.id == id) {
                step.reset_progress();
            }
        }
    }
}

/// `id` if the service sent a non-empty one, otherwise `_id`.
fn record_id(id: Option<String>, object_id: Option<String>) -> String {
    id.filter(|id| !id.is_empty())
        .or(object_id)
        .unwrap_or_default()
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StepRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "_id")]
    object_id: Option<String>,
    #[serde(default)]
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    completed: bool,
    #[serde(default)]
    skip: Option<SkipInfo>,
}

impl From<StepRecord> for Step {
    fn from(r: StepRecord) -> Self {
        Self {
            id: record_id(r.id, r.object_id),
            title: r.title,
            description: r.description,
            due_date: r.due_date,
            completed: r.completed,
            skip: r.skip,
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct GoalRecord {
    #[serde(default)]
    id: Option<String>,
    #[serde(default, rename = "_id")]
    object_id: Option<String>,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    total_days: i64,
    #[serde(default = "Utc::now")]
    created_at: DateTime<Utc>,
    #[serde(default)]
    user_id: Option<String>,
    #[serde(default)]
    steps: Vec<Step>,
}

impl From<GoalRecord> for Goal {
    fn from(r: GoalRecord) -> Self {
        Self {
            id: record_id(r.id, r.object_id),
            title: r.title,
            description: r.description,
            total_days: r.total_days,
            created_at: r.created_at,
            user_id: r.user_id,
            steps: r.steps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_goal() -> Goal {
        let mut goal = Goal::new("Run a marathon", "Build up to 42km", 30);
        goal.id = "g1".to_string();
        goal.steps = vec![Step::new("1", "Step 1"), Step::new("2", "Step 2")];
        goal
    }

    #[test]
    fn complete_step_sets_flag() {
        let mut goal = sample_goal();
        assert!(goal.complete_step("1").unwrap());
        assert!(goal.step("1").unwrap().completed);
        assert!(!goal.step("2").unwrap().completed);
        assert_eq!(goal.completed_steps(), 1);
    }

    #[test]
    fn complete_step_is_idempotent() {
        let mut goal = sample_goal();
        assert!(goal.complete_step("2").unwrap());
        assert!(!goal.complete_step("2").unwrap());
        assert!(goal.step("2").unwrap().completed);
    }

    #[test]
    fn complete_unknown_step_is_an_error() {
        let mut goal = sample_goal();
        let result = goal.complete_step("missing");
        assert!(matches!(result, Err(GoalError::StepNotFound { .. })));
    }

    #[test]
    fn reset_clears_completion_and_skip() {
        let mut goal = sample_goal();
        goal.steps[0].completed = true;
        goal.steps[1].skip = Some(SkipInfo {
            important: true,
            reason: "sick".to_string(),
        });

        goal.reset_progress();

        assert!(goal.steps.iter().all(|s| !s.completed && s.skip.is_none()));
    }

    #[test]
    fn reset_steps_only_touches_listed_ids() {
        let mut goal = sample_goal();
        goal.steps[0].completed = true;
        goal.steps[1].completed = true;

        goal.reset_steps(["2"]);

        assert!(goal.steps[0].completed);
        assert!(!goal.steps[1].completed);
    }

    #[test]
    fn deserializes_service_json() {
        let json = r#"{
            "_id": "65f0",
            "title": "Learn Rust",
            "description": "Finish the book",
            "totalDays": 14,
            "createdAt": "2024-03-01T00:00:00.000Z",
            "userId": "u1",
            "steps": [
                {"_id": "s1", "title": "Chapter 1", "dueDate": "2024-03-02T00:00:00.000Z", "completed": true},
                {"id": "s2", "title": "Chapter 2", "skip": {"important": true, "reason": "travel"}}
            ]
        }"#;
        let goal: Goal = serde_json::from_str(json).unwrap();
        assert_eq!(goal.id, "65f0");
        assert_eq!(goal.total_days, 14);
        assert_eq!(goal.user_id.as_deref(), Some("u1"));
        assert!(goal.steps[0].completed);
        assert!(goal.steps[0].due_date.is_some());
        assert_eq!(goal.steps[1].skip.as_ref().unwrap().reason, "travel");
    }

    #[test]
    fn accepts_documents_with_both_id_keys() {
        let json = r#"{
            "_id": "65f0",
            "id": "65f0",
            "title": "Learn Rust",
            "totalDays": 14,
            "steps": [
                {"_id": "s1", "id": "s1", "title": "Chapter 1"},
                {"_id": "s2", "id": "", "title": "Chapter 2"}
            ]
        }"#;
        let goal: Goal = serde_json::from_str(json).unwrap();
        assert_eq!(goal.id, "65f0");
        assert_eq!(goal.steps[0].id, "s1");
        assert_eq!(goal.steps[1].id, "s2");

        let list: Vec<Goal> = serde_json::from_str(&format!("[{}]", json)).unwrap();
        assert_eq!(list.len(), 1);
    }

    #[test]
    fn serialized_goal_reads_back() {
        let goal = sample_goal();
        let json = serde_json::to_string(&goal).unwrap();
        assert!(!json.contains("_id"));
        let back: Goal = serde_json::from_str(&json).unwrap();
        assert_eq!(back, goal);
    }

    #[test]
    fn unsaved_goal_omits_id_and_uses_camel_case() {
        let goal = Goal::new("Read", "", 7);
        let json = serde_json::to_string(&goal).unwrap();
        assert!(!json.contains("\"id\""));
        assert!(json.contains("\"totalDays\":7"));
        assert!(json.contains("\"createdAt\""));
    }

    #[test]
    fn validity_requires_positive_days() {
        assert!(Goal::new("a", "", 1).is_valid());
        assert!(!Goal::new("a", "", 0).is_valid());
        assert!(!Goal::new("a", "", -3).is_valid());
    }
}
