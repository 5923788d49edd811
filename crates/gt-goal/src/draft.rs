// draft.rs - GoalDraft: the in-progress goal held by the create/edit form.
//
// The draft owns its steps directly, so the step editor and the goal being
// submitted can never drift apart. Step order is the stored order; the
// numeric-title ordering in `display_order` is presentation only.

use std::cmp::Ordering;
use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use regex::Regex;

use crate::dates;
use crate::error::GoalError;
use crate::model::{Goal, Step};

static NUMBER_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9]+").expect("numeric token pattern compiles"));

/// Whether the form creates a new goal or edits an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftMode {
    Create,
    Edit,
}

/// Result of checking a draft before submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftCheck {
    Ready,
    /// Title is empty or whitespace. Submission is a silent no-op.
    EmptyTitle,
    /// `total_days` is zero or negative.
    NonPositiveDays,
}

/// A single editable step field, already converted from form input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepField {
    Title(String),
    Description(String),
    DueDate(Option<DateTime<Utc>>),
}

impl StepField {
    /// Build a field update from a form field name and its raw text.
    ///
    /// Dates are converted from display form here, at the input boundary.
    pub fn parse(name: &str, value: &str) -> Result<Self, GoalError> {
        match name {
            "title" => Ok(StepField::Title(value.to_string())),
            "description" | "desc" => Ok(StepField::Description(value.to_string())),
            "due" | "dueDate" | "due_date" => {
                Ok(StepField::DueDate(dates::parse_optional_date(value)?))
            }
            other => Err(GoalError::UnknownField(other.to_string())),
        }
    }
}

/// The create/edit form state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GoalDraft {
    /// Present when editing a persisted goal.
    pub id: Option<String>,
    pub title: String,
    pub description: String,
    pub total_days: i64,
    pub user_id: Option<String>,
    created_at: Option<DateTime<Utc>>,
    steps: Vec<Step>,
}

impl Default for GoalDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl GoalDraft {
    /// An empty draft for the "new goal" form.
    pub fn new() -> Self {
        Self {
            id: None,
            title: String::new(),
            description: String::new(),
            total_days: 0,
            user_id: None,
            created_at: None,
            steps: Vec::new(),
        }
    }

    /// A draft pre-populated from a fetched goal, for the edit form.
    pub fn from_goal(goal: &Goal) -> Self {
        Self {
            id: (!goal.id.is_empty()).then(|| goal.id.clone()),
            title: goal.title.clone(),
            description: goal.description.clone(),
            total_days: goal.total_days,
            user_id: goal.user_id.clone(),
            created_at: Some(goal.created_at),
            steps: goal.steps.clone(),
        }
    }

    pub fn mode(&self) -> DraftMode {
        if self.id.is_some() {
            DraftMode::Edit
        } else {
            DraftMode::Create
        }
    }

    /// Steps in stored order.
    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    /// Append a blank step with the next free sequential id.
    pub fn add_step(&mut self) -> &Step {
        let id = next_step_id(&self.steps);
        self.steps.push(Step::blank(id));
        &self.steps[self.steps.len() - 1]
    }

    /// Remove the step at `index` (stored order).
    pub fn remove_step(&mut self, index: usize) -> Result<Step, GoalError> {
        self.check_index(index)?;
        Ok(self.steps.remove(index))
    }

    /// Update a single field of the step at `index` (stored order).
    pub fn update_step(&mut self, index: usize, field: StepField) -> Result<(), GoalError> {
        self.check_index(index)?;
        let step = &mut self.steps[index];
        match field {
            StepField::Title(v) => step.title = v,
            StepField::Description(v) => step.description = v,
            StepField::DueDate(v) => step.due_date = v,
        }
        Ok(())
    }

    /// Replace all steps at once (AI generation result).
    pub fn replace_steps(&mut self, steps: Vec<Step>) {
        self.steps = steps;
    }

    /// Steps paired with their stored index, sorted for display by the
    /// first number in the title. Steps without a number sort last; ties
    /// keep stored order.
    pub fn display_order(&self) -> Vec<(usize, &Step)> {
        display_order(&self.steps)
    }

    /// Text sent to the step generator: the description, or the title when
    /// the description is blank. `None` if both are blank.
    pub fn generation_prompt(&self) -> Option<&str> {
        [self.description.trim(), self.title.trim()]
            .into_iter()
            .find(|s| !s.is_empty())
    }

    /// Check the draft before submission. Both create and edit use the same rules.
    pub fn check(&self) -> DraftCheck {
        if self.title.trim().is_empty() {
            DraftCheck::EmptyTitle
        } else if self.total_days <= 0 {
            DraftCheck::NonPositiveDays
        } else {
            DraftCheck::Ready
        }
    }

    /// Build the goal to send to the service.
    pub fn to_goal(&self) -> Goal {
        Goal {
            id: self.id.clone().unwrap_or_default(),
            title: self.title.trim().to_string(),
            description: self.description.clone(),
            total_days: self.total_days,
            created_at: self.created_at.unwrap_or_else(Utc::now),
            user_id: self.user_id.clone(),
            steps: self.steps.clone(),
        }
    }

    fn check_index(&self, index: usize) -> Result<(), GoalError> {
        if index >= self.steps.len() {
            return Err(GoalError::StepIndexOutOfRange {
                index,
                len: self.steps.len(),
            });
        }
        Ok(())
    }
}

/// First run of ASCII digits in a step title, if any. Runs too long for
/// a `u64` saturate to `u64::MAX`.
pub fn title_number(title: &str) -> Option<u64> {
    NUMBER_TOKEN
        .find(title)
        .map(|m| m.as_str().parse().unwrap_or(u64::MAX))
}

/// Sort steps for display by [`title_number`], numberless steps last.
pub fn display_order(steps: &[Step]) -> Vec<(usize, &Step)> {
    let mut ordered: Vec<(usize, &Step)> = steps.iter().enumerate().collect();
    ordered.sort_by(|(_, a), (_, b)| {
        match (title_number(&a.title), title_number(&b.title)) {
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    });
    ordered
}

/// Next sequential step id: `len + 1`, bumped past ids already in use.
pub fn next_step_id(steps: &[Step]) -> String {
    let used: HashSet<&str> = steps.iter().map(|s| s.id.as_str()).collect();
    let mut n = steps.len() + 1;
    loop {
        let candidate = n.to_string();
        if !used.contains(candidate.as_str()) {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titled(titles: &[&str]) -> GoalDraft {
        let mut draft = GoalDraft::new();
        for title in titles {
            let index = draft.steps().len();
            draft.add_step();
            draft
                .update_step(index, StepField::Title(title.to_string()))
                .unwrap();
        }
        draft
    }

    #[test]
    fn numeric_title_sort() {
        let draft = titled(&["Step 2", "Step 10", "Step 1"]);
        let shown: Vec<&str> = draft
            .display_order()
            .into_iter()
            .map(|(_, s)| s.title.as_str())
            .collect();
        assert_eq!(shown, ["Step 1", "Step 2", "Step 10"]);
    }

    #[test]
    fn title_number_reads_ascii_digits_only() {
        assert_eq!(title_number("Step \u{0663} then 5"), Some(5));
        assert_eq!(title_number("Step \u{0663}"), None);
        assert_eq!(title_number("Day 12: rest"), Some(12));

        let steps = vec![Step::new("a", "Step \u{0663} then 5"), Step::new("b", "Step 2")];
        let titles: Vec<&str> = display_order(&steps)
            .into_iter()
            .map(|(_, s)| s.title.as_str())
            .collect();
        assert_eq!(titles, ["Step 2", "Step \u{0663} then 5"]);
    }

    #[test]
    fn oversized_numbers_sort_after_everything_numbered() {
        let huge = format!("Step {}", "9".repeat(30));
        assert_eq!(title_number(&huge), Some(u64::MAX));

        let steps = vec![
            Step::new("a", huge.as_str()),
            Step::new("b", "Notes"),
            Step::new("c", "Step 3"),
        ];
        let ids: Vec<&str> = display_order(&steps)
            .into_iter()
            .map(|(_, s)| s.id.as_str())
            .collect();
        assert_eq!(ids, ["c", "a", "b"]);
    }

    #[test]
    fn display_sort_does_not_reorder_storage() {
        let draft = titled(&["Step 2", "Step 1"]);
        let _ = draft.display_order();
        assert_eq!(draft.steps()[0].title, "Step 2");
        assert_eq!(draft.display_order()[0].0, 1);
    }

    #[test]
    fn numberless_titles_sort_last_in_stored_order() {
        let draft = titled(&["Warm up", "Day 3", "Stretch", "Day 1"]);
        let shown: Vec<&str> = draft
            .display_order()
            .into_iter()
            .map(|(_, s)| s.title.as_str())
            .collect();
        assert_eq!(shown, ["Day 1", "Day 3", "Warm up", "Stretch"]);
    }

    #[test]
    fn add_step_uses_sequential_ids() {
        let mut draft = GoalDraft::new();
        assert_eq!(draft.add_step().id, "1");
        assert_eq!(draft.add_step().id, "2");
        draft.remove_step(0).unwrap();
        // "2" is still in use, so the next id skips past it.
        assert_eq!(draft.add_step().id, "3");
    }

    #[test]
    fn remove_and_update_reject_bad_index() {
        let mut draft = titled(&["Step 1"]);
        assert!(matches!(
            draft.remove_step(4),
            Err(GoalError::StepIndexOutOfRange { index: 4, len: 1 })
        ));
        assert!(draft
            .update_step(1, StepField::Title("x".to_string()))
            .is_err());
    }

    #[test]
    fn step_field_parse_converts_dates() {
        let field = StepField::parse("due", "2024-06-01").unwrap();
        match field {
            StepField::DueDate(Some(ts)) => {
                assert_eq!(dates::to_display_date(&ts), "2024-06-01")
            }
            other => panic!("unexpected field: {:?}", other),
        }
        assert_eq!(StepField::parse("due", "").unwrap(), StepField::DueDate(None));
        assert!(matches!(
            StepField::parse("colour", "red"),
            Err(GoalError::UnknownField(_))
        ));
    }

    #[test]
    fn check_rejects_empty_title_then_days() {
        let mut draft = GoalDraft::new();
        draft.total_days = 10;
        draft.title = "   ".to_string();
        assert_eq!(draft.check(), DraftCheck::EmptyTitle);

        draft.title = "Read more".to_string();
        draft.total_days = 0;
        assert_eq!(draft.check(), DraftCheck::NonPositiveDays);

        draft.total_days = 10;
        assert_eq!(draft.check(), DraftCheck::Ready);
    }

    #[test]
    fn edit_draft_round_trips_goal() {
        let mut goal = Goal::new("Learn piano", "Scales daily", 21);
        goal.id = "g9".to_string();
        goal.steps = vec![Step::new("s1", "Step 1")];

        let draft = GoalDraft::from_goal(&goal);
        assert_eq!(draft.mode(), DraftMode::Edit);
        assert_eq!(draft.to_goal(), goal);
    }

    #[test]
    fn generation_prompt_prefers_description() {
        let mut draft = GoalDraft::new();
        assert_eq!(draft.generation_prompt(), None);
        draft.title = "Run".to_string();
        assert_eq!(draft.generation_prompt(), Some("Run"));
        draft.description = "Run a 10k".to_string();
        assert_eq!(draft.generation_prompt(), Some("Run a 10k"));
    }
}
