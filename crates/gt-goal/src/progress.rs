// progress.rs - Per-goal statistics shown in the list and detail views.
//
// All day math takes `now` as a parameter so callers (and tests) control
// the clock. Elapsed days are whole days since `created_at`, truncated.

use chrono::{DateTime, Utc};

use crate::model::Goal;

/// Aggregated progress of one goal at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoalProgress {
    pub completed: usize,
    pub total: usize,
    /// `round(completed / total * 100)`, 0 when the goal has no steps.
    pub percent: u32,
    /// Whole days since the goal was created.
    pub elapsed_days: i64,
    /// `total_days - elapsed_days`; negative once the deadline has passed.
    pub remaining_days: i64,
    /// Elapsed share of the goal's duration, capped at 100.
    pub elapsed_percent: u32,
}

impl GoalProgress {
    pub fn compute(goal: &Goal, now: DateTime<Utc>) -> Self {
        let completed = goal.completed_steps();
        let total = goal.steps.len();
        let elapsed = elapsed_days(goal.created_at, now);
        Self {
            completed,
            total,
            percent: percent_complete(completed, total),
            elapsed_days: elapsed,
            remaining_days: goal.total_days - elapsed,
            elapsed_percent: elapsed_percent(elapsed, goal.total_days),
        }
    }

    /// Every step is done (and there is at least one).
    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }

    pub fn is_overdue(&self) -> bool {
        self.remaining_days < 0 && !self.is_complete()
    }
}

/// Percentage of completed steps, rounded to the nearest integer.
pub fn percent_complete(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((completed as f64 / total as f64) * 100.0).round() as u32
}

/// Whole days between `created_at` and `now`. Never negative.
pub fn elapsed_days(created_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - created_at).num_days().max(0)
}

/// Elapsed share of `total_days` as a percentage, capped at 100.
pub fn elapsed_percent(elapsed_days: i64, total_days: i64) -> u32 {
    if total_days <= 0 {
        return 100;
    }
    let pct = (elapsed_days as f64 / total_days as f64 * 100.0).round();
    pct.clamp(0.0, 100.0) as u32
}
