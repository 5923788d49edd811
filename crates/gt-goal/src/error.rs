// error.rs - Error types for the goal model and form draft.

use thiserror::Error;

/// Errors raised by goal model and draft operations.
#[derive(Debug, Error)]
pub enum GoalError {
    /// A step index from the form was outside the step list.
    #[error("step index {index} out of range (goal has {len} steps)")]
    StepIndexOutOfRange { index: usize, len: usize },

    /// The step id does not belong to the goal.
    #[error("step {step_id} not found in goal {goal_id}")]
    StepNotFound { goal_id: String, step_id: String },

    /// A date field could not be parsed at the input boundary.
    #[error("invalid date {input:?}: expected YYYY-MM-DD or an RFC 3339 timestamp")]
    InvalidDate { input: String },

    /// A form field name was not recognised.
    #[error("unknown step field: {0}")]
    UnknownField(String),
}
