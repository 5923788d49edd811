// error.rs - Error types for page operations.

use gt_api::ApiError;
use gt_goal::GoalError;
use thiserror::Error;

/// Errors that can occur while handling a page action.
#[derive(Debug, Error)]
pub enum PageError {
    /// A backend call failed.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A model or form operation failed.
    #[error(transparent)]
    Goal(#[from] GoalError),

    /// The goal is not in the local list.
    #[error("goal not found: {0}")]
    GoalNotFound(String),

    /// A form action was attempted with the modal closed.
    #[error("no goal form is open")]
    NoOpenForm,

    /// A second generation request was made while one is running.
    #[error("step generation already in progress")]
    GenerationInFlight,

    /// Generated steps arrived for a form that has since been closed or
    /// replaced.
    #[error("generated steps belong to a form that is no longer open")]
    StaleGeneration,

    /// The draft failed validation.
    #[error("invalid goal: {0}")]
    InvalidDraft(&'static str),

    /// A notification sink failed (non-fatal).
    #[error("notification error: {0}")]
    Notification(String),
}
