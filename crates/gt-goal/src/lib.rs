//! # gt-goal
//!
//! Goal and step model for the goal tracker.
//!
//! A [`Goal`] is a user objective with a day-based deadline and an ordered
//! list of [`Step`]s. Everything in this crate is synchronous and free of
//! I/O: the HTTP gateway lives in `gt-api`, the page state in `gt-page`.
//!
//! ## Key components
//!
//! - [`Goal`], [`Step`], [`SkipInfo`]: the wire-compatible data model
//! - [`GoalProgress`]: completed-step and elapsed-day statistics
//! - [`GoalDraft`]: the create/edit form state, including the step editor
//! - [`dates`]: conversion between `YYYY-MM-DD` and canonical timestamps

pub mod dates;
pub mod draft;
pub mod error;
pub mod model;
pub mod progress;

pub use draft::{DraftCheck, DraftMode, GoalDraft, StepField};
pub use error::GoalError;
pub use model::{Goal, SkipInfo, Step};
pub use progress::GoalProgress;
