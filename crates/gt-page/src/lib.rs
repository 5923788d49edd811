//! # gt-page
//!
//! The goals page: everything between a user action and a re-render.
//!
//! [`GoalsPage`] owns the [`PageState`] (goals cache, form draft, UI flags)
//! and a [`GoalsApi`](gt_api::GoalsApi) implementation. Each user action
//! mutates state and/or calls the API; local state is only updated after a
//! call succeeds, so a failure leaves it untouched and is reported through
//! the [`Notifier`].
//!
//! ## Key components
//!
//! - [`PageState`]: goals, draft, modal/expansion/menu/generating flags
//! - [`ClickListeners`]: page-scoped click subscriptions with RAII teardown
//! - [`BulkOutcome`]: per-item results of concurrent step updates
//! - [`Notifier`], [`NoticeSink`]: transient user notifications
//! - [`render`]: text views of the list, detail, and form

pub mod bulk;
pub mod error;
pub mod listeners;
pub mod notify;
pub mod page;
pub mod render;
pub mod state;

pub use bulk::BulkOutcome;
pub use error::PageError;
pub use listeners::{ClickEffect, ClickListeners, ClickTarget, Subscription};
pub use notify::{JsonlSink, MemorySink, Notice, NoticeLevel, NoticeSink, Notifier, TracingSink};
pub use page::{GenerationTicket, GoalsPage, SubmitOutcome};
pub use state::PageState;
