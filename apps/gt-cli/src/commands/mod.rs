// mod.rs - Shared plumbing for gt subcommands.

pub mod goal;
pub mod shell;

use std::path::Path;

use anyhow::{bail, Context as _};
use gt_api::{ClientConfig, HttpGoalsApi};
use gt_page::{render, GoalsPage, JsonlSink, MemorySink, Notifier, PageState, TracingSink};

/// How many notices the shell keeps for display.
const NOTICE_BACKLOG: usize = 32;

/// A mounted-on-demand goals page plus the notice queue its views read.
pub struct Context {
    pub page: GoalsPage<HttpGoalsApi>,
    pub notices: MemorySink,
}

impl Context {
    pub fn new(config: &ClientConfig, notice_log: Option<&Path>) -> anyhow::Result<Self> {
        let api = HttpGoalsApi::new(config)?;
        let notices = MemorySink::new(NOTICE_BACKLOG);

        let mut notifier = Notifier::new();
        notifier.add_sink(Box::new(TracingSink));
        notifier.add_sink(Box::new(notices.clone()));
        if let Some(path) = notice_log {
            notifier.add_sink(Box::new(JsonlSink::new(path)));
        }

        let page = GoalsPage::new(api, notifier).with_user(config.user_id.clone());
        Ok(Self { page, notices })
    }

    /// Print and clear pending notices.
    pub fn flush_notices(&self) {
        let pending = self.notices.drain();
        if !pending.is_empty() {
            print!("{}", render::render_notices(&pending));
        }
    }
}

/// Resolve a goal reference: a 1-based list position or a goal id.
pub fn resolve_goal(state: &PageState, reference: &str) -> anyhow::Result<String> {
    if let Some(goal) = state.goal(reference) {
        return Ok(goal.id.clone());
    }
    if let Ok(position) = reference.parse::<usize>() {
        if let Some(goal) = state.goal_at(position) {
            return Ok(goal.id.clone());
        }
    }
    bail!("no goal matches {:?}", reference)
}

/// Parse a form step index.
pub fn parse_index(raw: &str) -> anyhow::Result<usize> {
    raw.parse::<usize>()
        .with_context(|| format!("expected a step index, got {:?}", raw))
}
