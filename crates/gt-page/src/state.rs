// state.rs - PageState: everything the goals page renders from.
//
// Holds the cached goals, the form draft, and the UI flags. Two flags are
// linked: at most one goal is expanded, at most one options menu is open,
// and the two never coexist. The open menu carries its outside-click
// subscription, so closing the menu always tears the listener down.

use chrono::{DateTime, Utc};
use gt_goal::{Goal, GoalDraft, GoalProgress};

use crate::listeners::{self, ClickEffect, ClickListeners, ClickTarget, Subscription};

#[derive(Debug)]
struct OpenMenu {
    goal_id: String,
    _outside_click: Subscription,
}

/// View state for the goals page.
#[derive(Debug, Default)]
pub struct PageState {
    goals: Vec<Goal>,
    loaded: bool,
    draft: GoalDraft,
    modal_open: bool,
    expanded: Option<String>,
    menu: Option<OpenMenu>,
    generating: bool,
    form_epoch: u64,
    listeners: ClickListeners,
}

impl PageState {
    pub fn new() -> Self {
        Self::default()
    }

    // ---- goals cache ----

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn goal(&self, goal_id: &str) -> Option<&Goal> {
        self.goals.iter().find(|g| g.id == goal_id)
    }

    pub fn goal_mut(&mut self, goal_id: &str) -> Option<&mut Goal> {
        self.goals.iter_mut().find(|g| g.id == goal_id)
    }

    /// Goal at a 1-based list position, as shown by the list view.
    pub fn goal_at(&self, position: usize) -> Option<&Goal> {
        position.checked_sub(1).and_then(|i| self.goals.get(i))
    }

    /// Whether the initial fetch has completed.
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// Replace the cache with a fresh server listing.
    pub fn set_goals(&mut self, goals: Vec<Goal>) {
        self.goals = goals;
        self.loaded = true;
        if let Some(id) = self.expanded.clone() {
            if self.goal(&id).is_none() {
                self.expanded = None;
            }
        }
    }

    pub fn push_goal(&mut self, goal: Goal) {
        self.goals.push(goal);
    }

    /// Replace the goal with the same id wholesale. Returns false if absent.
    pub fn replace_goal(&mut self, goal: Goal) -> bool {
        match self.goal_mut(&goal.id.clone()) {
            Some(slot) => {
                *slot = goal;
                true
            }
            None => false,
        }
    }

    /// Drop a goal from the cache, along with any UI state pointing at it.
    pub fn remove_goal(&mut self, goal_id: &str) -> Option<Goal> {
        let index = self.goals.iter().position(|g| g.id == goal_id)?;
        if self.expanded.as_deref() == Some(goal_id) {
            self.expanded = None;
        }
        if self.menu_goal() == Some(goal_id) {
            self.close_menu();
        }
        Some(self.goals.remove(index))
    }

    /// Goals with their progress, in list order.
    pub fn progress_rows(&self, now: DateTime<Utc>) -> Vec<(&Goal, GoalProgress)> {
        self.goals
            .iter()
            .map(|g| (g, GoalProgress::compute(g, now)))
            .collect()
    }

    // ---- expansion and options menu ----

    pub fn expanded(&self) -> Option<&str> {
        self.expanded.as_deref()
    }

    /// Expand `goal_id`, or collapse it if it is already expanded.
    /// Expanding closes any open menu. Returns whether the goal is now expanded.
    pub fn toggle_expand(&mut self, goal_id: &str) -> bool {
        self.close_menu();
        if self.expanded.as_deref() == Some(goal_id) {
            self.expanded = None;
            false
        } else {
            self.expanded = Some(goal_id.to_string());
            true
        }
    }

    pub fn menu_goal(&self) -> Option<&str> {
        self.menu.as_ref().map(|m| m.goal_id.as_str())
    }

    /// Open the options menu of `goal_id`, or close it if already open.
    /// Opening collapses any expanded goal. Returns whether the menu is open.
    pub fn toggle_menu(&mut self, goal_id: &str) -> bool {
        if self.menu_goal() == Some(goal_id) {
            self.close_menu();
            return false;
        }
        self.expanded = None;
        let subscription = self
            .listeners
            .subscribe(listeners::close_on_outside_click(goal_id.to_string()));
        self.menu = Some(OpenMenu {
            goal_id: goal_id.to_string(),
            _outside_click: subscription,
        });
        true
    }

    /// Close the options menu. Dropping it unsubscribes its listener.
    pub fn close_menu(&mut self) {
        self.menu = None;
    }

    /// Deliver a click to the page's active listeners.
    pub fn click(&mut self, target: ClickTarget) {
        for effect in self.listeners.dispatch(&target) {
            match effect {
                ClickEffect::CloseMenu => self.close_menu(),
            }
        }
    }

    /// Number of active click listeners.
    pub fn active_listeners(&self) -> usize {
        self.listeners.len()
    }

    // ---- form ----

    pub fn modal_open(&self) -> bool {
        self.modal_open
    }

    pub fn draft(&self) -> &GoalDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut GoalDraft {
        &mut self.draft
    }

    /// Bumped every time the form is opened or closed. A value taken while
    /// one draft was open never matches a later draft.
    pub fn form_epoch(&self) -> u64 {
        self.form_epoch
    }

    /// Open the form with an empty draft.
    pub fn open_new_form(&mut self, user_id: Option<String>) {
        self.close_menu();
        self.form_epoch += 1;
        self.draft = GoalDraft::new();
        self.draft.user_id = user_id;
        self.modal_open = true;
    }

    /// Open the form pre-populated from `goal`.
    pub fn open_edit_form(&mut self, goal: &Goal) {
        self.close_menu();
        self.form_epoch += 1;
        self.draft = GoalDraft::from_goal(goal);
        self.modal_open = true;
    }

    /// Close the form and discard the draft.
    pub fn close_form(&mut self) {
        self.form_epoch += 1;
        self.draft = GoalDraft::new();
        self.modal_open = false;
    }

    // ---- generation flag ----

    pub fn generating(&self) -> bool {
        self.generating
    }

    /// Set the generating flag. Returns false if it was already set.
    pub fn begin_generating(&mut self) -> bool {
        if self.generating {
            return false;
        }
        self.generating = true;
        true
    }

    pub fn end_generating(&mut self) {
        self.generating = false;
    }
}
