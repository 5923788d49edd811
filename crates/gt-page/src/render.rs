//! Text views of the goals page.
//!
//! Each function is a pure function of page state (plus `now` for the day
//! math), so the shell simply re-renders after every action.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use gt_goal::dates::to_display_date;
use gt_goal::{DraftMode, Goal, GoalProgress, Step};

use crate::notify::{Notice, NoticeLevel};
use crate::state::PageState;

const BAR_WIDTH: usize = 20;

/// `[#####...............]` for a 0-100 percentage.
pub fn progress_bar(percent: u32) -> String {
    let filled = (percent.min(100) as usize * BAR_WIDTH + 50) / 100;
    format!("[{}{}]", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

fn remaining_label(progress: &GoalProgress) -> String {
    match progress.remaining_days {
        d if d < 0 => format!("{} days overdue", -d),
        1 => "1 day left".to_string(),
        d => format!("{} days left", d),
    }
}

/// One row per goal. The expanded goal gets its detail inline; the goal
/// with an open options menu shows the menu entries.
pub fn render_list(state: &PageState, now: DateTime<Utc>) -> String {
    if state.goals().is_empty() {
        return if state.is_loaded() {
            "No goals yet. Use `new` to create one.\n".to_string()
        } else {
            "Loading goals...\n".to_string()
        };
    }

    let mut out = String::new();
    for (i, (goal, progress)) in state.progress_rows(now).into_iter().enumerate() {
        let marker = if state.expanded() == Some(goal.id.as_str()) {
            'v'
        } else {
            '>'
        };
        let _ = writeln!(
            out,
            "{:>2}. {} {:<28} {} {:>3}%  {}/{} steps  {}  (time {}%)",
            i + 1,
            marker,
            truncate(&goal.title, 28),
            progress_bar(progress.percent),
            progress.percent,
            progress.completed,
            progress.total,
            remaining_label(&progress),
            progress.elapsed_percent,
        );
        if state.menu_goal() == Some(goal.id.as_str()) {
            out.push_str("      [ reset | edit | delete ]\n");
        }
        if state.expanded() == Some(goal.id.as_str()) {
            for line in render_detail(goal, now).lines() {
                let _ = writeln!(out, "      {}", line);
            }
        }
    }
    out
}

/// Description, day statistics, and steps in display order.
pub fn render_detail(goal: &Goal, now: DateTime<Utc>) -> String {
    let progress = GoalProgress::compute(goal, now);
    let mut out = String::new();

    if !goal.description.is_empty() {
        let _ = writeln!(out, "{}", goal.description);
    }
    let _ = writeln!(
        out,
        "Day {} of {} ({}), started {}",
        progress.elapsed_days,
        goal.total_days,
        remaining_label(&progress),
        to_display_date(&goal.created_at),
    );

    if goal.steps.is_empty() {
        out.push_str("No steps.\n");
        return out;
    }
    for (_, step) in gt_goal::draft::display_order(&goal.steps) {
        out.push_str(&render_step_line(step));
    }
    out
}

fn render_step_line(step: &Step) -> String {
    let check = if step.completed { "[x]" } else { "[ ]" };
    let mut line = format!("{} {}", check, step.title);
    if let Some(due) = &step.due_date {
        let _ = write!(line, "  (due {})", to_display_date(due));
    }
    if let Some(skip) = &step.skip {
        let flag = if skip.important { "skipped, important" } else { "skipped" };
        let _ = write!(line, "  [{}: {}]", flag, skip.reason);
    }
    let _ = write!(line, "  #{}", step.id);
    line.push('\n');
    line
}

/// The create/edit modal. Steps are listed in display order but numbered
/// by stored index, which is what the step editor commands take.
pub fn render_form(state: &PageState) -> String {
    if !state.modal_open() {
        return String::new();
    }
    let draft = state.draft();
    let heading = match draft.mode() {
        DraftMode::Create => "New goal",
        DraftMode::Edit => "Edit goal",
    };

    let mut out = String::new();
    let _ = writeln!(out, "== {} ==", heading);
    let _ = writeln!(out, "Title:       {}", draft.title);
    let _ = writeln!(out, "Description: {}", draft.description);
    let _ = writeln!(out, "Total days:  {}", draft.total_days);
    if state.generating() {
        out.push_str("Generating steps...\n");
    }
    if draft.steps().is_empty() {
        out.push_str("Steps: (none)\n");
    } else {
        out.push_str("Steps:\n");
        for (index, step) in draft.display_order() {
            let due = step
                .due_date
                .as_ref()
                .map(to_display_date)
                .unwrap_or_default();
            let title = if step.title.is_empty() {
                "(untitled)"
            } else {
                step.title.as_str()
            };
            let _ = writeln!(out, "  [{}] {:<30} {}", index, title, due);
        }
    }
    out
}

/// Recent notices, newest last.
pub fn render_notices(notices: &[Notice]) -> String {
    let mut out = String::new();
    for notice in notices {
        let tag = match notice.level {
            NoticeLevel::Info => "info",
            NoticeLevel::Success => "ok",
            NoticeLevel::Warning => "warn",
            NoticeLevel::Error => "error",
        };
        let _ = writeln!(out, "[{}] {}", tag, notice.message);
    }
    out
}

/// The whole page: form if the modal is open, otherwise the list.
pub fn render_page(state: &PageState, now: DateTime<Utc>) -> String {
    if state.modal_open() {
        render_form(state)
    } else {
        render_list(state, now)
    }
}

fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}
