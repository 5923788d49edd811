// goal.rs - One-shot goal subcommands: list, show, create, edit, delete,
// reset, complete, generate.
//
// Each command mounts the page (one GET /api/goals), performs a single
// page action, prints the resulting notices and view, and exits non-zero
// if the action failed.

use anyhow::{bail, Context as _};
use chrono::Utc;
use clap::Subcommand;
use gt_api::HttpGoalsApi;
use gt_goal::{GoalDraft, StepField};
use gt_page::{render, GoalsPage, SubmitOutcome};

use super::{parse_index, resolve_goal, Context};

#[derive(Subcommand)]
pub enum GoalCommands {
    /// List goals with progress and remaining days.
    List,
    /// Show a goal's details and steps.
    Show {
        /// Goal id or list position.
        goal: String,
    },
    /// Create a new goal.
    Create {
        /// Goal title.
        #[arg(long)]
        title: String,
        /// What the goal is about (also sent to the step generator).
        #[arg(long, default_value = "")]
        description: String,
        /// Total duration in days.
        #[arg(long)]
        days: i64,
        /// Step title; repeat for several steps.
        #[arg(long = "step")]
        steps: Vec<String>,
        /// Replace the steps with generated ones before saving.
        #[arg(long)]
        generate: bool,
    },
    /// Edit a goal. Step edits use stored step indices, applied in the order
    /// --rename, --due, --remove-step, then --add-step.
    Edit {
        /// Goal id or list position.
        goal: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        days: Option<i64>,
        /// Rename a step: INDEX=TITLE.
        #[arg(long)]
        rename: Vec<String>,
        /// Set a step's due date: INDEX=YYYY-MM-DD (empty date clears it).
        #[arg(long)]
        due: Vec<String>,
        /// Remove the step at INDEX.
        #[arg(long)]
        remove_step: Vec<usize>,
        /// Append a step with this title.
        #[arg(long)]
        add_step: Vec<String>,
        /// Replace the steps with generated ones before saving.
        #[arg(long)]
        generate: bool,
    },
    /// Delete a goal.
    Delete {
        /// Goal id or list position.
        goal: String,
    },
    /// Mark every step of a goal not completed and clear skip notes.
    Reset {
        /// Goal id or list position.
        goal: String,
    },
    /// Mark a step completed.
    Complete {
        /// Goal id or list position.
        goal: String,
        /// Step id.
        step: String,
    },
    /// Ask the step generator for a plan without saving anything.
    Generate {
        /// Goal description to plan for.
        #[arg(long)]
        goal: String,
        /// Number of days the plan should cover.
        #[arg(long)]
        days: i64,
    },
}

pub async fn execute(cmd: GoalCommands, mut ctx: Context) -> anyhow::Result<()> {
    let result = run(cmd, &mut ctx.page).await;
    ctx.flush_notices();
    result
}

async fn run(cmd: GoalCommands, page: &mut GoalsPage<HttpGoalsApi>) -> anyhow::Result<()> {
    // Generation alone never touches the goal list.
    if let GoalCommands::Generate { goal, days } = cmd {
        return generate_plan(page, goal, days).await;
    }

    page.mount().await?;

    match cmd {
        GoalCommands::List => {
            print!("{}", render::render_list(page.state(), Utc::now()));
            Ok(())
        }
        GoalCommands::Show { goal } => show_goal(page, &goal),
        GoalCommands::Create {
            title,
            description,
            days,
            steps,
            generate,
        } => create_goal(page, title, description, days, steps, generate).await,
        GoalCommands::Edit {
            goal,
            title,
            description,
            days,
            rename,
            due,
            remove_step,
            add_step,
            generate,
        } => {
            let edits = GoalEdits {
                title,
                description,
                days,
                rename,
                due,
                remove_step,
                add_step,
            };
            edit_goal(page, &goal, edits, generate).await
        }
        GoalCommands::Delete { goal } => {
            let id = resolve_goal(page.state(), &goal)?;
            page.delete_goal(&id).await?;
            println!("Goal deleted: {}", id);
            Ok(())
        }
        GoalCommands::Reset { goal } => {
            let id = resolve_goal(page.state(), &goal)?;
            let outcome = page.reset_goal(&id).await?;
            if !outcome.all_succeeded() {
                bail!(
                    "reset incomplete: {} of {} step updates failed",
                    outcome.failed.len(),
                    outcome.total()
                );
            }
            show_goal(page, &id)
        }
        GoalCommands::Complete { goal, step } => {
            let id = resolve_goal(page.state(), &goal)?;
            page.complete_step(&id, &step).await?;
            show_goal(page, &id)
        }
        GoalCommands::Generate { .. } => Ok(()),
    }
}

fn show_goal(page: &GoalsPage<HttpGoalsApi>, reference: &str) -> anyhow::Result<()> {
    let id = resolve_goal(page.state(), reference)?;
    let goal = page
        .state()
        .goal(&id)
        .with_context(|| format!("goal {} disappeared", id))?;
    println!("{}", goal.title);
    print!("{}", render::render_detail(goal, Utc::now()));
    Ok(())
}

async fn create_goal(
    page: &mut GoalsPage<HttpGoalsApi>,
    title: String,
    description: String,
    days: i64,
    steps: Vec<String>,
    generate: bool,
) -> anyhow::Result<()> {
    page.open_new_form();
    {
        let draft = page.state_mut().draft_mut();
        draft.title = title;
        draft.description = description;
        draft.total_days = days;
        for step_title in steps {
            append_step(draft, step_title)?;
        }
    }
    if generate {
        page.generate_steps().await?;
    }

    match page.submit().await? {
        SubmitOutcome::Skipped => bail!("title is empty; nothing was created"),
        SubmitOutcome::Created(id) => {
            println!("Goal created: {}", id);
            show_goal(page, &id)
        }
        SubmitOutcome::Updated { goal_id, .. } => show_goal(page, &goal_id),
    }
}

/// Field and step changes requested by `gt edit`.
struct GoalEdits {
    title: Option<String>,
    description: Option<String>,
    days: Option<i64>,
    rename: Vec<String>,
    due: Vec<String>,
    remove_step: Vec<usize>,
    add_step: Vec<String>,
}

impl GoalEdits {
    fn apply(self, draft: &mut GoalDraft) -> anyhow::Result<()> {
        if let Some(title) = self.title {
            draft.title = title;
        }
        if let Some(description) = self.description {
            draft.description = description;
        }
        if let Some(days) = self.days {
            draft.total_days = days;
        }
        for assignment in &self.rename {
            let (index, value) = split_assignment(assignment)?;
            draft.update_step(index, StepField::Title(value.to_string()))?;
        }
        for assignment in &self.due {
            let (index, value) = split_assignment(assignment)?;
            draft.update_step(index, StepField::parse("due", value)?)?;
        }
        let mut removals = self.remove_step;
        removals.sort_unstable_by(|a, b| b.cmp(a));
        removals.dedup();
        for index in removals {
            draft.remove_step(index)?;
        }
        for title in self.add_step {
            append_step(draft, title)?;
        }
        Ok(())
    }
}

async fn edit_goal(
    page: &mut GoalsPage<HttpGoalsApi>,
    reference: &str,
    edits: GoalEdits,
    generate: bool,
) -> anyhow::Result<()> {
    let id = resolve_goal(page.state(), reference)?;
    page.edit_goal(&id).await?;
    edits.apply(page.state_mut().draft_mut())?;
    if generate {
        page.generate_steps().await?;
    }

    match page.submit().await? {
        SubmitOutcome::Skipped => bail!("title is empty; nothing was saved"),
        SubmitOutcome::Updated {
            goal_id,
            failed_steps,
        } => {
            show_goal(page, &goal_id)?;
            if failed_steps > 0 {
                bail!("{} step updates failed", failed_steps);
            }
            Ok(())
        }
        SubmitOutcome::Created(id) => show_goal(page, &id),
    }
}

async fn generate_plan(
    page: &mut GoalsPage<HttpGoalsApi>,
    goal: String,
    days: i64,
) -> anyhow::Result<()> {
    page.open_new_form();
    {
        let draft = page.state_mut().draft_mut();
        draft.description = goal;
        draft.total_days = days;
    }
    page.generate_steps().await?;
    print!("{}", render::render_form(page.state()));
    page.cancel_form();
    Ok(())
}

fn append_step(draft: &mut GoalDraft, title: String) -> anyhow::Result<()> {
    let index = draft.steps().len();
    draft.add_step();
    draft.update_step(index, StepField::Title(title))?;
    Ok(())
}

/// Split `INDEX=VALUE`.
fn split_assignment(assignment: &str) -> anyhow::Result<(usize, &str)> {
    let (index, value) = assignment
        .split_once('=')
        .with_context(|| format!("expected INDEX=VALUE, got {:?}", assignment))?;
    Ok((parse_index(index.trim())?, value))
}
