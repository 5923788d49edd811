// shell.rs - Interactive goals page.
//
// A line editor loop over one mounted GoalsPage. Every line is parsed into a
// ShellCommand, delivered to the page as the click it stands for, executed,
// and followed by the pending notices and a fresh render of the page.

use anyhow::{bail, Context as _};
use chrono::Utc;
use gt_goal::draft::display_order;
use gt_goal::StepField;
use gt_page::{render, ClickTarget, PageState};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

use super::{parse_index, resolve_goal, Context};

const HELP: &str = "\
Goals:
  list | ls              show the goal list
  expand N               expand or collapse goal N
  menu N                 open or close the options menu of goal N
  reset [N]              reset progress (defaults to the open menu's goal)
  edit [N]               edit a goal
  delete [N]             delete a goal
  done N STEP            mark a step completed (step id or position)
  refresh                reload goals from the server
Form:
  new                    open the new goal form
  title TEXT             set the title
  desc TEXT              set the description
  days N                 set the total days
  add [TITLE]            append a step
  rm I                   remove step I
  set I FIELD VALUE      set a step field (title, description, due)
  gen                    replace steps with generated ones
  save                   create or update the goal
  cancel                 close the form
Other:
  help                   this text
  quit | exit            leave the shell
";

/// One parsed shell line.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ShellCommand {
    List,
    Expand(String),
    Menu(String),
    Reset(Option<String>),
    Edit(Option<String>),
    Delete(Option<String>),
    Done { goal: String, step: String },
    Refresh,
    New,
    Title(String),
    Description(String),
    Days(i64),
    Add(String),
    Remove(usize),
    Set { index: usize, field: String, value: String },
    Generate,
    Save,
    Cancel,
    Help,
    Quit,
}

impl ShellCommand {
    fn parse(line: &str) -> anyhow::Result<Self> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };
        let optional = |rest: &str| (!rest.is_empty()).then(|| rest.to_string());
        let required = |rest: &str, what: &str| -> anyhow::Result<String> {
            if rest.is_empty() {
                bail!("`{}` needs {}", word, what);
            }
            Ok(rest.to_string())
        };

        let cmd = match word {
            "list" | "ls" => Self::List,
            "expand" => Self::Expand(required(rest, "a goal")?),
            "menu" => Self::Menu(required(rest, "a goal")?),
            "reset" => Self::Reset(optional(rest)),
            "edit" => Self::Edit(optional(rest)),
            "delete" => Self::Delete(optional(rest)),
            "done" => {
                let Some((goal, step)) = rest.split_once(char::is_whitespace) else {
                    bail!("usage: done N STEP");
                };
                Self::Done {
                    goal: goal.to_string(),
                    step: step.trim().to_string(),
                }
            }
            "refresh" => Self::Refresh,
            "new" => Self::New,
            "title" => Self::Title(rest.to_string()),
            "desc" | "description" => Self::Description(rest.to_string()),
            "days" => {
                let raw = required(rest, "a number of days")?;
                Self::Days(
                    raw.parse()
                        .with_context(|| format!("expected a number of days, got {:?}", raw))?,
                )
            }
            "add" => Self::Add(rest.to_string()),
            "rm" => Self::Remove(parse_index(&required(rest, "a step index")?)?),
            "set" => {
                let mut parts = rest.splitn(3, char::is_whitespace);
                let (Some(index), Some(field)) = (parts.next(), parts.next()) else {
                    bail!("usage: set I FIELD VALUE");
                };
                Self::Set {
                    index: parse_index(index)?,
                    field: field.to_string(),
                    value: parts.next().unwrap_or("").trim().to_string(),
                }
            }
            "gen" | "generate" => Self::Generate,
            "save" => Self::Save,
            "cancel" => Self::Cancel,
            "help" | "?" => Self::Help,
            "quit" | "exit" => Self::Quit,
            other => bail!("unknown command {:?} (try `help`)", other),
        };
        Ok(cmd)
    }

    fn needs_form(&self) -> bool {
        matches!(
            self,
            Self::Title(_)
                | Self::Description(_)
                | Self::Days(_)
                | Self::Add(_)
                | Self::Remove(_)
                | Self::Set { .. }
                | Self::Generate
                | Self::Save
                | Self::Cancel
        )
    }
}

pub async fn execute(mut ctx: Context) -> anyhow::Result<()> {
    let mut editor = DefaultEditor::new()?;
    println!("gt shell. Type `help` for commands.");

    // A failed initial load is already reported as a notice; the shell
    // stays usable and `refresh` can retry.
    let _ = ctx.page.mount().await;
    ctx.flush_notices();
    print!("{}", render::render_page(ctx.page.state(), Utc::now()));

    loop {
        let prompt = if ctx.page.state().modal_open() {
            "gt(form)> "
        } else {
            "gt> "
        };
        let line = match editor.readline(prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => continue,
            Err(ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        if line.trim().is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(line.as_str());

        let cmd = match ShellCommand::parse(&line) {
            Ok(cmd) => cmd,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };
        match cmd {
            ShellCommand::Quit => break,
            ShellCommand::Help => {
                print!("{}", HELP);
                continue;
            }
            _ => {}
        }

        if let Err(e) = run(&mut ctx, cmd).await {
            tracing::debug!(error = %e, "shell command failed");
            // Failures of server calls already produced a notice.
            if ctx.notices.recent().is_empty() {
                println!("{:#}", e);
            }
        }
        ctx.flush_notices();
        print!("{}", render::render_page(ctx.page.state(), Utc::now()));
    }
    Ok(())
}

async fn run(ctx: &mut Context, cmd: ShellCommand) -> anyhow::Result<()> {
    let page = &mut ctx.page;
    if cmd.needs_form() && !page.state().modal_open() {
        bail!("no form is open; use `new` or `edit N`");
    }
    deliver_click(page.state_mut(), &cmd)?;

    match cmd {
        ShellCommand::List | ShellCommand::Help | ShellCommand::Quit => {}
        ShellCommand::Refresh => page.refresh().await?,
        ShellCommand::Expand(goal) => {
            let id = resolve_goal(page.state(), &goal)?;
            page.state_mut().toggle_expand(&id);
        }
        ShellCommand::Menu(goal) => {
            let id = resolve_goal(page.state(), &goal)?;
            page.state_mut().toggle_menu(&id);
        }
        ShellCommand::Reset(goal) => {
            let id = menu_target(page.state(), goal.as_deref())?;
            page.reset_goal(&id).await?;
        }
        ShellCommand::Edit(goal) => {
            let id = menu_target(page.state(), goal.as_deref())?;
            page.edit_goal(&id).await?;
        }
        ShellCommand::Delete(goal) => {
            let id = menu_target(page.state(), goal.as_deref())?;
            page.delete_goal(&id).await?;
        }
        ShellCommand::Done { goal, step } => {
            let goal_id = resolve_goal(page.state(), &goal)?;
            let step_id = resolve_step(page.state(), &goal_id, &step)?;
            page.complete_step(&goal_id, &step_id).await?;
        }
        ShellCommand::New => page.open_new_form(),
        ShellCommand::Title(title) => page.state_mut().draft_mut().title = title,
        ShellCommand::Description(description) => {
            page.state_mut().draft_mut().description = description
        }
        ShellCommand::Days(days) => page.state_mut().draft_mut().total_days = days,
        ShellCommand::Add(title) => {
            let draft = page.state_mut().draft_mut();
            let index = draft.steps().len();
            draft.add_step();
            if !title.is_empty() {
                draft.update_step(index, StepField::Title(title))?;
            }
        }
        ShellCommand::Remove(index) => {
            page.state_mut().draft_mut().remove_step(index)?;
        }
        ShellCommand::Set {
            index,
            field,
            value,
        } => {
            let field = StepField::parse(&field, &value)?;
            page.state_mut().draft_mut().update_step(index, field)?;
        }
        ShellCommand::Generate => {
            page.generate_steps().await?;
        }
        ShellCommand::Save => {
            page.submit().await?;
        }
        ShellCommand::Cancel => page.cancel_form(),
    }
    Ok(())
}

/// Translate a command into the click it represents. Menu actions land
/// inside the open menu; everything else lands outside it.
fn deliver_click(state: &mut PageState, cmd: &ShellCommand) -> anyhow::Result<()> {
    let target = match cmd {
        ShellCommand::Reset(None) | ShellCommand::Edit(None) | ShellCommand::Delete(None) => {
            match state.menu_goal() {
                Some(id) => ClickTarget::OptionsMenu(id.to_string()),
                None => ClickTarget::Elsewhere,
            }
        }
        ShellCommand::Menu(goal) => ClickTarget::OptionsMenu(resolve_goal(state, goal)?),
        ShellCommand::Expand(goal) => ClickTarget::GoalRow(resolve_goal(state, goal)?),
        _ => ClickTarget::Elsewhere,
    };
    state.click(target);
    Ok(())
}

/// The goal a menu action applies to: the explicit reference, or the goal
/// whose options menu is open.
fn menu_target(state: &PageState, reference: Option<&str>) -> anyhow::Result<String> {
    match reference {
        Some(reference) => resolve_goal(state, reference),
        None => state
            .menu_goal()
            .map(str::to_string)
            .context("no options menu is open; give a goal number"),
    }
}

/// Resolve a step reference within one goal: a step id, or a 1-based
/// position in display order.
fn resolve_step(state: &PageState, goal_id: &str, reference: &str) -> anyhow::Result<String> {
    let goal = state
        .goal(goal_id)
        .with_context(|| format!("no goal {}", goal_id))?;
    let reference = reference.trim_start_matches('#');
    if let Some(step) = goal.step(reference) {
        return Ok(step.id.clone());
    }
    if let Ok(position) = reference.parse::<usize>() {
        if let Some((_, step)) = position
            .checked_sub(1)
            .and_then(|i| display_order(&goal.steps).into_iter().nth(i))
        {
            return Ok(step.id.clone());
        }
    }
    bail!("goal {} has no step {:?}", goal_id, reference)
}
