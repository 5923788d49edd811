// page.rs - GoalsPage: user actions against the goals page.
//
// Every action follows the same shape: validate against local state, call
// the API, and only on success fold the server's answer back into
// PageState. A failed call is logged with its full error, reported to the
// user as one short notice, and leaves local state as it was.
//
// Batches (goal reset, saving an edited goal's steps) run their step
// requests concurrently and wait for all of them; each step's result is
// applied on its own.

use chrono::Utc;
use futures::future::join_all;
use gt_api::{ApiError, GenerateStepsRequest, GoalsApi, StepPatch};
use gt_goal::{DraftCheck, DraftMode, Step};

use crate::bulk::BulkOutcome;
use crate::error::PageError;
use crate::notify::Notifier;
use crate::state::PageState;

/// What a form submission did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Empty title: nothing was sent.
    Skipped,
    /// A new goal was created with this id.
    Created(String),
    /// An existing goal was saved; `failed_steps` step updates did not go through.
    Updated { goal_id: String, failed_steps: usize },
}

/// A generation request that has been admitted past the in-flight guard.
///
/// Obtained from [`GoalsPage::start_generation`] and handed back to
/// [`GoalsPage::finish_generation`] with the API result.
#[derive(Debug)]
#[must_use = "finish_generation must be called to clear the generating flag"]
pub struct GenerationTicket {
    request: GenerateStepsRequest,
    form_epoch: u64,
}

impl GenerationTicket {
    pub fn request(&self) -> &GenerateStepsRequest {
        &self.request
    }
}

/// The goals page controller.
pub struct GoalsPage<A> {
    api: A,
    state: PageState,
    notifier: Notifier,
    user_id: Option<String>,
}

impl<A: GoalsApi> GoalsPage<A> {
    pub fn new(api: A, notifier: Notifier) -> Self {
        Self {
            api,
            state: PageState::new(),
            notifier,
            user_id: None,
        }
    }

    /// Owner id stamped on goals created from this page.
    pub fn with_user(mut self, user_id: Option<String>) -> Self {
        self.user_id = user_id;
        self
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn state(&self) -> &PageState {
        &self.state
    }

    /// Direct access for pure UI events (expand, menu, clicks, form typing).
    pub fn state_mut(&mut self) -> &mut PageState {
        &mut self.state
    }

    fn fail(&self, what: &str, err: impl Into<PageError>) -> PageError {
        let err = err.into();
        tracing::error!(error = %err, "{}", what);
        self.notifier.error(what.to_string());
        err
    }

    // ---- list ----

    /// Fetch goals the first time the page is shown. Later calls are no-ops.
    pub async fn mount(&mut self) -> Result<(), PageError> {
        if self.state.is_loaded() {
            return Ok(());
        }
        self.refresh().await
    }

    /// Re-fetch the goal list.
    pub async fn refresh(&mut self) -> Result<(), PageError> {
        match self.api.list_goals().await {
            Ok(goals) => {
                tracing::info!(count = goals.len(), "loaded goals");
                self.state.set_goals(goals);
                Ok(())
            }
            Err(e) => Err(self.fail("Failed to load goals", e)),
        }
    }

    // ---- step completion ----

    /// Mark one step of one goal completed.
    pub async fn complete_step(&mut self, goal_id: &str, step_id: &str) -> Result<(), PageError> {
        let goal = self
            .state
            .goal(goal_id)
            .ok_or_else(|| PageError::GoalNotFound(goal_id.to_string()))?;
        if goal.step(step_id).is_none() {
            return Err(PageError::Goal(gt_goal::GoalError::StepNotFound {
                goal_id: goal_id.to_string(),
                step_id: step_id.to_string(),
            }));
        }

        if let Err(e) = self.api.update_step(step_id, &StepPatch::complete()).await {
            return Err(self.fail("Failed to complete step", e));
        }

        if let Some(goal) = self.state.goal_mut(goal_id) {
            goal.complete_step(step_id)?;
        }
        tracing::info!(goal_id, step_id, "step completed");
        Ok(())
    }

    // ---- options menu actions ----

    /// Clear completion and skip metadata on every step of a goal.
    ///
    /// Steps whose update succeeded are reset locally even if others failed.
    pub async fn reset_goal(&mut self, goal_id: &str) -> Result<BulkOutcome<Step>, PageError> {
        self.state.close_menu();
        let step_ids: Vec<String> = self
            .state
            .goal(goal_id)
            .ok_or_else(|| PageError::GoalNotFound(goal_id.to_string()))?
            .steps
            .iter()
            .map(|s| s.id.clone())
            .collect();

        let patch = StepPatch::reset();
        let results = join_all(step_ids.iter().map(|id| self.api.update_step(id, &patch))).await;
        let outcome = BulkOutcome::collect(step_ids, results);

        if let Some(goal) = self.state.goal_mut(goal_id) {
            goal.reset_steps(outcome.succeeded_ids());
        }

        for (step_id, e) in &outcome.failed {
            tracing::error!(goal_id, step_id = %step_id, error = %e, "step reset failed");
        }
        if outcome.all_succeeded() {
            tracing::info!(goal_id, steps = outcome.total(), "goal progress reset");
            self.notifier.success("Progress reset");
        } else if outcome.all_failed() {
            self.notifier.error("Failed to reset progress");
        } else {
            tracing::warn!(goal_id, "goal progress partially reset");
            self.notifier.warning(format!(
                "Reset {}; {} failed",
                outcome.summary("steps"),
                outcome.failed.len()
            ));
        }
        Ok(outcome)
    }

    /// Fetch a goal's full detail and open the edit form with it.
    pub async fn edit_goal(&mut self, goal_id: &str) -> Result<(), PageError> {
        self.state.close_menu();
        match self.api.get_goal(goal_id).await {
            Ok(goal) => {
                self.state.open_edit_form(&goal);
                Ok(())
            }
            Err(e) => Err(self.fail("Failed to load goal for editing", e)),
        }
    }

    /// Delete a goal on the server and drop it locally.
    pub async fn delete_goal(&mut self, goal_id: &str) -> Result<(), PageError> {
        self.state.close_menu();
        if let Err(e) = self.api.delete_goal(goal_id).await {
            return Err(self.fail("Failed to delete goal", e));
        }
        self.state.remove_goal(goal_id);
        tracing::info!(goal_id, "goal deleted");
        self.notifier.success("Goal deleted");
        Ok(())
    }

    // ---- form ----

    pub fn open_new_form(&mut self) {
        self.state.open_new_form(self.user_id.clone());
    }

    pub fn cancel_form(&mut self) {
        self.state.close_form();
    }

    /// Submit the open form: create or update depending on the draft's id.
    pub async fn submit(&mut self) -> Result<SubmitOutcome, PageError> {
        if !self.state.modal_open() {
            return Err(PageError::NoOpenForm);
        }
        match self.state.draft().check() {
            DraftCheck::EmptyTitle => return Ok(SubmitOutcome::Skipped),
            DraftCheck::NonPositiveDays => {
                self.notifier
                    .warning("Total days must be greater than zero");
                return Err(PageError::InvalidDraft("total days must be greater than zero"));
            }
            DraftCheck::Ready => {}
        }

        match self.state.draft().mode() {
            DraftMode::Create => self.submit_create().await,
            DraftMode::Edit => self.submit_update().await,
        }
    }

    async fn submit_create(&mut self) -> Result<SubmitOutcome, PageError> {
        let mut goal = self.state.draft().to_goal();
        goal.created_at = Utc::now();

        let created = match self.api.create_goal(&goal).await {
            Ok(created) => created,
            Err(e) => return Err(self.fail("Failed to create goal", e)),
        };

        let id = created.id.clone();
        tracing::info!(goal_id = %id, steps = created.steps.len(), "goal created");
        self.state.push_goal(created);
        self.state.close_form();
        self.notifier.success("Goal created");
        Ok(SubmitOutcome::Created(id))
    }

    async fn submit_update(&mut self) -> Result<SubmitOutcome, PageError> {
        let goal = self.state.draft().to_goal();

        let mut saved = match self.api.update_goal(&goal).await {
            Ok(saved) => saved,
            Err(e) => return Err(self.fail("Failed to update goal", e)),
        };

        // Steps the service renamed or dropped while saving the goal are not
        // patched individually; the saved goal is the source of truth.
        let patches: Vec<(String, StepPatch)> = goal
            .steps
            .iter()
            .filter(|step| saved.step(&step.id).is_some())
            .map(|step| (step.id.clone(), StepPatch::from_step(step)))
            .collect();
        let skipped = goal.steps.len() - patches.len();
        if skipped > 0 {
            tracing::debug!(goal_id = %saved.id, skipped, "steps re-keyed by the service");
        }
        let results = join_all(
            patches
                .iter()
                .map(|(step_id, patch)| self.api.update_step(step_id, patch)),
        )
        .await;
        let outcome = BulkOutcome::collect(patches.iter().map(|(id, _)| id.clone()), results);

        for step in &mut saved.steps {
            if let Some(updated) = outcome.value_for(&step.id) {
                *step = updated.clone();
            }
        }
        let goal_id = saved.id.clone();
        if !self.state.replace_goal(saved.clone()) {
            self.state.push_goal(saved);
        }

        for (step_id, e) in &outcome.failed {
            tracing::error!(goal_id = %goal_id, step_id = %step_id, error = %e, "step update failed");
        }
        let failed_steps = outcome.failed.len();
        if outcome.all_succeeded() {
            tracing::info!(goal_id = %goal_id, "goal updated");
            self.state.close_form();
            self.notifier.success("Goal updated");
        } else {
            self.notifier.warning(format!(
                "Goal saved, but only {} were updated",
                outcome.summary("steps")
            ));
        }
        Ok(SubmitOutcome::Updated {
            goal_id,
            failed_steps,
        })
    }

    // ---- AI step generation ----

    /// Validate the draft and claim the generating flag.
    ///
    /// Fails with [`PageError::GenerationInFlight`] while a previous ticket
    /// is still outstanding.
    pub fn start_generation(&mut self) -> Result<GenerationTicket, PageError> {
        if !self.state.modal_open() {
            return Err(PageError::NoOpenForm);
        }
        if self.state.generating() {
            self.notifier.warning("Steps are already being generated");
            return Err(PageError::GenerationInFlight);
        }
        let draft = self.state.draft();
        let Some(goal) = draft.generation_prompt().map(str::to_string) else {
            self.notifier
                .warning("Add a title or description before generating steps");
            return Err(PageError::InvalidDraft("goal text is empty"));
        };
        if draft.total_days <= 0 {
            self.notifier
                .warning("Total days must be greater than zero");
            return Err(PageError::InvalidDraft("total days must be greater than zero"));
        }

        let request = GenerateStepsRequest {
            goal,
            total_days: draft.total_days,
        };
        self.state.begin_generating();
        Ok(GenerationTicket {
            request,
            form_epoch: self.state.form_epoch(),
        })
    }

    /// Clear the generating flag and apply the generator's answer.
    ///
    /// On success the draft's steps are replaced wholesale, provided the
    /// form the ticket was issued for is still the one open. Returns the
    /// number of steps received.
    pub fn finish_generation(
        &mut self,
        ticket: GenerationTicket,
        result: Result<Vec<Step>, ApiError>,
    ) -> Result<usize, PageError> {
        self.state.end_generating();
        let steps = match result {
            Ok(steps) => steps,
            Err(e) => return Err(self.fail("Failed to generate steps", e)),
        };
        if !self.state.modal_open() || self.state.form_epoch() != ticket.form_epoch {
            tracing::warn!("generated steps arrived after their form closed; discarding");
            return Err(PageError::StaleGeneration);
        }

        let count = steps.len();
        self.state.draft_mut().replace_steps(steps);
        tracing::info!(
            count,
            total_days = ticket.request.total_days,
            "generated steps"
        );
        self.notifier.success(format!("Generated {} steps", count));
        Ok(count)
    }

    /// Start, run, and finish one generation request.
    pub async fn generate_steps(&mut self) -> Result<usize, PageError> {
        let ticket = self.start_generation()?;
        let result = self.api.generate_steps(ticket.request()).await;
        self.finish_generation(ticket, result)
    }
}
