// page_flow.rs - GoalsPage actions against an in-memory GoalsApi.
//
// FakeApi records every call and can be told to fail individual step ids or
// whole endpoints, which is how the partial-failure paths are exercised.

use std::collections::HashSet;
use std::sync::Mutex;

use async_trait::async_trait;
use gt_api::{ApiError, GenerateStepsRequest, GoalsApi, StepPatch};
use gt_goal::{Goal, SkipInfo, Step, StepField};
use gt_page::{GoalsPage, MemorySink, NoticeLevel, Notifier, PageError, SubmitOutcome};

#[derive(Default)]
struct FakeState {
    goals: Vec<Goal>,
    next_id: u32,
    calls: Vec<String>,
    failing_steps: HashSet<String>,
    failing_endpoints: HashSet<&'static str>,
    generated: Vec<Step>,
    // When set, goal updates give steps the service has never seen an id
    // of its own ("srv-<local id>").
    rekey_new_steps: bool,
}

#[derive(Default)]
struct FakeApi {
    inner: Mutex<FakeState>,
}

fn server_error() -> ApiError {
    ApiError::Status {
        method: "TEST".to_string(),
        url: "http://fake".to_string(),
        status: 500,
        body: "boom".to_string(),
    }
}

fn not_found() -> ApiError {
    ApiError::Status {
        method: "TEST".to_string(),
        url: "http://fake".to_string(),
        status: 404,
        body: String::new(),
    }
}

impl FakeApi {
    fn with_goals(goals: Vec<Goal>) -> Self {
        let api = Self::default();
        api.inner.lock().unwrap().goals = goals;
        api
    }

    fn fail_step(&self, step_id: &str) {
        self.inner
            .lock()
            .unwrap()
            .failing_steps
            .insert(step_id.to_string());
    }

    fn fail_endpoint(&self, name: &'static str) {
        self.inner.lock().unwrap().failing_endpoints.insert(name);
    }

    fn rekey_new_steps(&self) {
        self.inner.lock().unwrap().rekey_new_steps = true;
    }

    fn set_generated(&self, steps: Vec<Step>) {
        self.inner.lock().unwrap().generated = steps;
    }

    fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }

    fn calls_to(&self, prefix: &str) -> usize {
        self.calls().iter().filter(|c| c.starts_with(prefix)).count()
    }

    fn server_goal(&self, id: &str) -> Goal {
        let inner = self.inner.lock().unwrap();
        inner.goals.iter().find(|g| g.id == id).unwrap().clone()
    }

    fn enter(&self, call: String, endpoint: &'static str) -> Result<(), ApiError> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(call);
        if inner.failing_endpoints.contains(endpoint) {
            return Err(server_error());
        }
        Ok(())
    }
}

#[async_trait]
impl GoalsApi for FakeApi {
    async fn list_goals(&self) -> Result<Vec<Goal>, ApiError> {
        self.enter("list".to_string(), "list")?;
        Ok(self.inner.lock().unwrap().goals.clone())
    }

    async fn get_goal(&self, goal_id: &str) -> Result<Goal, ApiError> {
        self.enter(format!("get {}", goal_id), "get")?;
        let inner = self.inner.lock().unwrap();
        inner
            .goals
            .iter()
            .find(|g| g.id == goal_id)
            .cloned()
            .ok_or_else(not_found)
    }

    async fn create_goal(&self, goal: &Goal) -> Result<Goal, ApiError> {
        self.enter("create".to_string(), "create")?;
        let mut inner = self.inner.lock().unwrap();
        inner.next_id += 1;
        let mut created = goal.clone();
        created.id = format!("new{}", inner.next_id);
        inner.goals.push(created.clone());
        Ok(created)
    }

    async fn update_goal(&self, goal: &Goal) -> Result<Goal, ApiError> {
        self.enter(format!("update {}", goal.id), "update")?;
        let mut inner = self.inner.lock().unwrap();
        let rekey = inner.rekey_new_steps;
        let slot = inner
            .goals
            .iter_mut()
            .find(|g| g.id == goal.id)
            .ok_or_else(not_found)?;
        let mut stored = goal.clone();
        if rekey {
            for step in &mut stored.steps {
                if slot.step(&step.id).is_none() {
                    step.id = format!("srv-{}", step.id);
                }
            }
        }
        *slot = stored;
        Ok(slot.clone())
    }

    async fn delete_goal(&self, goal_id: &str) -> Result<(), ApiError> {
        self.enter(format!("delete {}", goal_id), "delete")?;
        self.inner.lock().unwrap().goals.retain(|g| g.id != goal_id);
        Ok(())
    }

    async fn update_step(&self, step_id: &str, patch: &StepPatch) -> Result<Step, ApiError> {
        self.enter(format!("step {}", step_id), "step")?;
        let mut inner = self.inner.lock().unwrap();
        if inner.failing_steps.contains(step_id) {
            return Err(server_error());
        }
        let step = inner
            .goals
            .iter_mut()
            .flat_map(|g| g.steps.iter_mut())
            .find(|s| s.id == step_id)
            .ok_or_else(not_found)?;
        patch.apply_to(step);
        Ok(step.clone())
    }

    async fn generate_steps(&self, request: &GenerateStepsRequest) -> Result<Vec<Step>, ApiError> {
        self.enter(
            format!("generate {} {}", request.goal, request.total_days),
            "generate",
        )?;
        Ok(self.inner.lock().unwrap().generated.clone())
    }
}

fn goal(id: &str, steps: &[(&str, bool)]) -> Goal {
    let mut goal = Goal::new(format!("Goal {}", id), format!("About {}", id), 30);
    goal.id = id.to_string();
    goal.steps = steps
        .iter()
        .map(|(sid, done)| {
            let mut s = Step::new(*sid, format!("Step {}", sid));
            s.completed = *done;
            s
        })
        .collect();
    goal
}

fn page_with(api: FakeApi) -> (GoalsPage<FakeApi>, MemorySink) {
    let memory = MemorySink::new(16);
    let mut notifier = Notifier::new();
    notifier.add_sink(Box::new(memory.clone()));
    (GoalsPage::new(api, notifier), memory)
}

async fn mounted(goals: Vec<Goal>) -> (GoalsPage<FakeApi>, MemorySink) {
    let (mut page, memory) = page_with(FakeApi::with_goals(goals));
    page.mount().await.unwrap();
    (page, memory)
}

fn last_level(memory: &MemorySink) -> NoticeLevel {
    memory.recent().last().unwrap().level
}

#[tokio::test]
async fn mount_fetches_once() {
    let (mut page, _) = mounted(vec![goal("a", &[])]).await;
    page.mount().await.unwrap();
    assert_eq!(page.api().calls_to("list"), 1);
    assert_eq!(page.state().goals().len(), 1);

    page.refresh().await.unwrap();
    assert_eq!(page.api().calls_to("list"), 2);
}

#[tokio::test]
async fn failed_load_notifies_and_stays_unloaded() {
    let api = FakeApi::default();
    api.fail_endpoint("list");
    let (mut page, memory) = page_with(api);

    assert!(page.mount().await.is_err());
    assert!(!page.state().is_loaded());
    assert_eq!(memory.recent()[0].message, "Failed to load goals");
}

#[tokio::test]
async fn complete_step_is_scoped_to_owning_goal() {
    // Both goals use step id "1".
    let (mut page, _) = mounted(vec![goal("a", &[("1", false)]), goal("b", &[("1", false)])]).await;

    page.complete_step("a", "1").await.unwrap();

    assert!(page.state().goal("a").unwrap().steps[0].completed);
    assert!(!page.state().goal("b").unwrap().steps[0].completed);
    assert_eq!(page.api().calls_to("step 1"), 1);
}

#[tokio::test]
async fn complete_step_twice_stays_completed() {
    let (mut page, _) = mounted(vec![goal("a", &[("1", false)])]).await;
    page.complete_step("a", "1").await.unwrap();
    page.complete_step("a", "1").await.unwrap();
    assert!(page.state().goal("a").unwrap().steps[0].completed);
}

#[tokio::test]
async fn complete_step_failure_leaves_state_unchanged() {
    let (mut page, memory) = mounted(vec![goal("a", &[("1", false)])]).await;
    page.api().fail_step("1");

    let result = page.complete_step("a", "1").await;

    assert!(matches!(result, Err(PageError::Api(_))));
    assert!(!page.state().goal("a").unwrap().steps[0].completed);
    assert_eq!(last_level(&memory), NoticeLevel::Error);
}

#[tokio::test]
async fn complete_unknown_step_makes_no_call() {
    let (mut page, _) = mounted(vec![goal("a", &[("1", false)])]).await;
    assert!(page.complete_step("a", "9").await.is_err());
    assert!(page.complete_step("zz", "1").await.is_err());
    assert_eq!(page.api().calls_to("step"), 0);
}

#[tokio::test]
async fn reset_clears_completion_and_skip() {
    let mut g = goal("a", &[("1", true), ("2", true), ("3", false)]);
    g.steps[2].skip = Some(SkipInfo {
        important: false,
        reason: "busy".to_string(),
    });
    let (mut page, memory) = mounted(vec![g]).await;
    page.state_mut().toggle_menu("a");

    let outcome = page.reset_goal("a").await.unwrap();

    assert!(outcome.all_succeeded());
    assert_eq!(outcome.total(), 3);
    let local = page.state().goal("a").unwrap();
    assert!(local.steps.iter().all(|s| !s.completed && s.skip.is_none()));
    assert!(page
        .api()
        .server_goal("a")
        .steps
        .iter()
        .all(|s| !s.completed && s.skip.is_none()));
    assert_eq!(page.state().menu_goal(), None);
    assert_eq!(page.state().active_listeners(), 0);
    assert_eq!(last_level(&memory), NoticeLevel::Success);
}

#[tokio::test]
async fn partial_reset_applies_only_successful_steps() {
    let (mut page, memory) = mounted(vec![goal("a", &[("1", true), ("2", true)])]).await;
    page.api().fail_step("2");

    let outcome = page.reset_goal("a").await.unwrap();

    assert_eq!(outcome.succeeded_ids().collect::<Vec<_>>(), ["1"]);
    assert_eq!(outcome.failed.len(), 1);
    let local = page.state().goal("a").unwrap();
    assert!(!local.steps[0].completed);
    assert!(local.steps[1].completed);
    let notice = memory.recent().pop().unwrap();
    assert_eq!(notice.level, NoticeLevel::Warning);
    assert_eq!(notice.message, "Reset 1 of 2 steps; 1 failed");
}

#[tokio::test]
async fn delete_removes_goal_locally_after_success() {
    let (mut page, _) = mounted(vec![goal("a", &[]), goal("b", &[])]).await;
    page.state_mut().toggle_menu("a");

    page.delete_goal("a").await.unwrap();

    assert!(page.state().goal("a").is_none());
    assert_eq!(page.state().goals().len(), 1);
    assert_eq!(page.state().menu_goal(), None);
}

#[tokio::test]
async fn failed_delete_keeps_goal() {
    let (mut page, memory) = mounted(vec![goal("a", &[])]).await;
    page.api().fail_endpoint("delete");

    assert!(page.delete_goal("a").await.is_err());
    assert!(page.state().goal("a").is_some());
    assert_eq!(memory.recent().pop().unwrap().message, "Failed to delete goal");
}

#[tokio::test]
async fn submit_with_empty_title_is_a_no_op() {
    let (mut page, _) = mounted(vec![]).await;
    page.open_new_form();
    page.state_mut().draft_mut().total_days = 10;

    let outcome = page.submit().await.unwrap();

    assert_eq!(outcome, SubmitOutcome::Skipped);
    assert_eq!(page.api().calls_to("create"), 0);
    assert!(page.state().modal_open());
}

#[tokio::test]
async fn submit_with_non_positive_days_is_rejected_in_both_modes() {
    let (mut page, _) = mounted(vec![goal("a", &[])]).await;

    page.open_new_form();
    page.state_mut().draft_mut().title = "Swim".to_string();
    assert!(matches!(
        page.submit().await,
        Err(PageError::InvalidDraft(_))
    ));

    page.edit_goal("a").await.unwrap();
    page.state_mut().draft_mut().total_days = 0;
    assert!(matches!(
        page.submit().await,
        Err(PageError::InvalidDraft(_))
    ));

    assert_eq!(page.api().calls_to("create"), 0);
    assert_eq!(page.api().calls_to("update"), 0);
}

#[tokio::test]
async fn create_flow_appends_goal_and_closes_form() {
    let (page, memory) = page_with(FakeApi::default());
    let mut page = page.with_user(Some("u7".to_string()));
    page.mount().await.unwrap();
    page.open_new_form();
    {
        let draft = page.state_mut().draft_mut();
        draft.title = "Meditate".to_string();
        draft.total_days = 14;
        draft.add_step();
        draft
            .update_step(0, StepField::Title("Step 1".to_string()))
            .unwrap();
    }

    let outcome = page.submit().await.unwrap();

    assert_eq!(outcome, SubmitOutcome::Created("new1".to_string()));
    let created = page.state().goal("new1").unwrap();
    assert_eq!(created.title, "Meditate");
    assert_eq!(created.user_id.as_deref(), Some("u7"));
    assert_eq!(created.steps.len(), 1);
    assert!(!page.state().modal_open());
    assert!(page.state().draft().title.is_empty());
    assert_eq!(memory.recent().pop().unwrap().message, "Goal created");
}

#[tokio::test]
async fn edit_flow_updates_goal_and_steps() {
    let (mut page, _) = mounted(vec![goal("a", &[("1", false), ("2", false)])]).await;
    page.state_mut().toggle_menu("a");

    page.edit_goal("a").await.unwrap();
    assert!(page.state().modal_open());
    assert_eq!(page.state().draft().title, "Goal a");
    {
        let draft = page.state_mut().draft_mut();
        draft.title = "Goal A, revised".to_string();
        draft
            .update_step(1, StepField::parse("due", "2025-01-15").unwrap())
            .unwrap();
    }

    let outcome = page.submit().await.unwrap();

    assert_eq!(
        outcome,
        SubmitOutcome::Updated {
            goal_id: "a".to_string(),
            failed_steps: 0
        }
    );
    assert_eq!(page.api().calls_to("step"), 2);
    let local = page.state().goal("a").unwrap();
    assert_eq!(local.title, "Goal A, revised");
    assert!(local.steps[1].due_date.is_some());
    assert!(!page.state().modal_open());
}

#[tokio::test]
async fn edit_with_failed_step_keeps_form_open() {
    let (mut page, memory) = mounted(vec![goal("a", &[("1", false), ("2", false)])]).await;
    page.edit_goal("a").await.unwrap();
    page.api().fail_step("2");
    page.state_mut().draft_mut().title = "Renamed".to_string();

    let outcome = page.submit().await.unwrap();

    assert_eq!(
        outcome,
        SubmitOutcome::Updated {
            goal_id: "a".to_string(),
            failed_steps: 1
        }
    );
    assert!(page.state().modal_open());
    assert_eq!(page.state().goal("a").unwrap().title, "Renamed");
    assert_eq!(last_level(&memory), NoticeLevel::Warning);
}

#[tokio::test]
async fn edit_keeps_step_ids_assigned_by_the_service() {
    let (mut page, memory) = mounted(vec![goal("a", &[("s1", false)])]).await;
    page.api().rekey_new_steps();
    page.edit_goal("a").await.unwrap();
    {
        let draft = page.state_mut().draft_mut();
        draft.add_step();
        draft
            .update_step(1, StepField::Title("Step 2".to_string()))
            .unwrap();
    }

    let outcome = page.submit().await.unwrap();

    assert_eq!(
        outcome,
        SubmitOutcome::Updated {
            goal_id: "a".to_string(),
            failed_steps: 0
        }
    );
    assert!(!page.state().modal_open());
    assert_eq!(page.api().calls_to("step 2"), 0);
    assert_eq!(page.api().calls_to("step s1"), 1);
    let ids: Vec<String> = page
        .state()
        .goal("a")
        .unwrap()
        .steps
        .iter()
        .map(|s| s.id.clone())
        .collect();
    assert_eq!(ids, ["s1", "srv-2"]);
    assert_eq!(memory.recent().pop().unwrap().message, "Goal updated");

    page.complete_step("a", "srv-2").await.unwrap();
    assert!(page.api().server_goal("a").steps[1].completed);
}

#[tokio::test]
async fn edit_drops_steps_removed_by_the_service_response() {
    let (mut page, _) = mounted(vec![goal("a", &[("s1", false), ("s2", false)])]).await;
    page.edit_goal("a").await.unwrap();
    page.state_mut().draft_mut().remove_step(1).unwrap();

    page.submit().await.unwrap();

    let local = page.state().goal("a").unwrap();
    assert_eq!(local.steps.len(), 1);
    assert_eq!(page.api().calls_to("step s2"), 0);
}

#[tokio::test]
async fn failed_goal_update_skips_step_updates() {
    let (mut page, _) = mounted(vec![goal("a", &[("1", false)])]).await;
    page.edit_goal("a").await.unwrap();
    page.api().fail_endpoint("update");
    page.state_mut().draft_mut().title = "Nope".to_string();

    assert!(page.submit().await.is_err());
    assert_eq!(page.api().calls_to("step"), 0);
    assert_eq!(page.state().goal("a").unwrap().title, "Goal a");
    assert!(page.state().modal_open());
}

#[tokio::test]
async fn generation_replaces_draft_steps() {
    let api = FakeApi::default();
    api.set_generated(vec![
        Step::new("1", "Day 1: warm up"),
        Step::new("2", "Day 2: 2km"),
    ]);
    let (mut page, _) = page_with(api);
    page.open_new_form();
    {
        let draft = page.state_mut().draft_mut();
        draft.title = "Run".to_string();
        draft.description = "Run 5km without stopping".to_string();
        draft.total_days = 2;
        draft.add_step();
    }

    let count = page.generate_steps().await.unwrap();

    assert_eq!(count, 2);
    assert_eq!(page.state().draft().steps()[1].title, "Day 2: 2km");
    assert!(!page.state().generating());
    assert_eq!(
        page.api().calls(),
        vec!["generate Run 5km without stopping 2".to_string()]
    );
}

#[tokio::test]
async fn overlapping_generation_is_refused() {
    let (mut page, memory) = page_with(FakeApi::default());
    page.open_new_form();
    {
        let draft = page.state_mut().draft_mut();
        draft.title = "Sleep earlier".to_string();
        draft.total_days = 5;
    }

    let ticket = page.start_generation().unwrap();
    assert!(page.state().generating());
    assert!(matches!(
        page.start_generation(),
        Err(PageError::GenerationInFlight)
    ));
    assert_eq!(last_level(&memory), NoticeLevel::Warning);

    page.finish_generation(ticket, Ok(vec![Step::new("1", "Lights out 23:00")]))
        .unwrap();
    assert!(!page.state().generating());
    assert!(page.start_generation().is_ok());
}

#[tokio::test]
async fn generation_result_for_a_closed_form_is_discarded() {
    let (mut page, _) = page_with(FakeApi::default());
    page.open_new_form();
    {
        let draft = page.state_mut().draft_mut();
        draft.title = "Stretch".to_string();
        draft.total_days = 4;
    }
    let ticket = page.start_generation().unwrap();

    page.cancel_form();
    page.open_new_form();
    page.state_mut().draft_mut().add_step();

    let result = page.finish_generation(ticket, Ok(vec![Step::new("1", "Day 1: hamstrings")]));

    assert!(matches!(result, Err(PageError::StaleGeneration)));
    assert!(!page.state().generating());
    assert_eq!(page.state().draft().steps().len(), 1);
    assert!(page.state().draft().steps()[0].title.is_empty());
}

#[tokio::test]
async fn failed_generation_clears_flag_and_keeps_steps() {
    let api = FakeApi::default();
    api.fail_endpoint("generate");
    let (mut page, memory) = page_with(api);
    page.open_new_form();
    {
        let draft = page.state_mut().draft_mut();
        draft.title = "Journal".to_string();
        draft.total_days = 3;
        draft.add_step();
    }

    assert!(page.generate_steps().await.is_err());
    assert!(!page.state().generating());
    assert_eq!(page.state().draft().steps().len(), 1);
    assert_eq!(memory.recent().pop().unwrap().message, "Failed to generate steps");
}

#[tokio::test]
async fn generation_needs_goal_text_and_days() {
    let (mut page, _) = page_with(FakeApi::default());
    page.open_new_form();
    page.state_mut().draft_mut().total_days = 3;
    assert!(matches!(
        page.start_generation(),
        Err(PageError::InvalidDraft(_))
    ));

    page.state_mut().draft_mut().title = "Walk".to_string();
    page.state_mut().draft_mut().total_days = 0;
    assert!(matches!(
        page.start_generation(),
        Err(PageError::InvalidDraft(_))
    ));
    assert!(!page.state().generating());
}
