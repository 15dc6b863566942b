//! Goal queue and execution loop.
//!
//! The [`Scheduler`] accepts goals in FIFO order and runs at most one at a
//! time on a background tokio task. Each goal is planned against the live
//! inventory, then executed step by step:
//!
//! 1. Before every step the target item's holdings are re-checked; a step
//!    whose requirement is already met is marked skipped.
//! 2. The first failing step aborts the rest of the plan and fails the
//!    goal. The scheduler then moves on to the next queued goal.
//! 3. [`Scheduler::stop`] drops queued goals and raises the running goal's
//!    [`CancelFlag`]; the goal ends at its next step boundary.
//!
//! Failures never escape as errors. Every goal ends in a [`GoalReport`]
//! delivered to the [`Notifier`] and kept in a bounded history. Each goal
//! runs on its own task, so a provider that panics fails that goal with
//! [`FailureKind::Aborted`] and the queue keeps draining.

use std::collections::VecDeque;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use craftwork_recipes::RecipeGraph;
use craftwork_types::{
    FailureKind, Goal, GoalAction, GoalId, GoalReport, GoalStatus, PlanId, SchedulerStatus, Step,
    StepStatus,
};
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinError;
use tracing::{debug, info, warn};

use crate::cancel::CancelFlag;
use crate::capability::{Crafter, Gatherer, InventoryView};
use crate::config::CraftworkConfig;
use crate::executor::StepExecutor;
use crate::notifier::Notifier;
use crate::planner::PlanResolver;

/// Queue state guarded by the scheduler mutex.
#[derive(Debug, Default)]
struct QueueState {
    queue: VecDeque<Goal>,
    current: Option<Goal>,
    running: bool,
    cancel: CancelFlag,
    history: VecDeque<GoalReport>,
}

struct Inner {
    resolver: PlanResolver,
    executor: StepExecutor,
    inventory: Arc<dyn InventoryView>,
    notifier: Arc<dyn Notifier>,
    history_limit: usize,
    state: Mutex<QueueState>,
    idle: Notify,
}

/// FIFO goal scheduler with single-flight execution.
///
/// Cheap to clone; clones share the same queue.
#[derive(Clone)]
pub struct Scheduler {
    inner: Arc<Inner>,
}

impl core::fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Scheduler")
            .field("resolver", &self.inner.resolver)
            .field("executor", &self.inner.executor)
            .field("history_limit", &self.inner.history_limit)
            .finish_non_exhaustive()
    }
}

/// How a goal ended, before it is turned into a report.
struct Outcome {
    plan_id: Option<PlanId>,
    steps: Vec<Step>,
    failure: Option<(FailureKind, String)>,
}

impl Outcome {
    const fn failed(plan_id: Option<PlanId>, kind: FailureKind, diagnostic: String) -> Self {
        Self {
            plan_id,
            steps: Vec::new(),
            failure: Some((kind, diagnostic)),
        }
    }
}

impl Scheduler {
    /// Create a scheduler from its parts.
    pub fn new(
        resolver: PlanResolver,
        executor: StepExecutor,
        inventory: Arc<dyn InventoryView>,
        notifier: Arc<dyn Notifier>,
        history_limit: usize,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                resolver,
                executor,
                inventory,
                notifier,
                history_limit,
                state: Mutex::new(QueueState::default()),
                idle: Notify::new(),
            }),
        }
    }

    /// Create a scheduler over a single world provider implementing every
    /// capability.
    pub fn for_world<W>(
        graph: Arc<RecipeGraph>,
        world: Arc<W>,
        notifier: Arc<dyn Notifier>,
        config: &CraftworkConfig,
    ) -> Self
    where
        W: Gatherer + Crafter + InventoryView + 'static,
    {
        let resolver = PlanResolver::new(graph, &config.planner);
        let gatherer: Arc<dyn Gatherer> = world.clone();
        let crafter: Arc<dyn Crafter> = world.clone();
        let executor = StepExecutor::new(gatherer, crafter);
        Self::new(
            resolver,
            executor,
            world,
            notifier,
            config.scheduler.history_limit,
        )
    }

    /// Append a goal to the queue and start processing if idle.
    ///
    /// Returns the goal's id for later lookup in [`Self::history`].
    pub async fn enqueue(&self, mut goal: Goal) -> GoalId {
        goal.status = GoalStatus::Queued;
        let id = goal.id;
        let (start, queue_length) = {
            let mut state = self.inner.state.lock().await;
            info!(
                goal_id = %goal.id,
                requester = %goal.requester,
                goal = %goal,
                "Goal queued"
            );
            state.queue.push_back(goal);
            let start = !state.running;
            state.running = true;
            (start, state.queue.len())
        };

        debug!(queue_length, start, "Queue updated");
        if start {
            let inner = Arc::clone(&self.inner);
            tokio::spawn(async move {
                inner.process_queue().await;
            });
        }
        id
    }

    /// Drop every queued goal and cancel the running one.
    ///
    /// The running goal stops at its next step boundary and is reported as
    /// failed with [`FailureKind::Cancelled`]. Goals enqueued afterwards
    /// run normally. Returns the number of queued goals dropped.
    pub async fn stop(&self) -> usize {
        let mut state = self.inner.state.lock().await;
        let dropped = state.queue.len();
        state.queue.clear();
        state.cancel.cancel();
        state.cancel = CancelFlag::new();
        info!(
            dropped,
            cancelled = state.current.is_some(),
            "Scheduler stopped"
        );
        dropped
    }

    /// Drop every queued goal, leaving the running one alone.
    ///
    /// Returns the number of goals dropped.
    pub async fn clear(&self) -> usize {
        let mut state = self.inner.state.lock().await;
        let dropped = state.queue.len();
        state.queue.clear();
        info!(dropped, "Queue cleared");
        dropped
    }

    /// Current goal, queue length and activity.
    pub async fn status(&self) -> SchedulerStatus {
        let state = self.inner.state.lock().await;
        SchedulerStatus {
            current_goal: state.current.clone(),
            queue_length: u32::try_from(state.queue.len()).unwrap_or(u32::MAX),
            is_running: state.running,
            steps_completed: self.inner.executor.steps_completed(),
        }
    }

    /// Reports of recently finished goals, oldest first.
    pub async fn history(&self) -> Vec<GoalReport> {
        self.inner.state.lock().await.history.iter().cloned().collect()
    }

    /// The report for `id`, if it finished recently.
    pub async fn report(&self, id: GoalId) -> Option<GoalReport> {
        self.inner
            .state
            .lock()
            .await
            .history
            .iter()
            .find(|report| report.goal.id == id)
            .cloned()
    }

    /// Wait until the queue is drained and nothing is running.
    pub async fn wait_idle(&self) {
        loop {
            let notified = self.inner.idle.notified();
            if !self.inner.state.lock().await.running {
                return;
            }
            notified.await;
        }
    }
}

impl Inner {
    /// Run queued goals until the queue is empty.
    async fn process_queue(self: Arc<Self>) {
        loop {
            let mut state = self.state.lock().await;
            let Some(mut goal) = state.queue.pop_front() else {
                state.running = false;
                state.current = None;
                drop(state);
                debug!("Queue drained");
                self.idle.notify_waiters();
                return;
            };
            goal.status = GoalStatus::Running;
            state.current = Some(goal.clone());
            let cancel = state.cancel.clone();
            drop(state);

            let started_at = Utc::now();
            let worker = Arc::clone(&self);
            let running = goal.clone();
            let task = tokio::spawn(async move { worker.execute_goal(running, &cancel).await });
            let report = match task.await {
                Ok(report) => report,
                Err(err) => aborted_report(goal, started_at, err),
            };
            let notifier = &self.notifier;
            let delivered = std::panic::catch_unwind(AssertUnwindSafe(|| notifier.finished(&report)));
            if delivered.is_err() {
                warn!(goal_id = %report.goal.id, "Notifier panicked while reporting a goal");
            }

            let mut state = self.state.lock().await;
            state.current = None;
            state.history.push_back(report);
            while state.history.len() > self.history_limit {
                state.history.pop_front();
            }
        }
    }

    /// Plan and execute one goal, returning its terminal report.
    async fn execute_goal(&self, mut goal: Goal, cancel: &CancelFlag) -> GoalReport {
        let started_at = Utc::now();
        info!(
            goal_id = %goal.id,
            requester = %goal.requester,
            goal = %goal,
            "Goal started"
        );
        self.notifier.progress(&goal, &format!("working on {goal}"));

        let outcome = self.run_goal(&goal, cancel).await;

        let (status, failure, diagnostic) = match outcome.failure {
            None => (GoalStatus::Completed, None, None),
            Some((kind, diagnostic)) => (GoalStatus::Failed, Some(kind), Some(diagnostic)),
        };
        goal.status = status;

        let report = GoalReport {
            goal,
            plan_id: outcome.plan_id,
            steps: outcome.steps,
            failure,
            diagnostic,
            started_at,
            finished_at: Utc::now(),
        };
        info!(
            goal_id = %report.goal.id,
            status = ?report.goal.status,
            done = report.count_steps(StepStatus::Done),
            skipped = report.count_steps(StepStatus::Skipped),
            "Goal finished"
        );
        report
    }

    async fn run_goal(&self, goal: &Goal, cancel: &CancelFlag) -> Outcome {
        if cancel.is_cancelled() {
            return Outcome::failed(None, FailureKind::Cancelled, String::from("stopped"));
        }

        let graph = self.resolver.graph();
        if !graph.is_known(&goal.target) {
            return Outcome::failed(
                None,
                FailureKind::UnknownRecipe,
                format!("don't know how to get {}", goal.target),
            );
        }

        let inventory = self.inventory.as_ref();
        let plan = match goal.action {
            GoalAction::Make => self.resolver.resolve(&goal.target, goal.count, inventory),
            GoalAction::Mine => self.resolver.resolve_mine(&goal.target, goal.count, inventory),
        };

        if let Some(exceeded) = &plan.depth_exceeded {
            return Outcome::failed(
                Some(plan.id),
                FailureKind::DepthExceeded,
                format!(
                    "recipe for {} nests too deep (stopped at {} depth {})",
                    goal.target, exceeded.item, exceeded.depth
                ),
            );
        }

        if plan.is_empty() {
            let have = self.resolver.have(inventory, &goal.target);
            if have >= goal.count {
                self.notifier
                    .progress(goal, &format!("already have {have} {}", goal.target));
                return Outcome {
                    plan_id: Some(plan.id),
                    steps: Vec::new(),
                    failure: None,
                };
            }
            return Outcome::failed(
                Some(plan.id),
                FailureKind::UnknownRecipe,
                format!("no way to get {} {}", goal.count, goal.target),
            );
        }

        let total = plan.len();
        let plan_id = plan.id;
        let mut steps = plan.steps;
        let mut failure = None;

        for (index, step) in steps.iter_mut().enumerate() {
            if cancel.is_cancelled() {
                failure = Some((FailureKind::Cancelled, format!("stopped before {step}")));
                break;
            }

            let have = self.resolver.have(inventory, &step.item);
            if have >= step.required {
                debug!(step = %step, have, "Step already satisfied");
                step.status = StepStatus::Skipped;
                continue;
            }

            match self.executor.run(step, cancel).await {
                Ok(()) => {
                    step.status = StepStatus::Done;
                    self.notifier.progress(
                        goal,
                        &format!("[{}/{total}] {step}", index.saturating_add(1)),
                    );
                }
                Err(err) => {
                    step.status = StepStatus::Failed;
                    warn!(goal_id = %goal.id, step = %step, error = %err, "Step failed");
                    failure = Some((err.kind(), err.to_string()));
                    break;
                }
            }
        }

        Outcome {
            plan_id: Some(plan_id),
            steps,
            failure,
        }
    }
}

/// Terminal report for a goal whose task died before producing one.
fn aborted_report(mut goal: Goal, started_at: DateTime<Utc>, err: JoinError) -> GoalReport {
    let diagnostic = if err.is_panic() {
        let payload = err.into_panic();
        let message = payload
            .downcast_ref::<&str>()
            .map(|message| (*message).to_owned())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| String::from("no message"));
        format!("aborted: provider panicked: {message}")
    } else {
        String::from("aborted: goal task was cancelled")
    };
    warn!(goal_id = %goal.id, goal = %goal, diagnostic = %diagnostic, "Goal aborted");
    goal.status = GoalStatus::Failed;

    GoalReport {
        goal,
        plan_id: None,
        steps: Vec::new(),
        failure: Some(FailureKind::Aborted),
        diagnostic: Some(diagnostic),
        started_at,
        finished_at: Utc::now(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Mutex as StdMutex;

    use super::*;
    use crate::notifier::NoOpNotifier;
    use crate::sim::SimWorld;

    /// Records every finished report.
    #[derive(Default)]
    struct Recorder {
        finished: StdMutex<Vec<GoalReport>>,
        progress: StdMutex<Vec<String>>,
    }

    impl Notifier for Recorder {
        fn progress(&self, _goal: &Goal, message: &str) {
            self.progress.lock().unwrap().push(message.to_owned());
        }

        fn finished(&self, report: &GoalReport) {
            self.finished.lock().unwrap().push(report.clone());
        }
    }

    fn graph() -> Arc<RecipeGraph> {
        Arc::new(RecipeGraph::standard().unwrap())
    }

    fn scheduler(world: &Arc<SimWorld>, notifier: Arc<dyn Notifier>) -> Scheduler {
        Scheduler::for_world(
            graph(),
            Arc::clone(world),
            notifier,
            &CraftworkConfig::default(),
        )
    }

    #[tokio::test]
    async fn goals_run_in_fifo_order() {
        let world = Arc::new(SimWorld::new(graph()));
        let recorder = Arc::new(Recorder::default());
        let scheduler = scheduler(&world, recorder.clone());

        let first = scheduler.enqueue(Goal::mine("diamond", 1, "alex")).await;
        let second = scheduler.enqueue(Goal::mine("coal", 2, "sam")).await;
        scheduler.wait_idle().await;

        let finished = recorder.finished.lock().unwrap();
        let order: Vec<GoalId> = finished.iter().map(|r| r.goal.id).collect();
        assert_eq!(order, vec![first, second]);
        assert!(finished.iter().all(GoalReport::is_success));
        assert_eq!(world.actions(), vec!["gather diamond x1", "gather coal x2"]);
    }

    #[tokio::test]
    async fn unknown_target_fails_without_side_effects() {
        let world = Arc::new(SimWorld::new(graph()));
        let scheduler = scheduler(&world, Arc::new(NoOpNotifier));

        let id = scheduler.enqueue(Goal::make("unobtainium", 1, "alex")).await;
        scheduler.wait_idle().await;

        let report = scheduler.report(id).await.unwrap();
        assert_eq!(report.goal.status, GoalStatus::Failed);
        assert_eq!(report.failure, Some(FailureKind::UnknownRecipe));
        assert!(report.plan_id.is_none());
        assert!(world.actions().is_empty());
    }

    #[tokio::test]
    async fn station_failure_aborts_goal_and_queue_continues() {
        let world = Arc::new(
            SimWorld::new(graph())
                .with_station_placed()
                .with_station_unusable(),
        );
        let scheduler = scheduler(&world, Arc::new(NoOpNotifier));

        let furnace = scheduler.enqueue(Goal::make("furnace", 1, "alex")).await;
        let logs = scheduler.enqueue(Goal::mine("oak_log", 1, "alex")).await;
        scheduler.wait_idle().await;

        let report = scheduler.report(furnace).await.unwrap();
        assert_eq!(report.failure, Some(FailureKind::MissingStation));
        assert_eq!(report.steps.len(), 2);
        assert_eq!(report.steps[0].status, StepStatus::Done);
        assert_eq!(report.steps[1].status, StepStatus::Failed);

        let report = scheduler.report(logs).await.unwrap();
        assert!(report.is_success());
        assert_eq!(world.count_of("oak_log"), 1);
    }

    #[tokio::test]
    async fn failing_step_leaves_rest_pending() {
        let world = Arc::new(SimWorld::new(graph()).with_barren("oak_log"));
        let scheduler = scheduler(&world, Arc::new(NoOpNotifier));

        let id = scheduler.enqueue(Goal::make("stick", 4, "alex")).await;
        scheduler.wait_idle().await;

        let report = scheduler.report(id).await.unwrap();
        assert_eq!(report.failure, Some(FailureKind::GatherFailed));
        assert_eq!(report.steps[0].status, StepStatus::Failed);
        assert_eq!(report.count_steps(StepStatus::Pending), 2);
    }

    #[tokio::test]
    async fn held_items_are_skipped() {
        let world = Arc::new(SimWorld::new(graph()).with_item("diamond", 5));
        let scheduler = scheduler(&world, Arc::new(NoOpNotifier));

        let id = scheduler.enqueue(Goal::make("diamond", 3, "alex")).await;
        scheduler.wait_idle().await;

        let report = scheduler.report(id).await.unwrap();
        assert!(report.is_success());
        assert!(report.steps.is_empty());
        assert!(world.actions().is_empty());
    }

    #[tokio::test]
    async fn stop_cancels_running_goal_and_drops_queue() {
        let world = Arc::new(SimWorld::new(graph()).with_station_placed());
        let scheduler = scheduler(&world, Arc::new(NoOpNotifier));

        let running = scheduler.enqueue(Goal::make("wooden_pickaxe", 1, "alex")).await;
        // Let the first goal reach its first gather.
        tokio::task::yield_now().await;
        scheduler.enqueue(Goal::mine("diamond", 1, "alex")).await;
        let dropped = scheduler.stop().await;
        scheduler.wait_idle().await;

        assert_eq!(dropped, 1);
        let history = scheduler.history().await;
        assert_eq!(history.len(), 1);
        let report = scheduler.report(running).await.unwrap();
        assert_eq!(report.failure, Some(FailureKind::Cancelled));
        assert_eq!(world.count_of("diamond"), 0);

        // A goal enqueued after stop gets a fresh flag.
        let after = scheduler.enqueue(Goal::mine("diamond", 1, "alex")).await;
        scheduler.wait_idle().await;
        assert!(scheduler.report(after).await.unwrap().is_success());
    }

    #[tokio::test]
    async fn clear_keeps_running_goal() {
        let world = Arc::new(SimWorld::new(graph()));
        let scheduler = scheduler(&world, Arc::new(NoOpNotifier));

        let running = scheduler.enqueue(Goal::make("stick", 4, "alex")).await;
        tokio::task::yield_now().await;
        scheduler.enqueue(Goal::mine("diamond", 1, "alex")).await;
        scheduler.enqueue(Goal::mine("coal", 1, "alex")).await;
        let dropped = scheduler.clear().await;
        scheduler.wait_idle().await;

        assert_eq!(dropped, 2);
        assert!(scheduler.report(running).await.unwrap().is_success());
        assert_eq!(world.count_of("stick"), 4);
        assert_eq!(scheduler.history().await.len(), 1);
    }

    #[tokio::test]
    async fn status_reports_idle_after_drain() {
        let world = Arc::new(SimWorld::new(graph()));
        let scheduler = scheduler(&world, Arc::new(NoOpNotifier));

        let status = scheduler.status().await;
        assert!(!status.is_running);
        assert_eq!(status.queue_length, 0);
        assert!(status.current_goal.is_none());

        scheduler.enqueue(Goal::make("stick", 4, "alex")).await;
        scheduler.wait_idle().await;

        let status = scheduler.status().await;
        assert!(!status.is_running);
        assert!(status.current_goal.is_none());
        assert_eq!(status.steps_completed, 3);
    }

    #[tokio::test]
    async fn progress_lines_count_steps() {
        let world = Arc::new(SimWorld::new(graph()));
        let recorder = Arc::new(Recorder::default());
        let scheduler = scheduler(&world, recorder.clone());

        scheduler.enqueue(Goal::make("stick", 4, "alex")).await;
        scheduler.wait_idle().await;

        let progress = recorder.progress.lock().unwrap();
        assert_eq!(
            progress.as_slice(),
            [
                "working on make stick x4",
                "[1/3] gather oak_log x1",
                "[2/3] craft planks x2",
                "[3/3] craft stick x4",
            ]
        );
    }

    /// Panics when asked for `diamond`; gathers everything else normally.
    struct PanickingGatherer {
        world: Arc<SimWorld>,
    }

    #[async_trait::async_trait]
    impl Gatherer for PanickingGatherer {
        async fn gather(&self, item: &str, count: u32, cancel: &CancelFlag) -> bool {
            assert_ne!(item, "diamond", "diamond ore is unreachable");
            self.world.gather(item, count, cancel).await
        }
    }

    #[tokio::test]
    async fn provider_panic_fails_goal_and_queue_continues() {
        let world = Arc::new(SimWorld::new(graph()));
        let gatherer = Arc::new(PanickingGatherer {
            world: Arc::clone(&world),
        });
        let resolver = PlanResolver::new(graph(), &CraftworkConfig::default().planner);
        let executor = StepExecutor::new(gatherer, world.clone());
        let recorder = Arc::new(Recorder::default());
        let scheduler = Scheduler::new(resolver, executor, world.clone(), recorder.clone(), 8);

        let broken = scheduler.enqueue(Goal::mine("diamond", 1, "alex")).await;
        let queued = scheduler.enqueue(Goal::mine("coal", 2, "alex")).await;
        scheduler.wait_idle().await;

        let report = scheduler.report(broken).await.unwrap();
        assert_eq!(report.goal.status, GoalStatus::Failed);
        assert_eq!(report.failure, Some(FailureKind::Aborted));
        assert!(report
            .diagnostic
            .as_deref()
            .unwrap()
            .contains("diamond ore is unreachable"));
        assert!(scheduler.report(queued).await.unwrap().is_success());
        assert_eq!(recorder.finished.lock().unwrap().len(), 2);

        let status = scheduler.status().await;
        assert!(!status.is_running);
        assert_eq!(status.queue_length, 0);

        let later = scheduler.enqueue(Goal::mine("coal", 1, "alex")).await;
        scheduler.wait_idle().await;
        assert!(scheduler.report(later).await.unwrap().is_success());
        assert_eq!(world.count_of("coal"), 3);
    }

    #[tokio::test]
    async fn history_is_bounded() {
        let world = Arc::new(SimWorld::new(graph()));
        let mut config = CraftworkConfig::default();
        config.scheduler.history_limit = 2;
        let scheduler = Scheduler::for_world(graph(), world, Arc::new(NoOpNotifier), &config);

        for _ in 0..4 {
            scheduler.enqueue(Goal::mine("diamond", 1, "alex")).await;
        }
        scheduler.wait_idle().await;
        assert_eq!(scheduler.history().await.len(), 2);
    }
}
