//! End-to-end tests: goals planned and executed against [`SimWorld`].
//!
//! Every test drives the public [`Scheduler`] API only, the way the command
//! layer would, and inspects the simulated world afterwards.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;

use craftwork_core::{
    CraftworkConfig, InventoryView, NoOpNotifier, PlanResolver, Scheduler, SimWorld,
};
use craftwork_recipes::RecipeGraph;
use craftwork_types::{FailureKind, Goal, GoalStatus, StepStatus};

fn graph() -> Arc<RecipeGraph> {
    Arc::new(RecipeGraph::standard().unwrap())
}

fn scheduler_for(graph: Arc<RecipeGraph>, world: &Arc<SimWorld>) -> Scheduler {
    Scheduler::for_world(
        graph,
        Arc::clone(world),
        Arc::new(NoOpNotifier),
        &CraftworkConfig::default(),
    )
}

#[tokio::test]
async fn executed_plans_leave_target_held() {
    let targets = [
        ("crafting_table", 1),
        ("stick", 4),
        ("planks", 9),
        ("wooden_pickaxe", 1),
        ("stone_pickaxe", 1),
        ("iron_sword", 2),
        ("diamond_pickaxe", 1),
        ("furnace", 1),
        ("chest", 2),
        ("torch", 8),
        ("bow", 1),
        ("arrow", 4),
        ("gold_ingot", 12),
    ];

    for (target, count) in targets {
        let graph = graph();
        let world = Arc::new(SimWorld::new(Arc::clone(&graph)));
        let scheduler = scheduler_for(Arc::clone(&graph), &world);

        let id = scheduler.enqueue(Goal::make(target, count, "tester")).await;
        scheduler.wait_idle().await;

        let report = scheduler.report(id).await.unwrap();
        assert!(
            report.is_success(),
            "{target} x{count} failed: {:?}",
            report.diagnostic
        );
        assert!(world.total_of(target) >= count, "{target} x{count} not held");
    }
}

#[tokio::test]
async fn executed_plans_use_partial_holdings() {
    let cases: [(&str, u32, &[(&str, u32)]); 8] = [
        ("wooden_pickaxe", 1, &[("oak_planks", 3)]),
        ("wooden_pickaxe", 1, &[("oak_planks", 3), ("stick", 1)]),
        ("diamond_pickaxe", 1, &[("oak_planks", 4)]),
        ("diamond_pickaxe", 1, &[("oak_planks", 4), ("diamond", 1)]),
        ("chest", 1, &[("birch_planks", 6)]),
        ("crafting_table", 1, &[("spruce_planks", 2)]),
        ("stick", 4, &[("oak_planks", 1)]),
        ("torch", 4, &[("stick", 1)]),
    ];

    for (target, count, holdings) in cases {
        let graph = graph();
        let world = holdings
            .iter()
            .fold(SimWorld::new(Arc::clone(&graph)), |world, (item, held)| {
                world.with_item(*item, *held)
            });
        let world = Arc::new(world);
        let scheduler = scheduler_for(Arc::clone(&graph), &world);

        let id = scheduler.enqueue(Goal::make(target, count, "tester")).await;
        scheduler.wait_idle().await;

        let report = scheduler.report(id).await.unwrap();
        assert!(
            report.is_success(),
            "{target} x{count} from {holdings:?} failed: {:?}",
            report.diagnostic
        );
        assert!(world.total_of(target) >= count, "{target} x{count} not held");
    }
}

#[tokio::test]
async fn odd_plank_stock_cannot_make_sticks() {
    // Sticks ask for ceil(n / 2) planks, but one craft takes two. A single
    // held plank covers the request, so nothing is planned to top it up.
    let world = Arc::new(SimWorld::new(graph()).with_item("oak_planks", 1));
    let scheduler = scheduler_for(graph(), &world);

    let id = scheduler.enqueue(Goal::make("stick", 1, "alex")).await;
    scheduler.wait_idle().await;

    let report = scheduler.report(id).await.unwrap();
    assert_eq!(report.failure, Some(FailureKind::CraftFailed));
    assert_eq!(report.steps.len(), 1);
    assert_eq!(report.steps[0].status, StepStatus::Failed);
    assert_eq!(world.count_of("oak_planks"), 1);
}

#[tokio::test]
async fn diamond_pickaxe_from_scratch() {
    let world = Arc::new(SimWorld::new(graph()));
    let scheduler = scheduler_for(graph(), &world);

    let id = scheduler.enqueue(Goal::make("diamond_pickaxe", 1, "alex")).await;
    scheduler.wait_idle().await;

    let report = scheduler.report(id).await.unwrap();
    assert_eq!(report.goal.status, GoalStatus::Completed);
    assert_eq!(report.count_steps(StepStatus::Done), 8);
    assert_eq!(
        world.actions(),
        vec![
            "gather oak_log x1",
            "craft planks x4",
            "craft crafting_table x1",
            "gather oak_log x1",
            "craft planks x1",
            "craft stick x2",
            "gather diamond x2",
            "place crafting_table",
            "craft diamond_pickaxe x1",
        ]
    );
    assert_eq!(world.count_of("diamond_pickaxe"), 1);
    assert!(world.station_placed());
}

#[tokio::test]
async fn unreachable_station_fails_goal_but_not_queue() {
    let world = Arc::new(
        SimWorld::new(graph())
            .with_station_placed()
            .with_station_unusable(),
    );
    let scheduler = scheduler_for(graph(), &world);

    let furnace = scheduler.enqueue(Goal::make("furnace", 1, "alex")).await;
    let logs = scheduler.enqueue(Goal::mine("oak_log", 1, "alex")).await;
    scheduler.wait_idle().await;

    let report = scheduler.report(furnace).await.unwrap();
    assert_eq!(report.failure, Some(FailureKind::MissingStation));
    let statuses: Vec<StepStatus> = report.steps.iter().map(|s| s.status).collect();
    assert_eq!(statuses, vec![StepStatus::Done, StepStatus::Failed]);
    assert_eq!(world.count_of("cobblestone"), 8);
    assert_eq!(world.count_of("furnace"), 0);

    assert!(scheduler.report(logs).await.unwrap().is_success());
    assert_eq!(world.count_of("oak_log"), 1);
}

#[tokio::test]
async fn cyclic_table_reports_depth_exceeded() {
    let yaml = r"
recipes:
  ouroboros:
    ingredients: { serpent: 1 }
  serpent:
    ingredients: { ouroboros: 1 }
";
    let graph = Arc::new(RecipeGraph::from_yaml(yaml).unwrap());
    let world = Arc::new(SimWorld::new(Arc::clone(&graph)));
    let scheduler = scheduler_for(graph, &world);

    let id = scheduler.enqueue(Goal::make("ouroboros", 1, "alex")).await;
    scheduler.wait_idle().await;

    let report = scheduler.report(id).await.unwrap();
    assert_eq!(report.failure, Some(FailureKind::DepthExceeded));
    assert!(report.plan_id.is_some());
    assert!(report.steps.is_empty());
    assert!(world.actions().is_empty());
}

#[tokio::test]
async fn failures_never_stall_the_queue() {
    let world = Arc::new(SimWorld::new(graph()).with_gather_failures(42, 1.0));
    let scheduler = scheduler_for(graph(), &world);

    let mut ids = Vec::new();
    for target in ["stick", "diamond", "torch"] {
        ids.push(scheduler.enqueue(Goal::make(target, 1, "alex")).await);
    }
    scheduler.wait_idle().await;

    for id in ids {
        let report = scheduler.report(id).await.unwrap();
        assert_eq!(report.failure, Some(FailureKind::GatherFailed));
    }
    let status = scheduler.status().await;
    assert!(!status.is_running);
    assert_eq!(status.queue_length, 0);
    assert_eq!(status.steps_completed, 0);
}

#[tokio::test]
async fn mining_a_category_gathers_any_member() {
    let world = Arc::new(SimWorld::new(graph()).with_barren("oak_log"));
    let scheduler = scheduler_for(graph(), &world);

    let id = scheduler.enqueue(Goal::mine("log", 3, "alex")).await;
    scheduler.wait_idle().await;

    assert!(scheduler.report(id).await.unwrap().is_success());
    assert_eq!(world.count_of("spruce_log"), 3);
    assert_eq!(world.total_of("log"), 3);
}

#[tokio::test]
async fn surplus_from_earlier_goal_is_reused() {
    let world = Arc::new(SimWorld::new(graph()));
    let scheduler = scheduler_for(graph(), &world);

    // Four planks leave two spare after the sticks; the table then only
    // needs two more, which the resolver plans from live holdings.
    let sticks = scheduler.enqueue(Goal::make("stick", 4, "alex")).await;
    scheduler.wait_idle().await;
    assert!(scheduler.report(sticks).await.unwrap().is_success());
    assert_eq!(world.total_of("planks"), 2);

    let table = scheduler.enqueue(Goal::make("crafting_table", 1, "alex")).await;
    scheduler.wait_idle().await;
    let report = scheduler.report(table).await.unwrap();
    assert!(report.is_success());
    assert_eq!(report.steps.len(), 3);
    assert_eq!(world.count_of("crafting_table"), 1);
}

#[test]
fn resolver_sees_live_holdings() {
    let graph = graph();
    let world = SimWorld::new(Arc::clone(&graph)).with_item("birch_planks", 4);
    let resolver = PlanResolver::new(graph, &CraftworkConfig::default().planner);

    assert_eq!(resolver.have(&world, "planks"), 4);
    assert_eq!(resolver.resolve("crafting_table", 1, &world).len(), 1);
}
