//! Step execution.
//!
//! [`StepExecutor`] performs one plan step through the injected capability
//! providers and translates their boolean outcomes into [`StepFailure`]s.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use craftwork_types::{Step, StepKind};
use tracing::{debug, info};

use crate::cancel::CancelFlag;
use crate::capability::{Crafter, Gatherer};
use crate::error::StepFailure;

/// Runs single steps against the world.
pub struct StepExecutor {
    gatherer: Arc<dyn Gatherer>,
    crafter: Arc<dyn Crafter>,
    steps_completed: AtomicU64,
}

impl core::fmt::Debug for StepExecutor {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("StepExecutor")
            .field("steps_completed", &self.steps_completed())
            .finish_non_exhaustive()
    }
}

impl StepExecutor {
    /// Create an executor over the given providers.
    pub fn new(gatherer: Arc<dyn Gatherer>, crafter: Arc<dyn Crafter>) -> Self {
        Self {
            gatherer,
            crafter,
            steps_completed: AtomicU64::new(0),
        }
    }

    /// Steps executed successfully since creation.
    pub fn steps_completed(&self) -> u64 {
        self.steps_completed.load(Ordering::Relaxed)
    }

    /// Execute `step`.
    ///
    /// Gather steps try each of the step's targets in order until one
    /// succeeds. Craft steps first ensure a station when the recipe needs
    /// one.
    pub async fn run(&self, step: &Step, cancel: &CancelFlag) -> Result<(), StepFailure> {
        if cancel.is_cancelled() {
            return Err(StepFailure::Cancelled);
        }

        let outcome = match step.kind {
            StepKind::Gather => self.gather(step, cancel).await,
            StepKind::Craft => self.craft(step, cancel).await,
        };

        if outcome.is_ok() {
            self.steps_completed.fetch_add(1, Ordering::Relaxed);
            info!(kind = %step.kind, item = %step.item, count = step.count, "Step done");
        }
        outcome
    }

    async fn gather(&self, step: &Step, cancel: &CancelFlag) -> Result<(), StepFailure> {
        for target in step.gather_targets() {
            if cancel.is_cancelled() {
                return Err(StepFailure::Cancelled);
            }
            if self.gatherer.gather(target, step.count, cancel).await {
                return Ok(());
            }
            debug!(item = %step.item, source = target, "Gather source unavailable");
        }

        if cancel.is_cancelled() {
            return Err(StepFailure::Cancelled);
        }
        Err(StepFailure::GatherFailed {
            item: step.item.clone(),
            count: step.count,
        })
    }

    async fn craft(&self, step: &Step, cancel: &CancelFlag) -> Result<(), StepFailure> {
        let Some(recipe) = &step.recipe else {
            return Err(StepFailure::CraftFailed {
                item: step.item.clone(),
                count: step.count,
                reason: String::from("no recipe attached to step"),
            });
        };

        let station = if recipe.needs_station {
            let Some(station) = self.crafter.ensure_station(cancel).await else {
                if cancel.is_cancelled() {
                    return Err(StepFailure::Cancelled);
                }
                return Err(StepFailure::MissingStation {
                    item: step.item.clone(),
                });
            };
            debug!(item = %step.item, block = %station.block, "Station ready");
            Some(station)
        } else {
            None
        };

        if cancel.is_cancelled() {
            return Err(StepFailure::Cancelled);
        }
        if self
            .crafter
            .craft(&step.item, recipe, step.count, station.as_ref(), cancel)
            .await
        {
            return Ok(());
        }

        if cancel.is_cancelled() {
            return Err(StepFailure::Cancelled);
        }
        Err(StepFailure::CraftFailed {
            item: step.item.clone(),
            count: step.count,
            reason: String::from("crafter reported failure"),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use craftwork_recipes::RecipeGraph;

    use super::*;
    use crate::capability::InventoryView;
    use crate::sim::SimWorld;

    fn setup(world: SimWorld) -> (Arc<SimWorld>, StepExecutor) {
        let world = Arc::new(world);
        let executor = StepExecutor::new(world.clone(), world.clone());
        (world, executor)
    }

    fn graph() -> Arc<RecipeGraph> {
        Arc::new(RecipeGraph::standard().unwrap())
    }

    #[tokio::test]
    async fn gather_step_collects_item() {
        let (world, executor) = setup(SimWorld::new(graph()));
        let result = executor.run(&Step::gather("diamond", 2), &CancelFlag::new()).await;

        assert!(result.is_ok());
        assert_eq!(world.count_of("diamond"), 2);
        assert_eq!(executor.steps_completed(), 1);
    }

    #[tokio::test]
    async fn gather_tries_sources_in_order() {
        let (world, executor) = setup(SimWorld::new(graph()).with_barren("oak_log"));
        let step = Step::gather_from(
            "log",
            1,
            vec![String::from("oak_log"), String::from("birch_log")],
        );
        assert!(executor.run(&step, &CancelFlag::new()).await.is_ok());
        assert_eq!(world.count_of("birch_log"), 1);
        assert_eq!(
            world.actions(),
            vec!["gather oak_log x1 failed", "gather birch_log x1"]
        );
    }

    #[tokio::test]
    async fn exhausted_sources_fail_gather() {
        let (_world, executor) = setup(SimWorld::new(graph()).with_barren("diamond"));
        let result = executor.run(&Step::gather("diamond", 1), &CancelFlag::new()).await;

        assert_eq!(
            result,
            Err(StepFailure::GatherFailed {
                item: String::from("diamond"),
                count: 1,
            })
        );
        assert_eq!(executor.steps_completed(), 0);
    }

    #[tokio::test]
    async fn station_craft_places_held_table() {
        let graph = graph();
        let recipe = graph.get_recipe("furnace").cloned().unwrap();
        let (world, executor) = setup(
            SimWorld::new(graph)
                .with_item("crafting_table", 1)
                .with_item("cobblestone", 8),
        );
        let step = Step::craft("furnace", 1, recipe);

        assert!(executor.run(&step, &CancelFlag::new()).await.is_ok());
        assert_eq!(world.count_of("furnace"), 1);
        assert!(world.station_placed());
    }

    #[tokio::test]
    async fn missing_station_fails_before_crafting() {
        let graph = graph();
        let recipe = graph.get_recipe("furnace").cloned().unwrap();
        let (world, executor) = setup(
            SimWorld::new(graph)
                .with_station_placed()
                .with_station_unusable()
                .with_item("cobblestone", 8),
        );
        let result = executor
            .run(&Step::craft("furnace", 1, recipe), &CancelFlag::new())
            .await;

        assert_eq!(
            result,
            Err(StepFailure::MissingStation {
                item: String::from("furnace"),
            })
        );
        assert_eq!(world.count_of("cobblestone"), 8);
    }

    #[tokio::test]
    async fn short_ingredients_fail_craft() {
        let graph = graph();
        let recipe = graph.get_recipe("stick").cloned().unwrap();
        let (_world, executor) = setup(SimWorld::new(graph));
        let result = executor
            .run(&Step::craft("stick", 4, recipe), &CancelFlag::new())
            .await;

        assert!(matches!(result, Err(StepFailure::CraftFailed { .. })));
    }

    #[tokio::test]
    async fn cancelled_flag_stops_before_any_call() {
        let (world, executor) = setup(SimWorld::new(graph()));
        let cancel = CancelFlag::new();
        cancel.cancel();

        let result = executor.run(&Step::gather("diamond", 1), &cancel).await;
        assert_eq!(result, Err(StepFailure::Cancelled));
        assert!(world.actions().is_empty());
    }
}
