//! In-memory world used by tests and the demo binary.
//!
//! [`SimWorld`] implements every capability trait against a plain item map.
//! Gathering always succeeds unless the item is marked barren or a seeded
//! failure roll hits; crafting checks and consumes ingredients the way a
//! real crafter would, so a plan that works here is at least internally
//! consistent.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use craftwork_recipes::RecipeGraph;
use craftwork_types::{Item, Recipe};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, trace};

use crate::cancel::CancelFlag;
use crate::capability::{Crafter, Gatherer, InventoryView, StationRef};

/// Mutable world state behind the lock.
#[derive(Debug, Default)]
struct SimState {
    inventory: BTreeMap<Item, u32>,
    station_placed: bool,
    station_unusable: bool,
    barren: BTreeSet<Item>,
    actions: Vec<String>,
}

/// Simulated agent and world.
#[derive(Debug)]
pub struct SimWorld {
    graph: Arc<RecipeGraph>,
    station_block: Item,
    state: RwLock<SimState>,
    rng: Mutex<StdRng>,
    gather_failure_chance: f64,
}

impl SimWorld {
    /// Empty-handed agent with no station nearby.
    pub fn new(graph: Arc<RecipeGraph>) -> Self {
        Self {
            graph,
            station_block: String::from("crafting_table"),
            state: RwLock::new(SimState::default()),
            rng: Mutex::new(StdRng::seed_from_u64(0)),
            gather_failure_chance: 0.0,
        }
    }

    /// Start with `count` units of `item` in the inventory.
    #[must_use]
    pub fn with_item(self, item: impl Into<Item>, count: u32) -> Self {
        self.add(&item.into(), count);
        self
    }

    /// Start with a station already placed nearby.
    #[must_use]
    pub fn with_station_placed(self) -> Self {
        self.write().station_placed = true;
        self
    }

    /// Report a station as available to the planner but fail every attempt
    /// to use it (e.g. it sits behind a wall).
    #[must_use]
    pub fn with_station_unusable(self) -> Self {
        self.write().station_unusable = true;
        self
    }

    /// Make every gather of `item` fail.
    #[must_use]
    pub fn with_barren(self, item: impl Into<Item>) -> Self {
        self.write().barren.insert(item.into());
        self
    }

    /// Fail each gather call with probability `chance`, using a seeded RNG.
    #[must_use]
    pub fn with_gather_failures(mut self, seed: u64, chance: f64) -> Self {
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self.gather_failure_chance = chance.clamp(0.0, 1.0);
        self
    }

    /// Use `block` as the station item instead of `crafting_table`.
    #[must_use]
    pub fn with_station_block(mut self, block: impl Into<Item>) -> Self {
        self.station_block = block.into();
        self
    }

    /// Snapshot of the inventory (items with a zero count are omitted).
    pub fn holdings(&self) -> BTreeMap<Item, u32> {
        self.read().inventory.clone()
    }

    /// Units of `item` held, counting generic variants.
    pub fn total_of(&self, item: &str) -> u32 {
        let state = self.read();
        self.graph
            .count_with(item, |name| state.inventory.get(name).copied().unwrap_or(0))
    }

    /// Every capability call performed so far, e.g. `"gather oak_log x1"`.
    pub fn actions(&self) -> Vec<String> {
        self.read().actions.clone()
    }

    /// Whether a station has been placed.
    pub fn station_placed(&self) -> bool {
        self.read().station_placed
    }

    fn read(&self) -> RwLockReadGuard<'_, SimState> {
        self.state.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, SimState> {
        self.state.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn add(&self, item: &str, count: u32) {
        if count == 0 {
            return;
        }
        let mut state = self.write();
        let held = state.inventory.entry(item.to_owned()).or_insert(0);
        *held = held.saturating_add(count);
    }

    fn roll_gather_failure(&self) -> bool {
        if self.gather_failure_chance <= 0.0 {
            return false;
        }
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        rng.random_bool(self.gather_failure_chance)
    }
}

/// Remove `amount` units counted across `variants`, in order.
fn consume(inventory: &mut BTreeMap<Item, u32>, variants: &[&str], amount: u32) {
    let mut remaining = amount;
    for name in variants {
        if remaining == 0 {
            break;
        }
        let Some(held) = inventory.get_mut(*name) else {
            continue;
        };
        let taken = remaining.min(*held);
        *held = held.saturating_sub(taken);
        remaining = remaining.saturating_sub(taken);
        if *held == 0 {
            inventory.remove(*name);
        }
    }
}

#[async_trait]
impl Gatherer for SimWorld {
    async fn gather(&self, item: &str, count: u32, cancel: &CancelFlag) -> bool {
        tokio::task::yield_now().await;
        if cancel.is_cancelled() {
            return false;
        }
        let failed_roll = self.roll_gather_failure();
        let barren = self.read().barren.contains(item);
        if barren || failed_roll {
            debug!(item, count, barren, "Simulated gather failed");
            self.write().actions.push(format!("gather {item} x{count} failed"));
            return false;
        }
        self.add(item, count);
        self.write().actions.push(format!("gather {item} x{count}"));
        trace!(item, count, "Simulated gather");
        true
    }
}

#[async_trait]
impl Crafter for SimWorld {
    async fn ensure_station(&self, cancel: &CancelFlag) -> Option<StationRef> {
        tokio::task::yield_now().await;
        if cancel.is_cancelled() {
            return None;
        }
        let mut state = self.write();
        if state.station_unusable {
            debug!(block = %self.station_block, "Simulated station unusable");
            return None;
        }
        if !state.station_placed {
            let held = state.inventory.get(&self.station_block).copied().unwrap_or(0);
            if held == 0 {
                return None;
            }
            consume(&mut state.inventory, &[self.station_block.as_str()], 1);
            state.station_placed = true;
            state.actions.push(format!("place {}", self.station_block));
        }
        Some(StationRef {
            block: self.station_block.clone(),
            position: Some([0, 64, 0]),
        })
    }

    async fn craft(
        &self,
        item: &str,
        recipe: &Recipe,
        count: u32,
        station: Option<&StationRef>,
        cancel: &CancelFlag,
    ) -> bool {
        tokio::task::yield_now().await;
        if cancel.is_cancelled() {
            return false;
        }
        if recipe.needs_station && station.is_none() {
            return false;
        }

        let crafts = recipe.crafts_needed(count);
        let mut state = self.write();

        for (ingredient, per_craft) in &recipe.ingredients {
            let needed = per_craft.saturating_mul(crafts);
            let held = self.graph.count_with(ingredient, |name| {
                state.inventory.get(name).copied().unwrap_or(0)
            });
            if held < needed {
                debug!(item, %ingredient, needed, held, "Simulated craft short of ingredient");
                state.actions.push(format!("craft {item} x{count} failed"));
                return false;
            }
        }

        for (ingredient, per_craft) in &recipe.ingredients {
            let variants = self.graph.variants_of(ingredient);
            consume(&mut state.inventory, &variants, per_craft.saturating_mul(crafts));
        }

        let produced = recipe.output_count.saturating_mul(crafts);
        let held = state.inventory.entry(recipe.output_item.clone()).or_insert(0);
        *held = held.saturating_add(produced);
        state.actions.push(format!("craft {item} x{count}"));
        trace!(item, crafts, produced, "Simulated craft");
        true
    }
}

impl InventoryView for SimWorld {
    fn count_of(&self, item: &str) -> u32 {
        self.read().inventory.get(item).copied().unwrap_or(0)
    }

    fn station_available(&self) -> bool {
        let state = self.read();
        state.station_placed || state.inventory.contains_key(&self.station_block)
    }
}
