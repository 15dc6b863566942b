//! Capability provider interfaces.
//!
//! The core never touches the world directly. Gathering, crafting and
//! inventory inspection go through these traits, which the world-interaction
//! layer implements (and [`SimWorld`](crate::sim::SimWorld) implements for
//! tests and the demo binary).
//!
//! The async methods are the only suspension points of goal execution. The
//! scheduler awaits each call to completion before issuing the next one, so
//! implementations never see two outstanding calls at once.

use async_trait::async_trait;
use craftwork_types::{Item, Recipe};
use serde::{Deserialize, Serialize};

use crate::cancel::CancelFlag;

/// Handle to a crafting station the crafter has placed or located.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StationRef {
    /// The station block, e.g. `"crafting_table"`.
    pub block: Item,
    /// World position of the block, when known.
    pub position: Option<[i32; 3]>,
}

/// Collects items from the world.
#[async_trait]
pub trait Gatherer: Send + Sync {
    /// Gather `count` units of `item`.
    ///
    /// Returns `false` when the item is unreachable, no matching block or
    /// entity exists, or the required tool tier is missing. Implementations
    /// should stop early and return `false` once `cancel` is raised.
    async fn gather(&self, item: &str, count: u32, cancel: &CancelFlag) -> bool;
}

/// Performs crafts.
#[async_trait]
pub trait Crafter: Send + Sync {
    /// Make a crafting station usable (locate a placed one, or place one
    /// from the inventory). `None` means no station could be ensured.
    async fn ensure_station(&self, cancel: &CancelFlag) -> Option<StationRef>;

    /// Craft at least `count` units of `item` using `recipe`.
    ///
    /// `station` is `Some` whenever the recipe needs one. On success the
    /// inventory reflects the craft; the core keeps no bookkeeping of its
    /// own.
    async fn craft(
        &self,
        item: &str,
        recipe: &Recipe,
        count: u32,
        station: Option<&StationRef>,
        cancel: &CancelFlag,
    ) -> bool;
}

/// Live, read-only view of the agent's holdings.
///
/// Queried fresh before and during execution; never cached by the core.
pub trait InventoryView: Send + Sync {
    /// Units of exactly `item` currently held.
    fn count_of(&self, item: &str) -> u32;

    /// Whether a crafting station is already usable without crafting one
    /// (placed nearby, or held in the inventory).
    fn station_available(&self) -> bool;
}
