//! Core data-model structs for the Craftwork planning engine.
//!
//! Covers recipes, plan steps, plans, goals, and the status records that
//! cross the boundary to the command and presentation layers.

use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{FailureKind, GoalAction, GoalStatus, StepKind, StepStatus};
use crate::ids::{GoalId, PlanId};

/// An opaque item identifier, e.g. `"oak_log"` or `"diamond_pickaxe"`.
pub type Item = String;

// ---------------------------------------------------------------------------
// Recipe
// ---------------------------------------------------------------------------

/// A single crafting recipe.
///
/// Invariants (enforced when a recipe table is loaded): `output_count >= 1`
/// and `ingredients` is non-empty with every amount `>= 1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Recipe {
    /// The concrete item this recipe produces.
    pub output_item: Item,
    /// Units of `output_item` produced by one craft.
    pub output_count: u32,
    /// Ingredients consumed per craft, in declaration order.
    pub ingredients: IndexMap<Item, u32>,
    /// Whether the craft requires a placed crafting station.
    pub needs_station: bool,
    /// When set, this recipe is an alternate producer of the named item
    /// (e.g. breaking a block down into ingots, or one wood species' planks
    /// standing in for generic planks).
    pub alias_of: Option<Item>,
}

impl Recipe {
    /// Number of crafts required to produce at least `needed` units.
    pub const fn crafts_needed(&self, needed: u32) -> u32 {
        let per_craft = if self.output_count == 0 { 1 } else { self.output_count };
        needed.div_ceil(per_craft)
    }

    /// Whether this recipe produces `item`, directly or as an alias.
    pub fn produces(&self, item: &str) -> bool {
        self.output_item == item || self.alias_of.as_deref() == Some(item)
    }
}

// ---------------------------------------------------------------------------
// Step
// ---------------------------------------------------------------------------

/// One primitive action inside a [`Plan`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Step {
    /// Gather or craft.
    pub kind: StepKind,
    /// The item this step yields. Generic names such as `"planks"` are kept
    /// as-is; satisfaction checks aggregate their concrete variants.
    pub item: Item,
    /// How many units of `item` the step must provide.
    pub count: u32,
    /// Units of `item` the plan expects to be held once this step is done.
    /// The scheduler skips the step when holdings already reach this.
    /// Defaults to `count` until the resolver fills it in.
    pub required: u32,
    /// The recipe for craft steps; `None` for gather steps.
    pub recipe: Option<Recipe>,
    /// Concrete world-block names a gather step may target, in preference
    /// order. Empty means the gatherer targets `item` itself.
    #[serde(default)]
    pub sources: Vec<Item>,
    /// Current execution status.
    #[serde(default)]
    pub status: StepStatus,
}

impl Step {
    /// A gather step targeting `item` directly.
    pub fn gather(item: impl Into<Item>, count: u32) -> Self {
        Self {
            kind: StepKind::Gather,
            item: item.into(),
            count,
            required: count,
            recipe: None,
            sources: Vec::new(),
            status: StepStatus::Pending,
        }
    }

    /// A gather step for a category, satisfiable by any of `sources`.
    pub fn gather_from(item: impl Into<Item>, count: u32, sources: Vec<Item>) -> Self {
        Self {
            sources,
            ..Self::gather(item, count)
        }
    }

    /// A craft step using `recipe`.
    pub fn craft(item: impl Into<Item>, count: u32, recipe: Recipe) -> Self {
        Self {
            kind: StepKind::Craft,
            item: item.into(),
            count,
            required: count,
            recipe: Some(recipe),
            sources: Vec::new(),
            status: StepStatus::Pending,
        }
    }

    /// The concrete names a gatherer should try, in order.
    pub fn gather_targets(&self) -> Vec<&str> {
        if self.sources.is_empty() {
            vec![self.item.as_str()]
        } else {
            self.sources.iter().map(String::as_str).collect()
        }
    }
}

impl core::fmt::Display for Step {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} {} x{}", self.kind, self.item, self.count)
    }
}

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// Signal attached to a plan whose expansion hit the depth bound.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct DepthExceeded {
    /// The item whose expansion was cut off.
    pub item: Item,
    /// The depth at which expansion stopped.
    pub depth: u32,
}

/// An ordered sequence of steps for one top-level request.
///
/// For every craft step, the steps supplying its ingredients sit at
/// strictly smaller indices. Plans are a tree expansion: sibling branches
/// that need the same ingredient each carry their own sub-plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Plan {
    /// Identifier for logging and reports.
    pub id: PlanId,
    /// The requested item.
    pub target: Item,
    /// The requested quantity.
    pub quantity: u32,
    /// Steps in execution order.
    pub steps: Vec<Step>,
    /// Set when expansion stopped at the depth bound.
    pub depth_exceeded: Option<DepthExceeded>,
}

impl Plan {
    /// Create an empty plan for `quantity` of `target`.
    pub fn new(target: impl Into<Item>, quantity: u32) -> Self {
        Self {
            id: PlanId::new(),
            target: target.into(),
            quantity,
            steps: Vec::new(),
            depth_exceeded: None,
        }
    }

    /// Whether the plan has no steps.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Number of steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }
}

// ---------------------------------------------------------------------------
// Goal
// ---------------------------------------------------------------------------

/// A unit of work submitted by the command layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Goal {
    /// Unique goal identifier.
    pub id: GoalId,
    /// What to do with the target.
    pub action: GoalAction,
    /// The requested item.
    pub target: Item,
    /// The requested quantity (total held, not additional units).
    pub count: u32,
    /// Who asked for it (player name, "console", ...).
    pub requester: String,
    /// Lifecycle state.
    pub status: GoalStatus,
    /// When the goal was created.
    pub created_at: DateTime<Utc>,
}

impl Goal {
    /// Create a queued goal.
    pub fn new(
        action: GoalAction,
        target: impl Into<Item>,
        count: u32,
        requester: impl Into<String>,
    ) -> Self {
        Self {
            id: GoalId::new(),
            action,
            target: target.into(),
            count,
            requester: requester.into(),
            status: GoalStatus::Queued,
            created_at: Utc::now(),
        }
    }

    /// Shorthand for a `make` goal.
    pub fn make(target: impl Into<Item>, count: u32, requester: impl Into<String>) -> Self {
        Self::new(GoalAction::Make, target, count, requester)
    }

    /// Shorthand for a `mine` goal.
    pub fn mine(target: impl Into<Item>, count: u32, requester: impl Into<String>) -> Self {
        Self::new(GoalAction::Mine, target, count, requester)
    }
}

impl core::fmt::Display for Goal {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{} {} x{}", self.action, self.target, self.count)
    }
}

/// Terminal record of a finished goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GoalReport {
    /// The goal, with its terminal status.
    pub goal: Goal,
    /// The plan that was executed, if planning got that far.
    pub plan_id: Option<PlanId>,
    /// The plan's steps with their final statuses.
    pub steps: Vec<Step>,
    /// Why the goal failed, if it did.
    pub failure: Option<FailureKind>,
    /// Short human-readable diagnostic for the user-facing layer.
    pub diagnostic: Option<String>,
    /// When execution began.
    pub started_at: DateTime<Utc>,
    /// When the goal reached its terminal status.
    pub finished_at: DateTime<Utc>,
}

impl GoalReport {
    /// Whether the goal completed.
    pub fn is_success(&self) -> bool {
        self.goal.status == GoalStatus::Completed
    }

    /// Number of steps with the given status.
    pub fn count_steps(&self, status: StepStatus) -> usize {
        self.steps.iter().filter(|s| s.status == status).count()
    }
}

/// Snapshot of the scheduler for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SchedulerStatus {
    /// The goal currently running, if any.
    pub current_goal: Option<Goal>,
    /// Goals waiting behind the current one.
    pub queue_length: u32,
    /// Whether the processing loop is active.
    pub is_running: bool,
    /// Steps completed since startup (monotonic).
    pub steps_completed: u64,
}
