//! Shared type definitions for the Craftwork planning engine.
//!
//! This crate is the single source of truth for the data model shared by the
//! recipe graph, the planner, the scheduler, and anything presenting their
//! output. Records that cross to the presentation layer are exported to
//! `TypeScript` via `ts-rs`.
//!
//! # Modules
//!
//! - [`ids`] -- Type-safe UUID wrappers for goal and plan identifiers
//! - [`enums`] -- Step kinds and statuses, goal actions and states, failures
//! - [`structs`] -- Recipes, steps, plans, goals, and status records

pub mod enums;
pub mod ids;
pub mod structs;

// Re-export all public types at crate root for convenience.
pub use enums::{FailureKind, GoalAction, GoalStatus, StepKind, StepStatus};
pub use ids::{GoalId, PlanId};
pub use structs::{
    DepthExceeded, Goal, GoalReport, Item, Plan, Recipe, SchedulerStatus, Step,
};
