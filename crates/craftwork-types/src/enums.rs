//! Enumeration types for the Craftwork planning engine.
//!
//! Step kinds and statuses, goal actions and lifecycle states, and the
//! failure taxonomy surfaced to the command layer.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// The primitive action a plan step performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum StepKind {
    /// Collect an item from the world (mine, chop, pick up).
    Gather,
    /// Combine ingredients into an item using a recipe.
    Craft,
}

impl core::fmt::Display for StepKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Gather => f.write_str("gather"),
            Self::Craft => f.write_str("craft"),
        }
    }
}

/// Execution status of a single plan step.
///
/// Steps start `Pending`. The scheduler moves each one to exactly one
/// terminal state, or leaves it `Pending` when an earlier step aborted the
/// plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum StepStatus {
    /// Not yet attempted.
    #[default]
    Pending,
    /// Already satisfied by current holdings when its turn came.
    Skipped,
    /// Executed successfully.
    Done,
    /// The capability provider reported failure.
    Failed,
}

// ---------------------------------------------------------------------------
// Goals
// ---------------------------------------------------------------------------

/// What the requester asked the agent to do with the target item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum GoalAction {
    /// Produce the target, crafting through its full recipe tree.
    Make,
    /// Gather the target (or any member of a gathering category) directly.
    Mine,
}

impl core::fmt::Display for GoalAction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Make => f.write_str("make"),
            Self::Mine => f.write_str("mine"),
        }
    }
}

/// Lifecycle state of a goal: `Queued -> Running -> {Completed, Failed}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum GoalStatus {
    /// Waiting in the scheduler queue.
    #[default]
    Queued,
    /// The single goal currently being executed.
    Running,
    /// Every step finished or was already satisfied.
    Completed,
    /// Planning or a step failed; see the goal report for the reason.
    Failed,
}

impl GoalStatus {
    /// Whether this status is terminal (no further transitions).
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

/// Why a goal failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export, export_to = "bindings/")]
pub enum FailureKind {
    /// The target is neither craftable nor a known gatherable item.
    UnknownRecipe,
    /// Recipe expansion exceeded the depth bound (cyclic or malformed data).
    DepthExceeded,
    /// A craft step needed a crafting station that could not be ensured.
    MissingStation,
    /// The gatherer could not collect the requested item.
    GatherFailed,
    /// The crafter could not perform the craft.
    CraftFailed,
    /// The goal was aborted by an operator stop.
    Cancelled,
    /// A provider panicked while the goal was running.
    Aborted,
}

impl core::fmt::Display for FailureKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let label = match self {
            Self::UnknownRecipe => "unknown recipe",
            Self::DepthExceeded => "recipe depth exceeded",
            Self::MissingStation => "missing crafting station",
            Self::GatherFailed => "gather failed",
            Self::CraftFailed => "craft failed",
            Self::Cancelled => "cancelled",
            Self::Aborted => "aborted",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_statuses() {
        assert!(!GoalStatus::Queued.is_terminal());
        assert!(!GoalStatus::Running.is_terminal());
        assert!(GoalStatus::Completed.is_terminal());
        assert!(GoalStatus::Failed.is_terminal());
    }

    #[test]
    fn enums_serialize_snake_case() {
        let json = serde_json::to_string(&FailureKind::MissingStation).ok();
        assert_eq!(json.as_deref(), Some("\"missing_station\""));
        let action: Result<GoalAction, _> = serde_json::from_str("\"mine\"");
        assert_eq!(action.ok(), Some(GoalAction::Mine));
    }

    #[test]
    fn step_status_defaults_to_pending() {
        assert_eq!(StepStatus::default(), StepStatus::Pending);
    }
}
