//! Error types for the `craftwork-core` crate.
//!
//! [`StepFailure`] describes why a single plan step could not be executed.
//! It never escapes the scheduler: the scheduler records it as a terminal
//! step and goal status plus a diagnostic string.

use craftwork_types::FailureKind;

/// Why a step could not be executed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StepFailure {
    /// Every gather target failed.
    #[error("could not gather {count} {item}")]
    GatherFailed {
        /// The item the step was gathering.
        item: String,
        /// The requested quantity.
        count: u32,
    },

    /// The recipe needs a crafting station and none could be ensured.
    #[error("no crafting station available to craft {item}")]
    MissingStation {
        /// The item the step was crafting.
        item: String,
    },

    /// The crafter reported failure.
    #[error("could not craft {count} {item}: {reason}")]
    CraftFailed {
        /// The item the step was crafting.
        item: String,
        /// The requested quantity.
        count: u32,
        /// Short explanation.
        reason: String,
    },

    /// The goal was cancelled before or during the step.
    #[error("cancelled")]
    Cancelled,
}

impl StepFailure {
    /// The failure category reported on the goal.
    pub const fn kind(&self) -> FailureKind {
        match self {
            Self::GatherFailed { .. } => FailureKind::GatherFailed,
            Self::MissingStation { .. } => FailureKind::MissingStation,
            Self::CraftFailed { .. } => FailureKind::CraftFailed,
            Self::Cancelled => FailureKind::Cancelled,
        }
    }
}
