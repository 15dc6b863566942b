//! Plan resolution, step execution, and goal scheduling for the Craftwork
//! planning engine.
//!
//! Goals flow through three stages: the [`PlanResolver`] expands a target
//! into gather and craft steps, the [`StepExecutor`] performs each step
//! through injected capability providers, and the [`Scheduler`] queues
//! goals and drives them one at a time.
//!
//! # Modules
//!
//! - [`cancel`] -- Cooperative cancellation flag shared with providers.
//! - [`capability`] -- [`Gatherer`], [`Crafter`] and [`InventoryView`]
//!   provider traits.
//! - [`config`] -- Configuration loading from `craftwork-config.yaml` into
//!   strongly-typed structs.
//! - [`error`] -- [`StepFailure`] for failed steps.
//! - [`executor`] -- Single-step execution.
//! - [`notifier`] -- [`Notifier`] trait and [`TracingNotifier`].
//! - [`planner`] -- Recursive plan expansion.
//! - [`scheduler`] -- FIFO goal queue and execution loop.
//! - [`sim`] -- In-memory [`SimWorld`] provider.

pub mod cancel;
pub mod capability;
pub mod config;
pub mod error;
pub mod executor;
pub mod notifier;
pub mod planner;
pub mod scheduler;
pub mod sim;

pub use cancel::CancelFlag;
pub use capability::{Crafter, Gatherer, InventoryView, StationRef};
pub use config::{ConfigError, CraftworkConfig};
pub use error::StepFailure;
pub use executor::StepExecutor;
pub use notifier::{NoOpNotifier, Notifier, TracingNotifier};
pub use planner::PlanResolver;
pub use scheduler::Scheduler;
pub use sim::SimWorld;
