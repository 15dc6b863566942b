//! Recipe graph, gathering categories, and generic materials for the
//! Craftwork planning engine.
//!
//! This crate owns the static knowledge the planner consults: which items
//! are crafted and from what, which are gathered, which generic names
//! (`"planks"`, `"stick"`) stand for several concrete items, and which
//! gathering categories (`"log"`, `"ore"`) expand to which world blocks.
//!
//! # Modules
//!
//! - [`error`] -- Validation and loading errors ([`RecipeError`])
//! - [`generic`] -- Declarative generic-material rules ([`GenericRule`])
//! - [`graph`] -- The [`RecipeGraph`] lookup table
//! - [`standard`] -- Built-in recipe table
//! - [`table`] -- Serialized (YAML) form of a recipe table

pub mod error;
pub mod generic;
pub mod graph;
pub mod standard;
pub mod table;

// Re-export primary types at crate root.
pub use error::RecipeError;
pub use generic::{GenericRule, GenericSource};
pub use graph::RecipeGraph;
pub use standard::{WOOD_SPECIES, standard_table};
pub use table::{GenericEntry, RecipeEntry, RecipeTable};
