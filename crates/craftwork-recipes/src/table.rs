//! Serialized form of a recipe table.
//!
//! A [`RecipeTable`] is what lives on disk (YAML) or is assembled by
//! [`standard_table`](crate::standard::standard_table). It is validated and
//! turned into a [`RecipeGraph`](crate::RecipeGraph) once at startup.
//!
//! ```yaml
//! recipes:
//!   crafting_table:
//!     ingredients: { planks: 4 }
//!   gold_ingots_from_block:
//!     output: gold_ingot
//!     count: 9
//!     alias_of: gold_ingot
//!     ingredients: { gold_block: 1 }
//! aliases:
//!   log: [oak_log, birch_log]
//! primitives: [diamond, cobblestone]
//! generics:
//!   planks: { variants: planks, source: { category: log }, per_unit: 4 }
//!   stick: { source: { generic: planks }, per_unit: 2 }
//! ```

use std::collections::{BTreeMap, BTreeSet};

use craftwork_types::{Item, Recipe};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::generic::GenericSource;

/// A complete recipe table document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeTable {
    /// Recipes keyed by name. The key doubles as the output item unless
    /// `output` is set.
    #[serde(default)]
    pub recipes: IndexMap<String, RecipeEntry>,

    /// Gathering categories mapped to concrete world-block names.
    #[serde(default)]
    pub aliases: BTreeMap<String, Vec<Item>>,

    /// Items that are gathered rather than crafted.
    #[serde(default)]
    pub primitives: BTreeSet<Item>,

    /// Generic materials satisfiable by any concrete variant.
    #[serde(default)]
    pub generics: IndexMap<Item, GenericEntry>,
}

/// One recipe as written in a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeEntry {
    /// Output item, when it differs from the table key.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<Item>,

    /// Units produced per craft.
    #[serde(default = "default_count")]
    pub count: u32,

    /// Ingredients consumed per craft, in order.
    pub ingredients: IndexMap<Item, u32>,

    /// Whether a placed crafting station is required.
    #[serde(default)]
    pub station: bool,

    /// The item this recipe is an alternate producer of.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias_of: Option<Item>,
}

impl RecipeEntry {
    /// Convert into a [`Recipe`], using `key` as the output when none is set.
    pub fn into_recipe(self, key: &str) -> Recipe {
        Recipe {
            output_item: self.output.unwrap_or_else(|| key.to_owned()),
            output_count: self.count,
            ingredients: self.ingredients,
            needs_station: self.station,
            alias_of: self.alias_of,
        }
    }
}

/// One generic material as written in a table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenericEntry {
    /// Alias category whose members all count toward this generic.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variants: Option<String>,

    /// Where one source unit comes from.
    pub source: GenericSource,

    /// Outputs produced per source unit.
    pub per_unit: u32,
}

const fn default_count() -> u32 {
    1
}
