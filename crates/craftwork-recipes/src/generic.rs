//! Generic materials.
//!
//! Game recipes ask for "planks" or "sticks", but the world only ever holds
//! a concrete wood species. A [`GenericRule`] says how many units of a
//! generic material one source unit yields and where that source unit comes
//! from, so the planner can expand any generic the same way without
//! per-name branches.

use craftwork_types::Item;
use serde::{Deserialize, Serialize};

/// Where one source unit of a generic material comes from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenericSource {
    /// Gather one concrete member of the named alias category (e.g. a log).
    Category(String),
    /// Resolve another generic material (e.g. sticks come from planks).
    Generic(Item),
}

impl GenericSource {
    /// The referenced category or generic name.
    pub fn name(&self) -> &str {
        match self {
            Self::Category(name) | Self::Generic(name) => name,
        }
    }
}

/// Expansion rule for one generic material.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenericRule {
    /// The generic item name, e.g. `"planks"`.
    pub name: Item,
    /// Alias category whose members count toward holdings of this generic.
    pub variants: Option<String>,
    /// Where one source unit comes from.
    pub source: GenericSource,
    /// Generic units produced per source unit.
    pub yield_per_unit: u32,
}

impl GenericRule {
    /// Source units required to produce `needed` generic units.
    pub const fn units_needed(&self, needed: u32) -> u32 {
        let per_unit = if self.yield_per_unit == 0 { 1 } else { self.yield_per_unit };
        needed.div_ceil(per_unit)
    }
}
