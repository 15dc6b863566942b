//! Built-in recipe table.
//!
//! Covers the wood and tool-tier progression the agent is asked for most:
//! planks for every wood species, sticks, the crafting table, pickaxes,
//! swords and shovels for each material tier, furnace, chest, torches, bow
//! and arrows, plus a block-to-ingot breakdown recipe. Deployments that need
//! more load their own table with
//! [`RecipeGraph::from_file`](crate::RecipeGraph::from_file).

use std::collections::{BTreeMap, BTreeSet};

use indexmap::IndexMap;

use crate::error::RecipeError;
use crate::generic::GenericSource;
use crate::graph::RecipeGraph;
use crate::table::{GenericEntry, RecipeEntry, RecipeTable};

/// Wood species with a log and a planks variant.
pub const WOOD_SPECIES: &[&str] = &[
    "oak", "spruce", "birch", "jungle", "acacia", "dark_oak", "mangrove", "cherry",
];

/// Ore blocks reachable through the `ore` gathering category.
const ORE_BLOCKS: &[&str] = &[
    "coal_ore",
    "iron_ore",
    "copper_ore",
    "gold_ore",
    "redstone_ore",
    "lapis_ore",
    "diamond_ore",
    "emerald_ore",
];

/// Items the gatherer collects directly.
const PRIMITIVES: &[&str] = &[
    "cobblestone",
    "coal",
    "iron_ingot",
    "gold_block",
    "diamond",
    "string",
    "flint",
    "feather",
];

/// Material tiers for tools: (prefix, head material).
const TOOL_TIERS: &[(&str, &str)] = &[
    ("wooden", "planks"),
    ("stone", "cobblestone"),
    ("iron", "iron_ingot"),
];

/// Helper to build a [`RecipeEntry`] whose output is its table key.
fn entry(count: u32, station: bool, ingredients: &[(&str, u32)]) -> RecipeEntry {
    RecipeEntry {
        output: None,
        count,
        ingredients: ingredients
            .iter()
            .map(|(item, amount)| ((*item).to_owned(), *amount))
            .collect::<IndexMap<_, _>>(),
        station,
        alias_of: None,
    }
}

/// Assemble the built-in [`RecipeTable`].
pub fn standard_table() -> RecipeTable {
    let mut recipes = IndexMap::new();

    recipes.insert(String::from("crafting_table"), entry(1, false, &[("planks", 4)]));
    recipes.insert(String::from("stick"), entry(4, false, &[("planks", 2)]));

    for species in WOOD_SPECIES {
        let log = format!("{species}_log");
        recipes.insert(
            format!("{species}_planks"),
            RecipeEntry {
                alias_of: Some(String::from("planks")),
                ..entry(4, false, &[(log.as_str(), 1)])
            },
        );
    }

    for &(tier, material) in TOOL_TIERS {
        recipes.insert(
            format!("{tier}_pickaxe"),
            entry(1, true, &[(material, 3), ("stick", 2)]),
        );
        recipes.insert(
            format!("{tier}_sword"),
            entry(1, true, &[(material, 2), ("stick", 1)]),
        );
        recipes.insert(
            format!("{tier}_shovel"),
            entry(1, true, &[(material, 1), ("stick", 2)]),
        );
    }

    // Diamond tier lists sticks first so their subtree is resolved first.
    recipes.insert(
        String::from("diamond_pickaxe"),
        entry(1, true, &[("stick", 2), ("diamond", 2)]),
    );
    recipes.insert(
        String::from("diamond_sword"),
        entry(1, true, &[("stick", 1), ("diamond", 2)]),
    );
    recipes.insert(
        String::from("diamond_shovel"),
        entry(1, true, &[("stick", 2), ("diamond", 1)]),
    );

    recipes.insert(String::from("furnace"), entry(1, true, &[("cobblestone", 8)]));
    recipes.insert(String::from("chest"), entry(1, true, &[("planks", 8)]));
    recipes.insert(String::from("torch"), entry(4, false, &[("stick", 1), ("coal", 1)]));
    recipes.insert(String::from("bow"), entry(1, true, &[("stick", 3), ("string", 3)]));
    recipes.insert(
        String::from("arrow"),
        entry(4, true, &[("flint", 1), ("stick", 1), ("feather", 1)]),
    );
    recipes.insert(
        String::from("gold_ingots_from_block"),
        RecipeEntry {
            output: Some(String::from("gold_ingot")),
            alias_of: Some(String::from("gold_ingot")),
            ..entry(9, false, &[("gold_block", 1)])
        },
    );

    let mut aliases = BTreeMap::new();
    aliases.insert(
        String::from("log"),
        WOOD_SPECIES.iter().map(|s| format!("{s}_log")).collect(),
    );
    aliases.insert(
        String::from("planks"),
        WOOD_SPECIES.iter().map(|s| format!("{s}_planks")).collect(),
    );
    aliases.insert(
        String::from("ore"),
        ORE_BLOCKS.iter().map(|s| (*s).to_owned()).collect(),
    );

    let primitives: BTreeSet<String> = PRIMITIVES.iter().map(|s| (*s).to_owned()).collect();

    let mut generics = IndexMap::new();
    generics.insert(
        String::from("planks"),
        GenericEntry {
            variants: Some(String::from("planks")),
            source: GenericSource::Category(String::from("log")),
            per_unit: 4,
        },
    );
    generics.insert(
        String::from("stick"),
        GenericEntry {
            variants: None,
            source: GenericSource::Generic(String::from("planks")),
            per_unit: 2,
        },
    );

    RecipeTable {
        recipes,
        aliases,
        primitives,
        generics,
    }
}

impl RecipeGraph {
    /// The built-in recipe graph.
    pub fn standard() -> Result<Self, RecipeError> {
        Self::from_table(standard_table())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_is_valid() {
        let graph = RecipeGraph::standard();
        assert!(graph.is_ok(), "{graph:?}");
    }

    #[test]
    fn every_species_has_planks() {
        let graph = RecipeGraph::standard().unwrap();
        for species in WOOD_SPECIES {
            let recipe = graph.get_recipe(&format!("{species}_planks")).unwrap();
            assert_eq!(recipe.output_count, 4);
            assert_eq!(recipe.alias_of.as_deref(), Some("planks"));
        }
        assert_eq!(graph.resolve_alias("log").len(), WOOD_SPECIES.len());
    }

    #[test]
    fn diamond_pickaxe_needs_station() {
        let graph = RecipeGraph::standard().unwrap();
        let recipe = graph.get_recipe("diamond_pickaxe").unwrap();
        assert!(recipe.needs_station);
        let order: Vec<&str> = recipe.ingredients.keys().map(String::as_str).collect();
        assert_eq!(order, vec!["stick", "diamond"]);
    }

    #[test]
    fn crafting_table_needs_no_station() {
        let graph = RecipeGraph::standard().unwrap();
        let recipe = graph.get_recipe("crafting_table").unwrap();
        assert!(!recipe.needs_station);
    }

    #[test]
    fn gold_ingots_come_from_blocks() {
        let graph = RecipeGraph::standard().unwrap();
        let recipe = graph.get_recipe("gold_ingot").unwrap();
        assert_eq!(recipe.output_item, "gold_ingot");
        assert_eq!(recipe.output_count, 9);
    }

    #[test]
    fn diamond_and_ore_blocks_are_primitive() {
        let graph = RecipeGraph::standard().unwrap();
        assert!(graph.get_recipe("diamond").is_none());
        assert!(graph.is_primitive("diamond"));
        assert!(graph.is_category("ore"));
        assert!(graph.is_known("iron_ore"));
    }
}
