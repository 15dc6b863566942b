//! The recipe graph: item -> recipe lookup plus alias resolution.
//!
//! A [`RecipeGraph`] is built once at startup from a validated
//! [`RecipeTable`] and never mutated afterwards. Every query is a pure
//! lookup.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use craftwork_types::{Item, Recipe};
use indexmap::IndexMap;
use tracing::debug;

use crate::error::RecipeError;
use crate::generic::{GenericRule, GenericSource};
use crate::table::RecipeTable;

/// Static item -> recipe table with gathering categories and generic
/// materials.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeGraph {
    recipes: IndexMap<String, Recipe>,
    aliases: BTreeMap<String, Vec<Item>>,
    primitives: BTreeSet<Item>,
    generics: IndexMap<Item, GenericRule>,
}

impl RecipeGraph {
    /// Build a graph from a table, validating every recipe and rule.
    pub fn from_table(table: RecipeTable) -> Result<Self, RecipeError> {
        let RecipeTable {
            recipes: entries,
            aliases,
            primitives,
            generics: generic_entries,
        } = table;

        for (category, members) in &aliases {
            if members.is_empty() {
                return Err(RecipeError::EmptyCategory {
                    category: category.clone(),
                });
            }
        }

        let mut recipes = IndexMap::with_capacity(entries.len());
        for (key, entry) in entries {
            let recipe = entry.into_recipe(&key);
            validate_recipe(&key, &recipe)?;
            recipes.insert(key, recipe);
        }

        let mut generics = IndexMap::with_capacity(generic_entries.len());
        for (name, entry) in &generic_entries {
            if entry.per_unit == 0 {
                return Err(RecipeError::ZeroYield { name: name.clone() });
            }
            let source_known = match &entry.source {
                GenericSource::Category(category) => aliases.contains_key(category),
                GenericSource::Generic(other) => generic_entries.contains_key(other),
            };
            if !source_known {
                return Err(RecipeError::UnknownGenericSource {
                    name: name.clone(),
                    source_name: entry.source.name().to_owned(),
                });
            }
            if let Some(category) = &entry.variants {
                if !aliases.contains_key(category) {
                    return Err(RecipeError::UnknownVariantCategory {
                        name: name.clone(),
                        category: category.clone(),
                    });
                }
            }
            generics.insert(
                name.clone(),
                GenericRule {
                    name: name.clone(),
                    variants: entry.variants.clone(),
                    source: entry.source.clone(),
                    yield_per_unit: entry.per_unit,
                },
            );
        }

        debug!(
            recipes = recipes.len(),
            categories = aliases.len(),
            primitives = primitives.len(),
            generics = generics.len(),
            "Recipe graph built"
        );

        Ok(Self {
            recipes,
            aliases,
            primitives,
            generics,
        })
    }

    /// Parse and validate a YAML recipe table.
    pub fn from_yaml(yaml: &str) -> Result<Self, RecipeError> {
        let table: RecipeTable = serde_yml::from_str(yaml)?;
        Self::from_table(table)
    }

    /// Load and validate a YAML recipe table from disk.
    pub fn from_file(path: &Path) -> Result<Self, RecipeError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Recipe that produces `item`, or `None` when the item is primitive.
    ///
    /// Exact-name lookup first, then the first recipe declaring itself an
    /// alternate producer of `item`.
    pub fn get_recipe(&self, item: &str) -> Option<&Recipe> {
        self.recipes.get(item).or_else(|| {
            self.recipes
                .values()
                .find(|recipe| recipe.alias_of.as_deref() == Some(item))
        })
    }

    /// Every recipe declaring itself an alternate producer of `item`.
    pub fn recipes_aliasing<'a>(&'a self, item: &'a str) -> impl Iterator<Item = &'a Recipe> + 'a {
        self.recipes
            .values()
            .filter(move |recipe| recipe.alias_of.as_deref() == Some(item))
    }

    /// Expand a gathering category (e.g. `"log"`) into concrete block names.
    ///
    /// Returns an empty list for anything that is not a category.
    pub fn resolve_alias(&self, category: &str) -> Vec<Item> {
        self.aliases.get(category).cloned().unwrap_or_default()
    }

    /// Whether `item` names a gathering category.
    pub fn is_category(&self, item: &str) -> bool {
        self.aliases.contains_key(item)
    }

    /// The generic-material rule for `item`, if it is one.
    pub fn generic(&self, item: &str) -> Option<&GenericRule> {
        self.generics.get(item)
    }

    /// Whether `item` is listed as a gatherable primitive.
    pub fn is_primitive(&self, item: &str) -> bool {
        self.primitives.contains(item)
    }

    /// Whether anything in the graph knows how to obtain `item`.
    pub fn is_known(&self, item: &str) -> bool {
        self.get_recipe(item).is_some()
            || self.is_primitive(item)
            || self.is_category(item)
            || self.generics.contains_key(item)
            || self
                .aliases
                .values()
                .any(|members| members.iter().any(|m| m == item))
    }

    /// Concrete item names whose holdings count toward `item`.
    ///
    /// A generic with a variant category counts every member plus the
    /// generic name itself, a category counts its members, and anything
    /// else counts only itself.
    pub fn variants_of<'a>(&'a self, item: &'a str) -> Vec<&'a str> {
        let category = match self.generics.get(item) {
            Some(rule) => rule.variants.as_deref(),
            None if self.is_category(item) => Some(item),
            None => None,
        };
        let mut names: Vec<&str> = category
            .and_then(|c| self.aliases.get(c))
            .map(|members| members.iter().map(String::as_str).collect())
            .unwrap_or_default();
        if !names.contains(&item) {
            names.push(item);
        }
        names
    }

    /// Sum `count_of` over every variant of `item`.
    pub fn count_with<F>(&self, item: &str, count_of: F) -> u32
    where
        F: Fn(&str) -> u32,
    {
        self.variants_of(item)
            .into_iter()
            .fold(0_u32, |total, name| total.saturating_add(count_of(name)))
    }

    /// The recipe used to craft a generic material from `source_item`.
    ///
    /// Category-sourced generics prefer a declared alternate producer that
    /// consumes `source_item` (e.g. `oak_planks` from `oak_log`);
    /// generic-sourced ones use the recipe declared under the generic's own
    /// name. Without a declared recipe, one is derived from the rule.
    pub fn generic_recipe(&self, rule: &GenericRule, source_item: &str) -> Recipe {
        let declared = match rule.source {
            GenericSource::Category(_) => self
                .recipes_aliasing(&rule.name)
                .find(|recipe| recipe.ingredients.contains_key(source_item)),
            GenericSource::Generic(_) => self.recipes.get(&rule.name),
        };
        declared.cloned().unwrap_or_else(|| Recipe {
            output_item: rule.name.clone(),
            output_count: rule.yield_per_unit,
            ingredients: IndexMap::from([(source_item.to_owned(), 1)]),
            needs_station: false,
            alias_of: None,
        })
    }

    /// Number of recipes in the graph.
    pub fn recipe_count(&self) -> usize {
        self.recipes.len()
    }
}

/// Check the recipe invariants: positive output, non-empty positive inputs.
fn validate_recipe(key: &str, recipe: &Recipe) -> Result<(), RecipeError> {
    if recipe.output_count == 0 {
        return Err(RecipeError::ZeroOutputCount {
            recipe: key.to_owned(),
        });
    }
    if recipe.ingredients.is_empty() {
        return Err(RecipeError::NoIngredients {
            recipe: key.to_owned(),
        });
    }
    if let Some((ingredient, _)) = recipe.ingredients.iter().find(|(_, amount)| **amount == 0) {
        return Err(RecipeError::ZeroIngredientAmount {
            recipe: key.to_owned(),
            ingredient: ingredient.clone(),
        });
    }
    Ok(())
}
