//! Plan resolution.
//!
//! [`PlanResolver`] expands a requested item into an ordered list of gather
//! and craft steps by recursing through the recipe graph, reading live
//! holdings from an [`InventoryView`] at every node.
//!
//! The expansion is a tree: sibling branches that need the same ingredient
//! are planned independently, and surplus produced by one branch is never
//! credited to another. Held stock is different: the first branch that
//! relies on held units claims them, so a later sibling only sees what is
//! left. The crafting station is a world prerequisite rather than an
//! ingredient and is planned at most once per plan.
//!
//! Once expanded, the plan is walked against a [`Ledger`] of predicted
//! holdings to fill in each step's [`Step::required`]: the amount of the
//! step's item the plan expects to hold right after that step.

use std::collections::BTreeMap;
use std::sync::Arc;

use craftwork_recipes::{GenericRule, GenericSource, RecipeGraph};
use craftwork_types::{DepthExceeded, Item, Plan, Step, StepKind};
use tracing::{debug, trace, warn};

use crate::capability::InventoryView;
use crate::config::PlannerConfig;

/// Turns (item, quantity) requests into [`Plan`]s.
#[derive(Debug, Clone)]
pub struct PlanResolver {
    graph: Arc<RecipeGraph>,
    max_depth: u32,
    station_item: Item,
}

/// Mutable state threaded through one expansion.
struct Expansion<'a> {
    inventory: &'a dyn InventoryView,
    /// Live holdings not yet claimed by an earlier branch.
    unclaimed: Ledger<'a>,
    steps: Vec<Step>,
    station_planned: bool,
    depth_exceeded: Option<DepthExceeded>,
}

/// Predicted holdings while walking a plan, layered over the live
/// inventory.
struct Ledger<'a> {
    graph: &'a RecipeGraph,
    inventory: &'a dyn InventoryView,
    counts: BTreeMap<Item, u32>,
}

impl<'a> Ledger<'a> {
    const fn new(graph: &'a RecipeGraph, inventory: &'a dyn InventoryView) -> Self {
        Self {
            graph,
            inventory,
            counts: BTreeMap::new(),
        }
    }

    fn held(&self, name: &str) -> u32 {
        self.counts
            .get(name)
            .copied()
            .unwrap_or_else(|| self.inventory.count_of(name))
    }

    fn total(&self, item: &str) -> u32 {
        self.graph.count_with(item, |name| self.held(name))
    }

    fn add(&mut self, name: &str, amount: u32) {
        let held = self.held(name);
        self.counts.insert(name.to_owned(), held.saturating_add(amount));
    }

    fn take(&mut self, item: &str, amount: u32) {
        let graph = self.graph;
        let mut remaining = amount;
        for name in graph.variants_of(item) {
            if remaining == 0 {
                break;
            }
            let held = self.held(name);
            let taken = remaining.min(held);
            self.counts.insert(name.to_owned(), held.saturating_sub(taken));
            remaining = remaining.saturating_sub(taken);
        }
    }

    fn apply(&mut self, step: &Step) {
        match (step.kind, &step.recipe) {
            (StepKind::Craft, Some(recipe)) => {
                let crafts = recipe.crafts_needed(step.count);
                for (ingredient, per_craft) in &recipe.ingredients {
                    self.take(ingredient, per_craft.saturating_mul(crafts));
                }
                self.add(&recipe.output_item, recipe.output_count.saturating_mul(crafts));
            }
            _ => {
                let target = step
                    .gather_targets()
                    .into_iter()
                    .next()
                    .unwrap_or(step.item.as_str());
                self.add(target, step.count);
            }
        }
    }
}

impl PlanResolver {
    /// Create a resolver over `graph`.
    pub fn new(graph: Arc<RecipeGraph>, config: &PlannerConfig) -> Self {
        Self {
            graph,
            max_depth: config.max_depth,
            station_item: config.station_item.clone(),
        }
    }

    /// The recipe graph this resolver consults.
    pub fn graph(&self) -> &RecipeGraph {
        &self.graph
    }

    /// Units of `item` currently held, counting every variant of a generic
    /// material or gathering category.
    pub fn have(&self, inventory: &dyn InventoryView, item: &str) -> u32 {
        self.graph.count_with(item, |name| inventory.count_of(name))
    }

    /// Resolve a plan that leaves at least `quantity` of `item` held.
    ///
    /// Never fails: an unsatisfied primitive simply becomes a gather step,
    /// and runaway recursion is reported through [`Plan::depth_exceeded`].
    /// A plan with that signal set must not be executed.
    pub fn resolve(&self, item: &str, quantity: u32, inventory: &dyn InventoryView) -> Plan {
        let mut cx = Expansion {
            inventory,
            unclaimed: Ledger::new(&self.graph, inventory),
            steps: Vec::new(),
            station_planned: false,
            depth_exceeded: None,
        };
        self.expand(&mut cx, item, quantity, 0);

        let mut plan = Plan::new(item, quantity);
        plan.steps = cx.steps;
        plan.depth_exceeded = cx.depth_exceeded;
        self.fill_requirements(&mut plan.steps, inventory);
        debug!(
            plan_id = %plan.id,
            target = item,
            quantity,
            steps = plan.len(),
            depth_exceeded = plan.depth_exceeded.is_some(),
            "Plan resolved"
        );
        plan
    }

    /// Resolve a plan that only gathers `item`, never crafting it.
    pub fn resolve_mine(&self, item: &str, quantity: u32, inventory: &dyn InventoryView) -> Plan {
        let mut plan = Plan::new(item, quantity);
        let have = self.have(inventory, item);
        if have < quantity {
            plan.steps
                .push(self.gather_step(item, quantity.saturating_sub(have)));
        }
        self.fill_requirements(&mut plan.steps, inventory);
        debug!(plan_id = %plan.id, target = item, quantity, have, "Mine plan resolved");
        plan
    }

    fn expand(&self, cx: &mut Expansion<'_>, item: &str, quantity: u32, depth: u32) {
        if cx.depth_exceeded.is_some() {
            return;
        }
        if depth > self.max_depth {
            warn!(item, depth, max_depth = self.max_depth, "Recipe expansion too deep");
            cx.depth_exceeded = Some(DepthExceeded {
                item: item.to_owned(),
                depth,
            });
            return;
        }

        let have = cx.unclaimed.total(item);
        if have >= quantity {
            trace!(item, quantity, have, depth, "Already satisfied");
            cx.unclaimed.take(item, quantity);
            return;
        }
        cx.unclaimed.take(item, have);
        let needed = quantity.saturating_sub(have);

        if let Some(rule) = self.graph.generic(item) {
            self.expand_generic(cx, rule, needed, depth);
            return;
        }

        let Some(recipe) = self.graph.get_recipe(item) else {
            trace!(item, needed, depth, "Gather");
            cx.steps.push(self.gather_step(item, needed));
            return;
        };

        let crafts = recipe.crafts_needed(needed);
        let next = depth.saturating_add(1);

        if recipe.needs_station && !cx.station_planned && !cx.inventory.station_available() {
            cx.station_planned = true;
            trace!(item, station = %self.station_item, "Planning station");
            self.expand(cx, &self.station_item, 1, next);
        }

        for (ingredient, per_craft) in &recipe.ingredients {
            self.expand(cx, ingredient, per_craft.saturating_mul(crafts), next);
        }

        if cx.depth_exceeded.is_some() {
            return;
        }
        trace!(item, needed, crafts, depth, "Craft");
        cx.steps.push(Step::craft(item, needed, recipe.clone()));
    }

    /// Expand a generic material (`planks`, `stick`).
    ///
    /// Category-sourced generics gather a concrete member and craft from it
    /// without checking holdings of that member first; generic-sourced ones
    /// recurse through the full algorithm.
    fn expand_generic(
        &self,
        cx: &mut Expansion<'_>,
        rule: &GenericRule,
        needed: u32,
        depth: u32,
    ) {
        let units = rule.units_needed(needed);
        let source_item = match &rule.source {
            GenericSource::Category(category) => {
                let concrete = self.concrete_member(cx.inventory, category);
                cx.steps.push(Step::gather(concrete.as_str(), units));
                concrete
            }
            GenericSource::Generic(source) => {
                self.expand(cx, source, units, depth.saturating_add(1));
                if cx.depth_exceeded.is_some() {
                    return;
                }
                source.clone()
            }
        };
        let recipe = self.graph.generic_recipe(rule, &source_item);
        trace!(item = %rule.name, needed, units, source = %source_item, "Craft generic");
        cx.steps
            .push(Step::craft(rule.name.as_str(), needed, recipe));
    }

    /// Pick the category member to gather: the one held in the largest
    /// amount, or the first member when none is held.
    fn concrete_member(&self, inventory: &dyn InventoryView, category: &str) -> Item {
        let members = self.graph.resolve_alias(category);
        let mut best: Option<(&Item, u32)> = None;
        for member in &members {
            let held = inventory.count_of(member);
            if held > best.map_or(0, |(_, most)| most) {
                best = Some((member, held));
            }
        }
        best.map(|(member, _)| member.clone())
            .or_else(|| members.first().cloned())
            .unwrap_or_else(|| category.to_owned())
    }

    /// Record on every step the holdings of its item the plan expects right
    /// after it runs.
    fn fill_requirements(&self, steps: &mut [Step], inventory: &dyn InventoryView) {
        let mut ledger = Ledger::new(&self.graph, inventory);
        for step in steps {
            ledger.apply(step);
            step.required = ledger.total(&step.item);
        }
    }

    /// A gather step, listing concrete sources when `item` is a category.
    fn gather_step(&self, item: &str, count: u32) -> Step {
        if self.graph.is_category(item) {
            Step::gather_from(item, count, self.graph.resolve_alias(item))
        } else {
            Step::gather(item, count)
        }
    }
}
