//! Demo scenario: the simulated world's starting state and the goals to run.
//!
//! Both live in `craftwork-config.yaml` next to the engine settings, under
//! the `sim` and `goals` keys. Missing sections fall back to an empty world
//! and no goals.

use std::collections::BTreeMap;
use std::sync::Arc;

use craftwork_core::SimWorld;
use craftwork_recipes::RecipeGraph;
use craftwork_types::{Goal, GoalAction, Item};
use serde::Deserialize;

use crate::error::EngineError;

/// Everything the demo run needs beyond the engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Scenario {
    /// Starting state of the simulated world.
    #[serde(default)]
    pub sim: SimConfig,

    /// Goals enqueued in order at startup.
    #[serde(default)]
    pub goals: Vec<GoalSpec>,
}

/// Starting state of the simulated world.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct SimConfig {
    /// Items held at startup.
    #[serde(default)]
    pub inventory: BTreeMap<Item, u32>,

    /// Whether a crafting station is already placed nearby.
    #[serde(default)]
    pub station_placed: bool,

    /// Whether the placed station refuses to be used.
    #[serde(default)]
    pub station_unusable: bool,

    /// Items that can never be gathered.
    #[serde(default)]
    pub barren: Vec<Item>,

    /// Seed for the gather failure roll.
    #[serde(default)]
    pub seed: u64,

    /// Probability that any single gather call fails.
    #[serde(default)]
    pub gather_failure_chance: f64,
}

impl SimConfig {
    /// Build the simulated world described by this config.
    pub fn build_world(&self, graph: Arc<RecipeGraph>) -> SimWorld {
        let mut world = SimWorld::new(graph);
        for (item, count) in &self.inventory {
            world = world.with_item(item.as_str(), *count);
        }
        for item in &self.barren {
            world = world.with_barren(item.as_str());
        }
        if self.station_placed {
            world = world.with_station_placed();
        }
        if self.station_unusable {
            world = world.with_station_unusable();
        }
        if self.gather_failure_chance > 0.0 {
            world = world.with_gather_failures(self.seed, self.gather_failure_chance);
        }
        world
    }
}

/// One goal as written in the config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GoalSpec {
    /// `make` or `mine`.
    pub action: GoalAction,

    /// Item to obtain.
    pub target: Item,

    /// How many to hold once done.
    #[serde(default = "default_count")]
    pub count: u32,

    /// Who is asking.
    #[serde(default = "default_requester")]
    pub requester: String,
}

impl GoalSpec {
    /// Turn the spec into a fresh queued goal.
    pub fn to_goal(&self) -> Goal {
        Goal::new(
            self.action,
            self.target.as_str(),
            self.count,
            self.requester.as_str(),
        )
    }
}

impl Scenario {
    /// Extract the `sim` and `goals` sections from a full config document.
    pub fn parse(yaml: &str) -> Result<Self, EngineError> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let raw: serde_yml::Value = serde_yml::from_str(yaml).map_err(|e| EngineError::Scenario {
            message: format!("failed to parse config YAML: {e}"),
        })?;

        let sim = match raw.get("sim") {
            Some(value) => {
                serde_yml::from_value(value.clone()).map_err(|e| EngineError::Scenario {
                    message: format!("invalid sim section: {e}"),
                })?
            }
            None => SimConfig::default(),
        };
        let goals = match raw.get("goals") {
            Some(value) => {
                serde_yml::from_value(value.clone()).map_err(|e| EngineError::Scenario {
                    message: format!("invalid goals section: {e}"),
                })?
            }
            None => Vec::new(),
        };
        Ok(Self { sim, goals })
    }
}

const fn default_count() -> u32 {
    1
}

fn default_requester() -> String {
    String::from("console")
}
