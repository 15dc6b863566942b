//! Configuration loading and typed config structures.
//!
//! The canonical configuration lives in `craftwork-config.yaml` next to the
//! binary's working directory. Every section is optional; missing keys fall
//! back to the defaults defined here.

use std::path::{Path, PathBuf};

use craftwork_recipes::{RecipeError, RecipeGraph};
use serde::Deserialize;

/// Environment variable overriding `recipes.path`.
pub const RECIPES_ENV: &str = "CRAFTWORK_RECIPES";

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct CraftworkConfig {
    /// Plan resolution settings.
    #[serde(default)]
    pub planner: PlannerConfig,

    /// Goal scheduling settings.
    #[serde(default)]
    pub scheduler: SchedulerConfig,

    /// Where the recipe table comes from.
    #[serde(default)]
    pub recipes: RecipesConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CraftworkConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `CRAFTWORK_RECIPES` overrides `recipes.path` when set.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.recipes.apply_env_overrides();
        Ok(config)
    }
}

/// Plan resolution settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlannerConfig {
    /// Expansion stops once recursion goes deeper than this.
    #[serde(default = "default_max_depth")]
    pub max_depth: u32,

    /// Item crafted when a recipe needs a station and none is available.
    #[serde(default = "default_station_item")]
    pub station_item: String,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            station_item: default_station_item(),
        }
    }
}

/// Goal scheduling settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SchedulerConfig {
    /// Finished goal reports kept for status queries.
    #[serde(default = "default_history_limit")]
    pub history_limit: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            history_limit: default_history_limit(),
        }
    }
}

/// Recipe table source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RecipesConfig {
    /// YAML recipe table to load instead of the built-in one.
    #[serde(default)]
    pub path: Option<PathBuf>,
}

impl RecipesConfig {
    /// Override the table path with `CRAFTWORK_RECIPES` when set.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var(RECIPES_ENV) {
            if !val.is_empty() {
                self.path = Some(PathBuf::from(val));
            }
        }
    }

    /// Build the recipe graph from the configured table.
    pub fn load_graph(&self) -> Result<RecipeGraph, RecipeError> {
        match &self.path {
            Some(path) => RecipeGraph::from_file(path),
            None => RecipeGraph::standard(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

const fn default_max_depth() -> u32 {
    10
}

fn default_station_item() -> String {
    "crafting_table".to_owned()
}

const fn default_history_limit() -> usize {
    64
}

fn default_log_level() -> String {
    "info".to_owned()
}
