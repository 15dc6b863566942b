//! Demo binary for the Craftwork planning engine.
//!
//! Wires the recipe graph, a simulated world and the goal scheduler
//! together, runs the goals listed in `craftwork-config.yaml`, and logs a
//! report for each one.
//!
//! # Startup Sequence
//!
//! 1. Load configuration from `craftwork-config.yaml`
//! 2. Initialize structured logging (tracing)
//! 3. Build the recipe graph (built-in or from `recipes.path`)
//! 4. Build the simulated world from the `sim` section
//! 5. Enqueue the `goals` and wait for the queue to drain
//! 6. Log the results

mod error;
mod scenario;

use std::path::Path;
use std::sync::Arc;

use craftwork_core::config::LoggingConfig;
use craftwork_core::{CraftworkConfig, Scheduler, TracingNotifier};
use craftwork_types::StepStatus;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::error::EngineError;
use crate::scenario::Scenario;

/// Path of the configuration file, relative to the working directory.
const CONFIG_PATH: &str = "craftwork-config.yaml";

/// Application entry point.
///
/// # Errors
///
/// Returns an error if configuration, the recipe table, or the scenario
/// cannot be loaded. Failed goals are reported, not returned.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // 1. Load configuration.
    let (config, scenario) = load_config()?;

    // 2. Initialize structured logging.
    init_logging(&config.logging);
    info!("craftwork-engine starting");
    info!(
        max_depth = config.planner.max_depth,
        station_item = %config.planner.station_item,
        history_limit = config.scheduler.history_limit,
        goals = scenario.goals.len(),
        "Configuration loaded"
    );

    // 3. Build the recipe graph.
    let graph = Arc::new(config.recipes.load_graph().map_err(EngineError::from)?);
    info!(
        recipes = graph.recipe_count(),
        source = %config
            .recipes
            .path
            .as_deref()
            .map_or_else(|| String::from("built-in"), |p| p.display().to_string()),
        "Recipe graph ready"
    );

    // 4. Build the simulated world.
    let world = Arc::new(scenario.sim.build_world(Arc::clone(&graph)));
    info!(holdings = ?world.holdings(), "Simulated world ready");

    // 5. Run the goals.
    let scheduler = Scheduler::for_world(
        graph,
        Arc::clone(&world),
        Arc::new(TracingNotifier),
        &config,
    );
    for spec in &scenario.goals {
        scheduler.enqueue(spec.to_goal()).await;
    }
    scheduler.wait_idle().await;

    // 6. Log the results.
    let history = scheduler.history().await;
    let completed = history.iter().filter(|r| r.is_success()).count();
    for report in &history {
        let line = format!(
            "{}: {} ({} done, {} skipped)",
            report.goal,
            if report.is_success() { "completed" } else { "failed" },
            report.count_steps(StepStatus::Done),
            report.count_steps(StepStatus::Skipped),
        );
        if report.is_success() {
            info!(goal_id = %report.goal.id, "{line}");
        } else {
            warn!(
                goal_id = %report.goal.id,
                diagnostic = report.diagnostic.as_deref().unwrap_or(""),
                "{line}"
            );
        }
    }

    let status = scheduler.status().await;
    info!(
        completed,
        failed = history.len().saturating_sub(completed),
        steps_completed = status.steps_completed,
        status = %serde_json::to_string(&status).unwrap_or_default(),
        holdings = ?world.holdings(),
        "craftwork-engine finished"
    );

    Ok(())
}

/// Initialize the tracing subscriber.
///
/// `RUST_LOG` takes precedence over `logging.level`.
fn init_logging(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.level));
    if logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    }
}

/// Load engine configuration and the demo scenario from
/// `craftwork-config.yaml`.
///
/// Falls back to defaults (no goals) when the file does not exist.
fn load_config() -> Result<(CraftworkConfig, Scenario), EngineError> {
    let config_path = Path::new(CONFIG_PATH);
    if !config_path.exists() {
        return Ok((CraftworkConfig::parse("")?, Scenario::default()));
    }

    let contents = std::fs::read_to_string(config_path).map_err(|e| EngineError::Scenario {
        message: format!("failed to read {CONFIG_PATH}: {e}"),
    })?;
    let config = CraftworkConfig::parse(&contents)?;
    let scenario = Scenario::parse(&contents)?;
    Ok((config, scenario))
}
