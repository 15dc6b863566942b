//! Error types for the engine binary.
//!
//! [`EngineError`] wraps every failure mode during startup so `main` can
//! propagate with `?`. Goal failures are not errors: they end up in goal
//! reports.

/// Top-level error for the engine binary.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: craftwork_core::ConfigError,
    },

    /// The recipe table could not be loaded or failed validation.
    #[error("recipe table error: {source}")]
    Recipes {
        /// The underlying recipe error.
        #[from]
        source: craftwork_recipes::RecipeError,
    },

    /// The `sim` or `goals` section could not be read.
    #[error("scenario error: {message}")]
    Scenario {
        /// Description of the failure.
        message: String,
    },
}
