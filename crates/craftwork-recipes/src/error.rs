//! Error types for the `craftwork-recipes` crate.
//!
//! Every invariant violation found while loading a recipe table is reported
//! through [`RecipeError`] rather than discovered later during planning.

/// Errors that can occur while building a [`RecipeGraph`].
///
/// [`RecipeGraph`]: crate::RecipeGraph
#[derive(Debug, thiserror::Error)]
pub enum RecipeError {
    /// A recipe declares an output count of zero.
    #[error("recipe {recipe} produces zero units")]
    ZeroOutputCount {
        /// The offending recipe's table key.
        recipe: String,
    },

    /// A recipe has no ingredients.
    #[error("recipe {recipe} has no ingredients")]
    NoIngredients {
        /// The offending recipe's table key.
        recipe: String,
    },

    /// A recipe lists an ingredient with an amount of zero.
    #[error("recipe {recipe} lists zero of ingredient {ingredient}")]
    ZeroIngredientAmount {
        /// The offending recipe's table key.
        recipe: String,
        /// The ingredient with a zero amount.
        ingredient: String,
    },

    /// A generic material yields zero outputs per source unit.
    #[error("generic material {name} has a zero yield")]
    ZeroYield {
        /// The generic material name.
        name: String,
    },

    /// A generic material draws from a category or generic that does not exist.
    #[error("generic material {name} draws from unknown source {source_name}")]
    UnknownGenericSource {
        /// The generic material name.
        name: String,
        /// The missing category or generic.
        source_name: String,
    },

    /// A generic material counts variants from a category that does not exist.
    #[error("generic material {name} counts variants of unknown category {category}")]
    UnknownVariantCategory {
        /// The generic material name.
        name: String,
        /// The missing category.
        category: String,
    },

    /// An alias category has no members.
    #[error("alias category {category} is empty")]
    EmptyCategory {
        /// The empty category.
        category: String,
    },

    /// Failed to read a recipe file from disk.
    #[error("failed to read recipe file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse recipe YAML.
    #[error("failed to parse recipe YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },
}

impl From<serde_yml::Error> for RecipeError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}
