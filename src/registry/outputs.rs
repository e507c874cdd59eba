//! Output types for registry tools
//!
//! These types are used as the return values from registry tool methods.
//! They are serialized to JSON strings for the MCP protocol, and can be
//! deserialized in tests for type-safe validation.

use serde::{Deserialize, Serialize};

use super::{RecipeInfo, RecipeRef};

/// Output from the search_packages operation.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SearchPackagesOutput {
    pub query: String,
    pub matches: Vec<RecipeRef>,
    pub total: usize,
}

/// Output from the get_recipe_info operation.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct RecipeInfoOutput {
    #[serde(flatten)]
    pub recipe: RecipeInfo,
}

/// Output from the list_recipe_versions operation.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct RecipeVersionsOutput {
    pub name: String,
    /// Newest first, as listed by the recipe's config.yml.
    pub versions: Vec<String>,
}

/// Output from the cache_status operation.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct CacheStatusOutput {
    pub entries: usize,
    /// When the oldest still-stored response was cached.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub oldest_entry: Option<chrono::DateTime<chrono::Utc>>,
}
