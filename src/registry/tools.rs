use std::sync::Arc;
use std::time::Duration;

use rmcp::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::outputs::{CacheStatusOutput, RecipeInfoOutput, RecipeVersionsOutput, SearchPackagesOutput};
use super::{ConanCenterClient, RegistryError};
use crate::cache::{ResponseCache, constants};

/// Default and maximum result counts for package search.
const DEFAULT_SEARCH_LIMIT: usize = 20;
const MAX_SEARCH_LIMIT: usize = 100;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SearchPackagesParams {
    #[schemars(description = "Name or name fragment to search for (e.g. 'zlib', 'boost')")]
    pub query: String,
    #[schemars(description = "Maximum number of packages to return (default: 20, max: 100)")]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetRecipeInfoParams {
    #[schemars(description = "The name of the package")]
    pub name: String,
    #[schemars(description = "Optional version; defaults to the newest published version")]
    pub version: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ListRecipeVersionsParams {
    #[schemars(description = "The name of the package")]
    pub name: String,
}

#[derive(Debug, Clone)]
pub struct RegistryTools {
    registry: Arc<ConanCenterClient>,
    cache: Arc<ResponseCache>,
    search_ttl: Duration,
}

impl RegistryTools {
    pub fn new(
        registry: Arc<ConanCenterClient>,
        cache: Arc<ResponseCache>,
        search_ttl: Duration,
    ) -> Self {
        Self {
            registry,
            cache,
            search_ttl,
        }
    }

    pub async fn search_packages(&self, params: SearchPackagesParams) -> String {
        let limit = params
            .limit
            .unwrap_or(DEFAULT_SEARCH_LIMIT)
            .min(MAX_SEARCH_LIMIT);
        let key = constants::search_key(&params.query, limit);

        if let Some(hit) = self.cache.get(&key).await {
            return pretty(&hit);
        }

        match self.registry.search(params.query.trim(), limit).await {
            Ok(matches) => {
                let output = SearchPackagesOutput {
                    query: params.query.trim().to_string(),
                    total: matches.len(),
                    matches,
                };
                self.store_and_render(&key, self.search_ttl, &output).await
            }
            Err(e) => registry_error_json(&e),
        }
    }

    pub async fn get_recipe_info(&self, params: GetRecipeInfoParams) -> String {
        let name = constants::normalize_name(&params.name);
        let key = constants::recipe_key(&params.name, params.version.as_deref());

        if let Some(hit) = self.cache.get(&key).await {
            return pretty(&hit);
        }

        match self.registry.recipe(&name, params.version.as_deref()).await {
            Ok(recipe) => {
                let output = RecipeInfoOutput { recipe };
                self.store_and_render(&key, constants::RECIPE_TTL, &output)
                    .await
            }
            Err(e) => registry_error_json(&e),
        }
    }

    pub async fn list_recipe_versions(&self, params: ListRecipeVersionsParams) -> String {
        let name = constants::normalize_name(&params.name);
        let key = constants::versions_key(&params.name);

        if let Some(hit) = self.cache.get(&key).await {
            return pretty(&hit);
        }

        match self.registry.versions(&name).await {
            Ok(versions) => {
                let output = RecipeVersionsOutput {
                    name,
                    versions: versions.into_iter().map(|(version, _)| version).collect(),
                };
                self.store_and_render(&key, constants::RECIPE_TTL, &output)
                    .await
            }
            Err(e) => registry_error_json(&e),
        }
    }

    pub async fn cache_status(&self) -> String {
        let output = CacheStatusOutput {
            entries: self.cache.len().await,
            oldest_entry: self.cache.oldest_entry().await,
        };
        serde_json::to_string_pretty(&output)
            .unwrap_or_else(|e| format!(r#"{{"error": "Failed to serialize status: {e}"}}"#))
    }

    async fn store_and_render<T: Serialize>(&self, key: &str, ttl: Duration, output: &T) -> String {
        match serde_json::to_value(output) {
            Ok(value) => {
                self.cache.set(key, value.clone(), ttl).await;
                pretty(&value)
            }
            Err(e) => format!(r#"{{"error": "Failed to serialize response: {e}"}}"#),
        }
    }
}

pub(crate) fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// Map a registry failure to the error-JSON convention, keeping the
/// not-found cases recognizable.
pub(crate) fn registry_error_json(error: &RegistryError) -> String {
    let message = match error {
        RegistryError::RecipeNotFound { .. } | RegistryError::VersionNotFound { .. } => {
            error.to_string()
        }
        other => format!("Registry request failed: {other}"),
    };
    serde_json::json!({ "error": message }).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_plain_error_message() {
        let err = RegistryError::RecipeNotFound {
            name: "missing".to_string(),
        };
        let json: Value = serde_json::from_str(&registry_error_json(&err)).unwrap();
        assert_eq!(json["error"], "recipe not found: missing");
    }

    #[tokio::test]
    async fn test_cache_status_counts_entries() {
        let cache = Arc::new(ResponseCache::new());
        cache
            .set("k", serde_json::json!(1), Duration::from_secs(60))
            .await;
        let registry =
            Arc::new(ConanCenterClient::new("http://localhost:1", "http://localhost:1").unwrap());
        let tools = RegistryTools::new(registry, cache, Duration::from_secs(60));

        let status: CacheStatusOutput =
            serde_json::from_str(&tools.cache_status().await).unwrap();
        assert_eq!(status.entries, 1);
        assert!(status.oldest_entry.is_some());
    }

    #[tokio::test]
    async fn test_search_serves_cached_value_without_upstream() {
        let cache = Arc::new(ResponseCache::new());
        let canned = serde_json::json!({"query": "zlib", "matches": [], "total": 0});
        cache
            .set(
                &constants::search_key("zlib", DEFAULT_SEARCH_LIMIT),
                canned.clone(),
                Duration::from_secs(60),
            )
            .await;

        // Unroutable endpoint: any upstream call would error, so a clean
        // response proves the cache short-circuited the lookup.
        let registry =
            Arc::new(ConanCenterClient::new("http://localhost:1", "http://localhost:1").unwrap());
        let tools = RegistryTools::new(registry, cache, Duration::from_secs(60));

        let response = tools
            .search_packages(SearchPackagesParams {
                query: "zlib".to_string(),
                limit: None,
            })
            .await;
        let parsed: Value = serde_json::from_str(&response).unwrap();
        assert_eq!(parsed, canned);
    }
}
