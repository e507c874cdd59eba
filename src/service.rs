use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use rmcp::{
    ServerHandler,
    handler::server::{router::tool::ToolRouter, tool::Parameters},
    model::{ServerCapabilities, ServerInfo},
    tool, tool_handler, tool_router,
};

use crate::cache::{ResponseCache, constants};
use crate::hosting::GitHubClient;
use crate::readme::tools::{GetPackageReadmeParams, GetUsageExamplesParams, ReadmeTools};
use crate::registry::ConanCenterClient;
use crate::registry::tools::{
    GetRecipeInfoParams, ListRecipeVersionsParams, RegistryTools, SearchPackagesParams,
};

/// Upstream endpoints and TTL overrides, filled in from CLI flags and
/// environment in `main`.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub remote_url: String,
    pub index_url: String,
    pub search_ttl_secs: Option<u64>,
    pub readme_ttl_secs: Option<u64>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            remote_url: "https://center2.conan.io".to_string(),
            index_url:
                "https://raw.githubusercontent.com/conan-io/conan-center-index/master".to_string(),
            search_ttl_secs: None,
            readme_ttl_secs: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ConanCenterService {
    registry_tools: RegistryTools,
    readme_tools: ReadmeTools,
    tool_router: ToolRouter<Self>,
}

impl ConanCenterService {
    pub fn new(config: ServiceConfig) -> Result<Self> {
        let registry = Arc::new(ConanCenterClient::new(
            &config.remote_url,
            &config.index_url,
        )?);
        let hosting = Arc::new(GitHubClient::new()?);
        let cache = Arc::new(ResponseCache::new());

        let search_ttl = config
            .search_ttl_secs
            .map_or(constants::SEARCH_TTL, Duration::from_secs);
        let readme_ttl = config
            .readme_ttl_secs
            .map_or(constants::README_TTL, Duration::from_secs);

        Ok(Self {
            registry_tools: RegistryTools::new(registry.clone(), cache.clone(), search_ttl),
            readme_tools: ReadmeTools::new(registry, hosting, cache, readme_ttl),
            tool_router: Self::tool_router(),
        })
    }
}

#[tool_router]
impl ConanCenterService {
    // Registry tools
    #[tool(
        description = "Search ConanCenter for packages by name. Returns one match per package with its newest listed version. Use this first to discover exact package names before calling the other tools."
    )]
    pub async fn search_packages(&self, params: Parameters<SearchPackagesParams>) -> String {
        self.registry_tools.search_packages(params.0).await
    }

    #[tool(
        description = "Get registry metadata for a package: description, license, homepage, topics, published versions, and the latest revision of the resolved version. Omit the version to resolve the newest one."
    )]
    pub async fn get_recipe_info(&self, params: Parameters<GetRecipeInfoParams>) -> String {
        self.registry_tools.get_recipe_info(params.0).await
    }

    #[tool(
        description = "List all published versions of a package, newest first. Cheaper than get_recipe_info when only the version list is needed."
    )]
    pub async fn list_recipe_versions(
        &self,
        params: Parameters<ListRecipeVersionsParams>,
    ) -> String {
        self.registry_tools.list_recipe_versions(params.0).await
    }

    // README tools
    #[tool(
        description = "Fetch the package's README from its source repository, along with a short extracted description. The package's homepage must point at a GitHub repository."
    )]
    pub async fn get_package_readme(&self, params: Parameters<GetPackageReadmeParams>) -> String {
        self.readme_tools.get_package_readme(params.0).await
    }

    #[tool(
        description = "Extract structured, language-tagged code examples from the package's README, each with a title and nearby description. Optionally filter by language tag (e.g. 'cpp', 'cmake', 'bash')."
    )]
    pub async fn get_usage_examples(&self, params: Parameters<GetUsageExamplesParams>) -> String {
        self.readme_tools.get_usage_examples(params.0).await
    }

    #[tool(
        description = "Report how many responses are currently cached. Diagnostics only; entries expire on their own."
    )]
    pub async fn cache_status(&self) -> String {
        self.registry_tools.cache_status().await
    }
}

#[tool_handler(router = self.tool_router)]
impl ServerHandler for ConanCenterService {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: rmcp::model::Implementation::from_build_env(),
            capabilities: ServerCapabilities {
                tools: Some(Default::default()),
                ..Default::default()
            },
            instructions: Some(
                "MCP server for querying ConanCenter package metadata. \
                Workflow: search_packages to find exact package names, then get_recipe_info \
                for versions and registry metadata, get_package_readme for the full README, \
                or get_usage_examples for ready-to-use code snippets. Responses are cached \
                with per-operation TTLs, so repeated queries are cheap."
                    .to_string(),
            ),
            ..Default::default()
        }
    }
}
