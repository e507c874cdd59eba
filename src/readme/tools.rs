use std::sync::Arc;
use std::time::Duration;

use rmcp::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};

use super::extractor::{UsageExample, extract_package_description, parse_usage_examples};
use super::outputs::{PackageReadmeOutput, UsageExamplesOutput};
use crate::cache::{ResponseCache, constants};
use crate::hosting::{GitHubClient, parse_github_url};
use crate::registry::ConanCenterClient;
use crate::registry::tools::{pretty, registry_error_json};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetPackageReadmeParams {
    #[schemars(description = "The name of the package")]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct GetUsageExamplesParams {
    #[schemars(description = "The name of the package")]
    pub name: String,
    #[schemars(
        description = "Optional language tag to filter by (e.g. 'cpp', 'cmake', 'bash')"
    )]
    pub language: Option<String>,
}

/// A README resolved through the registry to its hosting repository.
struct FetchedReadme {
    repository: String,
    homepage: String,
    text: String,
}

#[derive(Debug, Clone)]
pub struct ReadmeTools {
    registry: Arc<ConanCenterClient>,
    hosting: Arc<GitHubClient>,
    cache: Arc<ResponseCache>,
    readme_ttl: Duration,
}

impl ReadmeTools {
    pub fn new(
        registry: Arc<ConanCenterClient>,
        hosting: Arc<GitHubClient>,
        cache: Arc<ResponseCache>,
        readme_ttl: Duration,
    ) -> Self {
        Self {
            registry,
            hosting,
            cache,
            readme_ttl,
        }
    }

    pub async fn get_package_readme(&self, params: GetPackageReadmeParams) -> String {
        let name = constants::normalize_name(&params.name);
        let key = constants::readme_key(&params.name);

        if let Some(hit) = self.cache.get(&key).await {
            return pretty(&hit);
        }

        let fetched = match self.fetch_readme(&name).await {
            Ok(fetched) => fetched,
            Err(error_json) => return error_json,
        };

        let output = PackageReadmeOutput {
            name,
            repository: fetched.repository,
            homepage: fetched.homepage,
            description: extract_package_description(&fetched.text),
            readme: fetched.text,
        };
        self.store_and_render(&key, &output).await
    }

    pub async fn get_usage_examples(&self, params: GetUsageExamplesParams) -> String {
        let name = constants::normalize_name(&params.name);
        let key = constants::examples_key(&params.name, params.language.as_deref());

        if let Some(hit) = self.cache.get(&key).await {
            return pretty(&hit);
        }

        let fetched = match self.fetch_readme(&name).await {
            Ok(fetched) => fetched,
            Err(error_json) => return error_json,
        };

        let examples = parse_usage_examples(&fetched.text);
        let language = params
            .language
            .as_deref()
            .map(|l| l.trim().to_lowercase());
        let examples = filter_by_language(examples, language.as_deref());

        let output = UsageExamplesOutput {
            name,
            repository: fetched.repository,
            language,
            total: examples.len(),
            examples,
        };
        self.store_and_render(&key, &output).await
    }

    /// Resolve a package to its GitHub repository and pull the raw README.
    /// Errors come back pre-rendered as the tool-layer error JSON.
    async fn fetch_readme(&self, name: &str) -> Result<FetchedReadme, String> {
        let recipe = self
            .registry
            .recipe(name, None)
            .await
            .map_err(|e| registry_error_json(&e))?;

        let Some(homepage) = recipe.homepage else {
            return Err(error_json(format!(
                "Recipe {name} does not declare a homepage"
            )));
        };
        let Some((owner, repo)) = parse_github_url(&homepage) else {
            return Err(error_json(format!(
                "Homepage for {name} is not a GitHub repository: {homepage}"
            )));
        };

        let exists = self
            .hosting
            .repo_exists(&owner, &repo)
            .await
            .map_err(|e| error_json(format!("Repository check failed: {e}")))?;
        if !exists {
            return Err(error_json(format!(
                "Repository {owner}/{repo} does not exist"
            )));
        }

        let text = self
            .hosting
            .fetch_readme(&owner, &repo)
            .await
            .map_err(|e| error_json(format!("README fetch failed: {e}")))?;
        let Some(text) = text else {
            return Err(error_json(format!("No README found in {owner}/{repo}")));
        };

        Ok(FetchedReadme {
            repository: format!("{owner}/{repo}"),
            homepage,
            text,
        })
    }

    async fn store_and_render<T: Serialize>(&self, key: &str, output: &T) -> String {
        match serde_json::to_value(output) {
            Ok(value) => {
                self.cache.set(key, value.clone(), self.readme_ttl).await;
                pretty(&value)
            }
            Err(e) => format!(r#"{{"error": "Failed to serialize response: {e}"}}"#),
        }
    }
}

fn error_json(message: String) -> String {
    serde_json::json!({ "error": message }).to_string()
}

/// Keep only examples whose language tag matches the requested one.
fn filter_by_language(
    examples: Vec<UsageExample>,
    language: Option<&str>,
) -> Vec<UsageExample> {
    match language {
        Some(lang) => examples
            .into_iter()
            .filter(|e| e.language == lang)
            .collect(),
        None => examples,
    }
}
