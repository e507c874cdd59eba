//! # Hosting Module
//!
//! Source-host client: raw README retrieval and repository existence checks
//! against GitHub, where nearly all ConanCenter recipes point their homepage.

use std::env;

use anyhow::{Context, Result, bail};

const RAW_BASE: &str = "https://raw.githubusercontent.com";
const API_BASE: &str = "https://api.github.com";

/// Branches tried, in order, when fetching a raw README.
const README_REFS: &[&str] = &["HEAD", "main", "master"];

/// Extract `(owner, repo)` from a GitHub repository URL.
///
/// Accepts http/https, an optional `www.` prefix, a trailing `.git`, and
/// extra path segments after the repo name. Anything not on github.com is
/// `None` — those packages simply have no reachable README.
pub fn parse_github_url(url: &str) -> Option<(String, String)> {
    let rest = url
        .strip_prefix("https://")
        .or_else(|| url.strip_prefix("http://"))?;
    let rest = rest.strip_prefix("www.").unwrap_or(rest);
    let rest = rest.strip_prefix("github.com/")?;

    let mut segments = rest.split('/').filter(|s| !s.is_empty());
    let owner = segments.next()?;
    let repo = segments.next()?.trim_end_matches(".git");
    if owner.is_empty() || repo.is_empty() {
        return None;
    }
    Some((owner.to_string(), repo.to_string()))
}

#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: reqwest::Client,
    token: Option<String>,
}

impl GitHubClient {
    pub fn new() -> Result<Self> {
        let user_agent = format!(
            "{}/{}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        );
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .context("Failed to create HTTP client")?;

        // Optional token raises the unauthenticated rate limit.
        let token = env::var("GITHUB_TOKEN").ok();
        if token.is_none() {
            tracing::debug!("No GITHUB_TOKEN found, using unauthenticated access");
        }

        Ok(Self { client, token })
    }

    /// Fetch a repository's raw `README.md`, trying a few branch refs.
    /// Absence on every candidate is a normal `Ok(None)`, not an error.
    pub async fn fetch_readme(&self, owner: &str, repo: &str) -> Result<Option<String>> {
        for branch in README_REFS {
            let url = format!("{RAW_BASE}/{owner}/{repo}/{branch}/README.md");
            let response = self
                .client
                .get(&url)
                .send()
                .await
                .with_context(|| format!("Failed to fetch README from {url}"))?;

            if response.status() == reqwest::StatusCode::NOT_FOUND {
                continue;
            }
            if !response.status().is_success() {
                bail!(
                    "Failed to fetch README for {owner}/{repo}: HTTP {}",
                    response.status()
                );
            }
            let text = response.text().await.context("Failed to read README body")?;
            return Ok(Some(text));
        }
        Ok(None)
    }

    /// Whether `owner/repo` exists (and is visible to us) on GitHub.
    pub async fn repo_exists(&self, owner: &str, repo: &str) -> Result<bool> {
        let url = format!("{API_BASE}/repos/{owner}/{repo}");
        let mut request = self.client.get(&url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .await
            .with_context(|| format!("Failed to query {url}"))?;

        let status = response.status();
        if status.is_success() {
            Ok(true)
        } else if status == reqwest::StatusCode::NOT_FOUND {
            Ok(false)
        } else {
            bail!("Repository check for {owner}/{repo} failed: HTTP {status}")
        }
    }
}
