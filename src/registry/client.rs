//! ConanCenter registry client.
//!
//! Two upstream surfaces back this client: the ConanCenter remote REST API
//! (reference search and recipe revisions) and the raw files of the
//! conan-center-index repository (`config.yml` for the version list,
//! `conanfile.py` for descriptive attributes). The index files are scanned
//! with the same line-oriented regex heuristics as the README extractor
//! rather than parsed as YAML or Python; the attributes of interest are
//! single-line assignments in practice.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;
use thiserror::Error;

use super::{RecipeInfo, RecipeRef, RevisionInfo, VersionInfo};

/// Errors a registry lookup can surface. Not-found conditions are
/// distinguishable from transport failures so callers can report an unknown
/// package differently from a flaky upstream.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("recipe not found: {name}")]
    RecipeNotFound { name: String },
    #[error("version {version} not found for recipe {name}")]
    VersionNotFound { name: String, version: String },
    #[error("upstream returned HTTP {status}")]
    Status { status: reqwest::StatusCode },
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("malformed upstream payload: {0}")]
    Malformed(String),
}

/// Version entry in `config.yml`: a quoted or bare key indented one level.
static CONFIG_VERSION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s{2}"?([^"\s:]+)"?:\s*$"#).unwrap());

/// `folder:` value below a version entry.
static CONFIG_FOLDER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^\s+folder:\s*"?([^"\s]+)"?\s*$"#).unwrap());

/// Single-line string attribute in a conanfile, e.g. `description = "..."`.
static CONANFILE_ATTR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"^\s*(description|license|homepage|author)\s*=\s*(.+?)\s*$"#).unwrap()
});

/// `topics = (...)` attribute line.
static CONANFILE_TOPICS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*topics\s*=\s*(.+?)\s*$").unwrap());

/// Quoted string literals inside an attribute value.
static QUOTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""([^"]*)"|'([^']*)'"#).unwrap());

#[derive(Debug, Deserialize)]
struct SearchResults {
    results: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct RevisionsResponse {
    revisions: Vec<RevisionInfo>,
}

/// Descriptive attributes scanned out of a conanfile.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct ConanfileAttributes {
    pub description: Option<String>,
    pub license: Option<String>,
    pub homepage: Option<String>,
    pub author: Option<String>,
    pub topics: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ConanCenterClient {
    client: reqwest::Client,
    remote_url: String,
    index_url: String,
}

impl ConanCenterClient {
    pub fn new(remote_url: &str, index_url: &str) -> Result<Self, RegistryError> {
        let user_agent = format!(
            "{}/{}",
            env!("CARGO_PKG_NAME"),
            env!("CARGO_PKG_VERSION")
        );
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()?;

        Ok(Self {
            client,
            remote_url: remote_url.trim_end_matches('/').to_string(),
            index_url: index_url.trim_end_matches('/').to_string(),
        })
    }

    /// Search the remote for recipe references matching `query`.
    ///
    /// The remote returns one `name/version` entry per published version;
    /// results are collapsed to one reference per recipe name, keeping the
    /// last listed version, and truncated to `limit`.
    pub async fn search(&self, query: &str, limit: usize) -> Result<Vec<RecipeRef>, RegistryError> {
        let url = format!("{}/v2/conans/search", self.remote_url);
        tracing::debug!("searching remote for {query:?}");

        let response = self
            .client
            .get(&url)
            .query(&[("q", query)])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(RegistryError::Status {
                status: response.status(),
            });
        }
        let results: SearchResults = response.json().await?;

        let mut refs: Vec<RecipeRef> = Vec::new();
        for entry in results.results {
            let Some((name, version)) = entry.split_once('/') else {
                return Err(RegistryError::Malformed(format!(
                    "search result without a version: {entry}"
                )));
            };
            // Strip any user/channel suffix older remotes append.
            let version = version.split('@').next().unwrap_or(version);

            match refs.iter_mut().find(|r| r.name == name) {
                Some(existing) => existing.version = version.to_string(),
                None => refs.push(RecipeRef {
                    name: name.to_string(),
                    version: version.to_string(),
                }),
            }
        }

        refs.truncate(limit);
        Ok(refs)
    }

    /// List the published versions of a recipe in config.yml order
    /// (newest first), with the index folder each one lives in.
    pub async fn versions(&self, name: &str) -> Result<Vec<(String, String)>, RegistryError> {
        let url = format!("{}/recipes/{name}/config.yml", self.index_url);
        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(RegistryError::RecipeNotFound {
                name: name.to_string(),
            });
        }
        if !response.status().is_success() {
            return Err(RegistryError::Status {
                status: response.status(),
            });
        }

        let body = response.text().await?;
        let versions = scan_config_versions(&body);
        if versions.is_empty() {
            return Err(RegistryError::Malformed(format!(
                "config.yml for {name} lists no versions"
            )));
        }
        Ok(versions)
    }

    /// Fetch the full registry record for a recipe.
    ///
    /// Resolves to the requested version when one is given (erroring with
    /// [`RegistryError::VersionNotFound`] if the recipe does not publish it),
    /// otherwise to the newest version in config.yml. Revision info is
    /// fetched for the resolved version only; a revision lookup failure is
    /// logged and degrades to an absent revision rather than failing the
    /// whole record.
    pub async fn recipe(
        &self,
        name: &str,
        version: Option<&str>,
    ) -> Result<RecipeInfo, RegistryError> {
        let versions = self.versions(name).await?;

        let resolved = match version {
            Some(v) => {
                let v = v.trim();
                if !versions.iter().any(|(ver, _)| ver == v) {
                    return Err(RegistryError::VersionNotFound {
                        name: name.to_string(),
                        version: v.to_string(),
                    });
                }
                v.to_string()
            }
            None => versions[0].0.clone(),
        };
        let folder = versions
            .iter()
            .find(|(ver, _)| *ver == resolved)
            .map(|(_, folder)| folder.clone())
            .unwrap_or_else(|| "all".to_string());

        let attrs = match self.fetch_conanfile(name, &folder).await {
            Ok(Some(text)) => scan_conanfile_attributes(&text),
            Ok(None) => ConanfileAttributes::default(),
            Err(e) => {
                tracing::warn!("failed to fetch conanfile for {name}: {e}");
                ConanfileAttributes::default()
            }
        };

        let revision = match self.latest_revision(name, &resolved).await {
            Ok(revision) => revision,
            Err(e) => {
                tracing::warn!("failed to fetch revisions for {name}/{resolved}: {e}");
                None
            }
        };

        let mut version_map = BTreeMap::new();
        for (ver, folder) in versions {
            let info = VersionInfo {
                folder,
                revision: if ver == resolved { revision.clone() } else { None },
            };
            version_map.insert(ver, info);
        }

        Ok(RecipeInfo {
            name: name.to_string(),
            resolved_version: resolved,
            versions: version_map,
            description: attrs.description,
            license: attrs.license,
            author: attrs.author,
            homepage: attrs.homepage,
            topics: attrs.topics,
        })
    }

    /// Newest revision of a specific recipe version, if the remote knows one.
    pub async fn latest_revision(
        &self,
        name: &str,
        version: &str,
    ) -> Result<Option<RevisionInfo>, RegistryError> {
        let url = format!("{}/v2/conans/{name}/{version}/revisions", self.remote_url);
        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(RegistryError::Status {
                status: response.status(),
            });
        }

        let parsed: RevisionsResponse = response.json().await?;
        // The remote lists revisions newest first.
        Ok(parsed.revisions.into_iter().next())
    }

    async fn fetch_conanfile(
        &self,
        name: &str,
        folder: &str,
    ) -> Result<Option<String>, RegistryError> {
        let url = format!("{}/recipes/{name}/{folder}/conanfile.py", self.index_url);
        let response = self.client.get(&url).send().await?;

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(RegistryError::Status {
                status: response.status(),
            });
        }
        Ok(Some(response.text().await?))
    }
}

/// Scan a conan-center-index `config.yml` for its `(version, folder)` pairs,
/// preserving file order.
pub fn scan_config_versions(config: &str) -> Vec<(String, String)> {
    let mut versions: Vec<(String, String)> = Vec::new();
    for line in config.lines() {
        if let Some(caps) = CONFIG_VERSION_RE.captures(line) {
            versions.push((caps[1].to_string(), "all".to_string()));
        } else if let Some(caps) = CONFIG_FOLDER_RE.captures(line)
            && let Some(last) = versions.last_mut()
        {
            last.1 = caps[1].to_string();
        }
    }
    versions
}

/// Scan a conanfile for its single-line descriptive attributes.
pub fn scan_conanfile_attributes(conanfile: &str) -> ConanfileAttributes {
    let mut attrs = ConanfileAttributes::default();

    for line in conanfile.lines() {
        if let Some(caps) = CONANFILE_ATTR_RE.captures(line) {
            let value = joined_string_literals(&caps[2]);
            if value.is_empty() {
                continue;
            }
            match &caps[1] {
                "description" => attrs.description.get_or_insert(value),
                "license" => attrs.license.get_or_insert(value),
                "homepage" => attrs.homepage.get_or_insert(value),
                "author" => attrs.author.get_or_insert(value),
                _ => continue,
            };
        } else if let Some(caps) = CONANFILE_TOPICS_RE.captures(line)
            && attrs.topics.is_empty()
        {
            attrs.topics = string_literals(&caps[1]);
        }
    }

    attrs
}

/// All quoted string literals in an attribute value, in order.
fn string_literals(value: &str) -> Vec<String> {
    QUOTED_RE
        .captures_iter(value)
        .map(|c| {
            c.get(1)
                .or_else(|| c.get(2))
                .map_or(String::new(), |m| m.as_str().to_string())
        })
        .filter(|s| !s.is_empty())
        .collect()
}

/// Quoted literals joined into one display string, e.g. a license tuple
/// `("MIT", "BSD-3-Clause")` becomes `MIT, BSD-3-Clause`.
fn joined_string_literals(value: &str) -> String {
    string_literals(value).join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG_YML: &str = r#"versions:
  "1.3.1":
    folder: all
  "1.2.13":
    folder: all
  "1.2.11":
    folder: legacy
"#;

    const CONANFILE: &str = r#"
from conan import ConanFile

class ZlibConan(ConanFile):
    name = "zlib"
    description = "A massively spiffy yet delicately unobtrusive compression library"
    license = "Zlib"
    homepage = "https://zlib.net"
    url = "https://github.com/conan-io/conan-center-index"
    topics = ("zlib", "compression")
    settings = "os", "arch", "compiler", "build_type"
"#;

    #[test]
    fn test_config_versions_preserve_order_and_folders() {
        let versions = scan_config_versions(CONFIG_YML);
        assert_eq!(
            versions,
            vec![
                ("1.3.1".to_string(), "all".to_string()),
                ("1.2.13".to_string(), "all".to_string()),
                ("1.2.11".to_string(), "legacy".to_string()),
            ]
        );
    }

    #[test]
    fn test_config_scan_ignores_top_level_keys() {
        let versions = scan_config_versions("versions:\n");
        assert!(versions.is_empty());
    }

    #[test]
    fn test_conanfile_attribute_scan() {
        let attrs = scan_conanfile_attributes(CONANFILE);
        assert_eq!(
            attrs.description.as_deref(),
            Some("A massively spiffy yet delicately unobtrusive compression library")
        );
        assert_eq!(attrs.license.as_deref(), Some("Zlib"));
        assert_eq!(attrs.homepage.as_deref(), Some("https://zlib.net"));
        assert_eq!(attrs.author, None);
        assert_eq!(attrs.topics, vec!["zlib", "compression"]);
    }

    #[test]
    fn test_license_tuple_is_joined() {
        let attrs = scan_conanfile_attributes(r#"    license = ("MIT", "BSD-3-Clause")"#);
        assert_eq!(attrs.license.as_deref(), Some("MIT, BSD-3-Clause"));
    }

    #[test]
    fn test_first_assignment_wins() {
        let conanfile = "    description = \"real\"\n    description = \"shadowed\"\n";
        let attrs = scan_conanfile_attributes(conanfile);
        assert_eq!(attrs.description.as_deref(), Some("real"));
    }

    #[test]
    fn test_empty_conanfile_yields_defaults() {
        assert_eq!(
            scan_conanfile_attributes(""),
            ConanfileAttributes::default()
        );
    }

    #[test]
    fn test_not_found_error_is_distinguishable() {
        let err = RegistryError::RecipeNotFound {
            name: "nope".to_string(),
        };
        assert!(matches!(err, RegistryError::RecipeNotFound { .. }));
        assert_eq!(err.to_string(), "recipe not found: nope");
    }
}
