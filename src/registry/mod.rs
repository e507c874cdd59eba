//! # Registry Module
//!
//! Client and data model for the ConanCenter recipe registry.
//!
//! ## Key Components
//!
//! - [`client`] - HTTP client over the ConanCenter remote API and the
//!   conan-center-index raw files
//! - [`tools`] - MCP tool implementations for search and recipe metadata
//! - [`outputs`] - Output types for registry operations

pub mod client;
pub mod outputs;
pub mod tools;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use client::{ConanCenterClient, RegistryError};

/// A `name/version` reference as returned by the remote search API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeRef {
    pub name: String,
    pub version: String,
}

/// A single recipe revision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevisionInfo {
    pub revision: String,
    /// Upstream timestamp string, passed through untouched.
    pub time: String,
}

/// Per-version registry data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionInfo {
    /// Recipe folder inside conan-center-index (usually `all`).
    pub folder: String,
    /// Latest revision; only resolved for the version a lookup targeted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revision: Option<RevisionInfo>,
}

/// Registry-side metadata record for a recipe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecipeInfo {
    pub name: String,
    /// The version a lookup resolved to: the requested one, or the newest
    /// listed in the recipe's config.yml.
    pub resolved_version: String,
    pub versions: BTreeMap<String, VersionInfo>,
    pub description: Option<String>,
    pub license: Option<String>,
    pub author: Option<String>,
    pub homepage: Option<String>,
    pub topics: Vec<String>,
}
