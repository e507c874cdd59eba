//! Output types for README tools
//!
//! Serialized to JSON strings for the MCP protocol; deserialized in tests
//! for type-safe validation.

use serde::{Deserialize, Serialize};

use super::extractor::UsageExample;

/// Output from the get_package_readme operation.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct PackageReadmeOutput {
    pub name: String,
    /// `owner/repo` the README was fetched from.
    pub repository: String,
    pub homepage: String,
    /// Lead-paragraph description; the documented fallback sentinel when the
    /// README has no qualifying line.
    pub description: String,
    pub readme: String,
}

/// Output from the get_usage_examples operation.
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct UsageExamplesOutput {
    pub name: String,
    pub repository: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    pub total: usize,
    pub examples: Vec<UsageExample>,
}
