//! # README Module
//!
//! Heuristic extraction of structured usage examples and package descriptions
//! from free-form README markdown.
//!
//! ## Key Components
//!
//! - [`extractor`] - Pure scanning functions over markdown text
//! - [`tools`] - MCP tool implementations for README operations
//! - [`outputs`] - Output types for README operations

pub mod extractor;
pub mod outputs;
pub mod tools;

pub use extractor::{UsageExample, extract_package_description, parse_usage_examples};
