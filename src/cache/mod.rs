//! # Cache Module
//!
//! In-memory response caching for upstream lookups.
//!
//! ## Key Components
//!
//! - [`service`] - The TTL response cache shared by all tool handlers
//! - [`constants`] - Per-operation TTLs and cache-key construction

pub mod constants;
pub mod service;

pub use service::ResponseCache;
