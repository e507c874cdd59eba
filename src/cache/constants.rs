//! Cache TTLs and key construction.
//!
//! Keys are deterministic functions of the logical request so that identical
//! requests always collide on the same entry and distinct requests never do.
//! Package names are normalized (trimmed, lower-cased) before keying; optional
//! arguments are keyed with an explicit placeholder so `foo` and `foo@latest`
//! do not alias different requests.

use std::time::Duration;

/// How long search results stay fresh. Searches are cheap upstream and the
/// result set changes as recipes are published, so this is short.
pub const SEARCH_TTL: Duration = Duration::from_secs(5 * 60);

/// How long recipe metadata stays fresh.
pub const RECIPE_TTL: Duration = Duration::from_secs(30 * 60);

/// How long README text and extracted examples stay fresh. READMEs change
/// rarely and are the most expensive lookup (registry + source host).
pub const README_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Normalize a package name for cache keying.
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Build the cache key for a search request.
pub fn search_key(query: &str, limit: usize) -> String {
    format!("search:{}:{limit}", query.trim().to_lowercase())
}

/// Build the cache key for a recipe-info request.
pub fn recipe_key(name: &str, version: Option<&str>) -> String {
    format!(
        "info:{}:{}",
        normalize_name(name),
        version.map(str::trim).unwrap_or("latest")
    )
}

/// Build the cache key for a version-list request.
pub fn versions_key(name: &str) -> String {
    format!("versions:{}", normalize_name(name))
}

/// Build the cache key for a README request.
pub fn readme_key(name: &str) -> String {
    format!("readme:{}", normalize_name(name))
}

/// Build the cache key for a usage-examples request.
pub fn examples_key(name: &str, language: Option<&str>) -> String {
    format!(
        "examples:{}:{}",
        normalize_name(name),
        language.map(|l| l.trim().to_lowercase()).unwrap_or_else(|| "all".to_string())
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_normalize_name_case_and_whitespace() {
        assert_eq!(recipe_key(" Zlib ", None), recipe_key("zlib", None));
        assert_eq!(readme_key("OpenSSL"), "readme:openssl");
    }

    #[test]
    fn test_distinct_requests_get_distinct_keys() {
        assert_ne!(search_key("zlib", 10), search_key("zlib", 20));
        assert_ne!(recipe_key("zlib", None), recipe_key("zlib", Some("1.3.1")));
        assert_ne!(examples_key("fmt", None), examples_key("fmt", Some("cmake")));
    }

    #[test]
    fn test_operation_prefixes_isolate_namespaces() {
        // Same argument under different operations must never collide.
        assert_ne!(versions_key("zlib"), readme_key("zlib"));
    }
}
