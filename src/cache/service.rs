//! TTL-bounded response cache.
//!
//! One shared instance is constructed by the service at startup and handed to
//! every tools struct; entries expire individually and are removed lazily on
//! the first access past their deadline. Absence is a normal negative result,
//! never an error.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use serde_json::Value;
use tokio::sync::Mutex;

/// A single cached response.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    expires_at: Instant,
    /// Diagnostics only, surfaced through [`ResponseCache::oldest_entry`].
    created_at: chrono::DateTime<chrono::Utc>,
}

/// Process-wide key→value store with per-entry TTL.
///
/// Values are owned by the cache once stored; `get` hands out clones so
/// callers always see a read-only snapshot. Racing writers on the same key
/// resolve last-writer-wins; there is no single-flight deduplication of
/// concurrent misses.
#[derive(Debug, Default)]
pub struct ResponseCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
}

impl ResponseCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up an unexpired entry. An entry found past its deadline is
    /// removed as a side effect and reported absent.
    pub async fn get(&self, key: &str) -> Option<Value> {
        let mut entries = self.entries.lock().await;
        match entries.get(key) {
            Some(entry) if Instant::now() <= entry.expires_at => Some(entry.value.clone()),
            Some(_) => {
                tracing::debug!("cache entry expired: {key}");
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Store or overwrite an entry with `expires_at = now + ttl`.
    ///
    /// A zero TTL is stored as-is and therefore expires on the next read;
    /// entries are never stored without an expiry.
    pub async fn set(&self, key: &str, value: Value, ttl: Duration) {
        let entry = CacheEntry {
            value,
            expires_at: Instant::now() + ttl,
            created_at: chrono::Utc::now(),
        };
        self.entries.lock().await.insert(key.to_string(), entry);
    }

    /// Drop a single entry, expired or not.
    pub async fn remove(&self, key: &str) {
        self.entries.lock().await.remove(key);
    }

    /// Drop everything. Used by tests and the cache-status tool.
    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }

    /// Number of stored entries, including ones that have expired but have
    /// not been swept yet.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }

    /// Creation timestamp of the oldest stored entry. Diagnostics only.
    pub async fn oldest_entry(&self) -> Option<chrono::DateTime<chrono::Utc>> {
        self.entries.lock().await.values().map(|e| e.created_at).min()
    }
}
