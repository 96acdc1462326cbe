use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use crate::catalog::CatalogSnapshot;
use crate::services::source::SourceKind;

/// In-process cache of normalized catalog snapshots
///
/// Entries expire a fixed TTL after the snapshot's own `loaded_at`
/// timestamp. Values are shared `Arc`s and are never mutated in place;
/// a refresh replaces the entry wholesale.
pub struct CacheManager {
    entries: moka::future::Cache<String, Arc<CatalogSnapshot>>,
    ttl: Duration,
}

impl CacheManager {
    /// Create a new cache manager
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        let entries = moka::future::CacheBuilder::new(capacity)
            .time_to_live(ttl)
            .build();

        Self { entries, ttl }
    }

    /// Get a snapshot if it is still within its TTL
    pub async fn get(&self, key: &str) -> Option<Arc<CatalogSnapshot>> {
        let snapshot = self.entries.get(key).await?;

        if snapshot.age() >= self.ttl {
            tracing::trace!("Cache entry expired: {}", key);
            self.entries.invalidate(key).await;
            return None;
        }

        tracing::trace!("Cache hit: {}", key);
        Some(snapshot)
    }

    /// Store a snapshot, replacing any previous one under the same key
    pub async fn put(&self, key: &str, snapshot: Arc<CatalogSnapshot>) {
        self.entries.insert(key.to_string(), snapshot).await;
        tracing::trace!("Cache set: {}", key);
    }

    /// Drop a snapshot unconditionally
    pub async fn invalidate(&self, key: &str) {
        self.entries.invalidate(key).await;
        tracing::debug!("Invalidated cache key: {}", key);
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.entries.entry_count(),
            ttl_secs: self.ttl.as_secs(),
        }
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: u64,
    pub ttl_secs: u64,
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Build a cache key for the catalog loaded from a source
    pub fn catalog(source: SourceKind) -> String {
        format!("catalog:{}", source)
    }
}
