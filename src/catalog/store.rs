use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

use crate::catalog::normalizer::normalize_all;
use crate::config::CatalogSettings;
use crate::models::Resource;
use crate::services::{
    CacheKey, CacheManager, CacheStats, CatalogSource, PostgresCatalog, RemoteCatalogClient, SourceKind,
    StaticFileSource, UnavailableSource,
};

/// How long a loaded catalog is served before it is re-fetched
pub const CATALOG_TTL: Duration = Duration::from_secs(60 * 60);

/// One entry per source kind is all the cache ever holds
const CACHE_CAPACITY: u64 = 8;

const DB_MAX_CONNECTIONS: u32 = 5;

/// One complete, normalized catalog load
#[derive(Debug, Clone)]
pub struct CatalogSnapshot {
    pub resources: Vec<Resource>,
    /// Source the service is configured to read from
    pub configured: SourceKind,
    /// Source that actually produced `resources`
    pub served_by: SourceKind,
    pub loaded_at: DateTime<Utc>,
    pub fell_back: bool,
    /// Set when even the static catalog could not be read
    pub load_error: Option<String>,
}

impl CatalogSnapshot {
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    pub fn age(&self) -> Duration {
        (Utc::now() - self.loaded_at).to_std().unwrap_or(Duration::ZERO)
    }
}

/// Read-through access to the normalized catalog
///
/// Owns source selection: the configured primary is tried first and, unless
/// it already is the static file, any error or empty result falls back to
/// the static file. Loads are serialized so concurrent misses trigger a
/// single refresh, and callers that queued behind a load share its result
/// even when that load failed.
pub struct CatalogStore {
    primary: Arc<dyn CatalogSource>,
    fallback: Arc<dyn CatalogSource>,
    cache: Arc<CacheManager>,
    /// Guards loading; holds the most recent load result
    refresh_lock: Mutex<Option<Arc<CatalogSnapshot>>>,
    /// Number of completed loads
    loads: AtomicU64,
}

impl CatalogStore {
    pub fn new(
        primary: Arc<dyn CatalogSource>,
        fallback: Arc<dyn CatalogSource>,
        cache: Arc<CacheManager>,
    ) -> Self {
        Self {
            primary,
            fallback,
            cache,
            refresh_lock: Mutex::new(None),
            loads: AtomicU64::new(0),
        }
    }

    /// Build a store for the configured source, with the static file as fallback
    ///
    /// A source whose settings are incomplete is replaced by an
    /// [`UnavailableSource`] so every read falls back to the static file.
    pub fn from_settings(settings: &CatalogSettings) -> Self {
        let fallback: Arc<dyn CatalogSource> = Arc::new(StaticFileSource::new(&settings.static_path));

        let primary: Arc<dyn CatalogSource> = match settings.source {
            SourceKind::File => fallback.clone(),
            SourceKind::Remote => match RemoteCatalogClient::new(
                settings.remote_url.clone().unwrap_or_default(),
                settings.remote_api_key.clone(),
                settings.timeout_secs,
            ) {
                Ok(client) => Arc::new(client),
                Err(e) => {
                    tracing::error!("Remote catalog unavailable: {}", e);
                    Arc::new(UnavailableSource::new(SourceKind::Remote, e.to_string()))
                }
            },
            SourceKind::Db => match PostgresCatalog::new(
                settings.database_url.as_deref().unwrap_or_default(),
                DB_MAX_CONNECTIONS,
                settings.timeout_secs,
            ) {
                Ok(catalog) => Arc::new(catalog),
                Err(e) => {
                    tracing::error!("Database catalog unavailable: {}", e);
                    Arc::new(UnavailableSource::new(SourceKind::Db, e.to_string()))
                }
            },
        };

        let cache = Arc::new(CacheManager::new(CACHE_CAPACITY, CATALOG_TTL));
        Self::new(primary, fallback, cache)
    }

    pub fn configured_source(&self) -> SourceKind {
        self.primary.kind()
    }

    pub fn ttl(&self) -> Duration {
        self.cache.ttl()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    fn cache_key(&self) -> String {
        CacheKey::catalog(self.primary.kind())
    }

    /// Get the current catalog, loading it if the cache is empty or stale
    pub async fn snapshot(&self) -> Arc<CatalogSnapshot> {
        let key = self.cache_key();

        if let Some(snapshot) = self.cache.get(&key).await {
            return snapshot;
        }

        let seen = self.loads.load(Ordering::Acquire);
        let mut last = self.refresh_lock.lock().await;

        // Another task may have finished a load while we waited
        if let Some(snapshot) = self.cache.get(&key).await {
            return snapshot;
        }
        if self.loads.load(Ordering::Acquire) != seen {
            if let Some(snapshot) = last.as_ref() {
                return snapshot.clone();
            }
        }

        let snapshot = self.load_and_store(&key).await;
        *last = Some(snapshot.clone());
        self.loads.fetch_add(1, Ordering::Release);
        snapshot
    }

    /// Drop the cached catalog and load a fresh one
    pub async fn refresh(&self) -> Arc<CatalogSnapshot> {
        let key = self.cache_key();
        let mut last = self.refresh_lock.lock().await;

        self.cache.invalidate(&key).await;
        let snapshot = self.load_and_store(&key).await;
        *last = Some(snapshot.clone());
        self.loads.fetch_add(1, Ordering::Release);
        snapshot
    }

    /// Drop the cached catalog; the next read reloads it
    pub async fn invalidate(&self) {
        self.cache.invalidate(&self.cache_key()).await;
    }

    async fn load_and_store(&self, key: &str) -> Arc<CatalogSnapshot> {
        let snapshot = Arc::new(self.load().await);

        if snapshot.load_error.is_none() {
            self.cache.put(key, snapshot.clone()).await;
        } else {
            tracing::warn!("Catalog load failed, not caching: {:?}", snapshot.load_error);
        }

        tracing::info!(
            "Catalog loaded: {} resources from {} (configured: {}, fell back: {})",
            snapshot.len(),
            snapshot.served_by,
            snapshot.configured,
            snapshot.fell_back
        );

        snapshot
    }

    async fn load(&self) -> CatalogSnapshot {
        let configured = self.primary.kind();

        if configured == SourceKind::File {
            return self.load_static(configured, false).await;
        }

        match self.primary.fetch().await {
            Ok(records) if !records.is_empty() => CatalogSnapshot {
                resources: normalize_all(&records),
                configured,
                served_by: configured,
                loaded_at: Utc::now(),
                fell_back: false,
                load_error: None,
            },
            Ok(_) => {
                tracing::warn!("{} catalog returned no records, falling back to static file", configured);
                self.load_static(configured, true).await
            }
            Err(e) => {
                tracing::warn!("{} catalog fetch failed ({}), falling back to static file", configured, e);
                self.load_static(configured, true).await
            }
        }
    }

    async fn load_static(&self, configured: SourceKind, fell_back: bool) -> CatalogSnapshot {
        let (resources, load_error) = match self.fallback.fetch().await {
            Ok(records) => (normalize_all(&records), None),
            Err(e) => {
                tracing::error!("Static catalog unavailable: {}", e);
                (Vec::new(), Some(e.to_string()))
            }
        };

        CatalogSnapshot {
            resources,
            configured,
            served_by: SourceKind::File,
            loaded_at: Utc::now(),
            fell_back,
            load_error,
        }
    }
}
