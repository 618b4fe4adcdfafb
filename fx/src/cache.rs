//! Rate table caching with LRU eviction and a staleness window.

use chrono::Duration;
use fxnorm_collections::LruCache;
use fxnorm_common::{constants, now, Currency, Timestamp};
use parking_lot::Mutex;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, instrument, warn};

use crate::error::FxResult;
use crate::provider::RateProvider;
use crate::snapshot::RateSnapshot;

/// Default number of base currencies kept.
pub const DEFAULT_CACHE_CAPACITY: usize = 100;

/// Configuration for rate cache.
#[derive(Debug, Clone)]
pub struct RateCacheConfig {
    /// Maximum number of base currencies held.
    pub capacity: NonZeroUsize,
    /// Age after which a table is refetched instead of served.
    pub staleness_window: Duration,
}

impl Default for RateCacheConfig {
    fn default() -> Self {
        Self {
            capacity: NonZeroUsize::new(DEFAULT_CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN),
            staleness_window: constants::rate_staleness_window(),
        }
    }
}

#[derive(Debug, Default)]
struct CacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    stale_refreshes: AtomicU64,
    evictions: AtomicU64,
    fetch_failures: AtomicU64,
}

/// Rate tables keyed by base currency, in front of a [`RateProvider`].
///
/// A fresh entry is served without touching the network. Missing or stale
/// entries are refetched; fetch errors propagate to the caller and the
/// stale entry is never served in their place. The lock is only held for
/// lookups and inserts, never across a fetch, so two concurrent misses for
/// the same base may both fetch and the later one wins.
pub struct RateCache {
    provider: Arc<dyn RateProvider>,
    entries: Mutex<LruCache<Currency, Arc<RateSnapshot>>>,
    config: RateCacheConfig,
    counters: CacheCounters,
}

impl RateCache {
    /// Create a new rate cache with default configuration.
    pub fn new(provider: Arc<dyn RateProvider>) -> Self {
        Self::with_config(provider, RateCacheConfig::default())
    }

    /// Create a new rate cache with custom configuration.
    pub fn with_config(provider: Arc<dyn RateProvider>, config: RateCacheConfig) -> Self {
        Self {
            provider,
            entries: Mutex::new(LruCache::new(config.capacity)),
            config,
            counters: CacheCounters::default(),
        }
    }

    /// Rate table for `base`, from cache when fresh.
    pub async fn get_rates(&self, base: &Currency) -> FxResult<Arc<RateSnapshot>> {
        self.get_rates_at(base, now()).await
    }

    /// Rate table for `base`, judging freshness as of `at`.
    #[instrument(skip(self), fields(base = %base))]
    pub async fn get_rates_at(&self, base: &Currency, at: Timestamp) -> FxResult<Arc<RateSnapshot>> {
        if let Some(snapshot) = self.lookup_fresh(base, at) {
            return Ok(snapshot);
        }

        let snapshot = match self.provider.fetch_rate_table(base).await {
            Ok(snapshot) => Arc::new(snapshot),
            Err(e) => {
                self.counters.fetch_failures.fetch_add(1, Ordering::Relaxed);
                return Err(e);
            }
        };

        self.store(base, snapshot.clone());
        Ok(snapshot)
    }

    /// Fetch each base in turn, skipping failures.
    ///
    /// Returns how many bases ended up cached.
    pub async fn preload(&self, bases: &[Currency]) -> usize {
        let mut loaded = 0;
        for base in bases {
            match self.get_rates(base).await {
                Ok(_) => loaded += 1,
                Err(e) => warn!(base = %base, error = %e, "Failed to preload rates"),
            }
        }
        debug!(loaded, requested = bases.len(), "Preloaded rate tables");
        loaded
    }

    /// Drop the cached table for `base`. Returns whether one was present.
    pub fn invalidate(&self, base: &Currency) -> bool {
        self.entries.lock().remove(base).is_some()
    }

    /// Clear all cached tables. Counters are kept.
    pub fn clear(&self) {
        self.entries.lock().clear();
    }

    /// Get the number of cached tables.
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Check if cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }

    /// The active configuration.
    pub fn config(&self) -> &RateCacheConfig {
        &self.config
    }

    /// Get cache statistics.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.counters.hits.load(Ordering::Relaxed),
            misses: self.counters.misses.load(Ordering::Relaxed),
            stale_refreshes: self.counters.stale_refreshes.load(Ordering::Relaxed),
            evictions: self.counters.evictions.load(Ordering::Relaxed),
            fetch_failures: self.counters.fetch_failures.load(Ordering::Relaxed),
            entries: self.len(),
            capacity: self.config.capacity.get(),
        }
    }

    fn lookup_fresh(&self, base: &Currency, at: Timestamp) -> Option<Arc<RateSnapshot>> {
        let mut entries = self.entries.lock();

        match entries.get(base) {
            Some(snapshot) if snapshot.is_fresh(self.config.staleness_window, at) => {
                self.counters.hits.fetch_add(1, Ordering::Relaxed);
                debug!(base = %base, "Cache hit");
                Some(snapshot.clone())
            }
            Some(snapshot) => {
                self.counters.stale_refreshes.fetch_add(1, Ordering::Relaxed);
                debug!(
                    base = %base,
                    fetched_at = %snapshot.fetched_at_time(),
                    "Cache entry stale"
                );
                None
            }
            None => {
                self.counters.misses.fetch_add(1, Ordering::Relaxed);
                debug!(base = %base, "Cache miss");
                None
            }
        }
    }

    fn store(&self, base: &Currency, snapshot: Arc<RateSnapshot>) {
        let evicted = self.entries.lock().put(base.clone(), snapshot);
        if let Some((evicted_base, _)) = evicted {
            self.counters.evictions.fetch_add(1, Ordering::Relaxed);
            debug!(evicted = %evicted_base, "Evicted least recently used rate table");
        }
    }
}

/// Cache statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub stale_refreshes: u64,
    pub evictions: u64,
    pub fetch_failures: u64,
    pub entries: usize,
    pub capacity: usize,
}

impl CacheStats {
    /// Share of lookups served from cache.
    pub fn hit_ratio(&self) -> f64 {
        let lookups = self.hits + self.misses + self.stale_refreshes;
        if lookups == 0 {
            return 0.0;
        }
        self.hits as f64 / lookups as f64
    }
}
