//! Cache Metrics System
//!
//! Counters kept by every cache in this crate, reported through the
//! [`CacheMetrics`] trait as a `BTreeMap<String, f64>`.
//!
//! # Why BTreeMap over HashMap?
//!
//! - **Deterministic ordering**: Metrics always appear in consistent order
//! - **Reproducible output**: Test assertions and log lines compare cleanly
//! - **Easy aggregation**: Sharded caches sum per-shard maps key by key
//!
//! The O(log n) lookup cost is irrelevant with a dozen keys.

use std::collections::BTreeMap;

pub mod lfu;

pub use lfu::LfuCacheMetrics;

/// Counters common to every cache policy.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CoreCacheMetrics {
    /// Total number of lookups made against the cache
    pub requests: u64,

    /// Number of lookups that found their key
    pub cache_hits: u64,

    /// Number of new entries stored
    pub insertions: u64,

    /// Number of puts that replaced the value of an existing entry
    pub updates: u64,

    /// Number of entries evicted to make room for an insert
    pub evictions: u64,

    /// Number of entries removed explicitly
    pub removals: u64,

    /// Number of times the cache was purged
    pub purges: u64,
}

impl CoreCacheMetrics {
    /// Creates a zeroed set of counters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a lookup that found its key.
    #[inline]
    pub fn record_hit(&mut self) {
        self.requests += 1;
        self.cache_hits += 1;
    }

    /// Records a lookup that missed.
    ///
    /// Misses are derived as `requests - cache_hits`.
    #[inline]
    pub fn record_miss(&mut self) {
        self.requests += 1;
    }

    /// Records a brand new entry.
    #[inline]
    pub fn record_insertion(&mut self) {
        self.insertions += 1;
    }

    /// Records a put on a key that was already present.
    #[inline]
    pub fn record_update(&mut self) {
        self.updates += 1;
    }

    /// Records a capacity eviction.
    #[inline]
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// Records an explicit removal.
    #[inline]
    pub fn record_removal(&mut self) {
        self.removals += 1;
    }

    /// Records a purge.
    #[inline]
    pub fn record_purge(&mut self) {
        self.purges += 1;
    }

    /// Returns the number of lookups that missed.
    pub fn cache_misses(&self) -> u64 {
        self.requests - self.cache_hits
    }

    /// Hit ratio in `[0.0, 1.0]`, or 0.0 before the first lookup.
    pub fn hit_rate(&self) -> f64 {
        if self.requests > 0 {
            self.cache_hits as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Miss ratio in `[0.0, 1.0]`, or 0.0 before the first lookup.
    pub fn miss_rate(&self) -> f64 {
        if self.requests > 0 {
            self.cache_misses() as f64 / self.requests as f64
        } else {
            0.0
        }
    }

    /// Converts the counters to a BTreeMap for reporting.
    pub fn to_btreemap(&self) -> BTreeMap<String, f64> {
        let mut metrics = BTreeMap::new();

        metrics.insert("cache_hits".to_string(), self.cache_hits as f64);
        metrics.insert("cache_misses".to_string(), self.cache_misses() as f64);
        metrics.insert("evictions".to_string(), self.evictions as f64);
        metrics.insert("insertions".to_string(), self.insertions as f64);
        metrics.insert("purges".to_string(), self.purges as f64);
        metrics.insert("removals".to_string(), self.removals as f64);
        metrics.insert("requests".to_string(), self.requests as f64);
        metrics.insert("updates".to_string(), self.updates as f64);

        metrics.insert("hit_rate".to_string(), self.hit_rate());
        metrics.insert("miss_rate".to_string(), self.miss_rate());

        metrics
    }
}

/// Uniform metrics interface implemented by every cache in this crate.
///
/// # Example
///
/// ```
/// use lfu_shard::metrics::CacheMetrics;
/// use lfu_shard::LfuCache;
///
/// let cache = LfuCache::new(4);
/// cache.put("a", 1);
/// cache.get(&"a");
/// cache.get(&"b");
///
/// let metrics = cache.metrics();
/// assert_eq!(metrics["cache_hits"], 1.0);
/// assert_eq!(metrics["cache_misses"], 1.0);
/// assert_eq!(cache.algorithm_name(), "LFU");
/// ```
pub trait CacheMetrics {
    /// Returns all metrics as key-value pairs, sorted by key.
    fn metrics(&self) -> BTreeMap<String, f64>;

    /// Short identifier of the cache policy (e.g. "LFU").
    fn algorithm_name(&self) -> &'static str;
}
