//! Sharded LFU Cache Implementation
//!
//! A thread-safe LFU cache built from independent [`LfuCache`] shards, each
//! behind its own lock. Keys are routed by the high half of `hash(key)`
//! modulo the shard count, so two operations contend only when their keys
//! land on the same shard.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │                         ShardedLfuCache                              │
//! │                                                                      │
//! │  (hash(key) >> 32) % N  ──▶  Shard Selection                         │
//! │                                                                      │
//! │  ┌──────────────┐ ┌──────────────┐     ┌──────────────┐              │
//! │  │   Shard 0    │ │   Shard 1    │ ... │   Shard N-1  │              │
//! │  │  LfuCache    │ │  LfuCache    │     │  LfuCache    │              │
//! │  │  (Mutex)     │ │  (Mutex)     │     │  (Mutex)     │              │
//! │  └──────────────┘ └──────────────┘     └──────────────┘              │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Shard Sizing
//!
//! Each shard holds `ceil(capacity / shard_count)` entries. The shards together
//! may therefore hold up to `shard_count - 1` more entries than the nominal
//! capacity.
//!
//! ## Trade-offs
//!
//! Frequency counts, the minimum frequency and the aging pass are all
//! per-shard. A hot key in shard A does not protect a key in shard B, and a
//! full shard evicts even if its neighbours have room.
//!
//! Aggregate operations (`len`, `purge`, `metrics`) visit the shards one lock
//! at a time. They are not a consistent snapshot when other threads are
//! writing.
//!
//! # Example
//!
//! ```
//! use lfu_shard::ShardedLfuCache;
//! use std::sync::Arc;
//! use std::thread;
//!
//! let cache = Arc::new(ShardedLfuCache::with_shards(10_000, 8));
//!
//! let handles: Vec<_> = (0..4).map(|i| {
//!     let cache = Arc::clone(&cache);
//!     thread::spawn(move || {
//!         for j in 0..1000 {
//!             let key = format!("key-{}-{}", i, j);
//!             cache.put(key.clone(), j);
//!             if j % 10 == 0 {
//!                 for _ in 0..5 {
//!                     let _ = cache.get(&key);
//!                 }
//!             }
//!         }
//!     })
//! }).collect();
//!
//! for h in handles {
//!     h.join().unwrap();
//! }
//!
//! assert!(cache.len() <= 8 * cache.shard_capacity());
//! ```

use crate::config::{LfuCacheConfig, ShardedLfuCacheConfig};
use crate::lfu::LfuCache;
use crate::metrics::CacheMetrics;
use crate::traits::CachePolicy;
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use core::num::NonZeroU64;
use std::collections::BTreeMap;
use tracing::debug;

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;

pub use crate::config::default_shard_count;

/// A thread-safe LFU cache partitioned into independently locked shards.
pub struct ShardedLfuCache<K, V, S = DefaultHashBuilder> {
    config: ShardedLfuCacheConfig,
    shards: Box<[LfuCache<K, V, S>]>,
    hash_builder: S,
}

impl<K, V> ShardedLfuCache<K, V, DefaultHashBuilder>
where
    K: Hash + Eq + Clone,
{
    /// Creates a sharded cache with one shard per hardware thread.
    pub fn new(capacity: usize) -> Self {
        Self::from_config(ShardedLfuCacheConfig::new(capacity))
    }

    /// Creates a sharded cache with an explicit shard count.
    ///
    /// A `shards` of 0 falls back to [`default_shard_count`].
    pub fn with_shards(capacity: usize, shards: usize) -> Self {
        Self::from_config(ShardedLfuCacheConfig::new(capacity).with_shards(shards))
    }

    /// Creates a sharded cache with a custom aging ceiling.
    pub fn with_max_average_frequency(
        capacity: usize,
        shards: usize,
        max_average_frequency: NonZeroU64,
    ) -> Self {
        Self::from_config(
            ShardedLfuCacheConfig::new(capacity)
                .with_shards(shards)
                .with_max_average_frequency(max_average_frequency),
        )
    }

    /// Creates a sharded cache from a configuration.
    pub fn from_config(config: ShardedLfuCacheConfig) -> Self {
        Self::with_hasher(config, DefaultHashBuilder::default())
    }
}

impl<K, V, S> ShardedLfuCache<K, V, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher + Clone,
{
    /// Creates a sharded cache that routes and indexes keys with `hash_builder`.
    pub fn with_hasher(config: ShardedLfuCacheConfig, hash_builder: S) -> Self {
        let shard_config: LfuCacheConfig = config.shard_config();
        let shards: Vec<_> = (0..config.shards())
            .map(|_| LfuCache::with_hasher(shard_config, hash_builder.clone()))
            .collect();

        debug!(
            shards = config.shards(),
            shard_capacity = config.shard_capacity(),
            max_average_frequency = config.max_average_frequency().get(),
            "sharded lfu cache created"
        );

        Self {
            config,
            shards: shards.into_boxed_slice(),
            hash_builder,
        }
    }

    /// Returns the index of the shard that owns `key`.
    ///
    /// Deterministic for the lifetime of the cache.
    #[inline]
    pub fn shard_index<Q>(&self, key: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
    {
        // Shards index their own maps with the same hasher, so route on the
        // high bits and leave the low bits varied within a shard.
        ((self.hash_builder.hash_one(key) >> 32) as usize) % self.shards.len()
    }

    #[inline]
    fn shard<Q>(&self, key: &Q) -> &LfuCache<K, V, S>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
    {
        &self.shards[self.shard_index(key)]
    }

    /// Returns the number of shards.
    #[inline]
    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Returns the capacity of each shard.
    #[inline]
    pub fn shard_capacity(&self) -> usize {
        self.config.shard_capacity()
    }

    /// Returns the nominal total capacity the cache was built with.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.config.capacity()
    }

    /// Returns the aging ceiling shared by every shard.
    #[inline]
    pub fn max_average_frequency(&self) -> NonZeroU64 {
        self.config.max_average_frequency()
    }

    /// Returns the total number of entries across all shards.
    pub fn len(&self) -> usize {
        self.shards.iter().map(LfuCache::len).sum()
    }

    /// Returns `true` if no shard holds an entry.
    pub fn is_empty(&self) -> bool {
        self.shards.iter().all(LfuCache::is_empty)
    }

    /// Gets a clone of the value for `key`, bumping its frequency in its shard.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        self.shard(key).get(key)
    }

    /// Copies the value for `key` into `out` and returns `true` on a hit.
    pub fn get_into<Q>(&self, key: &Q, out: &mut V) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        self.shard(key).get_into(key, out)
    }

    /// Returns the value for `key`, or `V::default()` on a miss.
    pub fn get_or_default<Q>(&self, key: &Q) -> V
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone + Default,
    {
        self.shard(key).get_or_default(key)
    }

    /// Applies `f` to the value for `key` while holding its shard's lock.
    pub fn get_with<Q, F, R>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        F: FnOnce(&V) -> R,
    {
        self.shard(key).get_with(key, f)
    }

    /// Inserts a key-value pair into the key's shard.
    ///
    /// If that shard is full, its least frequently used entry is evicted and
    /// returned.
    pub fn put(&self, key: K, value: V) -> Option<(K, V)> {
        self.shard(&key).put(key, value)
    }

    /// Removes `key`, returning its value if it was present.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.shard(key).remove(key)
    }

    /// Returns `true` if `key` is present, without bumping its frequency.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.shard(key).contains_key(key)
    }

    /// Returns the access count of `key` within its shard, without bumping it.
    pub fn frequency<Q>(&self, key: &Q) -> Option<u64>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.shard(key).frequency(key)
    }

    /// Purges every shard, one lock at a time.
    pub fn purge(&self) {
        for shard in self.shards.iter() {
            shard.purge();
        }
    }
}

impl<K, V, S> CachePolicy<K, V> for ShardedLfuCache<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher + Clone,
{
    fn put(&self, key: K, value: V) {
        ShardedLfuCache::put(self, key, value);
    }

    fn get(&self, key: &K, out: &mut V) -> bool {
        self.get_into(key, out)
    }

    fn purge(&self) {
        ShardedLfuCache::purge(self);
    }
}

impl<K, V, S> CacheMetrics for ShardedLfuCache<K, V, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher + Clone,
{
    fn metrics(&self) -> BTreeMap<String, f64> {
        let mut aggregated = BTreeMap::new();
        for shard in self.shards.iter() {
            for (key, value) in shard.metrics() {
                *aggregated.entry(key).or_insert(0.0) += value;
            }
        }

        // Ratios and minimums do not sum; derive them from the aggregated counts.
        let requests = aggregated.get("requests").copied().unwrap_or(0.0);
        let hits = aggregated.get("cache_hits").copied().unwrap_or(0.0);
        let (hit_rate, miss_rate) = if requests > 0.0 {
            (hits / requests, (requests - hits) / requests)
        } else {
            (0.0, 0.0)
        };
        aggregated.insert("hit_rate".to_string(), hit_rate);
        aggregated.insert("miss_rate".to_string(), miss_rate);

        let live = aggregated.get("live_entries").copied().unwrap_or(0.0);
        let total = aggregated.get("total_frequency").copied().unwrap_or(0.0);
        let average = if live > 0.0 { total / live } else { 0.0 };
        aggregated.insert("average_frequency".to_string(), average);

        let min_frequency = self
            .shards
            .iter()
            .map(|shard| shard.lfu_metrics().min_frequency)
            .filter(|&min| min > 0)
            .min()
            .unwrap_or(0);
        aggregated.insert("min_frequency".to_string(), min_frequency as f64);

        aggregated.insert("shards".to_string(), self.shards.len() as f64);
        aggregated
    }

    fn algorithm_name(&self) -> &'static str {
        "ShardedLFU"
    }
}

impl<K, V, S> core::fmt::Debug for ShardedLfuCache<K, V, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher + Clone,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ShardedLfuCache")
            .field("shard_count", &self.shards.len())
            .field("shard_capacity", &self.config.shard_capacity())
            .field("total_len", &self.len())
            .finish()
    }
}
