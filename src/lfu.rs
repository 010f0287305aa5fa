//! Least Frequently Used Cache Implementation.
//!
//! The LFU (Least Frequently Used) cache evicts the entry with the smallest
//! access count when it is full. Ties are broken FIFO: among entries with the
//! same count, the one that reached that count first goes first.
//!
//! # Structure
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │ LfuCache                                                         │
//! │  Mutex ─► LfuSegment                                             │
//! │            map:     K ──► NodeId                                 │
//! │            nodes:   NodeArena<Node { key, value, freq, links }>  │
//! │            buckets: freq ──► FrequencyBucket (head … tail)       │
//! │                                                                  │
//! │            min_frequency ── names the bucket evicted from        │
//! │            total_frequency / live entries = average              │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every operation is O(1) amortized: a lookup is one hash probe plus an
//! unlink/append pair on two buckets, and eviction pops the head of the
//! minimum-frequency bucket.
//!
//! # Aging
//!
//! Pure LFU lets an entry that was hot once stay in the cache forever. To keep
//! counts bounded, the segment tracks the average access count of the live
//! entries. When it exceeds the configured `max_average_frequency`, every
//! entry's count is reduced by half of that ceiling (never below 1) in a single
//! O(n) pass. The pass only runs when the ceiling is crossed.
//!
//! # Thread Safety
//!
//! [`LfuCache`] wraps its segment in a `parking_lot::Mutex`, and every method
//! takes `&self`. Lookups take the lock exclusively because they move the entry
//! to a new bucket. For parallelism across keys use
//! [`ShardedLfuCache`](crate::ShardedLfuCache).

use crate::arena::{NodeArena, NodeId};
use crate::bucket::{FrequencyBucket, Node};
use crate::config::LfuCacheConfig;
use crate::metrics::{CacheMetrics, LfuCacheMetrics};
use crate::traits::CachePolicy;
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use core::num::NonZeroU64;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use tracing::{debug, trace};

#[cfg(feature = "hashbrown")]
use hashbrown::DefaultHashBuilder;
#[cfg(feature = "hashbrown")]
use hashbrown::HashMap;

#[cfg(not(feature = "hashbrown"))]
use std::collections::hash_map::RandomState as DefaultHashBuilder;
#[cfg(not(feature = "hashbrown"))]
use std::collections::HashMap;

/// Upper bound on the entries reserved up front, so that a huge nominal
/// capacity does not turn into a huge allocation.
const MAX_PREALLOCATED_ENTRIES: usize = 1 << 16;

/// Internal LFU segment containing the actual cache algorithm.
///
/// Not synchronized. [`LfuCache`] puts one behind a mutex, and
/// [`ShardedLfuCache`](crate::ShardedLfuCache) holds one `LfuCache` per shard.
///
/// Invariants between mutations:
/// - `map`, `nodes` and the union of all buckets hold the same entries
/// - every bucket in `buckets` is non-empty and only holds nodes whose
///   frequency equals its key
/// - `min_frequency` is the smallest key in `buckets` (1 when empty)
/// - `total_frequency` is the sum of all live frequencies
pub(crate) struct LfuSegment<K, V, S = DefaultHashBuilder> {
    config: LfuCacheConfig,

    /// Key to arena handle
    map: HashMap<K, NodeId, S>,

    /// Owner of every live entry
    nodes: NodeArena<Node<K, V>>,

    /// Frequency to the list of entries at that frequency, FIFO within a list
    buckets: HashMap<u64, FrequencyBucket>,

    min_frequency: u64,
    total_frequency: u64,
    average_frequency: u64,

    metrics: LfuCacheMetrics,
}

impl<K, V, S> LfuSegment<K, V, S> {
    #[inline]
    pub(crate) fn config(&self) -> &LfuCacheConfig {
        &self.config
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    #[inline]
    pub(crate) fn min_frequency(&self) -> u64 {
        self.min_frequency
    }

    #[inline]
    pub(crate) fn metrics(&self) -> &LfuCacheMetrics {
        &self.metrics
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> LfuSegment<K, V, S> {
    pub(crate) fn with_hasher(config: LfuCacheConfig, hash_builder: S) -> Self {
        let reserved = config.capacity().min(MAX_PREALLOCATED_ENTRIES);
        LfuSegment {
            config,
            map: HashMap::with_capacity_and_hasher(reserved, hash_builder),
            nodes: NodeArena::with_capacity(reserved),
            buckets: HashMap::new(),
            min_frequency: 1,
            total_frequency: 0,
            average_frequency: 0,
            metrics: LfuCacheMetrics::new(),
        }
    }

    fn node(&self, id: NodeId) -> &Node<K, V> {
        self.nodes
            .get(id)
            .expect("lfu index points at a vacant arena slot")
    }

    fn node_mut(&mut self, id: NodeId) -> &mut Node<K, V> {
        self.nodes
            .get_mut(id)
            .expect("lfu index points at a vacant arena slot")
    }

    /// Detaches `id` from the bucket for `frequency`, dropping the bucket once
    /// it is empty.
    fn unlink(&mut self, id: NodeId, frequency: u64) {
        if let Some(bucket) = self.buckets.get_mut(&frequency) {
            bucket.remove(&mut self.nodes, id);
            if bucket.is_empty() {
                self.buckets.remove(&frequency);
            }
        }
    }

    /// Appends `id` to the bucket for `frequency`, creating it if needed.
    fn link(&mut self, id: NodeId, frequency: u64) {
        self.buckets
            .entry(frequency)
            .or_insert_with(|| FrequencyBucket::new(frequency))
            .append(&mut self.nodes, id);
    }

    fn refresh_average(&mut self) {
        self.average_frequency = match self.map.len() as u64 {
            0 => 0,
            live => self.total_frequency / live,
        };
    }

    fn refresh_metrics(&mut self) {
        self.metrics.update_frequency_state(
            self.min_frequency,
            self.total_frequency,
            self.map.len(),
            self.buckets.len(),
        );
    }

    /// Moves `id` one frequency up.
    fn touch(&mut self, id: NodeId) {
        let old_frequency = self.node(id).frequency;
        let new_frequency = old_frequency + 1;

        self.unlink(id, old_frequency);
        self.node_mut(id).frequency = new_frequency;
        self.link(id, new_frequency);

        // Counts grow by one per access, so the minimum can only move up by one.
        if old_frequency == self.min_frequency && !self.buckets.contains_key(&old_frequency) {
            self.min_frequency = new_frequency;
        }

        self.metrics.record_frequency_increment();
        self.record_access();
    }

    /// Adds one access to the running total and ages the entries if the
    /// average went over the ceiling.
    fn record_access(&mut self) {
        self.total_frequency += 1;
        self.refresh_average();
        if self.average_frequency > self.config.max_average_frequency().get() {
            self.age();
        }
        self.refresh_metrics();
    }

    /// Lowers every live frequency by half the ceiling, floored at 1.
    ///
    /// A ceiling of 1 decays by 1 instead of `1 / 2 = 0`, which would leave
    /// every count unchanged and rerun the pass on each access.
    fn age(&mut self) {
        let ceiling = self.config.max_average_frequency().get();
        let decay = (ceiling / 2).max(1);
        let average = self.average_frequency;

        // Lowest frequency first, oldest first within a bucket, so entries that
        // land in the same bucket keep their relative eviction order.
        let mut levels: Vec<&FrequencyBucket> = self.buckets.values().collect();
        levels.sort_unstable_by_key(|bucket| bucket.frequency());
        let mut order = Vec::with_capacity(self.map.len());
        for bucket in levels {
            order.extend(bucket.iter(&self.nodes));
        }

        let mut total = 0;
        for id in order {
            let old_frequency = self.node(id).frequency;
            let new_frequency = old_frequency.saturating_sub(decay).max(1);
            self.unlink(id, old_frequency);
            self.node_mut(id).frequency = new_frequency;
            self.link(id, new_frequency);
            total += new_frequency;
        }

        self.total_frequency = total;
        self.refresh_average();
        self.min_frequency = self.buckets.keys().copied().min().unwrap_or(1);
        self.metrics.record_aging_pass();

        debug!(
            average,
            ceiling,
            live_entries = self.map.len(),
            min_frequency = self.min_frequency,
            "lfu aging pass"
        );
    }

    /// Evicts the oldest entry of the minimum-frequency bucket.
    fn evict(&mut self) -> (K, V) {
        let frequency = self.min_frequency;
        let id = self
            .buckets
            .get(&frequency)
            .and_then(|bucket| bucket.first())
            .expect("min_frequency must name a non-empty bucket when the cache is full");

        self.unlink(id, frequency);
        let node = self
            .nodes
            .remove(id)
            .expect("lfu bucket points at a vacant arena slot");
        self.map.remove(&node.key);
        self.total_frequency -= node.frequency;
        self.refresh_average();
        self.metrics.core.record_eviction();

        trace!(frequency = node.frequency, "lfu eviction");
        // min_frequency is left stale: the insert that follows resets it to 1.
        (node.key, node.value)
    }

    /// Returns the value for `key`, bumping its frequency.
    pub(crate) fn get<Q>(&mut self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        match self.map.get(key).copied() {
            Some(id) => {
                self.metrics.core.record_hit();
                self.touch(id);
                Some(&self.node(id).value)
            }
            None => {
                self.metrics.core.record_miss();
                None
            }
        }
    }

    /// Inserts or replaces `key`. Returns the entry evicted to make room.
    pub(crate) fn put(&mut self, key: K, value: V) -> Option<(K, V)>
    where
        K: Clone,
    {
        if self.config.capacity() == 0 {
            return None;
        }

        if let Some(&id) = self.map.get(&key) {
            self.node_mut(id).value = value;
            self.metrics.core.record_update();
            self.touch(id);
            return None;
        }

        let evicted = if self.map.len() >= self.config.capacity() {
            Some(self.evict())
        } else {
            None
        };

        let id = self.nodes.insert(Node::new(key.clone(), value));
        self.map.insert(key, id);
        self.link(id, 1);
        self.min_frequency = 1;
        self.metrics.core.record_insertion();
        self.record_access();

        evicted
    }

    /// Removes `key`, returning its value.
    pub(crate) fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let id = self.map.remove(key)?;
        let frequency = self.node(id).frequency;
        self.unlink(id, frequency);
        let node = self
            .nodes
            .remove(id)
            .expect("lfu index points at a vacant arena slot");

        self.total_frequency -= node.frequency;
        self.refresh_average();
        if frequency == self.min_frequency && !self.buckets.contains_key(&frequency) {
            self.min_frequency = self.buckets.keys().copied().min().unwrap_or(1);
        }
        self.metrics.core.record_removal();
        self.refresh_metrics();

        Some(node.value)
    }

    /// Returns `true` if `key` is present. Does not count as an access.
    pub(crate) fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.contains_key(key)
    }

    /// Current access count of `key`. Does not count as an access.
    pub(crate) fn frequency<Q>(&self, key: &Q) -> Option<u64>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.get(key).map(|&id| self.node(id).frequency)
    }

    /// Drops every entry and every bucket. Configuration is kept.
    pub(crate) fn clear(&mut self) {
        self.map.clear();
        self.nodes.clear();
        self.buckets.clear();
        self.min_frequency = 1;
        self.total_frequency = 0;
        self.average_frequency = 0;
        self.metrics.core.record_purge();
        self.refresh_metrics();
    }

    /// Panics if any of the segment invariants does not hold.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        assert!(self.map.len() <= self.config.capacity());
        assert_eq!(self.map.len(), self.nodes.len());

        let mut linked = 0;
        let mut total = 0;
        for (&frequency, bucket) in self.buckets.iter() {
            assert!(frequency >= 1);
            assert!(!bucket.is_empty(), "empty bucket {frequency} kept");
            assert_eq!(bucket.frequency(), frequency);
            let mut count = 0;
            for id in bucket.iter(&self.nodes) {
                let node = self.node(id);
                assert_eq!(node.frequency, frequency);
                assert_eq!(self.map.get(&node.key), Some(&id));
                total += node.frequency;
                count += 1;
            }
            assert_eq!(count, bucket.len());
            linked += count;
        }
        assert_eq!(linked, self.map.len());
        assert_eq!(self.nodes.ids().count(), self.map.len());
        assert_eq!(total, self.total_frequency);

        match self.buckets.keys().copied().min() {
            Some(min) => assert_eq!(self.min_frequency, min),
            None => assert_eq!(self.total_frequency, 0),
        }
    }
}

impl<K, V, S> core::fmt::Debug for LfuSegment<K, V, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LfuSegment")
            .field("capacity", &self.config.capacity())
            .field("len", &self.map.len())
            .field("min_frequency", &self.min_frequency)
            .field("average_frequency", &self.average_frequency)
            .finish()
    }
}

/// A thread-safe Least Frequently Used (LFU) cache with frequency aging.
///
/// # Examples
///
/// ```
/// use lfu_shard::LfuCache;
///
/// let cache = LfuCache::new(2);
/// cache.put("a", 1);
/// cache.put("b", 2);
///
/// // "a" is now at frequency 2, "b" still at 1
/// assert_eq!(cache.get(&"a"), Some(1));
///
/// // Full: "b" has the lowest count and is evicted
/// assert_eq!(cache.put("c", 3), Some(("b", 2)));
/// assert_eq!(cache.get(&"b"), None);
/// assert_eq!(cache.get(&"a"), Some(1));
/// ```
pub struct LfuCache<K, V, S = DefaultHashBuilder> {
    config: LfuCacheConfig,
    segment: Mutex<LfuSegment<K, V, S>>,
}

impl<K, V> LfuCache<K, V, DefaultHashBuilder>
where
    K: Hash + Eq + Clone,
{
    /// Creates an LFU cache holding at most `capacity` entries.
    ///
    /// A capacity of 0 creates a disabled cache.
    pub fn new(capacity: usize) -> Self {
        Self::from_config(LfuCacheConfig::new(capacity))
    }

    /// Creates an LFU cache with a custom aging ceiling.
    pub fn with_max_average_frequency(capacity: usize, max_average_frequency: NonZeroU64) -> Self {
        Self::from_config(
            LfuCacheConfig::new(capacity).with_max_average_frequency(max_average_frequency),
        )
    }

    /// Creates an LFU cache from a configuration.
    pub fn from_config(config: LfuCacheConfig) -> Self {
        Self::with_hasher(config, DefaultHashBuilder::default())
    }
}

impl<K, V, S> LfuCache<K, V, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher,
{
    /// Creates an LFU cache that hashes keys with `hash_builder`.
    pub fn with_hasher(config: LfuCacheConfig, hash_builder: S) -> Self {
        debug!(
            capacity = config.capacity(),
            max_average_frequency = config.max_average_frequency().get(),
            "lfu cache created"
        );
        Self {
            config,
            segment: Mutex::new(LfuSegment::with_hasher(config, hash_builder)),
        }
    }

    /// Returns the maximum number of entries.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.config.capacity()
    }

    /// Returns the aging ceiling.
    #[inline]
    pub fn max_average_frequency(&self) -> NonZeroU64 {
        self.config.max_average_frequency()
    }

    /// Returns the number of live entries.
    pub fn len(&self) -> usize {
        self.segment.lock().len()
    }

    /// Returns `true` if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.segment.lock().is_empty()
    }

    /// Returns a clone of the value for `key`, bumping its frequency.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        self.segment.lock().get(key).cloned()
    }

    /// Copies the value for `key` into `out` and returns `true` on a hit.
    /// On a miss `out` is left as it was.
    pub fn get_into<Q>(&self, key: &Q, out: &mut V) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone,
    {
        match self.segment.lock().get(key) {
            Some(value) => {
                out.clone_from(value);
                true
            }
            None => false,
        }
    }

    /// Returns the value for `key`, or `V::default()` on a miss.
    pub fn get_or_default<Q>(&self, key: &Q) -> V
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        V: Clone + Default,
    {
        self.get(key).unwrap_or_default()
    }

    /// Applies `f` to the value for `key` while holding the lock.
    ///
    /// Counts as an access. Avoids cloning the value.
    pub fn get_with<Q, F, R>(&self, key: &Q, f: F) -> Option<R>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
        F: FnOnce(&V) -> R,
    {
        self.segment.lock().get(key).map(f)
    }

    /// Inserts `value` under `key`.
    ///
    /// If the key is present its value is replaced and the put counts as an
    /// access. Otherwise, if the cache is full, the least frequently used
    /// entry is evicted first and returned.
    pub fn put(&self, key: K, value: V) -> Option<(K, V)> {
        self.segment.lock().put(key, value)
    }

    /// Removes `key`, returning its value if it was present.
    pub fn remove<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.lock().remove(key)
    }

    /// Returns `true` if `key` is present, without bumping its frequency.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.lock().contains_key(key)
    }

    /// Returns the current access count of `key`, without bumping it.
    pub fn frequency<Q>(&self, key: &Q) -> Option<u64>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.segment.lock().frequency(key)
    }

    /// Discards every entry.
    pub fn purge(&self) {
        let mut segment = self.segment.lock();
        let dropped = segment.len();
        segment.clear();
        debug!(dropped, "lfu cache purged");
    }

    /// Returns a snapshot of the LFU metrics.
    pub fn lfu_metrics(&self) -> LfuCacheMetrics {
        self.segment.lock().metrics().clone()
    }

    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        self.segment.lock().check_invariants();
    }
}

impl<K, V, S> CachePolicy<K, V> for LfuCache<K, V, S>
where
    K: Hash + Eq + Clone,
    V: Clone,
    S: BuildHasher,
{
    fn put(&self, key: K, value: V) {
        LfuCache::put(self, key, value);
    }

    fn get(&self, key: &K, out: &mut V) -> bool {
        self.get_into(key, out)
    }

    fn purge(&self) {
        LfuCache::purge(self);
    }
}

impl<K, V, S> CacheMetrics for LfuCache<K, V, S>
where
    K: Hash + Eq + Clone,
    S: BuildHasher,
{
    fn metrics(&self) -> BTreeMap<String, f64> {
        self.segment.lock().metrics().metrics()
    }

    fn algorithm_name(&self) -> &'static str {
        "LFU"
    }
}

impl<K, V, S> core::fmt::Debug for LfuCache<K, V, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let segment = self.segment.lock();
        f.debug_struct("LfuCache")
            .field("capacity", &segment.config().capacity())
            .field("len", &segment.len())
            .field("min_frequency", &segment.min_frequency())
            .finish()
    }
}
