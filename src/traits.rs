//! The cache-policy capability shared by every cache in this crate.
//!
//! Callers that only need put/get/purge can be written against
//! [`CachePolicy`] and accept an [`LfuCache`](crate::LfuCache), a
//! [`ShardedLfuCache`](crate::ShardedLfuCache), or any other policy that
//! implements it.
//!
//! All methods take `&self`: implementations synchronize internally, and a
//! lookup is treated as a write because it updates eviction bookkeeping.
//!
//! ```
//! use lfu_shard::{CachePolicy, LfuCache, ShardedLfuCache};
//!
//! fn warm<C: CachePolicy<u64, String>>(cache: &C, data: &[(u64, &str)]) {
//!     for (k, v) in data {
//!         cache.put(*k, v.to_string());
//!     }
//! }
//!
//! let single: LfuCache<u64, String> = LfuCache::new(16);
//! let sharded: ShardedLfuCache<u64, String> = ShardedLfuCache::with_shards(16, 4);
//! warm(&single, &[(1, "one")]);
//! warm(&sharded, &[(1, "one")]);
//!
//! let mut out = String::new();
//! assert!(CachePolicy::get(&single, &1, &mut out));
//! assert_eq!(out, "one");
//! assert_eq!(CachePolicy::get_or_default(&sharded, &1), "one");
//! ```

/// put/get/purge capability of a cache policy.
pub trait CachePolicy<K, V> {
    /// Stores `value` under `key`, evicting according to the policy if full.
    fn put(&self, key: K, value: V);

    /// Looks up `key`. On a hit, writes the value into `out` and returns
    /// `true`; on a miss, leaves `out` untouched and returns `false`.
    fn get(&self, key: &K, out: &mut V) -> bool;

    /// Looks up `key`, returning `V::default()` on a miss.
    fn get_or_default(&self, key: &K) -> V
    where
        V: Default,
    {
        let mut value = V::default();
        self.get(key, &mut value);
        value
    }

    /// Discards every entry. Configuration is kept.
    fn purge(&self);
}
