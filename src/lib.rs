#![doc = include_str!("../README.md")]
//!
//! ---
//!
//! # Code Reference
//!
//! ## Quick Reference
//!
//! | Type | Description | Best Use Case |
//! |------|-------------|---------------|
//! | [`LfuCache`] | One LFU engine behind one lock | Moderate contention, global frequency view |
//! | [`ShardedLfuCache`] | N engines, keys routed by hash | Many threads, independent keys |
//!
//! ## Performance Characteristics
//!
//! | Operation | Cost |
//! |-----------|------|
//! | `get` / `put` / `remove` | O(1) amortized |
//! | Aging pass | O(n), only when the average frequency crosses the ceiling |
//! | Memory per entry | one arena node + one index slot |
//!
//! ## Code Examples
//!
//! ### LFU (Least Frequently Used)
//!
//! Tracks access frequency and evicts the least frequently accessed item.
//! Among entries with the same count the oldest goes first.
//!
//! ```rust
//! use lfu_shard::LfuCache;
//!
//! let cache = LfuCache::new(2);
//! cache.put("a", 1);
//! cache.put("b", 2);
//! cache.get(&"a");      // "a" now at frequency 2
//! cache.put("c", 3);    // "b" evicted (lowest frequency)
//! assert!(cache.get(&"b").is_none());
//! ```
//!
//! ### Frequency Aging
//!
//! A small aging ceiling keeps a key that was hot in the past from staying
//! resident forever.
//!
//! ```rust
//! use lfu_shard::LfuCache;
//! use core::num::NonZeroU64;
//!
//! let cache = LfuCache::with_max_average_frequency(2, NonZeroU64::new(4).unwrap());
//! cache.put("old", 0);
//! for _ in 0..1000 {
//!     cache.get(&"old");
//! }
//! assert!(cache.frequency(&"old").unwrap() < 10);
//! ```
//!
//! ### Sharded LFU
//!
//! ```rust
//! use lfu_shard::ShardedLfuCache;
//! use lfu_shard::config::ShardedLfuCacheConfig;
//!
//! let config = ShardedLfuCacheConfig::new(1000).with_shards(4);
//! let cache: ShardedLfuCache<u64, String> = ShardedLfuCache::from_config(config);
//! cache.put(42, "answer".to_string());
//! assert_eq!(cache.get(&42).as_deref(), Some("answer"));
//! assert_eq!(cache.shard_capacity(), 250);
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `hashbrown` | ✓ | Use hashbrown for the key index |
//! | `nightly` | | Enable nightly-only optimizations in hashbrown |
//!
//! ## Modules
//!
//! - [`lfu`]: Single LFU engine
//! - [`sharded`]: Hash-partitioned LFU engines
//! - [`traits`]: The put/get/purge capability shared by both
//! - [`config`]: Configuration structures
//! - [`metrics`]: Metrics collection

/// Slot arena owning every cache entry.
///
/// Entries are addressed by small copyable handles instead of pointers, so
/// the frequency lists hold no owning references.
pub(crate) mod arena;

/// Per-frequency FIFO lists threaded through the arena.
pub(crate) mod bucket;

/// Cache configuration structures.
pub mod config;

/// Least Frequently Used (LFU) cache with frequency aging.
///
/// A fixed-capacity cache that evicts the entry with the smallest access
/// count, oldest first among ties. Counts are periodically aged down so that
/// long-idle entries can be evicted.
pub mod lfu;

/// Cache metrics system.
///
/// Counters and gauges reported through a common interface.
pub mod metrics;

/// Sharded LFU cache.
///
/// Partitions the key space across independent LFU engines, each with its
/// own lock.
pub mod sharded;

/// The cache-policy capability trait.
pub mod traits;

pub use lfu::LfuCache;
pub use metrics::CacheMetrics;
pub use sharded::ShardedLfuCache;
pub use traits::CachePolicy;
