//! Cache Configuration Module
//!
//! Configuration structures for the LFU cache and its sharded wrapper. Each
//! config is a small `Copy` value built with `new` plus `with_*` methods, and
//! exposes its settings through accessors.
//!
//! | Config | Cache | Description |
//! |--------|-------|-------------|
//! | `LfuCacheConfig` | [`LfuCache`](crate::LfuCache) | Single LFU engine |
//! | `ShardedLfuCacheConfig` | [`ShardedLfuCache`](crate::ShardedLfuCache) | N independent LFU engines |
//!
//! # Sizing Guidelines
//!
//! `capacity` counts entries, not bytes. For the sharded cache it is the total
//! across shards; each shard receives `ceil(capacity / shards)`.
//!
//! `max_average_frequency` bounds how far access counts can drift. Once the
//! average count across live entries exceeds it, all counts are reduced by
//! half the ceiling. Small values keep the cache responsive to shifting
//! popularity; large values preserve long-term frequency history.
//!
//! # Examples
//!
//! ```
//! use lfu_shard::config::{LfuCacheConfig, ShardedLfuCacheConfig};
//! use lfu_shard::{LfuCache, ShardedLfuCache};
//!
//! let cache: LfuCache<String, i32> = LfuCache::from_config(LfuCacheConfig::new(1000));
//!
//! let sharded: ShardedLfuCache<String, i32> =
//!     ShardedLfuCache::from_config(ShardedLfuCacheConfig::new(10_000).with_shards(16));
//! ```

pub mod lfu;
pub mod sharded_lfu;

pub use lfu::{LfuCacheConfig, DEFAULT_MAX_AVERAGE_FREQUENCY};
pub use sharded_lfu::{
    default_shard_count, ShardedLfuCacheConfig, DEFAULT_SHARDED_MAX_AVERAGE_FREQUENCY,
};
