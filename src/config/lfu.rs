//! Configuration for the Least Frequently Used (LFU) cache.
//!
//! # Examples
//!
//! ```
//! use lfu_shard::config::LfuCacheConfig;
//! use lfu_shard::LfuCache;
//! use core::num::NonZeroU64;
//!
//! // Capacity only, default aging ceiling
//! let config = LfuCacheConfig::new(100);
//! let cache: LfuCache<String, i32> = LfuCache::from_config(config);
//!
//! // Aggressive aging: start decaying once the average access count passes 8
//! let config = LfuCacheConfig::new(1000)
//!     .with_max_average_frequency(NonZeroU64::new(8).unwrap());
//! let cache: LfuCache<String, Vec<u8>> = LfuCache::from_config(config);
//! ```

use core::fmt;
use core::num::NonZeroU64;

/// Default ceiling on the average access count of a standalone LFU cache.
///
/// High enough that aging practically never triggers unless asked for.
pub const DEFAULT_MAX_AVERAGE_FREQUENCY: NonZeroU64 = match NonZeroU64::new(1_000_000) {
    Some(n) => n,
    None => unreachable!(),
};

/// Configuration for an LFU (Least Frequently Used) cache.
///
/// # Fields
///
/// - `capacity`: Maximum number of live entries. `0` disables the cache: every
///   put is dropped and every get misses.
/// - `max_average_frequency`: When the average access count across live
///   entries exceeds this value, every entry's count is reduced by half of it
///   (floored at 1). Being a `NonZeroU64`, it is always at least 1.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct LfuCacheConfig {
    capacity: usize,
    max_average_frequency: NonZeroU64,
}

impl LfuCacheConfig {
    /// Creates a configuration with the given capacity and the default aging ceiling.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            max_average_frequency: DEFAULT_MAX_AVERAGE_FREQUENCY,
        }
    }

    /// Sets the average access count above which an aging pass runs.
    #[must_use]
    pub fn with_max_average_frequency(mut self, max_average_frequency: NonZeroU64) -> Self {
        self.max_average_frequency = max_average_frequency;
        self
    }

    /// Returns the maximum number of live entries.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the aging ceiling.
    #[inline]
    pub fn max_average_frequency(&self) -> NonZeroU64 {
        self.max_average_frequency
    }
}

impl fmt::Debug for LfuCacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LfuCacheConfig")
            .field("capacity", &self.capacity)
            .field("max_average_frequency", &self.max_average_frequency)
            .finish()
    }
}
