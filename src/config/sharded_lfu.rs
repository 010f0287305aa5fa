//! Configuration for the sharded Least Frequently Used (LFU) cache.

use super::LfuCacheConfig;
use core::fmt;
use core::num::NonZeroU64;

/// Default aging ceiling for a sharded LFU cache.
///
/// Sharded caches are usually long-lived and shared by many callers, so they
/// age much sooner than a standalone cache does by default.
pub const DEFAULT_SHARDED_MAX_AVERAGE_FREQUENCY: NonZeroU64 = match NonZeroU64::new(10) {
    Some(n) => n,
    None => unreachable!(),
};

/// Returns the default number of shards: the hardware concurrency hint.
///
/// Falls back to a single shard when the platform cannot report it.
pub fn default_shard_count() -> usize {
    std::thread::available_parallelism()
        .map(|p| p.get())
        .unwrap_or(1)
}

/// Configuration for a sharded LFU cache.
///
/// # Parameters
///
/// - `capacity`: Total number of entries across all shards. Each shard gets
///   `ceil(capacity / shards)`, so the real total may exceed `capacity` by up
///   to `shards - 1`.
/// - `shards`: Number of independent LFU engines. `0` selects
///   [`default_shard_count`].
/// - `max_average_frequency`: Aging ceiling passed unchanged to every shard.
///
/// # Example
///
/// ```
/// use lfu_shard::config::ShardedLfuCacheConfig;
/// use core::num::NonZeroU64;
///
/// let config = ShardedLfuCacheConfig::new(1000)
///     .with_shards(8)
///     .with_max_average_frequency(NonZeroU64::new(32).unwrap());
/// assert_eq!(config.shards(), 8);
/// assert_eq!(config.shard_capacity(), 125);
/// ```
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ShardedLfuCacheConfig {
    base: LfuCacheConfig,
    shards: usize,
}

impl ShardedLfuCacheConfig {
    /// Creates a configuration with the given total capacity, one shard per
    /// hardware thread and the sharded default aging ceiling.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            base: LfuCacheConfig::new(capacity)
                .with_max_average_frequency(DEFAULT_SHARDED_MAX_AVERAGE_FREQUENCY),
            shards: default_shard_count(),
        }
    }

    /// Sets the number of shards. `0` means "use the hardware concurrency hint".
    #[must_use]
    pub fn with_shards(mut self, shards: usize) -> Self {
        self.shards = if shards == 0 {
            default_shard_count()
        } else {
            shards
        };
        self
    }

    /// Sets the aging ceiling used by every shard.
    #[must_use]
    pub fn with_max_average_frequency(mut self, max_average_frequency: NonZeroU64) -> Self {
        self.base = self.base.with_max_average_frequency(max_average_frequency);
        self
    }

    /// Returns the nominal total capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.base.capacity()
    }

    /// Returns the number of shards. Always at least 1.
    #[inline]
    pub fn shards(&self) -> usize {
        self.shards
    }

    /// Returns the aging ceiling.
    #[inline]
    pub fn max_average_frequency(&self) -> NonZeroU64 {
        self.base.max_average_frequency()
    }

    /// Returns the capacity given to each shard: `ceil(capacity / shards)`.
    #[inline]
    pub fn shard_capacity(&self) -> usize {
        self.base.capacity().div_ceil(self.shards)
    }

    /// Returns the configuration each shard is built from.
    pub fn shard_config(&self) -> LfuCacheConfig {
        LfuCacheConfig::new(self.shard_capacity())
            .with_max_average_frequency(self.base.max_average_frequency())
    }
}

impl fmt::Debug for ShardedLfuCacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShardedLfuCacheConfig")
            .field("capacity", &self.base.capacity())
            .field("max_average_frequency", &self.base.max_average_frequency())
            .field("shards", &self.shards)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sharded_config_creation() {
        let config = ShardedLfuCacheConfig::new(1000);
        assert_eq!(config.capacity(), 1000);
        assert_eq!(
            config.max_average_frequency(),
            DEFAULT_SHARDED_MAX_AVERAGE_FREQUENCY
        );
        assert!(config.shards() > 0);
    }

    #[test]
    fn test_sharded_config_builder() {
        let config = ShardedLfuCacheConfig::new(1000)
            .with_shards(16)
            .with_max_average_frequency(NonZeroU64::new(64).unwrap());
        assert_eq!(config.shards(), 16);
        assert_eq!(config.max_average_frequency().get(), 64);
    }

    #[test]
    fn test_zero_shards_uses_hardware_hint() {
        let config = ShardedLfuCacheConfig::new(100).with_shards(0);
        assert_eq!(config.shards(), default_shard_count());
        assert!(config.shards() >= 1);
    }

    #[test]
    fn test_shard_capacity_rounds_up() {
        let config = ShardedLfuCacheConfig::new(10).with_shards(4);
        assert_eq!(config.shard_capacity(), 3);
        assert_eq!(config.shard_config().capacity(), 3);

        let config = ShardedLfuCacheConfig::new(12).with_shards(4);
        assert_eq!(config.shard_capacity(), 3);

        let config = ShardedLfuCacheConfig::new(0).with_shards(4);
        assert_eq!(config.shard_capacity(), 0);

        // More shards than entries: every shard still holds one.
        let config = ShardedLfuCacheConfig::new(3).with_shards(8);
        assert_eq!(config.shard_capacity(), 1);
    }
}
