//! Sharded LFU cache shared by a pool of worker threads.
//!
//! `RUST_LOG=lfu_shard=debug cargo run --example sharded_usage` also shows
//! the construction and aging events.

use lfu_shard::config::ShardedLfuCacheConfig;
use lfu_shard::metrics::CacheMetrics;
use lfu_shard::ShardedLfuCache;
use std::num::NonZeroU64;
use std::sync::Arc;
use std::thread;
use tracing_subscriber::EnvFilter;

const WORKERS: u64 = 4;
const REQUESTS_PER_WORKER: u64 = 20_000;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_thread_ids(true)
        .init();

    let config = ShardedLfuCacheConfig::new(1_000)
        .with_shards(0)
        .with_max_average_frequency(NonZeroU64::new(16).unwrap());
    let cache: Arc<ShardedLfuCache<u64, String>> = Arc::new(ShardedLfuCache::from_config(config));

    println!(
        "{} shards x {} entries (nominal capacity {})",
        cache.shard_count(),
        cache.shard_capacity(),
        cache.capacity()
    );

    let handles: Vec<_> = (0..WORKERS)
        .map(|worker| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                // A skewed key stream: a handful of keys are requested far more
                // often than the long tail.
                let mut state = 0x2545_F491_4F6C_DD1D_u64 ^ worker;
                for _ in 0..REQUESTS_PER_WORKER {
                    state ^= state << 13;
                    state ^= state >> 7;
                    state ^= state << 17;
                    let key = if state % 4 == 0 {
                        state % 50
                    } else {
                        state % 100_000
                    };
                    if cache.get(&key).is_none() {
                        cache.put(key, format!("value-{key}"));
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("worker panicked");
    }

    let metrics = cache.metrics();
    println!("algorithm:      {}", cache.algorithm_name());
    println!("live entries:   {}", cache.len());
    println!("hit rate:       {:.3}", metrics["hit_rate"]);
    println!("evictions:      {}", metrics["evictions"]);
    println!("aging passes:   {}", metrics["aging_passes"]);

    let hot_resident = (0..50u64).filter(|key| cache.contains_key(key)).count();
    println!("hot keys kept:  {hot_resident}/50");
}
