//! Concurrent Cache Correctness Tests
//!
//! These tests validate that the engine and the sharded cache keep correct
//! eviction semantics while being accessed from multiple threads.
//!
//! ## Test Strategy
//!
//! Unlike throughput benchmarks, these tests:
//! - Use small caches so that eviction happens constantly
//! - Verify eviction policy with a single shard under concurrent access
//! - Verify capacity and lookup invariants with many shards
//!
//! ## Segments
//!
//! 1. **Algorithm Correctness**: eviction behavior under concurrency
//! 2. **Thread Safety Invariants**: cache state consistency under concurrency

extern crate scoped_threadpool;

use lfu_shard::metrics::CacheMetrics;
use lfu_shard::{LfuCache, ShardedLfuCache};
use scoped_threadpool::Pool;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

const NUM_THREADS: u32 = 8;

// ============================================================================
// SEGMENT 1: ALGORITHM CORRECTNESS UNDER CONCURRENCY
// ============================================================================

#[test]
fn test_concurrent_lfu_frequency_based_eviction() {
    let cache: Arc<ShardedLfuCache<i32, i32>> = Arc::new(ShardedLfuCache::with_shards(3, 1));

    cache.put(1, 10);
    cache.put(2, 20);
    cache.put(3, 30);

    let mut handles = vec![];
    for _ in 0..4 {
        let c = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for _ in 0..3 {
                c.get(&1);
            }
            c.get(&2);
        }));
    }
    for handle in handles {
        handle.join().expect("Thread panicked");
    }

    // Key 3 has the lowest frequency (1 from put)
    assert_eq!(cache.put(4, 40), Some((3, 30)));
    assert!(cache.get(&1).is_some(), "Key 1 should remain (highest freq)");
    assert!(cache.get(&2).is_some(), "Key 2 should remain");
    assert!(cache.get(&4).is_some(), "Key 4 should be present");
}

#[test]
fn test_concurrent_frequency_accumulates_exactly() {
    let cache: LfuCache<&str, u32> = LfuCache::new(4);
    cache.put("hot", 1);

    let mut pool = Pool::new(NUM_THREADS);
    pool.scoped(|scope| {
        for _ in 0..NUM_THREADS {
            let cache = &cache;
            scope.execute(move || {
                for _ in 0..100 {
                    assert_eq!(cache.get(&"hot"), Some(1));
                }
            });
        }
    });

    // Every get bumps exactly once; the default ceiling is never reached.
    assert_eq!(cache.frequency(&"hot"), Some(1 + 100 * NUM_THREADS as u64));
}

#[test]
fn test_concurrent_hot_key_survives_churn() {
    let cache: ShardedLfuCache<String, usize> = ShardedLfuCache::with_shards(8, 1);
    cache.put("hot".to_string(), 0);
    for _ in 0..5 {
        cache.get("hot");
    }

    let mut pool = Pool::new(NUM_THREADS);
    pool.scoped(|scope| {
        for t in 0..NUM_THREADS as usize {
            let cache = &cache;
            scope.execute(move || {
                for i in 0..500 {
                    cache.put(format!("cold-{t}-{i}"), i);
                    if i % 50 == 0 {
                        cache.get("hot");
                    }
                }
            });
        }
    });

    assert_eq!(cache.get("hot"), Some(0));
    assert!(cache.len() <= 8);
}

// ============================================================================
// SEGMENT 2: THREAD SAFETY INVARIANTS
// ============================================================================

#[test]
fn test_capacity_never_exceeded_sharded() {
    let cache: Arc<ShardedLfuCache<usize, usize>> = Arc::new(ShardedLfuCache::with_shards(64, 4));
    let bound = cache.shard_count() * cache.shard_capacity();

    let handles: Vec<_> = (0..NUM_THREADS as usize)
        .map(|t| {
            let cache = Arc::clone(&cache);
            thread::spawn(move || {
                for i in 0..2_000 {
                    cache.put(t * 100_000 + i, i);
                    assert!(cache.len() <= bound);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }
    assert!(cache.len() <= bound);
}

#[test]
fn test_get_returns_correct_value() {
    let cache: ShardedLfuCache<usize, usize> = ShardedLfuCache::with_shards(100_000, 8);

    let mut pool = Pool::new(NUM_THREADS);
    pool.scoped(|scope| {
        for t in 0..NUM_THREADS as usize {
            let cache = &cache;
            scope.execute(move || {
                for i in 0..1_000 {
                    let key = t * 10_000 + i;
                    cache.put(key, key * 2);
                    assert_eq!(cache.get(&key), Some(key * 2));
                }
            });
        }
    });

    for t in 0..NUM_THREADS as usize {
        for i in 0..1_000 {
            let key = t * 10_000 + i;
            assert_eq!(cache.get(&key), Some(key * 2));
        }
    }
}

#[test]
fn test_concurrent_single_key() {
    let cache: Arc<LfuCache<u32, usize>> = Arc::new(LfuCache::new(1));
    let writes = Arc::new(AtomicUsize::new(0));

    let handles: Vec<_> = (0..NUM_THREADS as usize)
        .map(|t| {
            let cache = Arc::clone(&cache);
            let writes = Arc::clone(&writes);
            thread::spawn(move || {
                for _ in 0..500 {
                    cache.put(42, t);
                    writes.fetch_add(1, Ordering::Relaxed);
                    let value = cache.get(&42).expect("single key must stay resident");
                    assert!(value < NUM_THREADS as usize);
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(cache.len(), 1);
    let metrics = cache.metrics();
    assert_eq!(metrics["insertions"], 1.0);
    assert_eq!(
        metrics["updates"] as usize,
        writes.load(Ordering::Relaxed) - 1
    );
    assert_eq!(metrics["evictions"], 0.0);
}

#[test]
fn test_remove_consistency() {
    let cache: ShardedLfuCache<usize, usize> = ShardedLfuCache::with_shards(10_000, 4);
    for i in 0..1_000 {
        cache.put(i, i);
    }

    let removed = AtomicUsize::new(0);
    let mut pool = Pool::new(NUM_THREADS);
    pool.scoped(|scope| {
        for _ in 0..NUM_THREADS {
            let cache = &cache;
            let removed = &removed;
            scope.execute(move || {
                for i in 0..1_000 {
                    if cache.remove(&i).is_some() {
                        removed.fetch_add(1, Ordering::Relaxed);
                    }
                }
            });
        }
    });

    // Each key is removed by exactly one thread.
    assert_eq!(removed.load(Ordering::Relaxed), 1_000);
    assert!(cache.is_empty());
    assert_eq!(cache.metrics()["removals"], 1_000.0);
}

#[test]
fn test_purge_during_operations() {
    let cache: ShardedLfuCache<usize, usize> = ShardedLfuCache::with_shards(512, 8);

    let mut pool = Pool::new(NUM_THREADS);
    pool.scoped(|scope| {
        for t in 0..NUM_THREADS as usize {
            let cache = &cache;
            scope.execute(move || {
                for i in 0..2_000 {
                    if t == 0 && i % 100 == 0 {
                        cache.purge();
                    } else {
                        cache.put(t * 10_000 + i, i);
                        let _ = cache.get(&(t * 10_000 + i / 2));
                    }
                }
            });
        }
    });

    assert!(cache.len() <= cache.shard_count() * cache.shard_capacity());
    cache.purge();
    assert!(cache.is_empty());
}

#[test]
fn test_metrics_consistent_after_concurrent_use() {
    let cache: ShardedLfuCache<usize, usize> = ShardedLfuCache::with_shards(256, 4);

    let mut pool = Pool::new(NUM_THREADS);
    pool.scoped(|scope| {
        for t in 0..NUM_THREADS as usize {
            let cache = &cache;
            scope.execute(move || {
                for i in 0..1_000 {
                    cache.put((t * 31 + i) % 400, i);
                    let _ = cache.get(&((t * 17 + i) % 400));
                }
            });
        }
    });

    let metrics = cache.metrics();
    let requests = metrics["requests"];
    assert_eq!(requests, (NUM_THREADS * 1_000) as f64);
    assert_eq!(metrics["cache_hits"] + metrics["cache_misses"], requests);
    assert_eq!(metrics["live_entries"], cache.len() as f64);
    assert_eq!(
        metrics["insertions"] - metrics["evictions"],
        metrics["live_entries"]
    );
}
