//! Stress Tests
//!
//! Exercises the cache under concurrent mixed workloads: no panics, no
//! deadlocks, no leaked entries, and a predictable population once the
//! maintenance queue has drained.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::thread;
use xlru::{Cache, CacheConfig};

const NUM_THREADS: usize = 8;

fn config(max_size: usize) -> CacheConfig {
    CacheConfig::new(NonZeroUsize::new(max_size).unwrap())
}

#[test]
fn stress_distinct_keys_all_survive() {
    const KEYS_PER_THREAD: usize = 500;

    let cache: Arc<Cache<usize, usize>> = Arc::new(Cache::init(config(10_000)));

    let mut handles = Vec::new();
    for t in 0..NUM_THREADS {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for i in 0..KEYS_PER_THREAD {
                let key = t * KEYS_PER_THREAD + i;
                cache.put(key, key);
                assert_eq!(cache.get(&key), Some(key));
            }
        }));
    }
    for handle in handles {
        handle.join().expect("thread panicked");
    }
    cache.close();

    // No eviction, no invalidation: every put survives.
    assert_eq!(cache.len(), NUM_THREADS * KEYS_PER_THREAD);
}

#[test]
fn stress_put_then_invalidate_leaves_exact_population() {
    const KEYS_PER_THREAD: usize = 1_000;

    let cache: Arc<Cache<usize, usize>> = Arc::new(Cache::init(config(100_000)));

    let mut handles = Vec::new();
    for t in 0..NUM_THREADS {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for i in 0..KEYS_PER_THREAD {
                let key = t * KEYS_PER_THREAD + i;
                cache.put(key, key);
                if i % 2 == 0 {
                    assert!(cache.invalidate(&key));
                }
            }
        }));
    }
    for handle in handles {
        handle.join().expect("thread panicked");
    }
    cache.close();

    // Each thread removed its even half; the odd half remains.
    assert_eq!(cache.len(), NUM_THREADS * KEYS_PER_THREAD / 2);
}

#[test]
fn stress_mixed_operations_on_overlapping_keys() {
    const OPS_PER_THREAD: usize = 5_000;
    const KEY_SPACE: usize = 200;
    const MAX_SIZE: usize = 100;

    let mut cfg = config(MAX_SIZE);
    cfg.cleanup_count = 1;
    let cache: Arc<Cache<usize, usize>> = Arc::new(Cache::init(cfg));

    let mut handles = Vec::new();
    for t in 0..NUM_THREADS {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for i in 0..OPS_PER_THREAD {
                let key = (t + i) % KEY_SPACE;
                match i % 4 {
                    0 | 1 => cache.put(key, i),
                    2 => {
                        if let Some(value) = cache.get(&key) {
                            assert!(value < OPS_PER_THREAD);
                        }
                    }
                    _ => {
                        let _ = cache.invalidate(&key);
                    }
                }
            }
        }));
    }
    for handle in handles {
        handle.join().expect("thread panicked");
    }
    cache.close();

    // Every event has drained, so the population is within the bound.
    assert!(cache.len() <= MAX_SIZE);

    // The cache is still coherent after the storm.
    for key in 0..KEY_SPACE {
        let _ = cache.get(&key);
    }
}

#[test]
fn stress_high_contention_few_keys() {
    const OPS_PER_THREAD: usize = 10_000;
    const KEY_SPACE: usize = 10;

    let cache: Arc<Cache<usize, usize>> = Arc::new(Cache::init(config(100)));

    let mut handles = Vec::new();
    for t in 0..2 * NUM_THREADS {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for i in 0..OPS_PER_THREAD {
                let key = i % KEY_SPACE;
                if t % 2 == 0 {
                    cache.put(key, t * OPS_PER_THREAD + i);
                } else {
                    let _ = cache.get(&key);
                }
            }
        }));
    }
    for handle in handles {
        handle.join().expect("thread panicked");
    }
    cache.close();

    assert!(cache.len() <= KEY_SPACE);
}

#[test]
fn stress_tiny_event_queue_applies_backpressure_without_deadlock() {
    const KEYS_PER_THREAD: usize = 2_000;

    let mut cfg = config(100);
    cfg.event_queue_size = 4;
    let cache: Arc<Cache<usize, usize>> = Arc::new(Cache::init(cfg));

    let mut handles = Vec::new();
    for t in 0..4 {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || {
            for i in 0..KEYS_PER_THREAD {
                let key = t * KEYS_PER_THREAD + i;
                cache.put(key, key);
                let _ = cache.get(&key);
            }
        }));
    }
    for handle in handles {
        handle.join().expect("thread panicked");
    }
    cache.close();

    assert!(cache.len() <= 100);
}

#[test]
fn stress_close_drains_full_backlog() {
    let mut cfg = config(50);
    cfg.cleanup_count = 5;
    let cache: Cache<usize, usize> = Cache::init(cfg);

    for i in 0..1_000 {
        cache.put(i, i);
    }
    // No settling: close itself must wait for every queued promotion and
    // the evictions they trigger.
    cache.close();

    assert!(cache.len() <= 50);
    assert!(cache.get(&999).is_some());
}

#[test]
fn stress_concurrent_close_is_safe() {
    let cache: Arc<Cache<usize, usize>> = Arc::new(Cache::init(config(100)));
    for i in 0..100 {
        cache.put(i, i);
    }

    let mut handles = Vec::new();
    for _ in 0..4 {
        let cache = Arc::clone(&cache);
        handles.push(thread::spawn(move || cache.close()));
    }
    for handle in handles {
        handle.join().expect("thread panicked");
    }

    assert_eq!(cache.len(), 100);
}
