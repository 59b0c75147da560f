//! Full configuration: both expirations and a custom eviction batch size.

use std::num::NonZeroUsize;
use std::time::Duration;
use xlru::{Cache, CacheConfig};

fn main() {
    let config = CacheConfig {
        max_size: NonZeroUsize::new(10_000).unwrap(),
        cleanup_count: 5,
        expire_after_write: Duration::from_secs(60 * 60),
        expire_after_access: Duration::from_secs(10 * 60),
        event_queue_size: 1024,
    };
    let cache = Cache::init(config);

    cache.put(42, "answer");

    if let Some(value) = cache.get(&42) {
        println!("Value: {value}");
    }

    println!("Cache len: {}", cache.len());

    cache.invalidate(&42);
    cache.close();
}
