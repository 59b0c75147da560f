//! Minimal usage: default configuration, put/get/invalidate.

use std::num::NonZeroUsize;
use xlru::{Cache, CacheConfig};

fn main() {
    let cache = Cache::init(CacheConfig::new(NonZeroUsize::new(100).unwrap()));

    cache.put(42, "answer");

    if let Some(value) = cache.get(&42) {
        println!("Value: {value}");
    }

    println!("Cache len: {}", cache.len());

    cache.invalidate(&42);
    cache.close();
}
