//! Cache configuration.
//!
//! [`CacheConfig`] is a plain public-field struct: set the fields you care
//! about, or start from [`CacheConfig::new`] which fills in the defaults for
//! everything except the required capacity.
//!
//! # Examples
//!
//! ```
//! use std::num::NonZeroUsize;
//! use std::time::Duration;
//! use xlru::CacheConfig;
//!
//! // Capacity only; eviction batch and queue bound are defaulted,
//! // both expirations are disabled.
//! let config = CacheConfig::new(NonZeroUsize::new(1000).unwrap());
//! assert_eq!(config.cleanup_count, 10);
//!
//! // Full configuration.
//! let config = CacheConfig {
//!     max_size: NonZeroUsize::new(10_000).unwrap(),
//!     cleanup_count: 5,
//!     expire_after_write: Duration::from_secs(3600),
//!     expire_after_access: Duration::from_secs(600),
//!     event_queue_size: 1024,
//! };
//! assert_eq!(config.max_size.get(), 10_000);
//! ```

use core::fmt;
use core::num::NonZeroUsize;
use core::time::Duration;

/// Fraction of `max_size` evicted per capacity breach by default.
const CLEANUP_FACTOR: f64 = 0.01;

/// Default bound of the maintenance event queue.
const DEFAULT_EVENT_QUEUE_SIZE: usize = 1024;

/// Configuration for a [`Cache`](crate::Cache).
///
/// # Fields
///
/// - `max_size`: upper bound on live entries
/// - `cleanup_count`: entries evicted per capacity breach; batching eviction
///   amortizes its cost at the price of a small hysteresis band below
///   `max_size`
/// - `expire_after_write`: expire entries this long after creation;
///   `Duration::ZERO` disables
/// - `expire_after_access`: expire entries this long after the last access;
///   `Duration::ZERO` disables
/// - `event_queue_size`: bound of the maintenance event queue; producers
///   block while it is full
#[derive(Clone, Copy)]
pub struct CacheConfig {
    /// Maximum number of live entries the cache can hold.
    pub max_size: NonZeroUsize,
    /// Number of entries evicted each time `max_size` is exceeded.
    pub cleanup_count: usize,
    /// Time to expire entries after creation. `Duration::ZERO` disables.
    pub expire_after_write: Duration,
    /// Time to expire entries after their last access. `Duration::ZERO` disables.
    pub expire_after_access: Duration,
    /// Capacity of the maintenance event queue.
    pub event_queue_size: usize,
}

impl CacheConfig {
    /// Creates a configuration with the given capacity and defaults for
    /// everything else: 1% eviction batches (at least one entry), no
    /// expiration, a 1024-event queue.
    ///
    /// # Examples
    ///
    /// ```
    /// use std::num::NonZeroUsize;
    /// use std::time::Duration;
    /// use xlru::CacheConfig;
    ///
    /// let config = CacheConfig::new(NonZeroUsize::new(500).unwrap());
    /// assert_eq!(config.cleanup_count, 5);
    /// assert_eq!(config.expire_after_write, Duration::ZERO);
    /// ```
    pub fn new(max_size: NonZeroUsize) -> Self {
        let cleanup_count = ((max_size.get() as f64 * CLEANUP_FACTOR) as usize).max(1);
        CacheConfig {
            max_size,
            cleanup_count,
            expire_after_write: Duration::ZERO,
            expire_after_access: Duration::ZERO,
            event_queue_size: DEFAULT_EVENT_QUEUE_SIZE,
        }
    }
}

impl fmt::Debug for CacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheConfig")
            .field("max_size", &self.max_size)
            .field("cleanup_count", &self.cleanup_count)
            .field("expire_after_write", &self.expire_after_write)
            .field("expire_after_access", &self.expire_after_access)
            .field("event_queue_size", &self.event_queue_size)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CacheConfig::new(NonZeroUsize::new(1000).unwrap());
        assert_eq!(config.max_size.get(), 1000);
        assert_eq!(config.cleanup_count, 10);
        assert_eq!(config.expire_after_write, Duration::ZERO);
        assert_eq!(config.expire_after_access, Duration::ZERO);
        assert_eq!(config.event_queue_size, 1024);
    }

    #[test]
    fn test_cleanup_count_is_at_least_one() {
        // 1% of a small capacity rounds down to zero; a cache that never
        // evicted anything on a breach would grow without bound.
        let config = CacheConfig::new(NonZeroUsize::new(5).unwrap());
        assert_eq!(config.cleanup_count, 1);

        let config = CacheConfig::new(NonZeroUsize::new(99).unwrap());
        assert_eq!(config.cleanup_count, 1);

        let config = CacheConfig::new(NonZeroUsize::new(100).unwrap());
        assert_eq!(config.cleanup_count, 1);

        let config = CacheConfig::new(NonZeroUsize::new(200).unwrap());
        assert_eq!(config.cleanup_count, 2);
    }

    #[test]
    fn test_custom_fields() {
        let config = CacheConfig {
            max_size: NonZeroUsize::new(100).unwrap(),
            cleanup_count: 25,
            expire_after_write: Duration::from_millis(10),
            expire_after_access: Duration::from_millis(20),
            event_queue_size: 4096,
        };
        assert_eq!(config.cleanup_count, 25);
        assert_eq!(config.expire_after_write, Duration::from_millis(10));
        assert_eq!(config.event_queue_size, 4096);
    }
}
