#![doc = include_str!("../README.md")]

/// The public cache façade.
///
/// Exposes `put`, `get`, `invalidate`, `len`, and `close`, coordinating the
/// key index, the clock, the expiration check, and the maintenance event
/// queue.
pub mod cache;

/// Time sources.
///
/// The `Clock` trait abstracts monotonic nanosecond time so tests can inject
/// a controllable source.
pub mod clock;

/// Cache configuration.
pub mod config;

/// The per-key record: key, guarded payload, timestamps, recency handle,
/// liveness flag.
pub(crate) mod entry;

/// The expiration predicate.
pub(crate) mod expire;

/// The key → entry mapping behind a readers-writer lock.
pub(crate) mod index;

/// Doubly linked recency list with in-place editing through raw node handles.
///
/// Internal infrastructure: the list is owned and mutated exclusively by the
/// maintenance worker, and its raw pointer surface requires invariants the
/// public API never exposes.
pub(crate) mod list;

/// The event queue types and the maintenance worker that consumes them.
pub(crate) mod maintainer;

// Re-export the public surface.
pub use cache::Cache;
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::CacheConfig;
