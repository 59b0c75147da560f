use crate::list::ListEntry;
use core::cell::UnsafeCell;
use core::fmt;
use core::ptr;
use core::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use parking_lot::RwLock;
use std::sync::Arc;

/// Handle into the recency list: the entry's node, or null while unranked.
pub(crate) type RankNode<K, V> = *mut ListEntry<Arc<CacheEntry<K, V>>>;

/// The record stored per key.
///
/// An entry is shared between caller threads (through the index) and the
/// maintenance worker (through the recency list and the event queue), so its
/// mutable state is split into disjoint ownership regions:
///
/// - `value` is guarded by its own lock, held only for a read or an in-place
///   replacement. Callers never hold it across another lock.
/// - `created_at` is immutable after construction.
/// - `accessed_at` is written only by the maintenance worker (the "touch" on
///   promotion) and read by the expiration check on caller threads, so it is
///   atomic.
/// - `rank` is read and written exclusively on the maintenance worker thread.
/// - `alive` is set to false exactly once, by whichever side removes the
///   entry from the index; the worker reads it to discard stale events.
pub(crate) struct CacheEntry<K, V> {
    /// The cached key. Used by eviction to find the index slot to clear.
    pub(crate) key: K,

    /// The cached value, replaceable in place.
    value: RwLock<V>,

    /// Creation timestamp in clock nanos. Overwrites do not reset it.
    created_at: u64,

    /// Last-access timestamp in clock nanos.
    accessed_at: AtomicU64,

    /// The entry's node in the recency list; null until first promoted.
    rank: UnsafeCell<RankNode<K, V>>,

    /// True from creation until the entry leaves the index.
    alive: AtomicBool,
}

// SAFETY: all fields other than `rank` are Send/Sync-safe on their own
// (atomics, a lock, immutable data). `rank` is a raw pointer behind an
// UnsafeCell; it is only dereferenced and only mutated on the maintenance
// worker thread, which owns the list the pointer leads into.
unsafe impl<K: Send, V: Send> Send for CacheEntry<K, V> {}
unsafe impl<K: Send + Sync, V: Send + Sync> Sync for CacheEntry<K, V> {}

impl<K, V> CacheEntry<K, V> {
    /// Creates a live, unranked entry with both timestamps set to `now`.
    pub(crate) fn new(key: K, value: V, now: u64) -> Self {
        CacheEntry {
            key,
            value: RwLock::new(value),
            created_at: now,
            accessed_at: AtomicU64::new(now),
            rank: UnsafeCell::new(ptr::null_mut()),
            alive: AtomicBool::new(true),
        }
    }

    /// Returns a clone of the payload.
    pub(crate) fn read_value(&self) -> V
    where
        V: Clone,
    {
        self.value.read().clone()
    }

    /// Replaces the payload in place. Timestamps are untouched; the
    /// accompanying promotion refreshes the access time.
    pub(crate) fn replace_value(&self, value: V) {
        *self.value.write() = value;
    }

    pub(crate) fn created_at(&self) -> u64 {
        self.created_at
    }

    pub(crate) fn accessed_at(&self) -> u64 {
        self.accessed_at.load(Ordering::Acquire)
    }

    /// Records an access at time `now`.
    pub(crate) fn touch(&self, now: u64) {
        self.accessed_at.store(now, Ordering::Release);
    }

    pub(crate) fn is_alive(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Marks the entry dead. Pending events addressed to it are discarded
    /// when the maintenance worker dequeues them.
    pub(crate) fn retire(&self) {
        self.alive.store(false, Ordering::Release);
    }

    /// Returns the entry's recency handle.
    ///
    /// # Safety
    ///
    /// May only be called on the maintenance worker thread.
    pub(crate) unsafe fn rank(&self) -> RankNode<K, V> {
        *self.rank.get()
    }

    /// Stores the entry's recency handle.
    ///
    /// # Safety
    ///
    /// May only be called on the maintenance worker thread.
    pub(crate) unsafe fn set_rank(&self, node: RankNode<K, V>) {
        *self.rank.get() = node;
    }
}

impl<K: fmt::Debug, V> fmt::Debug for CacheEntry<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheEntry")
            .field("key", &self.key)
            .field("created_at", &self.created_at)
            .field("accessed_at", &self.accessed_at())
            .field("alive", &self.is_alive())
            .finish()
    }
}
