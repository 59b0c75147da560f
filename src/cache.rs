//! The cache façade.
//!
//! [`Cache`] coordinates the key index, the clock, the expiration check, and
//! the event queue. Calls mutate the index synchronously on the calling
//! thread and describe the recency consequence as an event for the
//! maintenance worker, so readers never contend on the recency list.

use crate::clock::{Clock, MonotonicClock};
use crate::config::CacheConfig;
use crate::entry::CacheEntry;
use crate::expire;
use crate::index::KeyIndex;
use crate::maintainer::{Maintainer, RankEvent};
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use crossbeam_channel::Sender;
use hashbrown::hash_map::DefaultHashBuilder;
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use std::thread::JoinHandle;

/// A concurrent key/value cache with LRU eviction and expire-after-write /
/// expire-after-access expiration.
///
/// Any number of threads may call [`put`](Cache::put), [`get`](Cache::get),
/// [`invalidate`](Cache::invalidate), and [`len`](Cache::len) concurrently;
/// wrap the cache in an [`Arc`] to share it. One background worker applies
/// recency updates and performs capacity eviction.
///
/// # Type parameters
///
/// - `K`: key type, hashable and equality-comparable
/// - `V`: value type; [`get`](Cache::get) hands out clones, so cache an
///   `Arc<T>` when cloning `T` itself is expensive
/// - `S`: hash builder, defaulting to the map's default hasher
///
/// # Examples
///
/// ```
/// use std::num::NonZeroUsize;
/// use xlru::{Cache, CacheConfig};
///
/// let cache = Cache::init(CacheConfig::new(NonZeroUsize::new(100).unwrap()));
/// cache.put("a", 1);
/// assert_eq!(cache.get(&"a"), Some(1));
/// assert_eq!(cache.get(&"b"), None);
/// cache.close();
/// ```
pub struct Cache<K, V, S = DefaultHashBuilder> {
    index: Arc<KeyIndex<K, V, S>>,
    /// Producer side of the event queue. `close` takes it, which lets the
    /// worker drain and exit.
    events: RwLock<Option<Sender<RankEvent<K, V>>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    clock: Arc<dyn Clock>,
    expire_after_write: u64,
    expire_after_access: u64,
}

impl<K, V> Cache<K, V, DefaultHashBuilder>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Creates a cache from `config`, timed by a [`MonotonicClock`].
    pub fn init(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(MonotonicClock::new()))
    }

    /// Creates a cache from `config` with an injected time source.
    pub fn with_clock(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self::with_clock_and_hasher(config, clock, DefaultHashBuilder::default())
    }
}

impl<K, V, S> Cache<K, V, S>
where
    K: Hash + Eq + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
    S: BuildHasher + Send + Sync + 'static,
{
    /// Creates a cache from `config` with an injected time source and a
    /// custom hash builder.
    ///
    /// # Panics
    ///
    /// Panics if `config.cleanup_count` or `config.event_queue_size` is zero,
    /// or if the maintenance thread cannot be spawned.
    pub fn with_clock_and_hasher(config: CacheConfig, clock: Arc<dyn Clock>, hash_builder: S) -> Self {
        assert!(
            config.cleanup_count > 0,
            "cleanup_count must be greater than 0"
        );
        assert!(
            config.event_queue_size > 0,
            "event_queue_size must be greater than 0"
        );

        let index = Arc::new(KeyIndex::with_hasher(hash_builder));
        let (sender, receiver) = crossbeam_channel::bounded(config.event_queue_size);

        let maintainer = Maintainer::new(
            receiver,
            Arc::clone(&index),
            Arc::clone(&clock),
            config.max_size.get(),
            config.cleanup_count,
        );
        let worker = std::thread::Builder::new()
            .name("xlru-maintainer".into())
            .spawn(move || maintainer.run())
            .expect("failed to spawn the cache maintenance thread");

        Cache {
            index,
            events: RwLock::new(Some(sender)),
            worker: Mutex::new(Some(worker)),
            clock,
            expire_after_write: config.expire_after_write.as_nanos() as u64,
            expire_after_access: config.expire_after_access.as_nanos() as u64,
        }
    }

    /// Stores `value` under `key`.
    ///
    /// If a live entry already exists for `key`, its payload is replaced in
    /// place and its creation time is preserved, so the expire-after-write
    /// clock is not reset by overwrites. Otherwise a fresh entry is inserted.
    /// Either way the entry is promoted to most recently used.
    ///
    /// Never fails; it may block while the event queue is full.
    pub fn put(&self, key: K, value: V) {
        if let Some(entry) = self.index.get(&key) {
            entry.replace_value(value);
            self.emit(RankEvent::Promote(entry));
            return;
        }

        let now = self.clock.now();
        let entry = Arc::new(CacheEntry::new(key.clone(), value, now));
        self.index.insert(key, Arc::clone(&entry));
        self.emit(RankEvent::Promote(entry));
    }

    /// Returns the value stored under `key`, or `None` if the key is absent,
    /// expired, or mid-eviction.
    ///
    /// A hit promotes the entry to most recently used. An expired entry is
    /// removed synchronously and reported as a miss.
    pub fn get<Q>(&self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let entry = self.index.get(key)?;

        if expire::expired(
            &entry,
            self.clock.now(),
            self.expire_after_write,
            self.expire_after_access,
        ) {
            self.discard(entry);
            return None;
        }

        let value = entry.read_value();
        self.emit(RankEvent::Promote(entry));
        Some(value)
    }

    /// Removes the entry stored under `key`, returning whether one was found.
    ///
    /// The removal is visible to `get` and [`len`](Cache::len) immediately;
    /// the recency list catches up asynchronously.
    pub fn invalidate<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        match self.index.get(key) {
            Some(entry) => {
                self.discard(entry);
                true
            }
            None => false,
        }
    }

    /// Retires an entry: drops it from the index and tells the worker to
    /// forget its rank. Events still queued for the entry become no-ops.
    fn discard(&self, entry: Arc<CacheEntry<K, V>>) {
        entry.retire();
        self.index.remove_if_current(&entry);
        self.emit(RankEvent::Delete(entry));
    }

    /// Hands an event to the maintenance worker, blocking while the queue is
    /// full. After `close` the event is dropped: there is no recency state
    /// left to maintain.
    fn emit(&self, event: RankEvent<K, V>) {
        if let Some(sender) = self.events.read().as_ref() {
            let _ = sender.send(event);
        }
    }
}

impl<K, V, S> Cache<K, V, S> {
    /// Returns the number of entries currently in the index.
    ///
    /// Immediately reflects `put` and `invalidate`; capacity evictions show
    /// up once the worker has processed the backlog.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Shuts down the maintenance worker.
    ///
    /// Events enqueued before the call are fully drained before the worker
    /// exits; `close` returns once it has. Closing twice is a no-op, and the
    /// cache also closes itself when dropped.
    pub fn close(&self) {
        drop(self.events.write().take());
        if let Some(worker) = self.worker.lock().take() {
            let _ = worker.join();
        }
    }
}

impl<K, V, S> Drop for Cache<K, V, S> {
    fn drop(&mut self) {
        self.close();
    }
}

impl<K, V, S> fmt::Debug for Cache<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("len", &self.len())
            .field("closed", &self.events.read().is_none())
            .finish()
    }
}
