use crate::clock::Clock;
use crate::entry::CacheEntry;
use crate::index::KeyIndex;
use crate::list::RankList;
use core::hash::{BuildHasher, Hash};
use core::ptr;
use crossbeam_channel::Receiver;
use std::sync::Arc;

/// A recency event addressed to an entry.
///
/// `Promote` marks the entry as just used; `Delete` announces that it has
/// left the index. Events carry the entry itself, not the key, so the worker
/// never needs an index lookup to service one.
pub(crate) enum RankEvent<K, V> {
    Promote(Arc<CacheEntry<K, V>>),
    Delete(Arc<CacheEntry<K, V>>),
}

/// The single consumer of the event queue.
///
/// Owns the recency list and the size counter outright; no lock protects
/// them because nothing else touches them. Capacity eviction happens here,
/// reaching back into the index to clear the evicted keys.
pub(crate) struct Maintainer<K, V, S> {
    events: Receiver<RankEvent<K, V>>,
    index: Arc<KeyIndex<K, V, S>>,
    clock: Arc<dyn Clock>,
    rank: RankList<Arc<CacheEntry<K, V>>>,
    size: usize,
    max_size: usize,
    cleanup_count: usize,
}

impl<K, V, S> Maintainer<K, V, S>
where
    K: Hash + Eq,
    S: BuildHasher,
{
    pub(crate) fn new(
        events: Receiver<RankEvent<K, V>>,
        index: Arc<KeyIndex<K, V, S>>,
        clock: Arc<dyn Clock>,
        max_size: usize,
        cleanup_count: usize,
    ) -> Self {
        Maintainer {
            events,
            index,
            clock,
            rank: RankList::new(),
            size: 0,
            max_size,
            cleanup_count,
        }
    }

    /// Services events until the queue is closed and drained.
    pub(crate) fn run(mut self) {
        while let Ok(event) = self.events.recv() {
            match event {
                RankEvent::Promote(entry) => self.promote(entry),
                RankEvent::Delete(entry) => self.delete(entry),
            }
            debug_assert_eq!(
                self.size,
                self.rank.len(),
                "size counter diverged from the recency list"
            );
        }
    }

    fn promote(&mut self, entry: Arc<CacheEntry<K, V>>) {
        // An invalidation raced ahead of this promotion; the entry is no
        // longer in the index and must not be ranked.
        if !entry.is_alive() {
            return;
        }

        // SAFETY: rank handles are only accessed on this thread.
        let node = unsafe { entry.rank() };
        if node.is_null() {
            let node = self.rank.push_front(Arc::clone(&entry));
            unsafe { entry.set_rank(node) };
            self.size += 1;

            if self.size > self.max_size {
                self.evict();
            }
        } else {
            entry.touch(self.clock.now());
            // SAFETY: a non-null handle is a live node in our list.
            unsafe { self.rank.move_to_front(node) };
        }
    }

    fn delete(&mut self, entry: Arc<CacheEntry<K, V>>) {
        // SAFETY: rank handles are only accessed on this thread.
        let node = unsafe { entry.rank() };
        if node.is_null() {
            // Never ranked, or already unlinked by eviction or an earlier
            // duplicate deletion.
            return;
        }

        unsafe {
            entry.set_rank(ptr::null_mut());
            // SAFETY: a non-null handle is a live node in our list.
            self.rank.unlink(node);
        }
        debug_assert!(self.size > 0, "deletion underflowed the size counter");
        self.size -= 1;
    }

    /// Removes `cleanup_count` entries from the cold end of the list.
    ///
    /// Evicting a batch rather than a single entry amortizes eviction cost;
    /// the population dips below `max_size` and grows back.
    fn evict(&mut self) {
        for _ in 0..self.cleanup_count {
            let Some(victim) = self.rank.pop_back() else {
                return;
            };
            // SAFETY: rank handles are only accessed on this thread; the
            // node behind this handle was just reclaimed by pop_back.
            unsafe { victim.set_rank(ptr::null_mut()) };
            victim.retire();
            self.index.remove_if_current(&victim);
            debug_assert!(self.size > 0, "eviction underflowed the size counter");
            self.size -= 1;
        }
    }
}
