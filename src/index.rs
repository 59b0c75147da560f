use crate::entry::CacheEntry;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use hashbrown::HashMap;
use parking_lot::RwLock;
use std::sync::Arc;

/// The key → entry mapping, guarded by a single readers-writer lock.
///
/// Lookups take the shared guard; point insertions and deletions take the
/// exclusive guard. The index stores shared handles to entries; the recency
/// list owned by the maintenance worker holds its own handles to the same
/// entries.
pub(crate) struct KeyIndex<K, V, S> {
    map: RwLock<HashMap<K, Arc<CacheEntry<K, V>>, S>>,
}

impl<K, V, S> KeyIndex<K, V, S> {
    pub(crate) fn with_hasher(hash_builder: S) -> Self {
        KeyIndex {
            map: RwLock::new(HashMap::with_hasher(hash_builder)),
        }
    }

    /// Returns the current number of entries.
    pub(crate) fn len(&self) -> usize {
        self.map.read().len()
    }
}

impl<K: Hash + Eq, V, S: BuildHasher> KeyIndex<K, V, S> {
    /// Looks up the entry for `key` under the shared guard.
    pub(crate) fn get<Q>(&self, key: &Q) -> Option<Arc<CacheEntry<K, V>>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.map.read().get(key).cloned()
    }

    /// Inserts or replaces the entry for `key`.
    pub(crate) fn insert(&self, key: K, entry: Arc<CacheEntry<K, V>>) {
        self.map.write().insert(key, entry);
    }

    /// Removes the mapping for `entry.key`, but only while it still points at
    /// `entry` itself. A fresh entry re-inserted under the same key between
    /// the caller's lookup and this removal is left untouched.
    pub(crate) fn remove_if_current(&self, entry: &Arc<CacheEntry<K, V>>) -> bool {
        let mut map = self.map.write();
        match map.get(&entry.key) {
            Some(current) if Arc::ptr_eq(current, entry) => {
                map.remove(&entry.key);
                true
            }
            _ => false,
        }
    }
}

impl<K, V, S> fmt::Debug for KeyIndex<K, V, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyIndex")
            .field("len", &self.len())
            .finish()
    }
}
