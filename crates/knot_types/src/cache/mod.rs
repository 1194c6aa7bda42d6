//! Concurrent canonicalization cache.
//!
//! `Canonical` maps a structural key to the one value built for it. Lookups
//! and inserts may race from any number of threads; for every key exactly
//! one candidate is ever stored, and every caller observes that one.
//! Entries are never evicted.

use std::fmt;
use std::hash::Hash;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use rustc_hash::FxBuildHasher;

/// Load-or-store map from structural keys to canonical values.
pub struct Canonical<K, V> {
    map: DashMap<K, V, FxBuildHasher>,
}

impl<K: Eq + Hash, V: Copy> Canonical<K, V> {
    pub fn new() -> Self {
        Canonical {
            map: DashMap::with_hasher(FxBuildHasher),
        }
    }

    /// The canonical value for `key`, if one has been stored.
    pub fn load(&self, key: &K) -> Option<V> {
        self.map.get(key).map(|entry| *entry.value())
    }

    /// Store `candidate` unless `key` already has a value.
    ///
    /// Returns the canonical value and whether it was already present.
    pub fn load_or_store(&self, key: K, candidate: V) -> (V, bool) {
        match self.map.entry(key) {
            Entry::Occupied(entry) => (*entry.get(), true),
            Entry::Vacant(entry) => {
                entry.insert(candidate);
                (candidate, false)
            }
        }
    }

    /// Like [`load_or_store`](Self::load_or_store), building the candidate
    /// only if the key is missing.
    ///
    /// `build` runs while the key's shard is locked, so it must not touch
    /// this cache.
    pub fn load_or_insert_with(&self, key: K, build: impl FnOnce() -> V) -> V {
        match self.map.entry(key) {
            Entry::Occupied(entry) => *entry.get(),
            Entry::Vacant(entry) => *entry.insert(build()).value(),
        }
    }

    /// Fallible [`load_or_insert_with`](Self::load_or_insert_with). Nothing is
    /// stored if `build` fails.
    pub fn try_load_or_insert_with<E>(
        &self,
        key: K,
        build: impl FnOnce() -> Result<V, E>,
    ) -> Result<V, E> {
        match self.map.entry(key) {
            Entry::Occupied(entry) => Ok(*entry.get()),
            Entry::Vacant(entry) => Ok(*entry.insert(build()?).value()),
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }
}

impl<K: Eq + Hash, V: Copy> Default for Canonical<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> fmt::Debug for Canonical<K, V>
where
    K: Eq + Hash,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Canonical")
            .field("entries", &self.map.len())
            .finish()
    }
}

#[cfg(test)]
#[expect(clippy::expect_used, reason = "Test code uses expect for clarity")]
mod tests;
