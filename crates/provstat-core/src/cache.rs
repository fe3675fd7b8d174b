// crates/provstat-core/src/cache.rs

//! Explicit memoization with manual invalidation.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard};

/// A keyed cache of shared, immutable values.
///
/// Entries live until [`Memo::invalidate`] or [`Memo::clear`]; nothing
/// expires on its own. A failed computation caches nothing.
///
/// The lock is held while a value is computed, so concurrent callers for
/// any key wait instead of computing twice.
#[derive(Debug)]
pub struct Memo<K, V> {
    entries: Mutex<HashMap<K, Arc<V>>>,
}

impl<K: Eq + Hash + Clone, V> Default for Memo<K, V> {
    fn default() -> Self {
        Memo::new()
    }
}

impl<K: Eq + Hash + Clone, V> Memo<K, V> {
    pub fn new() -> Self {
        Memo {
            entries: Mutex::new(HashMap::new()),
        }
    }

    // A panic while computing cannot leave a half-written entry behind.
    fn lock(&self) -> MutexGuard<'_, HashMap<K, Arc<V>>> {
        self.entries.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn get(&self, key: &K) -> Option<Arc<V>> {
        self.lock().get(key).cloned()
    }

    /// Returns the cached value for `key`, computing and storing it first
    /// if absent.
    pub fn get_or_try_insert_with<E>(&self, key: &K, compute: impl FnOnce() -> Result<V, E>) -> Result<Arc<V>, E> {
        let mut entries = self.lock();
        if let Some(hit) = entries.get(key) {
            return Ok(Arc::clone(hit));
        }
        let value = Arc::new(compute()?);
        entries.insert(key.clone(), Arc::clone(&value));
        Ok(value)
    }

    /// Drops one entry. Returns whether it was cached.
    pub fn invalidate(&self, key: &K) -> bool {
        self.lock().remove(key).is_some()
    }

    pub fn clear(&self) {
        self.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
