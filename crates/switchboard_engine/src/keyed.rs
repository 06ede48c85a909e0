//! Per-key locked state.
//!
//! [`KeyedState`] maps keys to independently locked values. Work on one key
//! never waits for work on another: the outer map is only write-locked to
//! insert a missing key or to sweep, and each value has its own mutex.
//!
//! All locks are synchronous and held only inside the closures passed to
//! [`KeyedState::with`]; nothing here can be held across an `.await`.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Mutex, PoisonError, RwLock};

/// A map of independently locked values.
#[derive(Debug)]
pub struct KeyedState<K, V> {
    entries: RwLock<HashMap<K, Mutex<V>>>,
}

impl<K, V> Default for KeyedState<K, V> {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl<K, V> KeyedState<K, V>
where
    K: Eq + Hash + Clone,
{
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `f` on the value for `key`, creating it with `V::default()`.
    ///
    /// The read and the write inside `f` happen under the key's lock, so
    /// concurrent calls on the same key are linearizable.
    pub fn with<R>(&self, key: &K, f: impl FnOnce(&mut V) -> R) -> R
    where
        V: Default,
    {
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(slot) = entries.get(key) {
                let mut value = slot.lock().unwrap_or_else(PoisonError::into_inner);
                return f(&mut value);
            }
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let slot = entries.entry(key.clone()).or_default();
        let value = slot.get_mut().unwrap_or_else(PoisonError::into_inner);
        f(value)
    }

    /// Runs `f` on the value for `key` if it exists.
    pub fn with_existing<R>(&self, key: &K, f: impl FnOnce(&mut V) -> R) -> Option<R> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let slot = entries.get(key)?;
        let mut value = slot.lock().unwrap_or_else(PoisonError::into_inner);
        Some(f(&mut value))
    }

    /// Keeps only the entries for which `keep` returns true.
    ///
    /// Returns the number of entries removed.
    pub fn retain(&self, mut keep: impl FnMut(&K, &mut V) -> bool) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|key, slot| keep(key, slot.get_mut().unwrap_or_else(PoisonError::into_inner)));
        before - entries.len()
    }

    /// Returns a copy of every entry.
    #[must_use]
    pub fn snapshot(&self) -> Vec<(K, V)>
    where
        V: Clone,
    {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .iter()
            .map(|(key, slot)| {
                let value = slot.lock().unwrap_or_else(PoisonError::into_inner);
                (key.clone(), value.clone())
            })
            .collect()
    }

    /// Replaces every entry.
    pub fn replace_all(&self, items: impl IntoIterator<Item = (K, V)>) {
        let fresh: HashMap<K, Mutex<V>> = items
            .into_iter()
            .map(|(key, value)| (key, Mutex::new(value)))
            .collect();
        *self.entries.write().unwrap_or_else(PoisonError::into_inner) = fresh;
    }

    /// Returns the number of keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Returns true if there are no keys.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
