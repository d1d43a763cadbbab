//! Per-key async locks
//!
//! Serializes find-or-create sequences that target the same key inside one
//! process. Different keys never contend. A key's entry is dropped once no
//! task holds or waits on it.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type Slot = Arc<AsyncMutex<()>>;

#[derive(Debug)]
pub(crate) struct KeyedLocks<K> {
    locks: Mutex<HashMap<K, Slot>>,
}

impl<K> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self {
            locks: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash + Clone> KeyedLocks<K> {
    /// Wait for exclusive access to `key`
    pub(crate) async fn lock(&self, key: K) -> KeyGuard<'_, K> {
        let slot = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(key.clone()).or_default())
        };
        KeyGuard {
            locks: self,
            key,
            guard: Some(slot.lock_owned().await),
        }
    }

    /// Number of keys currently tracked
    #[cfg(test)]
    fn tracked(&self) -> usize {
        self.locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Exclusive access to one key; releases and prunes on drop
pub(crate) struct KeyGuard<'a, K: Eq + Hash + Clone> {
    locks: &'a KeyedLocks<K>,
    key: K,
    guard: Option<OwnedMutexGuard<()>>,
}

impl<K: Eq + Hash + Clone> Drop for KeyGuard<'_, K> {
    fn drop(&mut self) {
        // Release first so the guard's handle on the slot is gone
        drop(self.guard.take());

        let mut locks = self
            .locks
            .locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        // Waiters clone the slot under this map lock, so a count of one
        // means only the map refers to it
        if locks
            .get(&self.key)
            .is_some_and(|slot| Arc::strong_count(slot) == 1)
        {
            locks.remove(&self.key);
        }
    }
}
