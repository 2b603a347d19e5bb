//! Transfer state store
//!
//! [`ProcessedSet`] remembers which object keys have been fully handed over
//! to the indexing service (or permanently rejected). It lives in memory
//! for the lifetime of the process and is shared by every pass.
//!
//! A single `RwLock` guards the set, so `mark_processed` is linearizable
//! with `is_processed` for the same key.

use std::collections::HashSet;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Set of fully processed object keys
#[derive(Debug, Default)]
pub struct ProcessedSet {
    keys: RwLock<HashSet<String>>,
}

impl ProcessedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the key has been committed
    pub fn is_processed(&self, key: &str) -> bool {
        self.read().contains(key)
    }

    /// Commits a key
    ///
    /// Returns `true` if the key was newly inserted, `false` if another
    /// pass had already committed it.
    pub fn mark_processed(&self, key: &str) -> bool {
        self.write().insert(key.to_string())
    }

    /// Number of committed keys
    pub fn count(&self) -> usize {
        self.read().len()
    }

    /// Sorted copy of all committed keys
    pub fn snapshot(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.read().iter().cloned().collect();
        keys.sort();
        keys
    }

    // A panic while holding the lock cannot leave the set half-updated,
    // so a poisoned lock is still safe to use.
    fn read(&self) -> RwLockReadGuard<'_, HashSet<String>> {
        self.keys.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashSet<String>> {
        self.keys.write().unwrap_or_else(PoisonError::into_inner)
    }
}
