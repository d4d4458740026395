//! Shared table handles.
//!
//! A [`KeyedTable`](crate::table::KeyedTable) is an immutable value, so
//! snapshots can be read from any thread; [`SharedTable`] packages one
//! table timeline behind a lock so a single producer can advance it while
//! readers take snapshots concurrently.
//!
//! Uses `parking_lot::RwLock` for better performance under contention.
//! There is deliberately no compare-and-swap or multi-writer merge: all
//! update paths assume one producer.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::table::KeyedTable;

/// Thread-safe handle to a single keyed-table timeline.
#[derive(Debug)]
pub struct SharedTable<K, V> {
    inner: Arc<RwLock<KeyedTable<K, V>>>,
}

impl<K, V> Clone for SharedTable<K, V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K, V> Default for SharedTable<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> SharedTable<K, V> {
    /// Create a handle holding an empty table.
    pub fn new() -> Self {
        Self::from_table(KeyedTable::new())
    }

    /// Create a handle holding an existing snapshot.
    pub fn from_table(table: KeyedTable<K, V>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(table)),
        }
    }

    /// Execute a closure with read access to the current snapshot.
    pub fn with_read<R>(&self, f: impl FnOnce(&KeyedTable<K, V>) -> R) -> R {
        let guard = self.inner.read();
        f(&guard)
    }

    /// Advance the timeline: compute the next table from the current one
    /// and install it, returning the new snapshot.
    pub fn advance(&self, f: impl FnOnce(&KeyedTable<K, V>) -> KeyedTable<K, V>) -> KeyedTable<K, V>
    where
        V: Clone,
    {
        let mut guard = self.inner.write();
        let next = f(&guard);
        *guard = next.clone();
        next
    }
}

impl<K, V: Clone> SharedTable<K, V> {
    /// Clone the current snapshot.
    pub fn snapshot(&self) -> KeyedTable<K, V> {
        self.with_read(|table| table.clone())
    }
}
