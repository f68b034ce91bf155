//! In-flight request metadata, keyed by correlation ID.
//!
//! Tracked separately from the waiter registry: a record can outlive its reply
//! slot (or exist without one) until the caller deletes it.

use crate::id::CorrelationId;
use parking_lot::RwLock;
use std::collections::HashMap;

/// Generic concurrent store of caller-defined request records.
///
/// Readers share the lock; `store`/`delete` take it exclusively. Only map
/// operations run while it is held.
#[derive(Debug)]
pub struct RequestRegistry<T> {
    store: RwLock<HashMap<CorrelationId, T>>,
}

impl<T> RequestRegistry<T> {
    pub fn new() -> Self {
        Self {
            store: RwLock::new(HashMap::new()),
        }
    }

    /// Insert or overwrite the record for `id`.
    pub fn store(&self, id: CorrelationId, record: T) {
        self.store.write().insert(id, record);
    }

    pub fn has_request(&self, id: CorrelationId) -> bool {
        self.store.read().contains_key(&id)
    }

    /// Remove the record for `id`; absent IDs are ignored.
    pub fn delete(&self, id: CorrelationId) {
        self.store.write().remove(&id);
    }

    pub fn len(&self) -> usize {
        self.store.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.read().is_empty()
    }
}

impl<T: Clone> RequestRegistry<T> {
    pub fn get(&self, id: CorrelationId) -> Option<T> {
        self.store.read().get(&id).cloned()
    }

    /// Independent copy of every record.
    pub fn all(&self) -> HashMap<CorrelationId, T> {
        self.store.read().clone()
    }
}

impl<T> Default for RequestRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
