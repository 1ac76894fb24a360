//! Per-key single-flight coordination.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OnceCell;

/// Deduplicates concurrent work by key.
///
/// The first caller for a key runs its future; callers arriving while it is
/// in flight wait for and receive a clone of the same result. Once the result
/// is available the slot is released, so the next call for the key starts
/// fresh (callers re-check their own cache inside the future).
///
/// If the running caller is cancelled, one of the waiters runs its own future
/// in its place.
pub struct SingleFlight<K, V> {
    slots: Mutex<HashMap<K, Arc<OnceCell<V>>>>,
}

impl<K, V> SingleFlight<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create an empty coordinator.
    #[must_use]
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Run `work` for `key` unless a run for the same key is already in
    /// flight, in which case await that run's result instead.
    pub async fn run<F, Fut>(&self, key: K, work: F) -> V
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        let cell = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(key.clone()).or_default())
        };

        let value = cell.get_or_init(work).await.clone();

        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if slots.get(&key).is_some_and(|slot| Arc::ptr_eq(slot, &cell)) {
            slots.remove(&key);
        }

        value
    }

    /// Number of keys with a run in flight.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

impl<K, V> Default for SingleFlight<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}
