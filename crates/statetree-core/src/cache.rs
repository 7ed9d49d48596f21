// Content-addressed resolution cache
//
// Maps a content id to a lazily built, shared, immutable value. Lookup and
// slot creation happen under one lock, and each slot is a single-flight
// cell, so concurrent first requests for a key run at most one construction.
// A construction that fails or is cancelled leaves no value behind: the
// last caller holding an empty slot removes it, and the next caller builds
// it again.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OnceCell;
use tracing::debug;

use statetree_types::ContentId;

type Slot<V> = Arc<OnceCell<Arc<V>>>;

/// Removes its slot from the map on drop if the slot is still empty and no
/// other caller holds it
struct SlotGuard<'a, V> {
    slots: &'a Mutex<HashMap<ContentId, Slot<V>>>,
    id: ContentId,
    slot: Slot<V>,
}

impl<V> Drop for SlotGuard<'_, V> {
    fn drop(&mut self) {
        if self.slot.initialized() {
            return;
        }
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        // Release this handle under the lock so concurrent guards see an exact count
        let slot = std::mem::take(&mut self.slot);
        // Held by the map and by this guard only
        if Arc::strong_count(&slot) == 2 && slots.get(&self.id).is_some_and(|s| Arc::ptr_eq(s, &slot)) {
            slots.remove(&self.id);
            debug!(id = %self.id, "resolution cache dropped empty slot");
        }
        drop(slot);
        drop(slots);
    }
}

/// Keyed get-or-create cache with at-most-once construction per key
pub struct ResolutionCache<V> {
    slots: Mutex<HashMap<ContentId, Slot<V>>>,
}

impl<V> Default for ResolutionCache<V> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<V> ResolutionCache<V> {
    pub fn new() -> Self {
        Self::default()
    }

    fn slot(&self, id: ContentId) -> Slot<V> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(id).or_default())
    }

    /// Return the cached value for `id`, building it with `init` if absent.
    ///
    /// Callers arriving while a construction is in flight wait for it and
    /// share its result.
    pub async fn get_or_try_init<F, Fut, E>(&self, id: ContentId, init: F) -> Result<Arc<V>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let guard = SlotGuard {
            slots: &self.slots,
            id,
            slot: self.slot(id),
        };
        if let Some(value) = guard.slot.get() {
            debug!(%id, "resolution cache hit");
            return Ok(Arc::clone(value));
        }
        let value = guard
            .slot
            .get_or_try_init(|| async {
                debug!(%id, "resolution cache miss, constructing");
                init().await.map(Arc::new)
            })
            .await?;
        Ok(Arc::clone(value))
    }

    /// The cached value for `id`, if constructed
    pub fn get(&self, id: &ContentId) -> Option<Arc<V>> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.get(id).and_then(|slot| slot.get().cloned())
    }

    /// Number of constructed entries
    pub fn len(&self) -> usize {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.values().filter(|slot| slot.initialized()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
