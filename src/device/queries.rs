//! Occlusion query tracking
//!
//! Draws with occlusion testing enabled register a pending query here.
//! The render thread polls the set opportunistically after clears,
//! draws, and reclaim ticks, and spins it down to empty at frame
//! completion. Resolved queries write their sample count straight into
//! the originating object through a shared atomic.

use std::sync::atomic::{AtomicI32, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;

use slotmap::SlotMap;

use crate::backend::{GlBackend, QueryId};

slotmap::new_key_type! {
    /// Key of a pending query
    pub struct QueryKey;
}

/// A query awaiting its result
pub struct PendingQuery {
    pub id: QueryId,

    /// Destination for the resolved sample count
    pub samples: Arc<AtomicI32>,
}

/// The set of unresolved occlusion queries of one device
pub struct QueryTracker {
    enabled: bool,
    pending: Mutex<SlotMap<QueryKey, PendingQuery>>,
}

impl QueryTracker {
    /// Create a tracker; a disabled tracker ignores all work
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            pending: Mutex::new(SlotMap::with_key()),
        }
    }

    /// Whether the backend supports occlusion queries at all
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Register a query issued by a draw
    pub fn insert(&self, id: QueryId, samples: Arc<AtomicI32>) -> QueryKey {
        self.pending
            .lock()
            .unwrap()
            .insert(PendingQuery { id, samples })
    }

    /// Number of unresolved queries
    pub fn pending_count(&self) -> usize {
        self.pending.lock().unwrap().len()
    }

    /// Resolve every query whose result is ready, without blocking
    ///
    /// Returns the number of queries still pending. Render thread only.
    pub fn poll(&self, backend: &dyn GlBackend) -> usize {
        if !self.enabled {
            return 0;
        }
        let mut pending = self.pending.lock().unwrap();
        let ready: Vec<QueryKey> = pending
            .iter()
            .filter(|(_, q)| backend.query_result_available(q.id))
            .map(|(k, _)| k)
            .collect();
        for key in ready {
            if let Some(q) = pending.remove(key) {
                let samples = backend.query_result(q.id);
                q.samples.store(samples as i32, Ordering::SeqCst);
                backend.delete_query(q.id);
            }
        }
        pending.len()
    }

    /// Spin until every pending query has resolved
    ///
    /// Yields the thread every 16th iteration so a slow GPU does not
    /// starve the rest of the process. Render thread only.
    pub fn wait(&self, backend: &dyn GlBackend) {
        if !self.enabled {
            return;
        }
        let mut i: u32 = 0;
        while self.poll(backend) > 0 {
            i = i.wrapping_add(1);
            if i % 16 == 0 {
                thread::yield_now();
            }
        }
    }
}

#[cfg(test)]
#[path = "queries_tests.rs"]
mod tests;
