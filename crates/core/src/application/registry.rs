// Registry Publisher - the active set of queue handles
//
// Readers load an immutable snapshot; a publish swaps the whole snapshot in
// one compare-and-swap, so no reader ever sees a half-updated list.

use crate::application::constants::INITIAL_GENERATION;
use crate::domain::QueueHandle;
use arc_swap::{ArcSwap, Guard};
use std::sync::Arc;

/// Immutable view of the published handles
#[derive(Debug, Clone)]
pub struct RegistrySnapshot {
    /// Generation of the refresh cycle that produced this snapshot
    pub generation: u64,
    pub handles: Vec<QueueHandle>,
    /// Publish time (ms since epoch), None before the first publish
    pub published_at_ms: Option<i64>,
}

impl RegistrySnapshot {
    fn empty() -> Self {
        Self {
            generation: INITIAL_GENERATION,
            handles: Vec::new(),
            published_at_ms: None,
        }
    }

    pub fn queue_names(&self) -> Vec<&str> {
        self.handles.iter().map(|h| h.name()).collect()
    }

    pub fn find(&self, queue: &str) -> Option<&QueueHandle> {
        self.handles.iter().find(|h| h.name() == queue)
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

/// Shared registry: one writer at a time, any number of readers
pub struct QueueRegistry {
    current: ArcSwap<RegistrySnapshot>,
}

impl QueueRegistry {
    /// Empty registry (generation 0)
    pub fn new() -> Self {
        Self {
            current: ArcSwap::from_pointee(RegistrySnapshot::empty()),
        }
    }

    /// Current snapshot
    pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
        self.current.load_full()
    }

    pub fn generation(&self) -> u64 {
        self.current.load().generation
    }

    /// Replace the whole registry with `handles`
    ///
    /// Only a strictly newer generation replaces the current snapshot.
    /// Returns false when a newer (or equal) generation is already published.
    pub fn publish(&self, generation: u64, handles: Vec<QueueHandle>, published_at_ms: i64) -> bool {
        let next = Arc::new(RegistrySnapshot {
            generation,
            handles,
            published_at_ms: Some(published_at_ms),
        });

        let mut current = self.current.load_full();
        loop {
            if current.generation >= generation {
                return false;
            }
            let previous = self.current.compare_and_swap(&current, Arc::clone(&next));
            if Arc::ptr_eq(&previous, &current) {
                return true;
            }
            current = Guard::into_inner(previous);
        }
    }
}

impl Default for QueueRegistry {
    fn default() -> Self {
        Self::new()
    }
}
