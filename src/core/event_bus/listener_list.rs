//=========================================================================
// Listener List
//=========================================================================
//
// Ordered per-key listener storage for the event bus.
//
// Insertion order is dispatch order. Entries are addressed by their
// ListenerId, so the same callback registered twice lives in two
// independent entries and fires twice.
//
//=========================================================================

//=== External Dependencies ===============================================

use std::sync::Arc;

//=== Internal Dependencies ===============================================

use super::{EventValue, ListenerId};

//=========================================================================

/// Shared, thread-safe listener callback.
pub(crate) type Callback = Arc<dyn Fn(EventValue) + Send + Sync + 'static>;

/// A single registration: token plus callback.
#[derive(Clone)]
pub(crate) struct ListenerEntry {
    pub(crate) id: ListenerId,
    pub(crate) callback: Callback,
}

//=========================================================================

/// Ordered collection of listeners registered for one event key.
#[derive(Default)]
pub(super) struct ListenerList {
    entries: Vec<ListenerEntry>,
}

impl ListenerList {
    pub(super) fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Appends a listener at the end of the dispatch order.
    pub(super) fn push(&mut self, id: ListenerId, callback: Callback) {
        self.entries.push(ListenerEntry { id, callback });
    }

    /// Removes the first entry carrying `id`.
    ///
    /// Returns true if an entry was removed.
    pub(super) fn remove(&mut self, id: ListenerId) -> bool {
        match self.entries.iter().position(|entry| entry.id == id) {
            Some(pos) => {
                self.entries.remove(pos);
                true
            }
            None => false,
        }
    }

    pub(super) fn contains(&self, id: ListenerId) -> bool {
        self.entries.iter().any(|entry| entry.id == id)
    }

    /// Clones the current entries so callbacks can run without the bus lock.
    pub(super) fn snapshot(&self) -> Vec<ListenerEntry> {
        self.entries.clone()
    }

    pub(super) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(super) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//=========================================================================
// Tests
//=========================================================================
