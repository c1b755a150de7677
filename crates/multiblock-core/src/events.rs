//! Lifecycle notifications emitted by the structure manager.

use std::sync::Mutex;

use crate::{BlockHandle, BlockPos, StructureDefinition};

/// Notification about a structure's lifecycle transition.
#[derive(Debug, Clone, PartialEq)]
pub enum StructureEvent {
    /// A new structure was detected and materialized
    Formed {
        /// Pattern-type name
        structure_type: String,
        /// The detection result the structure was built from
        definition: StructureDefinition,
    },
    /// A structure is about to be unformed; markers are still attached
    BeforeUnformed {
        /// Pattern-type name
        structure_type: String,
        /// Anchor cell of the doomed structure
        anchor: BlockPos,
    },
    /// A persisted structure's region finished loading and its aggregate
    /// was reconstructed
    Loaded {
        /// Pattern-type name
        structure_type: String,
        /// Handle of the anchor cell
        anchor: BlockHandle,
    },
    /// A structure's region is about to page out; markers stay persisted
    BeforeUnloaded {
        /// Pattern-type name
        structure_type: String,
        /// Handle of the anchor cell
        anchor: BlockHandle,
    },
}

/// Collaborator notified of structure lifecycle transitions.
pub trait StructureObserver: Send + Sync {
    /// Receive one notification.
    fn on_event(&self, event: &StructureEvent);
}

/// Observer that discards every notification.
pub struct NullObserver;

impl StructureObserver for NullObserver {
    fn on_event(&self, _event: &StructureEvent) {}
}

/// Observer that records every notification for later inspection.
///
/// Used by tests throughout the workspace.
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<StructureEvent>>,
}

impl RecordingObserver {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the events recorded so far.
    pub fn events(&self) -> Vec<StructureEvent> {
        self.events.lock().expect("observer lock poisoned").clone()
    }

    /// Discard all recorded events.
    pub fn clear(&self) {
        self.events.lock().expect("observer lock poisoned").clear();
    }
}

impl StructureObserver for RecordingObserver {
    fn on_event(&self, event: &StructureEvent) {
        self.events
            .lock()
            .expect("observer lock poisoned")
            .push(event.clone());
    }
}
