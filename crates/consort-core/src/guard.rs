//! Synchronization between the control context and the audio context.
//!
//! Two independent locks exist:
//!
//! - the processing lock, which owns the slot table inside
//!   [`PluginRegistry`](crate::PluginRegistry) and is held only around
//!   structural flips and by the audio callback while it iterates slots;
//! - the event lock, [`EventQueue`], guarding injected notes that the audio
//!   callback drains once per block.
//!
//! The audio side only ever `try_lock`s the event lock, so a busy producer
//! delays delivery by one block instead of stalling the callback.

use consort_plugin::NoteEvent;
use parking_lot::Mutex;

/// A note queued by a control-context caller for one plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExternalMidiNote {
    pub plugin_id: i32,
    pub event: NoteEvent,
}

/// Bounded queue of injected notes. Storage is allocated once up front.
pub struct EventQueue {
    events: Mutex<Vec<ExternalMidiNote>>,
    capacity: usize,
}

impl EventQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            events: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.events.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns `false` (and drops the note) when the queue is full.
    pub fn push(&self, note: ExternalMidiNote) -> bool {
        let mut events = self.events.lock();
        if events.len() >= self.capacity {
            return false;
        }
        events.push(note);
        true
    }

    /// Move all pending notes into `out` without blocking.
    ///
    /// Returns `false` if the lock was contended; pending notes stay queued.
    /// `out` should be pre-sized to [`capacity`](Self::capacity) so the audio
    /// thread never allocates.
    pub fn drain_into(&self, out: &mut Vec<ExternalMidiNote>) -> bool {
        match self.events.try_lock() {
            Some(mut events) => {
                out.extend(events.drain(..));
                true
            }
            None => false,
        }
    }

    /// Drop pending notes addressed to `plugin_id`.
    pub fn discard_for(&self, plugin_id: i32) {
        self.events.lock().retain(|n| n.plugin_id != plugin_id);
    }
}
