//! Front-end notification dispatch.

use arc_swap::ArcSwapOption;
use crossbeam::queue::ArrayQueue;
use std::sync::Arc;

/// Listener registered by the front end.
pub type Listener = Box<dyn Fn(CallbackEvent) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CallbackKind {
    Debug,
    ParameterChanged,
    ProgramChanged,
    MidiProgramChanged,
    NoteOn,
    NoteOff,
    ShowGui,
    ResizeGui,
    Update,
    ReloadInfo,
    ReloadParameters,
    ReloadPrograms,
    ReloadAll,
    Quit,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallbackEvent {
    pub kind: CallbackKind,
    pub plugin_id: i32,
    pub value1: i32,
    pub value2: i32,
    pub value3: f64,
}

impl CallbackEvent {
    pub fn new(kind: CallbackKind, plugin_id: i32, value1: i32, value2: i32, value3: f64) -> Self {
        Self {
            kind,
            plugin_id,
            value1,
            value2,
            value3,
        }
    }
}

/// Holds at most one listener.
///
/// `dispatch` calls the listener synchronously on the calling thread. Audio
/// context code must use [`post`](Self::post) instead; posted events wait in a
/// lock-free queue until [`dispatch_posted`](Self::dispatch_posted) runs on a
/// non-real-time thread.
pub struct CallbackDispatcher {
    listener: ArcSwapOption<Listener>,
    posted: ArrayQueue<CallbackEvent>,
}

impl CallbackDispatcher {
    pub fn new(post_capacity: usize) -> Self {
        Self {
            listener: ArcSwapOption::empty(),
            posted: ArrayQueue::new(post_capacity.max(1)),
        }
    }

    /// Replaces any previous listener; `None` unregisters.
    pub fn set_listener(&self, listener: Option<Listener>) {
        self.listener.store(listener.map(Arc::new));
    }

    pub fn has_listener(&self) -> bool {
        self.listener.load().is_some()
    }

    pub fn dispatch(&self, kind: CallbackKind, plugin_id: i32, value1: i32, value2: i32, value3: f64) {
        self.emit(CallbackEvent::new(kind, plugin_id, value1, value2, value3));
    }

    pub fn emit(&self, event: CallbackEvent) {
        if let Some(listener) = self.listener.load_full() {
            (*listener)(event);
        }
    }

    /// Wait-free; returns `false` if the queue is full and the event was dropped.
    #[inline]
    pub fn post(&self, event: CallbackEvent) -> bool {
        self.posted.push(event).is_ok()
    }

    /// Deliver queued audio-context events in posting order.
    pub fn dispatch_posted(&self) -> usize {
        let mut delivered = 0;
        while let Some(event) = self.posted.pop() {
            self.emit(event);
            delivered += 1;
        }
        delivered
    }
}
