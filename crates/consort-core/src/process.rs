//! Audio-context entry points.
//!
//! Everything here runs on the audio transport's thread. No allocation: the
//! scratch buffers are sized from `HostConfig::max_midi_events` up front and
//! the event queue never holds more than that.

use crate::callback::{CallbackEvent, CallbackKind};
use crate::guard::ExternalMidiNote;
use crate::host::PluginHost;
use consort_plugin::{NoteEvent, ProcessContext};
use std::sync::atomic::Ordering;

pub(crate) struct ProcessScratch {
    pending: Vec<ExternalMidiNote>,
    notes: Vec<NoteEvent>,
}

impl ProcessScratch {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            pending: Vec::with_capacity(capacity),
            notes: Vec::with_capacity(capacity),
        }
    }
}

impl PluginHost {
    /// Run one block of `frames` frames through every active plugin.
    pub fn process_block(&self, frames: u32) {
        // Only one audio thread exists; a held scratch means a re-entrant call.
        let Some(mut scratch) = self.scratch.try_lock() else {
            return;
        };
        let ProcessScratch { pending, notes } = &mut *scratch;

        pending.clear();
        self.events.drain_into(pending);

        self.registry.for_each_active(|slot| {
            if !slot.is_active() {
                self.meters.reset(slot.index());
                return;
            }

            let id = slot.id();
            notes.clear();
            notes.extend(
                pending
                    .iter()
                    .filter(|n| n.plugin_id == id)
                    .map(|n| n.event),
            );

            let mut ctx = ProcessContext::new(frames)
                .notes(&notes[..])
                .mix(slot.mix());
            slot.plugin().process(&mut ctx);
            self.meters
                .store(slot.index(), ctx.peaks.inputs, ctx.peaks.outputs);

            for note in notes.iter() {
                let kind = if note.on {
                    CallbackKind::NoteOn
                } else {
                    CallbackKind::NoteOff
                };
                self.callbacks.post(CallbackEvent::new(
                    kind,
                    id,
                    i32::from(note.note),
                    i32::from(note.velocity),
                    0.0,
                ));
            }
        });
    }

    /// The transport changed its block size.
    pub fn buffer_size_changed(&self, frames: u32) {
        tracing::debug!(frames, "buffer size changed");
        self.buffer_size.store(frames, Ordering::Relaxed);
        self.registry
            .for_each_active(|slot| slot.plugin().buffer_size_changed(frames));
    }

    /// The transport changed its sample rate.
    pub fn sample_rate_changed(&self, rate: f64) {
        tracing::debug!(rate, "sample rate changed");
        self.sample_rate.store(rate, Ordering::Relaxed);
        self.registry
            .for_each_active(|slot| slot.plugin().sample_rate_changed(rate));
    }

    /// The transport went away. `Quit` is dispatched from the next
    /// [`dispatch_posted`](Self::dispatch_posted).
    pub fn notify_shutdown(&self) {
        tracing::warn!("audio backend shut down");
        self.shutdown.store(true, Ordering::Release);
    }
}
