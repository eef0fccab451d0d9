//! Per-slot peak meters.
//!
//! Written by the audio callback, read from any thread without locking.
//! Values are best-effort telemetry; unused slots simply read zero.

use atomic_float::AtomicF32;
use std::sync::atomic::Ordering;

const CHANNELS: usize = 2;

pub struct PeakMeters {
    inputs: Box<[AtomicF32]>,
    outputs: Box<[AtomicF32]>,
}

impl PeakMeters {
    pub fn new(capacity: usize) -> Self {
        let make = || {
            (0..capacity * CHANNELS)
                .map(|_| AtomicF32::new(0.0))
                .collect::<Vec<_>>()
                .into_boxed_slice()
        };
        Self {
            inputs: make(),
            outputs: make(),
        }
    }

    /// `port` is 1 or 2; anything else reads as zero.
    pub fn input(&self, slot: usize, port: u32) -> f32 {
        Self::read(&self.inputs, slot, port)
    }

    /// `port` is 1 or 2; anything else reads as zero.
    pub fn output(&self, slot: usize, port: u32) -> f32 {
        Self::read(&self.outputs, slot, port)
    }

    #[inline]
    pub(crate) fn store(&self, slot: usize, inputs: [f32; 2], outputs: [f32; 2]) {
        let base = slot * CHANNELS;
        for ch in 0..CHANNELS {
            if let Some(meter) = self.inputs.get(base + ch) {
                meter.store(inputs[ch], Ordering::Relaxed);
            }
            if let Some(meter) = self.outputs.get(base + ch) {
                meter.store(outputs[ch], Ordering::Relaxed);
            }
        }
    }

    pub(crate) fn reset(&self, slot: usize) {
        self.store(slot, [0.0; 2], [0.0; 2]);
    }

    fn read(meters: &[AtomicF32], slot: usize, port: u32) -> f32 {
        if port != 1 && port != 2 {
            return 0.0;
        }
        meters
            .get(slot * CHANNELS + port as usize - 1)
            .map_or(0.0, |m| m.load(Ordering::Relaxed))
    }
}
