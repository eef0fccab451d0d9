//! Built-in plugins that need no external library.

use crate::error::{PluginError, Result};
use crate::instance::{Plugin, ProcessContext};
use crate::loader::{LoadRequest, PluginLoader};
use crate::metadata::PluginMetadata;
use crate::types::{
    ParameterDescriptor, ParameterHints, ParameterRanges, PluginCategory, PluginHints,
    PluginType, PortCounts,
};
use atomic_float::AtomicF64;
use std::sync::atomic::{AtomicU8, Ordering};

const PARAM_GAIN: u32 = 0;
const PARAM_WAVEFORM: u32 = 1;
const PARAM_COUNT: u32 = 2;

const PROGRAMS: [(&str, f64); 2] = [("Default", 0.5), ("Loud", 1.0)];

/// Loader for [`PluginType::Internal`]. Known labels: `tone`.
pub struct InternalLoader;

impl PluginLoader for InternalLoader {
    fn plugin_type(&self) -> PluginType {
        PluginType::Internal
    }

    fn load(&self, request: &LoadRequest) -> Result<Box<dyn Plugin>> {
        match request.label.as_str() {
            "tone" => Ok(Box::new(TestTone::new())),
            _ => Err(PluginError::UnknownLabel {
                path: request.path.clone(),
                label: request.label.clone(),
            }),
        }
    }
}

/// Minimal synth: reports an output level proportional to the loudest held
/// note. Useful for exercising note injection and metering end to end.
pub struct TestTone {
    metadata: PluginMetadata,
    params: [AtomicF64; PARAM_COUNT as usize],
    held: [AtomicU8; 128],
}

impl TestTone {
    pub fn new() -> Self {
        let metadata = PluginMetadata::new(PluginType::Internal, "Test Tone", "tone")
            .category(PluginCategory::Synth)
            .hints(
                PluginHints::IS_SYNTH
                    | PluginHints::USES_CHUNKS
                    | PluginHints::CAN_VOLUME
                    | PluginHints::CAN_BALANCE,
            )
            .maker("consort");

        Self {
            metadata,
            params: [AtomicF64::new(PROGRAMS[0].1), AtomicF64::new(0.0)],
            held: std::array::from_fn(|_| AtomicU8::new(0)),
        }
    }

    fn loudest_velocity(&self) -> u8 {
        self.held
            .iter()
            .map(|v| v.load(Ordering::Relaxed))
            .max()
            .unwrap_or(0)
    }
}

impl Default for TestTone {
    fn default() -> Self {
        Self::new()
    }
}

impl Plugin for TestTone {
    fn metadata(&self) -> &PluginMetadata {
        &self.metadata
    }

    fn audio_ports(&self) -> PortCounts {
        PortCounts::new(0, 2)
    }

    fn midi_ports(&self) -> PortCounts {
        PortCounts::new(1, 0)
    }

    fn parameter_count(&self) -> u32 {
        PARAM_COUNT
    }

    fn parameter_descriptor(&self, index: u32) -> Option<ParameterDescriptor> {
        match index {
            PARAM_GAIN => Some(ParameterDescriptor::new(
                index,
                "Gain",
                ParameterRanges::new(0.0, 1.0, PROGRAMS[0].1),
            )),
            PARAM_WAVEFORM => Some(
                ParameterDescriptor::new(index, "Waveform", ParameterRanges::new(0.0, 1.0, 0.0))
                    .hints(
                        ParameterHints::BOUNDED
                            | ParameterHints::INTEGER
                            | ParameterHints::ENABLED,
                    )
                    .scale_point(0.0, "Sine")
                    .scale_point(1.0, "Square"),
            ),
            _ => None,
        }
    }

    fn parameter_value(&self, index: u32) -> f64 {
        self.params
            .get(index as usize)
            .map(|p| p.load(Ordering::Relaxed))
            .unwrap_or(0.0)
    }

    fn set_parameter_value(&self, index: u32, value: f64) {
        if let (Some(param), Some(desc)) = (
            self.params.get(index as usize),
            self.parameter_descriptor(index),
        ) {
            param.store(desc.ranges.clamp(value), Ordering::Relaxed);
        }
    }

    fn program_count(&self) -> u32 {
        PROGRAMS.len() as u32
    }

    fn program_name(&self, index: u32) -> Option<String> {
        PROGRAMS.get(index as usize).map(|(name, _)| name.to_string())
    }

    fn set_program(&self, index: u32) {
        if let Some((_, gain)) = PROGRAMS.get(index as usize) {
            self.params[PARAM_GAIN as usize].store(*gain, Ordering::Relaxed);
        }
    }

    fn chunk(&self) -> Result<Vec<u8>> {
        let mut data = Vec::with_capacity(PARAM_COUNT as usize * 8);
        for param in &self.params {
            data.extend_from_slice(&param.load(Ordering::Relaxed).to_le_bytes());
        }
        Ok(data)
    }

    fn set_chunk(&self, data: &[u8]) -> Result<()> {
        if data.len() != PARAM_COUNT as usize * 8 {
            return Err(PluginError::StateRestoreError(format!(
                "expected {} bytes, got {}",
                PARAM_COUNT * 8,
                data.len()
            )));
        }
        for (index, bytes) in data.chunks_exact(8).enumerate() {
            let mut raw = [0u8; 8];
            raw.copy_from_slice(bytes);
            self.set_parameter_value(index as u32, f64::from_le_bytes(raw));
        }
        Ok(())
    }

    fn process(&self, ctx: &mut ProcessContext) {
        for event in ctx.notes {
            if let Some(slot) = self.held.get(event.note as usize) {
                let velocity = if event.on { event.velocity } else { 0 };
                slot.store(velocity, Ordering::Relaxed);
            }
        }

        let gain = self.params[PARAM_GAIN as usize].load(Ordering::Relaxed) as f32;
        let level = gain * ctx.mix.volume * self.loudest_velocity() as f32 / 127.0;

        // Balance -1..1 maps each side's position to a 0..1 weight.
        let left = (1.0 - ctx.mix.balance_left) / 2.0;
        let right = (1.0 + ctx.mix.balance_right) / 2.0;
        ctx.peaks.outputs = [level * left.clamp(0.0, 1.0), level * right.clamp(0.0, 1.0)];
    }
}
