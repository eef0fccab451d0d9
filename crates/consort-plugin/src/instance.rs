//! Plugin instance trait and processing types.
//!
//! Every format loader hands the host a `Box<dyn Plugin>`. All methods take
//! `&self`: control-context setters and the audio-context `process` call may
//! run concurrently, so implementations keep their mutable state behind
//! atomics or short internal locks.

use crate::error::{PluginError, Result};
use crate::metadata::PluginMetadata;
use crate::types::{GuiInfo, MidiProgram, NoteEvent, ParameterDescriptor, PortCounts};

/// Host-side mix controls applied to a plugin's output.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MixControls {
    pub drywet: f32,
    pub volume: f32,
    pub balance_left: f32,
    pub balance_right: f32,
}

impl Default for MixControls {
    fn default() -> Self {
        Self {
            drywet: 1.0,
            volume: 1.0,
            balance_left: -1.0,
            balance_right: 1.0,
        }
    }
}

/// Peak levels of the first two input and output channels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PortPeaks {
    pub inputs: [f32; 2],
    pub outputs: [f32; 2],
}

pub struct ProcessContext<'a> {
    pub frames: u32,
    pub notes: &'a [NoteEvent],
    pub mix: MixControls,
    /// Written by the plugin, read back into the host's meter table.
    pub peaks: PortPeaks,
}

impl<'a> ProcessContext<'a> {
    pub fn new(frames: u32) -> Self {
        Self {
            frames,
            notes: &[],
            mix: MixControls::default(),
            peaks: PortPeaks::default(),
        }
    }

    pub fn notes(mut self, notes: &'a [NoteEvent]) -> Self {
        self.notes = notes;
        self
    }

    pub fn mix(mut self, mix: MixControls) -> Self {
        self.mix = mix;
        self
    }
}

/// Unified interface for plugins of every supported format.
pub trait Plugin: Send + Sync {
    fn metadata(&self) -> &PluginMetadata;

    /// Name as reported by the underlying format, before host renaming.
    fn real_name(&self) -> String {
        self.metadata().name.clone()
    }

    fn audio_ports(&self) -> PortCounts;

    fn midi_ports(&self) -> PortCounts {
        PortCounts::default()
    }

    fn parameter_count(&self) -> u32;

    fn parameter_descriptor(&self, index: u32) -> Option<ParameterDescriptor>;

    fn parameter_value(&self, index: u32) -> f64;

    fn set_parameter_value(&self, index: u32, value: f64);

    fn program_count(&self) -> u32 {
        0
    }

    fn program_name(&self, _index: u32) -> Option<String> {
        None
    }

    fn set_program(&self, _index: u32) {}

    fn midi_program_count(&self) -> u32 {
        0
    }

    fn midi_program(&self, _index: u32) -> Option<MidiProgram> {
        None
    }

    fn set_midi_program(&self, _index: u32) {}

    fn set_custom_data(&self, _data_type: &str, _key: &str, _value: &str) {}

    /// Raw chunk state. Only called when the plugin advertises `USES_CHUNKS`.
    fn chunk(&self) -> Result<Vec<u8>> {
        Err(PluginError::ChunksUnsupported)
    }

    fn set_chunk(&self, _data: &[u8]) -> Result<()> {
        Err(PluginError::ChunksUnsupported)
    }

    fn gui_info(&self) -> GuiInfo {
        GuiInfo::default()
    }

    /// `handle` is the native parent window handle cast to u64.
    fn set_gui_data(&self, _data: i32, _handle: u64) {}

    fn show_gui(&self, _visible: bool) {}

    /// Call periodically (~30Hz) while the GUI is visible.
    fn idle_gui(&self) {}

    /// Flush transient state before the session is saved.
    fn prepare_for_save(&self) {}

    fn buffer_size_changed(&self, _frames: u32) {}

    fn sample_rate_changed(&self, _rate: f64) {}

    /// Called once per block on the audio thread. Must not block or allocate.
    fn process(&self, ctx: &mut ProcessContext);
}
