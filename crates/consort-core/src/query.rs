//! Owned introspection API.
//!
//! Every query looks the slot up by id, checks any sub-index against the
//! plugin's counts and returns owned data. Missing slots and out-of-range
//! indices come back as errors and are logged; nothing panics.

use crate::host::{report, PluginHost};
use crate::registry::PluginSlot;
use crate::{HostError, Result};
use consort_plugin::{
    encode_chunk, CustomData, GuiInfo, ParameterHints, ParameterRanges, ParameterType,
    ParameterDescriptor, PluginCategory, PluginHints, PluginType, PortCounts,
};
use serde::{Deserialize, Serialize};
use std::sync::atomic::Ordering;

/// Input/output/total counts for audio ports, MIDI ports or parameters.
pub type PortCountInfo = PortCounts;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginInfo {
    pub plugin_type: PluginType,
    pub category: PluginCategory,
    pub hints: PluginHints,
    pub binary: String,
    /// Unique display name, not the name the plugin reports.
    pub name: String,
    pub label: String,
    pub maker: String,
    pub copyright: String,
    pub unique_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterInfo {
    pub name: String,
    pub symbol: String,
    pub unit: String,
    pub scale_point_count: u32,
}

/// Per-parameter routing data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterData {
    pub kind: ParameterType,
    pub index: i32,
    pub rindex: i32,
    pub hints: ParameterHints,
    pub midi_channel: u8,
    pub midi_cc: i16,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalePointInfo {
    pub value: f64,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MidiProgramInfo {
    pub bank: u32,
    pub program: u32,
    pub label: String,
}

fn check_index(plugin_id: i32, what: &'static str, index: u32, count: u32) -> Result<()> {
    if index < count {
        Ok(())
    } else {
        Err(report(HostError::IndexOutOfRange {
            plugin_id,
            what,
            index,
            count,
        }))
    }
}

pub(crate) fn check_parameter(slot: &PluginSlot, index: u32) -> Result<()> {
    check_index(slot.id(), "parameter", index, slot.plugin().parameter_count())
}

pub(crate) fn require_hint(slot: &PluginSlot, hint: PluginHints, capability: &'static str) -> Result<()> {
    if slot.plugin().metadata().hints.contains(hint) {
        Ok(())
    } else {
        Err(report(HostError::CapabilityUnsupported {
            plugin_id: slot.id(),
            capability,
        }))
    }
}

impl PluginHost {
    pub fn plugin_info(&self, plugin_id: i32) -> Result<PluginInfo> {
        tracing::debug!(plugin_id, "plugin_info");
        let slot = self.slot(plugin_id)?;
        let meta = slot.plugin().metadata();

        Ok(PluginInfo {
            plugin_type: meta.plugin_type,
            category: meta.category,
            hints: meta.hints,
            binary: meta.binary.display().to_string(),
            name: slot.name().to_string(),
            label: meta.label.clone(),
            maker: meta.maker.clone(),
            copyright: meta.copyright.clone(),
            unique_id: meta.unique_id,
        })
    }

    pub fn audio_port_count_info(&self, plugin_id: i32) -> Result<PortCountInfo> {
        tracing::debug!(plugin_id, "audio_port_count_info");
        Ok(self.slot(plugin_id)?.plugin().audio_ports())
    }

    pub fn midi_port_count_info(&self, plugin_id: i32) -> Result<PortCountInfo> {
        tracing::debug!(plugin_id, "midi_port_count_info");
        Ok(self.slot(plugin_id)?.plugin().midi_ports())
    }

    /// Input (control) and output (monitor) parameter counts.
    pub fn parameter_count_info(&self, plugin_id: i32) -> Result<PortCountInfo> {
        tracing::debug!(plugin_id, "parameter_count_info");
        let slot = self.slot(plugin_id)?;
        let plugin = slot.plugin();

        let (mut ins, mut outs) = (0, 0);
        for index in 0..plugin.parameter_count() {
            match plugin.parameter_descriptor(index).map(|d| d.kind) {
                Some(ParameterType::Input) => ins += 1,
                Some(ParameterType::Output) => outs += 1,
                _ => {}
            }
        }
        Ok(PortCounts::new(ins, outs))
    }

    pub fn parameter_info(&self, plugin_id: i32, parameter_id: u32) -> Result<ParameterInfo> {
        tracing::debug!(plugin_id, parameter_id, "parameter_info");
        let desc = self.descriptor(plugin_id, parameter_id)?;

        Ok(ParameterInfo {
            scale_point_count: desc.scale_points.len() as u32,
            name: desc.name,
            symbol: desc.symbol,
            unit: desc.unit,
        })
    }

    pub fn scale_point_info(
        &self,
        plugin_id: i32,
        parameter_id: u32,
        scale_point_id: u32,
    ) -> Result<ScalePointInfo> {
        tracing::debug!(plugin_id, parameter_id, scale_point_id, "scale_point_info");
        let desc = self.descriptor(plugin_id, parameter_id)?;
        check_index(
            plugin_id,
            "scale point",
            scale_point_id,
            desc.scale_points.len() as u32,
        )?;

        let point = &desc.scale_points[scale_point_id as usize];
        Ok(ScalePointInfo {
            value: point.value,
            label: point.label.clone(),
        })
    }

    pub fn midi_program_info(&self, plugin_id: i32, midi_program_id: u32) -> Result<MidiProgramInfo> {
        tracing::debug!(plugin_id, midi_program_id, "midi_program_info");
        let slot = self.slot(plugin_id)?;
        let plugin = slot.plugin();
        check_index(
            plugin_id,
            "midi program",
            midi_program_id,
            plugin.midi_program_count(),
        )?;

        let program = plugin.midi_program(midi_program_id).ok_or_else(|| {
            report(HostError::IndexOutOfRange {
                plugin_id,
                what: "midi program",
                index: midi_program_id,
                count: plugin.midi_program_count(),
            })
        })?;
        Ok(MidiProgramInfo {
            bank: program.bank,
            program: program.program,
            label: program.name,
        })
    }

    pub fn parameter_data(&self, plugin_id: i32, parameter_id: u32) -> Result<ParameterData> {
        tracing::debug!(plugin_id, parameter_id, "parameter_data");
        let slot = self.slot(plugin_id)?;
        let desc = Self::slot_descriptor(&slot, parameter_id)?;
        let mapping = slot.midi_mapping(parameter_id).unwrap_or_default();

        Ok(ParameterData {
            kind: desc.kind,
            index: desc.index,
            rindex: desc.rindex,
            hints: desc.hints,
            midi_channel: mapping.channel,
            midi_cc: mapping.cc,
        })
    }

    pub fn parameter_ranges(&self, plugin_id: i32, parameter_id: u32) -> Result<ParameterRanges> {
        tracing::debug!(plugin_id, parameter_id, "parameter_ranges");
        Ok(self.descriptor(plugin_id, parameter_id)?.ranges)
    }

    pub fn custom_data(&self, plugin_id: i32, custom_data_id: u32) -> Result<CustomData> {
        tracing::debug!(plugin_id, custom_data_id, "custom_data");
        let slot = self.slot(plugin_id)?;
        let entries = slot.custom_data.lock();
        check_index(plugin_id, "custom data", custom_data_id, entries.len() as u32)?;
        Ok(entries[custom_data_id as usize].clone())
    }

    /// Base64 chunk state.
    pub fn chunk_data(&self, plugin_id: i32) -> Result<String> {
        tracing::debug!(plugin_id, "chunk_data");
        let slot = self.slot(plugin_id)?;
        require_hint(&slot, PluginHints::USES_CHUNKS, "chunk data")?;

        let data = slot.plugin().chunk()?;
        encode_chunk(&data).map_err(|e| {
            report(HostError::InvalidChunk {
                plugin_id,
                reason: e.to_string(),
            })
        })
    }

    pub fn gui_info(&self, plugin_id: i32) -> Result<GuiInfo> {
        tracing::debug!(plugin_id, "gui_info");
        Ok(self.slot(plugin_id)?.plugin().gui_info())
    }

    pub fn parameter_count(&self, plugin_id: i32) -> Result<u32> {
        Ok(self.slot(plugin_id)?.plugin().parameter_count())
    }

    pub fn program_count(&self, plugin_id: i32) -> Result<u32> {
        Ok(self.slot(plugin_id)?.plugin().program_count())
    }

    pub fn midi_program_count(&self, plugin_id: i32) -> Result<u32> {
        Ok(self.slot(plugin_id)?.plugin().midi_program_count())
    }

    pub fn custom_data_count(&self, plugin_id: i32) -> Result<u32> {
        Ok(self.slot(plugin_id)?.custom_data.lock().len() as u32)
    }

    pub fn program_name(&self, plugin_id: i32, program_id: u32) -> Result<String> {
        tracing::debug!(plugin_id, program_id, "program_name");
        let slot = self.slot(plugin_id)?;
        let plugin = slot.plugin();
        let count = plugin.program_count();
        check_index(plugin_id, "program", program_id, count)?;

        plugin.program_name(program_id).ok_or_else(|| {
            report(HostError::IndexOutOfRange {
                plugin_id,
                what: "program",
                index: program_id,
                count,
            })
        })
    }

    pub fn midi_program_name(&self, plugin_id: i32, midi_program_id: u32) -> Result<String> {
        Ok(self.midi_program_info(plugin_id, midi_program_id)?.label)
    }

    /// Name as reported by the plugin format, before uniquing.
    pub fn real_plugin_name(&self, plugin_id: i32) -> Result<String> {
        tracing::debug!(plugin_id, "real_plugin_name");
        Ok(self.slot(plugin_id)?.plugin().real_name())
    }

    /// `-1` when no program has been selected.
    pub fn current_program_index(&self, plugin_id: i32) -> Result<i32> {
        Ok(self.slot(plugin_id)?.current_program.load(Ordering::Relaxed))
    }

    /// `-1` when no MIDI program has been selected.
    pub fn current_midi_program_index(&self, plugin_id: i32) -> Result<i32> {
        Ok(self
            .slot(plugin_id)?
            .current_midi_program
            .load(Ordering::Relaxed))
    }

    pub fn default_parameter_value(&self, plugin_id: i32, parameter_id: u32) -> Result<f64> {
        Ok(self.descriptor(plugin_id, parameter_id)?.ranges.def)
    }

    pub fn current_parameter_value(&self, plugin_id: i32, parameter_id: u32) -> Result<f64> {
        let slot = self.slot(plugin_id)?;
        check_parameter(&slot, parameter_id)?;
        Ok(slot.plugin().parameter_value(parameter_id))
    }

    /// Last input peak for `port_id` 1 or 2. Anything unknown reads `0.0`.
    pub fn input_peak_value(&self, plugin_id: i32, port_id: u32) -> f32 {
        match usize::try_from(plugin_id) {
            Ok(slot) => self.meters.input(slot, port_id),
            Err(_) => 0.0,
        }
    }

    /// Last output peak for `port_id` 1 or 2. Anything unknown reads `0.0`.
    pub fn output_peak_value(&self, plugin_id: i32, port_id: u32) -> f32 {
        match usize::try_from(plugin_id) {
            Ok(slot) => self.meters.output(slot, port_id),
            Err(_) => 0.0,
        }
    }

    fn descriptor(
        &self,
        plugin_id: i32,
        parameter_id: u32,
    ) -> Result<ParameterDescriptor> {
        let slot = self.slot(plugin_id)?;
        Self::slot_descriptor(&slot, parameter_id)
    }

    fn slot_descriptor(
        slot: &PluginSlot,
        parameter_id: u32,
    ) -> Result<ParameterDescriptor> {
        check_parameter(slot, parameter_id)?;
        slot.plugin()
            .parameter_descriptor(parameter_id)
            .ok_or_else(|| {
                report(HostError::IndexOutOfRange {
                    plugin_id: slot.id(),
                    what: "parameter",
                    index: parameter_id,
                    count: slot.plugin().parameter_count(),
                })
            })
    }
}
