//! Control-context mutators.
//!
//! Same lookup discipline as the queries: a missing slot or out-of-range
//! sub-index is logged and returned as an error, and the plugin is left
//! untouched.

use crate::callback::CallbackKind;
use crate::guard::ExternalMidiNote;
use crate::host::{report, PluginHost};
use crate::query::{check_parameter, require_hint};
use crate::{HostError, Result};
use consort_plugin::{decode_chunk, CustomData, NoteEvent, PluginHints};
use std::sync::atomic::Ordering;

pub const MAX_MIDI_CHANNEL: i32 = 15;
pub const MAX_MIDI_CC: i32 = 95;
pub const MAX_VOLUME: f64 = 1.27;

const MAX_MIDI_VALUE: u8 = 127;

impl PluginHost {
    pub fn set_active(&self, plugin_id: i32, active: bool) -> Result<()> {
        tracing::debug!(plugin_id, active, "set_active");
        let slot = self.slot(plugin_id)?;
        slot.controls.active.store(active, Ordering::Relaxed);
        Ok(())
    }

    pub fn set_drywet(&self, plugin_id: i32, value: f64) -> Result<()> {
        tracing::debug!(plugin_id, value, "set_drywet");
        let slot = self.slot(plugin_id)?;
        require_hint(&slot, PluginHints::CAN_DRYWET, "dry/wet")?;
        slot.controls
            .drywet
            .store(value.clamp(0.0, 1.0) as f32, Ordering::Relaxed);
        Ok(())
    }

    pub fn set_volume(&self, plugin_id: i32, value: f64) -> Result<()> {
        tracing::debug!(plugin_id, value, "set_volume");
        let slot = self.slot(plugin_id)?;
        require_hint(&slot, PluginHints::CAN_VOLUME, "volume")?;
        slot.controls
            .volume
            .store(value.clamp(0.0, MAX_VOLUME) as f32, Ordering::Relaxed);
        Ok(())
    }

    pub fn set_balance_left(&self, plugin_id: i32, value: f64) -> Result<()> {
        tracing::debug!(plugin_id, value, "set_balance_left");
        let slot = self.slot(plugin_id)?;
        require_hint(&slot, PluginHints::CAN_BALANCE, "balance")?;
        slot.controls
            .balance_left
            .store(value.clamp(-1.0, 1.0) as f32, Ordering::Relaxed);
        Ok(())
    }

    pub fn set_balance_right(&self, plugin_id: i32, value: f64) -> Result<()> {
        tracing::debug!(plugin_id, value, "set_balance_right");
        let slot = self.slot(plugin_id)?;
        require_hint(&slot, PluginHints::CAN_BALANCE, "balance")?;
        slot.controls
            .balance_right
            .store(value.clamp(-1.0, 1.0) as f32, Ordering::Relaxed);
        Ok(())
    }

    pub fn set_parameter_value(&self, plugin_id: i32, parameter_id: u32, value: f64) -> Result<()> {
        tracing::debug!(plugin_id, parameter_id, value, "set_parameter_value");
        let slot = self.slot(plugin_id)?;
        check_parameter(&slot, parameter_id)?;
        slot.plugin().set_parameter_value(parameter_id, value);
        Ok(())
    }

    /// `channel` must be 0..=15.
    pub fn set_parameter_midi_channel(&self, plugin_id: i32, parameter_id: u32, channel: i32) -> Result<()> {
        tracing::debug!(plugin_id, parameter_id, channel, "set_parameter_midi_channel");
        let slot = self.slot(plugin_id)?;
        check_parameter(&slot, parameter_id)?;
        if !(0..=MAX_MIDI_CHANNEL).contains(&channel) {
            return Err(report(HostError::InvalidChannelOrCC {
                what: "channel",
                value: channel,
            }));
        }

        if let Some(mapping) = slot.midi_map.lock().get_mut(parameter_id as usize) {
            mapping.channel = channel as u8;
        }
        Ok(())
    }

    /// `cc` of -1 unmaps the parameter. Anything below -1 also unmaps;
    /// anything above 95 is rejected.
    pub fn set_parameter_midi_cc(&self, plugin_id: i32, parameter_id: u32, cc: i32) -> Result<()> {
        tracing::debug!(plugin_id, parameter_id, cc, "set_parameter_midi_cc");
        let slot = self.slot(plugin_id)?;
        check_parameter(&slot, parameter_id)?;
        if cc > MAX_MIDI_CC {
            return Err(report(HostError::InvalidChannelOrCC {
                what: "CC",
                value: cc,
            }));
        }

        if let Some(mapping) = slot.midi_map.lock().get_mut(parameter_id as usize) {
            mapping.cc = cc.max(-1) as i16;
        }
        Ok(())
    }

    /// Select a program; the listener is told to reload parameters.
    pub fn set_program(&self, plugin_id: i32, program_id: u32) -> Result<()> {
        tracing::debug!(plugin_id, program_id, "set_program");
        let slot = self.slot(plugin_id)?;
        let count = slot.plugin().program_count();
        if program_id >= count {
            return Err(report(HostError::IndexOutOfRange {
                plugin_id,
                what: "program",
                index: program_id,
                count,
            }));
        }

        slot.plugin().set_program(program_id);
        slot.current_program
            .store(program_id as i32, Ordering::Relaxed);
        self.callbacks.dispatch(
            CallbackKind::ReloadParameters,
            plugin_id,
            program_id as i32,
            0,
            0.0,
        );
        Ok(())
    }

    pub fn set_midi_program(&self, plugin_id: i32, midi_program_id: u32) -> Result<()> {
        tracing::debug!(plugin_id, midi_program_id, "set_midi_program");
        let slot = self.slot(plugin_id)?;
        let count = slot.plugin().midi_program_count();
        if midi_program_id >= count {
            return Err(report(HostError::IndexOutOfRange {
                plugin_id,
                what: "midi program",
                index: midi_program_id,
                count,
            }));
        }

        slot.plugin().set_midi_program(midi_program_id);
        slot.current_midi_program
            .store(midi_program_id as i32, Ordering::Relaxed);
        Ok(())
    }

    /// Insert or replace the entry with the same type and key.
    pub fn set_custom_data(&self, plugin_id: i32, data_type: &str, key: &str, value: &str) -> Result<()> {
        tracing::debug!(plugin_id, data_type, key, "set_custom_data");
        let slot = self.slot(plugin_id)?;

        {
            let mut entries = slot.custom_data.lock();
            match entries
                .iter_mut()
                .find(|e| e.data_type == data_type && e.key == key)
            {
                Some(entry) => entry.value = value.to_string(),
                None => entries.push(CustomData {
                    data_type: data_type.to_string(),
                    key: key.to_string(),
                    value: value.to_string(),
                }),
            }
        }

        slot.plugin().set_custom_data(data_type, key, value);
        Ok(())
    }

    /// Restore Base64 chunk state; the listener is told to reload everything.
    pub fn set_chunk_data(&self, plugin_id: i32, chunk: &str) -> Result<()> {
        tracing::debug!(plugin_id, len = chunk.len(), "set_chunk_data");
        let slot = self.slot(plugin_id)?;
        require_hint(&slot, PluginHints::USES_CHUNKS, "chunk data")?;

        let data = decode_chunk(chunk).map_err(|e| {
            report(HostError::InvalidChunk {
                plugin_id,
                reason: e.to_string(),
            })
        })?;
        slot.plugin().set_chunk(&data).map_err(|e| report(e.into()))?;

        self.callbacks
            .dispatch(CallbackKind::ReloadAll, plugin_id, 0, 0, 0.0);
        Ok(())
    }

    /// Hand the plugin a native window handle for its editor.
    pub fn set_gui_data(&self, plugin_id: i32, data: i32, handle: u64) -> Result<()> {
        tracing::debug!(plugin_id, data, handle, "set_gui_data");
        self.slot(plugin_id)?.plugin().set_gui_data(data, handle);
        Ok(())
    }

    pub fn show_gui(&self, plugin_id: i32, visible: bool) -> Result<()> {
        tracing::debug!(plugin_id, visible, "show_gui");
        self.slot(plugin_id)?.plugin().show_gui(visible);
        Ok(())
    }

    pub fn idle_gui(&self, plugin_id: i32) -> Result<()> {
        self.slot(plugin_id)?.plugin().idle_gui();
        Ok(())
    }

    /// Queue a note for the next audio block.
    pub fn send_midi_note(&self, plugin_id: i32, on: bool, note: u8, velocity: u8) -> Result<()> {
        tracing::debug!(plugin_id, on, note, velocity, "send_midi_note");
        self.slot(plugin_id)?;

        if note > MAX_MIDI_VALUE {
            return Err(report(HostError::IndexOutOfRange {
                plugin_id,
                what: "note",
                index: u32::from(note),
                count: u32::from(MAX_MIDI_VALUE) + 1,
            }));
        }
        if velocity > MAX_MIDI_VALUE {
            return Err(report(HostError::IndexOutOfRange {
                plugin_id,
                what: "velocity",
                index: u32::from(velocity),
                count: u32::from(MAX_MIDI_VALUE) + 1,
            }));
        }

        let queued = self.events.push(ExternalMidiNote {
            plugin_id,
            event: NoteEvent { on, note, velocity },
        });
        if !queued {
            return Err(report(HostError::EventQueueFull(self.events.capacity())));
        }
        Ok(())
    }

    /// Ask the plugin to flush transient state before its session is saved.
    pub fn prepare_for_save(&self, plugin_id: i32) -> Result<()> {
        tracing::debug!(plugin_id, "prepare_for_save");
        self.slot(plugin_id)?.plugin().prepare_for_save();
        Ok(())
    }
}
