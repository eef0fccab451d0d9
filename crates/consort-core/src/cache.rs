//! Single-slot result cache over the owned query API.
//!
//! Each query kind owns one cell. A call releases the cell's previous
//! contents, refills it and hands back a borrow of the cell. The borrow ends
//! at the next call on the same cache, which the `&mut self` receivers
//! enforce at compile time.

use crate::host::PluginHost;
use crate::query::{MidiProgramInfo, ParameterInfo, PluginInfo, ScalePointInfo};

/// Result cell with a validity flag. Invalid means the last lookup failed.
#[derive(Debug)]
pub struct CacheCell<T> {
    value: Option<T>,
}

impl<T> Default for CacheCell<T> {
    fn default() -> Self {
        Self { value: None }
    }
}

impl<T> CacheCell<T> {
    pub fn is_valid(&self) -> bool {
        self.value.is_some()
    }

    pub fn get(&self) -> Option<&T> {
        self.value.as_ref()
    }

    fn refill(&mut self, fill: impl FnOnce() -> Option<T>) -> &Self {
        self.value = None;
        self.value = fill();
        self
    }

    fn release(&mut self) {
        self.value = None;
    }
}

#[derive(Debug, Default)]
pub struct IntrospectionCache {
    plugin_info: CacheCell<PluginInfo>,
    parameter_info: CacheCell<ParameterInfo>,
    scale_point_info: CacheCell<ScalePointInfo>,
    midi_program_info: CacheCell<MidiProgramInfo>,
    chunk_data: CacheCell<String>,
    real_plugin_name: CacheCell<String>,
}

impl IntrospectionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn plugin_info(&mut self, host: &PluginHost, plugin_id: i32) -> &CacheCell<PluginInfo> {
        self.plugin_info
            .refill(|| host.plugin_info(plugin_id).ok())
    }

    pub fn parameter_info(
        &mut self,
        host: &PluginHost,
        plugin_id: i32,
        parameter_id: u32,
    ) -> &CacheCell<ParameterInfo> {
        self.parameter_info
            .refill(|| host.parameter_info(plugin_id, parameter_id).ok())
    }

    pub fn scale_point_info(
        &mut self,
        host: &PluginHost,
        plugin_id: i32,
        parameter_id: u32,
        scale_point_id: u32,
    ) -> &CacheCell<ScalePointInfo> {
        self.scale_point_info.refill(|| {
            host.scale_point_info(plugin_id, parameter_id, scale_point_id)
                .ok()
        })
    }

    pub fn midi_program_info(
        &mut self,
        host: &PluginHost,
        plugin_id: i32,
        midi_program_id: u32,
    ) -> &CacheCell<MidiProgramInfo> {
        self.midi_program_info
            .refill(|| host.midi_program_info(plugin_id, midi_program_id).ok())
    }

    pub fn chunk_data(&mut self, host: &PluginHost, plugin_id: i32) -> &CacheCell<String> {
        self.chunk_data.refill(|| host.chunk_data(plugin_id).ok())
    }

    pub fn real_plugin_name(&mut self, host: &PluginHost, plugin_id: i32) -> &CacheCell<String> {
        self.real_plugin_name
            .refill(|| host.real_plugin_name(plugin_id).ok())
    }

    /// Release every cell's contents.
    pub fn flush(&mut self) {
        self.plugin_info.release();
        self.parameter_info.release();
        self.scale_point_info.release();
        self.midi_program_info.release();
        self.chunk_data.release();
        self.real_plugin_name.release();
    }

    pub fn is_empty(&self) -> bool {
        !(self.plugin_info.is_valid()
            || self.parameter_info.is_valid()
            || self.scale_point_info.is_valid()
            || self.midi_program_info.is_valid()
            || self.chunk_data.is_valid()
            || self.real_plugin_name.is_valid())
    }
}
