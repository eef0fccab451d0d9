//! Fixed-capacity plugin slot table.
//!
//! The table's mutex is the processing lock. It is taken for structural
//! changes only (reserve, publish, unpublish) and by the audio callback for
//! the duration of one block. Plugin construction and destruction both
//! happen outside it.

use crate::names::unique_name;
use crate::{HostError, Result};
use atomic_float::AtomicF32;
use consort_plugin::{CustomData, MixControls, Plugin};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use std::sync::Arc;

/// Logical id of a slot that is not in active use.
pub const NO_ID: i32 = -1;

/// MIDI learn mapping of one parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MidiMapping {
    /// 0..=15
    pub channel: u8,
    /// -1 when unmapped, otherwise 0..=95
    pub cc: i16,
}

impl Default for MidiMapping {
    fn default() -> Self {
        Self { channel: 0, cc: -1 }
    }
}

pub(crate) struct SlotControls {
    pub(crate) active: AtomicBool,
    pub(crate) drywet: AtomicF32,
    pub(crate) volume: AtomicF32,
    pub(crate) balance_left: AtomicF32,
    pub(crate) balance_right: AtomicF32,
}

impl SlotControls {
    fn new() -> Self {
        let mix = MixControls::default();
        Self {
            active: AtomicBool::new(true),
            drywet: AtomicF32::new(mix.drywet),
            volume: AtomicF32::new(mix.volume),
            balance_left: AtomicF32::new(mix.balance_left),
            balance_right: AtomicF32::new(mix.balance_right),
        }
    }
}

/// One occupied registry position.
pub struct PluginSlot {
    logical_id: AtomicI32,
    index: usize,
    name: String,
    plugin: Box<dyn Plugin>,
    pub(crate) controls: SlotControls,
    pub(crate) midi_map: Mutex<Vec<MidiMapping>>,
    pub(crate) custom_data: Mutex<Vec<CustomData>>,
    pub(crate) current_program: AtomicI32,
    pub(crate) current_midi_program: AtomicI32,
}

impl PluginSlot {
    fn new(index: usize, name: String, plugin: Box<dyn Plugin>) -> Self {
        let params = plugin.parameter_count() as usize;
        Self {
            logical_id: AtomicI32::new(index as i32),
            index,
            name,
            plugin,
            controls: SlotControls::new(),
            midi_map: Mutex::new(vec![MidiMapping::default(); params]),
            custom_data: Mutex::new(Vec::new()),
            current_program: AtomicI32::new(-1),
            current_midi_program: AtomicI32::new(-1),
        }
    }

    /// `NO_ID` once the slot has been removed.
    pub fn id(&self) -> i32 {
        self.logical_id.load(Ordering::Acquire)
    }

    pub fn is_present(&self) -> bool {
        self.id() != NO_ID
    }

    pub fn index(&self) -> usize {
        self.index
    }

    /// Unique display name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn plugin(&self) -> &dyn Plugin {
        self.plugin.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.controls.active.load(Ordering::Relaxed)
    }

    pub fn mix(&self) -> MixControls {
        MixControls {
            drywet: self.controls.drywet.load(Ordering::Relaxed),
            volume: self.controls.volume.load(Ordering::Relaxed),
            balance_left: self.controls.balance_left.load(Ordering::Relaxed),
            balance_right: self.controls.balance_right.load(Ordering::Relaxed),
        }
    }

    pub fn midi_mapping(&self, parameter: u32) -> Option<MidiMapping> {
        self.midi_map.lock().get(parameter as usize).copied()
    }
}

impl Drop for PluginSlot {
    fn drop(&mut self) {
        tracing::debug!(index = self.index, name = %self.name, "destroying plugin");
    }
}

enum SlotEntry {
    Empty,
    /// An add is constructing a plugin for this position.
    Reserved,
    /// A reservation revoked by [`PluginRegistry::clear`]; the in-flight add
    /// drops its plugin instead of publishing it.
    Cancelled,
    Active(Arc<PluginSlot>),
}

pub struct PluginRegistry {
    slots: Mutex<Vec<SlotEntry>>,
    capacity: usize,
}

impl PluginRegistry {
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: Mutex::new((0..capacity).map(|_| SlotEntry::Empty).collect()),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Construct a plugin into the lowest free position and publish it.
    ///
    /// `construct` runs without the processing lock held. The slot becomes
    /// visible to lookups and to the audio callback only once it is fully
    /// built, named and numbered. A [`clear`](Self::clear) during
    /// construction cancels the add with [`HostError::LoadCancelled`].
    pub fn add<F>(&self, max_name_len: usize, construct: F) -> Result<Arc<PluginSlot>>
    where
        F: FnOnce() -> Result<Box<dyn Plugin>>,
    {
        let index = self.reserve()?;

        let plugin = match construct() {
            Ok(plugin) => plugin,
            Err(e) => {
                self.slots.lock()[index] = SlotEntry::Empty;
                return Err(e);
            }
        };

        let mut slots = self.slots.lock();
        if !matches!(slots[index], SlotEntry::Reserved) {
            slots[index] = SlotEntry::Empty;
            drop(slots);
            tracing::debug!(index, "add cancelled while constructing");
            drop(plugin);
            return Err(HostError::LoadCancelled);
        }

        let name = {
            let taken: Vec<&str> = slots
                .iter()
                .filter_map(|entry| match entry {
                    SlotEntry::Active(slot) => Some(slot.name()),
                    _ => None,
                })
                .collect();
            unique_name(&plugin.metadata().name, &taken, max_name_len)
        };

        let slot = Arc::new(PluginSlot::new(index, name, plugin));
        slots[index] = SlotEntry::Active(Arc::clone(&slot));
        Ok(slot)
    }

    /// Unpublish the slot with logical id `id` and destroy its plugin.
    ///
    /// `on_unpublish` and the flip to `NO_ID` both run under the processing
    /// lock, before the position can be reserved again. The plugin object is
    /// dropped after the lock is released. Returns the freed position.
    pub fn remove<F>(&self, id: i32, on_unpublish: F) -> Result<usize>
    where
        F: FnOnce(&PluginSlot),
    {
        let slot = {
            let mut slots = self.slots.lock();
            let slot = Self::find_in(&slots, id).ok_or(HostError::SlotNotFound(id))?;
            on_unpublish(&slot);
            slot.logical_id.store(NO_ID, Ordering::Release);
            slots[slot.index] = SlotEntry::Empty;
            slot
        };

        let index = slot.index;
        if Arc::strong_count(&slot) > 1 {
            tracing::debug!(index, "plugin still borrowed, destruction deferred to last holder");
        }
        drop(slot);
        Ok(index)
    }

    /// Linear scan by logical id.
    pub fn find_by_id(&self, id: i32) -> Option<Arc<PluginSlot>> {
        if id < 0 {
            return None;
        }
        Self::find_in(&self.slots.lock(), id)
    }

    pub fn count_active(&self) -> usize {
        self.slots
            .lock()
            .iter()
            .filter(|entry| matches!(entry, SlotEntry::Active(_)))
            .count()
    }

    pub fn first_free_slot(&self) -> Option<usize> {
        self.slots
            .lock()
            .iter()
            .position(|entry| matches!(entry, SlotEntry::Empty))
    }

    pub fn active_ids(&self) -> Vec<i32> {
        self.slots
            .lock()
            .iter()
            .filter_map(|entry| match entry {
                SlotEntry::Active(slot) => Some(slot.id()),
                _ => None,
            })
            .collect()
    }

    pub fn active_names(&self) -> Vec<String> {
        self.slots
            .lock()
            .iter()
            .filter_map(|entry| match entry {
                SlotEntry::Active(slot) => Some(slot.name.clone()),
                _ => None,
            })
            .collect()
    }

    /// Unpublish every active slot and cancel every in-flight add.
    ///
    /// `on_unpublish` runs once per active slot under the processing lock.
    /// Cancelled positions stay unavailable until their add returns. Plugins
    /// are dropped after the lock is released. Returns the freed positions.
    pub fn clear<F>(&self, mut on_unpublish: F) -> Vec<usize>
    where
        F: FnMut(&PluginSlot),
    {
        let removed: Vec<Arc<PluginSlot>> = {
            let mut slots = self.slots.lock();
            let mut removed = Vec::new();
            for entry in slots.iter_mut() {
                match entry {
                    SlotEntry::Active(slot) => {
                        on_unpublish(slot);
                        slot.logical_id.store(NO_ID, Ordering::Release);
                        removed.push(Arc::clone(slot));
                        *entry = SlotEntry::Empty;
                    }
                    SlotEntry::Reserved => *entry = SlotEntry::Cancelled,
                    SlotEntry::Empty | SlotEntry::Cancelled => {}
                }
            }
            removed
        };

        removed.iter().map(|slot| slot.index).collect()
    }

    /// Visit every active slot while holding the processing lock.
    ///
    /// This is the audio callback's view of the registry: no slot can be
    /// published or unpublished while `f` runs.
    #[inline]
    pub fn for_each_active<F>(&self, mut f: F)
    where
        F: FnMut(&PluginSlot),
    {
        let slots = self.slots.lock();
        for entry in slots.iter() {
            if let SlotEntry::Active(slot) = entry {
                if slot.is_present() {
                    f(slot);
                }
            }
        }
    }

    fn reserve(&self) -> Result<usize> {
        let mut slots = self.slots.lock();
        let index = slots
            .iter()
            .position(|entry| matches!(entry, SlotEntry::Empty))
            .ok_or(HostError::RegistryFull(self.capacity))?;
        slots[index] = SlotEntry::Reserved;
        Ok(index)
    }

    fn find_in(slots: &[SlotEntry], id: i32) -> Option<Arc<PluginSlot>> {
        slots.iter().find_map(|entry| match entry {
            SlotEntry::Active(slot) if slot.id() == id => Some(Arc::clone(slot)),
            _ => None,
        })
    }
}
