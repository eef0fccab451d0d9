//! Control-context owner of the plugin set.

use crate::callback::{CallbackDispatcher, CallbackKind, Listener};
use crate::config::{HostConfig, HostOption, HostOptions};
use crate::guard::EventQueue;
use crate::meters::PeakMeters;
use crate::names::NameBudget;
use crate::process::ProcessScratch;
use crate::registry::{PluginRegistry, PluginSlot};
use crate::{HostError, Result};
use atomic_float::AtomicF64;
use consort_plugin::{LoadRequest, LoaderSet};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

/// Posted-event queue depth; audio-context notifications beyond this are dropped.
const POSTED_EVENTS: usize = 1024;

/// The plugin set together with everything the audio callback touches.
///
/// `PluginHost` is shared between the control context (queries, mutators,
/// add/remove) and the audio context ([`process_block`](Self::process_block)
/// and the buffer-size / sample-rate / shutdown notifications).
pub struct PluginHost {
    config: HostConfig,
    options: RwLock<HostOptions>,
    pub(crate) registry: PluginRegistry,
    loaders: LoaderSet,
    pub(crate) meters: PeakMeters,
    pub(crate) events: EventQueue,
    pub(crate) callbacks: CallbackDispatcher,
    client_name: RwLock<Option<String>>,
    pub(crate) buffer_size: AtomicU32,
    pub(crate) sample_rate: AtomicF64,
    pub(crate) shutdown: AtomicBool,
    pub(crate) scratch: Mutex<ProcessScratch>,
}

impl PluginHost {
    pub fn new(config: HostConfig, loaders: LoaderSet) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            options: RwLock::new(HostOptions::default()),
            registry: PluginRegistry::new(config.max_plugins),
            loaders,
            meters: PeakMeters::new(config.max_plugins),
            events: EventQueue::new(config.max_midi_events),
            callbacks: CallbackDispatcher::new(POSTED_EVENTS),
            client_name: RwLock::new(None),
            buffer_size: AtomicU32::new(0),
            sample_rate: AtomicF64::new(0.0),
            shutdown: AtomicBool::new(false),
            scratch: Mutex::new(ProcessScratch::new(config.max_midi_events)),
            config,
        })
    }

    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    pub fn options(&self) -> HostOptions {
        *self.options.read()
    }

    pub fn set_option(&self, option: HostOption) {
        tracing::debug!(?option, "set_option");
        self.options.write().apply(option);
    }

    pub fn loaders(&self) -> &LoaderSet {
        &self.loaders
    }

    pub fn registry(&self) -> &PluginRegistry {
        &self.registry
    }

    pub fn meters(&self) -> &PeakMeters {
        &self.meters
    }

    pub fn callbacks(&self) -> &CallbackDispatcher {
        &self.callbacks
    }

    pub fn set_callback(&self, listener: Option<Listener>) {
        tracing::debug!(registered = listener.is_some(), "set_callback");
        self.callbacks.set_listener(listener);
    }

    pub fn client_name(&self) -> Option<String> {
        self.client_name.read().clone()
    }

    pub fn set_client_name(&self, name: Option<String>) {
        *self.client_name.write() = name;
    }

    pub fn buffer_size(&self) -> u32 {
        self.buffer_size.load(Ordering::Relaxed)
    }

    pub fn sample_rate(&self) -> f64 {
        self.sample_rate.load(Ordering::Relaxed)
    }

    /// Longest display name a new plugin may receive.
    pub fn max_name_len(&self) -> usize {
        let budget = NameBudget::new(self.config.port_name_size);
        if self.options().global_audio_client {
            budget.max_len(self.client_name.read().as_deref())
        } else {
            budget.max_len(None)
        }
    }

    /// Load a plugin into the lowest free slot. Returns its id.
    pub fn add(&self, request: &LoadRequest) -> Result<i32> {
        tracing::debug!(
            plugin_type = %request.plugin_type,
            path = %request.path.display(),
            label = %request.label,
            "add_plugin"
        );

        if !request.binary_type.is_native() {
            return Err(report(HostError::UnsupportedFormat(format!(
                "{:?} binaries need a bridge",
                request.binary_type
            ))));
        }
        if !self.loaders.supports(request.plugin_type) {
            return Err(report(HostError::unsupported_type(request.plugin_type)));
        }

        let max_len = self.max_name_len();
        let slot = self
            .registry
            .add(max_len, || self.loaders.load(request).map_err(HostError::from))
            .map_err(report)?;

        tracing::info!(id = slot.id(), name = slot.name(), "plugin added");
        Ok(slot.id())
    }

    pub fn remove(&self, id: i32) -> Result<()> {
        tracing::debug!(id, "remove_plugin");

        self.registry
            .remove(id, |slot| {
                self.meters.reset(slot.index());
                self.events.discard_for(id);
            })
            .map_err(report)?;
        tracing::info!(id, "plugin removed");
        Ok(())
    }

    /// Remove every loaded plugin and cancel adds still constructing.
    /// Returns how many were removed.
    pub fn remove_all(&self) -> usize {
        let freed = self.registry.clear(|slot| {
            self.meters.reset(slot.index());
            self.events.discard_for(slot.id());
        });
        if !freed.is_empty() {
            tracing::info!(count = freed.len(), "removed all plugins");
        }
        freed.len()
    }

    pub fn plugin_count(&self) -> usize {
        self.registry.count_active()
    }

    /// Look up a slot, logging when it is missing.
    pub fn slot(&self, id: i32) -> Result<Arc<PluginSlot>> {
        self.registry
            .find_by_id(id)
            .ok_or_else(|| report(HostError::SlotNotFound(id)))
    }

    /// Deliver audio-context notifications to the listener.
    ///
    /// Called from a non-real-time thread. A pending shutdown is reported
    /// once as [`CallbackKind::Quit`].
    pub fn dispatch_posted(&self) -> usize {
        let mut delivered = self.callbacks.dispatch_posted();
        if self.shutdown.swap(false, Ordering::AcqRel) {
            self.callbacks.dispatch(CallbackKind::Quit, 0, 0, 0, 0.0);
            delivered += 1;
        }
        delivered
    }
}

/// Log a fail-soft error and hand it back.
pub(crate) fn report(err: HostError) -> HostError {
    tracing::error!("{err}");
    err
}
