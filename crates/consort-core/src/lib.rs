//! Plugin-host core for consort.
//!
//! Keeps the live set of plugins, hands out slot ids, serializes structural
//! changes against the audio callback and exposes the introspection and
//! control API a front end drives.
//!
//! # Concurrency
//!
//! - **Processing lock**: owns the slot table; held by add/remove while they
//!   publish or unpublish a slot and by [`PluginHost::process_block`] for one
//!   block. Plugin construction and destruction run outside it.
//! - **Event lock**: bounded queue of injected notes, drained with `try_lock`.
//! - **Listener**: swapped atomically; audio-context notifications are posted
//!   to a lock-free queue and delivered by [`PluginHost::dispatch_posted`].
//!
//! # Example
//!
//! ```ignore
//! use consort_core::{HostConfig, PluginHost};
//! use consort_plugin::{InternalLoader, LoadRequest, LoaderSet, PluginType};
//!
//! let loaders = LoaderSet::new().with(Arc::new(InternalLoader));
//! let host = PluginHost::new(HostConfig::default(), loaders)?;
//! let id = host.add(&LoadRequest::new(PluginType::Internal, "", "tone"))?;
//! host.set_parameter_value(id, 0, 0.8)?;
//! let info = host.parameter_info(id, 0)?;
//! ```

pub mod error;
pub use error::{HostError, Result};

pub mod config;
pub use config::{HostConfig, HostOption, HostOptions};

// Slot table and the locks around it
pub mod guard;
pub mod registry;
pub use guard::{EventQueue, ExternalMidiNote};
pub use registry::{MidiMapping, PluginRegistry, PluginSlot, NO_ID};

pub mod names;
pub use names::{unique_name, NameBudget, PLACEHOLDER_NAME};

pub mod meters;
pub use meters::PeakMeters;

pub mod callback;
pub use callback::{CallbackDispatcher, CallbackEvent, CallbackKind, Listener};

mod host;
pub use host::PluginHost;

// PluginHost API, split by context
mod control;
mod process;
pub mod query;
pub use control::{MAX_MIDI_CC, MAX_MIDI_CHANNEL, MAX_VOLUME};
pub use query::{
    MidiProgramInfo, ParameterData, ParameterInfo, PluginInfo, PortCountInfo, ScalePointInfo,
};

pub mod cache;
pub use cache::{CacheCell, IntrospectionCache};
