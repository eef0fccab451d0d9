//! # Consort - Plugin Host Core
//!
//! Keeps a live set of audio plugins, numbers and names them, and runs them
//! against a real-time audio callback without letting control-side changes
//! race the audio thread.
//!
//! ## Architecture
//!
//! Consort is an umbrella crate that coordinates:
//! - **consort-plugin** - Plugin capability surface (trait, metadata, loaders, chunk codec)
//! - **consort-core** - Registry, name allocation, realtime guard, meters, callbacks, introspection
//! - **backend** - Audio server connection (`DummyBackend`, `CpalBackend`)
//!
//! ## Quick Start
//!
//! ```ignore
//! use consort::prelude::*;
//!
//! let engine = Engine::builder()
//!     .loader(Arc::new(InternalLoader))
//!     .build()?;
//!
//! engine.set_callback(Some(Box::new(|event| println!("{event:?}"))));
//! engine.open("consort")?;
//!
//! let id = engine.add_plugin(&LoadRequest::new(PluginType::Internal, "", "tone"))?;
//! let info = engine.host().plugin_info(id)?;
//! engine.host().send_midi_note(id, true, 60, 100)?;
//!
//! engine.close()?;
//! ```
//!
//! ## Feature Flags
//!
//! - `default` - Core host with the built-in test plugins and the dummy backend
//! - `cpal` - Audio output through the system's default device

/// Re-export of consort-core for direct access
pub use consort_core as core;

/// Re-export of consort-plugin for direct access
pub use consort_plugin as plugin;

pub use consort_core::{
    CacheCell, CallbackEvent, CallbackKind, HostConfig, HostError, HostOption, HostOptions,
    IntrospectionCache, Listener, MidiProgramInfo, ParameterData, ParameterInfo, PluginHost,
    PluginInfo, PortCountInfo, ScalePointInfo,
};

pub use consort_plugin::{
    BinaryType, CustomData, GuiInfo, LoadRequest, LoaderSet, Plugin, PluginError,
    PluginLoader, PluginMetadata, PluginType,
};

#[cfg(feature = "internal")]
pub use consort_plugin::{InternalLoader, TestTone};

pub mod backend;
pub use backend::{AudioBackend, BackendError, DummyBackend, DummyConfig, DummyHandle};

#[cfg(feature = "cpal")]
pub use backend::CpalBackend;

mod error;
pub use error::{Error, Result};

mod builder;
mod check_thread;
mod engine;

pub use builder::EngineBuilder;
pub use engine::{sanitize_client_name, Engine};

/// Convenience prelude for common imports
pub mod prelude {
    // Main engine
    pub use crate::{Engine, EngineBuilder};

    // Loading
    pub use crate::{LoadRequest, PluginType};

    #[cfg(feature = "internal")]
    pub use crate::InternalLoader;

    // Callbacks
    pub use crate::{CallbackEvent, CallbackKind, HostOption};

    // Backends
    pub use crate::DummyBackend;
    #[cfg(feature = "cpal")]
    pub use crate::CpalBackend;

    pub use std::sync::Arc;
}
