//! Plugin capability surface for consort
//!
//! This crate defines what the host core consumes from plugin formats:
//!
//! - [`Plugin`]: the per-instance capability trait (ports, parameters,
//!   programs, chunk state, GUI, per-block processing)
//! - [`PluginLoader`] / [`LoaderSet`]: format-specific construction
//! - [`PluginMetadata`] and the parameter/program value types
//! - Base64 chunk codec ([`encode_chunk`], [`decode_chunk`])
//!
//! Format loaders (LADSPA, DSSI, LV2, VST) live outside this crate and only
//! need to implement [`PluginLoader`]. The `internal` feature ships a small
//! built-in synth for smoke tests.
//!
//! ## Usage
//!
//! ```ignore
//! use consort_plugin::{LoaderSet, LoadRequest, PluginType};
//!
//! let loaders = LoaderSet::new().with(Arc::new(MyLadspaLoader::new()));
//! let plugin = loaders.load(&LoadRequest::new(PluginType::Ladspa, "/usr/lib/ladspa/amp.so", "amp_stereo"))?;
//! println!("{}", plugin.metadata().name);
//! ```

pub mod error;
pub use error::{LoadStage, PluginError, Result};

mod chunk;
pub use chunk::{decode_chunk, encode_chunk, MIN_CHUNK_SIZE};

mod instance;
pub use instance::{MixControls, Plugin, PortPeaks, ProcessContext};

mod loader;
pub use loader::{LoadRequest, LoaderSet, PluginLoader};

mod metadata;
pub use metadata::PluginMetadata;

pub mod types;
pub use types::{
    BinaryType, CustomData, GuiInfo, GuiType, MidiProgram, NoteEvent, ParameterDescriptor,
    ParameterHints, ParameterRanges, ParameterType, PluginCategory, PluginHints, PluginType,
    PortCounts, ScalePoint,
};

#[cfg(feature = "internal")]
pub mod internal;
#[cfg(feature = "internal")]
pub use internal::{InternalLoader, TestTone};
