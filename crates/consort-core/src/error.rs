//! Error types for consort-core.

use consort_plugin::{PluginError, PluginType};
use thiserror::Error;

/// Error type for host operations.
///
/// Lookup failures (`SlotNotFound`, `IndexOutOfRange`) are fail-soft: the
/// operation has no effect and the error is logged, but nothing unwinds.
#[derive(Error, Debug)]
pub enum HostError {
    #[error("Audio connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Failed to activate audio connection: {0}")]
    ActivationFailed(String),

    #[error("Could not find plugin {0}")]
    SlotNotFound(i32),

    #[error("{what} {index} out of range for plugin {plugin_id} (count {count})")]
    IndexOutOfRange {
        plugin_id: i32,
        what: &'static str,
        index: u32,
        count: u32,
    },

    #[error("Unsupported plugin format: {0}")]
    UnsupportedFormat(String),

    #[error("Plugin {plugin_id} does not support {capability}")]
    CapabilityUnsupported {
        plugin_id: i32,
        capability: &'static str,
    },

    #[error("Invalid MIDI {what}: {value}")]
    InvalidChannelOrCC { what: &'static str, value: i32 },

    #[error("Maximum number of plugins ({0}) reached")]
    RegistryFull(usize),

    #[error("Plugin load cancelled by remove_all")]
    LoadCancelled,

    #[error("Event queue full ({0} pending events)")]
    EventQueueFull(usize),

    #[error("Invalid chunk data for plugin {plugin_id}: {reason}")]
    InvalidChunk { plugin_id: i32, reason: String },

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Plugin(#[from] PluginError),
}

impl HostError {
    pub(crate) fn unsupported_type(plugin_type: PluginType) -> Self {
        HostError::UnsupportedFormat(format!("no loader for {plugin_type} plugins"))
    }
}

/// Result type alias.
pub type Result<T> = std::result::Result<T, HostError>;
