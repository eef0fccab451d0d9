//! Error types for plugin loading and plugin state

use crate::types::PluginType;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStage {
    Opening,
    Descriptor,
    Instantiation,
    Ports,
    Activation,
}

impl std::fmt::Display for LoadStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LoadStage::Opening => write!(f, "opening library"),
            LoadStage::Descriptor => write!(f, "resolving descriptor"),
            LoadStage::Instantiation => write!(f, "creating instance"),
            LoadStage::Ports => write!(f, "connecting ports"),
            LoadStage::Activation => write!(f, "activating"),
        }
    }
}

#[derive(Error, Debug)]
pub enum PluginError {
    #[error("Plugin load failed at {stage} stage: {path}\n  Reason: {reason}")]
    LoadFailed {
        path: PathBuf,
        stage: LoadStage,
        reason: String,
    },

    #[error("No loader registered for plugin type {0}")]
    UnsupportedType(PluginType),

    #[error("Unknown plugin label '{label}' in {path}")]
    UnknownLabel { path: PathBuf, label: String },

    #[error("Plugin does not support chunks")]
    ChunksUnsupported,

    #[error("Invalid chunk data: {0}")]
    InvalidChunk(String),

    #[error("Failed to restore plugin state: {0}")]
    StateRestoreError(String),

    #[error("Plugin editor error: {0}")]
    EditorError(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PluginError>;
