//! Format loader interface.
//!
//! Loaders resolve a library path + label into a constructed [`Plugin`]. The
//! host keeps one [`LoaderSet`] and dispatches on [`PluginType`].

use crate::error::{PluginError, Result};
use crate::instance::Plugin;
use crate::types::{BinaryType, PluginType};
use std::path::PathBuf;
use std::sync::Arc;

/// Everything a loader needs to construct one plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadRequest {
    pub binary_type: BinaryType,
    pub plugin_type: PluginType,
    pub path: PathBuf,
    pub label: String,
    /// Format-specific extra argument (e.g. a DSSI GUI path)
    pub extra: Option<String>,
}

impl LoadRequest {
    pub fn new(plugin_type: PluginType, path: impl Into<PathBuf>, label: impl Into<String>) -> Self {
        Self {
            binary_type: BinaryType::None,
            plugin_type,
            path: path.into(),
            label: label.into(),
            extra: None,
        }
    }

    pub fn binary_type(mut self, binary_type: BinaryType) -> Self {
        self.binary_type = binary_type;
        self
    }

    pub fn extra(mut self, extra: impl Into<String>) -> Self {
        self.extra = Some(extra.into());
        self
    }
}

pub trait PluginLoader: Send + Sync {
    fn plugin_type(&self) -> PluginType;

    fn load(&self, request: &LoadRequest) -> Result<Box<dyn Plugin>>;
}

/// Registered loaders, at most one per plugin type.
#[derive(Clone, Default)]
pub struct LoaderSet {
    loaders: Vec<Arc<dyn PluginLoader>>,
}

impl LoaderSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a loader, replacing any previous loader for the same type.
    pub fn register(&mut self, loader: Arc<dyn PluginLoader>) {
        let plugin_type = loader.plugin_type();
        self.loaders.retain(|l| l.plugin_type() != plugin_type);
        tracing::debug!("Registered {} loader", plugin_type);
        self.loaders.push(loader);
    }

    pub fn with(mut self, loader: Arc<dyn PluginLoader>) -> Self {
        self.register(loader);
        self
    }

    pub fn supports(&self, plugin_type: PluginType) -> bool {
        self.loaders.iter().any(|l| l.plugin_type() == plugin_type)
    }

    pub fn supported_types(&self) -> Vec<PluginType> {
        self.loaders.iter().map(|l| l.plugin_type()).collect()
    }

    pub fn load(&self, request: &LoadRequest) -> Result<Box<dyn Plugin>> {
        let loader = self
            .loaders
            .iter()
            .find(|l| l.plugin_type() == request.plugin_type)
            .ok_or(PluginError::UnsupportedType(request.plugin_type))?;
        loader.load(request)
    }
}
