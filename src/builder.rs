//! Builder for configuring and constructing an [`Engine`].

use crate::backend::{AudioBackend, DummyBackend};
use crate::{Engine, Result};
use consort_core::{HostConfig, HostOption};
use consort_plugin::{LoaderSet, PluginLoader};
use std::sync::Arc;
use std::time::Duration;

/// Without an explicit backend the engine runs on a [`DummyBackend`], which
/// needs no audio server.
///
/// # Example
///
/// ```ignore
/// use consort::prelude::*;
///
/// let engine = Engine::builder()
///     .max_plugins(16)
///     .loader(Arc::new(InternalLoader))
///     .backend(CpalBackend::new())
///     .build()?;
/// ```
#[derive(Default)]
pub struct EngineBuilder {
    config: HostConfig,
    loaders: LoaderSet,
    backend: Option<Box<dyn AudioBackend>>,
    options: Vec<HostOption>,
}

impl EngineBuilder {
    pub fn config(mut self, config: HostConfig) -> Self {
        self.config = config;
        self
    }

    /// Default: 99
    pub fn max_plugins(mut self, count: usize) -> Self {
        self.config.max_plugins = count;
        self
    }

    /// Default: 256
    pub fn port_name_size(mut self, size: usize) -> Self {
        self.config.port_name_size = size;
        self
    }

    /// Default: 512
    pub fn max_midi_events(mut self, count: usize) -> Self {
        self.config.max_midi_events = count;
        self
    }

    /// Default: 50 ms
    pub fn check_interval(mut self, interval: Duration) -> Self {
        self.config.check_interval = interval;
        self
    }

    /// Register a format loader. A later loader for the same type replaces the earlier one.
    pub fn loader(mut self, loader: Arc<dyn PluginLoader>) -> Self {
        self.loaders.register(loader);
        self
    }

    pub fn backend(mut self, backend: impl AudioBackend + 'static) -> Self {
        self.backend = Some(Box::new(backend));
        self
    }

    /// Applied before the engine can be opened.
    pub fn option(mut self, option: HostOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn build(self) -> Result<Engine> {
        let backend = self
            .backend
            .unwrap_or_else(|| Box::new(DummyBackend::default()));
        let engine = Engine::new(self.config, self.loaders, backend)?;
        for option in self.options {
            engine.set_option(option)?;
        }
        Ok(engine)
    }
}
