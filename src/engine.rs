//! Engine lifecycle: audio connection, check thread and plugin set.

use crate::backend::AudioBackend;
use crate::check_thread::CheckThread;
use crate::{Error, Result};
use consort_core::{
    HostConfig, HostError, HostOption, IntrospectionCache, Listener, PluginHost,
};
use consort_plugin::{LoadRequest, LoaderSet};
use parking_lot::Mutex;
use std::sync::Arc;

struct EngineState {
    backend: Box<dyn AudioBackend>,
    open: bool,
    /// Set by the first `open`; options are frozen from then on.
    initiated: bool,
    check: Option<CheckThread>,
}

/// Top-level host object.
///
/// Owns the audio connection and the [`PluginHost`]. The engine is either
/// closed or open; plugins may be added in both states but only process
/// while it is open.
///
/// # Example
///
/// ```ignore
/// use consort::prelude::*;
///
/// let engine = Engine::builder()
///     .loader(Arc::new(InternalLoader))
///     .build()?;
///
/// engine.open("consort")?;
/// let id = engine.add_plugin(&LoadRequest::new(PluginType::Internal, "", "tone"))?;
/// engine.host().set_volume(id, 0.8)?;
/// engine.close()?;
/// ```
pub struct Engine {
    host: Arc<PluginHost>,
    state: Mutex<EngineState>,
    cache: Mutex<IntrospectionCache>,
    last_error: Mutex<Option<String>>,
}

impl Engine {
    pub fn builder() -> crate::EngineBuilder {
        crate::EngineBuilder::default()
    }

    pub fn new(config: HostConfig, loaders: LoaderSet, backend: Box<dyn AudioBackend>) -> Result<Self> {
        let host = PluginHost::new(config, loaders)?;
        Ok(Self {
            host: Arc::new(host),
            state: Mutex::new(EngineState {
                backend,
                open: false,
                initiated: false,
                check: None,
            }),
            cache: Mutex::new(IntrospectionCache::new()),
            last_error: Mutex::new(None),
        })
    }

    /// Introspection and control API.
    pub fn host(&self) -> &Arc<PluginHost> {
        &self.host
    }

    /// Connect to the audio server and start processing.
    ///
    /// On failure the engine stays closed and the connection is dropped.
    pub fn open(&self, client_name: &str) -> Result<()> {
        tracing::debug!(client_name, "engine_init");
        let mut state = self.state.lock();
        if state.open {
            return Err(self.record(Error::AlreadyOpen));
        }
        state.initiated = true;

        if let Err(e) = state.backend.open(client_name) {
            return Err(self.record(HostError::ConnectionFailed(e.to_string()).into()));
        }

        let host = &self.host;
        host.buffer_size_changed(state.backend.buffer_size());
        host.sample_rate_changed(state.backend.sample_rate());

        if host.options().global_audio_client {
            let process_host = Arc::clone(host);
            state
                .backend
                .set_process_callback(Box::new(move |frames| process_host.process_block(frames)));
        }
        let buffer_host = Arc::clone(host);
        state
            .backend
            .set_buffer_size_callback(Box::new(move |frames| buffer_host.buffer_size_changed(frames)));
        let rate_host = Arc::clone(host);
        state
            .backend
            .set_sample_rate_callback(Box::new(move |rate| rate_host.sample_rate_changed(rate)));
        let shutdown_host = Arc::clone(host);
        state
            .backend
            .set_shutdown_callback(Box::new(move || shutdown_host.notify_shutdown()));

        if let Err(e) = state.backend.activate() {
            if let Err(close_err) = state.backend.close() {
                tracing::warn!("{close_err}");
            }
            return Err(self.record(HostError::ActivationFailed(e.to_string()).into()));
        }

        let assigned = state
            .backend
            .client_name()
            .unwrap_or_else(|| client_name.to_string());
        host.set_client_name(Some(sanitize_client_name(&assigned)));

        match CheckThread::spawn(Arc::clone(host), host.config().check_interval) {
            Ok(check) => state.check = Some(check),
            Err(e) => {
                if let Err(deactivate_err) = state.backend.deactivate() {
                    tracing::warn!("{deactivate_err}");
                }
                if let Err(close_err) = state.backend.close() {
                    tracing::warn!("{close_err}");
                }
                host.set_client_name(None);
                return Err(self.record(e.into()));
            }
        }

        state.open = true;
        tracing::info!(
            client = %assigned,
            buffer_size = host.buffer_size(),
            sample_rate = host.sample_rate(),
            "engine opened"
        );
        Ok(())
    }

    /// Disconnect, remove every plugin and stop the check thread.
    ///
    /// Transport failures while tearing down are recorded in
    /// [`last_error`](Self::last_error) but do not fail the call.
    pub fn close(&self) -> Result<()> {
        tracing::debug!("engine_close");
        let mut state = self.state.lock();
        if !state.open {
            return Err(self.record(Error::NotOpen));
        }
        state.open = false;

        if let Err(e) = state.backend.deactivate() {
            tracing::warn!("{e}");
            self.set_last_error(format!("Failed to deactivate audio client: {e}"));
        }
        if let Err(e) = state.backend.close() {
            tracing::warn!("{e}");
            self.set_last_error(format!("Failed to close audio client: {e}"));
        }

        self.host.remove_all();

        if let Some(check) = state.check.take() {
            if !check.stop(self.host.config().stop_timeout) {
                self.set_last_error("Check thread did not stop in time".to_string());
            }
        }

        self.host.set_client_name(None);
        self.cache.lock().flush();
        tracing::info!("engine closed");
        Ok(())
    }

    pub fn is_running(&self) -> bool {
        self.state.lock().open
    }

    /// Only allowed before the first [`open`](Self::open).
    pub fn set_option(&self, option: HostOption) -> Result<()> {
        if self.state.lock().initiated {
            tracing::warn!(?option, "option change after engine start ignored");
            return Err(self.record(Error::OptionsLocked));
        }
        self.host.set_option(option);
        Ok(())
    }

    pub fn set_callback(&self, listener: Option<Listener>) {
        self.host.set_callback(listener);
    }

    pub fn add_plugin(&self, request: &LoadRequest) -> Result<i32> {
        self.host.add(request).map_err(|e| self.remember(e))
    }

    pub fn remove_plugin(&self, plugin_id: i32) -> Result<()> {
        self.host.remove(plugin_id).map_err(|e| self.remember(e))
    }

    pub fn plugin_count(&self) -> usize {
        self.host.plugin_count()
    }

    /// Run `f` against the engine's single-slot introspection cache.
    pub fn with_cache<R>(&self, f: impl FnOnce(&mut IntrospectionCache, &PluginHost) -> R) -> R {
        let mut cache = self.cache.lock();
        f(&mut cache, &self.host)
    }

    /// Message of the most recent failure, if any.
    pub fn last_error(&self) -> Option<String> {
        self.last_error.lock().clone()
    }

    /// Transport-safe name of the open connection.
    pub fn client_name(&self) -> Option<String> {
        self.host.client_name()
    }

    /// No remote-control transport is built in.
    pub fn control_url(&self) -> Option<String> {
        None
    }

    pub fn buffer_size(&self) -> u32 {
        self.host.buffer_size()
    }

    pub fn sample_rate(&self) -> f64 {
        self.host.sample_rate()
    }

    /// One block of latency in milliseconds. Zero before the first open.
    pub fn latency_ms(&self) -> f64 {
        let rate = self.sample_rate();
        if rate > 0.0 {
            f64::from(self.buffer_size()) / rate * 1000.0
        } else {
            0.0
        }
    }

    fn set_last_error(&self, message: String) {
        *self.last_error.lock() = Some(message);
    }

    /// Keep a host error that was already logged where it happened.
    fn remember(&self, err: HostError) -> Error {
        self.set_last_error(err.to_string());
        err.into()
    }

    fn record(&self, err: Error) -> Error {
        tracing::error!("{err}");
        self.set_last_error(err.to_string());
        err
    }
}

impl Drop for Engine {
    fn drop(&mut self) {
        if self.is_running() {
            let _ = self.close();
        }
    }
}

/// Replace everything but ASCII letters and digits with `_`.
pub fn sanitize_client_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
