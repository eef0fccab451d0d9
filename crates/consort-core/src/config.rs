//! Host configuration.

use crate::{HostError, Result};
use std::time::Duration;

/// Static configuration, fixed for the lifetime of a host.
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Plugin slot capacity.
    pub max_plugins: usize,
    /// Port-name length budget imposed by the audio transport.
    pub port_name_size: usize,
    /// Capacity of the injected-note queue.
    pub max_midi_events: usize,
    /// Tick of the background check thread.
    pub check_interval: Duration,
    /// Bounded wait when stopping the check thread.
    pub stop_timeout: Duration,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            max_plugins: 99,
            port_name_size: 256,
            max_midi_events: 512,
            check_interval: Duration::from_millis(50),
            stop_timeout: Duration::from_secs(2),
        }
    }
}

impl HostConfig {
    pub fn validate(&self) -> Result<()> {
        if self.max_plugins == 0 || self.max_plugins > 999 {
            return Err(HostError::InvalidConfig(format!(
                "max_plugins {} out of range (1-999)",
                self.max_plugins
            )));
        }
        if self.port_name_size < 16 {
            return Err(HostError::InvalidConfig(format!(
                "port_name_size {} too small (minimum 16)",
                self.port_name_size
            )));
        }
        if self.max_midi_events == 0 {
            return Err(HostError::InvalidConfig(
                "max_midi_events must be non-zero".into(),
            ));
        }
        if self.check_interval.is_zero() {
            return Err(HostError::InvalidConfig(
                "check_interval must be non-zero".into(),
            ));
        }
        Ok(())
    }
}

/// Runtime options, changeable only before the engine is first opened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HostOptions {
    /// Register the process callback on one shared connection instead of one
    /// connection per plugin.
    pub global_audio_client: bool,
}

impl Default for HostOptions {
    fn default() -> Self {
        Self {
            global_audio_client: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HostOption {
    GlobalAudioClient(bool),
}

impl HostOptions {
    pub fn apply(&mut self, option: HostOption) {
        match option {
            HostOption::GlobalAudioClient(value) => self.global_audio_client = value,
        }
    }
}
