//! Audio transport collaborators.
//!
//! The engine talks to the audio server only through [`AudioBackend`]: open a
//! connection, register the four callbacks, activate, and tear down again.
//! Callbacks are invoked on the transport's own thread and are serialized by
//! the transport.

mod dummy;
pub use dummy::{DummyBackend, DummyConfig, DummyHandle};

#[cfg(feature = "cpal")]
mod cpal;
#[cfg(feature = "cpal")]
pub use self::cpal::CpalBackend;

use thiserror::Error;

/// Called once per block with the block's frame count.
pub type ProcessCallback = Box<dyn FnMut(u32) + Send>;
pub type BufferSizeCallback = Box<dyn FnMut(u32) + Send>;
pub type SampleRateCallback = Box<dyn FnMut(f64) + Send>;
/// Called when the server goes away underneath an active connection.
pub type ShutdownCallback = Box<dyn FnMut() + Send>;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Could not connect to audio server: {0}")]
    Connect(String),

    #[error("Could not activate client: {0}")]
    Activate(String),

    #[error("Could not deactivate client: {0}")]
    Deactivate(String),

    #[error("Could not close client: {0}")]
    Close(String),

    #[error("Not connected")]
    NotConnected,

    #[error("Already connected")]
    AlreadyConnected,
}

pub type Result<T> = std::result::Result<T, BackendError>;

/// Connection to an audio server.
pub trait AudioBackend: Send {
    fn open(&mut self, client_name: &str) -> Result<()>;

    /// Name the server actually assigned, which may differ from the request.
    fn client_name(&self) -> Option<String>;

    fn buffer_size(&self) -> u32;

    fn sample_rate(&self) -> f64;

    fn set_process_callback(&mut self, callback: ProcessCallback);

    fn set_buffer_size_callback(&mut self, callback: BufferSizeCallback);

    fn set_sample_rate_callback(&mut self, callback: SampleRateCallback);

    fn set_shutdown_callback(&mut self, callback: ShutdownCallback);

    /// Start invoking callbacks.
    fn activate(&mut self) -> Result<()>;

    fn deactivate(&mut self) -> Result<()>;

    /// Drop the connection and every registered callback.
    fn close(&mut self) -> Result<()>;
}

/// Callback set shared between a backend and its driving thread.
#[derive(Default)]
pub(crate) struct Callbacks {
    pub(crate) process: Option<ProcessCallback>,
    pub(crate) buffer_size: Option<BufferSizeCallback>,
    pub(crate) sample_rate: Option<SampleRateCallback>,
    pub(crate) shutdown: Option<ShutdownCallback>,
}
