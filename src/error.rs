//! Centralized error type for the consort umbrella crate.
//!
//! Wraps the host and backend errors so `?` propagates naturally across crate boundaries.

use crate::backend::BackendError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Host(#[from] consort_core::HostError),

    #[error("Plugin: {0}")]
    Plugin(#[from] consort_plugin::PluginError),

    #[error("Backend: {0}")]
    Backend(#[from] BackendError),

    #[error("Engine is already running")]
    AlreadyOpen,

    #[error("Engine is not running")]
    NotOpen,

    #[error("Options can only be changed before the engine is first opened")]
    OptionsLocked,

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
