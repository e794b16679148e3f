//! Centralized error type for the tutti-host umbrella crate.
//!
//! Wraps every subsystem error so `?` propagates across crate boundaries.

use thiserror::Error;
use tutti_descriptor::{LoadError, PortError, RegistryError};
use tutti_plugin::{ConnectError, InstantiateError, RunError, StateError};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unknown plugin: {0}")]
    UnknownPlugin(String),

    #[error("Load: {0}")]
    Load(#[from] LoadError),

    #[error("Registry: {0}")]
    Registry(#[from] RegistryError),

    #[error("Port: {0}")]
    Port(#[from] PortError),

    #[error("Instantiate: {0}")]
    Instantiate(#[from] InstantiateError),

    #[error("Connect: {0}")]
    Connect(#[from] ConnectError),

    #[error("State: {0}")]
    State(#[from] StateError),

    #[error("Run: {0}")]
    Run(#[from] RunError),

    #[error("{0} has no audio outputs to write")]
    NoAudioOutput(String),

    #[error("WAV: {0}")]
    Wav(#[from] hound::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
