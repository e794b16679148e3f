//! Error types for the instance lifecycle

use crate::instance::InstanceState;
use std::path::PathBuf;
use thiserror::Error;

/// Failure inside plugin code or the layer that loads it.
///
/// Surfaced to callers wrapped in the `Internal` variants of the lifecycle
/// errors. Never retried.
#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("Plugin has no binary")]
    NoBinary,

    #[error("Unknown built-in processor: {0}")]
    UnknownBuiltin(String),

    #[error("Failed to load plugin library {}\n  Reason: {reason}", path.display())]
    Library { path: PathBuf, reason: String },

    #[error("Plugin {uri} not found in library {}", path.display())]
    EntryNotFound { path: PathBuf, uri: String },

    #[error("Plugin is missing a required port: {0}")]
    MissingPort(&'static str),

    #[error("Plugin instantiation failed: {0}")]
    InstantiationFailed(String),

    #[error("Plugin run returned status {0}")]
    Status(i32),

    #[error("{0}")]
    Other(String),
}

#[derive(Error, Debug)]
pub enum InstantiateError {
    #[error("Invalid sample rate: {0}. Must be positive and finite")]
    InvalidSampleRate(f64),

    #[error("Plugin {uri} requires unsupported feature {feature}")]
    UnsupportedFeature { uri: String, feature: String },

    #[error("Instantiation failed: {0}")]
    Internal(#[from] ProcessError),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConnectError {
    #[error("Port index {index} out of range (plugin has {count} ports)")]
    IndexOutOfRange { index: usize, count: usize },

    #[error("Buffer does not match port {index}: expected {expected}")]
    TypeMismatch { index: usize, expected: &'static str },

    #[error("Cannot connect ports while {state}")]
    InvalidState { state: InstanceState },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateError {
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition {
        from: InstanceState,
        to: InstanceState,
    },
}

#[derive(Error, Debug)]
pub enum RunError {
    #[error("Cannot run while {state}")]
    InvalidState { state: InstanceState },

    #[error("Port {index} is not connected")]
    UnboundPort { index: usize },

    #[error("Port {index} buffer holds {len} samples, run needs {frames}")]
    BufferTooSmall {
        index: usize,
        len: usize,
        frames: usize,
    },

    #[error("Run failed: {0}")]
    Internal(#[from] ProcessError),
}
