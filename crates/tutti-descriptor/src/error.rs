//! Error types for descriptor loading, registry indexing and port queries.

use std::path::PathBuf;
use thiserror::Error;

/// Failure to turn a bundle location into descriptors.
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Bundle not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Malformed bundle {}\n  Reason: {reason}", path.display())]
    Malformed { path: PathBuf, reason: String },

    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl LoadError {
    pub fn path(&self) -> &std::path::Path {
        match self {
            LoadError::NotFound { path }
            | LoadError::Malformed { path, .. }
            | LoadError::Io { path, .. } => path,
        }
    }
}

/// A descriptor that violates the port or identity invariants.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DescriptorError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),

    #[error("Port {index} has no capability tags")]
    EmptyCapabilities { index: usize },

    #[error("Port {index} has an unknown type '{name}'")]
    UnknownPortType { index: usize, name: String },

    #[error("Duplicate port index {index}")]
    DuplicatePortIndex { index: usize },

    #[error("Port indices are not contiguous: expected {expected}, found {found}")]
    NonContiguousPorts { expected: usize, found: usize },

    #[error("Duplicate port symbol '{0}'")]
    DuplicateSymbol(String),

    #[error("Port {index} is both input and output")]
    ConflictingDirection { index: usize },

    #[error("Port {index} is both audio and control")]
    ConflictingDataType { index: usize },

    #[error("Port {index} has an invalid control range")]
    InvalidRange { index: usize },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Duplicate plugin URI: {0}")]
    DuplicateUri(String),
}

#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortError {
    #[error("Port index {index} out of range (plugin has {count} ports)")]
    IndexOutOfRange { index: usize, count: usize },
}
