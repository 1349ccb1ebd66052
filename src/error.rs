//! Error types for feature spec generation.

use crate::registry::RegistrationConflict;
use std::path::PathBuf;
use thiserror::Error;

/// Failures producing a model description.
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Model description not found: {0}")]
    NotFound(PathBuf),

    #[error("Failed to read model description {path:?}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed model description from {origin}: {source}")]
    Malformed {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Model description from {0} has no name")]
    MissingName(String),

    #[error("The {0} reader cannot load the model in an isolated process")]
    ForkUnsupported(String),

    #[error("Failed to start model exporter {command}: {source}")]
    ExporterSpawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Model exporter {command} exited with {status}: {stderr}")]
    ExporterFailed {
        command: String,
        status: String,
        stderr: String,
    },
}

/// Storage-related errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Invalid spec name for storage: {0}")]
    InvalidName(String),

    #[error("Failed to serialize spec {name}: {source}")]
    Serialize {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Storage I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Errors surfaced by a generation run.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("Model read failed: {0}")]
    Model(#[from] ModelError),

    #[error("Spec write failed: {0}")]
    Storage(#[from] StorageError),

    #[error("Registration conflict: {0}")]
    Conflict(RegistrationConflict),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to render output: {0}")]
    Render(String),
}

impl From<config::ConfigError> for GenerationError {
    fn from(err: config::ConfigError) -> Self {
        GenerationError::ConfigError(err.to_string())
    }
}
