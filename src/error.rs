//! Error types
//!
//! `StorageError` covers record store defects and is the only error that
//! escapes a hierarchy operation. `TreeError` is the expected-condition
//! taxonomy; it is folded into a response envelope at the manager boundary.

use crate::envelope::Status;
use crate::types::Mode;
use std::fmt;
use thiserror::Error;

/// Record store failures
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Sled(#[from] sled::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Record already exists: {0}")]
    Duplicate(String),

    #[error("Update matched no record: {0}")]
    NoMatch(String),

    #[error("Record is not a folder: {0}")]
    NotAFolder(String),

    #[error("Field {field} does not apply to record {path}")]
    FieldMismatch { path: String, field: &'static str },

    #[error("Corrupt record at {path}: {reason}")]
    Corrupt { path: String, reason: String },
}

/// Path validation failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("Path not provided")]
    Missing,

    #[error("Path contains consecutive slashes: {0}")]
    DoubleSlash(String),

    #[error("Invalid file extension for {mode} mode: {path}")]
    InvalidExtension { path: String, mode: Mode },
}

/// Which side of a rename or copy an error refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Original,
    Destination,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Original => f.write_str("original"),
            Side::Destination => f.write_str("destination"),
        }
    }
}

/// Kind of file transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transfer {
    Rename,
    Copy,
}

impl fmt::Display for Transfer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transfer::Rename => f.write_str("rename"),
            Transfer::Copy => f.write_str("copy"),
        }
    }
}

/// Hierarchy operation failures
#[derive(Debug, Error)]
pub enum TreeError {
    #[error(transparent)]
    Path(#[from] PathError),

    #[error("Invalid {side} path: {source}")]
    TransferPath { side: Side, source: PathError },

    #[error("Unable to {0} folders")]
    FolderTransfer(Transfer),

    #[error("Operation requires {0} mode")]
    ModeMismatch(Mode),

    #[error("Unable to find path: {0}")]
    NotFound(String),

    #[error("Unable to find phrase by ID: {0}")]
    PhraseNotFound(String),

    #[error("Path already exists: {0}")]
    Conflict(String),

    #[error("Unable to delete root directory")]
    RootDeletion,

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl TreeError {
    /// Envelope status for an expected condition. Storage errors have none.
    pub fn status(&self) -> Option<Status> {
        match self {
            TreeError::Path(_)
            | TreeError::TransferPath { .. }
            | TreeError::FolderTransfer(_)
            | TreeError::ModeMismatch(_) => Some(Status::BadRequest),
            TreeError::NotFound(_) | TreeError::PhraseNotFound(_) => Some(Status::NotFound),
            TreeError::Conflict(_) | TreeError::RootDeletion => Some(Status::Conflict),
            TreeError::Storage(_) => None,
        }
    }
}

/// CLI and configuration boundary errors
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Storage error: {0}")]
    StorageError(#[from] StorageError),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl From<config::ConfigError> for ApiError {
    fn from(err: config::ConfigError) -> Self {
        ApiError::ConfigError(err.to_string())
    }
}
