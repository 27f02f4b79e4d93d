//! Configuration System
//!
//! Layered configuration built with the `config` crate. Sources are applied
//! lowest precedence first: built-in defaults, the global config file, the
//! workspace config file, then `HONEYTREE__*` environment variables.

pub mod facade;
pub mod merge;
pub mod paths;
pub mod sources;
pub mod workspace;

pub use facade::ConfigLoader;
pub use paths::xdg_root as xdg;
pub use workspace::storage_paths::{StorageBackend, StorageConfig};

use crate::logging::LoggingConfig;
use crate::types::Mode;
use serde::{Deserialize, Serialize};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HoneytreeConfig {
    /// Extension rule and property shape for every node
    #[serde(default)]
    pub mode: Mode,

    #[serde(default)]
    pub storage: StorageConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}
