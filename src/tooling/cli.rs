//! CLI Tooling
//!
//! Command-line interface over the hierarchy manager. Every subcommand maps to
//! exactly one manager operation; the CLI only parses input and renders the
//! resulting envelope.

use crate::config::{ConfigLoader, HoneytreeConfig, StorageBackend};
use crate::envelope::ResponseEnvelope;
use crate::error::ApiError;
use crate::hierarchy::HierarchyManager;
use crate::store::{MemoryNodeRecordStore, NodeRecordStore, SledNodeRecordStore};
use crate::tooling::format::{
    format_directory_text, format_envelope_status, format_listing_text, format_node_text,
    format_phrases_text, format_report_text,
};
use crate::types::Mode;
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Honeytree CLI - path-addressed hierarchy of folders and files
#[derive(Parser)]
#[command(name = "honeytree")]
#[command(about = "Manage a hierarchy of folders and files stored as flat records")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Operating mode (test, phrase); overrides config
    #[arg(long)]
    pub mode: Option<Mode>,

    /// Record store backend (memory, sled); overrides config
    #[arg(long)]
    pub store: Option<StorageBackend>,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stderr, both)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output includes "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// The response envelope as pretty-printed JSON
    Json,
    /// Human-readable tables and trees
    Text,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Create a file or folder, adding missing ancestor folders
    Create {
        /// Slash-delimited path; folders end with '/'
        path: String,
    },
    /// Show a node and its direct children
    Get { path: String },
    /// Update properties of a file
    Save {
        path: String,
        /// Property assignment, repeatable (e.g. --set url=https://example.com)
        #[arg(long = "set", value_parser = parse_key_value)]
        set: Vec<(String, String)>,
        /// Property to clear, repeatable
        #[arg(long)]
        clear: Vec<String>,
    },
    /// Delete a node; folders are removed with their subtree
    Delete { path: String },
    /// Move a file to a new path
    Rename {
        original: String,
        destination: String,
        /// New phrase id for the moved file (phrase mode only)
        #[arg(long)]
        phrase_id: Option<String>,
    },
    /// Duplicate a file at a new path
    Copy {
        original: String,
        destination: String,
    },
    /// Show the full directory tree
    Tree,
    /// Find files by phrase id (phrase mode only)
    Phrase { id: String },
    /// Verify parent/child bookkeeping across the store
    Check,
}

/// Parse a `key=value` pair. The value may itself contain '='.
pub fn parse_key_value(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected key=value, got '{}'", raw)),
    }
}

impl Cli {
    /// Fold command-line overrides into a loaded configuration.
    pub fn apply_overrides(&self, config: &mut HoneytreeConfig) {
        if let Some(mode) = self.mode {
            config.mode = mode;
        }
        if let Some(backend) = self.store {
            config.storage.backend = backend;
        }
        if self.verbose {
            config.logging.level = "debug".to_string();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        if let Some(format) = &self.log_format {
            config.logging.format = format.clone();
        }
        if let Some(output) = &self.log_output {
            config.logging.output = output.clone();
        }
        if let Some(file) = &self.log_file {
            config.logging.file = Some(file.clone());
        }
    }
}

/// Rendered command result
#[derive(Debug, Clone)]
pub struct CommandOutput {
    pub rendered: String,
    /// False when the envelope reports a failure
    pub success: bool,
}

/// CLI context for executing commands
pub struct CliContext {
    workspace_root: PathBuf,
    manager: HierarchyManager,
    sled: Option<Arc<SledNodeRecordStore>>,
}

impl CliContext {
    /// Load configuration for a workspace, or from an explicit file.
    pub fn load_config(
        workspace_root: &Path,
        config_path: Option<&Path>,
    ) -> Result<HoneytreeConfig, ApiError> {
        let config = match config_path {
            Some(path) => ConfigLoader::load_from_file(path)?,
            None => ConfigLoader::load(workspace_root)?,
        };
        Ok(config)
    }

    /// Create a new CLI context
    pub fn new(workspace_root: PathBuf, config_path: Option<PathBuf>) -> Result<Self, ApiError> {
        let config = Self::load_config(&workspace_root, config_path.as_deref())?;
        Self::from_config(workspace_root, &config)
    }

    /// Open the configured store and wrap it in a manager.
    pub fn from_config(workspace_root: PathBuf, config: &HoneytreeConfig) -> Result<Self, ApiError> {
        let mut sled = None;
        let store: Arc<dyn NodeRecordStore> = match config.storage.backend {
            StorageBackend::Memory => Arc::new(MemoryNodeRecordStore::new()),
            StorageBackend::Sled => {
                let store_path = config.storage.resolve_store_path(&workspace_root)?;
                let store = Arc::new(SledNodeRecordStore::open(&store_path)?);
                info!(path = %store_path.display(), "Opened sled store");
                sled = Some(Arc::clone(&store));
                store
            }
        };
        let manager = HierarchyManager::new(store, config.mode)?;
        Ok(Self {
            workspace_root,
            manager,
            sled,
        })
    }

    pub fn workspace_root(&self) -> &Path {
        &self.workspace_root
    }

    pub fn manager(&self) -> &HierarchyManager {
        &self.manager
    }

    /// Execute a command and render its envelope.
    pub fn execute(
        &self,
        command: &Commands,
        format: OutputFormat,
    ) -> Result<CommandOutput, ApiError> {
        let started = Instant::now();
        let result = self.execute_inner(command, format);
        if let Some(store) = &self.sled {
            if let Err(e) = store.flush() {
                warn!("Failed to flush store: {}", e);
            }
        }
        let duration_ms = started.elapsed().as_millis() as u64;
        match &result {
            Ok(output) => info!(
                command = command_name(command),
                ok = output.success,
                duration_ms,
                "Command finished"
            ),
            Err(e) => warn!(
                command = command_name(command),
                duration_ms,
                error = %e,
                "Command failed"
            ),
        }
        result
    }

    fn execute_inner(
        &self,
        command: &Commands,
        format: OutputFormat,
    ) -> Result<CommandOutput, ApiError> {
        match command {
            Commands::Create { path } => {
                let envelope = self.manager.create(path)?;
                render(&envelope, format, |created| format!("Created {}\n", created))
            }
            Commands::Get { path } => {
                let envelope = self.manager.get(path)?;
                render(&envelope, format, format_listing_text)
            }
            Commands::Save { path, set, clear } => {
                let updates = build_updates(set, clear);
                let envelope = self.manager.save(path, &updates)?;
                render(&envelope, format, format_node_text)
            }
            Commands::Delete { path } => {
                let envelope = self.manager.delete(path)?;
                render(&envelope, format, |_| String::new())
            }
            Commands::Rename {
                original,
                destination,
                phrase_id,
            } => {
                let envelope =
                    self.manager
                        .rename(original, destination, phrase_id.as_deref())?;
                render(&envelope, format, format_node_text)
            }
            Commands::Copy {
                original,
                destination,
            } => {
                let envelope = self.manager.copy(original, destination)?;
                render(&envelope, format, format_node_text)
            }
            Commands::Tree => {
                let envelope = self.manager.get_directory()?;
                render(&envelope, format, format_directory_text)
            }
            Commands::Phrase { id } => {
                let envelope = self.manager.get_phrase_by_id(id)?;
                render(&envelope, format, |nodes| format_phrases_text(nodes))
            }
            Commands::Check => {
                let envelope = self.manager.check_consistency()?;
                render(&envelope, format, format_report_text)
            }
        }
    }
}

fn build_updates(set: &[(String, String)], clear: &[String]) -> Map<String, Value> {
    let mut updates = Map::new();
    for (key, value) in set {
        updates.insert(key.clone(), Value::String(value.clone()));
    }
    for key in clear {
        updates.insert(key.clone(), Value::Null);
    }
    updates
}

fn render<T: Serialize>(
    envelope: &ResponseEnvelope<T>,
    format: OutputFormat,
    text: impl FnOnce(&T) -> String,
) -> Result<CommandOutput, ApiError> {
    let rendered = match format {
        OutputFormat::Json => serde_json::to_string_pretty(envelope)?,
        OutputFormat::Text => {
            let mut out = format_envelope_status(envelope);
            if let Some(data) = &envelope.data {
                let body = text(data);
                if !body.is_empty() {
                    out.push('\n');
                    out.push_str(&body);
                }
            }
            out
        }
    };
    Ok(CommandOutput {
        rendered,
        success: envelope.is_success(),
    })
}

fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Create { .. } => "create",
        Commands::Get { .. } => "get",
        Commands::Save { .. } => "save",
        Commands::Delete { .. } => "delete",
        Commands::Rename { .. } => "rename",
        Commands::Copy { .. } => "copy",
        Commands::Tree => "tree",
        Commands::Phrase { .. } => "phrase",
        Commands::Check => "check",
    }
}
