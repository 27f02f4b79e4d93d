//! Workspace config file source: `<workspace>/.honeytree/config.toml`

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File};
use std::path::Path;

/// Workspace-relative location of the config file
pub const WORKSPACE_CONFIG: &str = ".honeytree/config.toml";

pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let path = workspace_root.join(WORKSPACE_CONFIG);
    Ok(builder.add_source(File::from(path).required(false)))
}
