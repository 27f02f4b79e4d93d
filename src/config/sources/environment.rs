//! Environment variable source: HONEYTREE_* prefix with __ separator

use config::builder::DefaultState;
use config::ConfigBuilder;
use config::ConfigError;
use config::Environment;

/// Prefix for configuration overrides, e.g. `HONEYTREE__MODE=phrase`.
pub const ENV_PREFIX: &str = "HONEYTREE";

/// Add environment variable overlay to builder.
/// Uses HONEYTREE_ prefix and __ as separator for nested keys.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true),
    );
    Ok(builder)
}
