//! Built-in defaults every config build starts from.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError};

/// Builder seeded with the lowest-precedence defaults.
pub fn builder_with_defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("mode", "test")?
        .set_default("storage.backend", "sled")?
        .set_default("logging.level", "info")
}
