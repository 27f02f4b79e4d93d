//! Tooling: command-line interface and text rendering.

pub mod cli;
pub mod format;

pub use cli::{Cli, CliContext, Commands, CommandOutput, OutputFormat};
