//! Honeytree CLI Binary
//!
//! Command-line interface for the honeytree hierarchy manager.

use anyhow::Context;
use clap::Parser;
use honeytree::logging::{init_logging, resolve_log_file_path};
use honeytree::tooling::cli::{Cli, CliContext};
use std::process;

fn run(cli: &Cli) -> anyhow::Result<bool> {
    let mut config = CliContext::load_config(&cli.workspace, cli.config.as_deref())
        .context("Error loading configuration")?;
    cli.apply_overrides(&mut config);

    if config.logging.output.contains("file") {
        let log_file = resolve_log_file_path(
            cli.log_file.clone(),
            config.logging.file.clone(),
            Some(&cli.workspace),
        )?;
        config.logging.file = Some(log_file);
    }
    init_logging(Some(&config.logging)).context("Error initializing logging")?;

    let context = CliContext::from_config(cli.workspace.clone(), &config)
        .context("Error initializing workspace")?;
    let output = context.execute(&cli.command, cli.format)?;
    println!("{}", output.rendered.trim_end());
    Ok(output.success)
}

fn main() {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            process::exit(2);
        }
    }
}
