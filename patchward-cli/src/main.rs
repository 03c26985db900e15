//! Patchward CLI entry point
//!
//! Parses arguments, resolves configuration, initializes logging, and dispatches
//! to the subcommand handler. Handler errors are mapped to exit codes by
//! [`CliError::exit_code`](error::CliError::exit_code).

mod cli;
mod commands;
mod error;
mod logging;
mod output;

use std::path::Path;
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use tracing::debug;

use patchward_core::config::{GeneralConfig, PatchwardConfig};

use crate::cli::{Cli, Commands};
use crate::error::CliError;
use crate::output::OutputWriter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {e}", "error:".red().bold());
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}

async fn run(cli: Cli) -> Result<(), CliError> {
    let writer = OutputWriter::new(cli.output);
    let log_level = cli.log_level.as_deref();

    match cli.command {
        // `config` reports config file errors itself, so it loads the file on its own
        Commands::Config(args) => {
            init_logging(&GeneralConfig::default(), log_level)?;
            commands::config::execute(args, &cli.config, &writer).await
        }
        Commands::Digest(args) => {
            prepare(&cli.config, log_level).await?;
            commands::digest::execute(args, &writer).await
        }
        Commands::Malice(args) => {
            let config = prepare(&cli.config, log_level).await?;
            commands::malice::execute(args, &config, &writer).await
        }
        Commands::Diff(args) => {
            let config = prepare(&cli.config, log_level).await?;
            commands::diff::execute(args, &config, &writer).await
        }
    }
}

/// Resolve the effective configuration and initialize logging from its `[general]` section.
async fn prepare(config_path: &Path, log_level: Option<&str>) -> Result<PatchwardConfig, CliError> {
    let config = resolve_config(config_path).await?;
    init_logging(&config.general, log_level)?;
    Ok(config)
}

/// Load the config file if it exists; otherwise use defaults with env overrides applied.
async fn resolve_config(path: &Path) -> Result<PatchwardConfig, CliError> {
    if tokio::fs::try_exists(path).await.unwrap_or(false) {
        return Ok(PatchwardConfig::load(path).await?);
    }
    let mut config = PatchwardConfig::default();
    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}

fn init_logging(general: &GeneralConfig, level_override: Option<&str>) -> Result<(), CliError> {
    logging::init_tracing(general, level_override)
        .map_err(|e| CliError::Config(format!("logging: {e}")))?;
    debug!(format = %general.log_format, "logging initialized");
    Ok(())
}
