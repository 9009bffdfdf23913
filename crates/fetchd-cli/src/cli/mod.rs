//! CLI for fetchd.

mod commands;
mod signals;

use anyhow::Result;
use clap::{Parser, Subcommand};
use fetchd_core::config;
use std::path::PathBuf;

use commands::{run_check, run_sessions};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "fetchd")]
#[command(about = "fetchd: periodically fetch batches of URLs with bounded concurrency", long_about = None)]
pub struct Cli {
    /// Config file (TOML, or YAML by extension). Defaults to ./fetch-config.toml,
    /// then ~/.config/fetchd/config.toml.
    #[arg(short = 'c', long = "config", global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run all sessions until they finish or a stop signal arrives.
    Run {
        /// Pretty-print each batch instead of one JSON object per line.
        #[arg(long)]
        pretty: bool,
    },

    /// Validate the config and show what each session would fetch.
    Check,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let path = config::resolve_path(cli.config.as_deref())?;
        let cfg = config::load_from_path(&path)?;
        tracing::debug!("loaded config from {}: {:?}", path.display(), cfg);

        match cli.command {
            CliCommand::Run { pretty } => run_sessions(cfg, pretty).await?,
            CliCommand::Check => run_check(&cfg)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
