//! CLI for imgsync.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use imgsync_core::config::{self, ImgsyncConfig};
use std::path::{Path, PathBuf};

use commands::{run_config_path, run_extract, run_pipeline, run_restore};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "imgsync")]
#[command(
    about = "imgsync: download the images an HTML page references and rewrite it to use local copies",
    long_about = None
)]
pub struct Cli {
    /// Config file to use instead of ~/.config/imgsync/config.toml.
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Download the page's images and rewrite the page to reference them.
    Run {
        /// HTML document to process (rewritten in place, original kept as <DOCUMENT>.backup).
        document: PathBuf,
        /// Where images are saved (default: downloaded_images/ next to the document).
        #[arg(long, value_name = "DIR")]
        download_dir: Option<PathBuf>,
    },

    /// List the image URLs that `run` would download.
    Extract {
        /// HTML document to scan.
        document: PathBuf,
    },

    /// Put the backup of a rewritten document back in place.
    Restore {
        /// Document that was rewritten.
        document: PathBuf,
        /// Backup to restore (default: <DOCUMENT>.backup).
        #[arg(long, value_name = "FILE")]
        backup: Option<PathBuf>,
    },

    /// Print the config file location.
    ConfigPath,
}

fn load_config(path: Option<&Path>) -> Result<ImgsyncConfig> {
    let cfg = match path {
        Some(p) => config::load_from_path(p)?,
        None => config::load_or_init()?,
    };
    tracing::debug!("loaded config: {:?}", cfg);
    Ok(cfg)
}

impl CliCommand {
    pub fn run_from_args() -> Result<()> {
        let cli = Cli::parse();
        let config_file = cli.config.as_deref();

        match cli.command {
            CliCommand::Run {
                document,
                download_dir,
            } => {
                let cfg = load_config(config_file)?;
                run_pipeline(&cfg, &document, download_dir.as_deref())?;
            }
            CliCommand::Extract { document } => {
                let cfg = load_config(config_file)?;
                run_extract(&cfg, &document)?;
            }
            CliCommand::Restore { document, backup } => {
                run_restore(&document, backup.as_deref())?;
            }
            CliCommand::ConfigPath => run_config_path(config_file)?,
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests;
