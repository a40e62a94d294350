//! CLI command definitions.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Arguments for `serve`.
#[derive(Debug, Args)]
pub struct ServeCommand {
    /// Address to listen on (overrides `server.bind_address`)
    #[arg(short, long, value_name = "ADDR")]
    pub bind: Option<String>,

    /// Path to the SQLite database (overrides `storage.database_path`)
    #[arg(short, long, value_name = "FILE")]
    pub database: Option<PathBuf>,
}

/// Arguments for `init-db`.
#[derive(Debug, Args)]
pub struct InitDbCommand {
    /// Path to the SQLite database (overrides `storage.database_path`)
    #[arg(short, long, value_name = "FILE")]
    pub database: Option<PathBuf>,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}
