//! `auta` - Web server and maintenance CLI for the car registry.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use auta::cli::{Cli, Command, ConfigCommand};
use auta::{init_logging, Config, Database};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    match cli.command {
        Command::Serve(cmd) => {
            let mut config = load_config(cli.config)?;
            if let Some(bind) = cmd.bind {
                config.server.bind_address = bind;
            }
            if let Some(database) = cmd.database {
                config.storage.database_path = database;
            }
            config.validate()?;
            auta::serve(&config).await?;
        }
        Command::InitDb(cmd) => {
            let mut config = load_config(cli.config)?;
            if let Some(database) = cmd.database {
                config.storage.database_path = database;
            }
            handle_init_db(&config)?;
        }
        Command::Config(ConfigCommand::Show { json }) => {
            handle_show(&load_config(cli.config)?, json)?;
        }
        Command::Config(ConfigCommand::Path) => {
            println!("{}", Config::default_config_path().display());
        }
        // `--file` takes precedence over the global `--config`
        Command::Config(ConfigCommand::Validate { file }) => handle_validate(file.or(cli.config))?,
    }

    Ok(())
}

fn load_config(path: Option<PathBuf>) -> anyhow::Result<Config> {
    Config::load_from(path).context("failed to load configuration")
}

fn handle_init_db(config: &Config) -> anyhow::Result<()> {
    let database = Database::new(config.database_path());
    let created = database
        .initialize()
        .with_context(|| format!("failed to initialize {}", database.path().display()))?;

    if created {
        println!("Database created: {}", database.path().display());
    } else {
        println!("Database already exists: {}", database.path().display());
    }
    Ok(())
}

fn handle_show(config: &Config, json: bool) -> anyhow::Result<()> {
    let mut shown = config.clone();
    shown.session.secret_key = "********".to_string();

    if json {
        println!("{}", serde_json::to_string_pretty(&shown)?);
    } else {
        println!("Current Configuration");
        println!("=====================");
        println!();
        println!("[Server]");
        println!("  Bind address:       {}", shown.server.bind_address);
        println!();
        println!("[Storage]");
        println!("  Database path:      {}", shown.database_path().display());
        println!();
        println!("[Session]");
        println!("  Cookie name:        {}", shown.session.cookie_name);
        println!(
            "  Secret key:         {}",
            if config.uses_default_secret() {
                "built-in default"
            } else {
                "custom"
            }
        );
        println!();
        println!("[Validation]");
        println!("  Strict:             {}", shown.validation.strict);
    }
    Ok(())
}

fn handle_validate(file: Option<PathBuf>) -> anyhow::Result<()> {
    let path = file.unwrap_or_else(Config::default_config_path);
    println!("Validating configuration: {}", path.display());

    match Config::load_from(Some(path)) {
        Ok(_) => {
            println!("Configuration is valid.");
            Ok(())
        }
        Err(err) => {
            println!("Configuration is invalid: {err}");
            Err(err.into())
        }
    }
}
