//! The `quarry config` command.

use std::path::Path;

use anyhow::Context;
use clap::{Args, Subcommand};
use quarry_core::{Config, RetryPolicy};

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the effective configuration as TOML
    Show {
        /// Print JSON instead of TOML
        #[arg(long)]
        json: bool,
    },

    /// Print the config file location
    Path,

    /// Write a config file populated with defaults
    Init {
        /// Replace an existing config file
        #[arg(long)]
        force: bool,
    },
}

pub async fn execute(args: ConfigArgs) -> anyhow::Result<()> {
    match args.command {
        ConfigCommand::Show { json } => {
            // Reload so a broken file is reported instead of masked by defaults
            let config = Config::load().context("Config file is invalid")?;
            let policy = RetryPolicy::try_from(&config.retry)?;
            tracing::debug!(?policy, "Effective retry policy");
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                print!("{}", config.to_toml()?);
            }
        }

        ConfigCommand::Path => {
            let path = Config::default_path();
            let state = if path.exists() { "" } else { " (not created)" };
            println!("{}{state}", path.display());
        }

        ConfigCommand::Init { force } => {
            let path = Config::default_path();
            write_default(&path, force)?;
            tracing::info!(path = %path.display(), "Config file created");
            println!("Configuration initialized at: {}", path.display());
        }
    }

    Ok(())
}

/// Write the default configuration to `path`, refusing to clobber unless `force`.
fn write_default(path: &Path, force: bool) -> anyhow::Result<()> {
    if path.exists() && !force {
        anyhow::bail!(
            "Config file already exists at: {}\nUse --force to overwrite.",
            path.display()
        );
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Cannot create {}", parent.display()))?;
    }
    std::fs::write(path, Config::default().to_toml()?)
        .with_context(|| format!("Cannot write {}", path.display()))?;
    Ok(())
}
