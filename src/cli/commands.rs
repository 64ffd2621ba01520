//! CLI command handlers

use std::path::Path;

use anyhow::{Context, Result};
use clap::Subcommand;

use crate::config::{ConfigFile, ConfigLoader, defaults, paths};

/// Configuration management subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum ConfigSubcommand {
    /// Print the effective configuration
    Show,
    /// Print the built-in default configuration
    Defaults,
    /// Show configuration file locations
    Path,
    /// Validate configuration
    Validate,
}

/// Handle configuration subcommands
pub fn handle_config_command(cmd: &ConfigSubcommand, explicit: Option<&Path>) -> Result<()> {
    match cmd {
        ConfigSubcommand::Show => {
            let config = ConfigLoader::load(explicit).context("Failed to load configuration")?;
            let file = ConfigFile {
                gitops_validator: config,
            };
            let yaml = serde_yaml::to_string(&file).context("Failed to serialize configuration")?;
            print!("{}", yaml);
        }
        ConfigSubcommand::Defaults => {
            print!("{}", defaults::default_config_yaml()?);
        }
        ConfigSubcommand::Path => {
            let cwd = std::env::current_dir().context("Failed to determine working directory")?;
            for (label, path) in [
                ("local", paths::local_config_path(&cwd)),
                ("user ", paths::user_config_path()),
            ] {
                let marker = if path.exists() { " (exists)" } else { "" };
                println!("{}: {}{}", label, path.display(), marker);
            }
        }
        ConfigSubcommand::Validate => {
            ConfigLoader::load(explicit).context("Configuration validation failed")?;
            println!("Configuration is valid");
        }
    }

    Ok(())
}
