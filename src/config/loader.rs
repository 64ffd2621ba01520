//! Configuration loading
//!
//! Picks the first configuration source that exists, in precedence order:
//! 1. An explicit file passed with `--config`
//! 2. `.gitops-validator.yaml` in the working directory
//! 3. `config.yaml` in the user configuration directory
//! 4. Built-in defaults

use super::{
    defaults, paths,
    schema::{Config, ConfigFile, IgnoreConfig},
};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::debug;

/// Configuration loader
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for the current working directory
    pub fn load(explicit: Option<&Path>) -> Result<Config> {
        let cwd = std::env::current_dir().context("Failed to determine working directory")?;
        Self::load_from(explicit, &cwd, &paths::user_config_path())
    }

    /// Load configuration with explicit lookup locations
    pub fn load_from(explicit: Option<&Path>, cwd: &Path, user_config: &Path) -> Result<Config> {
        let config = if let Some(path) = explicit {
            // An explicitly requested file must exist and parse
            Self::load_file(path)?
        } else {
            let local = paths::local_config_path(cwd);
            if local.exists() {
                Self::load_file(&local)?
            } else if user_config.exists() {
                Self::load_file(user_config)?
            } else {
                debug!("No configuration file found, using defaults");
                return Ok(Self::load_defaults());
            }
        };

        config
            .validate()
            .context("Configuration failed validation")?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn load_file(path: &Path) -> Result<Config> {
        if !path.exists() {
            return Err(anyhow::anyhow!("Config file not found: {}", path.display()));
        }

        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let file: ConfigFile = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        debug!(path = %path.display(), "Loaded configuration file");
        Ok(Self::merge_config(Self::load_defaults(), file.gitops_validator))
    }

    /// Load default configuration
    pub fn load_defaults() -> Config {
        defaults::default_config()
    }

    /// Merge a loaded configuration over `base`
    ///
    /// Serde defaults already fill absent fields; the only field-level merge is
    /// that empty ignore lists inherit the base lists.
    fn merge_config(base: Config, other: Config) -> Config {
        let ignore = IgnoreConfig {
            directories: if other.ignore.directories.is_empty() {
                base.ignore.directories
            } else {
                other.ignore.directories
            },
            files: if other.ignore.files.is_empty() {
                base.ignore.files
            } else {
                other.ignore.files
            },
        };

        Config { ignore, ..other }
    }
}
