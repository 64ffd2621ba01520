//! Default configuration values
//!
//! Provides default configuration instances and helper functions.

use super::schema::{Config, ConfigFile};

/// Name of the per-repository configuration file looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = ".gitops-validator.yaml";

/// Get the default configuration
pub fn default_config() -> Config {
    Config::default()
}

/// Default configuration rendered as a complete config file
pub fn default_config_yaml() -> anyhow::Result<String> {
    Ok(serde_yaml::to_string(&ConfigFile::default())?)
}
