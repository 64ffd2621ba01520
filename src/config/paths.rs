//! Cross-platform directory path resolution
//!
//! Provides functions to resolve platform-appropriate paths for configuration.
//! - Linux/macOS: XDG Base Directory specification (~/.config)
//! - Windows: Known Folder API (AppData\Roaming)

use std::path::{Path, PathBuf};

use super::defaults::LOCAL_CONFIG_FILE;

const APP_NAME: &str = "gitops-validator";

/// Get the configuration directory path
///
/// Checks GITOPS_VALIDATOR_CONFIG_DIR environment variable first, then falls back to:
/// - Unix (Linux/macOS): XDG_CONFIG_HOME/gitops-validator or ~/.config/gitops-validator
/// - Windows: %APPDATA%\gitops-validator\config
pub fn config_dir() -> PathBuf {
    std::env::var("GITOPS_VALIDATOR_CONFIG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            #[cfg(windows)]
            {
                use directories::ProjectDirs;
                ProjectDirs::from("", "", APP_NAME)
                    .map(|dirs| dirs.config_dir().to_path_buf())
                    .unwrap_or_else(|| PathBuf::from(".").join(".config").join(APP_NAME))
            }
            #[cfg(not(windows))]
            {
                use directories::BaseDirs;
                std::env::var("XDG_CONFIG_HOME")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| {
                        BaseDirs::new()
                            .map(|dirs| dirs.home_dir().join(".config"))
                            .unwrap_or_else(|| PathBuf::from(".").join(".config"))
                    })
                    .join(APP_NAME)
            }
        })
}

/// Get the user configuration file path
pub fn user_config_path() -> PathBuf {
    config_dir().join("config.yaml")
}

/// Per-repository configuration file inside `dir`
pub fn local_config_path(dir: &Path) -> PathBuf {
    dir.join(LOCAL_CONFIG_FILE)
}
