//! Configuration loading tests
//!
//! Source precedence, validation failures and ignore handling, using
//! temporary directories in place of the working and user config locations.

use std::path::{Path, PathBuf};

use gitops_validator::config::defaults::default_config_yaml;
use gitops_validator::config::paths::local_config_path;
use gitops_validator::{Config, ConfigLoader, Validator, ValidatorOptions};
use tempfile::TempDir;

fn write(path: &Path, contents: &str) -> PathBuf {
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(path, contents).unwrap();
    path.to_path_buf()
}

fn verbose_with_path(path: &str) -> String {
    format!("gitops-validator:\n  verbose: true\n  path: {}\n", path)
}

#[test]
fn test_defaults_when_nothing_exists() {
    let dir = TempDir::new().unwrap();
    let config =
        ConfigLoader::load_from(None, dir.path(), &dir.path().join("user/config.yaml")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_user_config_used_without_local_file() {
    let dir = TempDir::new().unwrap();
    let user = write(&dir.path().join("user/config.yaml"), &verbose_with_path("from-user"));

    let config = ConfigLoader::load_from(None, &dir.path().join("work"), &user).unwrap();
    assert_eq!(config.path.as_deref(), Some("from-user"));
    assert!(config.verbose);
}

#[test]
fn test_local_file_beats_user_config() {
    let dir = TempDir::new().unwrap();
    let cwd = dir.path().join("work");
    write(&local_config_path(&cwd), &verbose_with_path("from-local"));
    let user = write(&dir.path().join("user/config.yaml"), &verbose_with_path("from-user"));

    let config = ConfigLoader::load_from(None, &cwd, &user).unwrap();
    assert_eq!(config.path.as_deref(), Some("from-local"));
}

#[test]
fn test_explicit_file_beats_everything() {
    let dir = TempDir::new().unwrap();
    let cwd = dir.path().join("work");
    write(&local_config_path(&cwd), &verbose_with_path("from-local"));
    let explicit = write(&dir.path().join("explicit.yaml"), &verbose_with_path("from-flag"));

    let config =
        ConfigLoader::load_from(Some(&explicit), &cwd, &dir.path().join("missing.yaml")).unwrap();
    assert_eq!(config.path.as_deref(), Some("from-flag"));
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let dir = TempDir::new().unwrap();
    let err = ConfigLoader::load_from(
        Some(&dir.path().join("nope.yaml")),
        dir.path(),
        &dir.path().join("user.yaml"),
    )
    .unwrap_err();
    assert!(err.to_string().contains("Config file not found"));
}

#[test]
fn test_invalid_values_fail_validation() {
    let dir = TempDir::new().unwrap();
    let explicit = write(
        &dir.path().join("bad.yaml"),
        "gitops-validator:\n  rules:\n    broken-references:\n      severity: fatal\n",
    );

    let err = ConfigLoader::load_from(Some(&explicit), dir.path(), &dir.path().join("user.yaml"))
        .unwrap_err();
    let message = format!("{:#}", err);
    assert!(message.contains("Configuration failed validation"), "{message}");
    assert!(message.contains("rules.broken-references"), "{message}");
}

#[test]
fn test_malformed_yaml_is_an_error() {
    let dir = TempDir::new().unwrap();
    let explicit = write(&dir.path().join("bad.yaml"), "gitops-validator: [unclosed\n");

    let err = ConfigLoader::load_from(Some(&explicit), dir.path(), &dir.path().join("user.yaml"))
        .unwrap_err();
    assert!(err.to_string().contains("Failed to parse config file"));
}

#[test]
fn test_partial_file_keeps_defaults() {
    let dir = TempDir::new().unwrap();
    let explicit = write(
        &dir.path().join("partial.yaml"),
        "gitops-validator:\n  ignore:\n    directories: []\n    files: ['*.bak']\n  exit-codes:\n    fail-on-warnings: true\n",
    );

    let config =
        ConfigLoader::load_from(Some(&explicit), dir.path(), &dir.path().join("user.yaml")).unwrap();
    let defaults = Config::default();

    // Empty ignore lists inherit the defaults, non-empty ones replace them
    assert_eq!(config.ignore.directories, defaults.ignore.directories);
    assert_eq!(config.ignore.files, vec!["*.bak"]);
    assert!(config.exit_codes.fail_on_warnings);
    assert!(config.exit_codes.fail_on_errors);
    assert_eq!(config.entry_points, defaults.entry_points);
}

#[test]
fn test_default_yaml_loads_back() {
    let dir = TempDir::new().unwrap();
    let explicit = write(&dir.path().join("defaults.yaml"), &default_config_yaml().unwrap());

    let config =
        ConfigLoader::load_from(Some(&explicit), dir.path(), &dir.path().join("user.yaml")).unwrap();
    assert_eq!(config, Config::default());
}

#[test]
fn test_default_ignores() {
    let config = Config::default();
    assert!(config.should_ignore_path(".github/workflows/ci.yaml"));
    assert!(config.should_ignore_path("apps/debug.log"));
    assert!(config.should_ignore_dir("node_modules"));
    assert!(!config.should_ignore_path("apps/web.yaml"));
    assert!(!config.should_ignore_path("binaries/web.yaml"));
}

#[tokio::test]
async fn test_ignored_directories_are_not_loaded() {
    let dir = TempDir::new().unwrap();
    write(
        &dir.path().join(".github/workflows/ci.yaml"),
        "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: ci\n",
    );
    write(
        &dir.path().join("apps/web.yaml"),
        "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: web\n",
    );

    let validator = Validator::new(Config::default(), ValidatorOptions::default());
    let ctx = validator.prepare(dir.path()).unwrap();
    assert_eq!(ctx.graph.resource_count(), 1);
    assert!(ctx.graph.get("web").is_some());
}
