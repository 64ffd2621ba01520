//! Configuration system for gitops-validator
//!
//! Configuration is an explicit value threaded through graph building,
//! analysis and checks. [`ConfigLoader`] layers a file over the built-in
//! defaults; nothing reads a global configuration.

pub mod defaults;
pub mod ignore;
pub mod loader;
pub mod paths;
pub mod schema;

pub use ignore::IgnoreMatcher;
pub use loader::ConfigLoader;
pub use schema::{
    ChartConfig, Config, ConfigFile, DeprecatedApiEntry, DeprecatedApisConfig,
    DeprecationOverride, EntryPointsConfig, ExitCodesConfig, IgnoreConfig, RuleConfig,
    RulesConfig,
};

use globset::Glob;

/// Severity names accepted in configuration
pub const SEVERITIES: &[&str] = &["error", "warning", "info"];

/// Configuration validation errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid glob pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("invalid regular expression '{pattern}': {source}")]
    InvalidRegex {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("{context}: empty pattern")]
    EmptyPattern { context: String },

    #[error("{context}: invalid severity '{value}' (expected error, warning or info)")]
    InvalidSeverity { context: String, value: String },
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

impl Config {
    /// Whether a repository-relative path is excluded by the ignore lists
    pub fn should_ignore_path(&self, rel: &str) -> bool {
        IgnoreMatcher::lenient(&self.ignore).is_ignored(rel)
    }

    /// Whether a repository-relative directory is excluded
    pub fn should_ignore_dir(&self, rel: &str) -> bool {
        IgnoreMatcher::lenient(&self.ignore).is_ignored_dir(rel)
    }

    /// Whether `rule` is enabled; unknown rules count as enabled
    pub fn rule_enabled(&self, rule: &str) -> bool {
        self.rules.get(rule).is_none_or(|r| r.enabled)
    }

    /// Configured severity name for `rule`
    pub fn rule_severity(&self, rule: &str) -> &str {
        self.rules
            .get(rule)
            .map(|r| r.severity.as_str())
            .unwrap_or("error")
    }

    /// Check patterns and severities
    pub fn validate(&self) -> ConfigResult<()> {
        for pattern in &self.entry_points.patterns {
            Glob::new(pattern).map_err(|source| ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            })?;
        }

        IgnoreMatcher::new(&self.ignore)?;

        for (index, entry) in self.deprecated_apis.custom_apis.iter().enumerate() {
            let context = format!("deprecated-apis.custom-apis[{}]", index);
            if entry.api_version.trim().is_empty() {
                return Err(ConfigError::EmptyPattern { context });
            }
            regex::Regex::new(&entry.api_version).map_err(|source| {
                ConfigError::InvalidRegex {
                    pattern: entry.api_version.clone(),
                    source,
                }
            })?;
            check_severity(&context, &entry.severity)?;
        }

        for (pattern, override_) in &self.deprecated_apis.overrides {
            check_severity(
                &format!("deprecated-apis.overrides['{}']", pattern),
                &override_.severity,
            )?;
        }

        for (key, rule) in self.rules.iter() {
            if rule.enabled {
                check_severity(&format!("rules.{}", key), &rule.severity)?;
            }
        }

        Ok(())
    }
}

fn check_severity(context: &str, value: &str) -> ConfigResult<()> {
    if SEVERITIES.contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::InvalidSeverity {
            context: context.to_string(),
            value: value.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_severity() {
        let mut config = Config::default();
        config.rules.broken_references.severity = "fatal".to_string();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSeverity { .. }));
        assert!(err.to_string().contains("rules.broken-references"));

        // Disabled rules are not checked
        config.rules.broken_references.enabled = false;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_custom_api() {
        let mut config = Config::default();
        config.deprecated_apis.custom_apis.push(DeprecatedApiEntry {
            api_version: "(unclosed".to_string(),
            severity: "warning".to_string(),
            ..Default::default()
        });
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRegex { .. })
        ));

        config.deprecated_apis.custom_apis[0].api_version = "  ".to_string();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::EmptyPattern { .. })
        ));
    }

    #[test]
    fn test_rejects_bad_entry_pattern() {
        let mut config = Config::default();
        config.entry_points.patterns.push("apps/[".to_string());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_rule_lookup_helpers() {
        let mut config = Config::default();
        config.rules.double_references.enabled = false;
        assert!(!config.rule_enabled("double-references"));
        assert!(config.rule_enabled("broken-references"));
        assert_eq!(config.rule_severity("orphaned-resources"), "warning");
    }
}
