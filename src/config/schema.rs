//! Configuration schema definitions
//!
//! Defines the structure of configuration files using serde for serialization.
//! Files nest everything below a single `gitops-validator` root key.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// On-disk layout: the whole configuration lives under one root key
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConfigFile {
    #[serde(rename = "gitops-validator", default)]
    pub gitops_validator: Config,
}

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    /// Repository path used when none is given on the command line
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default = "default_false")]
    pub verbose: bool,

    #[serde(default)]
    pub entry_points: EntryPointsConfig,

    #[serde(default)]
    pub rules: RulesConfig,

    #[serde(default)]
    pub deprecated_apis: DeprecatedApisConfig,

    #[serde(default)]
    pub chart: ChartConfig,

    #[serde(default)]
    pub ignore: IgnoreConfig,

    #[serde(default)]
    pub exit_codes: ExitCodesConfig,
}

/// Selectors for reachability roots
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct EntryPointsConfig {
    /// Explicit resource keys (`namespace/name` or `name`)
    #[serde(default)]
    pub resources: Vec<String>,

    #[serde(default = "default_entry_namespaces")]
    pub namespaces: Vec<String>,

    /// Resource type names, e.g. `flux-kustomization`
    #[serde(default = "default_entry_types")]
    pub types: Vec<String>,

    /// Globs over repository-relative file paths
    #[serde(default = "default_entry_patterns")]
    pub patterns: Vec<String>,
}

/// Enable flag and severity for one rule
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct RuleConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default = "default_error_severity")]
    pub severity: String,
}

/// Per-rule settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct RulesConfig {
    #[serde(default = "default_error_rule")]
    pub flux_kustomization: RuleConfig,

    #[serde(default = "default_error_rule")]
    pub flux_postbuild_variables: RuleConfig,

    #[serde(default = "default_error_rule")]
    pub kubernetes_kustomization: RuleConfig,

    #[serde(default = "default_error_rule")]
    pub kustomization_version_consistency: RuleConfig,

    #[serde(default = "default_warning_rule")]
    pub orphaned_resources: RuleConfig,

    #[serde(default = "default_warning_rule")]
    pub deprecated_apis: RuleConfig,

    #[serde(default = "default_warning_rule")]
    pub double_references: RuleConfig,

    #[serde(default = "default_error_rule")]
    pub broken_references: RuleConfig,

    /// Accepted for compatibility; no check reports cycles
    #[serde(default = "default_error_rule")]
    pub circular_dependencies: RuleConfig,
}

/// One deprecated API entry, shared by `custom-apis` and the `--yaml-path` file
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct DeprecatedApiEntry {
    pub api_version: String,

    #[serde(default)]
    pub deprecation_info: String,

    #[serde(default = "default_warning_severity")]
    pub severity: String,

    #[serde(default)]
    pub operator_category: String,
}

/// Severity override for a deprecation pattern
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DeprecationOverride {
    pub severity: String,
}

/// Deprecated API table configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct DeprecatedApisConfig {
    /// Include the built-in pattern table
    #[serde(default = "default_true")]
    pub use_embedded: bool,

    #[serde(default)]
    pub custom_apis: Vec<DeprecatedApiEntry>,

    /// Pattern -> replacement severity
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub overrides: BTreeMap<String, DeprecationOverride>,

    /// Patterns to ignore entirely
    #[serde(default)]
    pub disabled: Vec<String>,
}

/// Dependency chart output
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ChartConfig {
    #[serde(default = "default_false")]
    pub enabled: bool,

    #[serde(default = "default_chart_format")]
    pub format: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    #[serde(default = "default_true")]
    pub include_orphaned: bool,

    #[serde(default = "default_false")]
    pub include_metadata: bool,
}

/// Paths excluded from loading and from orphan reporting
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct IgnoreConfig {
    #[serde(default = "default_ignore_directories")]
    pub directories: Vec<String>,

    #[serde(default = "default_ignore_files")]
    pub files: Vec<String>,
}

/// Which severities make the process exit non-zero
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "kebab-case")]
pub struct ExitCodesConfig {
    #[serde(default = "default_true")]
    pub fail_on_errors: bool,

    #[serde(default = "default_false")]
    pub fail_on_warnings: bool,

    #[serde(default = "default_false")]
    pub fail_on_info: bool,
}

// Default value functions
fn default_true() -> bool {
    true
}

fn default_false() -> bool {
    false
}

fn default_error_severity() -> String {
    "error".to_string()
}

fn default_warning_severity() -> String {
    "warning".to_string()
}

fn default_error_rule() -> RuleConfig {
    RuleConfig {
        enabled: true,
        severity: default_error_severity(),
    }
}

fn default_warning_rule() -> RuleConfig {
    RuleConfig {
        enabled: true,
        severity: default_warning_severity(),
    }
}

fn default_entry_namespaces() -> Vec<String> {
    vec!["flux-system".to_string()]
}

fn default_entry_types() -> Vec<String> {
    ["flux-kustomization", "helm-release", "git-repository"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_entry_patterns() -> Vec<String> {
    ["clusters/*", "apps/*", "infrastructure/*"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

fn default_chart_format() -> String {
    "mermaid".to_string()
}

pub(crate) fn default_ignore_directories() -> Vec<String> {
    [
        ".git/**",
        ".github/**",
        ".gitlab-ci/**",
        ".circleci/**",
        ".azure-pipelines/**",
        "node_modules/**",
        "vendor/**",
        "tmp/**",
        "temp/**",
        "build/**",
        "dist/**",
        "bin/**",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

pub(crate) fn default_ignore_files() -> Vec<String> {
    ["*.log", "*.tmp", "*.temp", ".DS_Store", "Thumbs.db"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            path: None,
            verbose: default_false(),
            entry_points: EntryPointsConfig::default(),
            rules: RulesConfig::default(),
            deprecated_apis: DeprecatedApisConfig::default(),
            chart: ChartConfig::default(),
            ignore: IgnoreConfig::default(),
            exit_codes: ExitCodesConfig::default(),
        }
    }
}

impl Default for EntryPointsConfig {
    fn default() -> Self {
        Self {
            resources: Vec::new(),
            namespaces: default_entry_namespaces(),
            types: default_entry_types(),
            patterns: default_entry_patterns(),
        }
    }
}

impl Default for RuleConfig {
    fn default() -> Self {
        default_error_rule()
    }
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            flux_kustomization: default_error_rule(),
            flux_postbuild_variables: default_error_rule(),
            kubernetes_kustomization: default_error_rule(),
            kustomization_version_consistency: default_error_rule(),
            orphaned_resources: default_warning_rule(),
            deprecated_apis: default_warning_rule(),
            double_references: default_warning_rule(),
            broken_references: default_error_rule(),
            circular_dependencies: default_error_rule(),
        }
    }
}

impl RulesConfig {
    /// Look up a rule by its kebab-case key
    pub fn get(&self, key: &str) -> Option<&RuleConfig> {
        match key {
            "flux-kustomization" => Some(&self.flux_kustomization),
            "flux-postbuild-variables" => Some(&self.flux_postbuild_variables),
            "kubernetes-kustomization" => Some(&self.kubernetes_kustomization),
            "kustomization-version-consistency" => Some(&self.kustomization_version_consistency),
            "orphaned-resources" => Some(&self.orphaned_resources),
            "deprecated-apis" => Some(&self.deprecated_apis),
            "double-references" => Some(&self.double_references),
            "broken-references" => Some(&self.broken_references),
            "circular-dependencies" => Some(&self.circular_dependencies),
            _ => None,
        }
    }

    /// All rules with their keys, in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &RuleConfig)> {
        [
            ("flux-kustomization", &self.flux_kustomization),
            ("flux-postbuild-variables", &self.flux_postbuild_variables),
            ("kubernetes-kustomization", &self.kubernetes_kustomization),
            (
                "kustomization-version-consistency",
                &self.kustomization_version_consistency,
            ),
            ("orphaned-resources", &self.orphaned_resources),
            ("deprecated-apis", &self.deprecated_apis),
            ("double-references", &self.double_references),
            ("broken-references", &self.broken_references),
            ("circular-dependencies", &self.circular_dependencies),
        ]
        .into_iter()
    }
}

impl Default for DeprecatedApisConfig {
    fn default() -> Self {
        Self {
            use_embedded: default_true(),
            custom_apis: Vec::new(),
            overrides: BTreeMap::new(),
            disabled: Vec::new(),
        }
    }
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            enabled: default_false(),
            format: default_chart_format(),
            output: None,
            include_orphaned: default_true(),
            include_metadata: default_false(),
        }
    }
}

impl Default for IgnoreConfig {
    fn default() -> Self {
        Self {
            directories: default_ignore_directories(),
            files: default_ignore_files(),
        }
    }
}

impl Default for ExitCodesConfig {
    fn default() -> Self {
        Self {
            fail_on_errors: default_true(),
            fail_on_warnings: default_false(),
            fail_on_info: default_false(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.entry_points.namespaces, vec!["flux-system"]);
        assert!(config.rules.flux_kustomization.enabled);
        assert_eq!(config.rules.orphaned_resources.severity, "warning");
        assert_eq!(config.rules.broken_references.severity, "error");
        assert!(config.exit_codes.fail_on_errors);
        assert!(!config.exit_codes.fail_on_warnings);
    }

    #[test]
    fn test_config_serialization() {
        let file = ConfigFile::default();
        let yaml = serde_yaml::to_string(&file).unwrap();
        assert!(yaml.contains("gitops-validator"));
        assert!(yaml.contains("entry-points"));
        assert!(yaml.contains("fail-on-errors"));
    }

    #[test]
    fn test_config_deserialization() {
        let yaml = r#"
gitops-validator:
  entry-points:
    resources: [flux-system/apps]
  rules:
    orphaned-resources:
      enabled: false
  deprecated-apis:
    custom-apis:
      - api_version: "^policy/v1beta1$"
        deprecation_info: "use policy/v1"
        severity: error
        operator_category: core
"#;
        let file: ConfigFile = serde_yaml::from_str(yaml).unwrap();
        let config = file.gitops_validator;
        assert_eq!(config.entry_points.resources, vec!["flux-system/apps"]);
        // Unset selectors keep their defaults
        assert_eq!(config.entry_points.namespaces, vec!["flux-system"]);
        assert!(!config.rules.orphaned_resources.enabled);
        assert_eq!(config.rules.orphaned_resources.severity, "error");
        assert_eq!(config.deprecated_apis.custom_apis.len(), 1);
        assert_eq!(config.deprecated_apis.custom_apis[0].severity, "error");
    }

    #[test]
    fn test_rule_lookup() {
        let rules = RulesConfig::default();
        assert!(rules.get("double-references").is_some());
        assert!(rules.get("no-such-rule").is_none());
        assert_eq!(rules.iter().count(), 9);
    }
}
