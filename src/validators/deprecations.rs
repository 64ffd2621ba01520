//! Deprecated API table
//!
//! Entries come from three sources, consulted in order: configured custom
//! patterns, an optional YAML catalog file and the built-in patterns. The
//! first matching entry wins.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::{DeprecatedApiEntry, DeprecatedApisConfig};
use crate::results::Severity;

/// Built-in patterns, matched against `apiVersion/kind`
const EMBEDDED_PATTERNS: &[(&str, Severity, &str)] = &[
    (
        "^v1beta1/.*",
        Severity::Warning,
        "v1beta1 APIs are deprecated and will be removed in future Kubernetes versions",
    ),
    (
        "^v1alpha1/.*",
        Severity::Warning,
        "v1alpha1 APIs are experimental and may be removed without notice",
    ),
    (
        "^extensions/v1beta1/.*",
        Severity::Error,
        "extensions/v1beta1 APIs are deprecated and removed in Kubernetes 1.22+",
    ),
    (
        "^apps/v1beta1/.*",
        Severity::Warning,
        "apps/v1beta1 APIs are deprecated, use apps/v1 instead",
    ),
    (
        "^apps/v1beta2/.*",
        Severity::Warning,
        "apps/v1beta2 APIs are deprecated, use apps/v1 instead",
    ),
];

/// How an entry's pattern is compared
#[derive(Debug, Clone)]
enum Matcher {
    /// Regex over the apiVersion
    ApiVersionRegex(Regex),
    /// Exact apiVersion
    ApiVersionExact(String),
    /// Regex over `apiVersion/kind`
    ApiVersionKindRegex(Regex),
}

/// One deprecation entry
#[derive(Debug, Clone)]
pub struct Deprecation {
    pub pattern: String,
    pub severity: Severity,
    pub info: String,
    pub operator_category: String,
    matcher: Matcher,
}

impl Deprecation {
    fn matches(&self, api_version: &str, kind: &str) -> bool {
        match &self.matcher {
            Matcher::ApiVersionRegex(re) => re.is_match(api_version),
            Matcher::ApiVersionExact(exact) => exact == api_version,
            Matcher::ApiVersionKindRegex(re) => re.is_match(&format!("{}/{}", api_version, kind)),
        }
    }
}

/// Catalog file format used by `--yaml-path`
#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    deprecated_apis: BTreeMap<String, Vec<DeprecatedApiEntry>>,
}

/// Ordered deprecation entries
#[derive(Debug, Clone, Default)]
pub struct DeprecationTable {
    entries: Vec<Deprecation>,
}

impl DeprecationTable {
    /// Build the table from configuration and an optional catalog file
    pub fn load(config: &DeprecatedApisConfig, catalog: Option<&Path>) -> Result<Self> {
        let catalog_entries = match catalog {
            Some(path) => Self::read_catalog(path)?,
            None => Vec::new(),
        };
        Ok(Self::from_entries(config, catalog_entries))
    }

    /// Build the table from configuration plus already-read catalog entries
    pub fn from_entries(config: &DeprecatedApisConfig, catalog: Vec<DeprecatedApiEntry>) -> Self {
        let mut table = Self::default();

        for entry in &config.custom_apis {
            match Regex::new(&entry.api_version) {
                Ok(re) => table.push(entry, Matcher::ApiVersionRegex(re), config),
                Err(e) => warn!(pattern = %entry.api_version, error = %e, "Skipping invalid deprecated API pattern"),
            }
        }

        for entry in &catalog {
            table.push(
                entry,
                Matcher::ApiVersionExact(entry.api_version.clone()),
                config,
            );
        }

        if config.use_embedded {
            for (pattern, severity, info) in EMBEDDED_PATTERNS {
                let entry = DeprecatedApiEntry {
                    api_version: pattern.to_string(),
                    deprecation_info: info.to_string(),
                    severity: severity.to_string(),
                    operator_category: String::new(),
                };
                match Regex::new(pattern) {
                    Ok(re) => table.push(&entry, Matcher::ApiVersionKindRegex(re), config),
                    Err(e) => warn!(pattern, error = %e, "Skipping invalid embedded pattern"),
                }
            }
        }

        debug!(entries = table.entries.len(), "Built deprecated API table");
        table
    }

    fn read_catalog(path: &Path) -> Result<Vec<DeprecatedApiEntry>> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read deprecated API file: {}", path.display()))?;
        let catalog: CatalogFile = serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse deprecated API file: {}", path.display()))?;
        Ok(catalog.deprecated_apis.into_values().flatten().collect())
    }

    fn push(&mut self, entry: &DeprecatedApiEntry, matcher: Matcher, config: &DeprecatedApisConfig) {
        if config.disabled.contains(&entry.api_version) {
            return;
        }
        let severity = config
            .overrides
            .get(&entry.api_version)
            .map(|o| o.severity.as_str())
            .unwrap_or(entry.severity.as_str());

        self.entries.push(Deprecation {
            pattern: entry.api_version.clone(),
            severity: Severity::parse_or_error(severity),
            info: entry.deprecation_info.clone(),
            operator_category: entry.operator_category.clone(),
            matcher,
        });
    }

    /// First entry matching an apiVersion and kind
    pub fn lookup(&self, api_version: &str, kind: &str) -> Option<&Deprecation> {
        self.entries.iter().find(|e| e.matches(api_version, kind))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
