//! Ignore-pattern matching over repository-relative paths

use globset::{Glob, GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::warn;

use super::{ConfigError, schema::IgnoreConfig};

/// Compiled ignore patterns
///
/// Paths are repository-relative with forward slashes.
#[derive(Debug, Clone)]
pub struct IgnoreMatcher {
    directories: GlobSet,
    /// `dir` for every `dir/**` pattern, so the directory itself is pruned too
    directory_prefixes: Vec<String>,
    files: GlobSet,
}

impl IgnoreMatcher {
    /// Compile, failing on the first invalid pattern
    pub fn new(config: &IgnoreConfig) -> Result<Self, ConfigError> {
        Self::build(config, true)
    }

    /// Compile, skipping invalid patterns with a warning
    pub fn lenient(config: &IgnoreConfig) -> Self {
        match Self::build(config, false) {
            Ok(matcher) => matcher,
            // build(.., false) never fails
            Err(_) => Self::empty(),
        }
    }

    fn empty() -> Self {
        Self {
            directories: GlobSet::empty(),
            directory_prefixes: Vec::new(),
            files: GlobSet::empty(),
        }
    }

    fn build(config: &IgnoreConfig, strict: bool) -> Result<Self, ConfigError> {
        let mut directories = GlobSetBuilder::new();
        let mut directory_prefixes = Vec::new();
        for pattern in &config.directories {
            if let Some(prefix) = pattern.strip_suffix("/**") {
                directory_prefixes.push(prefix.to_string());
            }
            if let Some(glob) = compile(pattern, strict)? {
                directories.add(glob);
            }
        }

        let mut files = GlobSetBuilder::new();
        for pattern in &config.files {
            if let Some(glob) = compile(pattern, strict)? {
                files.add(glob);
            }
        }

        Ok(Self {
            directories: directories.build().map_err(invalid_set)?,
            directory_prefixes,
            files: files.build().map_err(invalid_set)?,
        })
    }

    /// Whether a directory should be skipped entirely
    pub fn is_ignored_dir(&self, rel: &str) -> bool {
        if rel.is_empty() {
            return false;
        }
        self.matches_prefix(rel) || self.directories.is_match(rel)
    }

    /// Whether a file path should be skipped
    pub fn is_ignored(&self, rel: &str) -> bool {
        if rel.is_empty() {
            return false;
        }
        if self.matches_prefix(rel) || self.directories.is_match(rel) {
            return true;
        }
        let file_name = rel.rsplit('/').next().unwrap_or(rel);
        self.files.is_match(rel) || self.files.is_match(file_name)
    }

    fn matches_prefix(&self, rel: &str) -> bool {
        self.directory_prefixes.iter().any(|prefix| {
            rel == prefix
                || rel
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|rest| rest.starts_with('/'))
        })
    }
}

fn compile(pattern: &str, strict: bool) -> Result<Option<Glob>, ConfigError> {
    match GlobBuilder::new(pattern).literal_separator(true).build() {
        Ok(glob) => Ok(Some(glob)),
        Err(source) if strict => Err(ConfigError::InvalidPattern {
            pattern: pattern.to_string(),
            source,
        }),
        Err(e) => {
            warn!(pattern, error = %e, "Skipping invalid ignore pattern");
            Ok(None)
        }
    }
}

fn invalid_set(source: globset::Error) -> ConfigError {
    ConfigError::InvalidPattern {
        pattern: "<set>".to_string(),
        source,
    }
}
