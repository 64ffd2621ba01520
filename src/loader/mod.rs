//! Document loader
//!
//! Walks a repository, splits every YAML file into documents and decodes the
//! documents that look like manifests into [`Resource`]s. A file that cannot
//! be read or decoded is skipped with a [`LoadWarning`]; one malformed file
//! never aborts loading.

use std::path::{Path, PathBuf};

use serde_yaml::Value;
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::config::{Config, IgnoreMatcher};
use crate::graph::resolve::relative_to;
use crate::models::{Content, Resource, is_kustomization_file};

/// Errors that abort loading
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("repository path does not exist: {0}")]
    MissingRoot(PathBuf),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}

pub type LoadResult<T> = std::result::Result<T, LoadError>;

/// A file skipped during loading
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadWarning {
    pub file: PathBuf,
    pub message: String,
}

/// Everything decoded from one repository walk
#[derive(Debug, Default)]
pub struct LoadedRepository {
    pub resources: Vec<Resource>,
    pub warnings: Vec<LoadWarning>,
    pub files_scanned: usize,
}

/// Load every manifest under `root`
pub fn load_repository(root: &Path, config: &Config) -> LoadResult<LoadedRepository> {
    if !root.is_dir() {
        return Err(LoadError::MissingRoot(root.to_path_buf()));
    }

    let ignore = IgnoreMatcher::lenient(&config.ignore);
    let mut loaded = LoadedRepository::default();

    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| {
            entry.depth() == 0
                || !entry.file_type().is_dir()
                || !ignore.is_ignored_dir(&relative_to(root, entry.path()))
        });

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                let file = e.path().map(Path::to_path_buf).unwrap_or_default();
                warn!(file = %file.display(), error = %e, "Skipping unreadable path");
                loaded.warnings.push(LoadWarning {
                    file,
                    message: e.to_string(),
                });
                continue;
            }
        };

        if !entry.file_type().is_file()
            || !(is_yaml_file(entry.path()) || is_kustomization_file(entry.path()))
        {
            continue;
        }

        let rel = relative_to(root, entry.path());
        if ignore.is_ignored(&rel) {
            debug!(file = %rel, "Ignoring file");
            continue;
        }

        loaded.files_scanned += 1;
        match load_file(root, entry.path()) {
            Ok(resources) => {
                debug!(file = %rel, resources = resources.len(), "Loaded file");
                loaded.resources.extend(resources);
            }
            Err(e) => {
                warn!(file = %rel, error = %e, "Skipping file that failed to load");
                loaded.warnings.push(LoadWarning {
                    file: entry.path().to_path_buf(),
                    message: e.to_string(),
                });
            }
        }
    }

    Ok(loaded)
}

/// Decode all manifest documents in one file
pub fn load_file(root: &Path, path: &Path) -> LoadResult<Vec<Resource>> {
    let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_documents(root, path, &text)
}

/// Decode the documents of an already-read file
pub fn parse_documents(root: &Path, path: &Path, text: &str) -> LoadResult<Vec<Resource>> {
    let kustomization_file = is_kustomization_file(path);
    let mut resources = Vec::new();

    for document in split_documents(text) {
        let value: Value = serde_yaml::from_str(&document.body).map_err(|source| LoadError::Yaml {
            path: path.to_path_buf(),
            source,
        })?;

        if !value.is_mapping() {
            continue;
        }

        let content = Content::new(value);
        let mut api_version = content.str_or_empty(&["apiVersion"]).to_string();
        let mut kind = content.str_or_empty(&["kind"]).to_string();
        let mut name = content.str_or_empty(&["metadata", "name"]).to_string();
        let namespace = content.str_or_empty(&["metadata", "namespace"]).to_string();

        if kustomization_file {
            if kind.is_empty() {
                kind = "Kustomization".to_string();
            }
            if name.is_empty() {
                name = relative_to(root, path);
            }
            api_version = api_version.trim().to_string();
        } else if api_version.is_empty() || kind.is_empty() || name.is_empty() {
            debug!(
                file = %path.display(),
                line = document.line,
                "Skipping document without apiVersion, kind or metadata.name"
            );
            continue;
        }

        resources.push(Resource::new(
            api_version,
            kind,
            name,
            namespace,
            path,
            document.line,
            content,
        ));
    }

    Ok(resources)
}

/// One raw document of a multi-document file
#[derive(Debug, Clone, PartialEq, Eq)]
struct RawDocument {
    body: String,
    /// 1-based line of `apiVersion:`, else of the first content line
    line: usize,
}

fn split_documents(text: &str) -> Vec<RawDocument> {
    let mut documents = Vec::new();
    let mut current = DocumentBuilder::default();

    for (index, line) in text.lines().enumerate() {
        if is_separator(line) {
            documents.extend(std::mem::take(&mut current).finish());
            continue;
        }
        current.push(index + 1, line);
    }
    documents.extend(current.finish());

    documents
}

#[derive(Default)]
struct DocumentBuilder {
    body: String,
    api_line: Option<usize>,
    first_line: Option<usize>,
}

impl DocumentBuilder {
    fn push(&mut self, number: usize, line: &str) {
        let trimmed = line.trim();
        if self.first_line.is_none() && !trimmed.is_empty() && !trimmed.starts_with('#') {
            self.first_line = Some(number);
        }
        if self.api_line.is_none() && line.starts_with("apiVersion:") {
            self.api_line = Some(number);
        }
        self.body.push_str(line);
        self.body.push('\n');
    }

    /// Comment-only and blank documents yield nothing
    fn finish(self) -> Option<RawDocument> {
        let first = self.first_line?;
        Some(RawDocument {
            body: self.body,
            line: self.api_line.unwrap_or(first),
        })
    }
}

fn is_separator(line: &str) -> bool {
    line.strip_prefix("---")
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
}

fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ResourceType;

    #[test]
    fn test_split_documents_lines() {
        let text = "# header\napiVersion: v1\nkind: ConfigMap\n---\n\nkind: Secret\napiVersion: v1\n---   \n";
        let docs = split_documents(text);
        assert_eq!(docs.len(), 2);
        assert_eq!(docs[0].line, 2);
        assert_eq!(docs[1].line, 7);
    }

    #[test]
    fn test_separator_requires_boundary() {
        assert!(is_separator("---"));
        assert!(is_separator("--- # doc"));
        assert!(!is_separator("----"));
        assert!(!is_separator(" ---"));
    }

    #[test]
    fn test_parse_multi_document() {
        let text = r#"apiVersion: v1
kind: Namespace
metadata:
  name: apps
---
apiVersion: apps/v1
kind: Deployment
metadata:
  name: web
  namespace: apps
---
# no identity, skipped
data:
  key: value
"#;
        let root = Path::new("/repo");
        let resources = parse_documents(root, Path::new("/repo/apps/app.yaml"), text).unwrap();
        assert_eq!(resources.len(), 2);
        assert_eq!(resources[0].key(), "apps");
        assert_eq!(resources[1].key(), "apps/web");
        assert_eq!(resources[1].line, 6);
        assert_eq!(resources[1].resource_type, ResourceType::KubernetesResource);
    }

    #[test]
    fn test_kustomization_file_defaults() {
        let text = "resources:\n  - app.yaml\n";
        let root = Path::new("/repo");
        let resources = parse_documents(
            root,
            Path::new("/repo/clusters/prod/kustomization.yaml"),
            text,
        )
        .unwrap();
        assert_eq!(resources.len(), 1);
        let r = &resources[0];
        assert_eq!(r.kind, "Kustomization");
        assert_eq!(r.api_version, "");
        assert_eq!(r.name, "clusters/prod/kustomization.yaml");
        assert_eq!(r.resource_type, ResourceType::KubernetesKustomization);
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        let result = parse_documents(
            Path::new("/repo"),
            Path::new("/repo/bad.yaml"),
            "apiVersion: v1\nkind: [unclosed\n",
        );
        assert!(matches!(result, Err(LoadError::Yaml { .. })));
    }

    #[test]
    fn test_is_yaml_file() {
        assert!(is_yaml_file(Path::new("a/b.yaml")));
        assert!(is_yaml_file(Path::new("a/b.YML")));
        assert!(!is_yaml_file(Path::new("a/b.json")));
        assert!(!is_yaml_file(Path::new("a/Kustomization")));
    }
}
