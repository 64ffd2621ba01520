//! Resource identity and helpers

use std::fmt;
use std::path::{Path, PathBuf};

use super::{Content, Reference, ResourceType};

/// File names kustomize treats as a kustomization
pub const KUSTOMIZATION_FILE_NAMES: &[&str] =
    &["kustomization.yaml", "kustomization.yml", "Kustomization"];

/// Stable index of a resource in the graph arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId(pub usize);

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One decoded manifest document
#[derive(Debug, Clone)]
pub struct Resource {
    pub api_version: String,
    pub kind: String,
    pub name: String,
    pub namespace: String,
    pub file: PathBuf,
    pub line: usize,
    pub content: Content,
    pub resource_type: ResourceType,
    /// References this resource emits, filled during graph resolution
    pub dependencies: Vec<Reference>,
    /// References other resources emit pointing here
    pub referenced_by: Vec<Reference>,
}

impl Resource {
    pub fn new(
        api_version: impl Into<String>,
        kind: impl Into<String>,
        name: impl Into<String>,
        namespace: impl Into<String>,
        file: impl Into<PathBuf>,
        line: usize,
        content: Content,
    ) -> Self {
        let api_version = api_version.into();
        let kind = kind.into();
        let file = file.into();
        let resource_type =
            ResourceType::classify(&api_version, &kind, is_kustomization_file(&file));
        Self {
            api_version,
            kind,
            name: name.into(),
            namespace: namespace.into(),
            file,
            line,
            content,
            resource_type,
            dependencies: Vec::new(),
            referenced_by: Vec::new(),
        }
    }

    /// Unique index key: `namespace/name`, or `name` without a namespace
    pub fn key(&self) -> String {
        resource_key(&self.namespace, &self.name)
    }

    pub fn file_name(&self) -> String {
        self.file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Build the index key for a namespace/name pair
pub fn resource_key(namespace: &str, name: &str) -> String {
    if namespace.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", namespace, name)
    }
}

/// Whether `path` names a kustomize kustomization file
pub fn is_kustomization_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| KUSTOMIZATION_FILE_NAMES.contains(&n))
}
