//! Reference records extracted from resources

use std::fmt;
use std::path::PathBuf;

use super::ResourceId;

/// How a reference is resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReferenceKind {
    /// File or directory path
    Path,
    /// Lookup by resource name (sourceRef style)
    NameLookup,
    /// Helm chart name; never resolved to a resource
    Chart,
}

impl ReferenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceKind::Path => "path",
            ReferenceKind::NameLookup => "name-lookup",
            ReferenceKind::Chart => "chart",
        }
    }

    /// Whether reachability analysis follows this kind of edge
    pub fn is_traversable(&self) -> bool {
        matches!(self, ReferenceKind::Path | ReferenceKind::NameLookup)
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One typed edge candidate emitted by a resource
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub kind: ReferenceKind,
    /// Field the reference was read from, e.g. `kustomization-resource`
    pub origin: &'static str,
    pub owner_name: String,
    pub file: PathBuf,
    pub line: usize,
    /// Path or name exactly as written in the manifest
    pub target: String,
    /// Path references only: resolve against the owning file's directory
    /// instead of the repository root
    pub relative_to_owner_file: bool,
    /// Resource this reference resolved to
    pub resolved: Option<ResourceId>,
    /// Absolute local path a path reference resolved to
    pub resolved_path: Option<PathBuf>,
}

impl Reference {
    pub fn new(
        kind: ReferenceKind,
        origin: &'static str,
        owner_name: impl Into<String>,
        file: impl Into<PathBuf>,
        line: usize,
        target: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            origin,
            owner_name: owner_name.into(),
            file: file.into(),
            line,
            target: target.into(),
            relative_to_owner_file: false,
            resolved: None,
            resolved_path: None,
        }
    }

    pub fn relative_to_owner_file(mut self, relative: bool) -> Self {
        self.relative_to_owner_file = relative;
        self
    }

    pub fn is_resolved(&self) -> bool {
        self.resolved.is_some()
    }
}
