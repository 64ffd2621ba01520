//! Resource graph
//!
//! Owns every loaded [`Resource`] in an arena, indexes them several ways and
//! records the resolved reference edges between them.
//!
//! Building happens in two strictly ordered passes:
//! 1. every resource is keyed and indexed;
//! 2. every keyed resource has its references extracted and resolved against
//!    the now complete indexes.
//!
//! Resolution never runs during pass 1, so a reference to a resource that
//! appears later in walk order still resolves.

pub mod extract;
pub mod resolve;

use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};

use globset::GlobBuilder;
use serde::Serialize;
use tracing::{debug, warn};

use crate::loader::{LoadWarning, LoadedRepository};
use crate::models::{
    KUSTOMIZATION_FILE_NAMES, Reference, ReferenceKind, Resource, ResourceId, ResourceType,
};
use extract::extract_references;
use resolve::{normalize, relative_to, resolve_path};

/// Summary counts for a built graph
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphStats {
    pub resources: usize,
    pub files: usize,
    pub references: usize,
    pub resolved_references: usize,
    pub unresolved_references: usize,
    pub by_type: BTreeMap<String, usize>,
}

/// Dependency graph over all resources of one repository
#[derive(Debug, Default)]
pub struct ResourceGraph {
    root: PathBuf,
    arena: Vec<Resource>,
    by_key: BTreeMap<String, ResourceId>,
    by_file: BTreeMap<PathBuf, Vec<ResourceId>>,
    by_kind: BTreeMap<String, Vec<ResourceId>>,
    by_api_version_kind: BTreeMap<String, Vec<ResourceId>>,
    by_type: BTreeMap<ResourceType, Vec<ResourceId>>,
    by_namespace: BTreeMap<String, Vec<ResourceId>>,
    by_directory: BTreeMap<String, Vec<ResourceId>>,
    dependency_graph: BTreeMap<PathBuf, Vec<PathBuf>>,
    reverse_dependencies: BTreeMap<PathBuf, Vec<PathBuf>>,
    load_warnings: Vec<LoadWarning>,
}

impl ResourceGraph {
    /// Build a graph from loaded resources
    pub fn build(root: &Path, resources: Vec<Resource>) -> Self {
        let mut graph = Self {
            root: normalize(root),
            ..Default::default()
        };
        graph.index(resources);
        graph.resolve_references();

        debug!(
            resources = graph.by_key.len(),
            files = graph.by_file.len(),
            "Built resource graph"
        );
        graph
    }

    /// Build a graph from a repository walk, keeping its load warnings
    pub fn from_loaded(root: &Path, loaded: LoadedRepository) -> Self {
        let mut graph = Self::build(root, loaded.resources);
        graph.load_warnings = loaded.warnings;
        graph
    }

    /// Pass 1: key and index every resource
    fn index(&mut self, resources: Vec<Resource>) {
        for mut resource in resources {
            resource.file = normalize(&resource.file);
            let id = ResourceId(self.arena.len());
            let key = resource.key();

            if let Some(previous) = self.by_key.insert(key.clone(), id) {
                let shadowed = &self.arena[previous.0];
                warn!(
                    key = %key,
                    previous = %shadowed.file.display(),
                    current = %resource.file.display(),
                    "Resource key collision, keeping the later resource"
                );
            }
            self.arena.push(resource);
        }

        // Shadowed resources stay in the arena but are not indexed
        let keyed: Vec<ResourceId> = self.keyed_ids();
        for id in keyed {
            let resource = &self.arena[id.0];
            let directory = resource
                .file
                .parent()
                .map(|p| relative_to(&self.root, p))
                .unwrap_or_default();

            self.by_file.entry(resource.file.clone()).or_default().push(id);
            self.by_kind.entry(resource.kind.clone()).or_default().push(id);
            self.by_api_version_kind
                .entry(format!("{}/{}", resource.api_version, resource.kind))
                .or_default()
                .push(id);
            self.by_type.entry(resource.resource_type).or_default().push(id);
            self.by_namespace
                .entry(resource.namespace.clone())
                .or_default()
                .push(id);
            self.by_directory.entry(directory).or_default().push(id);
        }
    }

    /// Pass 2: extract and resolve references of every keyed resource
    fn resolve_references(&mut self) {
        let mut resolved: Vec<(ResourceId, Vec<Reference>)> = Vec::new();

        for id in self.keyed_ids() {
            let resource = &self.arena[id.0];
            let mut references = extract_references(resource);
            for reference in &mut references {
                self.resolve_reference(reference);
            }
            resolved.push((id, references));
        }

        for (id, references) in resolved {
            let owner_file = self.arena[id.0].file.clone();
            for reference in &references {
                let Some(target) = reference.resolved else {
                    continue;
                };
                let target_file = self.arena[target.0].file.clone();
                self.arena[target.0].referenced_by.push(reference.clone());
                push_unique(
                    self.dependency_graph.entry(owner_file.clone()).or_default(),
                    target_file.clone(),
                );
                push_unique(
                    self.reverse_dependencies.entry(target_file).or_default(),
                    owner_file.clone(),
                );
            }
            self.arena[id.0].dependencies = references;
        }
    }

    fn resolve_reference(&self, reference: &mut Reference) {
        match reference.kind {
            ReferenceKind::Path => {
                let base = if reference.relative_to_owner_file {
                    reference
                        .file
                        .parent()
                        .map(Path::to_path_buf)
                        .unwrap_or_else(|| self.root.clone())
                } else {
                    self.root.clone()
                };
                if let Some(path) = resolve_path(&base, &reference.target) {
                    let path = normalize(&path);
                    reference.resolved = self.resource_at_path(&path);
                    reference.resolved_path = Some(path);
                }
            }
            ReferenceKind::NameLookup => {
                reference.resolved = self.find_by_name(&reference.target);
            }
            // Charts live outside the repository model
            ReferenceKind::Chart => {}
        }
    }

    /// Resource a path points at
    ///
    /// A directory resolves to the resource of the kustomization file inside
    /// it; anything else to the first resource parsed from that exact file.
    pub fn resource_at_path(&self, path: &Path) -> Option<ResourceId> {
        let path = normalize(path);
        KUSTOMIZATION_FILE_NAMES
            .iter()
            .find_map(|name| self.by_file.get(&path.join(name)))
            .or_else(|| self.by_file.get(&path))
            .and_then(|ids| ids.first().copied())
    }

    /// Look a resource up by key, falling back to a `*/name` suffix match
    pub fn find_by_name(&self, name: &str) -> Option<ResourceId> {
        if let Some(id) = self.by_key.get(name) {
            return Some(*id);
        }
        let suffix = format!("/{}", name);
        self.by_key
            .iter()
            .find(|(key, _)| key.ends_with(&suffix))
            .map(|(_, id)| *id)
    }

    fn keyed_ids(&self) -> Vec<ResourceId> {
        let mut ids: Vec<ResourceId> = self.by_key.values().copied().collect();
        ids.sort();
        ids
    }

    fn collect<'a>(&'a self, ids: Option<&'a Vec<ResourceId>>) -> Vec<&'a Resource> {
        ids.map(|ids| ids.iter().map(|id| &self.arena[id.0]).collect())
            .unwrap_or_default()
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Repository-relative, forward-slash form of `path`
    pub fn relative_path(&self, path: &Path) -> String {
        relative_to(&self.root, path)
    }

    /// Keyed resources, ordered by key
    pub fn resources(&self) -> Vec<&Resource> {
        self.by_key.values().map(|id| &self.arena[id.0]).collect()
    }

    /// Keyed resources with their ids, ordered by key
    pub fn entries(&self) -> impl Iterator<Item = (ResourceId, &Resource)> {
        self.by_key.values().map(|id| (*id, &self.arena[id.0]))
    }

    pub fn get(&self, key: &str) -> Option<&Resource> {
        self.by_key.get(key).map(|id| &self.arena[id.0])
    }

    pub fn id_of(&self, key: &str) -> Option<ResourceId> {
        self.by_key.get(key).copied()
    }

    pub fn resource(&self, id: ResourceId) -> &Resource {
        &self.arena[id.0]
    }

    pub fn by_kind(&self, kind: &str) -> Vec<&Resource> {
        self.collect(self.by_kind.get(kind))
    }

    pub fn by_api_version_kind(&self, api_version: &str, kind: &str) -> Vec<&Resource> {
        self.collect(self.by_api_version_kind.get(&format!("{}/{}", api_version, kind)))
    }

    pub fn by_type(&self, resource_type: ResourceType) -> Vec<&Resource> {
        self.collect(self.by_type.get(&resource_type))
    }

    pub fn ids_by_type(&self, resource_type: ResourceType) -> Vec<ResourceId> {
        self.by_type.get(&resource_type).cloned().unwrap_or_default()
    }

    pub fn by_namespace(&self, namespace: &str) -> Vec<&Resource> {
        self.collect(self.by_namespace.get(namespace))
    }

    pub fn ids_by_namespace(&self, namespace: &str) -> Vec<ResourceId> {
        self.by_namespace.get(namespace).cloned().unwrap_or_default()
    }

    /// Resources parsed from `file`; relative paths are taken from the root
    pub fn by_file(&self, file: &Path) -> Vec<&Resource> {
        let file = if file.is_relative() {
            self.root.join(file)
        } else {
            file.to_path_buf()
        };
        self.collect(self.by_file.get(&normalize(&file)))
    }

    /// Ids of every resource parsed from `file`, in document order
    pub fn ids_in_file(&self, file: &Path) -> &[ResourceId] {
        self.by_file
            .get(&normalize(file))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Ids of resources whose repository-relative file lies under `dir`
    pub fn ids_in_directory(&self, dir: &str) -> Vec<ResourceId> {
        let dir = dir.trim_matches('/');
        let mut ids: Vec<ResourceId> = self
            .by_directory
            .iter()
            .filter(|(key, _)| {
                dir.is_empty()
                    || key.as_str() == dir
                    || key
                        .strip_prefix(dir)
                        .is_some_and(|rest| rest.starts_with('/'))
            })
            .flat_map(|(_, ids)| ids.iter().copied())
            .collect();
        ids.sort();
        ids
    }

    pub fn in_directory(&self, dir: &str) -> Vec<&Resource> {
        self.ids_in_directory(dir)
            .into_iter()
            .map(|id| &self.arena[id.0])
            .collect()
    }

    /// Ids of resources whose repository-relative file matches `pattern`
    ///
    /// `*` does not cross a `/`.
    pub fn ids_matching_pattern(&self, pattern: &str) -> Result<Vec<ResourceId>, globset::Error> {
        let matcher = GlobBuilder::new(pattern)
            .literal_separator(true)
            .build()?
            .compile_matcher();
        Ok(self
            .by_file
            .iter()
            .filter(|(file, _)| matcher.is_match(relative_to(&self.root, file)))
            .flat_map(|(_, ids)| ids.iter().copied())
            .collect())
    }

    pub fn matching_pattern(&self, pattern: &str) -> Result<Vec<&Resource>, globset::Error> {
        Ok(self
            .ids_matching_pattern(pattern)?
            .into_iter()
            .map(|id| &self.arena[id.0])
            .collect())
    }

    pub fn flux_kustomizations(&self) -> Vec<&Resource> {
        self.by_type(ResourceType::FluxKustomization)
    }

    pub fn kubernetes_kustomizations(&self) -> Vec<&Resource> {
        self.by_type(ResourceType::KubernetesKustomization)
    }

    pub fn helm_releases(&self) -> Vec<&Resource> {
        self.by_type(ResourceType::HelmRelease)
    }

    pub fn flux_sources(&self) -> Vec<&Resource> {
        self.by_type(ResourceType::FluxSource)
    }

    /// Files that `file` has resolved references to
    pub fn dependencies(&self, file: &Path) -> &[PathBuf] {
        self.dependency_graph
            .get(&normalize(file))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Files with resolved references into `file`
    pub fn dependents(&self, file: &Path) -> &[PathBuf] {
        self.reverse_dependencies
            .get(&normalize(file))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// All resolved file edges, ordered by source file
    pub fn edges(&self) -> impl Iterator<Item = (&PathBuf, &PathBuf)> {
        self.dependency_graph
            .iter()
            .flat_map(|(from, targets)| targets.iter().map(move |to| (from, to)))
    }

    pub fn load_warnings(&self) -> &[LoadWarning] {
        &self.load_warnings
    }

    pub fn resource_count(&self) -> usize {
        self.by_key.len()
    }

    pub fn file_count(&self) -> usize {
        self.by_file.len()
    }

    pub fn stats(&self) -> GraphStats {
        let mut stats = GraphStats {
            resources: self.resource_count(),
            files: self.file_count(),
            ..Default::default()
        };
        for (_, resource) in self.entries() {
            *stats
                .by_type
                .entry(resource.resource_type.to_string())
                .or_default() += 1;
            for reference in &resource.dependencies {
                stats.references += 1;
                if reference.is_resolved() {
                    stats.resolved_references += 1;
                } else if reference.kind != ReferenceKind::Chart {
                    stats.unresolved_references += 1;
                }
            }
        }
        stats
    }

    /// Distinct resolved edge set, used to compare graph builds
    pub fn edge_set(&self) -> BTreeSet<(String, String)> {
        self.entries()
            .flat_map(|(_, resource)| {
                resource.dependencies.iter().filter_map(move |reference| {
                    reference
                        .resolved
                        .map(|target| (resource.key(), self.arena[target.0].key()))
                })
            })
            .collect()
    }
}

fn push_unique(list: &mut Vec<PathBuf>, path: PathBuf) {
    if !list.contains(&path) {
        list.push(path);
    }
}
