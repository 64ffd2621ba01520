//! Entry-point selection
//!
//! Entry points are the roots of reachability analysis. They are computed per
//! run from the configured selectors; when the selectors match nothing a
//! built-in heuristic picks the usual top-level resources instead.

use std::collections::BTreeSet;

use tracing::{debug, info, warn};

use crate::config::EntryPointsConfig;
use crate::graph::ResourceGraph;
use crate::models::{ResourceId, ResourceType};

/// Namespace the heuristic treats as a root
pub const HEURISTIC_NAMESPACE: &str = "flux-system";

/// Directories the heuristic treats as roots
pub const HEURISTIC_DIRECTORIES: &[&str] = &["apps", "infrastructure", "clusters"];

/// Select entry points: explicit resources, then patterns, types and namespaces
pub fn find_entry_points(graph: &ResourceGraph, config: &EntryPointsConfig) -> Vec<ResourceId> {
    let mut selected = Selection::default();

    for key in &config.resources {
        match graph.id_of(key) {
            Some(id) => selected.push(id),
            None => warn!(resource = %key, "Configured entry point not found"),
        }
    }

    for pattern in &config.patterns {
        match graph.ids_matching_pattern(pattern) {
            Ok(ids) => selected.extend(ids),
            Err(e) => warn!(pattern = %pattern, error = %e, "Invalid entry-point pattern"),
        }
    }

    for name in &config.types {
        match ResourceType::parse_optional(name) {
            Some(resource_type) => selected.extend(graph.ids_by_type(resource_type)),
            None => warn!(resource_type = %name, "Unknown entry-point type"),
        }
    }

    for namespace in &config.namespaces {
        selected.extend(graph.ids_by_namespace(namespace));
    }

    if selected.is_empty() {
        info!("No configured entry points matched, using heuristic");
        return heuristic_entry_points(graph);
    }

    debug!(count = selected.ids.len(), "Selected entry points");
    selected.ids
}

/// Fallback roots: Flux Kustomizations, HelmReleases, the flux-system
/// namespace and the common top-level directories
pub fn heuristic_entry_points(graph: &ResourceGraph) -> Vec<ResourceId> {
    let mut selected = Selection::default();
    selected.extend(graph.ids_by_type(ResourceType::FluxKustomization));
    selected.extend(graph.ids_by_type(ResourceType::HelmRelease));
    selected.extend(graph.ids_by_namespace(HEURISTIC_NAMESPACE));
    for dir in HEURISTIC_DIRECTORIES {
        selected.extend(graph.ids_in_directory(dir));
    }
    debug!(count = selected.ids.len(), "Selected heuristic entry points");
    selected.ids
}

/// Ordered, de-duplicated id list
#[derive(Default)]
struct Selection {
    ids: Vec<ResourceId>,
    seen: BTreeSet<ResourceId>,
}

impl Selection {
    fn push(&mut self, id: ResourceId) {
        if self.seen.insert(id) {
            self.ids.push(id);
        }
    }

    fn extend(&mut self, ids: impl IntoIterator<Item = ResourceId>) {
        for id in ids {
            self.push(id);
        }
    }

    fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
