//! Reachability and orphan analysis

use std::collections::BTreeSet;

use crate::graph::ResourceGraph;
use crate::models::{ReferenceKind, Resource, ResourceId};

/// Result of a reachability walk
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reachability {
    /// Keys of every resource reached from an entry point
    pub reachable: BTreeSet<String>,
    /// Unreached resources, ordered by key
    pub orphans: Vec<ResourceId>,
}

impl Reachability {
    pub fn is_reachable(&self, key: &str) -> bool {
        self.reachable.contains(key)
    }

    pub fn is_orphan(&self, id: ResourceId) -> bool {
        self.orphans.contains(&id)
    }
}

/// A resource referenced from more than one place
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoubleReference {
    pub resource: ResourceId,
    /// Owning file of each incoming reference, in resolution order
    pub referencers: Vec<String>,
}

/// Walk the graph from `entry_points` and split resources into reached and orphaned
///
/// Only path and name-lookup edges are followed. A path edge reaches every
/// document of the target file, not just the one it resolved to. The visited
/// set is keyed by resource key, so reference cycles terminate without being
/// reported.
pub fn analyze(graph: &ResourceGraph, entry_points: &[ResourceId]) -> Reachability {
    let mut reachable = BTreeSet::new();
    let mut stack: Vec<ResourceId> = entry_points.iter().rev().copied().collect();

    while let Some(id) = stack.pop() {
        let resource = graph.resource(id);
        if !reachable.insert(resource.key()) {
            continue;
        }
        for reference in resource.dependencies.iter().rev() {
            if !reference.kind.is_traversable() {
                continue;
            }
            let Some(target) = reference.resolved else {
                continue;
            };
            let targets = match reference.kind {
                ReferenceKind::Path => graph.ids_in_file(&graph.resource(target).file),
                _ => std::slice::from_ref(&target),
            };
            for next in targets.iter().rev() {
                if !reachable.contains(&graph.resource(*next).key()) {
                    stack.push(*next);
                }
            }
        }
    }

    let orphans = graph
        .entries()
        .filter(|(_, resource)| !reachable.contains(&resource.key()))
        .map(|(id, _)| id)
        .collect();

    Reachability { reachable, orphans }
}

/// Resources not reachable from any entry point
pub fn find_orphans<'a>(graph: &'a ResourceGraph, entry_points: &[ResourceId]) -> Vec<&'a Resource> {
    analyze(graph, entry_points)
        .orphans
        .into_iter()
        .map(|id| graph.resource(id))
        .collect()
}

/// Resources with more than one incoming reference
pub fn find_double_references(graph: &ResourceGraph) -> Vec<DoubleReference> {
    graph
        .entries()
        .filter(|(_, resource)| resource.referenced_by.len() > 1)
        .map(|(id, resource)| DoubleReference {
            resource: id,
            referencers: resource
                .referenced_by
                .iter()
                .map(|reference| graph.relative_path(&reference.file))
                .collect(),
        })
        .collect()
}
