use std::collections::{BTreeMap, BTreeSet};

use super::{ChartGenerator, edge_label};
use crate::models::ResourceId;

const VALID_STYLE: &str =
    "    classDef valid fill:#2E8B57,stroke:#1F5F3F,stroke-width:3px,color:#FFFFFF";
const ORPHANED_STYLE: &str =
    "    classDef orphaned fill:#DC143C,stroke:#8B0000,stroke-width:3px,color:#FFFFFF";

/// Node ids in first-seen order
#[derive(Default)]
struct Nodes {
    ids: BTreeMap<ResourceId, String>,
    order: Vec<ResourceId>,
}

impl Nodes {
    fn id(&mut self, resource: ResourceId) -> String {
        if let Some(id) = self.ids.get(&resource) {
            return id.clone();
        }
        let id = format!("N{}", self.order.len() + 1);
        self.ids.insert(resource, id.clone());
        self.order.push(resource);
        id
    }
}

pub(super) fn render(chart: &ChartGenerator<'_>) -> String {
    let mut lines = vec!["graph TD".to_string()];
    let mut nodes = Nodes::default();
    let mut visited = BTreeSet::new();

    for entry in chart.entry_points() {
        visit(chart, *entry, &mut lines, &mut nodes, &mut visited);
    }

    let orphans = chart.orphans();
    if !orphans.is_empty() {
        lines.push(String::new());
        lines.push("    %% Orphaned Resources".to_string());
        for orphan in orphans {
            let id = nodes.id(*orphan);
            lines.push(node_line(chart, &id, *orphan));
        }
    }

    lines.push(String::new());
    lines.push("    %% Styling".to_string());
    lines.push(VALID_STYLE.to_string());
    lines.push(ORPHANED_STYLE.to_string());

    let orphan_set: BTreeSet<ResourceId> = orphans.iter().copied().collect();
    let (orphaned, valid): (Vec<ResourceId>, Vec<ResourceId>) = nodes
        .order
        .iter()
        .copied()
        .partition(|id| orphan_set.contains(id));

    lines.push(String::new());
    lines.push("    %% Apply styles".to_string());
    for (ids, class) in [(valid, "valid"), (orphaned, "orphaned")] {
        if ids.is_empty() {
            continue;
        }
        let names: Vec<&str> = ids.iter().filter_map(|id| nodes.ids.get(id)).map(String::as_str).collect();
        lines.push(format!("    class {} {}", names.join(","), class));
    }

    lines.join("\n")
}

fn visit(
    chart: &ChartGenerator<'_>,
    resource: ResourceId,
    lines: &mut Vec<String>,
    nodes: &mut Nodes,
    visited: &mut BTreeSet<ResourceId>,
) {
    if !visited.insert(resource) {
        return;
    }

    let id = nodes.id(resource);
    lines.push(node_line(chart, &id, resource));

    for (target, kind) in chart.children(resource) {
        let target_id = nodes.id(target);
        lines.push(format!("    {} -->|{}| {}", id, edge_label(kind), target_id));
        visit(chart, target, lines, nodes, visited);
    }
}

fn node_line(chart: &ChartGenerator<'_>, id: &str, resource: ResourceId) -> String {
    let resource = chart.graph.resource(resource);
    format!(
        "    {}[\"{}<br/>{}\"]",
        id,
        resource.name,
        resource.resource_type.icon_label()
    )
}
