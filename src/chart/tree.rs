use std::collections::BTreeSet;

use super::ChartGenerator;
use crate::models::ResourceId;

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const SPACE: &str = "    ";

pub(super) fn render(chart: &ChartGenerator<'_>) -> String {
    let mut lines = Vec::new();
    let mut visited = BTreeSet::new();

    let entry_points = chart.entry_points();
    for (i, entry) in entry_points.iter().enumerate() {
        let last = i + 1 == entry_points.len();
        node(chart, *entry, "", last, &mut lines, &mut visited);
    }

    let orphans = chart.orphans();
    if !orphans.is_empty() {
        lines.push(String::new());
        lines.push("Orphaned Resources:".to_string());
        for (i, orphan) in orphans.iter().enumerate() {
            let branch = if i + 1 == orphans.len() { LAST_BRANCH } else { BRANCH };
            lines.push(format!("{}{}", branch, label(chart, *orphan)));
        }
    }

    lines.join("\n")
}

fn node(
    chart: &ChartGenerator<'_>,
    resource: ResourceId,
    prefix: &str,
    last: bool,
    lines: &mut Vec<String>,
    visited: &mut BTreeSet<ResourceId>,
) {
    let branch = if last { LAST_BRANCH } else { BRANCH };

    // Already drawn elsewhere in the tree
    if !visited.insert(resource) {
        lines.push(format!("{}{}{} (see above)", prefix, branch, label(chart, resource)));
        return;
    }
    lines.push(format!("{}{}{}", prefix, branch, label(chart, resource)));

    let child_prefix = format!("{}{}", prefix, if last { SPACE } else { PIPE });
    let children = chart.children(resource);
    for (i, (child, _)) in children.iter().enumerate() {
        node(chart, *child, &child_prefix, i + 1 == children.len(), lines, visited);
    }
}

fn label(chart: &ChartGenerator<'_>, resource: ResourceId) -> String {
    let resource = chart.graph.resource(resource);
    format!("{} {}", resource.resource_type.icon_label(), resource.name)
}
