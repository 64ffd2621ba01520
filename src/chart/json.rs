use std::collections::BTreeSet;

use chrono::Utc;
use serde::Serialize;

use super::{ChartGenerator, ChartResult};
use crate::models::ResourceId;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct JsonChart {
    entry_points: Vec<String>,
    nodes: Vec<JsonNode>,
    edges: Vec<JsonEdge>,
    orphans: Vec<String>,
    total_resources: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    generated_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    repository: Option<String>,
}

#[derive(Debug, Serialize)]
struct JsonNode {
    id: String,
    name: String,
    kind: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    namespace: String,
    #[serde(rename = "type")]
    resource_type: String,
    file: String,
    orphan: bool,
}

#[derive(Debug, Serialize)]
struct JsonEdge {
    from: String,
    to: String,
    kind: String,
}

pub(super) fn render(chart: &ChartGenerator<'_>) -> ChartResult<String> {
    let graph = chart.graph;

    // Reachable nodes first, in walk order, then orphans
    let mut order: Vec<ResourceId> = Vec::new();
    let mut seen = BTreeSet::new();
    let mut stack: Vec<ResourceId> = chart.entry_points().iter().rev().copied().collect();
    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        order.push(id);
        for (child, _) in chart.children(id).into_iter().rev() {
            if !seen.contains(&child) {
                stack.push(child);
            }
        }
    }

    let orphans: BTreeSet<ResourceId> = chart.orphans().iter().copied().collect();
    for orphan in chart.orphans() {
        if seen.insert(*orphan) {
            order.push(*orphan);
        }
    }

    let key = |id: ResourceId| graph.resource(id).key();

    let nodes = order
        .iter()
        .map(|id| {
            let resource = graph.resource(*id);
            JsonNode {
                id: resource.key(),
                name: resource.name.clone(),
                kind: resource.kind.clone(),
                namespace: resource.namespace.clone(),
                resource_type: resource.resource_type.to_string(),
                file: graph.relative_path(&resource.file),
                orphan: orphans.contains(id),
            }
        })
        .collect();

    let edges = order
        .iter()
        .flat_map(|id| {
            chart
                .children(*id)
                .into_iter()
                .filter(|(target, _)| seen.contains(target))
                .map(move |(target, kind)| JsonEdge {
                    from: key(*id),
                    to: key(target),
                    kind: kind.to_string(),
                })
        })
        .collect();

    let (generated_at, repository) = if chart.options.include_metadata {
        (
            Some(Utc::now().to_rfc3339()),
            Some(graph.root().display().to_string()),
        )
    } else {
        (None, None)
    };

    let document = JsonChart {
        entry_points: chart.entry_points().iter().map(|id| key(*id)).collect(),
        nodes,
        edges,
        orphans: chart.orphans().iter().map(|id| key(*id)).collect(),
        total_resources: graph.resource_count(),
        generated_at,
        repository,
    };

    Ok(serde_json::to_string_pretty(&document)?)
}
