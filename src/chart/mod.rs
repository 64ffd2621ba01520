//! Dependency charts
//!
//! Renders the resolved graph as seen from the entry points: a Mermaid
//! flowchart, an indented text tree or a JSON document. Only path and
//! name-lookup edges are drawn, the same edges reachability follows.

mod json;
mod mermaid;
mod tree;

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use crate::analysis::{self, Reachability};
use crate::config::ChartConfig;
use crate::context::ValidationContext;
use crate::graph::ResourceGraph;
use crate::models::{ReferenceKind, ResourceId};

/// Chart errors
#[derive(Debug, thiserror::Error)]
pub enum ChartError {
    #[error("unknown chart format '{0}' (expected mermaid, tree or json)")]
    UnknownFormat(String),

    #[error("entry point '{name}' not found, available entry points: {available}")]
    UnknownEntryPoint { name: String, available: String },

    #[error("failed to serialize chart: {0}")]
    Serialize(#[from] serde_json::Error),
}

pub type ChartResult<T> = std::result::Result<T, ChartError>;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartFormat {
    #[default]
    Mermaid,
    Tree,
    Json,
}

impl ChartFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChartFormat::Mermaid => "mermaid",
            ChartFormat::Tree => "tree",
            ChartFormat::Json => "json",
        }
    }
}

impl fmt::Display for ChartFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartFormat {
    type Err = ChartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "mermaid" => Ok(ChartFormat::Mermaid),
            "tree" => Ok(ChartFormat::Tree),
            "json" => Ok(ChartFormat::Json),
            _ => Err(ChartError::UnknownFormat(s.to_string())),
        }
    }
}

/// What a chart includes besides the reachable graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartOptions {
    pub include_orphaned: bool,
    pub include_metadata: bool,
}

impl Default for ChartOptions {
    fn default() -> Self {
        Self {
            include_orphaned: true,
            include_metadata: false,
        }
    }
}

impl From<&ChartConfig> for ChartOptions {
    fn from(config: &ChartConfig) -> Self {
        Self {
            include_orphaned: config.include_orphaned,
            include_metadata: config.include_metadata,
        }
    }
}

/// Renders one view of a resource graph
#[derive(Debug, Clone)]
pub struct ChartGenerator<'a> {
    graph: &'a ResourceGraph,
    entry_points: Vec<ResourceId>,
    orphans: Vec<ResourceId>,
    options: ChartOptions,
}

impl<'a> ChartGenerator<'a> {
    pub fn new(
        graph: &'a ResourceGraph,
        entry_points: Vec<ResourceId>,
        reachability: &Reachability,
    ) -> Self {
        Self {
            graph,
            entry_points,
            orphans: reachability.orphans.clone(),
            options: ChartOptions::default(),
        }
    }

    /// Chart of a validation run, configured from its `chart` settings
    pub fn from_context(ctx: &'a ValidationContext) -> Self {
        Self::new(&ctx.graph, ctx.entry_points.clone(), &ctx.reachability)
            .with_options(ChartOptions::from(&ctx.config.chart))
    }

    pub fn with_options(mut self, options: ChartOptions) -> Self {
        self.options = options;
        self
    }

    /// Restrict the chart to one entry point, matched by name or key
    ///
    /// Orphans are recomputed from that entry point alone.
    pub fn focus(mut self, name: &str) -> ChartResult<Self> {
        let found = self.entry_points.iter().copied().find(|id| {
            let resource = self.graph.resource(*id);
            resource.name == name || resource.key() == name
        });

        let Some(id) = found else {
            let available = self
                .entry_points
                .iter()
                .map(|id| self.graph.resource(*id).name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(ChartError::UnknownEntryPoint {
                name: name.to_string(),
                available,
            });
        };

        self.entry_points = vec![id];
        self.orphans = analysis::analyze(self.graph, &self.entry_points).orphans;
        Ok(self)
    }

    pub fn render(&self, format: ChartFormat) -> ChartResult<String> {
        match format {
            ChartFormat::Mermaid => Ok(mermaid::render(self)),
            ChartFormat::Tree => Ok(tree::render(self)),
            ChartFormat::Json => json::render(self),
        }
    }

    pub fn entry_points(&self) -> &[ResourceId] {
        &self.entry_points
    }

    /// Orphans to draw; empty when orphans are excluded
    pub fn orphans(&self) -> &[ResourceId] {
        if self.options.include_orphaned {
            &self.orphans
        } else {
            &[]
        }
    }

    /// Resolved, traversable targets of `id` in reference order, each once
    fn children(&self, id: ResourceId) -> Vec<(ResourceId, ReferenceKind)> {
        let mut seen = BTreeSet::new();
        self.graph
            .resource(id)
            .dependencies
            .iter()
            .filter(|reference| reference.kind.is_traversable())
            .filter_map(|reference| reference.resolved.map(|target| (target, reference.kind)))
            .filter(|(target, _)| seen.insert(*target))
            .collect()
    }
}

fn edge_label(kind: ReferenceKind) -> &'static str {
    match kind {
        ReferenceKind::Path => "path",
        ReferenceKind::NameLookup => "sourceRef",
        ReferenceKind::Chart => "chart",
    }
}
