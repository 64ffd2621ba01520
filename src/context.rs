//! Shared, read-only input for rule checks

use std::path::{Path, PathBuf};

use crate::analysis::{self, Reachability};
use crate::config::Config;
use crate::graph::ResourceGraph;
use crate::models::ResourceId;
use crate::results::Severity;
use crate::validators::DeprecationTable;

/// Everything a check may read during one validation run
///
/// Built once after the graph is resolved and then shared immutably, usually
/// behind an `Arc`, with every check task.
#[derive(Debug)]
pub struct ValidationContext {
    pub graph: ResourceGraph,
    pub config: Config,
    pub repo_path: PathBuf,
    pub entry_points: Vec<ResourceId>,
    pub reachability: Reachability,
    pub deprecations: DeprecationTable,
}

impl ValidationContext {
    /// Select entry points and run reachability over a built graph
    pub fn new(graph: ResourceGraph, config: Config, deprecations: DeprecationTable) -> Self {
        let entry_points = analysis::find_entry_points(&graph, &config.entry_points);
        let reachability = analysis::analyze(&graph, &entry_points);
        Self {
            repo_path: graph.root().to_path_buf(),
            graph,
            config,
            entry_points,
            reachability,
            deprecations,
        }
    }

    pub fn rule_enabled(&self, rule: &str) -> bool {
        self.config.rule_enabled(rule)
    }

    pub fn rule_severity(&self, rule: &str) -> Severity {
        Severity::parse_or_error(self.config.rule_severity(rule))
    }

    /// Repository-relative display path
    pub fn relative_path(&self, path: &Path) -> String {
        self.graph.relative_path(path)
    }
}
