use std::collections::BTreeMap;
use std::path::Path;

use super::resource_finding;
use crate::context::ValidationContext;
use crate::graph::resolve::resolve_path;
use crate::models::{ContentError, Resource};
use crate::results::{Finding, Severity};
use crate::validators::{Check, CheckResult};

const RULE: &str = "kubernetes-kustomization";

/// Kustomize `resources`, `patches` and `patchesStrategicMerge` entries must
/// exist next to the kustomization file and must not repeat
pub struct KubernetesKustomizationCheck;

/// One path list of a kustomization
struct PathList<'a> {
    /// Label used in messages, e.g. `resource`
    label: &'static str,
    entries: Vec<&'a str>,
}

impl Check for KubernetesKustomizationCheck {
    fn name(&self) -> &'static str {
        "kubernetes-kustomization"
    }

    fn description(&self) -> &'static str {
        "Validates kustomize resource and patch references"
    }

    fn run(&self, ctx: &ValidationContext) -> CheckResult<Vec<Finding>> {
        if !ctx.rule_enabled(RULE) {
            return Ok(Vec::new());
        }
        let severity = ctx.rule_severity(RULE);
        let mut findings = Vec::new();

        for resource in ctx.graph.kubernetes_kustomizations() {
            let base = resource.file.parent().unwrap_or_else(|| ctx.graph.root());

            let lists = match path_lists(resource) {
                Ok(lists) => lists,
                Err(e) => {
                    findings.push(resource_finding(
                        ctx,
                        resource,
                        self.name(),
                        severity,
                        format!("Failed to parse kustomization file: {}", e),
                    ));
                    continue;
                }
            };

            for list in &lists {
                findings.extend(duplicates(ctx, resource, list, severity));
                findings.extend(missing(ctx, resource, base, list, severity));
            }
        }

        Ok(findings)
    }
}

fn path_lists(resource: &Resource) -> Result<Vec<PathList<'_>>, ContentError> {
    let content = &resource.content;
    let optional_list = |field: &str| match content.str_list_at(&[field]) {
        Err(ContentError::Missing(_)) => Ok(Vec::new()),
        other => other,
    };

    let patches = match content.get_optional(&["patches"])? {
        None => Vec::new(),
        Some(_) => content
            .seq_at(&["patches"])?
            .iter()
            .filter_map(|patch| patch.get("path").and_then(|p| p.as_str()))
            .collect(),
    };

    Ok(vec![
        PathList {
            label: "resource",
            entries: optional_list("resources")?,
        },
        PathList {
            label: "patch",
            entries: patches,
        },
        PathList {
            label: "strategic merge patch",
            entries: optional_list("patchesStrategicMerge")?,
        },
    ])
}

/// One finding per repeated entry, listing every index it appears at
fn duplicates(
    ctx: &ValidationContext,
    resource: &Resource,
    list: &PathList<'_>,
    severity: Severity,
) -> Vec<Finding> {
    let mut positions: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (index, entry) in list.entries.iter().enumerate() {
        positions.entry(*entry).or_default().push(index);
    }

    list.entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let indices = positions.get(entry)?;
            // Only repeats, not the first occurrence
            (indices.first() != Some(&index)).then(|| {
                resource_finding(
                    ctx,
                    resource,
                    "kubernetes-kustomization",
                    severity,
                    format!(
                        "Duplicate {} reference: '{}' (appears at indices: {:?})",
                        list.label, entry, indices
                    ),
                )
            })
        })
        .collect()
}

fn missing(
    ctx: &ValidationContext,
    resource: &Resource,
    base: &Path,
    list: &PathList<'_>,
    severity: Severity,
) -> Vec<Finding> {
    list.entries
        .iter()
        .filter(|entry| !entry.is_empty())
        .filter(|entry| resolve_path(base, entry).is_some_and(|full| !full.exists()))
        .map(|entry| {
            resource_finding(
                ctx,
                resource,
                "kubernetes-kustomization",
                severity,
                format!(
                    "Invalid {} reference: {} '{}' does not exist",
                    list.label, list.label, entry
                ),
            )
        })
        .collect()
}
