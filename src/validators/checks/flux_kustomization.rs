use super::resource_finding;
use crate::context::ValidationContext;
use crate::graph::resolve::resolve_path;
use crate::models::ContentError;
use crate::results::Finding;
use crate::validators::{Check, CheckResult};

const RULE: &str = "flux-kustomization";

/// Flux Kustomizations need an existing `spec.path` and a `spec.sourceRef.name`
pub struct FluxKustomizationCheck;

impl Check for FluxKustomizationCheck {
    fn name(&self) -> &'static str {
        "flux-kustomization"
    }

    fn description(&self) -> &'static str {
        "Validates Flux Kustomization path and source references"
    }

    fn run(&self, ctx: &ValidationContext) -> CheckResult<Vec<Finding>> {
        if !ctx.rule_enabled(RULE) {
            return Ok(Vec::new());
        }
        let severity = ctx.rule_severity(RULE);
        let mut findings = Vec::new();

        for resource in ctx.graph.flux_kustomizations() {
            let content = &resource.content;

            let path_problem = match content.str_at(&["spec", "path"]) {
                Ok("") | Err(ContentError::Missing(_)) => Some("path is required".to_string()),
                Err(e) => Some(e.to_string()),
                Ok(path) => match resolve_path(ctx.graph.root(), path) {
                    Some(full) if !full.exists() => {
                        Some(format!("path '{}' does not exist", path))
                    }
                    // Remote paths and existing paths pass
                    _ => None,
                },
            };
            if let Some(problem) = path_problem {
                findings.push(resource_finding(
                    ctx,
                    resource,
                    self.name(),
                    severity,
                    format!("Invalid path reference: {}", problem),
                ));
            }

            let source_problem = match content.str_at(&["spec", "sourceRef", "name"]) {
                Ok("") | Err(ContentError::Missing(_)) => {
                    Some("sourceRef.name is required".to_string())
                }
                Err(e) => Some(e.to_string()),
                Ok(_) => None,
            };
            if let Some(problem) = source_problem {
                findings.push(resource_finding(
                    ctx,
                    resource,
                    self.name(),
                    severity,
                    format!("Invalid source reference: {}", problem),
                ));
            }
        }

        Ok(findings)
    }
}
