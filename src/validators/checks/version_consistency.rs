use super::resource_finding;
use crate::context::ValidationContext;
use crate::models::{ReferenceKind, ResourceType};
use crate::results::Finding;
use crate::validators::{Check, CheckResult};

const RULE: &str = "kustomization-version-consistency";

/// Linked kustomizations must declare the same apiVersion
///
/// Versions are compared as exact strings; a side without an apiVersion is
/// not compared.
pub struct VersionConsistencyCheck;

impl Check for VersionConsistencyCheck {
    fn name(&self) -> &'static str {
        "kustomization-version-consistency"
    }

    fn description(&self) -> &'static str {
        "Validates that referenced kustomizations use the same apiVersion"
    }

    fn run(&self, ctx: &ValidationContext) -> CheckResult<Vec<Finding>> {
        if !ctx.rule_enabled(RULE) {
            return Ok(Vec::new());
        }
        let severity = ctx.rule_severity(RULE);
        let mut findings = Vec::new();

        for resource in ctx.graph.kubernetes_kustomizations() {
            if resource.api_version.is_empty() {
                continue;
            }

            for reference in &resource.dependencies {
                if reference.kind != ReferenceKind::Path {
                    continue;
                }
                let Some(target_id) = reference.resolved else {
                    continue;
                };
                let target = ctx.graph.resource(target_id);
                if target.resource_type != ResourceType::KubernetesKustomization
                    || target.api_version.is_empty()
                    || target.api_version == resource.api_version
                {
                    continue;
                }

                findings.push(
                    resource_finding(
                        ctx,
                        resource,
                        self.name(),
                        severity,
                        format!(
                            "Kustomization apiVersion mismatch: '{}' references '{}' (version: {}) but uses version {}",
                            ctx.relative_path(&resource.file),
                            ctx.relative_path(&target.file),
                            target.api_version,
                            resource.api_version
                        ),
                    )
                    .with_line(reference.line),
                );
            }
        }

        Ok(findings)
    }
}
