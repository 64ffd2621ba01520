use super::resource_finding;
use crate::context::ValidationContext;
use crate::results::Finding;
use crate::validators::{Check, CheckResult};

const RULE: &str = "orphaned-resources";

/// Resources unreachable from every entry point
pub struct OrphanedResourcesCheck;

impl Check for OrphanedResourcesCheck {
    fn name(&self) -> &'static str {
        "orphaned-resource"
    }

    fn description(&self) -> &'static str {
        "Reports resources not reachable from any entry point"
    }

    fn run(&self, ctx: &ValidationContext) -> CheckResult<Vec<Finding>> {
        if !ctx.rule_enabled(RULE) {
            return Ok(Vec::new());
        }
        let severity = ctx.rule_severity(RULE);

        let findings = ctx
            .reachability
            .orphans
            .iter()
            .map(|id| ctx.graph.resource(*id))
            .filter(|resource| !ctx.config.should_ignore_path(&ctx.relative_path(&resource.file)))
            .map(|resource| {
                resource_finding(
                    ctx,
                    resource,
                    "orphaned-resource",
                    severity,
                    format!(
                        "File '{}' is not referenced by any kustomization and is not an entry point",
                        resource.file_name()
                    ),
                )
            })
            .collect();

        Ok(findings)
    }
}
