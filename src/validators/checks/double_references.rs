use super::resource_finding;
use crate::analysis::find_double_references;
use crate::context::ValidationContext;
use crate::results::Finding;
use crate::validators::{Check, CheckResult};

const RULE: &str = "double-references";

/// Resources pulled in by more than one reference
pub struct DoubleReferencesCheck;

impl Check for DoubleReferencesCheck {
    fn name(&self) -> &'static str {
        "double-references"
    }

    fn description(&self) -> &'static str {
        "Reports resources referenced from more than one place"
    }

    fn run(&self, ctx: &ValidationContext) -> CheckResult<Vec<Finding>> {
        if !ctx.rule_enabled(RULE) {
            return Ok(Vec::new());
        }
        let severity = ctx.rule_severity(RULE);

        let findings = find_double_references(&ctx.graph)
            .into_iter()
            .map(|double| {
                let resource = ctx.graph.resource(double.resource);
                resource_finding(
                    ctx,
                    resource,
                    "double-reference",
                    severity,
                    format!(
                        "{} '{}' is referenced {} times (from: {})",
                        resource.kind,
                        resource.name,
                        double.referencers.len(),
                        double.referencers.join(", ")
                    ),
                )
            })
            .collect();

        Ok(findings)
    }
}
