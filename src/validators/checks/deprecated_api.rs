use crate::context::ValidationContext;
use crate::results::Finding;
use crate::validators::{Check, CheckResult};

const RULE: &str = "deprecated-apis";

/// Resources declaring a deprecated apiVersion
///
/// Severity comes from the matching deprecation entry, not from the rule.
pub struct DeprecatedApiCheck;

impl Check for DeprecatedApiCheck {
    fn name(&self) -> &'static str {
        "deprecated-api"
    }

    fn description(&self) -> &'static str {
        "Reports resources using deprecated Kubernetes API versions"
    }

    fn run(&self, ctx: &ValidationContext) -> CheckResult<Vec<Finding>> {
        if !ctx.rule_enabled(RULE) || ctx.deprecations.is_empty() {
            return Ok(Vec::new());
        }

        let mut findings = Vec::new();
        for resource in ctx.graph.resources() {
            if resource.api_version.is_empty() {
                continue;
            }
            let Some(deprecation) = ctx.deprecations.lookup(&resource.api_version, &resource.kind)
            else {
                continue;
            };

            let mut message = format!(
                "'{}' API for '{}' '{}' - {}",
                resource.api_version, resource.kind, resource.name, deprecation.info
            );
            if !deprecation.operator_category.is_empty() {
                message.push_str(&format!(" ({})", deprecation.operator_category));
            }

            findings.push(
                Finding::new("deprecated-api", deprecation.severity, message)
                    .with_file(ctx.relative_path(&resource.file))
                    .with_line(resource.line)
                    .with_resource(format!("{}/{}", resource.api_version, resource.kind)),
            );
        }

        Ok(findings)
    }
}
