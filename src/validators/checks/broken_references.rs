use super::resource_finding;
use crate::context::ValidationContext;
use crate::models::{Reference, ReferenceKind};
use crate::results::Finding;
use crate::validators::{Check, CheckResult};

const RULE: &str = "broken-references";

/// References that point at nothing
///
/// A name lookup is broken when no resource has that key. A path is broken
/// when the resolved location does not exist on disk; existing paths that
/// simply hold no manifest are not reported.
pub struct BrokenReferencesCheck;

impl Check for BrokenReferencesCheck {
    fn name(&self) -> &'static str {
        "broken-references"
    }

    fn description(&self) -> &'static str {
        "Reports source and path references that do not resolve"
    }

    fn run(&self, ctx: &ValidationContext) -> CheckResult<Vec<Finding>> {
        if !ctx.rule_enabled(RULE) {
            return Ok(Vec::new());
        }
        let severity = ctx.rule_severity(RULE);

        let findings = ctx
            .graph
            .resources()
            .into_iter()
            .flat_map(|resource| {
                resource
                    .dependencies
                    .iter()
                    .filter(|reference| is_broken(reference))
                    .map(move |reference| {
                        resource_finding(
                            ctx,
                            resource,
                            "broken-reference",
                            severity,
                            format!(
                                "{} '{}' references {} '{}' which does not exist",
                                resource.kind,
                                resource.name,
                                reference.origin,
                                reference.target
                            ),
                        )
                        .with_line(reference.line)
                    })
            })
            .collect();

        Ok(findings)
    }
}

fn is_broken(reference: &Reference) -> bool {
    match reference.kind {
        ReferenceKind::NameLookup => !reference.is_resolved(),
        ReferenceKind::Path => reference
            .resolved_path
            .as_ref()
            .is_some_and(|path| !path.exists()),
        ReferenceKind::Chart => false,
    }
}
