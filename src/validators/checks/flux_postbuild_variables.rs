use regex::Regex;

use super::resource_finding;
use crate::context::ValidationContext;
use crate::models::ContentError;
use crate::results::Finding;
use crate::validators::{Check, CheckError, CheckResult};

const RULE: &str = "flux-postbuild-variables";

/// Flux substitution variable grammar
pub const VARIABLE_NAME_PATTERN: &str = "^[_a-zA-Z][_a-zA-Z0-9]*$";

/// `spec.postBuild.substitute` keys must be valid Flux variable names
pub struct FluxPostBuildVariablesCheck;

impl Check for FluxPostBuildVariablesCheck {
    fn name(&self) -> &'static str {
        "flux-postbuild-variables"
    }

    fn description(&self) -> &'static str {
        "Validates Flux postBuild substitution variable names"
    }

    fn run(&self, ctx: &ValidationContext) -> CheckResult<Vec<Finding>> {
        if !ctx.rule_enabled(RULE) {
            return Ok(Vec::new());
        }
        let severity = ctx.rule_severity(RULE);
        let pattern = Regex::new(VARIABLE_NAME_PATTERN)
            .map_err(|e| CheckError::Failed(e.to_string()))?;

        let mut findings = Vec::new();
        for resource in ctx.graph.flux_kustomizations() {
            let names = match resource.content.map_keys_at(&["spec", "postBuild", "substitute"]) {
                Ok(names) => names,
                Err(ContentError::Missing(_)) => continue,
                Err(e) => {
                    findings.push(resource_finding(
                        ctx,
                        resource,
                        self.name(),
                        severity,
                        format!("Invalid postBuild substitution: {}", e),
                    ));
                    continue;
                }
            };

            for name in names.into_iter().filter(|name| !pattern.is_match(name)) {
                findings.push(resource_finding(
                    ctx,
                    resource,
                    self.name(),
                    severity,
                    format!(
                        "Invalid Flux variable name '{}': must start with underscore or letter, followed by letters, digits, or underscores only (no dashes allowed). Pattern: {}",
                        name, VARIABLE_NAME_PATTERN
                    ),
                ));
            }
        }

        Ok(findings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validators::checks::test_support::{context, write_repo};

    #[test]
    fn test_invalid_names() {
        let repo = write_repo(&[(
            "flux.yaml",
            "apiVersion: kustomize.toolkit.fluxcd.io/v1\nkind: Kustomization\nmetadata:\n  name: apps\nspec:\n  postBuild:\n    substitute:\n      cluster_name: prod\n      _private: x\n      cluster-env: prod\n      9lives: cat\n",
        )]);
        let findings = FluxPostBuildVariablesCheck.run(&context(repo.path())).unwrap();
        let bad: Vec<&str> = findings
            .iter()
            .map(|f| f.message.split('\'').nth(1).unwrap())
            .collect();
        assert_eq!(bad, vec!["cluster-env", "9lives"]);
        assert_eq!(findings[0].resource, "apps");
    }

    #[test]
    fn test_without_post_build() {
        let repo = write_repo(&[(
            "flux.yaml",
            "apiVersion: kustomize.toolkit.fluxcd.io/v1\nkind: Kustomization\nmetadata:\n  name: apps\nspec:\n  path: ./\n",
        )]);
        assert!(FluxPostBuildVariablesCheck
            .run(&context(repo.path()))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_wrong_shape() {
        let repo = write_repo(&[(
            "flux.yaml",
            "apiVersion: kustomize.toolkit.fluxcd.io/v1\nkind: Kustomization\nmetadata:\n  name: apps\nspec:\n  postBuild:\n    substitute: [a, b]\n",
        )]);
        let findings = FluxPostBuildVariablesCheck.run(&context(repo.path())).unwrap();
        assert_eq!(findings.len(), 1);
        assert!(findings[0].message.contains("is not a mapping"));
    }
}
