//! Validation pipelines
//!
//! A pipeline is an ordered list of stages. Each stage names the checks it
//! runs, whether they run concurrently, whether a stage failure aborts the
//! whole pipeline, and an optional run condition.
//!
//! A stage fails only when it is structurally broken (a named check is not
//! registered, or it names no checks). Errors raised by a check while running
//! are reported as findings by the [`CheckRunner`] and never fail the stage.

use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{CheckRegistry, CheckRunner};
use crate::context::ValidationContext;
use crate::results::Finding;

pub const PIPELINE_STAGE_ERROR: &str = "pipeline-stage-error";

/// Pipeline errors
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error("validator '{check}' not found")]
    UnknownCheck { stage: String, check: String },

    #[error("no validators found for stage '{0}'")]
    EmptyStage(String),

    #[error("required stage '{stage}' failed: {source}")]
    RequiredStageFailed {
        stage: String,
        #[source]
        source: Box<PipelineError>,
    },

    #[error("unknown pipeline '{0}' (expected one of: default, fast, comprehensive)")]
    UnknownPipeline(String),
}

/// Result type for pipeline operations
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;

/// One stage of a pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub name: String,
    pub description: String,
    pub checks: Vec<String>,
    pub parallel: bool,
    pub required: bool,
    /// e.g. `resource_count > 10`
    pub condition: Option<String>,
}

impl Stage {
    pub fn new(name: impl Into<String>, checks: &[&str]) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            checks: checks.iter().map(|c| c.to_string()).collect(),
            parallel: false,
            required: false,
            condition: None,
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    pub fn condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = Some(condition.into());
        self
    }
}

/// Ordered stages with a name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    pub name: String,
    pub description: String,
    pub stages: Vec<Stage>,
}

const BASIC_CHECKS: &[&str] = &[
    "flux-kustomization",
    "kubernetes-kustomization",
    "deprecated-api",
];
const ADVANCED_CHECKS: &[&str] = &[
    "kustomization-version-consistency",
    "flux-postbuild-variables",
    "broken-references",
];
const CLEANUP_CHECKS: &[&str] = &["orphaned-resource", "double-references"];

impl Pipeline {
    pub fn new(name: impl Into<String>, description: impl Into<String>, stages: Vec<Stage>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            stages,
        }
    }

    /// Names of the predefined pipelines
    pub fn names() -> &'static [&'static str] {
        &["default", "fast", "comprehensive"]
    }

    /// Look up a predefined pipeline
    pub fn by_name(name: &str) -> PipelineResult<Self> {
        match name {
            "default" => Ok(Self::default_pipeline()),
            "fast" => Ok(Self::fast()),
            "comprehensive" => Ok(Self::comprehensive()),
            other => Err(PipelineError::UnknownPipeline(other.to_string())),
        }
    }

    pub fn default_pipeline() -> Self {
        Self::new(
            "default",
            "Default validation pipeline with all validators",
            vec![
                Stage::new("basic-validation", BASIC_CHECKS)
                    .description("Basic resource validation")
                    .parallel(true)
                    .required(true),
                Stage::new("advanced-validation", ADVANCED_CHECKS)
                    .description("Advanced validation and consistency checks")
                    .parallel(true),
                Stage::new("cleanup-validation", CLEANUP_CHECKS)
                    .description("Cleanup and orphaned resource detection")
                    .condition("resource_count > 10"),
            ],
        )
    }

    pub fn fast() -> Self {
        Self::new(
            "fast",
            "Fast validation pipeline for CI/CD",
            vec![
                Stage::new(
                    "critical-validation",
                    &["flux-kustomization", "kubernetes-kustomization"],
                )
                .description("Critical validations only")
                .parallel(true)
                .required(true),
            ],
        )
    }

    pub fn comprehensive() -> Self {
        Self::new(
            "comprehensive",
            "Comprehensive validation pipeline with all checks",
            vec![
                Stage::new("syntax-validation", BASIC_CHECKS)
                    .description("Syntax and basic structure validation")
                    .parallel(true)
                    .required(true),
                Stage::new("consistency-validation", ADVANCED_CHECKS)
                    .description("Consistency and version validation")
                    .parallel(true)
                    .required(true),
                Stage::new("cleanup-validation", CLEANUP_CHECKS)
                    .description("Cleanup and orphaned resource detection"),
            ],
        )
    }

    /// Run every stage in order
    ///
    /// A failing required stage aborts with [`PipelineError::RequiredStageFailed`];
    /// any other failing stage is reported as a single `pipeline-stage-error`
    /// finding and the next stage runs.
    pub async fn execute(
        &self,
        registry: &CheckRegistry,
        runner: &CheckRunner,
        ctx: Arc<ValidationContext>,
    ) -> PipelineResult<Vec<Finding>> {
        info!(pipeline = %self.name, stages = self.stages.len(), "Executing pipeline");
        let mut findings = Vec::new();

        for stage in &self.stages {
            match execute_stage(stage, registry, runner, Arc::clone(&ctx)).await {
                Ok(stage_findings) => {
                    debug!(
                        stage = %stage.name,
                        findings = stage_findings.len(),
                        "Stage completed"
                    );
                    findings.extend(stage_findings);
                }
                Err(e) if stage.required => {
                    return Err(PipelineError::RequiredStageFailed {
                        stage: stage.name.clone(),
                        source: Box::new(e),
                    });
                }
                Err(e) => {
                    warn!(stage = %stage.name, error = %e, "Stage failed");
                    findings.push(Finding::error(
                        PIPELINE_STAGE_ERROR,
                        format!("Stage '{}' failed: {}", stage.name, e),
                    ));
                }
            }
        }

        Ok(findings)
    }
}

async fn execute_stage(
    stage: &Stage,
    registry: &CheckRegistry,
    runner: &CheckRunner,
    ctx: Arc<ValidationContext>,
) -> PipelineResult<Vec<Finding>> {
    if let Some(condition) = &stage.condition {
        if !evaluate_condition(condition, &ctx) {
            debug!(stage = %stage.name, condition = %condition, "Skipping stage");
            return Ok(Vec::new());
        }
    }

    let checks = stage
        .checks
        .iter()
        .map(|name| {
            registry.get(name).ok_or_else(|| PipelineError::UnknownCheck {
                stage: stage.name.clone(),
                check: name.clone(),
            })
        })
        .collect::<PipelineResult<Vec<_>>>()?;

    if checks.is_empty() {
        return Err(PipelineError::EmptyStage(stage.name.clone()));
    }

    debug!(stage = %stage.name, checks = checks.len(), parallel = stage.parallel, "Executing stage");
    let findings = if stage.parallel {
        runner.run_parallel(&checks, ctx).await
    } else {
        runner.run_sequential(&checks, ctx).await
    };
    Ok(findings)
}

/// Evaluate a stage condition
///
/// Supports `resource_count` and `file_count` compared with `>` or `<`
/// against an integer. Anything else evaluates to true so a malformed
/// condition never disables a stage.
pub fn evaluate_condition(condition: &str, ctx: &ValidationContext) -> bool {
    let Some(at) = condition.find(['>', '<']) else {
        debug!(condition, "Unrecognised stage condition, running stage");
        return true;
    };
    let (field, rest) = condition.split_at(at);
    let (op, value) = rest.split_at(1);

    let actual = match field.trim() {
        "resource_count" => ctx.graph.resource_count(),
        "file_count" => ctx.graph.file_count(),
        _ => {
            debug!(condition, "Unknown condition field, running stage");
            return true;
        }
    };

    let Ok(threshold) = value.trim().parse::<usize>() else {
        debug!(condition, "Invalid condition threshold, running stage");
        return true;
    };

    match op {
        ">" => actual > threshold,
        "<" => actual < threshold,
        _ => true,
    }
}
