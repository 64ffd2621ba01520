//! Pipeline execution tests
//!
//! Stage failure handling with hand-written checks, plus the predefined
//! pipelines run end to end through the validator.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use gitops_validator::graph::ResourceGraph;
use gitops_validator::validators::pipeline::PIPELINE_STAGE_ERROR;
use gitops_validator::validators::runner::{VALIDATOR_ERROR, VALIDATOR_TIMEOUT};
use gitops_validator::validators::{
    Check, CheckError, CheckRegistry, CheckResult, CheckRunner, DeprecationTable, Pipeline,
    PipelineError, Stage,
};
use gitops_validator::{Config, Finding, Severity, ValidationContext, Validator, ValidatorOptions};

struct StaticCheck {
    name: &'static str,
}

impl Check for StaticCheck {
    fn name(&self) -> &'static str {
        self.name
    }

    fn description(&self) -> &'static str {
        "Reports one warning"
    }

    fn run(&self, _ctx: &ValidationContext) -> CheckResult<Vec<Finding>> {
        Ok(vec![Finding::new(self.name, Severity::Warning, "found something")])
    }
}

struct FailingCheck;

impl Check for FailingCheck {
    fn name(&self) -> &'static str {
        "failing"
    }

    fn description(&self) -> &'static str {
        "Always fails"
    }

    fn run(&self, _ctx: &ValidationContext) -> CheckResult<Vec<Finding>> {
        Err(CheckError::Failed("boom".to_string()))
    }
}

struct SlowCheck;

impl Check for SlowCheck {
    fn name(&self) -> &'static str {
        "slow"
    }

    fn description(&self) -> &'static str {
        "Sleeps past the deadline"
    }

    fn run(&self, _ctx: &ValidationContext) -> CheckResult<Vec<Finding>> {
        std::thread::sleep(Duration::from_millis(300));
        Ok(Vec::new())
    }
}

fn registry() -> CheckRegistry {
    let mut registry = CheckRegistry::new();
    registry.register(Arc::new(StaticCheck { name: "first" }));
    registry.register(Arc::new(StaticCheck { name: "second" }));
    registry.register(Arc::new(FailingCheck));
    registry.register(Arc::new(SlowCheck));
    registry
}

fn empty_context() -> Arc<ValidationContext> {
    let graph = ResourceGraph::build(Path::new("/repo"), Vec::new());
    Arc::new(ValidationContext::new(
        graph,
        Config::default(),
        DeprecationTable::default(),
    ))
}

fn types(findings: &[Finding]) -> Vec<&str> {
    findings.iter().map(|f| f.finding_type.as_str()).collect()
}

#[tokio::test]
async fn test_failing_check_does_not_fail_required_stage() {
    let pipeline = Pipeline::new(
        "test",
        "",
        vec![
            Stage::new("core", &["failing", "first"]).required(true),
            Stage::new("after", &["second"]),
        ],
    );
    let runner = CheckRunner::new(Duration::from_secs(5));

    let findings = pipeline
        .execute(&registry(), &runner, empty_context())
        .await
        .unwrap();

    assert_eq!(types(&findings), vec![VALIDATOR_ERROR, "first", "second"]);
    assert_eq!(findings[0].message, "Validator failing failed: boom");
}

#[tokio::test]
async fn test_broken_optional_stage_is_reported_and_skipped() {
    let pipeline = Pipeline::new(
        "test",
        "",
        vec![
            Stage::new("broken", &["first", "missing"]),
            Stage::new("after", &["second"]),
        ],
    );
    let runner = CheckRunner::new(Duration::from_secs(5));

    let findings = pipeline
        .execute(&registry(), &runner, empty_context())
        .await
        .unwrap();

    // No check of the broken stage ran
    assert_eq!(types(&findings), vec![PIPELINE_STAGE_ERROR, "second"]);
    assert_eq!(findings[0].severity, Severity::Error);
    assert_eq!(
        findings[0].message,
        "Stage 'broken' failed: validator 'missing' not found"
    );
}

#[tokio::test]
async fn test_broken_required_stage_aborts() {
    let pipeline = Pipeline::new(
        "test",
        "",
        vec![
            Stage::new("structure", &["missing"]).required(true),
            Stage::new("after", &["second"]),
        ],
    );
    let runner = CheckRunner::new(Duration::from_secs(5));

    let err = pipeline
        .execute(&registry(), &runner, empty_context())
        .await
        .unwrap_err();

    match err {
        PipelineError::RequiredStageFailed { stage, source } => {
            assert_eq!(stage, "structure");
            assert!(matches!(*source, PipelineError::UnknownCheck { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_timed_out_check_becomes_finding() {
    let pipeline = Pipeline::new(
        "test",
        "",
        vec![Stage::new("mixed", &["slow", "first"]).parallel(true).required(true)],
    );
    let runner = CheckRunner::new(Duration::from_millis(50));

    let findings = pipeline
        .execute(&registry(), &runner, empty_context())
        .await
        .unwrap();

    let mut found = types(&findings);
    found.sort();
    assert_eq!(found, vec!["first", VALIDATOR_TIMEOUT]);
}

#[tokio::test]
async fn test_condition_skips_stage() {
    let pipeline = Pipeline::new(
        "test",
        "",
        vec![
            Stage::new("big-repos", &["first"]).condition("resource_count > 0"),
            Stage::new("always", &["second"]).condition("not a condition at all"),
        ],
    );
    let runner = CheckRunner::new(Duration::from_secs(5));

    let findings = pipeline
        .execute(&registry(), &runner, empty_context())
        .await
        .unwrap();
    assert_eq!(types(&findings), vec!["second"]);
}

#[tokio::test]
async fn test_predefined_pipelines_run_builtin_checks() {
    let repo = tempfile::TempDir::new().unwrap();
    std::fs::write(
        repo.path().join("stray.yaml"),
        "apiVersion: extensions/v1beta1\nkind: Ingress\nmetadata:\n  name: web\n",
    )
    .unwrap();

    for name in Pipeline::names() {
        let validator = Validator::new(
            Config::default(),
            ValidatorOptions {
                pipeline: Some(name.to_string()),
                ..Default::default()
            },
        );
        let report = validator.validate(repo.path()).await.unwrap();
        assert!(
            report.findings.iter().all(|f| f.finding_type != PIPELINE_STAGE_ERROR),
            "{name}: {:?}",
            report.findings
        );
        let deprecated = report
            .findings
            .iter()
            .any(|f| f.finding_type == "deprecated-api");
        // The fast pipeline only runs the critical structure checks
        assert_eq!(deprecated, *name != "fast", "{name}: {:?}", report.findings);
    }
}
