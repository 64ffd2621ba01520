//! Validation orchestration
//!
//! Ties the stages of a run together: load the repository, build the graph,
//! compute entry points and reachability, run the checks (directly or through
//! a pipeline) and hand back the findings.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{debug, info};

use crate::chart::{ChartFormat, ChartGenerator};
use crate::config::Config;
use crate::context::ValidationContext;
use crate::graph::ResourceGraph;
use crate::loader;
use crate::results::{self, AggregatedResults, AggregationOptions, Finding, ResultAggregator};
use crate::validators::{
    CheckRegistry, CheckRunner, DEFAULT_CHECK_TIMEOUT, DeprecationTable, Pipeline,
};

/// Run-level options that do not live in the configuration file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorOptions {
    /// Predefined pipeline to run instead of every registered check
    pub pipeline: Option<String>,
    /// Run checks concurrently when no pipeline is selected
    pub parallel: bool,
    pub check_timeout: Duration,
    /// Extra deprecated API catalog (`--yaml-path`)
    pub deprecated_apis_file: Option<PathBuf>,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            pipeline: None,
            parallel: false,
            check_timeout: DEFAULT_CHECK_TIMEOUT,
            deprecated_apis_file: None,
        }
    }
}

/// Validates repositories with one configuration
#[derive(Debug)]
pub struct Validator {
    config: Config,
    options: ValidatorOptions,
    registry: CheckRegistry,
}

/// Findings of one run together with the context they were computed from
#[derive(Debug)]
pub struct ValidationReport {
    pub context: Arc<ValidationContext>,
    pub findings: Vec<Finding>,
}

impl ValidationReport {
    /// Process exit code for these findings under the configured policy
    pub fn exit_code(&self) -> i32 {
        results::exit_code(&self.findings, &self.context.config.exit_codes)
    }

    pub fn aggregate(&self, options: &AggregationOptions) -> AggregatedResults {
        ResultAggregator::new(self.findings.clone()).aggregate(options)
    }
}

impl Validator {
    pub fn new(config: Config, options: ValidatorOptions) -> Self {
        Self {
            config,
            options,
            registry: CheckRegistry::with_builtin_checks(),
        }
    }

    /// Replace the check registry
    pub fn with_registry(mut self, registry: CheckRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn registry(&self) -> &CheckRegistry {
        &self.registry
    }

    /// Load, index and analyze a repository
    pub fn prepare(&self, repo: &Path) -> Result<ValidationContext> {
        info!(path = %repo.display(), "Validating repository");

        let loaded = loader::load_repository(repo, &self.config)
            .with_context(|| format!("Failed to load repository {}", repo.display()))?;
        debug!(
            files = loaded.files_scanned,
            resources = loaded.resources.len(),
            warnings = loaded.warnings.len(),
            "Loaded repository"
        );

        let graph = ResourceGraph::from_loaded(repo, loaded);
        let deprecations = DeprecationTable::load(
            &self.config.deprecated_apis,
            self.options.deprecated_apis_file.as_deref(),
        )?;

        let ctx = ValidationContext::new(graph, self.config.clone(), deprecations);
        info!(
            resources = ctx.graph.resource_count(),
            files = ctx.graph.file_count(),
            entry_points = ctx.entry_points.len(),
            orphans = ctx.reachability.orphans.len(),
            "Built resource graph"
        );
        Ok(ctx)
    }

    /// Run the checks against a prepared context
    ///
    /// Fails only when the selected pipeline is unknown or a required stage
    /// is structurally broken.
    pub async fn run(&self, ctx: Arc<ValidationContext>) -> Result<Vec<Finding>> {
        let runner = CheckRunner::new(self.options.check_timeout);

        let findings = match &self.options.pipeline {
            Some(name) => {
                let pipeline = Pipeline::by_name(name)?;
                pipeline
                    .execute(&self.registry, &runner, ctx)
                    .await
                    .with_context(|| format!("Pipeline '{}' aborted", name))?
            }
            None if self.options.parallel => {
                debug!(checks = self.registry.len(), "Running checks in parallel");
                runner.run_parallel(self.registry.all(), ctx).await
            }
            None => runner.run_sequential(self.registry.all(), ctx).await,
        };

        info!(findings = findings.len(), "Validation finished");
        Ok(findings)
    }

    /// Prepare and validate a repository
    pub async fn validate(&self, repo: &Path) -> Result<ValidationReport> {
        let context = Arc::new(self.prepare(repo)?);
        let findings = self.run(Arc::clone(&context)).await?;
        Ok(ValidationReport { context, findings })
    }

    /// Render a dependency chart, optionally for a single entry point
    pub fn chart(&self, repo: &Path, format: ChartFormat, entry_point: Option<&str>) -> Result<String> {
        let ctx = self.prepare(repo)?;
        let mut generator = ChartGenerator::from_context(&ctx);
        if let Some(name) = entry_point {
            generator = generator.focus(name)?;
        }
        Ok(generator.render(format)?)
    }
}
