//! Rule checks and their execution
//!
//! Every rule is a [`Check`]: a pure function from the shared
//! [`ValidationContext`] to a list of findings. Checks are registered by name
//! in a [`CheckRegistry`] and executed either directly by the [`runner`] or
//! stage by stage through a [`Pipeline`].

pub mod checks;
pub mod deprecations;
pub mod pipeline;
pub mod registry;
pub mod runner;

pub use deprecations::{Deprecation, DeprecationTable};
pub use pipeline::{Pipeline, PipelineError, PipelineResult, Stage};
pub use registry::CheckRegistry;
pub use runner::{CheckRunner, DEFAULT_CHECK_TIMEOUT};

use crate::context::ValidationContext;
use crate::models::ContentError;
use crate::results::Finding;

/// Errors a check may return instead of findings
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    #[error("{0}")]
    Failed(String),

    #[error("invalid resource content: {0}")]
    Content(#[from] ContentError),
}

/// Result type for check execution
pub type CheckResult<T> = std::result::Result<T, CheckError>;

/// A single validation rule
#[cfg_attr(test, mockall::automock)]
pub trait Check: Send + Sync {
    /// Registry name, e.g. `broken-references`
    fn name(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Inspect the context and report findings; must not mutate shared state
    fn run(&self, ctx: &ValidationContext) -> CheckResult<Vec<Finding>>;
}
