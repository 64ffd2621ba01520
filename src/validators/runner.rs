//! Check execution
//!
//! Each check runs on a blocking task under a deadline. Whatever goes wrong
//! inside a single check (an error, a panic, a timeout) becomes one synthetic
//! finding for that check and never affects its siblings.

use std::any::Any;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinSet;
use tracing::{debug, warn};

use super::Check;
use crate::context::ValidationContext;
use crate::results::Finding;

/// Deadline applied to every check invocation unless configured otherwise
pub const DEFAULT_CHECK_TIMEOUT: Duration = Duration::from_secs(30);

pub const VALIDATOR_ERROR: &str = "validator-error";
pub const VALIDATOR_TIMEOUT: &str = "validator-timeout";

/// Runs checks against a shared context
#[derive(Debug, Clone, Copy)]
pub struct CheckRunner {
    timeout: Duration,
}

impl Default for CheckRunner {
    fn default() -> Self {
        Self::new(DEFAULT_CHECK_TIMEOUT)
    }
}

impl CheckRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run one check, converting failures into findings
    ///
    /// A timed-out check is reported but not stopped: its blocking thread keeps
    /// running in the background and whatever it returns is discarded.
    pub async fn run_check(&self, check: Arc<dyn Check>, ctx: Arc<ValidationContext>) -> Vec<Finding> {
        let name = check.name();
        debug!(check = name, "Running check");

        let task = tokio::task::spawn_blocking(move || check.run(&ctx));
        let findings = match tokio::time::timeout(self.timeout, task).await {
            Ok(Ok(Ok(findings))) => findings,
            Ok(Ok(Err(e))) => {
                warn!(check = name, error = %e, "Check failed");
                vec![validator_error(name, &e.to_string())]
            }
            Ok(Err(join_error)) => {
                let reason = if join_error.is_panic() {
                    format!("panicked: {}", panic_message(join_error.into_panic()))
                } else {
                    join_error.to_string()
                };
                warn!(check = name, error = %reason, "Check aborted");
                vec![validator_error(name, &reason)]
            }
            Err(_) => {
                warn!(check = name, timeout = ?self.timeout, "Check timed out");
                vec![Finding::error(
                    VALIDATOR_TIMEOUT,
                    format!(
                        "Validator {} timed out after {}s",
                        name,
                        self.timeout.as_secs_f64()
                    ),
                )
                .with_resource(name)]
            }
        };

        debug!(check = name, findings = findings.len(), "Check completed");
        findings
    }

    /// Run checks one after another; findings keep check order
    pub async fn run_sequential(
        &self,
        checks: &[Arc<dyn Check>],
        ctx: Arc<ValidationContext>,
    ) -> Vec<Finding> {
        let mut findings = Vec::new();
        for check in checks {
            findings.extend(self.run_check(Arc::clone(check), Arc::clone(&ctx)).await);
        }
        findings
    }

    /// Run checks concurrently; findings arrive in completion order
    pub async fn run_parallel(
        &self,
        checks: &[Arc<dyn Check>],
        ctx: Arc<ValidationContext>,
    ) -> Vec<Finding> {
        let mut set = JoinSet::new();
        for check in checks {
            let runner = *self;
            let check = Arc::clone(check);
            let ctx = Arc::clone(&ctx);
            set.spawn(async move { runner.run_check(check, ctx).await });
        }

        let mut findings = Vec::new();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(batch) => findings.extend(batch),
                Err(e) => {
                    warn!(error = %e, "Check task failed to join");
                    findings.push(validator_error("unknown", &e.to_string()));
                }
            }
        }
        findings
    }
}

fn validator_error(name: &str, reason: &str) -> Finding {
    Finding::error(
        VALIDATOR_ERROR,
        format!("Validator {} failed: {}", name, reason),
    )
    .with_resource(name)
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
