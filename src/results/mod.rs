//! Validation findings
//!
//! Checks emit a flat list of [`Finding`]s. Filtering, grouping and
//! statistics live in [`aggregation`].

pub mod aggregation;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::ExitCodesConfig;

pub use aggregation::{
    AggregatedResults, AggregationOptions, GroupBy, ResultAggregator, SortBy, SortOrder,
    Statistics,
};

/// Finding severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Info => "info",
        }
    }

    /// Higher is more severe
    pub fn rank(&self) -> u8 {
        match self {
            Severity::Error => 3,
            Severity::Warning => 2,
            Severity::Info => 1,
        }
    }

    /// Parse a configured severity, falling back to error
    pub fn parse_or_error(s: &str) -> Self {
        s.parse().unwrap_or(Severity::Error)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "error" => Ok(Severity::Error),
            "warning" => Ok(Severity::Warning),
            "info" => Ok(Severity::Info),
            _ => Err(format!("Unknown severity: {}", s)),
        }
    }
}

/// One reported validation issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finding {
    #[serde(rename = "type")]
    pub finding_type: String,
    pub severity: Severity,
    pub message: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub file: String,
    #[serde(default, skip_serializing_if = "is_zero")]
    pub line: usize,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resource: String,
}

fn is_zero(line: &usize) -> bool {
    *line == 0
}

impl Finding {
    pub fn new(finding_type: impl Into<String>, severity: Severity, message: impl Into<String>) -> Self {
        Self {
            finding_type: finding_type.into(),
            severity,
            message: message.into(),
            file: String::new(),
            line: 0,
            resource: String::new(),
        }
    }

    pub fn error(finding_type: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(finding_type, Severity::Error, message)
    }

    pub fn with_file(mut self, file: impl Into<String>) -> Self {
        self.file = file.into();
        self
    }

    pub fn with_line(mut self, line: usize) -> Self {
        self.line = line;
        self
    }

    pub fn with_resource(mut self, resource: impl Into<String>) -> Self {
        self.resource = resource.into();
        self
    }
}

/// Process exit code for a finding set
///
/// 1 for errors, 2 for warnings, 3 for info, each only when the matching
/// `fail-on-*` flag is set; 0 otherwise.
pub fn exit_code(findings: &[Finding], config: &ExitCodesConfig) -> i32 {
    let has = |severity: Severity| findings.iter().any(|f| f.severity == severity);

    if config.fail_on_errors && has(Severity::Error) {
        1
    } else if config.fail_on_warnings && has(Severity::Warning) {
        2
    } else if config.fail_on_info && has(Severity::Info) {
        3
    } else {
        0
    }
}
