//! Result aggregation: filtering, grouping, sorting and statistics

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::str::FromStr;

use serde::Serialize;

use super::{Finding, Severity};

/// Field used for grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Severity,
    Type,
    File,
    Resource,
}

/// Field used for sorting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    Severity,
    Type,
    File,
    Resource,
    Line,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl FromStr for GroupBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "severity" => Ok(GroupBy::Severity),
            "type" => Ok(GroupBy::Type),
            "file" => Ok(GroupBy::File),
            "resource" => Ok(GroupBy::Resource),
            _ => Err(format!("Unknown group field: {}", s)),
        }
    }
}

impl FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "severity" => Ok(SortBy::Severity),
            "type" => Ok(SortBy::Type),
            "file" => Ok(SortBy::File),
            "resource" => Ok(SortBy::Resource),
            "line" => Ok(SortBy::Line),
            _ => Err(format!("Unknown sort field: {}", s)),
        }
    }
}

impl FromStr for SortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(format!("Unknown sort order: {}", s)),
        }
    }
}

/// Aggregation options
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregationOptions {
    pub filter_by_severity: Vec<Severity>,
    pub filter_by_type: Vec<String>,
    /// Substrings matched against the finding's file
    pub filter_by_file: Vec<String>,
    /// Substrings matched against the finding's resource
    pub filter_by_resource: Vec<String>,
    pub only_errors: bool,
    pub only_warnings: bool,
    pub only_info: bool,
    pub group_by: Option<GroupBy>,
    pub sort_by: Option<SortBy>,
    pub sort_order: SortOrder,
    /// Zero means no limit
    pub limit: usize,
    pub include_stats: bool,
}

impl AggregationOptions {
    /// Named preset used by `--aggregate`
    pub fn preset(name: &str) -> Option<Self> {
        let options = match name {
            "errors-only" => Self {
                only_errors: true,
                sort_by: Some(SortBy::Severity),
                sort_order: SortOrder::Desc,
                include_stats: true,
                ..Default::default()
            },
            "warnings-only" => Self {
                only_warnings: true,
                sort_by: Some(SortBy::Type),
                sort_order: SortOrder::Asc,
                include_stats: true,
                ..Default::default()
            },
            "summary" => Self {
                limit: 50,
                sort_by: Some(SortBy::Severity),
                sort_order: SortOrder::Desc,
                include_stats: true,
                ..Default::default()
            },
            "grouped" => Self {
                group_by: Some(GroupBy::Type),
                sort_by: Some(SortBy::Type),
                sort_order: SortOrder::Asc,
                include_stats: true,
                ..Default::default()
            },
            _ => return None,
        };
        Some(options)
    }

    pub fn preset_names() -> &'static [&'static str] {
        &["errors-only", "warnings-only", "summary", "grouped"]
    }
}

/// A value with its occurrence count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Count {
    pub name: String,
    pub count: usize,
}

/// Statistics over the full, unfiltered finding set
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total: usize,
    pub errors: usize,
    pub warnings: usize,
    pub info: usize,
    pub by_type: BTreeMap<String, usize>,
    pub by_file: BTreeMap<String, usize>,
    pub most_common_types: Vec<Count>,
    pub most_common_files: Vec<Count>,
}

/// Output of [`ResultAggregator::aggregate`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregatedResults {
    pub results: Vec<Finding>,
    pub groups: BTreeMap<String, Vec<Finding>>,
    pub statistics: Statistics,
    pub filtered_count: usize,
    pub total_count: usize,
}

const MOST_COMMON_LIMIT: usize = 10;
const SUMMARY_TOP_TYPES: usize = 5;

impl AggregatedResults {
    /// Text summary of the counts and the most common finding types
    pub fn summary(&self) -> String {
        let mut out = String::new();
        let stats = &self.statistics;
        let _ = writeln!(out, "Validation Summary:");
        let _ = writeln!(out, "  Total Results: {}", self.total_count);
        let _ = writeln!(out, "  Filtered Results: {}", self.filtered_count);
        let _ = writeln!(out, "  Errors: {}", stats.errors);
        let _ = writeln!(out, "  Warnings: {}", stats.warnings);
        let _ = writeln!(out, "  Info: {}", stats.info);

        if !stats.most_common_types.is_empty() {
            let _ = writeln!(out, "\nMost Common Issues:");
            for item in stats.most_common_types.iter().take(SUMMARY_TOP_TYPES) {
                let _ = writeln!(out, "  {}: {}", item.name, item.count);
            }
        }
        out
    }
}

/// Filters, groups and sorts a finding list
pub struct ResultAggregator {
    findings: Vec<Finding>,
}

impl ResultAggregator {
    pub fn new(findings: Vec<Finding>) -> Self {
        Self { findings }
    }

    pub fn aggregate(&self, options: &AggregationOptions) -> AggregatedResults {
        let mut results: Vec<Finding> = self
            .findings
            .iter()
            .filter(|f| matches_filters(f, options))
            .cloned()
            .collect();

        let mut groups: BTreeMap<String, Vec<Finding>> = BTreeMap::new();
        if let Some(group_by) = options.group_by {
            for finding in &results {
                groups
                    .entry(group_key(finding, group_by))
                    .or_default()
                    .push(finding.clone());
            }
        }

        if let Some(sort_by) = options.sort_by {
            sort_findings(&mut results, sort_by, options.sort_order);
        }

        if options.limit > 0 {
            results.truncate(options.limit);
        }

        AggregatedResults {
            filtered_count: results.len(),
            total_count: self.findings.len(),
            statistics: statistics(&self.findings),
            groups,
            results,
        }
    }
}

fn matches_filters(finding: &Finding, options: &AggregationOptions) -> bool {
    if !options.filter_by_severity.is_empty()
        && !options.filter_by_severity.contains(&finding.severity)
    {
        return false;
    }
    if !options.filter_by_type.is_empty() && !options.filter_by_type.contains(&finding.finding_type)
    {
        return false;
    }
    if !options.filter_by_file.is_empty()
        && !options
            .filter_by_file
            .iter()
            .any(|p| finding.file.contains(p.as_str()))
    {
        return false;
    }
    if !options.filter_by_resource.is_empty()
        && !options
            .filter_by_resource
            .iter()
            .any(|p| finding.resource.contains(p.as_str()))
    {
        return false;
    }
    if options.only_errors && finding.severity != Severity::Error {
        return false;
    }
    if options.only_warnings && finding.severity != Severity::Warning {
        return false;
    }
    if options.only_info && finding.severity != Severity::Info {
        return false;
    }
    true
}

fn group_key(finding: &Finding, group_by: GroupBy) -> String {
    match group_by {
        GroupBy::Severity => finding.severity.to_string(),
        GroupBy::Type => finding.finding_type.clone(),
        GroupBy::File => finding.file.clone(),
        GroupBy::Resource => finding.resource.clone(),
    }
}

fn sort_findings(results: &mut [Finding], sort_by: SortBy, order: SortOrder) {
    results.sort_by(|a, b| {
        let ordering = match sort_by {
            SortBy::Severity => a.severity.rank().cmp(&b.severity.rank()),
            SortBy::Type => a.finding_type.cmp(&b.finding_type),
            SortBy::File => a.file.cmp(&b.file),
            SortBy::Resource => a.resource.cmp(&b.resource),
            SortBy::Line => a.line.cmp(&b.line),
        };
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

fn statistics(findings: &[Finding]) -> Statistics {
    let mut stats = Statistics {
        total: findings.len(),
        ..Default::default()
    };

    for finding in findings {
        match finding.severity {
            Severity::Error => stats.errors += 1,
            Severity::Warning => stats.warnings += 1,
            Severity::Info => stats.info += 1,
        }
        *stats.by_type.entry(finding.finding_type.clone()).or_default() += 1;
        *stats.by_file.entry(finding.file.clone()).or_default() += 1;
    }

    stats.most_common_types = most_common(&stats.by_type);
    stats.most_common_files = most_common(&stats.by_file);
    stats
}

/// Highest counts first; ties keep name order
fn most_common(counts: &BTreeMap<String, usize>) -> Vec<Count> {
    let mut items: Vec<Count> = counts
        .iter()
        .map(|(name, count)| Count {
            name: name.clone(),
            count: *count,
        })
        .collect();
    items.sort_by(|a, b| b.count.cmp(&a.count));
    items.truncate(MOST_COMMON_LIMIT);
    items
}
