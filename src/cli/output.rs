//! Report rendering for stdout

use std::fmt::Write;

use clap::ValueEnum;

use crate::results::{AggregatedResults, Finding, Severity};

/// Report format selected with `--output`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    #[value(alias = "md")]
    Markdown,
    Json,
}

fn severity_icon(severity: Severity) -> &'static str {
    match severity {
        Severity::Error => "❌",
        Severity::Warning => "⚠️",
        Severity::Info => "ℹ️",
    }
}

/// Render findings, prefixed by the aggregation summary when one is given
pub fn render_report(
    findings: &[Finding],
    aggregated: Option<&AggregatedResults>,
    format: OutputFormat,
) -> serde_json::Result<String> {
    if format == OutputFormat::Json {
        return serde_json::to_string_pretty(findings).map(|json| json + "\n");
    }

    let mut out = String::new();
    if let Some(aggregated) = aggregated {
        if aggregated.total_count > 0 && format == OutputFormat::Text {
            out.push_str(&aggregated.summary());
            out.push('\n');
        }
    }

    match format {
        OutputFormat::Markdown => out.push_str(&render_markdown(findings)),
        _ => out.push_str(&render_text(findings)),
    }
    Ok(out)
}

/// One line per finding, or a success message
pub fn render_text(findings: &[Finding]) -> String {
    if findings.is_empty() {
        return "✅ All validations passed!\n".to_string();
    }

    let mut out = String::new();
    let _ = writeln!(out, "📋 Validation Results ({} issues found):\n", findings.len());
    for finding in findings {
        let _ = write!(
            out,
            "{} [{}] {}",
            severity_icon(finding.severity),
            finding.severity.as_str().to_uppercase(),
            finding.message
        );
        if !finding.file.is_empty() {
            let _ = write!(out, " (File: {}", finding.file);
            if finding.line > 0 {
                let _ = write!(out, ":{}", finding.line);
            }
            out.push(')');
        }
        if !finding.resource.is_empty() {
            let _ = write!(out, " (Resource: {})", finding.resource);
        }
        out.push('\n');
    }
    out
}

/// Markdown table of findings
pub fn render_markdown(findings: &[Finding]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "## GitOps Validator Results\n");
    let _ = writeln!(out, "{} issues found\n", findings.len());
    let _ = writeln!(out, "| Severity | Type | Message | File | Line | Resource |");
    let _ = writeln!(out, "|---|---|---|---|---:|---|");
    for finding in findings {
        let _ = writeln!(
            out,
            "| {} | {} | {} | {} | {} | {} |",
            finding.severity.as_str().to_uppercase(),
            finding.finding_type,
            finding.message.replace('|', "\\|"),
            finding.file,
            finding.line,
            finding.resource
        );
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn findings() -> Vec<Finding> {
        vec![
            Finding::error("broken-reference", "source 'repo' not found")
                .with_file("clusters/apps.yaml")
                .with_line(3)
                .with_resource("apps"),
            Finding::new("orphaned-resource", Severity::Warning, "a | b"),
        ]
    }

    #[test]
    fn test_text() {
        insta::assert_snapshot!(render_text(&findings()), @r"
        📋 Validation Results (2 issues found):

        ❌ [ERROR] source 'repo' not found (File: clusters/apps.yaml:3) (Resource: apps)
        ⚠️ [WARNING] a | b
        ");
        assert_eq!(render_text(&[]), "✅ All validations passed!\n");
    }

    #[test]
    fn test_markdown_escapes_pipes() {
        let output = render_markdown(&findings());
        assert!(output.contains("| ERROR | broken-reference | source 'repo' not found | clusters/apps.yaml | 3 | apps |"));
        assert!(output.contains("| WARNING | orphaned-resource | a \\| b |  | 0 |  |"));
    }

    #[test]
    fn test_json_omits_empty_fields() {
        let output = render_report(&findings(), None, OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value[0]["type"], "broken-reference");
        assert_eq!(value[0]["severity"], "error");
        assert!(value[1].get("file").is_none());
        assert!(value[1].get("line").is_none());
    }
}
