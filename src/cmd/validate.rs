//! Validate command - surface rows that fail or need review without a full report

use crate::cmd::InputArgs;
use crate::core::{RowFailure, TaxReport};
use clap::Args;
use serde::Serialize;

#[derive(Args, Debug)]
pub struct ValidateCommand {
    #[command(flatten)]
    input: InputArgs,

    /// Output as JSON instead of formatted text
    #[arg(long)]
    json: bool,

    /// Also fail when results carry warnings
    #[arg(long)]
    strict: bool,
}

/// A validation issue for output
#[derive(Debug, Clone, Serialize)]
struct ValidationIssue {
    row: usize,
    #[serde(rename = "type")]
    issue_type: String,
    severity: Severity,
    message: String,
}

#[derive(Debug, Clone, Copy, Serialize)]
enum Severity {
    Error,
    Warning,
}

/// JSON output structure
#[derive(Debug, Serialize)]
struct ValidationOutput {
    rows_processed: usize,
    issue_count: usize,
    issues: Vec<ValidationIssue>,
}

impl ValidateCommand {
    pub fn exec(&self) -> anyhow::Result<()> {
        let report = self.input.calculate()?;
        let issues = collect_issues(&report);

        if self.json {
            let output = ValidationOutput {
                rows_processed: report.results.len(),
                issue_count: issues.len(),
                issues: issues.clone(),
            };
            println!("{}", serde_json::to_string_pretty(&output)?);
        } else {
            print_text(&issues, report.results.len());
        }

        // Exit with code 1 on row errors, or on any issue with --strict
        if failed(&report, self.strict) {
            std::process::exit(1);
        }
        Ok(())
    }
}

fn failed(report: &TaxReport, strict: bool) -> bool {
    if strict {
        report.has_issues()
    } else {
        !report.errors.is_empty()
    }
}

fn collect_issues(report: &TaxReport) -> Vec<ValidationIssue> {
    let errors = report.errors.iter().map(|e| ValidationIssue {
        row: e.row,
        issue_type: failure_type_name(&e.failure).to_string(),
        severity: Severity::Error,
        message: e.failure.to_string(),
    });
    let warnings = report.results.iter().flat_map(|r| {
        r.warnings.iter().map(|w| ValidationIssue {
            row: r.row,
            issue_type: w.name().to_string(),
            severity: Severity::Warning,
            message: w.to_string(),
        })
    });

    let mut issues: Vec<_> = errors.chain(warnings).collect();
    issues.sort_by_key(|i| i.row);
    issues
}

fn failure_type_name(failure: &RowFailure) -> &'static str {
    match failure {
        RowFailure::MissingValue { .. } => "MissingValue",
        RowFailure::InvalidDate { .. } => "InvalidDate",
        RowFailure::InvalidNumber { .. } => "InvalidNumber",
        RowFailure::Overflow { .. } => "Overflow",
    }
}

fn print_text(issues: &[ValidationIssue], processed: usize) {
    println!();
    println!("VALIDATION RESULTS ({} row(s) processed)", processed);
    println!();

    if issues.is_empty() {
        println!("\u{2713} No issues found.");
        return;
    }

    println!("\u{26A0} {} issue(s) found:", issues.len());
    println!();
    for (i, issue) in issues.iter().enumerate() {
        let severity = match issue.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        println!(
            "  {}. Row {} [{}] {}: {}",
            i + 1,
            issue.row,
            severity,
            issue.issue_type,
            issue.message
        );
    }
    println!();
}
