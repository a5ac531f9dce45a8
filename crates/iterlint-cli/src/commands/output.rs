//! Shared output formatting for lint results.

use anyhow::{Context, Result};
use iterlint_core::{FindingDiagnostic, LintResult, Severity};
use miette::{NamedSource, Report};
use std::path::Path;

use crate::OutputFormat;

/// Print lint results in the specified format.
///
/// `base` is the directory finding paths are relative to.
pub fn print(result: &LintResult, format: OutputFormat, base: &Path) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(result),
        OutputFormat::Json => return print_json(result),
        OutputFormat::Compact => print_compact(result),
        OutputFormat::Pretty => return print_pretty(result, base),
    }
    Ok(())
}

fn print_text(result: &LintResult) {
    for finding in &result.findings {
        let severity_indicator = match finding.severity {
            Severity::Error => "\x1b[31merror\x1b[0m",
            Severity::Warning => "\x1b[33mwarning\x1b[0m",
            Severity::Info => "\x1b[34minfo\x1b[0m",
        };

        println!(
            "{} {} at {}",
            finding.category.code(),
            finding.category,
            finding.location,
        );
        println!("  {}: {}", severity_indicator, finding.message);
        println!("  = help: use {}", finding.suggested_fix);
        println!();
    }
    print_summary(result);
}

fn print_summary(result: &LintResult) {
    let (errors, warnings, infos) = result.count_by_severity();

    for failure in &result.failures {
        println!(
            "\x1b[31mfailed\x1b[0m {}: {}",
            failure.file.display(),
            failure.message
        );
    }

    let summary_color = if errors > 0 {
        "\x1b[31m"
    } else if warnings > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    println!(
        "{}Found {} error(s), {} warning(s), {} info(s) in {} file(s)\x1b[0m",
        summary_color, errors, warnings, infos, result.files_checked
    );
    if result.cancelled {
        println!("Run was cancelled; results are partial");
    }
}

fn print_json(result: &LintResult) -> Result<()> {
    let json = serde_json::to_string_pretty(result)?;
    println!("{json}");
    Ok(())
}

fn print_compact(result: &LintResult) {
    for finding in &result.findings {
        println!("{finding}");
    }
}

fn print_pretty(result: &LintResult, base: &Path) -> Result<()> {
    for finding in &result.findings {
        let file = base.join(&finding.location.file);
        let content = std::fs::read_to_string(&file)
            .with_context(|| format!("Failed to read {}", file.display()))?;
        let report = Report::new(FindingDiagnostic::from(finding)).with_source_code(
            NamedSource::new(finding.location.file.display().to_string(), content),
        );
        println!("{report:?}");
    }
    print_summary(result);
    Ok(())
}
