//! Core types for findings and results.

use crate::category::Category;
use crate::config::ConfigError;
use crate::traversal::IterationNode;
use crate::tree::{ConstructKind, Span};
use miette::{Diagnostic, SourceSpan};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::str::FromStr;

/// Severity level for findings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational message, does not fail lint.
    Info,
    /// Warning that should be addressed.
    Warning,
    /// Error that must be fixed.
    Error,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

impl FromStr for Severity {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "info" => Ok(Self::Info),
            "warning" | "warn" => Ok(Self::Warning),
            "error" => Ok(Self::Error),
            other => Err(ConfigError::UnknownSeverity(other.to_string())),
        }
    }
}

/// Source code location.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// File path relative to the scan root.
    pub file: PathBuf,
    /// Line number (1-indexed).
    pub line: usize,
    /// Column number (1-indexed).
    pub column: usize,
    /// Byte offset in file (for miette integration).
    #[serde(skip)]
    pub offset: usize,
    /// Length of the span in bytes.
    #[serde(skip)]
    pub length: usize,
}

impl Location {
    /// Creates a new location with explicit values.
    #[must_use]
    pub fn new(file: PathBuf, line: usize, column: usize) -> Self {
        Self {
            file,
            line,
            column,
            offset: 0,
            length: 0,
        }
    }

    /// Creates a location from a tree span.
    #[must_use]
    pub fn from_span(file: PathBuf, span: Span) -> Self {
        Self::new(file, span.line, span.column).with_span(span.offset, span.length)
    }

    /// Sets the byte offset and length for this location.
    #[must_use]
    pub fn with_span(mut self, offset: usize, length: usize) -> Self {
        self.offset = offset;
        self.length = length;
        self
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.file.display(), self.line, self.column)
    }
}

/// One detected misuse of an iteration construct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Finding {
    /// Where the offending construct starts.
    #[serde(flatten)]
    pub location: Location,
    /// Misuse category.
    pub category: Category,
    /// Severity, as configured for the category.
    pub severity: Severity,
    /// The construct that was flagged.
    pub construct: ConstructKind,
    /// Human-readable message.
    pub message: String,
    /// Construct(s) that express the same computation more clearly.
    pub suggested_fix: String,
}

impl Finding {
    /// Creates a new finding with warning severity.
    #[must_use]
    pub fn new(
        location: Location,
        category: Category,
        construct: ConstructKind,
        message: impl Into<String>,
        suggested_fix: impl Into<String>,
    ) -> Self {
        Self {
            location,
            category,
            severity: Severity::Warning,
            construct,
            message: message.into(),
            suggested_fix: suggested_fix.into(),
        }
    }

    /// Creates a finding located at an iteration node.
    #[must_use]
    pub fn at(
        node: &IterationNode<'_>,
        category: Category,
        message: impl Into<String>,
        suggested_fix: impl Into<String>,
    ) -> Self {
        Self::new(
            node.location(),
            category,
            node.construct,
            message,
            suggested_fix,
        )
    }

    /// Overrides the severity.
    #[must_use]
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }

    /// Formats the finding for terminal output.
    #[must_use]
    pub fn format(&self) -> String {
        use std::fmt::Write;
        let mut output = format!(
            "{} {} at {}\n",
            self.category.code(),
            self.category,
            self.location,
        );
        let _ = writeln!(output, "  {}: {}", self.severity, self.message);
        let _ = writeln!(output, "  = help: use {}", self.suggested_fix);
        output
    }
}

impl std::fmt::Display for Finding {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} [{}] {} (suggested: {})",
            self.location,
            self.severity,
            self.category.code(),
            self.message,
            self.suggested_fix
        )
    }
}

/// Converts a [`Finding`] to a miette Diagnostic for rich error display.
#[derive(Debug, thiserror::Error, Diagnostic)]
#[error("{message}")]
pub struct FindingDiagnostic {
    message: String,
    #[help]
    help: Option<String>,
    #[label("{label_message}")]
    span: SourceSpan,
    label_message: String,
}

impl From<&Finding> for FindingDiagnostic {
    fn from(f: &Finding) -> Self {
        Self {
            message: format!("[{}] {}", f.category.code(), f.message),
            help: Some(format!("use {}", f.suggested_fix)),
            span: SourceSpan::from((f.location.offset, f.location.length)),
            label_message: f.category.name().to_string(),
        }
    }
}

/// A file that could not be scanned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFailure {
    /// File path relative to the scan root.
    pub file: PathBuf,
    /// Why the scan failed.
    pub message: String,
}

/// Result of running lint analysis.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct LintResult {
    /// All findings, grouped by file in path order, traversal order within a file.
    pub findings: Vec<Finding>,
    /// Number of files checked.
    pub files_checked: usize,
    /// Files whose scan was aborted.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<FileFailure>,
    /// Whether the run was cancelled before finishing.
    #[serde(default)]
    pub cancelled: bool,
}

impl LintResult {
    /// Creates a new empty result.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Counts findings by severity as `(errors, warnings, infos)`.
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize, usize) {
        let count = |s: Severity| self.findings.iter().filter(|f| f.severity == s).count();
        (
            count(Severity::Error),
            count(Severity::Warning),
            count(Severity::Info),
        )
    }

    /// Checks if any finding meets or exceeds the given severity threshold.
    #[must_use]
    pub fn has_findings_at(&self, severity: Severity) -> bool {
        self.findings.iter().any(|f| f.severity >= severity)
    }

    /// Adds findings from another result.
    pub fn extend(&mut self, other: Self) {
        self.findings.extend(other.findings);
        self.failures.extend(other.failures);
        self.files_checked += other.files_checked;
        self.cancelled |= other.cancelled;
    }
}
