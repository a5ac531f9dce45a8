//! Diagnostic reporter: collects findings in traversal order.

use crate::category::Category;
use crate::types::Finding;
use serde::Serialize;

/// A finding rendered as `{location, category, message, suggestedFix}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedFinding {
    /// `file:line:column`.
    pub location: String,
    /// Category name.
    pub category: Category,
    /// Human-readable message.
    pub message: String,
    /// Replacement construct(s).
    pub suggested_fix: String,
}

/// Owns the findings of one scan until they are emitted.
#[derive(Debug, Default)]
pub struct Reporter {
    findings: Vec<Finding>,
}

impl Reporter {
    /// Creates an empty reporter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a finding.
    pub fn push(&mut self, finding: Finding) {
        self.findings.push(finding);
    }

    /// Findings so far, in the order they were pushed.
    #[must_use]
    pub fn findings(&self) -> &[Finding] {
        &self.findings
    }

    /// Renders every finding.
    #[must_use]
    pub fn render(&self) -> Vec<RenderedFinding> {
        self.findings
            .iter()
            .map(|f| RenderedFinding {
                location: f.location.to_string(),
                category: f.category,
                message: f.message.clone(),
                suggested_fix: f.suggested_fix.clone(),
            })
            .collect()
    }

    /// Hands the findings over to the caller.
    #[must_use]
    pub fn finish(self) -> Vec<Finding> {
        self.findings
    }
}
