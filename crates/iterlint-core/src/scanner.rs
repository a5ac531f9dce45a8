//! Single-file scan: traversal, matching, suppression and reporting.

use crate::allowance::check_allow;
use crate::context::FileContext;
use crate::frontend::{Dialect, Frontend, ParseError};
use crate::registry::RuleRegistry;
use crate::reporter::Reporter;
use crate::traversal::{CancelToken, MalformedTreeError, Traversal};
use crate::tree::Node;
use crate::types::Finding;
use tracing::debug;

/// Findings of one file, in traversal order.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Findings, in traversal order.
    pub findings: Vec<Finding>,
    /// Whether the scan stopped early; `findings` is then partial.
    pub cancelled: bool,
}

/// Why a file could not be scanned.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The front-end rejected the source.
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// The lowered tree contains an ill-shaped construct.
    #[error(transparent)]
    Malformed(#[from] MalformedTreeError),
}

/// Runs a [`RuleRegistry`] over trees, one file at a time.
///
/// All state is scan-local, so one scanner may serve many threads.
#[derive(Debug)]
pub struct Scanner<'r> {
    registry: &'r RuleRegistry,
    cancel: Option<CancelToken>,
}

impl<'r> Scanner<'r> {
    /// Creates a scanner over a registry.
    #[must_use]
    pub fn new(registry: &'r RuleRegistry) -> Self {
        Self {
            registry,
            cancel: None,
        }
    }

    /// Sets a cancellation token.
    #[must_use]
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Scans an already lowered tree.
    ///
    /// # Errors
    ///
    /// Returns [`MalformedTreeError`] on the first ill-shaped construct.
    pub fn scan(
        &self,
        tree: &Node,
        ctx: &FileContext<'_>,
        dialect: Dialect,
    ) -> Result<ScanReport, MalformedTreeError> {
        let mut traversal = Traversal::new(tree)
            .file(&ctx.relative_path)
            .dialect(dialect);
        if let Some(token) = &self.cancel {
            traversal = traversal.cancel(token.clone());
        }

        let mut reporter = Reporter::new();
        let mut nodes = traversal.iter();
        for node in &mut nodes {
            let node = node?;
            let Some(finding) = self.registry.evaluate(&node) else {
                continue;
            };

            let mut allow = check_allow(ctx.content, node.span.line, finding.category);
            if !allow.is_allowed() && node.start_line() < node.span.line {
                allow = check_allow(ctx.content, node.start_line(), finding.category);
            }
            if allow.is_allowed() {
                debug!(
                    "Allowed {} at {}: {}",
                    finding.category,
                    finding.location,
                    allow.reason().unwrap_or("no reason given")
                );
                continue;
            }
            reporter.push(finding);
        }

        Ok(ScanReport {
            findings: reporter.finish(),
            cancelled: nodes.was_cancelled(),
        })
    }

    /// Parses source with a front-end and scans it.
    ///
    /// # Errors
    ///
    /// Returns [`ScanError`] if parsing fails or the tree is malformed.
    pub fn scan_source(
        &self,
        frontend: &dyn Frontend,
        ctx: &FileContext<'_>,
    ) -> Result<ScanReport, ScanError> {
        let tree = frontend.parse(ctx.content)?;
        Ok(self.scan(&tree, ctx, frontend.dialect())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::category::Category;
    use crate::config::RuleConfig;
    use crate::frontend::RustFrontend;
    use crate::rule::Matcher;
    use crate::traversal::IterationNode;
    use crate::tree::ConstructKind;
    use std::path::Path;

    struct DiscardedMap;

    impl Matcher for DiscardedMap {
        fn category(&self) -> Category {
            Category::MapForSideEffectOnly
        }

        fn check(&self, node: &IterationNode<'_>) -> Option<Finding> {
            (node.construct == ConstructKind::Map && !node.result_used).then(|| {
                Finding::at(node, self.category(), "map() result is discarded", "for_each")
            })
        }
    }

    fn registry() -> RuleRegistry {
        RuleRegistry::new(vec![Box::new(DiscardedMap)], RuleConfig::default())
    }

    const SOURCE: &str = "fn f() {
    xs.iter().map(save);
    // iterlint: allow(IT002) reason=\"benchmark\"
    xs.iter().map(save);
    let kept = xs.iter().map(save);
    ys.iter().map(save);
}
";

    #[test]
    fn scans_in_traversal_order_with_suppression() {
        let registry = registry();
        let ctx = FileContext::new(Path::new("/p/src/lib.rs"), SOURCE, Path::new("/p"));
        let report = Scanner::new(&registry)
            .scan_source(&RustFrontend::new(), &ctx)
            .unwrap();
        let lines: Vec<usize> = report.findings.iter().map(|f| f.location.line).collect();
        assert_eq!(lines, vec![2, 6]);
        assert_eq!(report.findings[0].location.file, Path::new("src/lib.rs"));
        assert!(!report.cancelled);
    }

    #[test]
    fn idempotent_over_the_same_tree() {
        let registry = registry();
        let ctx = FileContext::new(Path::new("/p/lib.rs"), SOURCE, Path::new("/p"));
        let tree = RustFrontend::new().parse(SOURCE).unwrap();
        let scanner = Scanner::new(&registry);
        let first = scanner.scan(&tree, &ctx, Dialect::Rust).unwrap();
        let second = scanner.scan(&tree, &ctx, Dialect::Rust).unwrap();
        assert_eq!(first.findings, second.findings);
    }

    #[test]
    fn cancelled_scan_returns_partial_results() {
        let registry = registry();
        let ctx = FileContext::new(Path::new("/p/lib.rs"), SOURCE, Path::new("/p"));
        let token = CancelToken::new();
        token.cancel();
        let report = Scanner::new(&registry)
            .with_cancel(token)
            .scan_source(&RustFrontend::new(), &ctx)
            .unwrap();
        assert!(report.cancelled);
        assert!(report.findings.is_empty());
    }

    #[test]
    fn parse_errors_surface() {
        let registry = registry();
        let ctx = FileContext::new(Path::new("/p/lib.rs"), "fn (", Path::new("/p"));
        let err = Scanner::new(&registry)
            .scan_source(&RustFrontend::new(), &ctx)
            .unwrap_err();
        assert!(matches!(err, ScanError::Parse(_)));
    }
}
