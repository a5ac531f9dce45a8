//! Matcher trait for defining misuse categories.

use crate::category::Category;
use crate::traversal::IterationNode;
use crate::types::{Finding, Severity};

/// A pattern matcher for one misuse category.
///
/// Matchers are pure: the same node always yields the same answer, and
/// nothing outside the node is consulted.
///
/// # Example
///
/// ```ignore
/// use iterlint_core::{Category, Finding, IterationNode, Matcher, ConstructKind};
///
/// pub struct MapForSideEffectOnly;
///
/// impl Matcher for MapForSideEffectOnly {
///     fn category(&self) -> Category { Category::MapForSideEffectOnly }
///
///     fn check(&self, node: &IterationNode<'_>) -> Option<Finding> {
///         (node.construct == ConstructKind::Map && !node.result_used).then(|| {
///             Finding::at(node, self.category(), "result of map() is never used", "forEach")
///         })
///     }
/// }
/// ```
pub trait Matcher: Send + Sync {
    /// Category this matcher detects.
    fn category(&self) -> Category;

    /// Returns a brief description of what this matcher checks.
    fn description(&self) -> &'static str {
        self.category().description()
    }

    /// Severity used when the configuration does not set one.
    fn default_severity(&self) -> Severity {
        Severity::Warning
    }

    /// Checks one iteration node.
    fn check(&self, node: &IterationNode<'_>) -> Option<Finding>;
}

/// Type alias for boxed Matcher trait objects.
pub type MatcherBox = Box<dyn Matcher>;
