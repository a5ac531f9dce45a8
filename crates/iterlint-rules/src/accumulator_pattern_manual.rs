//! Matcher for accumulators folded by hand inside `forEach`.
//!
//! # Rationale
//!
//! ```text
//! let salarySum = 0;
//! employees.forEach(e => { if (e.active) { salarySum += e.salary; } });
//! ```
//!
//! computes a single value through mutation. `filter`, `map` and `reduce`
//! express the same fold without a mutable variable.
//!
//! Only associative updates count (`+`, `*`, `&`, `|`, `^`, `&&`, `||` and
//! `concat`), and the accumulator must be seeded with a number or a
//! collection by the statement right before the loop.

use crate::shapes::manual_accumulator;
use iterlint_core::{Category, ConstructKind, Finding, IterationNode, Matcher};

/// Rule code for accumulator-pattern-manual.
pub const CODE: &str = "IT005";

/// Rule name for accumulator-pattern-manual.
pub const NAME: &str = "accumulator-pattern-manual";

/// Flags a `forEach` whose sole effect updates a freshly seeded accumulator.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccumulatorPatternManual;

impl AccumulatorPatternManual {
    /// Creates the matcher.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Matcher for AccumulatorPatternManual {
    fn category(&self) -> Category {
        Category::AccumulatorPatternManual
    }

    fn check(&self, node: &IterationNode<'_>) -> Option<Finding> {
        if node.construct != ConstructKind::ForEach {
            return None;
        }
        let accumulator = manual_accumulator(node)?;
        let fix = node.dialect.chain(&[
            ConstructKind::Filter,
            ConstructKind::Map,
            ConstructKind::Reduce,
        ]);
        Some(Finding::at(
            node,
            self.category(),
            format!(
                "`{accumulator}` is accumulated by hand in {}(); use {fix} instead",
                node.construct_name()
            ),
            fix,
        ))
    }
}
