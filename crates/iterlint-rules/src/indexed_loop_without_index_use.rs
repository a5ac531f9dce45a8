//! Matcher for counting loops that only use the counter to read elements.
//!
//! # Rationale
//!
//! `for (let i = 0; i < xs.length; i++) { xs[i].save(); }` spells out the
//! bookkeeping that `forEach` and `map` already do. When the index never
//! takes part in the computation the loop is better written with the
//! higher-order construct, which also removes off-by-one mistakes.
//!
//! A body containing code the front-end could not lower is never flagged.

use crate::shapes::push_into;
use iterlint_core::{Category, ConstructKind, Finding, IndexUse, IterationNode, Matcher};

/// Rule code for indexed-loop-without-index-use.
pub const CODE: &str = "IT001";

/// Rule name for indexed-loop-without-index-use.
pub const NAME: &str = "indexed-loop-without-index-use";

/// Flags indexed loops whose index is unused or only subscripts the sequence.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndexedLoopWithoutIndexUse;

impl IndexedLoopWithoutIndexUse {
    /// Creates the matcher.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Matcher for IndexedLoopWithoutIndexUse {
    fn category(&self) -> Category {
        Category::IndexedLoopWithoutIndexUse
    }

    fn check(&self, node: &IterationNode<'_>) -> Option<Finding> {
        if node.construct != ConstructKind::IndexedLoop || node.index_use == IndexUse::Other {
            return None;
        }

        let builds_collection = node
            .body()
            .and_then(|body| body.statements().last())
            .is_some_and(|last| push_into(last).is_some());
        let fix = if builds_collection {
            ConstructKind::Map
        } else {
            ConstructKind::ForEach
        };
        let fix = node.dialect.construct_name(fix);

        let message = match node.index_use {
            IndexUse::SubscriptOnly => {
                format!("index is only used to read the current element; use {fix}() instead")
            }
            _ => format!("index is never used; use {fix}() instead"),
        };
        Some(Finding::at(node, self.category(), message, fix))
    }
}
