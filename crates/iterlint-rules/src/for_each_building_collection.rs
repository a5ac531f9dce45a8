//! Matcher for `forEach` loops that fill a freshly created collection.
//!
//! # Rationale
//!
//! ```text
//! const names = [];
//! employees.forEach(e => names.push(e.name));
//! ```
//!
//! is a `map` written by hand. The `map` form states the intent and lets
//! the collection be declared with its final contents.

use crate::shapes::{declared_before, push_into, sole_statement};
use iterlint_core::{Category, ConstructKind, Finding, IterationNode, Matcher};

/// Rule code for for-each-building-collection.
pub const CODE: &str = "IT003";

/// Rule name for for-each-building-collection.
pub const NAME: &str = "for-each-building-collection";

/// Flags `forEach` whose only effect is appending to an empty collection
/// declared by the statement before.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForEachBuildingCollection;

impl ForEachBuildingCollection {
    /// Creates the matcher.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Matcher for ForEachBuildingCollection {
    fn category(&self) -> Category {
        Category::ForEachBuildingCollection
    }

    fn check(&self, node: &IterationNode<'_>) -> Option<Finding> {
        if node.construct != ConstructKind::ForEach {
            return None;
        }
        let (target, _) = push_into(sole_statement(node.body()?)?)?;
        if !declared_before(node, target).is_some_and(|init| init.is_fresh_collection()) {
            return None;
        }

        let fix = node.dialect.construct_name(ConstructKind::Map);
        Some(Finding::at(
            node,
            self.category(),
            format!(
                "`{target}` is built by {}(); use {fix}() instead",
                node.construct_name()
            ),
            fix,
        ))
    }
}
