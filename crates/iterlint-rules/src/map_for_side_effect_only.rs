//! Matcher for `map` calls whose result is thrown away.
//!
//! # Rationale
//!
//! `map` exists to build a new collection. Calling it as a statement and
//! dropping the result hides that the callback is only run for its effects,
//! which is what `forEach` says directly.

use iterlint_core::{Category, ConstructKind, Finding, IterationNode, Matcher};

/// Rule code for map-for-side-effect-only.
pub const CODE: &str = "IT002";

/// Rule name for map-for-side-effect-only.
pub const NAME: &str = "map-for-side-effect-only";

/// Flags `map` whose return value is discarded.
#[derive(Debug, Clone, Copy, Default)]
pub struct MapForSideEffectOnly;

impl MapForSideEffectOnly {
    /// Creates the matcher.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Matcher for MapForSideEffectOnly {
    fn category(&self) -> Category {
        Category::MapForSideEffectOnly
    }

    fn check(&self, node: &IterationNode<'_>) -> Option<Finding> {
        if node.construct != ConstructKind::Map || node.result_used {
            return None;
        }
        let fix = node.dialect.construct_name(ConstructKind::ForEach);
        Some(Finding::at(
            node,
            self.category(),
            format!("result of map() is discarded; use {fix}() for side effects"),
            fix,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::check;

    fn check_code(code: &str) -> Vec<Finding> {
        check(&MapForSideEffectOnly::new(), code)
    }

    #[test]
    fn test_discarded_map() {
        let findings = check_code(
            r"
fn f(employees: &[Employee]) {
    employees.iter().map(|e| e.save());
}
",
        );
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].suggested_fix, "for_each");
        assert_eq!(findings[0].category, Category::MapForSideEffectOnly);
    }

    #[test]
    fn test_used_map_not_flagged() {
        let findings = check_code(
            r"
fn f(employees: &[Employee]) -> Vec<String> {
    let names = employees.iter().map(|e| e.name.clone());
    consume(employees.iter().map(|e| e.id));
    employees.iter().map(|e| e.name.clone()).collect()
}
",
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_other_constructs_ignored() {
        assert!(check_code("fn f() { xs.iter().for_each(save); }").is_empty());
    }
}
