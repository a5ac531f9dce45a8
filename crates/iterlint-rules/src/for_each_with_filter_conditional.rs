//! Matcher for `forEach` callbacks that are one big `if`.
//!
//! # Rationale
//!
//! A callback whose whole body is `if (cond) { effect }` mixes selection
//! with action. Splitting the condition out into `filter` keeps each step
//! single-purpose.
//!
//! Guarded accumulator updates are left to
//! [`AccumulatorPatternManual`](crate::AccumulatorPatternManual).

use crate::shapes::{guarded_branch, manual_accumulator, push_into, sole_statement};
use iterlint_core::{Category, ConstructKind, Finding, IterationNode, Matcher};

/// Rule code for for-each-with-filter-conditional.
pub const CODE: &str = "IT004";

/// Rule name for for-each-with-filter-conditional.
pub const NAME: &str = "for-each-with-filter-conditional";

/// Flags `forEach` whose body is a single `if` without `else`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ForEachWithFilterConditional;

impl ForEachWithFilterConditional {
    /// Creates the matcher.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Matcher for ForEachWithFilterConditional {
    fn category(&self) -> Category {
        Category::ForEachWithFilterConditional
    }

    fn check(&self, node: &IterationNode<'_>) -> Option<Finding> {
        if node.construct != ConstructKind::ForEach || !node.guarded_side_effect {
            return None;
        }
        if manual_accumulator(node).is_some() {
            return None;
        }

        let branch = guarded_branch(node.body()?)?;
        let appends = sole_statement(branch).is_some_and(|s| push_into(s).is_some());
        let chain = if appends {
            [ConstructKind::Filter, ConstructKind::Map]
        } else {
            [ConstructKind::Filter, ConstructKind::ForEach]
        };
        let fix = node.dialect.chain(&chain);

        Some(Finding::at(
            node,
            self.category(),
            format!(
                "{}() callback only acts under a condition; use {fix} instead",
                node.construct_name()
            ),
            fix,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::check;

    fn check_code(code: &str) -> Vec<Finding> {
        check(&ForEachWithFilterConditional::new(), code)
    }

    #[test]
    fn test_guarded_push_suggests_filter_map() {
        let findings = check_code(
            r"
fn f(employees: &[Employee]) {
    let mut names = Vec::new();
    employees.iter().for_each(|e| {
        if e.years_at_company > 4 {
            names.push(e.name.clone());
        }
    });
}
",
        );
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].suggested_fix, "filter + map");
    }

    #[test]
    fn test_guarded_call_suggests_filter_for_each() {
        let findings = check_code(
            r"
fn f(employees: &[Employee]) {
    employees.iter().for_each(|e| {
        if e.active {
            e.notify();
        }
    });
}
",
        );
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].suggested_fix, "filter + for_each");
    }

    #[test]
    fn test_guarded_accumulator_left_alone() {
        let findings = check_code(
            r"
fn f(employees: &[Employee]) {
    let mut salary_sum = 0;
    employees.iter().for_each(|e| {
        if e.active {
            salary_sum += e.salary;
        }
    });
}
",
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_else_branch_not_flagged() {
        let findings = check_code(
            r"
fn f(employees: &[Employee]) {
    employees.iter().for_each(|e| {
        if e.active {
            e.notify();
        } else {
            e.archive();
        }
    });
}
",
        );
        assert!(findings.is_empty());
    }

    #[test]
    fn test_extra_statements_not_flagged() {
        let findings = check_code(
            r"
fn f(employees: &[Employee]) {
    employees.iter().for_each(|e| {
        audit(e);
        if e.active {
            e.notify();
        }
    });
}
",
        );
        assert!(findings.is_empty());
    }
}
