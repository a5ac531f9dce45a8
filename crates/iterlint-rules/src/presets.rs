//! Matcher sets and registry construction.

use crate::{
    AccumulatorPatternManual, ForEachBuildingCollection, ForEachWithFilterConditional,
    IndexedLoopWithoutIndexUse, MapForSideEffectOnly,
};
use iterlint_core::{MatcherBox, RuleConfig, RuleRegistry};
use tracing::debug;

/// Returns one matcher per category, in priority order.
///
/// Includes:
/// - `indexed-loop-without-index-use` (IT001)
/// - `map-for-side-effect-only` (IT002)
/// - `for-each-building-collection` (IT003)
/// - `for-each-with-filter-conditional` (IT004)
/// - `accumulator-pattern-manual` (IT005)
#[must_use]
pub fn all_matchers() -> Vec<MatcherBox> {
    vec![
        Box::new(IndexedLoopWithoutIndexUse::new()),
        Box::new(MapForSideEffectOnly::new()),
        Box::new(ForEachBuildingCollection::new()),
        Box::new(ForEachWithFilterConditional::new()),
        Box::new(AccumulatorPatternManual::new()),
    ]
}

/// Builds a registry of the built-in matchers under `config`.
#[must_use]
pub fn registry(config: RuleConfig) -> RuleRegistry {
    let registry = RuleRegistry::new(all_matchers(), config);
    debug!("Registered {} of 5 categories", registry.len());
    registry
}

#[cfg(test)]
mod tests {
    use super::*;
    use iterlint_core::{
        Category, Dialect, FileContext, Frontend, Preset, RustFrontend, Scanner, Severity,
    };
    use std::path::Path;

    fn scan(registry: &RuleRegistry, code: &str) -> Vec<(Category, Severity)> {
        let ctx = FileContext::new(Path::new("/p/lib.rs"), code, Path::new("/p"));
        let tree = RustFrontend::new().parse(code).unwrap();
        Scanner::new(registry)
            .scan(&tree, &ctx, Dialect::Rust)
            .unwrap()
            .findings
            .into_iter()
            .map(|f| (f.category, f.severity))
            .collect()
    }

    #[test]
    fn test_matchers_cover_every_category_in_order() {
        let categories: Vec<Category> = all_matchers().iter().map(|m| m.category()).collect();
        assert_eq!(categories, Category::ALL.to_vec());
    }

    #[test]
    fn test_rule_codes_match_categories() {
        let modules = [
            (
                crate::indexed_loop_without_index_use::CODE,
                crate::indexed_loop_without_index_use::NAME,
            ),
            (crate::map_for_side_effect_only::CODE, crate::map_for_side_effect_only::NAME),
            (crate::for_each_building_collection::CODE, crate::for_each_building_collection::NAME),
            (
                crate::for_each_with_filter_conditional::CODE,
                crate::for_each_with_filter_conditional::NAME,
            ),
            (crate::accumulator_pattern_manual::CODE, crate::accumulator_pattern_manual::NAME),
        ];
        for ((code, name), category) in modules.into_iter().zip(Category::ALL) {
            assert_eq!(code, category.code());
            assert_eq!(name, category.kebab_name());
        }
    }

    #[test]
    fn test_minimal_preset() {
        let registry = registry(RuleConfig::from_preset(Preset::Minimal));
        assert_eq!(
            registry.categories(),
            vec![
                Category::IndexedLoopWithoutIndexUse,
                Category::MapForSideEffectOnly
            ]
        );
    }

    #[test]
    fn test_one_finding_per_construct() {
        let code = r"
fn f(xs: &[Employee]) {
    let mut names = Vec::new();
    xs.iter().for_each(|e| {
        if e.active {
            names.push(e.name.clone());
        }
    });
    let mut total = 0;
    xs.iter().for_each(|e| {
        if e.active {
            total += e.salary;
        }
    });
    xs.iter().map(|e| e.save());
}
";
        let findings = scan(&registry(RuleConfig::default()), code);
        assert_eq!(
            findings,
            vec![
                (Category::ForEachWithFilterConditional, Severity::Warning),
                (Category::AccumulatorPatternManual, Severity::Warning),
                (Category::MapForSideEffectOnly, Severity::Warning),
            ]
        );
    }

    #[test]
    fn test_strict_preset_raises_severity() {
        let findings = scan(
            &registry(RuleConfig::from_preset(Preset::Strict)),
            "fn f() { xs.iter().map(save); }",
        );
        assert_eq!(
            findings,
            vec![(Category::MapForSideEffectOnly, Severity::Error)]
        );
    }
}
