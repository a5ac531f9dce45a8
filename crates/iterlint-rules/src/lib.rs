//! # iterlint-rules
//!
//! Built-in matchers for the five iteration misuse categories.
//!
//! ## Available Matchers
//!
//! | Code | Name | Suggests |
//! |------|------|----------|
//! | IT001 | `IndexedLoopWithoutIndexUse` | `forEach` or `map` |
//! | IT002 | `MapForSideEffectOnly` | `forEach` |
//! | IT003 | `ForEachBuildingCollection` | `map` |
//! | IT004 | `ForEachWithFilterConditional` | `filter + map` or `filter + forEach` |
//! | IT005 | `AccumulatorPatternManual` | `filter + map + reduce` |
//!
//! ## Usage
//!
//! ```ignore
//! use iterlint_core::{Analyzer, RuleConfig};
//! use iterlint_rules::all_matchers;
//!
//! let analyzer = Analyzer::builder()
//!     .root("./src")
//!     .matchers(all_matchers())
//!     .rule_config(RuleConfig::default())
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod accumulator_pattern_manual;
pub mod for_each_building_collection;
pub mod for_each_with_filter_conditional;
pub mod indexed_loop_without_index_use;
pub mod map_for_side_effect_only;
mod presets;
mod shapes;

pub use accumulator_pattern_manual::AccumulatorPatternManual;
pub use for_each_building_collection::ForEachBuildingCollection;
pub use for_each_with_filter_conditional::ForEachWithFilterConditional;
pub use indexed_loop_without_index_use::IndexedLoopWithoutIndexUse;
pub use map_for_side_effect_only::MapForSideEffectOnly;
pub use presets::{all_matchers, registry};

/// Re-export core types for convenience.
pub use iterlint_core::{Category, Finding, Matcher, Severity};
