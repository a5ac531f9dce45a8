//! The five misuse categories, in matcher priority order.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A misuse category.
///
/// Variant order is the matcher priority: when several categories could
/// apply to one construct, the earliest wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Indexed loop that only uses the index to fetch the current element.
    IndexedLoopWithoutIndexUse,
    /// `map` whose result is thrown away.
    MapForSideEffectOnly,
    /// `forEach` that appends to a fresh collection.
    ForEachBuildingCollection,
    /// `forEach` whose body is a single guarding conditional.
    ForEachWithFilterConditional,
    /// `forEach` that folds into an accumulator declared just before it.
    AccumulatorPatternManual,
}

impl Category {
    /// All categories in priority order.
    pub const ALL: [Self; 5] = [
        Self::IndexedLoopWithoutIndexUse,
        Self::MapForSideEffectOnly,
        Self::ForEachBuildingCollection,
        Self::ForEachWithFilterConditional,
        Self::AccumulatorPatternManual,
    ];

    /// PascalCase name, as used in output and config tables.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::IndexedLoopWithoutIndexUse => "IndexedLoopWithoutIndexUse",
            Self::MapForSideEffectOnly => "MapForSideEffectOnly",
            Self::ForEachBuildingCollection => "ForEachBuildingCollection",
            Self::ForEachWithFilterConditional => "ForEachWithFilterConditional",
            Self::AccumulatorPatternManual => "AccumulatorPatternManual",
        }
    }

    /// kebab-case alias.
    #[must_use]
    pub fn kebab_name(self) -> &'static str {
        match self {
            Self::IndexedLoopWithoutIndexUse => "indexed-loop-without-index-use",
            Self::MapForSideEffectOnly => "map-for-side-effect-only",
            Self::ForEachBuildingCollection => "for-each-building-collection",
            Self::ForEachWithFilterConditional => "for-each-with-filter-conditional",
            Self::AccumulatorPatternManual => "accumulator-pattern-manual",
        }
    }

    /// Short code (`IT001`..`IT005`).
    #[must_use]
    pub fn code(self) -> &'static str {
        match self {
            Self::IndexedLoopWithoutIndexUse => "IT001",
            Self::MapForSideEffectOnly => "IT002",
            Self::ForEachBuildingCollection => "IT003",
            Self::ForEachWithFilterConditional => "IT004",
            Self::AccumulatorPatternManual => "IT005",
        }
    }

    /// 1-based priority; lower runs first.
    #[must_use]
    pub fn priority(self) -> u8 {
        match self {
            Self::IndexedLoopWithoutIndexUse => 1,
            Self::MapForSideEffectOnly => 2,
            Self::ForEachBuildingCollection => 3,
            Self::ForEachWithFilterConditional => 4,
            Self::AccumulatorPatternManual => 5,
        }
    }

    /// One-line description for `list-rules`.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::IndexedLoopWithoutIndexUse => {
                "Indexed loop that uses the index only to read the current element"
            }
            Self::MapForSideEffectOnly => "map() whose result is never used",
            Self::ForEachBuildingCollection => {
                "forEach() that appends to a collection declared just before it"
            }
            Self::ForEachWithFilterConditional => {
                "forEach() whose body is a single if guarding the whole effect"
            }
            Self::AccumulatorPatternManual => {
                "forEach() that accumulates into a variable declared just before it"
            }
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Returned when a string names no category.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category `{0}`")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|c| {
                c.name() == s || c.kebab_name() == s || c.code().eq_ignore_ascii_case(s)
            })
            .ok_or_else(|| UnknownCategory(s.to_string()))
    }
}
