//! Rule registry: enabled matchers in priority order.

use crate::category::Category;
use crate::config::RuleConfig;
use crate::rule::MatcherBox;
use crate::traversal::IterationNode;
use crate::types::Finding;
use tracing::debug;

/// Holds the enabled matchers, ordered by category priority.
///
/// Order and membership are fixed at construction.
pub struct RuleRegistry {
    matchers: Vec<MatcherBox>,
    config: RuleConfig,
}

impl RuleRegistry {
    /// Builds a registry, dropping matchers for disabled categories.
    ///
    /// When two matchers share a category, the first one registered wins.
    #[must_use]
    pub fn new(matchers: Vec<MatcherBox>, config: RuleConfig) -> Self {
        let mut matchers: Vec<MatcherBox> = matchers
            .into_iter()
            .filter(|m| {
                let enabled = config.is_enabled(m.category());
                if !enabled {
                    debug!("Skipping disabled category: {}", m.category());
                }
                enabled
            })
            .collect();
        // stable sort keeps registration order among duplicates
        matchers.sort_by_key(|m| m.category());
        matchers.dedup_by_key(|m| m.category());

        Self { matchers, config }
    }

    /// Applies matchers in priority order; the first match wins.
    #[must_use]
    pub fn evaluate(&self, node: &IterationNode<'_>) -> Option<Finding> {
        self.matchers.iter().find_map(|m| {
            m.check(node)
                .map(|finding| finding.with_severity(self.config.severity(m.category())))
        })
    }

    /// Categories of the registered matchers, in evaluation order.
    #[must_use]
    pub fn categories(&self) -> Vec<Category> {
        self.matchers.iter().map(|m| m.category()).collect()
    }

    /// Number of registered matchers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    /// Whether no matcher is enabled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// The configuration the registry was built with.
    #[must_use]
    pub fn config(&self) -> &RuleConfig {
        &self.config
    }
}

impl std::fmt::Debug for RuleRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuleRegistry")
            .field("categories", &self.categories())
            .finish_non_exhaustive()
    }
}
