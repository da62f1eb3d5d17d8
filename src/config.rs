//! Evaluation settings for the join operators.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Default product size up to which [`JoinStrategy::Auto`] uses the nested loop.
pub const DEFAULT_NESTED_LOOP_THRESHOLD: usize = 64;

/// Algorithm used to evaluate a join.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum JoinStrategy {
    /// Pick per call from the input sizes and the join index
    #[default]
    Auto,
    /// Always sort both inputs and probe the inner one
    SortMerge,
    /// Always compare every pair of tuples
    NestedLoop,
}

/// Join evaluation settings. Every strategy yields the same relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JoinConfig {
    /// Algorithm selection
    pub strategy: JoinStrategy,
    /// Largest `|outer| * |inner|` evaluated with the nested loop under `Auto`
    pub nested_loop_threshold: usize,
}

impl Default for JoinConfig {
    fn default() -> Self {
        Self {
            strategy: JoinStrategy::Auto,
            nested_loop_threshold: DEFAULT_NESTED_LOOP_THRESHOLD,
        }
    }
}

impl JoinConfig {
    /// Settings that always use the given strategy.
    #[must_use]
    pub fn with_strategy(strategy: JoinStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }

    /// Resolves `Auto` for the given input sizes.
    ///
    /// Cartesian products (`constrained == false`) always take the nested
    /// loop since there is nothing to sort on.
    #[must_use]
    pub fn resolve(&self, outer: usize, inner: usize, constrained: bool) -> JoinStrategy {
        match self.strategy {
            JoinStrategy::Auto => {
                if !constrained || outer.saturating_mul(inner) <= self.nested_loop_threshold {
                    JoinStrategy::NestedLoop
                } else {
                    JoinStrategy::SortMerge
                }
            }
            fixed => fixed,
        }
    }
}
