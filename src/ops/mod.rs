//! Relational operators over [`Relation`](crate::Relation)s.
//!
//! Operators never mutate their inputs; each returns a fresh relation.
//! Index arrays follow one convention throughout: a negative entry means
//! "not involved", a non-negative entry names a column or a destination.

use std::cmp::Ordering;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::term::Term;

pub mod builtin_eval;
pub mod fused;
pub mod join;
pub mod project;
pub mod select;
pub mod setops;

pub use builtin_eval::evaluate_builtin;
pub use fused::FusedJoin;
pub use join::{join, join_complement, semi_join, Join, Side};
pub use project::{optimize_projection, project};
pub use select::{select, select_groups, select_pattern, ColumnFilter, Selection};
pub use setops::{difference, union};

/// How a column of the inner relation must relate to the paired column of
/// the outer relation.
///
/// `LessThan` keeps pairs whose inner value is less than the outer value.
/// `Equals` and `NotEqual` are structural; the ordering conditions compare
/// values, so `1` and `1.0` are neither less nor greater than each other,
/// and values of unrelated kinds satisfy none of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum JoinCondition {
    /// inner == outer
    #[default]
    Equals,
    /// inner != outer
    NotEqual,
    /// inner < outer
    LessThan,
    /// inner > outer
    GreaterThan,
    /// inner <= outer
    LessOrEqual,
    /// inner >= outer
    GreaterOrEqual,
}

impl JoinCondition {
    /// Whether `inner` stands in this relation to `outer`.
    #[must_use]
    pub fn holds(self, outer: &Term, inner: &Term) -> bool {
        let ord = match self {
            Self::Equals => return inner == outer,
            Self::NotEqual => return inner != outer,
            _ => match inner.compare_value(outer) {
                Some(ord) => ord,
                None => return false,
            },
        };
        match self {
            Self::Equals | Self::NotEqual => false,
            Self::LessThan => ord == Ordering::Less,
            Self::GreaterThan => ord == Ordering::Greater,
            Self::LessOrEqual => ord != Ordering::Greater,
            Self::GreaterOrEqual => ord != Ordering::Less,
        }
    }

    /// The condition with outer and inner swapped.
    #[must_use]
    pub fn mirrored(self) -> Self {
        match self {
            Self::LessThan => Self::GreaterThan,
            Self::GreaterThan => Self::LessThan,
            Self::LessOrEqual => Self::GreaterOrEqual,
            Self::GreaterOrEqual => Self::LessOrEqual,
            other => other,
        }
    }

    // Inner tuples sorted below the probe can only satisfy these.
    pub(crate) fn scans_head(self) -> bool {
        matches!(self, Self::LessThan | Self::LessOrEqual | Self::NotEqual)
    }

    // Backwards scan of the head over tuples whose leading key is
    // value-equal to the probe but sorts below it, e.g. `1` below `1.0`.
    pub(crate) fn scans_head_run(self) -> bool {
        self == Self::GreaterOrEqual
    }

    // Scan of the tail that stops when the first key leaves the probe value.
    pub(crate) fn scans_tail_equal(self) -> bool {
        matches!(self, Self::Equals | Self::LessOrEqual)
    }

    // Full scan of the tail.
    pub(crate) fn scans_tail_strict(self) -> bool {
        matches!(
            self,
            Self::GreaterThan | Self::GreaterOrEqual | Self::NotEqual
        )
    }

    // Whether `inner` is past the run of tuples equal to `outer` on the
    // leading key column.
    pub(crate) fn leaves_run(self, outer: &Term, inner: &Term) -> bool {
        match self {
            Self::Equals => inner != outer,
            _ => !inner.value_eq(outer),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_condition_reads_inner_against_outer() {
        let outer = Term::Integer(5);
        assert!(JoinCondition::LessThan.holds(&outer, &Term::Integer(3)));
        assert!(!JoinCondition::LessThan.holds(&outer, &Term::Integer(7)));
        assert!(JoinCondition::GreaterOrEqual.holds(&outer, &Term::Double(5.0)));
        assert!(JoinCondition::LessOrEqual.holds(&outer, &Term::Short(5)));
    }

    #[test]
    fn test_equals_is_structural() {
        assert!(JoinCondition::Equals.holds(&Term::Integer(1), &Term::Integer(1)));
        assert!(!JoinCondition::Equals.holds(&Term::Integer(1), &Term::Double(1.0)));
        assert!(!JoinCondition::NotEqual.holds(&Term::Integer(1), &Term::Integer(1)));
        assert!(JoinCondition::NotEqual.holds(&Term::Integer(1), &Term::Double(1.0)));
    }

    #[test]
    fn test_unrelated_kinds_fail_ordering_conditions() {
        let a = Term::string("a");
        let one = Term::Integer(1);
        for condition in [
            JoinCondition::LessThan,
            JoinCondition::GreaterThan,
            JoinCondition::LessOrEqual,
            JoinCondition::GreaterOrEqual,
        ] {
            assert!(!condition.holds(&a, &one), "{condition:?} should not hold");
        }
        assert!(JoinCondition::NotEqual.holds(&a, &one));
    }

    #[test]
    fn test_mirrored_swaps_sides() {
        let (a, b) = (Term::Integer(1), Term::Integer(2));
        for condition in [
            JoinCondition::Equals,
            JoinCondition::NotEqual,
            JoinCondition::LessThan,
            JoinCondition::GreaterThan,
            JoinCondition::LessOrEqual,
            JoinCondition::GreaterOrEqual,
        ] {
            assert_eq!(condition.holds(&a, &b), condition.mirrored().holds(&b, &a));
        }
    }
}
