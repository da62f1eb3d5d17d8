//! Sorted, duplicate-free tuple sets.
//!
//! A [`Relation`] keeps its tuples ordered by a [`SortOrder`], a permutation
//! of its columns. Re-indexing a relation on a different column priority
//! yields a copy whose ordering puts those columns first, which is what the
//! sort-merge join and the equality selection probe with
//! [`Relation::head_set`] and [`Relation::tail_set`].

use std::cmp::Ordering;
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{EvalError, Result};
use crate::term::Term;
use crate::tuple::Tuple;

/// Column priority used to order a relation's tuples.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SortOrder {
    columns: Vec<usize>,
}

impl SortOrder {
    /// Column order `0, 1, ..., arity - 1`.
    #[must_use]
    pub fn natural(arity: usize) -> Self {
        Self {
            columns: (0..arity).collect(),
        }
    }

    /// Builds an order from per-column ranks.
    ///
    /// Columns ranked `1..=max` come first in rank order; unranked columns
    /// (rank 0) follow in ascending column order. When two columns share a
    /// rank, only the leftmost one takes the ranked slot.
    #[must_use]
    pub fn from_ranks(ranks: &[usize]) -> Self {
        let max = ranks.iter().copied().max().unwrap_or(0);
        let mut columns = Vec::with_capacity(ranks.len());
        for rank in 1..=max {
            if let Some(column) = ranks.iter().position(|&r| r == rank) {
                columns.push(column);
            }
        }
        for column in 0..ranks.len() {
            if !columns.contains(&column) {
                columns.push(column);
            }
        }
        Self { columns }
    }

    /// Columns in priority order.
    #[must_use]
    pub fn columns(&self) -> &[usize] {
        &self.columns
    }

    /// Compares two tuples by this column priority.
    #[must_use]
    pub fn compare(&self, a: &Tuple, b: &Tuple) -> Ordering {
        for &c in &self.columns {
            let ord = a[c].cmp(&b[c]);
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }

    /// Compares a tuple against a probe, where `None` sorts below every term.
    fn compare_probe(&self, tuple: &Tuple, probe: &[Option<Term>]) -> Ordering {
        for &c in &self.columns {
            match probe.get(c) {
                Some(Some(p)) => {
                    let ord = tuple[c].cmp(p);
                    if ord != Ordering::Equal {
                        return ord;
                    }
                }
                _ => return Ordering::Greater,
            }
        }
        Ordering::Equal
    }
}

/// A set of tuples of one arity, kept sorted and free of duplicates.
///
/// Equality is set equality: two relations are equal when they hold the
/// same tuples, whatever their sort orders.
#[derive(Debug, Clone)]
#[cfg_attr(
    feature = "serde",
    derive(Serialize, Deserialize),
    serde(try_from = "RelationRepr", into = "RelationRepr")
)]
pub struct Relation {
    arity: usize,
    order: SortOrder,
    tuples: Vec<Tuple>,
}

/// Creates an empty relation of the given arity with the natural order.
#[must_use]
pub fn relation(arity: usize) -> Relation {
    Relation::new(arity)
}

impl Relation {
    /// Creates an empty relation with the natural column order.
    #[must_use]
    pub fn new(arity: usize) -> Self {
        Self {
            arity,
            order: SortOrder::natural(arity),
            tuples: Vec::new(),
        }
    }

    /// Creates an empty relation kept in the given column order.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::Precondition`] if `order` is not a permutation of
    /// the relation's columns.
    pub fn with_order(arity: usize, order: SortOrder) -> Result<Self> {
        let mut seen = vec![false; arity];
        for &c in order.columns() {
            match seen.get_mut(c) {
                Some(slot) if !*slot => *slot = true,
                _ => {
                    return Err(EvalError::precondition(
                        "relation",
                        format!("sort order {:?} is not a permutation of {arity} columns", order.columns()),
                    ))
                }
            }
        }
        if order.columns().len() != arity {
            return Err(EvalError::precondition(
                "relation",
                format!("sort order {:?} is not a permutation of {arity} columns", order.columns()),
            ));
        }
        Ok(Self {
            arity,
            order,
            tuples: Vec::new(),
        })
    }

    /// Builds a relation from tuples, sorting and removing duplicates.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::Precondition`] if a tuple has the wrong arity.
    pub fn from_tuples(arity: usize, tuples: impl IntoIterator<Item = Tuple>) -> Result<Self> {
        let tuples: Vec<Tuple> = tuples.into_iter().collect();
        if let Some(bad) = tuples.iter().find(|t| t.arity() != arity) {
            return Err(EvalError::precondition(
                "relation",
                format!("tuple {bad} has arity {}, expected {arity}", bad.arity()),
            ));
        }
        Ok(Self::from_unchecked(arity, SortOrder::natural(arity), tuples))
    }

    // Callers guarantee every tuple has `arity` columns.
    pub(crate) fn from_unchecked(arity: usize, order: SortOrder, mut tuples: Vec<Tuple>) -> Self {
        tuples.sort_by(|a, b| order.compare(a, b));
        tuples.dedup();
        Self {
            arity,
            order,
            tuples,
        }
    }

    /// Number of columns of every tuple.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Number of tuples.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    /// Whether the relation holds no tuples.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    /// The current column priority.
    #[must_use]
    pub fn order(&self) -> &SortOrder {
        &self.order
    }

    /// Tuples in sorted order.
    #[must_use]
    pub fn tuples(&self) -> &[Tuple] {
        &self.tuples
    }

    /// Iterates over the tuples in sorted order.
    pub fn iter(&self) -> std::slice::Iter<'_, Tuple> {
        self.tuples.iter()
    }

    /// Smallest tuple under the current order.
    #[must_use]
    pub fn first(&self) -> Option<&Tuple> {
        self.tuples.first()
    }

    /// Largest tuple under the current order.
    #[must_use]
    pub fn last(&self) -> Option<&Tuple> {
        self.tuples.last()
    }

    /// Consumes the relation, returning its tuples in sorted order.
    #[must_use]
    pub fn into_tuples(self) -> Vec<Tuple> {
        self.tuples
    }

    /// Inserts a tuple, returning whether it was new.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::Precondition`] if the tuple has the wrong arity.
    pub fn add(&mut self, tuple: Tuple) -> Result<bool> {
        if tuple.arity() != self.arity {
            return Err(EvalError::precondition(
                "relation",
                format!("tuple {tuple} has arity {}, expected {}", tuple.arity(), self.arity),
            ));
        }
        match self.position(&tuple) {
            Ok(_) => Ok(false),
            Err(at) => {
                self.tuples.insert(at, tuple);
                Ok(true)
            }
        }
    }

    /// Inserts every tuple of `other`.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::Precondition`] if the arities differ.
    pub fn add_all(&mut self, other: &Relation) -> Result<()> {
        if other.arity != self.arity {
            return Err(EvalError::precondition(
                "relation",
                format!("cannot add arity {} tuples to arity {}", other.arity, self.arity),
            ));
        }
        let mut tuples = std::mem::take(&mut self.tuples);
        tuples.extend(other.tuples.iter().cloned());
        *self = Self::from_unchecked(self.arity, self.order.clone(), tuples);
        Ok(())
    }

    /// Whether the relation holds `tuple`.
    #[must_use]
    pub fn contains(&self, tuple: &Tuple) -> bool {
        tuple.arity() == self.arity && self.position(tuple).is_ok()
    }

    fn position(&self, tuple: &Tuple) -> std::result::Result<usize, usize> {
        self.tuples
            .binary_search_by(|probe| self.order.compare(probe, tuple))
    }

    /// Returns a copy ordered by the given column ranks.
    ///
    /// `ranks[i]` is the priority of column `i`: columns ranked `1, 2, ...`
    /// lead in rank order, columns ranked 0 follow in ascending order.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::Precondition`] if `ranks` does not have one entry
    /// per column.
    pub fn index_on(&self, ranks: &[usize]) -> Result<Relation> {
        if ranks.len() != self.arity {
            return Err(EvalError::precondition(
                "index_on",
                format!("{} ranks given for arity {}", ranks.len(), self.arity),
            ));
        }
        Ok(self.reordered(SortOrder::from_ranks(ranks)))
    }

    pub(crate) fn reordered(&self, order: SortOrder) -> Relation {
        if order == self.order {
            return self.clone();
        }
        Self::from_unchecked(self.arity, order, self.tuples.clone())
    }

    /// Tuples strictly below `probe` under the current order.
    ///
    /// `probe[i]` gives the value of column `i`; `None` is smaller than
    /// every term, so a probe with `None` in trailing priority columns sits
    /// just before the first tuple sharing its leading values.
    #[must_use]
    pub fn head_set(&self, probe: &[Option<Term>]) -> &[Tuple] {
        &self.tuples[..self.split_point(probe)]
    }

    /// Tuples at or above `probe` under the current order.
    #[must_use]
    pub fn tail_set(&self, probe: &[Option<Term>]) -> &[Tuple] {
        &self.tuples[self.split_point(probe)..]
    }

    fn split_point(&self, probe: &[Option<Term>]) -> usize {
        self.tuples
            .partition_point(|t| self.order.compare_probe(t, probe) == Ordering::Less)
    }
}

impl PartialEq for Relation {
    fn eq(&self, other: &Self) -> bool {
        self.arity == other.arity
            && self.len() == other.len()
            && self.tuples.iter().all(|t| other.contains(t))
    }
}

impl Eq for Relation {}

impl<'a> IntoIterator for &'a Relation {
    type Item = &'a Tuple;
    type IntoIter = std::slice::Iter<'a, Tuple>;

    fn into_iter(self) -> Self::IntoIter {
        self.tuples.iter()
    }
}

impl fmt::Display for Relation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, tuple) in self.tuples.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{tuple}")?;
        }
        f.write_str("}")
    }
}

/// Wire form of a relation; deserializing re-validates and re-sorts.
#[cfg(feature = "serde")]
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RelationRepr {
    arity: usize,
    tuples: Vec<Tuple>,
}

#[cfg(feature = "serde")]
impl TryFrom<RelationRepr> for Relation {
    type Error = EvalError;

    fn try_from(repr: RelationRepr) -> Result<Self> {
        Relation::from_tuples(repr.arity, repr.tuples)
    }
}

#[cfg(feature = "serde")]
impl From<Relation> for RelationRepr {
    fn from(relation: Relation) -> Self {
        Self {
            arity: relation.arity,
            tuples: relation.tuples,
        }
    }
}

#[cfg(feature = "serde")]
impl Relation {
    /// Serializes the relation as JSON.
    ///
    /// # Errors
    ///
    /// Returns the serializer error if a term cannot be written.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Reads a relation written by [`Relation::to_json`].
    ///
    /// # Errors
    ///
    /// Returns the deserializer error on malformed input or mixed arities.
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuple;

    fn sample() -> Relation {
        Relation::from_tuples(
            2,
            vec![tuple![3, 1], tuple![1, 2], tuple![2, 2], tuple![1, 2], tuple![1, 1]],
        )
        .expect("arity 2 tuples")
    }

    #[test]
    fn test_from_tuples_sorts_and_dedups() {
        let r = sample();
        assert_eq!(r.len(), 4, "Duplicate (1, 2) should be dropped");
        assert_eq!(
            r.tuples(),
            &[tuple![1, 1], tuple![1, 2], tuple![2, 2], tuple![3, 1]]
        );
    }

    #[test]
    fn test_arity_mismatch_is_rejected() {
        let err = Relation::from_tuples(2, vec![tuple![1]]).unwrap_err();
        assert!(matches!(err, EvalError::Precondition { .. }));

        let mut r = Relation::new(1);
        assert!(r.add(tuple![1, 2]).is_err());
        assert!(r.add(tuple![1]).expect("arity matches"));
        assert!(!r.add(tuple![1]).expect("arity matches"), "Second insert is a no-op");
    }

    #[test]
    fn test_sort_order_from_ranks() {
        assert_eq!(SortOrder::from_ranks(&[0, 1, 0]).columns(), &[1, 0, 2]);
        assert_eq!(SortOrder::from_ranks(&[2, 0, 1]).columns(), &[2, 0, 1]);
        assert_eq!(SortOrder::from_ranks(&[0, 0]).columns(), &[0, 1]);
    }

    #[test]
    fn test_index_on_reorders_without_changing_contents() {
        let r = sample();
        let by_second = r.index_on(&[0, 1]).expect("two ranks");
        assert_eq!(
            by_second.tuples(),
            &[tuple![1, 1], tuple![3, 1], tuple![1, 2], tuple![2, 2]]
        );
        assert_eq!(by_second, r, "Set equality ignores order");
        assert!(r.index_on(&[1]).is_err());
    }

    #[test]
    fn test_head_and_tail_sets() {
        let r = sample().index_on(&[0, 1]).expect("two ranks");
        let probe = [None, Some(Term::Integer(2))];
        assert_eq!(r.head_set(&probe), &[tuple![1, 1], tuple![3, 1]]);
        assert_eq!(r.tail_set(&probe), &[tuple![1, 2], tuple![2, 2]]);

        let exact = [Some(Term::Integer(2)), Some(Term::Integer(2))];
        assert_eq!(r.tail_set(&exact), &[tuple![2, 2]]);
    }

    #[test]
    fn test_contains_and_add_all() {
        let mut r = sample();
        assert!(r.contains(&tuple![2, 2]));
        assert!(!r.contains(&tuple![2, 3]));

        let other = Relation::from_tuples(2, vec![tuple![2, 3], tuple![1, 1]]).expect("arity 2");
        r.add_all(&other).expect("same arity");
        assert_eq!(r.len(), 5);
        assert!(r.add_all(&Relation::new(3)).is_err());
    }

    #[test]
    fn test_with_order_keeps_custom_priority() {
        let mut r = Relation::with_order(2, SortOrder::from_ranks(&[0, 1])).expect("permutation");
        r.add(tuple![1, 2]).expect("arity 2");
        r.add(tuple![2, 1]).expect("arity 2");
        assert_eq!(r.first(), Some(&tuple![2, 1]));
        assert!(Relation::with_order(3, SortOrder::natural(2)).is_err());
    }

    #[test]
    fn test_display() {
        let r = Relation::from_tuples(1, vec![tuple![2], tuple![1]]).expect("arity 1");
        assert_eq!(r.to_string(), "{(1), (2)}");
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_json_round_trip_restores_order() {
        let r = sample();
        let json = r.to_json().expect("serializable");
        let back = Relation::from_json(&json).expect("valid json");
        assert_eq!(back, r);
        assert_eq!(back.first(), Some(&tuple![1, 1]));

        let mixed = r#"{"arity":1,"tuples":[{"terms":[{"Integer":1},{"Integer":2}]}]}"#;
        assert!(Relation::from_json(mixed).is_err());
    }
}
