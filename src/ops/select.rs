//! Selection by literal pattern, equality groups and thresholds.
//!
//! Equality literals are answered with a range scan: the relation is
//! re-indexed on the literal columns and only the run of tuples starting at
//! the literal probe is read. Without literals, the first threshold filter
//! bounds the scan through a one-tuple semi-join. Every remaining filter
//! and the group constraints are checked per candidate tuple.

use log::debug;

use crate::config::{JoinConfig, JoinStrategy};
use crate::error::{EvalError, Result};
use crate::ops::join::{Join, Side};
use crate::ops::JoinCondition;
use crate::relation::{Relation, SortOrder};
use crate::term::Term;
use crate::tuple::Tuple;

/// Constraint on a single column.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ColumnFilter {
    /// No constraint
    #[default]
    Any,
    /// The column equals the term
    Is(Term),
    /// The column differs from the term
    IsNot(Term),
    /// The column stands in the condition to the term, read as
    /// `column <condition> term`
    Compare(JoinCondition, Term),
}

impl ColumnFilter {
    /// Whether `value` passes this filter.
    #[must_use]
    pub fn accepts(&self, value: &Term) -> bool {
        match self {
            Self::Any => true,
            Self::Is(term) => value == term,
            Self::IsNot(term) => value != term,
            Self::Compare(condition, term) => condition.holds(term, value),
        }
    }
}

/// A conjunction of column filters and equality groups.
///
/// Group ids pair columns: columns sharing a positive id must hold equal
/// terms, columns sharing a negative id must each differ from the first
/// column carrying that id, and id 0 leaves a column out.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    filters: Vec<ColumnFilter>,
    groups: Vec<i32>,
}

impl Selection {
    /// A selection that keeps every tuple.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Equality literals for the `Some` positions of `pattern`.
    #[must_use]
    pub fn pattern(pattern: &[Option<Term>]) -> Self {
        Self {
            filters: pattern
                .iter()
                .map(|p| p.clone().map_or(ColumnFilter::Any, ColumnFilter::Is))
                .collect(),
            groups: Vec::new(),
        }
    }

    /// Equality and inequality groups, one id per column.
    #[must_use]
    pub fn groups(groups: &[i32]) -> Self {
        Self::new().with_groups(groups)
    }

    /// Adds group constraints to this selection.
    #[must_use]
    pub fn with_groups(mut self, groups: &[i32]) -> Self {
        self.groups = groups.to_vec();
        self
    }

    /// Sets the filter of `column`.
    #[must_use]
    pub fn filter(mut self, column: usize, filter: ColumnFilter) -> Self {
        if self.filters.len() <= column {
            self.filters.resize(column + 1, ColumnFilter::Any);
        }
        self.filters[column] = filter;
        self
    }

    /// Requires `column` to equal `term`.
    #[must_use]
    pub fn is(self, column: usize, term: Term) -> Self {
        self.filter(column, ColumnFilter::Is(term))
    }

    /// Requires `column` to differ from `term`.
    #[must_use]
    pub fn is_not(self, column: usize, term: Term) -> Self {
        self.filter(column, ColumnFilter::IsNot(term))
    }

    /// Requires `column <condition> term`.
    #[must_use]
    pub fn compare(self, column: usize, condition: JoinCondition, term: Term) -> Self {
        self.filter(column, ColumnFilter::Compare(condition, term))
    }

    /// Column filters, indexed by column.
    #[must_use]
    pub fn filters(&self) -> &[ColumnFilter] {
        &self.filters
    }

    /// Whether `tuple` passes every filter and group constraint.
    #[must_use]
    pub fn matches(&self, tuple: &Tuple) -> bool {
        self.filters
            .iter()
            .zip(tuple)
            .all(|(filter, value)| filter.accepts(value))
            && self.groups_hold(tuple)
    }

    fn groups_hold(&self, tuple: &Tuple) -> bool {
        let mut leaders: Vec<(i32, usize)> = Vec::new();
        for (column, &group) in self.groups.iter().enumerate() {
            if group == 0 {
                continue;
            }
            let Some(&(_, leader)) = leaders.iter().find(|(g, _)| *g == group) else {
                leaders.push((group, column));
                continue;
            };
            let same = tuple[column] == tuple[leader];
            if same != (group > 0) {
                return false;
            }
        }
        true
    }

    fn validate(&self, arity: usize) -> Result<()> {
        if self.filters.len() > arity {
            return Err(EvalError::precondition(
                "select",
                format!(
                    "filter on column {} exceeds arity {arity}",
                    self.filters.len() - 1
                ),
            ));
        }
        if !self.groups.is_empty() && self.groups.len() != arity {
            return Err(EvalError::precondition(
                "select",
                format!(
                    "{} group ids given for arity {arity}",
                    self.groups.len()
                ),
            ));
        }
        Ok(())
    }
}

/// Tuples of `relation` that satisfy `selection`.
///
/// # Errors
///
/// Returns [`EvalError::Precondition`] when the selection mentions columns
/// beyond the relation's arity or its group array has the wrong length.
pub fn select(relation: &Relation, selection: &Selection) -> Result<Relation> {
    selection.validate(relation.arity())?;
    let arity = relation.arity();
    let literals: Vec<(usize, &Term)> = selection
        .filters
        .iter()
        .enumerate()
        .filter_map(|(c, f)| match f {
            ColumnFilter::Is(term) => Some((c, term)),
            _ => None,
        })
        .collect();
    let threshold = selection
        .filters
        .iter()
        .enumerate()
        .find_map(|(c, f)| match f {
            ColumnFilter::Compare(condition, term) => Some((c, *condition, term)),
            _ => None,
        });

    let tuples: Vec<Tuple> = if !literals.is_empty() {
        debug!(
            "select: range scan of {} tuples on {} literal column(s)",
            relation.len(),
            literals.len()
        );
        let mut ranks = vec![0; arity];
        let mut probe = vec![None; arity];
        for (rank, &(column, term)) in literals.iter().enumerate() {
            ranks[column] = rank + 1;
            probe[column] = Some(term.clone());
        }
        let sorted = relation.reordered(SortOrder::from_ranks(&ranks));
        sorted
            .tail_set(&probe)
            .iter()
            .take_while(|t| literals.iter().all(|&(c, term)| &t[c] == term))
            .filter(|t| selection.matches(t))
            .cloned()
            .collect()
    } else if let Some((column, condition, term)) = threshold {
        debug!(
            "select: bounded scan of {} tuples on column {column} {condition:?} {term}",
            relation.len()
        );
        threshold_scan(relation, column, condition, term)?
            .iter()
            .filter(|t| selection.matches(t))
            .cloned()
            .collect()
    } else {
        debug!("select: full scan of {} tuples", relation.len());
        relation
            .iter()
            .filter(|t| selection.matches(t))
            .cloned()
            .collect()
    };
    Ok(Relation::from_unchecked(
        arity,
        relation.order().clone(),
        tuples,
    ))
}

// Tuples whose `column` stands in `condition` to `term`, found by joining
// the relation as inner side against the one-tuple relation `{(term)}`.
fn threshold_scan(
    relation: &Relation,
    column: usize,
    condition: JoinCondition,
    term: &Term,
) -> Result<Relation> {
    let target = i32::try_from(column)
        .map_err(|_| EvalError::precondition("select", format!("column {column} is too large")))?;
    let bound = Relation::from_unchecked(1, SortOrder::natural(1), vec![Tuple::new([term.clone()])]);
    Ok(Join::new(&bound, relation, &[target])?
        .condition(condition)
        .semi(Side::Inner)
        .config(JoinConfig::with_strategy(JoinStrategy::SortMerge))
        .evaluate())
}

/// Tuples matching the `Some` positions of `pattern`.
///
/// # Errors
///
/// Returns [`EvalError::Precondition`] when `pattern` does not have one
/// entry per column.
pub fn select_pattern(relation: &Relation, pattern: &[Option<Term>]) -> Result<Relation> {
    if pattern.len() != relation.arity() {
        return Err(EvalError::precondition(
            "select",
            format!(
                "pattern has {} entries, relation arity is {}",
                pattern.len(),
                relation.arity()
            ),
        ));
    }
    select(relation, &Selection::pattern(pattern))
}

/// Tuples satisfying the equality and inequality `groups`.
///
/// # Errors
///
/// Returns [`EvalError::Precondition`] when `groups` does not have one entry
/// per column.
pub fn select_groups(relation: &Relation, groups: &[i32]) -> Result<Relation> {
    if groups.len() != relation.arity() {
        return Err(EvalError::precondition(
            "select",
            format!(
                "{} group ids given for arity {}",
                groups.len(),
                relation.arity()
            ),
        ));
    }
    select(relation, &Selection::groups(groups))
}
