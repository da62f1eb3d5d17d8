//! Joins between an outer and an inner relation.
//!
//! A join index has one entry per outer column: entry `c` names the inner
//! column paired with outer column `c`, or is negative when the outer column
//! is unconstrained. A pair of tuples joins when every paired inner value
//! stands in the join's [`JoinCondition`] to its outer value.
//!
//! The sort-merge evaluation sorts both relations on the paired columns and,
//! for each outer tuple, probes the inner relation with a partial tuple built
//! from the outer values. Depending on the condition it scans the inner
//! tuples below the probe, the run of tuples equal to the probe, or every
//! tuple from the probe onwards.

use log::{debug, trace};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::config::{JoinConfig, JoinStrategy};
use crate::error::{EvalError, Result};
use crate::ops::project::optimize_projection;
use crate::ops::setops::difference;
use crate::ops::JoinCondition;
use crate::relation::{Relation, SortOrder};
use crate::term::Term;
use crate::tuple::Tuple;

/// One of the two join inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Side {
    /// The left input
    Outer,
    /// The right input
    Inner,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Output {
    Concat,
    Semi(Side),
    Project(Vec<usize>),
}

/// A configured join, evaluated with [`Join::evaluate`].
///
/// ```rust
/// use rulecore::{tuple, Join, JoinCondition, Relation};
///
/// let r0 = Relation::from_tuples(2, vec![tuple![1, 2], tuple![3, 4]]).unwrap();
/// let r1 = Relation::from_tuples(2, vec![tuple![2, 9], tuple![4, 9]]).unwrap();
/// let joined = Join::new(&r0, &r1, &[-1, 0])
///     .unwrap()
///     .condition(JoinCondition::Equals)
///     .evaluate();
/// assert!(joined.contains(&tuple![1, 2, 2, 9]));
/// ```
#[derive(Debug, Clone)]
pub struct Join<'a> {
    outer: &'a Relation,
    inner: &'a Relation,
    keys: Vec<(usize, usize)>,
    condition: JoinCondition,
    output: Output,
    config: JoinConfig,
}

impl<'a> Join<'a> {
    /// Prepares an equality join of `outer` and `inner` over `index`.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::Precondition`] when `index` does not have one
    /// entry per outer column, names an inner column out of range, or names
    /// the same inner column twice.
    pub fn new(outer: &'a Relation, inner: &'a Relation, index: &[i32]) -> Result<Self> {
        if index.len() != outer.arity() {
            return Err(EvalError::precondition(
                "join",
                format!(
                    "index array has {} entries, outer arity is {}",
                    index.len(),
                    outer.arity()
                ),
            ));
        }
        let mut used = vec![false; inner.arity()];
        let mut keys = Vec::new();
        for (column, &target) in index.iter().enumerate() {
            let Ok(target) = usize::try_from(target) else {
                continue;
            };
            match used.get_mut(target) {
                Some(seen) if !*seen => {
                    *seen = true;
                    keys.push((column, target));
                }
                Some(_) => {
                    return Err(EvalError::precondition(
                        "join",
                        format!("inner column {target} is paired twice"),
                    ))
                }
                None => {
                    return Err(EvalError::precondition(
                        "join",
                        format!(
                            "inner column {target} is out of range for arity {}",
                            inner.arity()
                        ),
                    ))
                }
            }
        }
        Ok(Self {
            outer,
            inner,
            keys,
            condition: JoinCondition::Equals,
            output: Output::Concat,
            config: JoinConfig::default(),
        })
    }

    /// Sets the condition paired columns must satisfy.
    #[must_use]
    pub fn condition(mut self, condition: JoinCondition) -> Self {
        self.condition = condition;
        self
    }

    /// Emits only the tuple of the given side for each matching pair.
    #[must_use]
    pub fn semi(mut self, side: Side) -> Self {
        self.output = Output::Semi(side);
        self
    }

    /// Projects each concatenated pair through `index`, a destination array
    /// over the outer columns followed by the inner columns.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::Precondition`] when `index` does not cover both
    /// arities or names a destination twice.
    pub fn project(mut self, index: &[i32]) -> Result<Self> {
        let width = self.outer.arity() + self.inner.arity();
        if index.len() != width {
            return Err(EvalError::precondition(
                "join",
                format!(
                    "projection has {} entries, joined arity is {width}",
                    index.len()
                ),
            ));
        }
        self.output = Output::Project(optimize_projection(index)?);
        Ok(self)
    }

    /// Replaces the evaluation settings.
    #[must_use]
    pub fn config(mut self, config: JoinConfig) -> Self {
        self.config = config;
        self
    }

    /// Arity of the produced relation.
    #[must_use]
    pub fn output_arity(&self) -> usize {
        match &self.output {
            Output::Concat => self.outer.arity() + self.inner.arity(),
            Output::Semi(Side::Outer) => self.outer.arity(),
            Output::Semi(Side::Inner) => self.inner.arity(),
            Output::Project(sources) => sources.len(),
        }
    }

    /// Whether at least one column pair constrains the join.
    #[must_use]
    pub fn is_constrained(&self) -> bool {
        !self.keys.is_empty()
    }

    pub(crate) fn key_count(&self) -> usize {
        self.keys.len()
    }

    /// Whether the pair `(outer, inner)` satisfies the join condition.
    #[must_use]
    pub fn matches(&self, outer: &Tuple, inner: &Tuple) -> bool {
        self.keys
            .iter()
            .all(|&(o, i)| self.condition.holds(&outer[o], &inner[i]))
    }

    /// Evaluates with the strategy picked by the configuration.
    #[must_use]
    pub fn evaluate(&self) -> Relation {
        let strategy =
            self.config
                .resolve(self.outer.len(), self.inner.len(), self.is_constrained());
        debug!(
            "join: {} x {} tuples, {:?} on {:?}, {:?}",
            self.outer.len(),
            self.inner.len(),
            self.condition,
            self.keys,
            strategy
        );
        match strategy {
            JoinStrategy::NestedLoop => self.evaluate_nested_loop(),
            JoinStrategy::SortMerge | JoinStrategy::Auto => self.evaluate_sort_merge(),
        }
    }

    /// Compares every outer tuple with every inner tuple.
    #[must_use]
    pub fn evaluate_nested_loop(&self) -> Relation {
        let mut out = Vec::new();
        for t0 in self.outer {
            for t1 in self.inner {
                if self.matches(t0, t1) {
                    out.push(self.emit(t0, t1));
                }
            }
        }
        self.finish(out)
    }

    /// Sorts both inputs on the paired columns and probes the inner one.
    ///
    /// Unconstrained joins have nothing to sort on and fall back to the
    /// nested loop.
    #[must_use]
    pub fn evaluate_sort_merge(&self) -> Relation {
        let Some(&(lead_outer, lead_inner)) = self.keys.first() else {
            return self.evaluate_nested_loop();
        };
        let (outer_ranks, inner_ranks) = self.ranks();
        let outer = self.outer.reordered(SortOrder::from_ranks(&outer_ranks));
        let inner = self.inner.reordered(SortOrder::from_ranks(&inner_ranks));
        let condition = self.condition;

        let mut out = Vec::new();
        for t0 in &outer {
            let probe = self.probe(t0);
            let head = inner.head_set(&probe);
            let tail = inner.tail_set(&probe);
            let lead = &t0[lead_outer];
            let before = out.len();

            if condition.scans_head() {
                for t1 in head {
                    if self.matches(t0, t1) {
                        out.push(self.emit(t0, t1));
                    }
                }
            }
            if condition.scans_head_run() {
                for t1 in head.iter().rev() {
                    if condition.leaves_run(lead, &t1[lead_inner]) {
                        break;
                    }
                    if self.matches(t0, t1) {
                        out.push(self.emit(t0, t1));
                    }
                }
            }
            if condition.scans_tail_equal() {
                for t1 in tail {
                    if condition.leaves_run(lead, &t1[lead_inner]) {
                        break;
                    }
                    if self.matches(t0, t1) {
                        out.push(self.emit(t0, t1));
                    }
                }
            }
            if condition.scans_tail_strict() {
                for t1 in tail {
                    if self.matches(t0, t1) {
                        out.push(self.emit(t0, t1));
                    }
                }
            }
            trace!(
                "join probe {t0}: {} below, {} from probe, {} emitted",
                head.len(),
                tail.len(),
                out.len() - before
            );
        }
        self.finish(out)
    }

    // Paired columns get ranks 1, 2, ... in outer column order on both sides.
    fn ranks(&self) -> (Vec<usize>, Vec<usize>) {
        let mut outer = vec![0; self.outer.arity()];
        let mut inner = vec![0; self.inner.arity()];
        for (rank, &(o, i)) in self.keys.iter().enumerate() {
            outer[o] = rank + 1;
            inner[i] = rank + 1;
        }
        (outer, inner)
    }

    fn probe(&self, outer: &Tuple) -> Vec<Option<Term>> {
        let mut probe = vec![None; self.inner.arity()];
        for &(o, i) in &self.keys {
            probe[i] = Some(outer[o].clone());
        }
        probe
    }

    fn emit(&self, outer: &Tuple, inner: &Tuple) -> Tuple {
        match &self.output {
            Output::Concat => outer.concat(inner),
            Output::Semi(Side::Outer) => outer.clone(),
            Output::Semi(Side::Inner) => inner.clone(),
            Output::Project(sources) => {
                let split = outer.arity();
                sources
                    .iter()
                    .map(|&c| {
                        if c < split {
                            outer[c].clone()
                        } else {
                            inner[c - split].clone()
                        }
                    })
                    .collect()
            }
        }
    }

    fn finish(&self, tuples: Vec<Tuple>) -> Relation {
        let arity = self.output_arity();
        Relation::from_unchecked(arity, SortOrder::natural(arity), tuples)
    }
}

/// Joins `outer` and `inner` over `index`, concatenating matching pairs.
///
/// # Errors
///
/// Returns [`EvalError::Precondition`] for a malformed join index.
pub fn join(
    outer: &Relation,
    inner: &Relation,
    index: &[i32],
    condition: JoinCondition,
) -> Result<Relation> {
    Ok(Join::new(outer, inner, index)?.condition(condition).evaluate())
}

/// Tuples of one side that join with at least one tuple of the other.
///
/// # Errors
///
/// Returns [`EvalError::Precondition`] for a malformed join index.
pub fn semi_join(
    outer: &Relation,
    inner: &Relation,
    index: &[i32],
    condition: JoinCondition,
    side: Side,
) -> Result<Relation> {
    Ok(Join::new(outer, inner, index)?
        .condition(condition)
        .semi(side)
        .evaluate())
}

/// Tuples of `outer` with no equal partner in `inner`.
///
/// Every inner column must be paired through `index`, so the result is the
/// outer relation minus its equality semi-join with `inner`.
///
/// # Errors
///
/// Returns [`EvalError::Precondition`] for a malformed join index or one
/// that leaves an inner column unpaired.
pub fn join_complement(outer: &Relation, inner: &Relation, index: &[i32]) -> Result<Relation> {
    let join = Join::new(outer, inner, index)?;
    if join.key_count() != inner.arity() {
        return Err(EvalError::precondition(
            "join_complement",
            format!(
                "index pairs {} of {} inner columns",
                join.key_count(),
                inner.arity()
            ),
        ));
    }
    let matched = join.semi(Side::Outer).evaluate();
    difference(outer, &matched)
}
