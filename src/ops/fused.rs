//! Selection, join and projection evaluated as one operation.

use std::borrow::Cow;

use log::debug;

use crate::config::JoinConfig;
use crate::error::Result;
use crate::ops::join::{Join, Side};
use crate::ops::select::{select, Selection};
use crate::ops::JoinCondition;
use crate::relation::Relation;

/// A join whose inputs are filtered first and whose output may be a
/// semi-join side or a projection of the joined columns.
///
/// The result equals running [`select`] on each input, joining the
/// selections and projecting the join, without materialising the joined
/// relation before projection.
#[derive(Debug, Clone)]
pub struct FusedJoin {
    outer_selection: Option<Selection>,
    inner_selection: Option<Selection>,
    index: Vec<i32>,
    condition: JoinCondition,
    semi: Option<Side>,
    projection: Option<Vec<i32>>,
    config: JoinConfig,
}

impl FusedJoin {
    /// An equality join over `index` with no selections or projection.
    #[must_use]
    pub fn new(index: &[i32]) -> Self {
        Self {
            outer_selection: None,
            inner_selection: None,
            index: index.to_vec(),
            condition: JoinCondition::Equals,
            semi: None,
            projection: None,
            config: JoinConfig::default(),
        }
    }

    /// Filters the outer input before joining.
    #[must_use]
    pub fn select_outer(mut self, selection: Selection) -> Self {
        self.outer_selection = Some(selection);
        self
    }

    /// Filters the inner input before joining.
    #[must_use]
    pub fn select_inner(mut self, selection: Selection) -> Self {
        self.inner_selection = Some(selection);
        self
    }

    /// Sets the join condition.
    #[must_use]
    pub fn condition(mut self, condition: JoinCondition) -> Self {
        self.condition = condition;
        self
    }

    /// Emits the matching tuples of one side. Clears any projection.
    #[must_use]
    pub fn semi(mut self, side: Side) -> Self {
        self.semi = Some(side);
        self.projection = None;
        self
    }

    /// Projects the concatenated pairs through a destination array. Clears
    /// any semi-join side.
    #[must_use]
    pub fn project(mut self, index: &[i32]) -> Self {
        self.projection = Some(index.to_vec());
        self.semi = None;
        self
    }

    /// Replaces the join evaluation settings.
    #[must_use]
    pub fn config(mut self, config: JoinConfig) -> Self {
        self.config = config;
        self
    }

    /// Runs the operation on `outer` and `inner`.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::Precondition`](crate::EvalError::Precondition)
    /// when a selection, the join index or the projection does not fit the
    /// inputs.
    pub fn evaluate(&self, outer: &Relation, inner: &Relation) -> Result<Relation> {
        let outer = filtered(outer, self.outer_selection.as_ref())?;
        let inner = filtered(inner, self.inner_selection.as_ref())?;
        debug!(
            "fused join: {} x {} tuples after selection",
            outer.len(),
            inner.len()
        );
        let mut join = Join::new(&outer, &inner, &self.index)?
            .condition(self.condition)
            .config(self.config);
        if let Some(side) = self.semi {
            join = join.semi(side);
        }
        if let Some(projection) = &self.projection {
            join = join.project(projection)?;
        }
        Ok(join.evaluate())
    }
}

fn filtered<'r>(relation: &'r Relation, selection: Option<&Selection>) -> Result<Cow<'r, Relation>> {
    match selection {
        Some(selection) => Ok(Cow::Owned(select(relation, selection)?)),
        None => Ok(Cow::Borrowed(relation)),
    }
}
