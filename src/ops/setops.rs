//! Union and difference.

use log::debug;

use crate::error::{EvalError, Result};
use crate::relation::{Relation, SortOrder};

/// All tuples occurring in any of `relations`.
///
/// # Errors
///
/// Returns [`EvalError::Precondition`] when `relations` is empty or the
/// arities differ.
pub fn union(relations: &[&Relation]) -> Result<Relation> {
    let Some(first) = relations.first() else {
        return Err(EvalError::precondition("union", "no relations given"));
    };
    let arity = first.arity();
    if let Some(other) = relations.iter().find(|r| r.arity() != arity) {
        return Err(EvalError::precondition(
            "union",
            format!("arity {} does not match arity {arity}", other.arity()),
        ));
    }
    debug!("union of {} relations", relations.len());
    let tuples = relations
        .iter()
        .flat_map(|r| r.iter().cloned())
        .collect();
    Ok(Relation::from_unchecked(arity, SortOrder::natural(arity), tuples))
}

/// Tuples of `left` that are not in `right`.
///
/// # Errors
///
/// Returns [`EvalError::Precondition`] when the arities differ.
pub fn difference(left: &Relation, right: &Relation) -> Result<Relation> {
    if left.arity() != right.arity() {
        return Err(EvalError::precondition(
            "difference",
            format!(
                "arity {} does not match arity {}",
                right.arity(),
                left.arity()
            ),
        ));
    }
    debug!("difference: {} minus {} tuples", left.len(), right.len());
    let tuples = left
        .iter()
        .filter(|t| !right.contains(t))
        .cloned()
        .collect();
    Ok(Relation::from_unchecked(
        left.arity(),
        left.order().clone(),
        tuples,
    ))
}
