//! Position bookkeeping shared by the built-ins.

use crate::error::{EvalError, Result};
use crate::term::Term;
use crate::tuple::Tuple;

/// Positions of the ground terms, ascending.
#[must_use]
pub fn ground_indexes(terms: &[Term]) -> Vec<usize> {
    terms
        .iter()
        .enumerate()
        .filter(|(_, t)| t.is_ground())
        .map(|(i, _)| i)
        .collect()
}

/// Positions of the non-ground terms, ascending.
#[must_use]
pub fn unground_indexes(terms: &[Term]) -> Vec<usize> {
    terms
        .iter()
        .enumerate()
        .filter(|(_, t)| !t.is_ground())
        .map(|(i, _)| i)
        .collect()
}

/// The terms at `indexes`, in that order.
///
/// # Errors
///
/// Returns [`EvalError::Precondition`] when an index is out of range.
pub fn get_indexes(terms: &[Term], indexes: &[usize]) -> Result<Vec<Term>> {
    indexes
        .iter()
        .map(|&i| {
            terms.get(i).cloned().ok_or_else(|| {
                EvalError::precondition(
                    "get_indexes",
                    format!("index {i} is out of range for {} terms", terms.len()),
                )
            })
        })
        .collect()
}

/// Positions below `len` that are not in `indexes`, ascending.
#[must_use]
pub fn complement(indexes: &[usize], len: usize) -> Vec<usize> {
    (0..len).filter(|i| !indexes.contains(i)).collect()
}

/// Interleaves two term lists: `placed[k]` lands at position `indexes[k]`
/// and `rest` fills the remaining positions in order.
///
/// # Errors
///
/// Returns [`EvalError::Precondition`] when `indexes` and `placed` differ
/// in length, or an index is out of range or repeated.
pub fn concat(indexes: &[usize], placed: &[Term], rest: &[Term]) -> Result<Vec<Term>> {
    if indexes.len() != placed.len() {
        return Err(EvalError::precondition(
            "concat",
            format!("{} indexes for {} terms", indexes.len(), placed.len()),
        ));
    }
    let len = placed.len() + rest.len();
    let mut slots: Vec<Option<Term>> = vec![None; len];
    for (&i, term) in indexes.iter().zip(placed) {
        match slots.get_mut(i) {
            Some(slot) if slot.is_none() => *slot = Some(term.clone()),
            Some(_) => {
                return Err(EvalError::precondition(
                    "concat",
                    format!("index {i} is given twice"),
                ))
            }
            None => {
                return Err(EvalError::precondition(
                    "concat",
                    format!("index {i} is out of range for {len} terms"),
                ))
            }
        }
    }
    let mut rest = rest.iter();
    Ok(slots
        .into_iter()
        .filter_map(|slot| slot.or_else(|| rest.next().cloned()))
        .collect())
}

/// Overlays a caller's candidate tuple on a built-in's template: ground
/// template terms are kept, every other position takes the candidate's term.
///
/// # Errors
///
/// Returns [`EvalError::Precondition`] when the arities differ.
pub fn merge_bindings(template: &Tuple, candidate: &Tuple) -> Result<Tuple> {
    if template.arity() != candidate.arity() {
        return Err(EvalError::precondition(
            "built-in",
            format!(
                "candidate {candidate} has arity {}, expected {}",
                candidate.arity(),
                template.arity()
            ),
        ));
    }
    let own = ground_indexes(template.terms());
    let kept = get_indexes(template.terms(), &own)?;
    let given = get_indexes(candidate.terms(), &complement(&own, template.arity()))?;
    concat(&own, &kept, &given).map(Tuple::from)
}
