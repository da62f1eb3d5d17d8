//! Projection.

use log::debug;

use crate::error::{EvalError, Result};
use crate::relation::{Relation, SortOrder};

/// Turns a destination index array into the list of source columns to read,
/// in output order.
///
/// `index[c]` is the output position of source column `c`, or negative when
/// the column is dropped. Output positions are taken in ascending order, so
/// gaps between them close up.
///
/// # Errors
///
/// Returns [`EvalError::Precondition`] when two columns share a destination.
pub fn optimize_projection(index: &[i32]) -> Result<Vec<usize>> {
    let mut targets: Vec<(usize, usize)> = index
        .iter()
        .enumerate()
        .filter_map(|(source, &dest)| usize::try_from(dest).ok().map(|d| (d, source)))
        .collect();
    targets.sort_unstable();
    if let Some(pair) = targets.windows(2).find(|w| w[0].0 == w[1].0) {
        return Err(EvalError::precondition(
            "project",
            format!(
                "columns {} and {} both project to position {}",
                pair[0].1, pair[1].1, pair[0].0
            ),
        ));
    }
    Ok(targets.into_iter().map(|(_, source)| source).collect())
}

/// Keeps the columns with a non-negative entry in `index`, placing each at
/// the position its entry names.
///
/// ```rust
/// use rulecore::{project, tuple, Relation};
///
/// let r = Relation::from_tuples(3, vec![tuple![1, 2, 3]]).unwrap();
/// let p = project(&r, &[1, -1, 0]).unwrap();
/// assert_eq!(p.first(), Some(&tuple![3, 1]));
/// ```
///
/// # Errors
///
/// Returns [`EvalError::Precondition`] when `index` does not have one entry
/// per column or names a destination twice.
pub fn project(relation: &Relation, index: &[i32]) -> Result<Relation> {
    if index.len() != relation.arity() {
        return Err(EvalError::precondition(
            "project",
            format!(
                "index array has {} entries, relation arity is {}",
                index.len(),
                relation.arity()
            ),
        ));
    }
    let sources = optimize_projection(index)?;
    debug!(
        "project: {} tuples, columns {:?}",
        relation.len(),
        sources
    );
    let arity = sources.len();
    let tuples = relation.iter().map(|t| t.project(&sources)).collect();
    Ok(Relation::from_unchecked(arity, SortOrder::natural(arity), tuples))
}
