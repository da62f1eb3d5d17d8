//! Evaluating a built-in atom against a relation of bindings.
//!
//! The relation's columns are named by rule variables. Every tuple
//! substitutes its values into the built-in's template; the built-in then
//! verifies the result or computes the one variable left open. Positive
//! atoms keep the tuples that have a solution, extended with the values of
//! the atom's output variables. Negated atoms keep the tuples without one.

use log::debug;

use crate::builtins::Builtin;
use crate::error::{EvalError, Result};
use crate::relation::{Relation, SortOrder};
use crate::tuple::Tuple;

/// Filters (and for positive atoms extends) `relation` through `builtin`.
///
/// `columns[i]` names the variable bound by column `i`. Template variables
/// that are not among `columns` are the atom's output variables; their
/// values are appended to each surviving tuple in order of first appearance
/// in the template.
///
/// A rule body made of the built-in alone supplies an empty relation of
/// arity 0. In that case the template is evaluated once on its own, as long
/// as it leaves no more variables open than the built-in can compute.
/// Polarity still applies there: a negated atom yields the empty tuple `()`
/// when the template has no solution and nothing when it has one, rather
/// than the template's own solution.
///
/// ```rust
/// use rulecore::{builtin, evaluate_builtin, tuple, Relation, Term};
///
/// let add = builtin("ADD", [Term::var("X"), Term::Integer(10), Term::var("Y")]).unwrap();
/// let xs = Relation::from_tuples(1, [tuple![1], tuple![2]]).unwrap();
/// let out = evaluate_builtin(&add, &xs, &["X".to_string()], true).unwrap();
/// assert_eq!(out.tuples(), &[tuple![1, 11], tuple![2, 12]]);
/// ```
///
/// # Errors
///
/// [`EvalError::Precondition`] when `columns` does not match the relation's
/// arity, when a negated atom has output variables, or when an output
/// variable only occurs nested inside a constructed term. Errors raised by
/// the built-in itself, such as [`EvalError::TypeMismatch`] or
/// [`EvalError::UnsupportedUnknowns`], are passed on.
pub fn evaluate_builtin(
    builtin: &Builtin,
    relation: &Relation,
    columns: &[String],
    positive: bool,
) -> Result<Relation> {
    if columns.len() != relation.arity() {
        return Err(EvalError::precondition(
            "evaluate_builtin",
            format!(
                "{} column names for a relation of arity {}",
                columns.len(),
                relation.arity()
            ),
        ));
    }
    let template = builtin.template();
    let outputs: Vec<String> = builtin
        .variables()
        .into_iter()
        .filter(|v| !columns.contains(v))
        .collect();
    if !positive && !outputs.is_empty() {
        return Err(EvalError::precondition(
            "evaluate_builtin",
            format!(
                "negated {builtin} leaves {} unbound",
                outputs.join(", ")
            ),
        ));
    }
    let output_positions = outputs
        .iter()
        .map(|name| {
            template
                .iter()
                .position(|t| t.variable_name() == Some(name.as_str()))
                .ok_or_else(|| {
                    EvalError::precondition(
                        "evaluate_builtin",
                        format!("output variable ?{name} of {builtin} only occurs nested"),
                    )
                })
        })
        .collect::<Result<Vec<usize>>>()?;
    let sources: Vec<Option<usize>> = template
        .iter()
        .map(|t| {
            t.variable_name()
                .and_then(|name| columns.iter().position(|c| c == name))
        })
        .collect();

    let arity = relation.arity() + outputs.len();
    debug!(
        "evaluate {}{builtin} over {} tuples",
        if positive { "" } else { "not " },
        relation.len()
    );

    if relation.is_empty() {
        return standalone(builtin, arity, &output_positions, relation.arity(), positive);
    }

    let mut tuples = Vec::new();
    for bound in relation {
        let candidate: Tuple = template
            .iter()
            .zip(&sources)
            .map(|(term, source)| match source {
                Some(column) => bound[*column].clone(),
                None => term.clone(),
            })
            .collect();
        let unknown = candidate.unground_indexes();
        match (builtin.evaluate(&candidate, &unknown)?, positive) {
            (Some(solved), true) => tuples.push(bound.concat(&pick(&solved, &output_positions))),
            (None, false) => tuples.push(bound.clone()),
            _ => {}
        }
    }
    Ok(Relation::from_unchecked(
        arity,
        SortOrder::natural(arity),
        tuples,
    ))
}

fn standalone(
    builtin: &Builtin,
    arity: usize,
    output_positions: &[usize],
    bound_arity: usize,
    positive: bool,
) -> Result<Relation> {
    let mut result = Relation::new(arity);
    let open = builtin.template().unground_indexes().len();
    if bound_arity != 0 || open > builtin.predicate().max_unknowns() {
        return Ok(result);
    }
    match (builtin.evaluate_template()?, positive) {
        (Some(solved), true) => {
            result.add(pick(&solved, output_positions))?;
        }
        (None, false) => {
            result.add(Tuple::empty())?;
        }
        _ => {}
    }
    Ok(result)
}

fn pick(solved: &Tuple, positions: &[usize]) -> Tuple {
    positions.iter().map(|&p| solved[p].clone()).collect()
}
