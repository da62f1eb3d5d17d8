//! `ADD`, `SUBTRACT`, `MULTIPLY` and `DIVIDE`.
//!
//! Each predicate relates three terms as `X <op> Y = Z` and can compute any
//! one of them from the other two. Solving through a division that has no
//! exact inverse, or through a zero divisor, has no solution.

use crate::builtins::{algebra, check_shape, too_many_unknowns, BuiltinPredicate};
use crate::error::{EvalError, Result};
use crate::term::Term;
use crate::tuple::Tuple;

type Binary = fn(&Term, &Term) -> Result<Term>;

// `forward(x, y) = z`; `left(y, z)` yields x and `right(x, z)` yields y.
struct Inverses {
    forward: Binary,
    left: Binary,
    right: Binary,
    // Whether integral inverses drop a remainder.
    truncates: bool,
}

impl Inverses {
    // Integer division and calendar clamping lose information, so an
    // inverse computed through them is only a solution when the forward
    // operation gives `z` back.
    fn must_verify(&self, solved: &Term) -> bool {
        match solved {
            Term::Date(_) | Term::DateTime(_) => true,
            _ => self.truncates && solved.numeric_kind().is_some_and(|k| k.is_integral()),
        }
    }
}

fn compute(
    predicate: &dyn BuiltinPredicate,
    ops: &Inverses,
    terms: &Tuple,
    unknown: &[usize],
) -> Result<Option<Tuple>> {
    check_shape(predicate, terms, unknown)?;
    let (x, y, z) = (&terms[0], &terms[1], &terms[2]);
    let attempt = match unknown {
        [] => (ops.forward)(x, y).map(|v| algebra::equal(&v, z).then(|| terms.clone())),
        [2] => (ops.forward)(x, y).map(|v| {
            let mut solved = terms.clone();
            solved.set(2, v);
            Some(solved)
        }),
        [position] => {
            let candidate = if *position == 0 {
                (ops.left)(y, z)
            } else {
                (ops.right)(x, z)
            };
            candidate.and_then(|value| {
                let verify = ops.must_verify(&value);
                let mut solved = terms.clone();
                solved.set(*position, value);
                if !verify {
                    return Ok(Some(solved));
                }
                let check = (ops.forward)(&solved[0], &solved[1])?;
                Ok(algebra::equal(&check, &solved[2]).then_some(solved))
            })
        }
        _ => return Err(too_many_unknowns(predicate, unknown.len())),
    };
    match attempt {
        Err(EvalError::DivisionByZero) => Ok(None),
        other => other,
    }
}

fn left_of_add(y: &Term, z: &Term) -> Result<Term> {
    algebra::subtract(z, y)
}

fn right_of_add(x: &Term, z: &Term) -> Result<Term> {
    algebra::subtract(z, x)
}

fn left_of_subtract(y: &Term, z: &Term) -> Result<Term> {
    algebra::add(z, y)
}

fn left_of_multiply(y: &Term, z: &Term) -> Result<Term> {
    algebra::divide(z, y)
}

fn right_of_multiply(x: &Term, z: &Term) -> Result<Term> {
    algebra::divide(z, x)
}

fn left_of_divide(y: &Term, z: &Term) -> Result<Term> {
    algebra::multiply(y, z)
}

const ADD: Inverses = Inverses {
    forward: algebra::add,
    left: left_of_add,
    right: right_of_add,
    truncates: false,
};

const SUBTRACT: Inverses = Inverses {
    forward: algebra::subtract,
    left: left_of_subtract,
    right: algebra::subtract,
    truncates: false,
};

const MULTIPLY: Inverses = Inverses {
    forward: algebra::multiply,
    left: left_of_multiply,
    right: right_of_multiply,
    truncates: true,
};

const DIVIDE: Inverses = Inverses {
    forward: algebra::divide,
    left: left_of_divide,
    right: algebra::divide,
    truncates: true,
};

/// `X + Y = Z`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Add;

/// `X - Y = Z`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Subtract;

/// `X * Y = Z`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Multiply;

/// `X / Y = Z`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Divide;

macro_rules! ternary_predicate {
    ($ty:ident, $name:literal, $ops:ident) => {
        impl BuiltinPredicate for $ty {
            fn name(&self) -> &'static str {
                $name
            }

            fn arity(&self) -> usize {
                3
            }

            fn max_unknowns(&self) -> usize {
                1
            }

            fn compute(&self, terms: &Tuple, unknown: &[usize]) -> Result<Option<Tuple>> {
                compute(self, &$ops, terms, unknown)
            }
        }
    };
}

ternary_predicate!(Add, "ADD", ADD);
ternary_predicate!(Subtract, "SUBTRACT", SUBTRACT);
ternary_predicate!(Multiply, "MULTIPLY", MULTIPLY);
ternary_predicate!(Divide, "DIVIDE", DIVIDE);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::builtin;
    use crate::term::Duration;
    use crate::tuple;

    fn solve(name: &str, terms: Tuple) -> Result<Option<Tuple>> {
        let unknown = terms.unground_indexes();
        builtin(name, terms.iter().cloned())?.evaluate(&terms, &unknown)
    }

    fn v(name: &str) -> Term {
        Term::var(name)
    }

    #[test]
    fn test_add_in_every_direction() {
        assert_eq!(solve("ADD", tuple![2, 3, v("Z")]), Ok(Some(tuple![2, 3, 5])));
        assert_eq!(solve("ADD", tuple![2, v("Y"), 5]), Ok(Some(tuple![2, 3, 5])));
        assert_eq!(solve("ADD", tuple![v("X"), 3, 5]), Ok(Some(tuple![2, 3, 5])));
        assert_eq!(solve("ADD", tuple![2, 3, 5]), Ok(Some(tuple![2, 3, 5])));
        assert_eq!(solve("ADD", tuple![2, 3, 6]), Ok(None));
    }

    #[test]
    fn test_verification_compares_numeric_values() {
        assert_eq!(solve("ADD", tuple![2, 3, 5.0]), Ok(Some(tuple![2, 3, 5.0])));
    }

    #[test]
    fn test_subtract_in_every_direction() {
        assert_eq!(solve("SUBTRACT", tuple![7, 3, v("Z")]), Ok(Some(tuple![7, 3, 4])));
        assert_eq!(solve("SUBTRACT", tuple![7, v("Y"), 4]), Ok(Some(tuple![7, 3, 4])));
        assert_eq!(solve("SUBTRACT", tuple![v("X"), 3, 4]), Ok(Some(tuple![7, 3, 4])));
    }

    #[test]
    fn test_multiply_requires_exact_inverse() {
        assert_eq!(solve("MULTIPLY", tuple![3, v("Y"), 12]), Ok(Some(tuple![3, 4, 12])));
        assert_eq!(solve("MULTIPLY", tuple![3, v("Y"), 13]), Ok(None));
        assert_eq!(
            solve("MULTIPLY", tuple![2.0, v("Y"), 5]),
            Ok(Some(tuple![2.0, 2.5, 5]))
        );
        assert_eq!(solve("MULTIPLY", tuple![0, v("Y"), 0]), Ok(None), "Any Y would do");
    }

    #[test]
    fn test_divide_in_every_direction() {
        assert_eq!(solve("DIVIDE", tuple![12, 4, v("Z")]), Ok(Some(tuple![12, 4, 3])));
        assert_eq!(solve("DIVIDE", tuple![v("X"), 4, 3]), Ok(Some(tuple![12, 4, 3])));
        assert_eq!(solve("DIVIDE", tuple![12, v("Y"), 3]), Ok(Some(tuple![12, 4, 3])));
        assert_eq!(solve("DIVIDE", tuple![12, v("Y"), 5]), Ok(None));
    }

    #[test]
    fn test_division_by_zero_has_no_solution() {
        assert_eq!(solve("DIVIDE", tuple![1, 0, v("Z")]), Ok(None));
        assert_eq!(solve("DIVIDE", tuple![1, v("Y"), 0]), Ok(None));
        assert_eq!(solve("DIVIDE", tuple![1, 0, 0]), Ok(None));
    }

    #[test]
    fn test_type_mismatch_propagates() {
        assert!(matches!(
            solve("ADD", tuple!["a", 1, v("Z")]),
            Err(EvalError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_dates_solve_for_durations() {
        let start = Term::date(2004, 2, 29).expect("valid");
        let end = Term::date(2005, 2, 28).expect("valid");
        let solved = solve("SUBTRACT", tuple![end.clone(), start.clone(), v("D")])
            .expect("dates subtract")
            .expect("has solution");
        assert_eq!(solved[2], Term::Duration(Duration::new(0, 0, 365, 0, 0, 0)));

        let year = Term::Duration(Duration::new(1, 0, 0, 0, 0, 0));
        assert_eq!(
            solve("ADD", tuple![start, year.clone(), v("E")]),
            Ok(Some(tuple![Term::date(2004, 2, 29).expect("valid"), year, end]))
        );
    }

    #[test]
    fn test_real_inverses_are_not_rechecked() {
        let (y, z) = (524.560_164_915_883_9, -995.787_893_297_778_6);
        assert_eq!(
            solve("ADD", tuple![v("X"), y, z]),
            Ok(Some(tuple![z - y, y, z]))
        );

        let (x, z) = (-5.668_012_057_387_733, -1.557_668_488_345_653_3);
        assert_eq!(
            solve("MULTIPLY", tuple![x, v("Y"), z]),
            Ok(Some(tuple![x, z / x, z]))
        );
        assert_eq!(
            solve("DIVIDE", tuple![v("X"), 3.0, 0.1]),
            Ok(Some(tuple![3.0 * 0.1, 3.0, 0.1]))
        );
    }

    #[test]
    fn test_dates_solve_through_partial_days() {
        let march = Term::date(2005, 3, 1).expect("valid");
        let hour = Term::Duration(Duration::new(0, 0, 0, 1, 0, 0));
        assert_eq!(
            solve("ADD", tuple![march.clone(), hour.clone(), v("Z")]),
            Ok(Some(tuple![march.clone(), hour.clone(), march.clone()]))
        );
        assert_eq!(
            solve("ADD", tuple![v("X"), hour.clone(), march.clone()]),
            Ok(Some(tuple![march.clone(), hour, march]))
        );
    }

    #[test]
    fn test_clamped_dates_without_inverse() {
        let month = Term::Duration(Duration::new(0, 1, 0, 0, 0, 0));
        let end_of_march = Term::date(2005, 3, 31).expect("valid");
        assert_eq!(
            solve("ADD", tuple![v("X"), month, end_of_march]),
            Ok(None),
            "No date plus one month lands on March 31st"
        );
    }

    #[test]
    fn test_compute_checks_arity() {
        assert!(matches!(
            Add.compute(&tuple![1, 2], &[]),
            Err(EvalError::Precondition { .. })
        ));
        assert!(matches!(
            Divide.compute(&tuple![1, 2, v("Z")], &[3]),
            Err(EvalError::Precondition { .. })
        ));
    }

    #[test]
    fn test_compute_rejects_two_unknowns() {
        let terms = tuple![v("X"), v("Y"), 3];
        assert!(matches!(
            Add.compute(&terms, &[0, 1]),
            Err(EvalError::UnsupportedUnknowns { unknowns: 2, .. })
        ));
    }
}
