//! Binary comparison built-ins.
//!
//! `EQUAL` can bind one unknown side to the other. The ordering predicates
//! only verify; operands of kinds with no common order make them false.

use std::cmp::Ordering;

use crate::builtins::{algebra, check_shape, too_many_unknowns, BuiltinPredicate};
use crate::error::Result;
use crate::tuple::Tuple;

/// `X = Y`, numbers compared by value.
#[derive(Debug, Clone, Copy, Default)]
pub struct Equal;

/// `X != Y`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unequal;

/// `X < Y`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Less;

/// `X <= Y`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LessEqual;

/// `X > Y`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Greater;

/// `X >= Y`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GreaterEqual;

impl BuiltinPredicate for Equal {
    fn name(&self) -> &'static str {
        "EQUAL"
    }

    fn arity(&self) -> usize {
        2
    }

    fn max_unknowns(&self) -> usize {
        1
    }

    fn compute(&self, terms: &Tuple, unknown: &[usize]) -> Result<Option<Tuple>> {
        check_shape(self, terms, unknown)?;
        match unknown {
            [] => Ok(algebra::equal(&terms[0], &terms[1]).then(|| terms.clone())),
            [position] => {
                let other = usize::from(*position == 0);
                let mut bound = terms.clone();
                bound.set(*position, terms[other].clone());
                Ok(Some(bound))
            }
            _ => Err(too_many_unknowns(self, unknown.len())),
        }
    }
}

impl BuiltinPredicate for Unequal {
    fn name(&self) -> &'static str {
        "UNEQUAL"
    }

    fn arity(&self) -> usize {
        2
    }

    fn max_unknowns(&self) -> usize {
        0
    }

    fn compute(&self, terms: &Tuple, unknown: &[usize]) -> Result<Option<Tuple>> {
        check_shape(self, terms, unknown)?;
        Ok((!algebra::equal(&terms[0], &terms[1])).then(|| terms.clone()))
    }
}

fn ordered(
    predicate: &dyn BuiltinPredicate,
    terms: &Tuple,
    unknown: &[usize],
    accept: fn(Ordering) -> bool,
) -> Result<Option<Tuple>> {
    check_shape(predicate, terms, unknown)?;
    Ok(algebra::compare(&terms[0], &terms[1])
        .is_some_and(accept)
        .then(|| terms.clone()))
}

macro_rules! ordering_predicate {
    ($ty:ident, $name:literal, $accept:expr) => {
        impl BuiltinPredicate for $ty {
            fn name(&self) -> &'static str {
                $name
            }

            fn arity(&self) -> usize {
                2
            }

            fn max_unknowns(&self) -> usize {
                0
            }

            fn compute(&self, terms: &Tuple, unknown: &[usize]) -> Result<Option<Tuple>> {
                ordered(self, terms, unknown, $accept)
            }
        }
    };
}

ordering_predicate!(Less, "LESS", Ordering::is_lt);
ordering_predicate!(LessEqual, "LESS_EQUAL", Ordering::is_le);
ordering_predicate!(Greater, "GREATER", Ordering::is_gt);
ordering_predicate!(GreaterEqual, "GREATER_EQUAL", Ordering::is_ge);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtins::builtin;
    use crate::error::EvalError;
    use crate::term::Term;
    use crate::tuple;

    fn holds(name: &str, a: Term, b: Term) -> bool {
        builtin(name, [a, b])
            .and_then(|b| b.evaluate_template())
            .expect("ground comparison")
            .is_some()
    }

    #[test]
    fn test_equal_binds_the_unknown_side() {
        let eq = builtin("EQUAL", [Term::var("X"), Term::Integer(4)]).expect("registered");
        assert_eq!(eq.evaluate_template(), Ok(Some(tuple![4, 4])));

        let eq = builtin("EQUAL", [Term::string("a"), Term::var("Y")]).expect("registered");
        assert_eq!(eq.evaluate_template(), Ok(Some(tuple!["a", "a"])));
    }

    #[test]
    fn test_equal_compares_numbers_by_value() {
        assert!(holds("EQUAL", Term::Integer(2), Term::Double(2.0)));
        assert!(!holds("EQUAL", Term::Integer(2), Term::string("2")));
        assert!(holds("UNEQUAL", Term::Integer(2), Term::string("2")));
        assert!(!holds("UNEQUAL", Term::Float(1.5), Term::Double(1.5)));
    }

    #[test]
    fn test_orderings() {
        let (one, two) = (Term::Integer(1), Term::Double(2.0));
        assert!(holds("LESS", one.clone(), two.clone()));
        assert!(!holds("LESS", two.clone(), one.clone()));
        assert!(holds("LESS_EQUAL", one.clone(), Term::Long(1)));
        assert!(holds("GREATER", two.clone(), one.clone()));
        assert!(holds("GREATER_EQUAL", two.clone(), two));
        assert!(holds(
            "LESS",
            Term::date(2005, 1, 1).expect("valid"),
            Term::date(2005, 1, 2).expect("valid")
        ));
    }

    #[test]
    fn test_incomparable_kinds_are_false() {
        for name in ["LESS", "LESS_EQUAL", "GREATER", "GREATER_EQUAL"] {
            assert!(!holds(name, Term::string("a"), Term::Integer(1)), "{name}");
        }
    }

    #[test]
    fn test_ordering_cannot_bind() {
        let less = builtin("LESS", [Term::var("X"), Term::Integer(1)]).expect("registered");
        assert!(matches!(
            less.evaluate_template(),
            Err(EvalError::UnsupportedUnknowns { .. })
        ));
        assert!(Less.compute(&tuple![Term::var("X"), 1], &[0]).is_err());
    }

    #[test]
    fn test_compute_checks_arity() {
        assert!(matches!(
            Less.compute(&tuple![1], &[]),
            Err(EvalError::Precondition { .. })
        ));
        assert!(matches!(
            Equal.compute(&tuple![1, Term::var("X")], &[2]),
            Err(EvalError::Precondition { .. })
        ));
    }
}
