//! Built-in predicates.
//!
//! A built-in is a predicate whose extension is computed rather than
//! stored. [`Builtin`] pairs a [`BuiltinPredicate`] with the template tuple
//! it was written with in a rule, e.g. `ADD(?X, 1, ?Z)`. Evaluation merges a
//! caller's candidate tuple into the template and either verifies the result
//! (every position ground) or computes the single position left unbound.

use std::fmt;

use indexmap::IndexSet;
use log::debug;

use crate::error::{EvalError, Result};
use crate::term::Term;
use crate::tuple::Tuple;

pub mod algebra;
pub mod arithmetic;
pub mod binding;
pub mod comparison;

pub use arithmetic::{Add, Divide, Multiply, Subtract};
pub use comparison::{Equal, Greater, GreaterEqual, Less, LessEqual, Unequal};

/// The computation behind a built-in predicate.
pub trait BuiltinPredicate: fmt::Debug + Send + Sync {
    /// Predicate name, e.g. `ADD`.
    fn name(&self) -> &'static str;

    /// Number of positions.
    fn arity(&self) -> usize;

    /// Largest number of non-ground positions [`compute`](Self::compute)
    /// can fill in.
    fn max_unknowns(&self) -> usize;

    /// Completes `terms`.
    ///
    /// `unknown` lists the non-ground positions of `terms`, at most
    /// [`max_unknowns`](Self::max_unknowns) of them. With no unknowns the
    /// call verifies `terms`. Returns the fully ground tuple on success and
    /// `None` when there is no solution.
    ///
    /// # Errors
    ///
    /// Fails when the terms have kinds the predicate cannot combine, when
    /// `terms` does not have the predicate's arity or `unknown` names a
    /// position outside it, and when `unknown` holds more positions than
    /// supported.
    fn compute(&self, terms: &Tuple, unknown: &[usize]) -> Result<Option<Tuple>>;
}

pub(crate) fn too_many_unknowns(predicate: &dyn BuiltinPredicate, unknowns: usize) -> EvalError {
    EvalError::UnsupportedUnknowns {
        predicate: predicate.name(),
        unknowns,
        supported: predicate.max_unknowns(),
    }
}

// Arity and unknown-position checks run by every `compute` before it indexes
// into `terms`.
pub(crate) fn check_shape(
    predicate: &dyn BuiltinPredicate,
    terms: &Tuple,
    unknown: &[usize],
) -> Result<()> {
    if terms.arity() != predicate.arity() {
        return Err(EvalError::precondition(
            "built-in",
            format!(
                "{} takes {} terms, got {}",
                predicate.name(),
                predicate.arity(),
                terms.arity()
            ),
        ));
    }
    if let Some(p) = unknown.iter().find(|&&p| p >= terms.arity()) {
        return Err(EvalError::precondition(
            "built-in",
            format!("position {p} is out of range for {}", predicate.name()),
        ));
    }
    if unknown.len() > predicate.max_unknowns() {
        return Err(too_many_unknowns(predicate, unknown.len()));
    }
    Ok(())
}

/// A built-in predicate applied to a template tuple.
#[derive(Debug, Clone)]
pub struct Builtin {
    predicate: &'static dyn BuiltinPredicate,
    template: Tuple,
}

impl Builtin {
    /// Applies `predicate` to `template`.
    ///
    /// # Errors
    ///
    /// Returns [`EvalError::Precondition`] when the template arity differs
    /// from the predicate's.
    pub fn new(predicate: &'static dyn BuiltinPredicate, template: Tuple) -> Result<Self> {
        if template.arity() != predicate.arity() {
            return Err(EvalError::precondition(
                "built-in",
                format!(
                    "{} takes {} terms, got {}",
                    predicate.name(),
                    predicate.arity(),
                    template.arity()
                ),
            ));
        }
        Ok(Self {
            predicate,
            template,
        })
    }

    /// Predicate name.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.predicate.name()
    }

    /// The underlying predicate.
    #[must_use]
    pub fn predicate(&self) -> &'static dyn BuiltinPredicate {
        self.predicate
    }

    /// The terms the built-in was written with.
    #[must_use]
    pub fn template(&self) -> &Tuple {
        &self.template
    }

    /// Variables of the template in order of first appearance.
    #[must_use]
    pub fn variables(&self) -> IndexSet<String> {
        self.template.variables()
    }

    /// Evaluates against a candidate tuple.
    ///
    /// Ground template terms take priority over the candidate; every other
    /// position takes the candidate's term. `unbound_positions` declares
    /// the template positions the caller supplies or expects back. Returns
    /// the completed tuple, or `None` when the built-in has no solution.
    ///
    /// # Errors
    ///
    /// [`EvalError::Precondition`] for a candidate of the wrong arity or a
    /// non-ground position the caller did not declare,
    /// [`EvalError::UnsupportedUnknowns`] when more positions remain unbound
    /// than the predicate can compute, and any algebra error raised while
    /// computing.
    pub fn evaluate(&self, candidate: &Tuple, unbound_positions: &[usize]) -> Result<Option<Tuple>> {
        let complete = binding::merge_bindings(&self.template, candidate)?;
        if let Some(p) = unbound_positions.iter().find(|&&p| p >= complete.arity()) {
            return Err(EvalError::precondition(
                "built-in",
                format!("position {p} is out of range for {}", self.name()),
            ));
        }
        let free = complete.unground_indexes();
        if let Some(p) = free.iter().find(|p| !unbound_positions.contains(p)) {
            return Err(EvalError::precondition(
                "built-in",
                format!("position {p} of {} is unbound but was not declared", self.name()),
            ));
        }
        if free.len() > self.predicate.max_unknowns() {
            return Err(too_many_unknowns(self.predicate, free.len()));
        }
        let result = self.predicate.compute(&complete, &free)?;
        if result.is_none() {
            debug!("{}{complete}: no solution", self.name());
        }
        Ok(result)
    }

    /// Evaluates the template on its own, treating its variables as the
    /// unbound positions.
    ///
    /// # Errors
    ///
    /// As [`Builtin::evaluate`].
    pub fn evaluate_template(&self) -> Result<Option<Tuple>> {
        self.evaluate(&self.template, &self.template.unground_indexes())
    }
}

impl fmt::Display for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.name(), self.template)
    }
}

/// Builds a [`Builtin`] from its template.
pub type Constructor = fn(Tuple) -> Result<Builtin>;

/// A registered built-in.
#[derive(Debug, Clone, Copy)]
pub struct RegistryEntry {
    /// Predicate name
    pub name: &'static str,
    /// Predicate arity
    pub arity: usize,
    /// Constructor taking the template tuple
    pub construct: Constructor,
}

/// The standard built-ins, keyed by name and arity.
pub static REGISTRY: [RegistryEntry; 10] = [
    RegistryEntry {
        name: "ADD",
        arity: 3,
        construct: |t| Builtin::new(&Add, t),
    },
    RegistryEntry {
        name: "SUBTRACT",
        arity: 3,
        construct: |t| Builtin::new(&Subtract, t),
    },
    RegistryEntry {
        name: "MULTIPLY",
        arity: 3,
        construct: |t| Builtin::new(&Multiply, t),
    },
    RegistryEntry {
        name: "DIVIDE",
        arity: 3,
        construct: |t| Builtin::new(&Divide, t),
    },
    RegistryEntry {
        name: "EQUAL",
        arity: 2,
        construct: |t| Builtin::new(&Equal, t),
    },
    RegistryEntry {
        name: "UNEQUAL",
        arity: 2,
        construct: |t| Builtin::new(&Unequal, t),
    },
    RegistryEntry {
        name: "LESS",
        arity: 2,
        construct: |t| Builtin::new(&Less, t),
    },
    RegistryEntry {
        name: "LESS_EQUAL",
        arity: 2,
        construct: |t| Builtin::new(&LessEqual, t),
    },
    RegistryEntry {
        name: "GREATER",
        arity: 2,
        construct: |t| Builtin::new(&Greater, t),
    },
    RegistryEntry {
        name: "GREATER_EQUAL",
        arity: 2,
        construct: |t| Builtin::new(&GreaterEqual, t),
    },
];

/// Finds a registered built-in by name (ASCII case-insensitive) and arity.
#[must_use]
pub fn lookup(name: &str, arity: usize) -> Option<&'static RegistryEntry> {
    REGISTRY
        .iter()
        .find(|e| e.arity == arity && e.name.eq_ignore_ascii_case(name))
}

/// Builds the registered built-in `name` over `terms`.
///
/// ```rust
/// use rulecore::{builtin, tuple, Term};
///
/// let add = builtin("ADD", [Term::var("X"), Term::Integer(2), Term::Integer(5)]).unwrap();
/// let solved = add.evaluate(&tuple![Term::var("X"), 0, 0], &[0]).unwrap();
/// assert_eq!(solved, Some(tuple![3, 2, 5]));
/// ```
///
/// # Errors
///
/// Returns [`EvalError::UnknownBuiltin`] when nothing is registered under
/// that name and arity.
pub fn builtin(name: &str, terms: impl IntoIterator<Item = Term>) -> Result<Builtin> {
    let template = Tuple::new(terms);
    let entry = lookup(name, template.arity()).ok_or_else(|| EvalError::UnknownBuiltin {
        name: name.to_string(),
        arity: template.arity(),
    })?;
    (entry.construct)(template)
}
