//! Fixed-arity ordered sequences of terms.

use std::fmt;
use std::ops::Index;

use indexmap::IndexSet;
use smallvec::SmallVec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::term::Term;

/// Builds a [`Tuple`] from values convertible into [`Term`].
///
/// ```rust
/// use rulecore::{tuple, Term};
///
/// let t = tuple![1, "a", Term::var("X")];
/// assert_eq!(t.arity(), 3);
/// ```
#[macro_export]
macro_rules! tuple {
    () => {
        $crate::Tuple::empty()
    };
    ($($term:expr),+ $(,)?) => {
        $crate::Tuple::new([$($crate::Term::from($term)),+])
    };
}

/// An ordered sequence of terms. Tuples compare lexicographically by
/// position using the total order of [`Term`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Tuple {
    terms: SmallVec<[Term; 4]>,
}

impl Tuple {
    /// Creates a tuple from the given terms.
    pub fn new(terms: impl IntoIterator<Item = Term>) -> Self {
        Self {
            terms: terms.into_iter().collect(),
        }
    }

    /// The tuple of arity 0.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of columns.
    #[must_use]
    pub fn arity(&self) -> usize {
        self.terms.len()
    }

    /// Term at `column`, if in range.
    #[must_use]
    pub fn get(&self, column: usize) -> Option<&Term> {
        self.terms.get(column)
    }

    /// All terms, in column order.
    #[must_use]
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Iterates over the terms in column order.
    pub fn iter(&self) -> std::slice::Iter<'_, Term> {
        self.terms.iter()
    }

    /// This tuple followed by `other`.
    #[must_use]
    pub fn concat(&self, other: &Tuple) -> Tuple {
        let mut terms = self.terms.clone();
        terms.extend(other.terms.iter().cloned());
        Self { terms }
    }

    /// The terms at `columns`, in that order.
    ///
    /// # Panics
    ///
    /// Panics if a column is out of range. Callers validate columns first.
    #[must_use]
    pub fn project(&self, columns: &[usize]) -> Tuple {
        Self {
            terms: columns.iter().map(|&c| self.terms[c].clone()).collect(),
        }
    }

    /// Whether every term is ground.
    #[must_use]
    pub fn is_ground(&self) -> bool {
        self.terms.iter().all(Term::is_ground)
    }

    /// Distinct variables across all columns, in order of first appearance.
    #[must_use]
    pub fn variables(&self) -> IndexSet<String> {
        let mut out = IndexSet::new();
        for term in &self.terms {
            term.collect_variables(&mut out);
        }
        out
    }

    /// Columns holding ground terms, ascending.
    #[must_use]
    pub fn ground_indexes(&self) -> Vec<usize> {
        crate::builtins::binding::ground_indexes(&self.terms)
    }

    /// Columns holding non-ground terms, ascending.
    #[must_use]
    pub fn unground_indexes(&self) -> Vec<usize> {
        crate::builtins::binding::unground_indexes(&self.terms)
    }

    /// Replaces the term at `column`. Out-of-range columns are ignored.
    pub fn set(&mut self, column: usize, term: Term) {
        if let Some(slot) = self.terms.get_mut(column) {
            *slot = term;
        }
    }
}

impl Index<usize> for Tuple {
    type Output = Term;

    fn index(&self, column: usize) -> &Term {
        &self.terms[column]
    }
}

impl From<Vec<Term>> for Tuple {
    fn from(terms: Vec<Term>) -> Self {
        Self::new(terms)
    }
}

impl FromIterator<Term> for Tuple {
    fn from_iter<I: IntoIterator<Item = Term>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl<'a> IntoIterator for &'a Tuple {
    type Item = &'a Term;
    type IntoIter = std::slice::Iter<'a, Term>;

    fn into_iter(self) -> Self::IntoIter {
        self.terms.iter()
    }
}

impl fmt::Display for Tuple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, term) in self.terms.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{term}")?;
        }
        f.write_str(")")
    }
}
