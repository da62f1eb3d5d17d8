//! Syntactic unification by multiequation reduction.
//!
//! A [`MultiequationSystem`] holds multiequations `{X, Y, ...} = [t1, t2, ...]`
//! stating that every listed variable and term must become identical. Each
//! step takes the unsolved multiequation whose variables occur least often
//! in the system's terms, splits its terms into their common part and a
//! frontier of argument multiequations, records `vars = common` as solved
//! and merges the frontier back into the unsolved set. A step whose best
//! candidate still has occurrences closes a cycle; terms that disagree on
//! their outermost symbol clash.
//!
//! ```rust
//! use rulecore::{unify, Term};
//!
//! let t0 = Term::constructed("f", vec![Term::var("X"), Term::Integer(2)]);
//! let t1 = Term::constructed("f", vec![Term::Integer(1), Term::var("Y")]);
//! let s = unify(&t0, &t1).unwrap();
//! assert_eq!(s.get("X"), Some(&Term::Integer(1)));
//! assert_eq!(s.apply(&t0), s.apply(&t1));
//! ```

use std::fmt;
use std::mem;

use indexmap::{IndexMap, IndexSet};
use log::{debug, trace};
use thiserror::Error;

use crate::error::{EvalError, Result};
use crate::term::Term;
use crate::tuple::Tuple;

type VarId = usize;

// Binds the two input terms; never appears inside a term.
const ROOT: VarId = 0;

/// Why two terms have no unifier.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum UnifyFailure {
    /// Two terms disagree on their outermost symbol.
    #[error("{left} does not unify with {right}")]
    Clash {
        /// First of the disagreeing terms
        left: Term,
        /// Second of the disagreeing terms
        right: Term,
    },
    /// A variable would have to contain itself.
    #[error("cyclic binding through {}", .variables.join(", "))]
    Cycle {
        /// Variables on the cycle
        variables: Vec<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Var(VarId),
    Atom(Term),
    App(String, Vec<Node>),
}

impl Node {
    fn from_term(term: &Term, variables: &mut IndexSet<String>) -> Self {
        match term {
            Term::Variable(name) => Self::Var(variables.insert_full(name.clone()).0 + 1),
            Term::Constructed { functor, args } => Self::App(
                functor.clone(),
                args.iter().map(|a| Self::from_term(a, variables)).collect(),
            ),
            other => Self::Atom(other.clone()),
        }
    }

    fn var(&self) -> Option<VarId> {
        match self {
            Self::Var(v) => Some(*v),
            _ => None,
        }
    }

    fn count(&self, occurrences: &mut [usize]) {
        match self {
            Self::Var(v) => occurrences[*v] += 1,
            Self::App(_, args) => {
                for arg in args {
                    arg.count(occurrences);
                }
            }
            Self::Atom(_) => {}
        }
    }
}

#[derive(Debug)]
struct Multiequation {
    vars: IndexSet<VarId>,
    terms: Vec<Node>,
    counter: usize,
    retired: bool,
}

impl Multiequation {
    fn new(vars: IndexSet<VarId>, terms: Vec<Node>) -> Self {
        Self {
            vars,
            terms,
            counter: 0,
            retired: false,
        }
    }
}

#[derive(Debug)]
struct Solved {
    vars: IndexSet<VarId>,
    // `None` when the variables are only aliased to each other.
    common: Option<Node>,
}

#[derive(Debug)]
struct Frontier {
    vars: IndexSet<VarId>,
    terms: Vec<Node>,
}

/// Splits `terms` (which start with `head`) into their common part and the
/// frontier of argument multiequations, or returns the first pair that
/// clashes.
fn decompose(head: &Node, terms: &[Node]) -> std::result::Result<(Node, Vec<Frontier>), (Node, Node)> {
    if let Some(first) = terms.iter().find_map(Node::var) {
        let vars = terms.iter().filter_map(Node::var).collect();
        let rest = terms.iter().filter(|t| t.var().is_none()).cloned().collect();
        return Ok((Node::Var(first), vec![Frontier { vars, terms: rest }]));
    }
    match head {
        Node::App(functor, args) => {
            let columns = terms
                .iter()
                .map(|t| match t {
                    Node::App(f, a) if f == functor && a.len() == args.len() => Ok(a.as_slice()),
                    other => Err((head.clone(), other.clone())),
                })
                .collect::<std::result::Result<Vec<&[Node]>, _>>()?;
            let mut common = Vec::with_capacity(args.len());
            let mut frontier = Vec::new();
            for (position, arg) in args.iter().enumerate() {
                let column: Vec<Node> = columns.iter().map(|a| a[position].clone()).collect();
                let (part, mut rest) = decompose(arg, &column)?;
                common.push(part);
                frontier.append(&mut rest);
            }
            Ok((Node::App(functor.clone(), common), frontier))
        }
        _ => match terms.iter().find(|t| *t != head) {
            Some(other) => Err((head.clone(), other.clone())),
            None => Ok((head.clone(), Vec::new())),
        },
    }
}

/// The unsolved and solved multiequations of one unification problem.
#[derive(Debug)]
pub struct MultiequationSystem {
    variables: IndexSet<String>,
    arena: Vec<Multiequation>,
    owner: Vec<Option<usize>>,
    unsolved: Vec<usize>,
    solved: Vec<Solved>,
}

impl MultiequationSystem {
    /// Sets up the problem `t0 = t1`.
    #[must_use]
    pub fn new(t0: &Term, t1: &Term) -> Self {
        let mut variables = IndexSet::new();
        let roots = vec![
            Node::from_term(t0, &mut variables),
            Node::from_term(t1, &mut variables),
        ];
        Self::build(variables, roots)
    }

    /// Sets up the problem of unifying two tuples column by column.
    fn for_tuples(a: &Tuple, b: &Tuple) -> Self {
        let mut variables = IndexSet::new();
        let mut wrap = |t: &Tuple| {
            Node::App(
                String::new(),
                t.iter().map(|term| Node::from_term(term, &mut variables)).collect(),
            )
        };
        let roots = vec![wrap(a), wrap(b)];
        Self::build(variables, roots)
    }

    fn build(variables: IndexSet<String>, roots: Vec<Node>) -> Self {
        let count = variables.len() + 1;
        let mut arena = Vec::with_capacity(count);
        arena.push(Multiequation::new(IndexSet::from([ROOT]), roots));
        arena.extend((1..count).map(|v| Multiequation::new(IndexSet::from([v]), Vec::new())));
        Self {
            variables,
            arena,
            owner: (0..count).map(Some).collect(),
            unsolved: (0..count).collect(),
            solved: Vec::new(),
        }
    }

    /// Number of multiequations still to reduce.
    #[must_use]
    pub fn unsolved_len(&self) -> usize {
        self.unsolved.len()
    }

    /// Number of multiequations reduced so far.
    #[must_use]
    pub fn solved_len(&self) -> usize {
        self.solved.len()
    }

    /// Reduces one multiequation. Returns whether work remains.
    ///
    /// # Errors
    ///
    /// Returns the [`UnifyFailure`] that makes the system unsolvable.
    pub fn step(&mut self) -> std::result::Result<bool, UnifyFailure> {
        self.count_occurrences();
        let Some((position, index)) = self
            .unsolved
            .iter()
            .copied()
            .enumerate()
            .min_by_key(|&(_, i)| self.arena[i].counter)
        else {
            return Ok(false);
        };
        let counter = self.arena[index].counter;
        trace!(
            "reduce {{{}}} with {} terms, n = {counter}",
            self.names(&self.arena[index].vars).join(", "),
            self.arena[index].terms.len()
        );
        if counter != 0 {
            let variables = self.names(&self.arena[index].vars);
            debug!("unification cycle through {}", variables.join(", "));
            return Err(UnifyFailure::Cycle { variables });
        }

        self.unsolved.remove(position);
        let equation = &mut self.arena[index];
        equation.retired = true;
        let vars = mem::take(&mut equation.vars);
        let terms = mem::take(&mut equation.terms);
        for &v in &vars {
            self.owner[v] = None;
        }
        let Some(head) = terms.first() else {
            self.solved.push(Solved { vars, common: None });
            return Ok(!self.unsolved.is_empty());
        };
        let (common, frontier) = decompose(head, &terms).map_err(|(left, right)| {
            let failure = UnifyFailure::Clash {
                left: self.term(&left),
                right: self.term(&right),
            };
            debug!("unification clash: {failure}");
            failure
        })?;
        self.solved.push(Solved {
            vars,
            common: Some(common),
        });
        for part in frontier {
            self.compactify(part);
        }
        Ok(!self.unsolved.is_empty())
    }

    /// Runs the reduction to completion and reads back the unifier.
    ///
    /// # Errors
    ///
    /// Returns the [`UnifyFailure`] that makes the system unsolvable.
    pub fn solve(mut self) -> std::result::Result<Substitution, UnifyFailure> {
        while self.step()? {}
        self.substitution()
    }

    // Merges a frontier multiequation with every unsolved one sharing a
    // variable with it.
    fn compactify(&mut self, part: Frontier) {
        let absorbed: IndexSet<usize> = part.vars.iter().filter_map(|&v| self.owner[v]).collect();
        let mut vars = IndexSet::new();
        let mut terms: Vec<Node> = Vec::new();
        for &i in &absorbed {
            let equation = &mut self.arena[i];
            equation.retired = true;
            vars.extend(equation.vars.drain(..));
            terms.append(&mut equation.terms);
        }
        vars.extend(part.vars);
        for term in part.terms {
            if !terms.contains(&term) {
                terms.push(term);
            }
        }
        let index = self.arena.len();
        for &v in &vars {
            self.owner[v] = Some(index);
        }
        self.arena.push(Multiequation::new(vars, terms));
        self.unsolved.retain(|&i| !self.arena[i].retired);
        self.unsolved.push(index);
    }

    // Occurrences include the multiequation's own terms, so a variable
    // inside its own right-hand side keeps the counter positive.
    fn count_occurrences(&mut self) {
        let mut occurrences = vec![0; self.variables.len() + 1];
        for &i in &self.unsolved {
            for term in &self.arena[i].terms {
                term.count(&mut occurrences);
            }
        }
        for &i in &self.unsolved {
            let equation = &mut self.arena[i];
            equation.counter = equation.vars.iter().map(|&v| occurrences[v]).sum();
        }
    }

    fn substitution(&self) -> std::result::Result<Substitution, UnifyFailure> {
        let mut binding: Vec<Option<Node>> = vec![None; self.variables.len() + 1];
        for solved in &self.solved {
            match &solved.common {
                Some(common) => {
                    for &v in &solved.vars {
                        binding[v] = Some(common.clone());
                    }
                }
                None => {
                    let Some(representative) = solved.vars.iter().copied().filter(|&v| v != ROOT).min()
                    else {
                        continue;
                    };
                    for &v in solved.vars.iter().filter(|&&v| v != representative) {
                        binding[v] = Some(Node::Var(representative));
                    }
                }
            }
        }

        let mut resolver = Resolver {
            system: self,
            binding: &binding,
            memo: vec![None; binding.len()],
            active: vec![false; binding.len()],
        };
        let mut bindings = IndexMap::new();
        for (offset, name) in self.variables.iter().enumerate() {
            let v = offset + 1;
            if binding[v].is_some() {
                bindings.insert(name.clone(), resolver.resolve(&Node::Var(v))?);
            }
        }
        Ok(Substitution { bindings })
    }

    fn name(&self, v: VarId) -> String {
        v.checked_sub(1)
            .and_then(|i| self.variables.get_index(i))
            .cloned()
            .unwrap_or_default()
    }

    fn names(&self, vars: &IndexSet<VarId>) -> Vec<String> {
        vars.iter()
            .filter(|&&v| v != ROOT)
            .map(|&v| self.name(v))
            .collect()
    }

    fn term(&self, node: &Node) -> Term {
        match node {
            Node::Var(v) => Term::Variable(self.name(*v)),
            Node::Atom(t) => t.clone(),
            Node::App(functor, args) => Term::Constructed {
                functor: functor.clone(),
                args: args.iter().map(|a| self.term(a)).collect(),
            },
        }
    }
}

// Backward substitution over the solved bindings.
struct Resolver<'a> {
    system: &'a MultiequationSystem,
    binding: &'a [Option<Node>],
    memo: Vec<Option<Term>>,
    active: Vec<bool>,
}

impl Resolver<'_> {
    fn resolve(&mut self, node: &Node) -> std::result::Result<Term, UnifyFailure> {
        match node {
            Node::Var(v) => {
                if let Some(done) = &self.memo[*v] {
                    return Ok(done.clone());
                }
                let binding = self.binding;
                let Some(bound) = &binding[*v] else {
                    return Ok(Term::Variable(self.system.name(*v)));
                };
                if self.active[*v] {
                    return Err(UnifyFailure::Cycle {
                        variables: vec![self.system.name(*v)],
                    });
                }
                self.active[*v] = true;
                let term = self.resolve(bound)?;
                self.active[*v] = false;
                self.memo[*v] = Some(term.clone());
                Ok(term)
            }
            Node::Atom(t) => Ok(t.clone()),
            Node::App(functor, args) => Ok(Term::Constructed {
                functor: functor.clone(),
                args: args
                    .iter()
                    .map(|a| self.resolve(a))
                    .collect::<std::result::Result<_, _>>()?,
            }),
        }
    }
}

/// A most general unifier: variable names mapped to fully resolved terms.
///
/// Variables left free by the unifier do not appear; a variable merely
/// aliased to another maps to that other variable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Substitution {
    bindings: IndexMap<String, Term>,
}

impl Substitution {
    /// The term bound to variable `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Term> {
        self.bindings.get(name)
    }

    /// Whether `name` is bound.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }

    /// Number of bound variables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Whether no variable is bound.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Bindings in order of the variables' first appearance.
    pub fn iter(&self) -> indexmap::map::Iter<'_, String, Term> {
        self.bindings.iter()
    }

    /// Replaces the bound variables of `term`.
    #[must_use]
    pub fn apply(&self, term: &Term) -> Term {
        match term {
            Term::Variable(name) => self.get(name).cloned().unwrap_or_else(|| term.clone()),
            Term::Constructed { functor, args } => Term::Constructed {
                functor: functor.clone(),
                args: args.iter().map(|a| self.apply(a)).collect(),
            },
            other => other.clone(),
        }
    }

    /// Applies the substitution to every term of `tuple`.
    #[must_use]
    pub fn apply_tuple(&self, tuple: &Tuple) -> Tuple {
        tuple.iter().map(|t| self.apply(t)).collect()
    }
}

impl<'a> IntoIterator for &'a Substitution {
    type Item = (&'a String, &'a Term);
    type IntoIter = indexmap::map::Iter<'a, String, Term>;

    fn into_iter(self) -> Self::IntoIter {
        self.bindings.iter()
    }
}

impl fmt::Display for Substitution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (name, term)) in self.bindings.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "?{name} -> {term}")?;
        }
        f.write_str("}")
    }
}

/// Unifies two terms.
///
/// # Errors
///
/// Returns the clash or cycle that prevents unification.
pub fn try_unify(t0: &Term, t1: &Term) -> std::result::Result<Substitution, UnifyFailure> {
    MultiequationSystem::new(t0, t1).solve()
}

/// Most general unifier of two terms, or `None` when there is none.
#[must_use]
pub fn unify(t0: &Term, t1: &Term) -> Option<Substitution> {
    try_unify(t0, t1).ok()
}

/// Unifies two tuples column by column.
///
/// # Errors
///
/// Returns [`EvalError::Precondition`] when the arities differ.
pub fn unify_tuples(a: &Tuple, b: &Tuple) -> Result<Option<Substitution>> {
    if a.arity() != b.arity() {
        return Err(EvalError::precondition(
            "unify_tuples",
            format!("{a} and {b} differ in arity"),
        ));
    }
    Ok(MultiequationSystem::for_tuples(a, b).solve().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuple;

    fn f(args: Vec<Term>) -> Term {
        Term::constructed("f", args)
    }

    fn g(args: Vec<Term>) -> Term {
        Term::constructed("g", args)
    }

    fn x() -> Term {
        Term::var("X")
    }

    fn y() -> Term {
        Term::var("Y")
    }

    fn assert_sound(t0: &Term, t1: &Term) -> Substitution {
        let s = try_unify(t0, t1).expect("unifiable");
        assert_eq!(s.apply(t0), s.apply(t1), "{s} does not unify {t0} and {t1}");
        s
    }

    #[test]
    fn test_binds_both_sides() {
        let s = assert_sound(&f(vec![x(), Term::Integer(2)]), &f(vec![Term::Integer(1), y()]));
        assert_eq!(s.get("X"), Some(&Term::Integer(1)));
        assert_eq!(s.get("Y"), Some(&Term::Integer(2)));
        assert_eq!(s.len(), 2);
        assert_eq!(s.to_string(), "{?X -> 1, ?Y -> 2}");
    }

    #[test]
    fn test_functor_clash() {
        let err = try_unify(&f(vec![x()]), &g(vec![x()])).unwrap_err();
        assert!(matches!(err, UnifyFailure::Clash { .. }), "{err}");
        assert!(unify(&f(vec![x()]), &f(vec![x(), y()])).is_none(), "Arity differs");
    }

    #[test]
    fn test_constant_clash_through_shared_variable() {
        let err = try_unify(
            &f(vec![x(), x()]),
            &f(vec![Term::Integer(1), Term::Integer(2)]),
        )
        .unwrap_err();
        assert_eq!(
            err,
            UnifyFailure::Clash {
                left: Term::Integer(1),
                right: Term::Integer(2)
            }
        );
    }

    #[test]
    fn test_occurs_check() {
        let err = try_unify(&x(), &f(vec![x()])).unwrap_err();
        assert_eq!(
            err,
            UnifyFailure::Cycle {
                variables: vec!["X".to_string()]
            }
        );
    }

    #[test]
    fn test_indirect_cycle() {
        let t0 = g(vec![x(), f(vec![x()])]);
        let t1 = g(vec![f(vec![y()]), y()]);
        assert!(matches!(try_unify(&t0, &t1), Err(UnifyFailure::Cycle { .. })));
    }

    #[test]
    fn test_variables_alias_to_the_earliest() {
        let s = assert_sound(&x(), &y());
        assert_eq!(s.get("Y"), Some(&x()));
        assert!(!s.contains("X"), "The representative stays free");
    }

    #[test]
    fn test_nested_structures() {
        let z = Term::var("Z");
        let t0 = f(vec![x(), g(vec![y()])]);
        let t1 = f(vec![g(vec![z.clone()]), x()]);
        let s = assert_sound(&t0, &t1);
        assert_eq!(s.get("X"), Some(&g(vec![y()])));
        assert_eq!(s.get("Z"), Some(&y()));
    }

    #[test]
    fn test_chained_bindings_resolve_fully() {
        let t0 = f(vec![x(), y(), Term::string("a")]);
        let t1 = f(vec![g(vec![y()]), Term::var("Z"), Term::var("Z")]);
        let s = assert_sound(&t0, &t1);
        assert_eq!(s.get("X"), Some(&g(vec![Term::string("a")])));
        assert_eq!(s.get("Y"), Some(&Term::string("a")));
    }

    #[test]
    fn test_ground_terms() {
        let a = f(vec![Term::Integer(1)]);
        assert!(try_unify(&a, &a.clone()).expect("identical").is_empty());
        assert!(unify(&Term::Integer(1), &Term::Double(1.0)).is_none(), "Kinds differ");
    }

    #[test]
    fn test_stepping_the_system() {
        let mut system = MultiequationSystem::new(&x(), &Term::Integer(1));
        assert_eq!(system.unsolved_len(), 2);
        assert_eq!(system.solved_len(), 0);
        assert_eq!(system.step(), Ok(true));
        assert_eq!(system.solved_len(), 1);
        assert_eq!(system.step(), Ok(false));
        assert_eq!(system.unsolved_len(), 0);
        let s = system.solve().expect("solved");
        assert_eq!(s.get("X"), Some(&Term::Integer(1)));
    }

    #[test]
    fn test_tuples() {
        let a = tuple![x(), 2];
        let b = tuple![1, y()];
        let s = unify_tuples(&a, &b).expect("same arity").expect("unifiable");
        assert_eq!(s.apply_tuple(&a), tuple![1, 2]);
        assert_eq!(s.apply_tuple(&b), tuple![1, 2]);
        assert_eq!(unify_tuples(&a, &tuple![3, 4]).expect("same arity"), None);
        assert!(unify_tuples(&a, &tuple![1]).is_err());
    }
}
