//! # Rulecore
//!
//! The evaluation core of a datalog-style rule engine.
//!
//! ## Features
//!
//! - Typed terms (numbers, strings, IRIs, dates, durations, binary data,
//!   constructed terms) with a total order
//! - Sorted relations with range queries over column permutations
//! - Relational operators: selection, projection, union, difference, the
//!   sort-merge join family, semi-joins and join complement
//! - Bidirectional built-in predicates (`ADD`, `LESS`, ...)
//! - Syntactic unification of terms
//!
//! ## Example
//!
//! ```rust
//! use rulecore::{join, tuple, JoinCondition, Relation};
//!
//! let r0 = Relation::from_tuples(2, [tuple![1, 2], tuple![3, 4]]).unwrap();
//! let r1 = Relation::from_tuples(2, [tuple![2, 9], tuple![4, 9]]).unwrap();
//! let joined = join(&r0, &r1, &[-1, 0], JoinCondition::Equals).unwrap();
//! assert_eq!(joined.tuples(), &[tuple![1, 2, 2, 9], tuple![3, 4, 4, 9]]);
//! ```

pub mod builtins;
pub mod config;
pub mod error;
pub mod ops;
pub mod relation;
pub mod term;
pub mod tuple;
pub mod unify;

pub use builtins::{builtin, lookup, Builtin, BuiltinPredicate, REGISTRY};
pub use config::{JoinConfig, JoinStrategy};
pub use error::{EvalError, Result};
pub use ops::{
    difference, evaluate_builtin, join, join_complement, optimize_projection, project, select,
    select_groups, select_pattern, semi_join, union, ColumnFilter, FusedJoin, Join, JoinCondition,
    Selection, Side,
};
pub use relation::{relation, Relation, SortOrder};
pub use term::{Duration, NumericKind, Term, TermKind};
pub use tuple::Tuple;
pub use unify::{try_unify, unify, unify_tuples, MultiequationSystem, Substitution, UnifyFailure};
