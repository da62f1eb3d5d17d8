//! Evaluates rule bodies the way a fixpoint driver would, one operator at a
//! time.

use anyhow::Result;
use rulecore::{
    builtin, evaluate_builtin, join, join_complement, project, select_pattern, semi_join, tuple,
    unify_tuples, FusedJoin, JoinCondition, Relation, Selection, Side, Term,
};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn edges() -> Result<Relation> {
    Ok(Relation::from_tuples(
        2,
        [tuple![1, 2], tuple![2, 3], tuple![3, 4], tuple![2, 5]],
    )?)
}

#[test]
fn test_join_on_shared_column() -> Result<()> {
    init_logging();
    let r0 = Relation::from_tuples(2, [tuple![1, 2], tuple![3, 4]])?;
    let r1 = Relation::from_tuples(2, [tuple![2, 9], tuple![4, 9]])?;
    let joined = join(&r0, &r1, &[1, -1], JoinCondition::Equals)?;
    // Column 0 of r0 against column 1 of r1 never matches.
    assert!(joined.is_empty());

    let joined = join(&r0, &r1, &[-1, 0], JoinCondition::Equals)?;
    assert_eq!(joined.tuples(), &[tuple![1, 2, 2, 9], tuple![3, 4, 4, 9]]);
    Ok(())
}

#[test]
fn test_two_step_paths() -> Result<()> {
    init_logging();
    // path2(X, Z) :- edge(X, Y), edge(Y, Z).
    let edge = edges()?;
    let paths = FusedJoin::new(&[-1, 0]).project(&[0, -1, -1, 1]).evaluate(&edge, &edge)?;
    assert_eq!(
        paths.tuples(),
        &[tuple![1, 3], tuple![1, 5], tuple![2, 4]]
    );
    Ok(())
}

#[test]
fn test_rule_with_constant_and_builtin() -> Result<()> {
    init_logging();
    // next(Y, W) :- edge(2, Y), ADD(Y, 10, W).
    let edge = edges()?;
    let from_two = select_pattern(&edge, &[Some(Term::Integer(2)), None])?;
    let ys = project(&from_two, &[-1, 0])?;
    let add = builtin("ADD", [Term::var("Y"), Term::Integer(10), Term::var("W")])?;
    let next = evaluate_builtin(&add, &ys, &["Y".to_string()], true)?;
    assert_eq!(next.tuples(), &[tuple![3, 13], tuple![5, 15]]);
    Ok(())
}

#[test]
fn test_negated_subgoal() -> Result<()> {
    init_logging();
    // sink(X, Y) :- edge(X, Y), not edge(Y, _).
    let edge = edges()?;
    let sources = project(&edge, &[0, -1])?;
    let sinks = join_complement(&edge, &sources, &[-1, 0])?;
    assert_eq!(sinks.tuples(), &[tuple![2, 5], tuple![3, 4]]);

    let with_successor = semi_join(&edge, &sources, &[-1, 0], JoinCondition::Equals, Side::Outer)?;
    assert_eq!(with_successor.len() + sinks.len(), edge.len());
    Ok(())
}

#[test]
fn test_threshold_join_with_selection() -> Result<()> {
    init_logging();
    // later(X, Y) :- edge(X, _), edge(Y, _), Y > X, X != 3.
    let edge = edges()?;
    let later = FusedJoin::new(&[0, -1])
        .select_outer(Selection::new().is_not(0, Term::Integer(3)))
        .condition(JoinCondition::GreaterThan)
        .project(&[0, -1, 1, -1])
        .evaluate(&edge, &edge)?;
    assert_eq!(later.tuples(), &[tuple![1, 2], tuple![1, 3], tuple![2, 3]]);
    Ok(())
}

#[test]
fn test_builtin_only_rule_body() -> Result<()> {
    init_logging();
    // p(X) :- 1 + X = 3.
    let add = builtin("ADD", [Term::Integer(1), Term::var("X"), Term::Integer(3)])?;
    let p = evaluate_builtin(&add, &Relation::new(0), &[], true)?;
    assert_eq!(p.tuples(), &[tuple![2]]);
    Ok(())
}

#[test]
fn test_unifying_rule_heads() -> Result<()> {
    init_logging();
    let head = tuple![Term::var("X"), Term::constructed("s", vec![Term::var("Y")])];
    let fact = tuple![1, Term::constructed("s", vec![Term::Integer(0)])];
    let s = unify_tuples(&head, &fact)?.expect("the fact matches the head");
    assert_eq!(s.apply_tuple(&head), fact);

    let mismatch = tuple![1, Term::constructed("z", vec![])];
    assert!(unify_tuples(&head, &mismatch)?.is_none());
    Ok(())
}
