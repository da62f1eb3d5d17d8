#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use rulecore::{try_unify, Term};

// cons(X0, cons(X1, ... nil)) against cons(0, cons(1, ... nil))
fn list(len: usize, element: impl Fn(usize) -> Term) -> Term {
    (0..len).rev().fold(Term::iri("nil"), |tail, i| {
        Term::constructed("cons", vec![element(i), tail])
    })
}

/// Benchmark for binding every element of a long list
fn bench_unify_list(c: &mut Criterion) {
    let pattern = list(200, |i| Term::var(format!("X{i}")));
    let ground = list(200, |i| Term::Long(i64::try_from(i).unwrap_or(i64::MAX)));

    c.bench_function("unify_list", |b| {
        b.iter(|| black_box(try_unify(black_box(&pattern), black_box(&ground))));
    });
}

/// Benchmark for a chain of variables aliased to one another
fn bench_unify_aliases(c: &mut Criterion) {
    let left = Term::constructed("f", (0..100).map(|i| Term::var(format!("A{i}"))).collect());
    let right = Term::constructed("f", (1..=100).map(|i| Term::var(format!("A{i}"))).collect());

    c.bench_function("unify_aliases", |b| {
        b.iter(|| black_box(try_unify(black_box(&left), black_box(&right))));
    });
}

/// Benchmark for detecting an occurs-check failure deep in a term
fn bench_unify_cycle(c: &mut Criterion) {
    let deep = list(100, |_| Term::var("Y"));
    let cyclic = Term::constructed("cons", vec![Term::var("Y"), Term::var("Y")]);

    c.bench_function("unify_cycle", |b| {
        b.iter(|| black_box(try_unify(black_box(&deep), black_box(&cyclic))));
    });
}

criterion_group!(
    benches,
    bench_unify_list,
    bench_unify_aliases,
    bench_unify_cycle
);
criterion_main!(benches);
