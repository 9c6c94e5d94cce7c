use ontograph_graph::{Graph, Query, Statement, Term};
use proptest::prelude::*;

const NODE_COUNT: usize = 8;

/// A chain n0 -> n1 -> ... -> n7 under one predicate.
fn chain() -> Graph {
    let mut g = Graph::new();
    for i in 0..NODE_COUNT - 1 {
        let mut s = Statement::new(
            Term::new(format!("<ex:n{i}>")),
            Term::new("<ex:p>"),
            Term::new(format!("<ex:n{}>", i + 1)),
        );
        g.add_statement(&mut s).expect("chain statement is valid");
    }
    g
}

fn frontier<'g>(g: &'g Graph, indices: &[usize]) -> Query<'g> {
    g.query(indices.iter().map(|i| {
        g.term_for(&format!("<ex:n{i}>"))
            .expect("chain node exists")
            .clone()
    }))
}

fn uids(q: &Query<'_>) -> Vec<u64> {
    q.result().iter().map(|t| t.uid).collect()
}

fn indices() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0..NODE_COUNT, 0..=12)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    #[test]
    fn unique_is_idempotent(xs in indices()) {
        let g = chain();
        let q = frontier(&g, &xs);
        prop_assert_eq!(uids(&q.unique()), uids(&q.unique().unique()));
    }

    #[test]
    fn and_with_self_is_unique(xs in indices()) {
        let g = chain();
        let q = frontier(&g, &xs);
        prop_assert_eq!(uids(&q.and(&q)), uids(&q.unique()));
    }

    #[test]
    fn or_with_empty_is_unique(xs in indices()) {
        let g = chain();
        let q = frontier(&g, &xs);
        let empty = g.query(Vec::new());
        prop_assert_eq!(uids(&q.or(&empty)), uids(&q.unique()));
    }

    #[test]
    fn not_with_self_is_empty(xs in indices()) {
        let g = chain();
        let q = frontier(&g, &xs);
        prop_assert!(q.not(&q).result().is_empty());
    }

    #[test]
    fn and_is_commutative(xs in indices(), ys in indices()) {
        let g = chain();
        let a = frontier(&g, &xs);
        let b = frontier(&g, &ys);
        prop_assert_eq!(uids(&a.and(&b)), uids(&b.and(&a)));
    }

    #[test]
    fn or_is_commutative(xs in indices(), ys in indices()) {
        let g = chain();
        let a = frontier(&g, &xs);
        let b = frontier(&g, &ys);
        prop_assert_eq!(uids(&a.or(&b)), uids(&b.or(&a)));
    }

    #[test]
    fn out_then_in_returns_to_the_frontier(xs in indices()) {
        let g = chain();
        // Interior chain nodes have exactly one successor and one
        // predecessor, so out-then-in restricted to them must be identity
        // up to duplicates.
        let interior: Vec<usize> = xs.into_iter().filter(|&i| i + 1 < NODE_COUNT).collect();
        let q = frontier(&g, &interior).unique();
        let round_trip = q.out(|_| true).in_(|_| true).unique();
        prop_assert_eq!(uids(&round_trip), uids(&q));
    }

    #[test]
    fn de_morgan_over_a_fixed_universe(xs in indices(), ys in indices()) {
        let g = chain();
        let universe = frontier(&g, &(0..NODE_COUNT).collect::<Vec<_>>());
        let a = frontier(&g, &xs);
        let b = frontier(&g, &ys);
        let lhs = universe.not(&a.or(&b));
        let rhs = universe.not(&a).and(&universe.not(&b));
        prop_assert_eq!(uids(&lhs), uids(&rhs));
    }
}
