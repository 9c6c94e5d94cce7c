//! A composable boolean query algebra over sets of terms.
//!
//! A [`Query`] is an ordered frontier of terms bound to one graph. Each
//! combinator returns a new query and leaves the receiver untouched, so
//! pipelines can branch. `out`/`in_` are traversal steps; `and`/`or`/`not`
//! are set operations over handle-sorted frontiers and suppress duplicate
//! handles in their output, so `q.and(&q)` equals `q.unique()`.

use std::cmp::Ordering;
use std::ptr;

use ontograph_rdf::{Statement, Term};

use crate::graph::Graph;
use crate::traverse::connected_by_any;

/// A step in a graph query.
#[derive(Debug, Clone)]
pub struct Query<'g> {
    graph: &'g Graph,
    terms: Vec<Term>,
}

impl Graph {
    /// A query starting from the given terms. Queries may not be mixed
    /// between distinct graphs.
    pub fn query<I>(&self, from: I) -> Query<'_>
    where
        I: IntoIterator<Item = Term>,
    {
        Query {
            graph: self,
            terms: from.into_iter().collect(),
        }
    }
}

impl<'g> Query<'g> {
    /// Terms reachable out from the frontier via statements satisfying
    /// `accept`. The result may contain duplicates when several frontier
    /// terms reach the same neighbor; collapse with [`Query::unique`].
    pub fn out<F>(&self, accept: F) -> Query<'g>
    where
        F: Fn(&Statement) -> bool,
    {
        let mut terms = Vec::new();
        for t in &self.terms {
            let Some(id) = self.graph.resolve_uid(t) else {
                continue;
            };
            for v in self.graph.from_ids(id) {
                let Some(e) = self.graph.edge(id, v) else {
                    continue;
                };
                if connected_by_any(&e, &accept) {
                    if let Some(n) = self.graph.node(v) {
                        terms.push(n.clone());
                    }
                }
            }
        }
        Query {
            graph: self.graph,
            terms,
        }
    }

    /// Terms reachable in from the frontier via statements satisfying
    /// `accept`.
    pub fn in_<F>(&self, accept: F) -> Query<'g>
    where
        F: Fn(&Statement) -> bool,
    {
        let mut terms = Vec::new();
        for t in &self.terms {
            let Some(id) = self.graph.resolve_uid(t) else {
                continue;
            };
            for u in self.graph.to_ids(id) {
                let Some(e) = self.graph.edge(u, id) else {
                    continue;
                };
                if connected_by_any(&e, &accept) {
                    if let Some(n) = self.graph.node(u) {
                        terms.push(n.clone());
                    }
                }
            }
        }
        Query {
            graph: self.graph,
            terms,
        }
    }

    /// Set intersection with `p`, deduplicated, ordered by handle.
    ///
    /// # Panics
    ///
    /// Panics if `p` was created from a different graph.
    pub fn and(&self, p: &Query<'g>) -> Query<'g> {
        self.assert_same_graph(p);
        let a = self.sorted_terms();
        let b = p.sorted_terms();
        let mut terms = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].uid.cmp(&b[j].uid) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    push_unique(&mut terms, &a[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        Query {
            graph: self.graph,
            terms,
        }
    }

    /// Set union with `p`, deduplicated, ordered by handle.
    ///
    /// # Panics
    ///
    /// Panics if `p` was created from a different graph.
    pub fn or(&self, p: &Query<'g>) -> Query<'g> {
        self.assert_same_graph(p);
        let a = self.sorted_terms();
        let b = p.sorted_terms();
        let mut terms = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].uid.cmp(&b[j].uid) {
                Ordering::Less => {
                    push_unique(&mut terms, &a[i]);
                    i += 1;
                }
                Ordering::Greater => {
                    push_unique(&mut terms, &b[j]);
                    j += 1;
                }
                Ordering::Equal => {
                    push_unique(&mut terms, &a[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        for t in &a[i..] {
            push_unique(&mut terms, t);
        }
        for t in &b[j..] {
            push_unique(&mut terms, t);
        }
        Query {
            graph: self.graph,
            terms,
        }
    }

    /// Set difference: the terms of `self` not present in `p`,
    /// deduplicated, ordered by handle.
    ///
    /// # Panics
    ///
    /// Panics if `p` was created from a different graph.
    pub fn not(&self, p: &Query<'g>) -> Query<'g> {
        self.assert_same_graph(p);
        let a = self.sorted_terms();
        let b = p.sorted_terms();
        let mut terms = Vec::new();
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            match a[i].uid.cmp(&b[j].uid) {
                Ordering::Less => {
                    push_unique(&mut terms, &a[i]);
                    i += 1;
                }
                Ordering::Greater => j += 1,
                Ordering::Equal => i += 1,
            }
        }
        for t in &a[i..] {
            push_unique(&mut terms, t);
        }
        Query {
            graph: self.graph,
            terms,
        }
    }

    /// One instance of each term, ordered by handle.
    pub fn unique(&self) -> Query<'g> {
        let sorted = self.sorted_terms();
        let mut terms = Vec::new();
        for t in &sorted {
            push_unique(&mut terms, t);
        }
        Query {
            graph: self.graph,
            terms,
        }
    }

    /// The terms held by the query. After any set combinator the ordering
    /// is by handle, not insertion order.
    pub fn result(&self) -> &[Term] {
        &self.terms
    }

    /// Consume the query, yielding its frontier.
    pub fn into_terms(self) -> Vec<Term> {
        self.terms
    }

    fn sorted_terms(&self) -> Vec<Term> {
        let mut terms = self.terms.clone();
        terms.sort_by_key(|t| t.uid);
        terms
    }

    fn assert_same_graph(&self, p: &Query<'_>) {
        assert!(
            ptr::eq(self.graph, p.graph),
            "binary query operation parameters from distinct graphs"
        );
    }
}

fn push_unique(out: &mut Vec<Term>, t: &Term) {
    if out.last().map_or(true, |last| last.uid != t.uid) {
        out.push(t.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn knows(g: &mut Graph, s: &str, o: &str) {
        let mut statement = Statement::new(Term::new(s), Term::new("<ex:knows>"), Term::new(o));
        g.add_statement(&mut statement).unwrap();
    }

    fn likes(g: &mut Graph, s: &str, o: &str) {
        let mut statement = Statement::new(Term::new(s), Term::new("<ex:likes>"), Term::new(o));
        g.add_statement(&mut statement).unwrap();
    }

    fn social() -> Graph {
        let mut g = Graph::new();
        knows(&mut g, "<ex:alice>", "<ex:bob>");
        knows(&mut g, "<ex:bob>", "<ex:carol>");
        knows(&mut g, "<ex:dan>", "<ex:carol>");
        likes(&mut g, "<ex:alice>", "<ex:carol>");
        g
    }

    fn term(g: &Graph, text: &str) -> Term {
        g.term_for(text).unwrap().clone()
    }

    fn values(q: &Query<'_>) -> Vec<String> {
        q.result().iter().map(|t| t.value.clone()).collect()
    }

    #[test]
    fn out_follows_accepted_statements() {
        let g = social();
        let alice = term(&g, "<ex:alice>");
        let q = g
            .query([alice])
            .out(|s| s.predicate.value == "<ex:knows>");
        assert_eq!(values(&q), vec!["<ex:bob>".to_string()]);
    }

    #[test]
    fn in_follows_statements_backward() {
        let g = social();
        let carol = term(&g, "<ex:carol>");
        let q = g
            .query([carol])
            .in_(|s| s.predicate.value == "<ex:knows>")
            .unique();
        let mut got = values(&q);
        got.sort();
        assert_eq!(got, vec!["<ex:bob>".to_string(), "<ex:dan>".to_string()]);
    }

    #[test]
    fn out_preserves_duplicates_until_unique() {
        let g = social();
        let bob = term(&g, "<ex:bob>");
        let dan = term(&g, "<ex:dan>");
        let q = g
            .query([bob, dan])
            .out(|s| s.predicate.value == "<ex:knows>");
        assert_eq!(q.result().len(), 2);
        assert_eq!(q.unique().result().len(), 1);
    }

    #[test]
    fn seeds_with_unassigned_handles_resolve_by_value() {
        let g = social();
        let q = g
            .query([Term::new("<ex:alice>")])
            .out(|s| s.predicate.value == "<ex:likes>");
        assert_eq!(values(&q), vec!["<ex:carol>".to_string()]);
    }

    #[test]
    fn and_intersects() {
        let g = social();
        let knows_of_bob = g
            .query([term(&g, "<ex:bob>")])
            .out(|s| s.predicate.value == "<ex:knows>");
        let liked_by_alice = g
            .query([term(&g, "<ex:alice>")])
            .out(|s| s.predicate.value == "<ex:likes>");
        let both = knows_of_bob.and(&liked_by_alice);
        assert_eq!(values(&both), vec!["<ex:carol>".to_string()]);
    }

    #[test]
    fn or_unions_without_duplicates() {
        let g = social();
        let a = g.query([term(&g, "<ex:alice>"), term(&g, "<ex:bob>")]);
        let b = g.query([term(&g, "<ex:bob>"), term(&g, "<ex:carol>")]);
        let union = a.or(&b);
        assert_eq!(union.result().len(), 3);
    }

    #[test]
    fn not_subtracts() {
        let g = social();
        let a = g.query([term(&g, "<ex:alice>"), term(&g, "<ex:bob>")]);
        let b = g.query([term(&g, "<ex:bob>")]);
        let diff = a.not(&b);
        assert_eq!(values(&diff), vec!["<ex:alice>".to_string()]);
    }

    #[test]
    fn combinators_leave_their_operands_untouched() {
        let g = social();
        let a = g.query([term(&g, "<ex:bob>"), term(&g, "<ex:alice>")]);
        let before = values(&a);
        let _ = a.unique();
        let _ = a.and(&g.query([term(&g, "<ex:bob>")]));
        assert_eq!(values(&a), before);
    }

    #[test]
    #[should_panic(expected = "distinct graphs")]
    fn cross_graph_combination_panics() {
        let g1 = social();
        let g2 = social();
        let a = g1.query([term(&g1, "<ex:alice>")]);
        let b = g2.query([term(&g2, "<ex:alice>")]);
        let _ = a.and(&b);
    }
}
