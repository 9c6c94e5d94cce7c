//! Generic breadth-first and depth-first walks over the multigraph.
//!
//! Walks are parameterized by an edge-acceptance predicate over the
//! multi-edge's carried statements and run against anything implementing
//! [`Traverse`], which [`Reversed`] uses to flip edge direction without
//! copying the graph.

use roaring::RoaringTreemap;
use std::collections::VecDeque;

use ontograph_rdf::{Statement, Term};

use crate::graph::Graph;

/// One endpoint pair and every statement ("line") carried between them.
#[derive(Debug, Clone)]
pub struct MultiEdge<'g> {
    pub from: &'g Term,
    pub to: &'g Term,
    pub statements: Vec<&'g Statement>,
}

/// Whether any statement carried by the edge satisfies `with`. Traversal
/// predicates are usually built from this.
pub fn connected_by_any<F>(edge: &MultiEdge<'_>, with: F) -> bool
where
    F: Fn(&Statement) -> bool,
{
    edge.statements.iter().any(|s| with(s))
}

/// The adjacency contract walks run against.
pub trait Traverse {
    fn node(&self, id: u64) -> Option<&Term>;
    fn from_ids(&self, id: u64) -> Vec<u64>;
    fn edge(&self, u: u64, v: u64) -> Option<MultiEdge<'_>>;
}

impl Traverse for Graph {
    fn node(&self, id: u64) -> Option<&Term> {
        Graph::node(self, id)
    }

    fn from_ids(&self, id: u64) -> Vec<u64> {
        Graph::from_ids(self, id)
    }

    fn edge(&self, u: u64, v: u64) -> Option<MultiEdge<'_>> {
        Graph::edge(self, u, v)
    }
}

/// A view of a graph with every edge reversed.
///
/// Only adjacency is flipped; edges are handed to the acceptance predicate
/// in their stored orientation, so statement subjects and objects read as
/// they were added.
#[derive(Debug, Clone, Copy)]
pub struct Reversed<'g>(pub &'g Graph);

impl Traverse for Reversed<'_> {
    fn node(&self, id: u64) -> Option<&Term> {
        self.0.node(id)
    }

    fn from_ids(&self, id: u64) -> Vec<u64> {
        self.0.to_ids(id)
    }

    fn edge(&self, u: u64, v: u64) -> Option<MultiEdge<'_>> {
        self.0.edge(v, u)
    }
}

/// Breadth-first walk from `start` over edges accepted by `traverse`.
///
/// `visit` receives each node once, with its BFS depth — the shortest-path
/// distance from `start` in the accepted-edge subgraph. Returns whether
/// `visit` terminated the walk early by returning `true`.
pub fn breadth_first<G, T, V>(g: &G, start: u64, mut traverse: T, mut visit: V) -> bool
where
    G: Traverse,
    T: FnMut(&MultiEdge<'_>) -> bool,
    V: FnMut(&Term, usize) -> bool,
{
    let mut visited = RoaringTreemap::new();
    let mut queue = VecDeque::new();
    visited.insert(start);
    queue.push_back((start, 0usize));
    while let Some((u, depth)) = queue.pop_front() {
        let Some(n) = g.node(u) else { continue };
        if visit(n, depth) {
            return true;
        }
        for v in g.from_ids(u) {
            if visited.contains(v) {
                continue;
            }
            let Some(e) = g.edge(u, v) else { continue };
            if traverse(&e) {
                visited.insert(v);
                queue.push_back((v, depth + 1));
            }
        }
    }
    false
}

/// Depth-first walk from `start` over edges accepted by `traverse`.
///
/// Stops at the first node for which `until` returns `true` and returns
/// it; `None` if the reachable subgraph is exhausted first.
pub fn depth_first<G, T, V>(g: &G, start: u64, mut traverse: T, mut until: V) -> Option<Term>
where
    G: Traverse,
    T: FnMut(&MultiEdge<'_>) -> bool,
    V: FnMut(&Term) -> bool,
{
    let mut visited = RoaringTreemap::new();
    let mut stack = vec![start];
    visited.insert(start);
    while let Some(u) = stack.pop() {
        let Some(n) = g.node(u) else { continue };
        if until(n) {
            return Some(n.clone());
        }
        for v in g.from_ids(u) {
            if visited.contains(v) {
                continue;
            }
            let Some(e) = g.edge(u, v) else { continue };
            if traverse(&e) {
                visited.insert(v);
                stack.push(v);
            }
        }
    }
    None
}
