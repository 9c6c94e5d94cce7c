//! Gene Ontology reasoning over the subclass ("is-a") relation.
//!
//! Every algorithm here keys its edge acceptance on the graph's namespace
//! mode: the locally or globally qualified forms of the GO term prefix and
//! `rdfs:subClassOf`. With the namespace still unset the algorithms return
//! empty or negative results rather than errors; an empty graph is an
//! expected input, not a failure.

use ahash::AHashMap;
use roaring::RoaringTreemap;
use serde::{Deserialize, Serialize};

use ontograph_rdf::{Statement, Term};

use crate::graph::{Graph, Namespace};
use crate::traverse::{breadth_first, connected_by_any, depth_first, MultiEdge, Reversed};

// ============================================================================
// Namespace vocabulary
// ============================================================================

/// The literal forms of the GO vocabulary under one namespace mode.
struct Vocabulary {
    term_prefix: &'static str,
    sub_class_of: &'static str,
    deprecated: &'static str,
    true_literal: &'static str,
    standard_roots: [&'static str; 3],
}

/// molecular_function, cellular_component, biological_process.
const LOCAL_VOCAB: Vocabulary = Vocabulary {
    term_prefix: "<obo:GO_",
    sub_class_of: "<rdfs:subClassOf>",
    deprecated: "<owl:deprecated>",
    true_literal: r#""true"^^<xsd:boolean>"#,
    standard_roots: ["<obo:GO_0003674>", "<obo:GO_0005575>", "<obo:GO_0008150>"],
};

const GLOBAL_VOCAB: Vocabulary = Vocabulary {
    term_prefix: "<http://purl.obolibrary.org/obo/GO_",
    sub_class_of: "<http://www.w3.org/2000/01/rdf-schema#subClassOf>",
    deprecated: "<http://www.w3.org/2002/07/owl#deprecated>",
    true_literal: r#""true"^^<http://www.w3.org/2001/XMLSchema#boolean>"#,
    standard_roots: [
        "<http://purl.obolibrary.org/obo/GO_0003674>",
        "<http://purl.obolibrary.org/obo/GO_0005575>",
        "<http://purl.obolibrary.org/obo/GO_0008150>",
    ],
};

fn vocabulary(namespace: Namespace) -> Option<&'static Vocabulary> {
    match namespace {
        Namespace::Local => Some(&LOCAL_VOCAB),
        Namespace::Global => Some(&GLOBAL_VOCAB),
        Namespace::Unset => None,
    }
}

impl Vocabulary {
    fn is_go_term(&self, t: &Term) -> bool {
        t.value.starts_with(self.term_prefix)
    }

    /// Accept edges carrying a subclass statement whose object is a GO term
    /// (the direction used when walking toward superclasses).
    fn is_a_toward_ancestors(&self, s: &Statement) -> bool {
        s.object.value.starts_with(self.term_prefix) && s.predicate.value == self.sub_class_of
    }

    /// Accept edges carrying a subclass statement whose subject is a GO term
    /// (the direction used when walking a reversed view toward subclasses).
    fn is_a_toward_descendants(&self, s: &Statement) -> bool {
        s.subject.value.starts_with(self.term_prefix) && s.predicate.value == self.sub_class_of
    }
}

// ============================================================================
// Descendancy
// ============================================================================

/// A descendancy relationship: a term and its BFS level below an ancestor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descendant {
    pub term: Term,
    pub depth: usize,
}

impl Graph {
    /// All the roots of the graph.
    ///
    /// First checks the three canonical roots (molecular_function,
    /// cellular_component, biological_process) in the active namespace; if
    /// any is present and `force` is false, that subset is returned.
    /// Otherwise every node is walked depth-first along is-a edges to find
    /// the complete root set: GO terms that are not deprecated and have no
    /// further subclass edge out. Deduplicated by handle, sorted by handle.
    pub fn roots(&self, force: bool) -> Vec<Term> {
        let Some(v) = vocabulary(self.namespace()) else {
            return Vec::new();
        };

        let mut root_set: AHashMap<u64, Term> = AHashMap::new();
        for text in v.standard_roots {
            if let Some(t) = self.term_for(text) {
                root_set.insert(t.uid, t.clone());
            }
        }

        if force || root_set.is_empty() {
            for n in self.nodes() {
                let found = depth_first(
                    self,
                    n.uid,
                    |e| connected_by_any(e, |s| v.is_a_toward_ancestors(s)),
                    |t| self.is_root_candidate(t, v),
                );
                if let Some(t) = found {
                    root_set.insert(t.uid, t);
                }
            }
        }

        let mut roots: Vec<Term> = root_set.into_values().collect();
        roots.sort_by_key(|t| t.uid);
        roots
    }

    fn is_root_candidate(&self, t: &Term, v: &Vocabulary) -> bool {
        if !v.is_go_term(t) {
            return false;
        }
        // Deprecated terms may be dead ends rather than roots.
        let deprecated = self
            .query([t.clone()])
            .out(|s| s.predicate.value == v.deprecated && s.object.value == v.true_literal);
        if !deprecated.result().is_empty() {
            return false;
        }
        // A root has no further subclass edge to another GO term.
        let more = self.query([t.clone()]).out(|s| v.is_a_toward_ancestors(s));
        more.result().is_empty()
    }

    /// All descendants of `t` with their BFS level below it. Empty if `t`
    /// is not a GO term or the namespace mode is unset.
    pub fn descendants_of(&self, t: &Term) -> Vec<Descendant> {
        let Some(v) = vocabulary(self.namespace()) else {
            return Vec::new();
        };
        if !v.is_go_term(t) {
            return Vec::new();
        }
        let Some(start) = self.resolve_uid(t) else {
            return Vec::new();
        };
        let mut descendants = Vec::new();
        breadth_first(
            &Reversed(self),
            start,
            |e| connected_by_any(e, |s| v.is_a_toward_descendants(s)),
            |n, depth| {
                if n.uid != start {
                    descendants.push(Descendant {
                        term: n.clone(),
                        depth,
                    });
                }
                false
            },
        );
        descendants
    }

    /// Whether `q` is a descendant of `a`, and how many subclass levels
    /// separate them if so. `None` when it is not, when either term is
    /// outside the GO namespace, or when the namespace mode is unset.
    pub fn is_descendant_of(&self, a: &Term, q: &Term) -> Option<usize> {
        let v = vocabulary(self.namespace())?;
        if !v.is_go_term(a) || !v.is_go_term(q) {
            return None;
        }
        let start = self.resolve_uid(q)?;
        let mut depth_found = None;
        breadth_first(
            self,
            start,
            |e| connected_by_any(e, |s| v.is_a_toward_ancestors(s)),
            |n, depth| {
                if n.value == a.value {
                    depth_found = Some(depth);
                    true
                } else {
                    false
                }
            },
        );
        depth_found
    }

    /// The closest common ancestor of `a` and `b`, if one exists.
    ///
    /// BFS from `a` records its ancestor closure; a second BFS from `b`
    /// returns the first node of that closure it visits, so ties break by
    /// `b`'s visitation order.
    pub fn closest_common_ancestor(&self, a: &Term, b: &Term) -> Option<Term> {
        let v = vocabulary(self.namespace())?;
        if !v.is_go_term(a) || !v.is_go_term(b) {
            return None;
        }
        if a.value == b.value {
            return Some(a.clone());
        }
        let a_start = self.resolve_uid(a)?;
        let b_start = self.resolve_uid(b)?;

        let accept = |e: &MultiEdge<'_>| connected_by_any(e, |s| v.is_a_toward_ancestors(s));

        let mut seen = RoaringTreemap::new();
        breadth_first(self, a_start, &accept, |n, _| {
            seen.insert(n.uid);
            false
        });

        let mut ancestor = None;
        breadth_first(self, b_start, &accept, |n, _| {
            if seen.contains(n.uid) {
                ancestor = Some(n.clone());
                true
            } else {
                false
            }
        });
        ancestor
    }
}
