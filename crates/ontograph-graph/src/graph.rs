//! The multigraph store: identity management, adjacency indexing, and
//! statement add/remove with orphan cleanup.
//!
//! Statements are labeled parallel edges ("lines") between term nodes. A
//! line's handle is its predicate's handle, so distinct predicates between
//! the same endpoint pair coexist and re-adding an identical triple is
//! idempotent. The forward and reverse indices are exact mirrors; every
//! mutation maintains both plus the predicate index and the interning table.

use ahash::{AHashMap, AHashSet};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace};

use ontograph_rdf::{Statement, Term, TermError, TermKind};

use crate::ids::IdSet;
use crate::traverse::MultiEdge;

// ============================================================================
// Namespace mode
// ============================================================================

/// Qualification style of the predicate IRIs in a graph, fixed by the first
/// statement added and enforced on every add thereafter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Namespace {
    /// No statement added yet.
    Unset,
    /// Qualified-name predicates, e.g. `<rdfs:subClassOf>`.
    Local,
    /// Full `http:` IRIs, e.g. `<http://www.w3.org/2000/01/rdf-schema#subClassOf>`.
    Global,
}

impl std::fmt::Display for Namespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Namespace::Unset => "unset",
            Namespace::Local => "local",
            Namespace::Global => "global",
        })
    }
}

// ============================================================================
// Errors
// ============================================================================

/// Invariant violations raised by store mutations.
///
/// All checks run before any index is touched, so a returned error leaves
/// the graph exactly as it was.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("invalid term: {0}")]
    Term(#[from] TermError),
    #[error("predicate is not an IRI: {0}")]
    PredicateNotIri(String),
    #[error("subject is not an IRI or blank node: {0}")]
    SubjectNotResource(String),
    #[error("adding predicate with {statement} IRI to {graph} namespaced graph: {predicate}")]
    NamespaceMismatch {
        predicate: String,
        graph: Namespace,
        statement: Namespace,
    },
    #[error("term ID collision: term:{value} new ID:{new} old ID:{old}")]
    IdentityConflict { value: String, new: u64, old: u64 },
    #[error("handle collision: ID {id} is already in use by another term")]
    HandleCollision { id: u64 },
    #[error("handle space exhausted")]
    IdsExhausted,
}

// ============================================================================
// Graph
// ============================================================================

/// Key of a line in the central statement table: (subject, line, object).
type LineKey = (u64, u64, u64);

/// An in-memory RDF multigraph with stable term identity.
///
/// All handles are owned by the graph. Terms and statements returned from
/// query methods are views into store state; any view obtained before a
/// mutation is invalidated by it, which the borrow checker enforces.
#[derive(Debug)]
pub struct Graph {
    /// Node table: handle -> term.
    nodes: AHashMap<u64, Term>,
    /// Central statement table, keyed by (subject, line, object).
    lines: AHashMap<LineKey, Statement>,
    /// Forward index: subject -> object -> line handles.
    from: AHashMap<u64, AHashMap<u64, AHashSet<u64>>>,
    /// Reverse index: object -> subject -> line handles. Mirror of `from`.
    to: AHashMap<u64, AHashMap<u64, AHashSet<u64>>>,
    /// Predicate index: predicate handle -> (subject, object) pairs.
    pred: AHashMap<u64, AHashSet<(u64, u64)>>,
    /// Interning table: canonical text -> handle.
    term_ids: AHashMap<String, u64>,
    ids: IdSet,
    namespace: Namespace,
}

impl Graph {
    pub fn new() -> Self {
        Self {
            nodes: AHashMap::new(),
            lines: AHashMap::new(),
            from: AHashMap::new(),
            to: AHashMap::new(),
            pred: AHashMap::new(),
            term_ids: AHashMap::new(),
            ids: IdSet::new(),
            namespace: Namespace::Unset,
        }
    }

    /// The graph's namespace mode, fixed by the first statement added.
    pub fn namespace(&self) -> Namespace {
        self.namespace
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Add `s` to the graph.
    ///
    /// The predicate must be an IRI, the subject an IRI or blank node, and
    /// the object any well-formed term. Zero term UIDs are assigned on
    /// return (mutating `s`); nonzero UIDs must be consistent with terms
    /// already interned. Predicate IRIs must all be globally namespaced
    /// (`http:` scheme) or all use qualified names; the first statement
    /// fixes the mode.
    ///
    /// Validation runs in full before any mutation, so an error leaves the
    /// graph unchanged.
    pub fn add_statement(&mut self, s: &mut Statement) -> Result<(), GraphError> {
        if s.predicate.kind()? != TermKind::Iri {
            return Err(GraphError::PredicateNotIri(s.predicate.value.clone()));
        }
        let mode = match s.predicate.iri_text() {
            Some(text) if text.starts_with("http:") => Namespace::Global,
            _ => Namespace::Local,
        };
        match self.namespace {
            Namespace::Unset => {}
            have if have == mode => {}
            have => {
                return Err(GraphError::NamespaceMismatch {
                    predicate: s.predicate.value.clone(),
                    graph: have,
                    statement: mode,
                })
            }
        }

        // The http IRI subjects and objects in the owl:Ontology header keep
        // us from checking object namespacing until the whole graph is
        // loaded, so objects are only checked for well-formedness.
        match s.subject.kind()? {
            TermKind::Iri | TermKind::Blank => {}
            TermKind::Literal => {
                return Err(GraphError::SubjectNotResource(s.subject.value.clone()))
            }
        }
        s.object.kind()?;

        self.check_term(&s.subject)?;
        self.check_term(&s.predicate)?;
        self.check_term(&s.object)?;
        Self::check_handle_pair(&s.subject, &s.predicate)?;
        Self::check_handle_pair(&s.subject, &s.object)?;
        Self::check_handle_pair(&s.predicate, &s.object)?;

        if self.namespace == Namespace::Unset {
            debug!(namespace = %mode, "namespace mode fixed by first statement");
        }
        self.namespace = mode;

        // Reserve claimed handles up front so a fresh term in the same
        // statement cannot be allocated one of them.
        for t in [&s.subject, &s.predicate, &s.object] {
            if t.uid != 0 {
                self.ids.mark_used(t.uid);
            }
        }

        self.intern(&mut s.subject)?;
        self.intern(&mut s.predicate)?;
        self.intern(&mut s.object)?;

        self.pred
            .entry(s.predicate.uid)
            .or_default()
            .insert((s.subject.uid, s.object.uid));
        self.set_line(s);
        trace!(
            subject = s.subject.uid,
            predicate = s.predicate.uid,
            object = s.object.uid,
            "statement added"
        );
        Ok(())
    }

    /// Remove `s` from the graph, leaving its terminal nodes if they are
    /// part of another statement. No-op if the statement is absent.
    pub fn remove_statement(&mut self, s: &Statement) {
        let (Some(su), Some(pu), Some(ou)) = (
            self.resolve_uid(&s.subject),
            self.resolve_uid(&s.predicate),
            self.resolve_uid(&s.object),
        ) else {
            return;
        };
        if !self
            .pred
            .get(&pu)
            .is_some_and(|pairs| pairs.contains(&(su, ou)))
        {
            return;
        }
        let Some(stored) = self.lines.get(&(su, pu, ou)).cloned() else {
            return;
        };

        self.remove_line(su, ou, pu);

        // Predicate index; the line handle is the predicate handle, so it is
        // released only once the predicate is fully unreferenced.
        if let Some(pairs) = self.pred.get_mut(&pu) {
            pairs.remove(&(su, ou));
            if pairs.is_empty() {
                self.pred.remove(&pu);
                if self.nodes.contains_key(&pu) {
                    self.clean_orphan(pu, &stored.predicate.value);
                } else if !self.from.contains_key(&pu) && !self.to.contains_key(&pu) {
                    self.ids.release(pu);
                    self.term_ids.remove(&stored.predicate.value);
                }
            }
        }

        self.clean_orphan(su, &stored.subject.value);
        self.clean_orphan(ou, &stored.object.value);
        trace!(subject = su, predicate = pu, object = ou, "statement removed");
    }

    /// Remove `t` and every statement referencing it. If `t` is a
    /// predicate, all statements carrying it are removed first. No-op if
    /// the term is unknown.
    pub fn remove_term(&mut self, t: &Term) {
        let Some(uid) = self.resolve_uid(t) else {
            return;
        };
        let value = self
            .nodes
            .get(&uid)
            .map(|n| n.value.clone())
            .unwrap_or_else(|| t.value.clone());

        // Statements carrying t as their predicate.
        let carried: Vec<Statement> = self
            .pred
            .get(&uid)
            .map(|pairs| {
                pairs
                    .iter()
                    .filter_map(|&(s_id, o_id)| self.lines.get(&(s_id, uid, o_id)).cloned())
                    .collect()
            })
            .unwrap_or_default();
        for st in &carried {
            self.remove_statement(st);
        }

        if !self.nodes.contains_key(&uid)
            && !self.from.contains_key(&uid)
            && !self.to.contains_key(&uid)
        {
            return;
        }

        // Statements with t as their subject, then as their object.
        let lines = &self.lines;
        let outgoing: Vec<Statement> = self
            .from
            .get(&uid)
            .map(|targets| {
                targets
                    .iter()
                    .flat_map(|(&o, line_set)| {
                        line_set
                            .iter()
                            .filter_map(move |&l| lines.get(&(uid, l, o)).cloned())
                    })
                    .collect()
            })
            .unwrap_or_default();
        for st in &outgoing {
            self.remove_statement(st);
        }

        let lines = &self.lines;
        let incoming: Vec<Statement> = self
            .to
            .get(&uid)
            .map(|sources| {
                sources
                    .iter()
                    .flat_map(|(&s_id, line_set)| {
                        line_set
                            .iter()
                            .filter_map(move |&l| lines.get(&(s_id, l, uid)).cloned())
                    })
                    .collect()
            })
            .unwrap_or_default();
        for st in &incoming {
            self.remove_statement(st);
        }

        // The cascade usually orphan-cleans the node; finish the job if not.
        if self.nodes.remove(&uid).is_some() {
            self.ids.release(uid);
            self.term_ids.remove(&value);
        }
        debug!(term = %value, "term removed");
    }

    // ========================================================================
    // Read views
    // ========================================================================

    /// The node with the given handle, if it exists.
    pub fn node(&self, id: u64) -> Option<&Term> {
        self.nodes.get(&id)
    }

    /// All nodes in the graph, in no particular order.
    pub fn nodes(&self) -> impl Iterator<Item = &Term> {
        self.nodes.values()
    }

    /// All statements in the graph, in no particular order.
    pub fn statements(&self) -> impl Iterator<Item = &Statement> {
        self.lines.values()
    }

    /// Nodes directly reachable from the node with handle `id`.
    pub fn from(&self, id: u64) -> Vec<&Term> {
        self.from_ids(id)
            .into_iter()
            .filter_map(|v| self.nodes.get(&v))
            .collect()
    }

    /// Nodes that reach the node with handle `id` directly.
    pub fn to(&self, id: u64) -> Vec<&Term> {
        self.to_ids(id)
            .into_iter()
            .filter_map(|v| self.nodes.get(&v))
            .collect()
    }

    /// Handles of nodes directly reachable from `id`.
    pub fn from_ids(&self, id: u64) -> Vec<u64> {
        self.from
            .get(&id)
            .map(|targets| targets.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Handles of nodes that reach `id` directly.
    pub fn to_ids(&self, id: u64) -> Vec<u64> {
        self.to
            .get(&id)
            .map(|sources| sources.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Nodes directly reachable from an RDF subject term.
    pub fn from_subject(&self, t: &Term) -> Vec<&Term> {
        self.resolve_uid(t).map(|id| self.from(id)).unwrap_or_default()
    }

    /// Nodes that reach an RDF object term directly.
    pub fn to_object(&self, t: &Term) -> Vec<&Term> {
        self.resolve_uid(t).map(|id| self.to(id)).unwrap_or_default()
    }

    /// The multi-edge from `u` to `v`, bundling every line between them.
    pub fn edge(&self, u: u64, v: u64) -> Option<MultiEdge<'_>> {
        let statements = self.lines(u, v);
        if statements.is_empty() {
            return None;
        }
        Some(MultiEdge {
            from: self.nodes.get(&u)?,
            to: self.nodes.get(&v)?,
            statements,
        })
    }

    /// All multi-edges in the graph.
    pub fn edges(&self) -> Vec<MultiEdge<'_>> {
        let mut out = Vec::new();
        for (&u, targets) in &self.from {
            for &v in targets.keys() {
                if let Some(e) = self.edge(u, v) {
                    out.push(e);
                }
            }
        }
        out
    }

    /// The statements on the edge from `u` to `v`; empty if there is none.
    pub fn lines(&self, u: u64, v: u64) -> Vec<&Statement> {
        self.from
            .get(&u)
            .and_then(|targets| targets.get(&v))
            .map(|line_set| {
                line_set
                    .iter()
                    .filter_map(|&l| self.lines.get(&(u, l, v)))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The statements connecting subject node `u` to object node `v`.
    pub fn statements_between(&self, u: u64, v: u64) -> Vec<&Statement> {
        self.lines(u, v)
    }

    /// Whether an edge exists between `x` and `y`, ignoring direction.
    pub fn has_edge_between(&self, x: u64, y: u64) -> bool {
        self.has_edge_from_to(x, y) || self.has_edge_from_to(y, x)
    }

    /// Whether an edge exists from `u` to `v`.
    pub fn has_edge_from_to(&self, u: u64, v: u64) -> bool {
        self.from
            .get(&u)
            .is_some_and(|targets| targets.contains_key(&v))
    }

    /// Resolve interned text to its term. The text must exactly match the
    /// term's canonical value. Predicate-only terms, which have no node
    /// table entry, are resolved through the predicate index.
    pub fn term_for(&self, text: &str) -> Option<&Term> {
        let &id = self.term_ids.get(text)?;
        if let Some(n) = self.nodes.get(&id) {
            return Some(n);
        }
        let pairs = self.pred.get(&id)?;
        let &(s_id, o_id) = pairs.iter().next()?;
        self.lines.get(&(s_id, id, o_id)).map(|st| &st.predicate)
    }

    /// One representative term per predicate used in the graph.
    pub fn predicates(&self) -> Vec<&Term> {
        self.pred
            .iter()
            .filter_map(|(&p, pairs)| {
                let &(s_id, o_id) = pairs.iter().next()?;
                self.lines.get(&(s_id, p, o_id)).map(|st| &st.predicate)
            })
            .collect()
    }

    // ========================================================================
    // Internals
    // ========================================================================

    /// The handle for `t`: its own if assigned, else the interned one.
    pub(crate) fn resolve_uid(&self, t: &Term) -> Option<u64> {
        if t.uid != 0 {
            Some(t.uid)
        } else {
            self.term_ids.get(&t.value).copied()
        }
    }

    /// Reject identity conflicts before any state changes.
    fn check_term(&self, t: &Term) -> Result<(), GraphError> {
        if t.uid == 0 {
            return Ok(());
        }
        match self.term_ids.get(&t.value) {
            Some(&old) if old != t.uid => Err(GraphError::IdentityConflict {
                value: t.value.clone(),
                new: t.uid,
                old,
            }),
            Some(_) => Ok(()),
            None if self.ids.contains(t.uid) => Err(GraphError::HandleCollision { id: t.uid }),
            None => Ok(()),
        }
    }

    /// Two terms of one statement may claim the same nonzero handle only
    /// for the same value; `check_term` cannot see this case because
    /// neither term is in the graph yet.
    fn check_handle_pair(a: &Term, b: &Term) -> Result<(), GraphError> {
        if a.uid != 0 && a.uid == b.uid && a.value != b.value {
            return Err(GraphError::HandleCollision { id: a.uid });
        }
        Ok(())
    }

    /// Assign or confirm a handle for `t` and record the value mapping.
    /// Conflicts were rejected by `check_term`.
    fn intern(&mut self, t: &mut Term) -> Result<(), GraphError> {
        if t.uid == 0 {
            if let Some(&id) = self.term_ids.get(&t.value) {
                t.uid = id;
                return Ok(());
            }
            let id = self.ids.allocate()?;
            t.uid = id;
            self.term_ids.insert(t.value.clone(), id);
            return Ok(());
        }
        if !self.term_ids.contains_key(&t.value) {
            self.term_ids.insert(t.value.clone(), t.uid);
            self.ids.mark_used(t.uid);
        }
        Ok(())
    }

    /// Insert the line for `s` into both adjacency indices, creating node
    /// entries for its endpoints as needed.
    fn set_line(&mut self, s: &Statement) {
        let (su, line, ou) = (s.subject.uid, s.predicate.uid, s.object.uid);
        self.nodes.entry(su).or_insert_with(|| s.subject.clone());
        self.nodes.entry(ou).or_insert_with(|| s.object.clone());
        self.from
            .entry(su)
            .or_default()
            .entry(ou)
            .or_default()
            .insert(line);
        self.to
            .entry(ou)
            .or_default()
            .entry(su)
            .or_default()
            .insert(line);
        self.lines.insert((su, line, ou), s.clone());
    }

    /// Remove one line from both adjacency indices and the statement table,
    /// dropping emptied index cells.
    fn remove_line(&mut self, fid: u64, tid: u64, line: u64) {
        if let Some(targets) = self.from.get_mut(&fid) {
            if let Some(line_set) = targets.get_mut(&tid) {
                line_set.remove(&line);
                if line_set.is_empty() {
                    targets.remove(&tid);
                }
            }
            if targets.is_empty() {
                self.from.remove(&fid);
            }
        }
        if let Some(sources) = self.to.get_mut(&tid) {
            if let Some(line_set) = sources.get_mut(&fid) {
                line_set.remove(&line);
                if line_set.is_empty() {
                    sources.remove(&fid);
                }
            }
            if sources.is_empty() {
                self.to.remove(&tid);
            }
        }
        self.lines.remove(&(fid, line, tid));
    }

    /// Drop the node if nothing references it: no adjacency in either
    /// direction and no live role as a predicate. Releases its handle.
    fn clean_orphan(&mut self, id: u64, value: &str) {
        if self.from.contains_key(&id) || self.to.contains_key(&id) {
            return;
        }
        if self.pred.contains_key(&id) {
            return;
        }
        if self.nodes.remove(&id).is_some() {
            self.ids.release(id);
            self.term_ids.remove(value);
        }
    }
}

impl Default for Graph {
    fn default() -> Self {
        Self::new()
    }
}
