//! An in-memory RDF multigraph with ontology traversal on top.
//!
//! Statements are indexed three ways (by subject, by object, and by
//! predicate) over interned 64-bit term handles, so adjacency in either
//! direction and predicate lookup are all map probes. On that core sit
//! generic graph walks ([`breadth_first`], [`depth_first`]), Gene Ontology
//! algorithms (roots, descendants, common ancestors), and a composable
//! [`Query`] algebra.
//!
//! ```
//! use ontograph_graph::{Graph, Statement, Term};
//!
//! let mut g = Graph::new();
//! let mut st = Statement::new(
//!     Term::new("<obo:GO_0000001>"),
//!     Term::new("<rdfs:subClassOf>"),
//!     Term::new("<obo:GO_0008150>"),
//! );
//! g.add_statement(&mut st)?;
//!
//! let child = g.term_for("<obo:GO_0000001>").cloned().unwrap();
//! let parent = g.term_for("<obo:GO_0008150>").cloned().unwrap();
//! assert_eq!(g.is_descendant_of(&parent, &child), Some(1));
//! # Ok::<(), ontograph_graph::GraphError>(())
//! ```

pub mod graph;
pub mod ids;
pub mod ontology;
pub mod query;
pub mod traverse;

pub use graph::{Graph, GraphError, Namespace};
pub use ontology::Descendant;
pub use query::Query;
pub use traverse::{breadth_first, connected_by_any, depth_first, MultiEdge, Reversed, Traverse};

pub use ontograph_rdf::{Statement, Term, TermError, TermKind};
