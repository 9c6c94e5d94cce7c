//! RDF term and statement model (value layer).
//!
//! This crate sits below the graph store: it defines the value types a
//! decoder hands to `ontograph-graph` and validates their canonical lexical
//! forms. Terms carry their full N-Triples-style delimiters:
//!
//! - IRIs: `<http://example.org/a>` or qualified `<obo:GO_0008150>`
//! - blank nodes: `_:b0`
//! - literals: `"text"`, `"text"@en`, `"true"^^<xsd:boolean>`
//!
//! Decoding from any wire format, and blank-node canonicalization, happen
//! upstream; a `Term` here is already in canonical form.

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Lexical-form validation failure for a term.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TermError {
    #[error("empty term text")]
    Empty,
    #[error("malformed IRI: {0}")]
    MalformedIri(String),
    #[error("malformed blank node: {0}")]
    MalformedBlank(String),
    #[error("malformed literal: {0}")]
    MalformedLiteral(String),
    #[error("unrecognized term form: {0}")]
    Invalid(String),
}

// ============================================================================
// Terms
// ============================================================================

/// The syntactic class of a term's lexical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TermKind {
    Iri,
    Blank,
    Literal,
}

/// An RDF node or predicate identity.
///
/// `value` is the canonical lexical form, delimiters included. `uid` is the
/// graph-assigned handle; `0` means unassigned. The graph store guarantees
/// that equal values resolve to equal handles, so `Term` equality (which
/// covers both fields) is consistent for terms held by the same graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Term {
    pub value: String,
    pub uid: u64,
}

impl Term {
    /// A term with an unassigned handle; the graph interns it on first add.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            uid: 0,
        }
    }

    /// A term with a pre-assigned handle, as produced by an upstream decoder
    /// that has already canonicalized identities.
    pub fn with_uid(value: impl Into<String>, uid: u64) -> Self {
        Self {
            value: value.into(),
            uid,
        }
    }

    /// Parse the lexical form and report its kind.
    pub fn kind(&self) -> Result<TermKind, TermError> {
        parse_kind(&self.value)
    }

    /// The text between the angle brackets of an IRI term, `None` otherwise.
    pub fn iri_text(&self) -> Option<&str> {
        self.value
            .strip_prefix('<')
            .and_then(|rest| rest.strip_suffix('>'))
    }
}

impl std::fmt::Display for Term {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.value)
    }
}

fn parse_kind(text: &str) -> Result<TermKind, TermError> {
    if text.is_empty() {
        return Err(TermError::Empty);
    }
    if text.starts_with('<') {
        return parse_iri(text).map(|_| TermKind::Iri);
    }
    if let Some(label) = text.strip_prefix("_:") {
        if label.is_empty() {
            return Err(TermError::MalformedBlank(text.to_string()));
        }
        return Ok(TermKind::Blank);
    }
    if text.starts_with('"') {
        return parse_literal(text).map(|_| TermKind::Literal);
    }
    Err(TermError::Invalid(text.to_string()))
}

fn parse_iri(text: &str) -> Result<(), TermError> {
    let inner = text
        .strip_prefix('<')
        .and_then(|rest| rest.strip_suffix('>'))
        .ok_or_else(|| TermError::MalformedIri(text.to_string()))?;
    if inner.is_empty()
        || inner
            .chars()
            .any(|c| c == '<' || c == '>' || c == '"' || c.is_whitespace())
    {
        return Err(TermError::MalformedIri(text.to_string()));
    }
    Ok(())
}

fn parse_literal(text: &str) -> Result<(), TermError> {
    // Find the closing quote, honoring backslash escapes in the body.
    let mut escaped = false;
    let mut close = None;
    for (i, c) in text.char_indices().skip(1) {
        if escaped {
            escaped = false;
            continue;
        }
        match c {
            '\\' => escaped = true,
            '"' => {
                close = Some(i);
                break;
            }
            _ => {}
        }
    }
    let close = close.ok_or_else(|| TermError::MalformedLiteral(text.to_string()))?;

    let suffix = &text[close + 1..];
    if suffix.is_empty() {
        return Ok(());
    }
    if let Some(lang) = suffix.strip_prefix('@') {
        if !lang.is_empty() && lang.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Ok(());
        }
        return Err(TermError::MalformedLiteral(text.to_string()));
    }
    if let Some(datatype) = suffix.strip_prefix("^^") {
        return parse_iri(datatype)
            .map_err(|_| TermError::MalformedLiteral(text.to_string()));
    }
    Err(TermError::MalformedLiteral(text.to_string()))
}

// ============================================================================
// Statements
// ============================================================================

/// A subject-predicate-object triple, the graph's edge ("line") payload.
///
/// Statements must not be altered while held by a graph; the store hands
/// back references, never independently owned copies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Statement {
    pub subject: Term,
    pub predicate: Term,
    pub object: Term,
}

impl Statement {
    pub fn new(subject: Term, predicate: Term, object: Term) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }
}

impl std::fmt::Display for Statement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {} .", self.subject, self.predicate, self.object)
    }
}
