//! GraphSink trait for event-driven graph construction
//!
//! Parsers are black boxes to this workspace: whatever reads Turtle, RDF/XML
//! or JSON-LD drives a sink through this interface and never touches `Graph`
//! directly.
//!
//! # Design
//!
//! Parsers call methods like `term_iri()` and `emit_triple()` on a sink.
//! `GraphCollectorSink` collects the events into an indexed `Graph`. Triple
//! position rules are enforced at emission time, so a malformed input fails
//! while loading rather than during validation.

use crate::error::{GraphError, Result};
use crate::{Datatype, Graph, Term, Triple};
use rustc_hash::FxHashMap;

/// Opaque term identifier for efficient triple emission
///
/// `TermId` is only valid within a single sink session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TermId(pub(crate) u32);

impl TermId {
    /// Create a new TermId from a raw index.
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Get the raw index value.
    pub fn index(self) -> u32 {
        self.0
    }
}

/// Event-driven interface for RDF graph construction
///
/// # Example
///
/// ```
/// use shacl_graph_ir::{GraphSink, GraphCollectorSink, Datatype};
///
/// let mut sink = GraphCollectorSink::new();
///
/// sink.on_prefix("foaf", "http://xmlns.com/foaf/0.1/");
///
/// let alice = sink.term_iri("http://example.org/alice");
/// let name = sink.term_iri("http://xmlns.com/foaf/0.1/name");
/// let alice_name = sink.term_literal("Alice", Datatype::xsd_string(), None);
///
/// sink.emit_triple(alice, name, alice_name).unwrap();
///
/// let graph = sink.finish();
/// assert_eq!(graph.len(), 1);
/// ```
pub trait GraphSink {
    /// Called when a base IRI is declared
    fn on_base(&mut self, base_iri: &str);

    /// Called when a prefix is declared
    ///
    /// In Turtle: `@prefix foaf: <http://xmlns.com/foaf/0.1/> .`
    fn on_prefix(&mut self, prefix: &str, namespace_iri: &str);

    /// Create an IRI term and return its ID
    ///
    /// The IRI should be fully expanded (not prefixed).
    fn term_iri(&mut self, iri: &str) -> TermId;

    /// Create a blank node term and return its ID
    ///
    /// If `label` is Some, the blank node has that label (for consistent
    /// identity across references). If None, generate a fresh blank node.
    fn term_blank(&mut self, label: Option<&str>) -> TermId;

    /// Create a literal term from its lexical form
    fn term_literal(&mut self, value: &str, datatype: Datatype, language: Option<&str>) -> TermId;

    /// Emit a triple using previously created term IDs
    ///
    /// Fails on a literal subject, a non-IRI predicate or an unknown id.
    fn emit_triple(&mut self, subject: TermId, predicate: TermId, object: TermId) -> Result<()>;
}

/// A sink that collects triples into a Graph
#[derive(Debug, Default)]
pub struct GraphCollectorSink {
    graph: Graph,
    /// Terms indexed by TermId
    terms: Vec<Term>,
    blank_counter: u32,
    blank_labels: FxHashMap<String, TermId>,
}

impl GraphCollectorSink {
    /// Create a new collector sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Finish building and return the graph
    pub fn finish(self) -> Graph {
        self.graph
    }

    /// Get the current graph (non-consuming)
    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    fn get_term(&self, id: TermId) -> Result<&Term> {
        self.terms
            .get(id.0 as usize)
            .ok_or(GraphError::UnknownTermId(id.0))
    }

    fn add_term(&mut self, term: Term) -> TermId {
        let id = TermId(self.terms.len() as u32);
        self.terms.push(term);
        id
    }
}

impl GraphSink for GraphCollectorSink {
    fn on_base(&mut self, base_iri: &str) {
        self.graph.set_base(base_iri);
    }

    fn on_prefix(&mut self, prefix: &str, namespace_iri: &str) {
        self.graph.add_prefix(prefix, namespace_iri);
    }

    fn term_iri(&mut self, iri: &str) -> TermId {
        self.add_term(Term::iri(iri))
    }

    fn term_blank(&mut self, label: Option<&str>) -> TermId {
        match label {
            Some(l) => {
                if let Some(&id) = self.blank_labels.get(l) {
                    return id;
                }
                let id = self.add_term(Term::blank(l));
                self.blank_labels.insert(l.to_string(), id);
                id
            }
            None => {
                // Fresh labels must not collide with labels the parser supplies
                loop {
                    self.blank_counter += 1;
                    let label = format!("genid{}", self.blank_counter);
                    if !self.blank_labels.contains_key(&label) {
                        let id = self.add_term(Term::blank(&label));
                        self.blank_labels.insert(label, id);
                        return id;
                    }
                }
            }
        }
    }

    fn term_literal(&mut self, value: &str, datatype: Datatype, language: Option<&str>) -> TermId {
        let term = match language {
            Some(lang) => Term::lang_string(value, lang),
            None => Term::typed(value, datatype),
        };
        self.add_term(term)
    }

    fn emit_triple(&mut self, subject: TermId, predicate: TermId, object: TermId) -> Result<()> {
        let s = self.get_term(subject)?.clone();
        let p = self.get_term(predicate)?.clone();
        let o = self.get_term(object)?.clone();
        self.graph.add(Triple::new(s, p, o)?);
        Ok(())
    }
}
