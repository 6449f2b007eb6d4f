//! RDF graph - an indexed set of triples
//!
//! The `Graph` type has set semantics: adding a triple that is already present
//! is a no-op. Triples are kept in insertion order and every lookup yields its
//! results in that order, so anything derived from a graph is deterministic.

use crate::error::{GraphError, Result};
use crate::{Term, Triple};
use rustc_hash::{FxHashMap, FxHashSet};
use shacl_vocab::rdf;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Triple positions, keyed first by a term and then by predicate IRI
type NestedIndex = FxHashMap<Term, FxHashMap<Arc<str>, Vec<usize>>>;

/// A set of RDF triples with subject, predicate and object lookups
///
/// # Indexes
///
/// - subject → positions
/// - predicate → positions
/// - (subject, predicate) → positions
/// - (predicate, object) → positions
///
/// Positions index into the insertion-ordered triple vector.
///
/// # Example
///
/// ```
/// use shacl_graph_ir::{Graph, Term};
///
/// let mut graph = Graph::new();
///
/// graph.add_triple(
///     Term::iri("http://example.org/alice"),
///     Term::iri("http://xmlns.com/foaf/0.1/name"),
///     Term::string("Alice"),
/// ).unwrap();
///
/// let names: Vec<_> = graph
///     .objects(&Term::iri("http://example.org/alice"), "http://xmlns.com/foaf/0.1/name")
///     .collect();
/// assert_eq!(names, vec![&Term::string("Alice")]);
/// ```
#[derive(Clone, Debug, Default)]
pub struct Graph {
    /// The triples in this graph, in insertion order
    triples: Vec<Triple>,
    by_subject: FxHashMap<Term, Vec<usize>>,
    by_predicate: FxHashMap<Arc<str>, Vec<usize>>,
    /// subject → predicate → positions
    by_subject_predicate: NestedIndex,
    /// object → predicate → positions
    by_object_predicate: NestedIndex,
    /// Base IRI from parsing (for reconstruction)
    pub base: Option<String>,
    /// Prefix mappings from parsing (deterministic order via BTreeMap)
    pub prefixes: BTreeMap<String, String>,
}

impl Graph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the base IRI
    pub fn set_base(&mut self, base: impl Into<String>) {
        self.base = Some(base.into());
    }

    /// Add a prefix mapping
    pub fn add_prefix(&mut self, prefix: impl Into<String>, namespace: impl Into<String>) {
        self.prefixes.insert(prefix.into(), namespace.into());
    }

    /// Add a triple to the graph
    ///
    /// Returns `true` if the triple was not already present.
    pub fn add(&mut self, triple: Triple) -> bool {
        if self.contains(&triple) {
            return false;
        }

        let pos = self.triples.len();
        let pred: Arc<str> = Arc::from(triple.predicate_iri());

        self.by_subject
            .entry(triple.subject().clone())
            .or_default()
            .push(pos);
        self.by_predicate.entry(pred.clone()).or_default().push(pos);
        self.by_subject_predicate
            .entry(triple.subject().clone())
            .or_default()
            .entry(pred.clone())
            .or_default()
            .push(pos);
        self.by_object_predicate
            .entry(triple.object().clone())
            .or_default()
            .entry(pred)
            .or_default()
            .push(pos);

        self.triples.push(triple);
        true
    }

    /// Add a triple by components
    ///
    /// Fails when the subject is a literal or the predicate is not an IRI.
    pub fn add_triple(&mut self, s: Term, p: Term, o: Term) -> Result<bool> {
        Ok(self.add(Triple::new(s, p, o)?))
    }

    /// Check whether a triple is present
    pub fn contains(&self, triple: &Triple) -> bool {
        self.contains_spo(triple.subject(), triple.predicate_iri(), triple.object())
    }

    /// Check whether `s p o` is present
    pub fn contains_spo(&self, s: &Term, p: &str, o: &Term) -> bool {
        self.positions_sp(s, p)
            .iter()
            .any(|&i| self.triples[i].object() == o)
    }

    /// Get the number of triples
    pub fn len(&self) -> usize {
        self.triples.len()
    }

    /// Check if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    /// Iterate over triples in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Triple> {
        self.triples.iter()
    }

    /// Get a reference to the triples
    pub fn triples(&self) -> &[Triple] {
        &self.triples
    }

    fn positions_sp(&self, s: &Term, p: &str) -> &[usize] {
        self.by_subject_predicate
            .get(s)
            .and_then(|m| m.get(p))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    fn positions_po(&self, p: &str, o: &Term) -> &[usize] {
        self.by_object_predicate
            .get(o)
            .and_then(|m| m.get(p))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Objects of `s p ?o`, in insertion order
    pub fn objects<'a>(&'a self, s: &Term, p: &str) -> impl Iterator<Item = &'a Term> + 'a {
        self.positions_sp(s, p)
            .iter()
            .map(move |&i| self.triples[i].object())
    }

    /// First object of `s p ?o`
    pub fn object(&self, s: &Term, p: &str) -> Option<&Term> {
        self.objects(s, p).next()
    }

    /// Subjects of `?s p o`, in insertion order
    pub fn subjects<'a>(&'a self, p: &str, o: &Term) -> impl Iterator<Item = &'a Term> + 'a {
        self.positions_po(p, o)
            .iter()
            .map(move |&i| self.triples[i].subject())
    }

    /// Check whether `s rdf:type class` is asserted
    pub fn has_type(&self, s: &Term, class: &str) -> bool {
        self.objects(s, rdf::TYPE)
            .any(|t| t.as_iri() == Some(class))
    }

    /// All triples with the given subject, in insertion order
    pub fn triples_for_subject<'a>(&'a self, s: &Term) -> impl Iterator<Item = &'a Triple> + 'a {
        self.by_subject
            .get(s)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(move |&i| &self.triples[i])
    }

    /// Distinct predicates used by `s`, in first-seen order
    pub fn predicates(&self, s: &Term) -> Vec<&str> {
        let mut seen = FxHashSet::default();
        self.triples_for_subject(s)
            .map(Triple::predicate_iri)
            .filter(|p| seen.insert(*p))
            .collect()
    }

    fn with_predicate(&self, p: &str) -> impl Iterator<Item = &Triple> {
        self.by_predicate
            .get(p)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .map(move |&i| &self.triples[i])
    }

    /// Distinct subjects of `?s p ?o`, in first-seen order
    pub fn subjects_with_predicate(&self, p: &str) -> Vec<&Term> {
        let mut seen = FxHashSet::default();
        self.with_predicate(p)
            .map(Triple::subject)
            .filter(|s| seen.insert(*s))
            .collect()
    }

    /// Distinct objects of `?s p ?o`, in first-seen order
    pub fn objects_with_predicate(&self, p: &str) -> Vec<&Term> {
        let mut seen = FxHashSet::default();
        self.with_predicate(p)
            .map(Triple::object)
            .filter(|o| seen.insert(*o))
            .collect()
    }

    /// All distinct subjects in the graph, in first-seen order
    pub fn all_subjects(&self) -> Vec<&Term> {
        let mut seen = FxHashSet::default();
        self.triples
            .iter()
            .map(Triple::subject)
            .filter(|s| seen.insert(*s))
            .collect()
    }

    /// Read the RDF list starting at `head`
    ///
    /// Each cell must carry exactly one `rdf:first` and one `rdf:rest`; the
    /// chain must end in `rdf:nil` without revisiting a cell.
    pub fn list(&self, head: &Term) -> Result<Vec<Term>> {
        let malformed = |message: &str| GraphError::MalformedList {
            head: head.clone(),
            message: message.to_string(),
        };

        let mut items = Vec::new();
        let mut visited = FxHashSet::default();
        let mut cell = head;

        while cell.as_iri() != Some(rdf::NIL) {
            if cell.is_literal() {
                return Err(malformed("list cell is a literal"));
            }
            if !visited.insert(cell) {
                return Err(malformed("list is cyclic"));
            }

            let mut firsts = self.objects(cell, rdf::FIRST);
            let first = firsts
                .next()
                .ok_or_else(|| malformed("list cell has no rdf:first"))?;
            if firsts.next().is_some() {
                return Err(malformed("list cell has several rdf:first values"));
            }

            let mut rests = self.objects(cell, rdf::REST);
            let rest = rests
                .next()
                .ok_or_else(|| malformed("list cell has no rdf:rest"))?;
            if rests.next().is_some() {
                return Err(malformed("list cell has several rdf:rest values"));
            }

            items.push(first.clone());
            cell = rest;
        }

        Ok(items)
    }
}

impl<'a> IntoIterator for &'a Graph {
    type Item = &'a Triple;
    type IntoIter = std::slice::Iter<'a, Triple>;

    fn into_iter(self) -> Self::IntoIter {
        self.triples.iter()
    }
}

impl FromIterator<Triple> for Graph {
    fn from_iter<T: IntoIterator<Item = Triple>>(iter: T) -> Self {
        let mut graph = Graph::new();
        graph.extend(iter);
        graph
    }
}

impl Extend<Triple> for Graph {
    fn extend<T: IntoIterator<Item = Triple>>(&mut self, iter: T) {
        for triple in iter {
            self.add(triple);
        }
    }
}
