//! Shared test harness for shacl-validator integration tests.
//!
//! Graphs are built triple by triple; there is no RDF syntax parser in the
//! workspace, so the helpers here keep the fixtures close to how they would
//! read in Turtle.

// Not every integration test crate uses every helper.
#![allow(dead_code)]

pub mod span_capture;

use shacl_graph_ir::{Graph, Term};
use shacl_validator::{ShaclEngine, ShapeSet, ValidationConfig, ValidationReport};
use shacl_vocab::rdf;

pub const EX: &str = "http://example.org/";

// =============================================================================
// Term helpers
// =============================================================================

/// `ex:local`
pub fn ex(local: &str) -> Term {
    Term::iri(format!("{}{}", EX, local))
}

/// The full IRI of `ex:local`, for predicate positions
pub fn ex_iri(local: &str) -> String {
    format!("{}{}", EX, local)
}

// =============================================================================
// Graph builder
// =============================================================================

/// Fluent triple builder
///
/// ```ignore
/// let g = GraphBuilder::new()
///     .prefix("ex", EX)
///     .add(&ex("alice"), rdf::TYPE, ex("Person"))
///     .build();
/// ```
#[derive(Default)]
pub struct GraphBuilder {
    graph: Graph,
    next_list: usize,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefix(mut self, prefix: &str, namespace: &str) -> Self {
        self.graph.add_prefix(prefix, namespace);
        self
    }

    pub fn add(mut self, s: &Term, p: &str, o: Term) -> Self {
        self.graph.add_triple(s.clone(), Term::iri(p), o).unwrap();
        self
    }

    /// `s a class`
    pub fn typed(self, s: &Term, class: &str) -> Self {
        self.add(s, rdf::TYPE, Term::iri(class))
    }

    /// Add `s p ( items... )` with fresh blank list cells
    pub fn add_list(mut self, s: &Term, p: &str, items: Vec<Term>) -> Self {
        let head = self.list(items);
        self.add(s, p, head)
    }

    /// Write an RDF list and return its head
    pub fn list(&mut self, items: Vec<Term>) -> Term {
        if items.is_empty() {
            return Term::iri(rdf::NIL);
        }
        self.next_list += 1;
        let list_id = self.next_list;
        let cells: Vec<Term> = (0..items.len())
            .map(|i| Term::blank(format!("list{}_{}", list_id, i)))
            .collect();
        for (i, item) in items.into_iter().enumerate() {
            let rest = cells.get(i + 1).cloned().unwrap_or_else(|| Term::iri(rdf::NIL));
            self.graph
                .add_triple(cells[i].clone(), Term::iri(rdf::FIRST), item)
                .unwrap();
            self.graph
                .add_triple(cells[i].clone(), Term::iri(rdf::REST), rest)
                .unwrap();
        }
        cells[0].clone()
    }

    pub fn build(self) -> Graph {
        self.graph
    }
}

// =============================================================================
// Validation helpers
// =============================================================================

/// Load the shapes and validate with the given configuration
pub fn run(data: &Graph, shapes: &Graph, config: ValidationConfig) -> ValidationReport {
    let set = ShapeSet::load(shapes).expect("shapes graph should load");
    ShaclEngine::new(data, &set, config)
        .validate()
        .expect("validation should not fail")
}

/// Validate with the default configuration
pub fn run_default(data: &Graph, shapes: &Graph) -> ValidationReport {
    run(data, shapes, ValidationConfig::default())
}
