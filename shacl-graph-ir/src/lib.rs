//! In-memory RDF graph for SHACL validation
//!
//! This crate provides the term, triple and graph types that both the data
//! graph and the shapes graph are built from. Parsers feed it through the
//! [`GraphSink`] interface; the validator reads it through the indexed
//! lookups on [`Graph`].
//!
//! # Key Design Principles
//!
//! 1. **Expanded IRIs only** - All IRIs are stored in expanded form. Compaction
//!    is handled by renderers at output time using the graph's prefixes.
//!
//! 2. **Explicit datatypes** - Literals always have an explicit datatype, never
//!    optional. Plain strings use `xsd:string`, language-tagged strings use
//!    `rdf:langString`.
//!
//! 3. **Set semantics** - Adding a triple twice has no effect.
//!
//! 4. **Deterministic lookups** - Every lookup yields results in the order the
//!    triples were first added.
//!
//! # Example
//!
//! ```
//! use shacl_graph_ir::{Graph, Term};
//!
//! let mut graph = Graph::new();
//!
//! graph.add_triple(
//!     Term::iri("http://example.org/alice"),
//!     Term::iri("http://xmlns.com/foaf/0.1/name"),
//!     Term::string("Alice"),
//! ).unwrap();
//!
//! assert_eq!(graph.len(), 1);
//! ```

pub mod datatype;
pub mod error;
mod graph;
mod sink;
mod term;
mod triple;

pub use datatype::Datatype;
pub use error::{GraphError, Result};
pub use graph::Graph;
pub use sink::{GraphCollectorSink, GraphSink, TermId};
pub use term::{BlankId, Literal, LiteralValue, Term};
pub use triple::Triple;
