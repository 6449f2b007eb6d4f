//! SHACL Core validation engine
//!
//! This crate validates an in-memory RDF data graph against the shapes of a
//! SHACL shapes graph and produces a [`ValidationReport`].
//!
//! # Overview
//!
//! SHACL validation works by:
//! 1. Compiling shape definitions from the shapes graph into a [`ShapeSet`]
//! 2. Determining target nodes for each shape (via `sh:targetClass`, `sh:targetNode`, etc.)
//! 3. Validating each focus node against applicable shape constraints
//! 4. Producing a [`ValidationReport`] with conformance status and any results
//!
//! # Supported Constraints
//!
//! - Cardinality: `sh:minCount`, `sh:maxCount`
//! - Value type: `sh:datatype`, `sh:nodeKind`, `sh:class`
//! - Value range: `sh:minInclusive`, `sh:maxInclusive`, `sh:minExclusive`, `sh:maxExclusive`
//! - String: `sh:pattern`, `sh:minLength`, `sh:maxLength`, `sh:languageIn`, `sh:uniqueLang`
//! - Value: `sh:hasValue`, `sh:in`
//! - Closed: `sh:closed`, `sh:ignoredProperties`
//! - Pair: `sh:equals`, `sh:disjoint`, `sh:lessThan`, `sh:lessThanOrEquals`
//! - Shape-based: `sh:node`, `sh:property`, `sh:qualifiedValueShape`
//! - Logical: `sh:not`, `sh:and`, `sh:or`, `sh:xone`
//!
//! # Example
//!
//! ```
//! use shacl_graph_ir::{Graph, Term};
//! use shacl_validator::{validate, ValidationConfig};
//! use shacl_vocab::{rdf, shacl};
//!
//! let mut shapes = Graph::new();
//! let shape = Term::iri("http://example.org/PersonShape");
//! let name = Term::blank("name");
//! shapes.add_triple(shape.clone(), Term::iri(shacl::TARGET_CLASS), Term::iri("http://example.org/Person")).unwrap();
//! shapes.add_triple(shape, Term::iri(shacl::PROPERTY), name.clone()).unwrap();
//! shapes.add_triple(name.clone(), Term::iri(shacl::PATH), Term::iri("http://example.org/name")).unwrap();
//! shapes.add_triple(name, Term::iri(shacl::MIN_COUNT), Term::integer(1)).unwrap();
//!
//! let mut data = Graph::new();
//! data.add_triple(
//!     Term::iri("http://example.org/alice"),
//!     Term::iri(rdf::TYPE),
//!     Term::iri("http://example.org/Person"),
//! ).unwrap();
//!
//! let report = validate(&data, &shapes, &ValidationConfig::default()).unwrap();
//! assert!(!report.conforms);
//! assert_eq!(report.violation_count(), 1);
//! ```

pub mod compile;
pub mod config;
pub mod constraints;
pub mod error;
pub mod hierarchy;
pub mod path;
pub mod report;
pub mod targets;
pub mod validate;

pub use compile::{NodeKind, Severity, Shape, ShapeId, ShapeKind, ShapeSet, Target};
pub use config::ValidationConfig;
pub use constraints::Constraint;
pub use error::{Result, ShaclError};
pub use hierarchy::ClassHierarchy;
pub use path::PropertyPath;
pub use report::{ConstraintKind, Outcome, ReportBuilder, ValidationReport, ValidationResult};
pub use validate::ShaclEngine;

/// SHACL vocabulary full IRIs (re-exported from shacl-vocab)
pub use shacl_vocab::shacl;

use shacl_graph_ir::Graph;

/// Validate `data` against the shapes in `shapes_graph`
///
/// Loading errors (malformed shapes) are returned before any evaluation; a
/// non-conforming report is still `Ok`. Use
/// [`ValidationReport::into_result`] to turn non-conformance into an error.
pub fn validate(data: &Graph, shapes_graph: &Graph, config: &ValidationConfig) -> Result<ValidationReport> {
    let shapes = ShapeSet::load(shapes_graph)?;
    ShaclEngine::new(data, &shapes, config.clone()).validate()
}
