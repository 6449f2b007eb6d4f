//! Graph construction errors

use crate::Term;
use thiserror::Error;

/// Errors raised while building or traversing a graph
///
/// All of these are fatal at load time; no validation runs against a graph
/// that failed to build.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    /// A literal was used in subject position
    #[error("Literal cannot be a triple subject: {0}")]
    LiteralSubject(Term),

    /// Predicate position held something other than an IRI
    #[error("Triple predicate must be an IRI, found {0}")]
    NonIriPredicate(Term),

    /// An RDF list did not follow the rdf:first / rdf:rest / rdf:nil shape
    #[error("Malformed RDF list at {head}: {message}")]
    MalformedList { head: Term, message: String },

    /// A sink was handed a term id it never issued
    #[error("Unknown term id: {0}")]
    UnknownTermId(u32),
}

/// Result type for graph operations
pub type Result<T> = std::result::Result<T, GraphError>;
