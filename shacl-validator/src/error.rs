//! SHACL error types

use shacl_graph_ir::{GraphError, Term};
use thiserror::Error;

/// Result type for SHACL operations
pub type Result<T> = std::result::Result<T, ShaclError>;

/// SHACL loading and validation errors
///
/// Loading errors abort before any evaluation runs, so there is never a
/// partial report alongside one of these. Validation results are not errors;
/// they live in the [`ValidationReport`](crate::ValidationReport).
#[derive(Debug, Error)]
pub enum ShaclError {
    /// Shape references a node that is not a shape in the shapes graph
    #[error("Shape {referrer} references unknown shape {referenced}")]
    UnknownShapeReference { referrer: Term, referenced: Term },

    /// A shape parameter has the wrong type or value
    #[error("Invalid {parameter} on shape {shape}: {message}")]
    InvalidParameter {
        shape: Term,
        parameter: &'static str,
        message: String,
    },

    /// Invalid regex pattern in sh:pattern
    #[error("Invalid regex pattern '{pattern}' on shape {shape}: {message}")]
    InvalidPattern {
        shape: Term,
        pattern: String,
        message: String,
    },

    /// Malformed property path
    #[error("Invalid property path on shape {shape}: {message}")]
    InvalidPath { shape: Term, message: String },

    /// Graph construction or traversal error
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    /// The recursion guard reached a state it should never be in
    #[error("Internal invariant violated: {message}")]
    InternalInvariant { message: String },

    /// SHACL validation failed
    ///
    /// Only produced by [`ValidationReport::into_result`](crate::ValidationReport::into_result).
    #[error("SHACL validation failed: {violation_count} violation(s), {warning_count} warning(s)")]
    ValidationFailed {
        violation_count: usize,
        warning_count: usize,
        /// Detailed messages for each violation (truncated if too many)
        details: Vec<String>,
    },
}

impl ShaclError {
    pub(crate) fn invalid(shape: &Term, parameter: &'static str, message: impl Into<String>) -> Self {
        ShaclError::InvalidParameter {
            shape: shape.clone(),
            parameter,
            message: message.into(),
        }
    }

    pub(crate) fn invariant(message: impl Into<String>) -> Self {
        ShaclError::InternalInvariant {
            message: message.into(),
        }
    }
}
