//! Datatype, node kind and class constraint validators

use super::ConstraintViolation;
use crate::compile::NodeKind;
use crate::hierarchy::ClassHierarchy;
use crate::report::ConstraintKind;
use shacl_graph_ir::{Datatype, Graph, Term};

/// Validate sh:datatype constraint
///
/// The value must be a literal with exactly the expected datatype IRI, and
/// its lexical form must be valid for that datatype.
pub fn validate_datatype(value: &Term, expected: &Datatype) -> Option<ConstraintViolation> {
    let message = match value.as_literal() {
        None => format!("Expected datatype <{}> but found non-literal {}", expected, value),
        Some(lit) if lit.datatype() != expected => format!(
            "Expected datatype <{}> but found <{}>",
            expected,
            lit.datatype()
        ),
        Some(lit) if !lit.is_well_formed() => format!(
            "Value {} is not a valid lexical form of <{}>",
            value, expected
        ),
        Some(_) => return None,
    };
    Some(ConstraintViolation::new(
        ConstraintKind::Datatype,
        Some(value.clone()),
        message,
    ))
}

/// Validate sh:nodeKind constraint
pub fn validate_node_kind(value: &Term, expected: NodeKind) -> Option<ConstraintViolation> {
    if expected.matches(value) {
        return None;
    }
    Some(ConstraintViolation::new(
        ConstraintKind::NodeKind,
        Some(value.clone()),
        format!(
            "Expected node kind {} but found {}",
            expected,
            NodeKind::of(value)
        ),
    ))
}

/// Validate sh:class constraint
///
/// Literals are never instances of a class.
pub fn validate_class(
    value: &Term,
    class: &str,
    data: &Graph,
    hierarchy: &ClassHierarchy,
) -> Option<ConstraintViolation> {
    if hierarchy.is_instance_of(data, value, class) {
        return None;
    }
    Some(ConstraintViolation::new(
        ConstraintKind::Class,
        Some(value.clone()),
        format!("Value {} is not an instance of <{}>", value, class),
    ))
}
