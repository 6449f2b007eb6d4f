//! sh:closed validator

use super::ConstraintViolation;
use crate::path::PropertyPath;
use crate::report::ConstraintKind;
use shacl_graph_ir::{Graph, Term};
use std::collections::BTreeSet;
use std::sync::Arc;

/// Validate sh:closed constraint
///
/// Every predicate used by a value node that is neither allowed nor ignored
/// yields one violation, with the predicate as result path and its first
/// object as value.
pub fn validate_closed(
    data: &Graph,
    value_nodes: &[Term],
    allowed: &BTreeSet<Arc<str>>,
    ignored: &BTreeSet<Arc<str>>,
) -> Vec<ConstraintViolation> {
    let mut violations = Vec::new();
    for node in value_nodes {
        for predicate in data.predicates(node) {
            if allowed.contains(predicate) || ignored.contains(predicate) {
                continue;
            }
            let value = data.object(node, predicate).cloned();
            violations.push(
                ConstraintViolation::new(
                    ConstraintKind::Closed,
                    value,
                    format!("Predicate <{}> is not allowed (closed shape)", predicate),
                )
                .with_path(PropertyPath::predicate(predicate)),
            );
        }
    }
    violations
}
