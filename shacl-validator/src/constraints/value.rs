//! Value constraint validators (sh:hasValue, sh:in, value ranges)

use super::ConstraintViolation;
use crate::report::ConstraintKind;
use shacl_graph_ir::Term;
use std::cmp::Ordering;

/// Validate sh:hasValue constraint
///
/// Checks that the value set contains the expected term.
pub fn validate_has_value(values: &[Term], expected: &Term) -> Option<ConstraintViolation> {
    if values.contains(expected) {
        None
    } else {
        Some(ConstraintViolation::new(
            ConstraintKind::HasValue,
            None,
            format!("Required value {} not found", expected),
        ))
    }
}

/// Validate sh:in constraint
///
/// Membership is RDF term equality.
pub fn validate_in(value: &Term, allowed: &[Term]) -> Option<ConstraintViolation> {
    if allowed.contains(value) {
        None
    } else {
        Some(ConstraintViolation::new(
            ConstraintKind::In,
            Some(value.clone()),
            format!(
                "Value {} is not in the allowed set of {} values",
                value,
                allowed.len()
            ),
        ))
    }
}

/// Validate sh:minInclusive constraint
pub fn validate_min_inclusive(value: &Term, min: &Term) -> Option<ConstraintViolation> {
    match compare_terms(value, min) {
        Some(Ordering::Greater | Ordering::Equal) => None,
        Some(_) => Some(range_violation(
            ConstraintKind::MinInclusive,
            value,
            format!("Value {} is less than minimum {}", value, min),
        )),
        None => Some(incomparable(ConstraintKind::MinInclusive, value, min)),
    }
}

/// Validate sh:maxInclusive constraint
pub fn validate_max_inclusive(value: &Term, max: &Term) -> Option<ConstraintViolation> {
    match compare_terms(value, max) {
        Some(Ordering::Less | Ordering::Equal) => None,
        Some(_) => Some(range_violation(
            ConstraintKind::MaxInclusive,
            value,
            format!("Value {} exceeds maximum {}", value, max),
        )),
        None => Some(incomparable(ConstraintKind::MaxInclusive, value, max)),
    }
}

/// Validate sh:minExclusive constraint
pub fn validate_min_exclusive(value: &Term, min: &Term) -> Option<ConstraintViolation> {
    match compare_terms(value, min) {
        Some(Ordering::Greater) => None,
        Some(_) => Some(range_violation(
            ConstraintKind::MinExclusive,
            value,
            format!("Value {} must be greater than {}", value, min),
        )),
        None => Some(incomparable(ConstraintKind::MinExclusive, value, min)),
    }
}

/// Validate sh:maxExclusive constraint
pub fn validate_max_exclusive(value: &Term, max: &Term) -> Option<ConstraintViolation> {
    match compare_terms(value, max) {
        Some(Ordering::Less) => None,
        Some(_) => Some(range_violation(
            ConstraintKind::MaxExclusive,
            value,
            format!("Value {} must be less than {}", value, max),
        )),
        None => Some(incomparable(ConstraintKind::MaxExclusive, value, max)),
    }
}

fn range_violation(kind: ConstraintKind, value: &Term, message: String) -> ConstraintViolation {
    ConstraintViolation::new(kind, Some(value.clone()), message)
}

fn incomparable(kind: ConstraintKind, value: &Term, bound: &Term) -> ConstraintViolation {
    ConstraintViolation::new(
        kind,
        Some(value.clone()),
        format!("Value {} cannot be compared with {}", value, bound),
    )
}

/// Compare two terms in the value space of their datatypes
///
/// Only literals with a known ordered value space compare; IRIs, blank nodes,
/// ill-typed literals and mixed value spaces return None.
pub fn compare_terms(a: &Term, b: &Term) -> Option<Ordering> {
    let a = a.as_literal()?.value()?;
    let b = b.as_literal()?.value()?;
    a.compare(&b)
}
