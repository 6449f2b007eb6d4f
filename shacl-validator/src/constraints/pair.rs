//! Pair constraint validators
//!
//! Validates constraints that compare the value nodes to the objects of
//! another predicate at the same focus node:
//! - sh:equals - the two sets must be identical
//! - sh:disjoint - the two sets must not overlap
//! - sh:lessThan - every value must be less than every other value
//! - sh:lessThanOrEquals - every value must be less than or equal to every other value
//!
//! Each offending value yields its own violation.

use super::value::compare_terms;
use super::ConstraintViolation;
use crate::report::ConstraintKind;
use shacl_graph_ir::Term;
use std::cmp::Ordering;

/// Validate sh:equals constraint
///
/// Reports every value missing from the other set and every other value
/// missing from the value set.
pub fn validate_equals(
    values: &[Term],
    other_values: &[Term],
    other_path: &str,
) -> Vec<ConstraintViolation> {
    let extra = values
        .iter()
        .filter(|v| !other_values.contains(v))
        .map(|v| {
            ConstraintViolation::new(
                ConstraintKind::Equals,
                Some(v.clone()),
                format!("Value {} is not a value of <{}>", v, other_path),
            )
        });
    let missing = other_values
        .iter()
        .filter(|o| !values.contains(o))
        .map(|o| {
            ConstraintViolation::new(
                ConstraintKind::Equals,
                Some(o.clone()),
                format!("Value {} of <{}> is missing", o, other_path),
            )
        });
    extra.chain(missing).collect()
}

/// Validate sh:disjoint constraint
pub fn validate_disjoint(
    values: &[Term],
    other_values: &[Term],
    other_path: &str,
) -> Vec<ConstraintViolation> {
    values
        .iter()
        .filter(|v| other_values.contains(v))
        .map(|v| {
            ConstraintViolation::new(
                ConstraintKind::Disjoint,
                Some(v.clone()),
                format!("Value {} is also a value of <{}>", v, other_path),
            )
        })
        .collect()
}

/// Validate sh:lessThan constraint
pub fn validate_less_than(
    values: &[Term],
    other_values: &[Term],
    other_path: &str,
) -> Vec<ConstraintViolation> {
    compare_all(
        values,
        other_values,
        other_path,
        ConstraintKind::LessThan,
        |ord| ord == Ordering::Less,
        "less than",
    )
}

/// Validate sh:lessThanOrEquals constraint
pub fn validate_less_than_or_equals(
    values: &[Term],
    other_values: &[Term],
    other_path: &str,
) -> Vec<ConstraintViolation> {
    compare_all(
        values,
        other_values,
        other_path,
        ConstraintKind::LessThanOrEquals,
        |ord| ord != Ordering::Greater,
        "less than or equal to",
    )
}

/// One violation per value that fails against some other value
fn compare_all(
    values: &[Term],
    other_values: &[Term],
    other_path: &str,
    kind: ConstraintKind,
    accept: impl Fn(Ordering) -> bool,
    relation: &str,
) -> Vec<ConstraintViolation> {
    values
        .iter()
        .filter_map(|value| {
            let message = other_values.iter().find_map(|other| {
                match compare_terms(value, other) {
                    Some(ord) if accept(ord) => None,
                    Some(_) => Some(format!(
                        "Value {} is not {} {} from <{}>",
                        value, relation, other, other_path
                    )),
                    None => Some(format!(
                        "Cannot compare value {} with {} from <{}> (incompatible types)",
                        value, other, other_path
                    )),
                }
            })?;
            Some(ConstraintViolation::new(kind, Some(value.clone()), message))
        })
        .collect()
}
