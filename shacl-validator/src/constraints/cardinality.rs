//! Cardinality constraint validators (sh:minCount, sh:maxCount)

use super::ConstraintViolation;
use crate::report::ConstraintKind;
use shacl_graph_ir::Term;

/// Validate sh:minCount constraint
pub fn validate_min_count(values: &[Term], min: usize) -> Option<ConstraintViolation> {
    if values.len() < min {
        Some(ConstraintViolation::new(
            ConstraintKind::MinCount,
            None,
            format!(
                "Expected at least {} value(s) but found {}",
                min,
                values.len()
            ),
        ))
    } else {
        None
    }
}

/// Validate sh:maxCount constraint
pub fn validate_max_count(values: &[Term], max: usize) -> Option<ConstraintViolation> {
    if values.len() > max {
        Some(ConstraintViolation::new(
            ConstraintKind::MaxCount,
            None,
            format!(
                "Expected at most {} value(s) but found {}",
                max,
                values.len()
            ),
        ))
    } else {
        None
    }
}
