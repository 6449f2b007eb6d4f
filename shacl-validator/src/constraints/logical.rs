//! Shape-based constraint validators
//!
//! sh:node and sh:property re-emit the nested shape's results at the outer
//! focus node. sh:and, sh:or, sh:xone and sh:not only look at whether the
//! member shapes conform and report one aggregate result per value node.
//! sh:qualifiedValueShape counts conforming value nodes.

use super::{ConstraintViolation, EvalContext, Finding};
use crate::compile::ShapeId;
use crate::error::Result;
use crate::report::ConstraintKind;
use shacl_graph_ir::Term;

/// Re-emit the results of `shape` at each value node with `focus` as focus node
pub fn reemit_nested(
    ctx: &EvalContext<'_>,
    shape: ShapeId,
    focus: &Term,
    value_nodes: &[Term],
) -> Result<Vec<Finding>> {
    let mut findings = Vec::new();
    for value in value_nodes {
        for nested in ctx.outcomes.outcome(shape, value)? {
            let mut result = nested.clone();
            result.focus_node = focus.clone();
            findings.push(Finding::Nested(result));
        }
    }
    Ok(findings)
}

/// Number of member shapes that `value` conforms to
fn conforming_members(ctx: &EvalContext<'_>, shapes: &[ShapeId], value: &Term) -> Result<usize> {
    let mut count = 0;
    for &shape in shapes {
        if ctx.outcomes.conforms(shape, value)? {
            count += 1;
        }
    }
    Ok(count)
}

/// Validate sh:and constraint
pub fn validate_and(
    ctx: &EvalContext<'_>,
    shapes: &[ShapeId],
    value_nodes: &[Term],
) -> Result<Vec<ConstraintViolation>> {
    let mut violations = Vec::new();
    for value in value_nodes {
        let matched = conforming_members(ctx, shapes, value)?;
        if matched < shapes.len() {
            violations.push(ConstraintViolation::new(
                ConstraintKind::And,
                Some(value.clone()),
                format!(
                    "Value {} conforms to {} of {} shapes in sh:and",
                    value,
                    matched,
                    shapes.len()
                ),
            ));
        }
    }
    Ok(violations)
}

/// Validate sh:or constraint
pub fn validate_or(
    ctx: &EvalContext<'_>,
    shapes: &[ShapeId],
    value_nodes: &[Term],
) -> Result<Vec<ConstraintViolation>> {
    let mut violations = Vec::new();
    for value in value_nodes {
        if conforming_members(ctx, shapes, value)? == 0 {
            violations.push(ConstraintViolation::new(
                ConstraintKind::Or,
                Some(value.clone()),
                format!("Value {} does not conform to any shape in sh:or", value),
            ));
        }
    }
    Ok(violations)
}

/// Validate sh:xone constraint
pub fn validate_xone(
    ctx: &EvalContext<'_>,
    shapes: &[ShapeId],
    value_nodes: &[Term],
) -> Result<Vec<ConstraintViolation>> {
    let mut violations = Vec::new();
    for value in value_nodes {
        let matched = conforming_members(ctx, shapes, value)?;
        if matched != 1 {
            violations.push(ConstraintViolation::new(
                ConstraintKind::Xone,
                Some(value.clone()),
                format!(
                    "Value {} conforms to {} shapes in sh:xone, expected exactly one",
                    value, matched
                ),
            ));
        }
    }
    Ok(violations)
}

/// Validate sh:not constraint
pub fn validate_not(
    ctx: &EvalContext<'_>,
    shape: ShapeId,
    value_nodes: &[Term],
) -> Result<Vec<ConstraintViolation>> {
    let mut violations = Vec::new();
    for value in value_nodes {
        if ctx.outcomes.conforms(shape, value)? {
            violations.push(ConstraintViolation::new(
                ConstraintKind::Not,
                Some(value.clone()),
                format!("Value {} conforms to shape {} given by sh:not", value, describe(ctx, shape)),
            ));
        }
    }
    Ok(violations)
}

/// Validate sh:qualifiedValueShape with sh:qualifiedMinCount / sh:qualifiedMaxCount
pub fn validate_qualified(
    ctx: &EvalContext<'_>,
    shape: ShapeId,
    min_count: Option<usize>,
    max_count: Option<usize>,
    value_nodes: &[Term],
) -> Result<Vec<ConstraintViolation>> {
    let mut conforming = 0;
    for value in value_nodes {
        if ctx.outcomes.conforms(shape, value)? {
            conforming += 1;
        }
    }

    let mut violations = Vec::new();
    if let Some(min) = min_count {
        if conforming < min {
            violations.push(ConstraintViolation::new(
                ConstraintKind::QualifiedMinCount,
                None,
                format!(
                    "Expected at least {} value(s) conforming to {} but found {}",
                    min,
                    describe(ctx, shape),
                    conforming
                ),
            ));
        }
    }
    if let Some(max) = max_count {
        if conforming > max {
            violations.push(ConstraintViolation::new(
                ConstraintKind::QualifiedMaxCount,
                None,
                format!(
                    "Expected at most {} value(s) conforming to {} but found {}",
                    max,
                    describe(ctx, shape),
                    conforming
                ),
            ));
        }
    }
    Ok(violations)
}

/// The shape's node for messages, falling back to its id
fn describe(ctx: &EvalContext<'_>, shape: ShapeId) -> String {
    ctx.shapes
        .get(shape)
        .map(|s| s.node.to_string())
        .unwrap_or_else(|| shape.to_string())
}
