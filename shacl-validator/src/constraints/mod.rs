//! SHACL constraint types and validators
//!
//! This module defines the constraint types supported by the SHACL engine
//! and provides validation logic for each constraint type. [`evaluate`] is the
//! single dispatch point; each submodule owns one family of components.

pub mod cardinality;
pub mod closed;
pub mod datatype;
pub mod language;
pub mod logical;
pub mod pair;
pub mod pattern;
pub mod value;

use crate::compile::{NodeKind, ShapeId, ShapeSet};
use crate::error::Result;
use crate::hierarchy::ClassHierarchy;
use crate::path::PropertyPath;
use crate::report::{ConstraintKind, ValidationResult};
use shacl_graph_ir::{Datatype, Graph, Term};
use std::collections::BTreeSet;
use std::sync::Arc;

pub use pattern::PatternConstraint;

/// A SHACL constraint that can be validated against values
#[derive(Debug, Clone)]
pub enum Constraint {
    // Value type constraints
    /// sh:class - values must be instances of this class
    Class(Arc<str>),
    /// sh:datatype - values must be literals of this datatype
    Datatype(Datatype),
    /// sh:nodeKind - values must be of this node kind
    NodeKind(NodeKind),

    // Cardinality constraints
    /// sh:minCount - minimum number of values
    MinCount(usize),
    /// sh:maxCount - maximum number of values
    MaxCount(usize),

    // String constraints
    /// sh:minLength - minimum string length
    MinLength(usize),
    /// sh:maxLength - maximum string length
    MaxLength(usize),
    /// sh:pattern with optional sh:flags
    Pattern(PatternConstraint),
    /// sh:languageIn - language tag must match one of these ranges
    LanguageIn(Vec<String>),
    /// sh:uniqueLang true - each language tag may only appear once
    UniqueLang,

    // Value range constraints
    /// sh:minInclusive - value >= this
    MinInclusive(Term),
    /// sh:maxInclusive - value <= this
    MaxInclusive(Term),
    /// sh:minExclusive - value > this
    MinExclusive(Term),
    /// sh:maxExclusive - value < this
    MaxExclusive(Term),

    // Value constraints
    /// sh:in - value must be in this list
    In(Vec<Term>),
    /// sh:hasValue - must have this specific value
    HasValue(Term),

    // Pair constraints (comparing with the values of another predicate)
    /// sh:equals
    Equals(Arc<str>),
    /// sh:disjoint
    Disjoint(Arc<str>),
    /// sh:lessThan
    LessThan(Arc<str>),
    /// sh:lessThanOrEquals
    LessThanOrEquals(Arc<str>),

    // Shape-based constraints
    /// sh:node - each value must conform to the shape
    Node(ShapeId),
    /// sh:property - each value must conform to the property shape
    Property(ShapeId),
    /// sh:and - all shapes must match
    And(Vec<ShapeId>),
    /// sh:or - at least one shape must match
    Or(Vec<ShapeId>),
    /// sh:not - the shape must NOT match
    Not(ShapeId),
    /// sh:xone - exactly one shape must match
    Xone(Vec<ShapeId>),
    /// sh:qualifiedValueShape with min/max counts
    QualifiedValueShape {
        shape: ShapeId,
        min_count: Option<usize>,
        max_count: Option<usize>,
    },

    /// sh:closed true - only the declared and ignored predicates may be used
    Closed {
        /// Predicates of the shape's own property shapes, plus rdf:type
        allowed: BTreeSet<Arc<str>>,
        /// sh:ignoredProperties
        ignored: BTreeSet<Arc<str>>,
    },
}

impl Constraint {
    /// The component that reports violations of this constraint
    ///
    /// Qualified value shapes report under the min or max component depending
    /// on which bound failed; this returns the min component when a minimum is
    /// set.
    pub fn kind(&self) -> ConstraintKind {
        match self {
            Constraint::Class(_) => ConstraintKind::Class,
            Constraint::Datatype(_) => ConstraintKind::Datatype,
            Constraint::NodeKind(_) => ConstraintKind::NodeKind,
            Constraint::MinCount(_) => ConstraintKind::MinCount,
            Constraint::MaxCount(_) => ConstraintKind::MaxCount,
            Constraint::MinLength(_) => ConstraintKind::MinLength,
            Constraint::MaxLength(_) => ConstraintKind::MaxLength,
            Constraint::Pattern(_) => ConstraintKind::Pattern,
            Constraint::LanguageIn(_) => ConstraintKind::LanguageIn,
            Constraint::UniqueLang => ConstraintKind::UniqueLang,
            Constraint::MinInclusive(_) => ConstraintKind::MinInclusive,
            Constraint::MaxInclusive(_) => ConstraintKind::MaxInclusive,
            Constraint::MinExclusive(_) => ConstraintKind::MinExclusive,
            Constraint::MaxExclusive(_) => ConstraintKind::MaxExclusive,
            Constraint::In(_) => ConstraintKind::In,
            Constraint::HasValue(_) => ConstraintKind::HasValue,
            Constraint::Equals(_) => ConstraintKind::Equals,
            Constraint::Disjoint(_) => ConstraintKind::Disjoint,
            Constraint::LessThan(_) => ConstraintKind::LessThan,
            Constraint::LessThanOrEquals(_) => ConstraintKind::LessThanOrEquals,
            Constraint::Node(_) => ConstraintKind::Node,
            Constraint::Property(_) => ConstraintKind::Property,
            Constraint::And(_) => ConstraintKind::And,
            Constraint::Or(_) => ConstraintKind::Or,
            Constraint::Not(_) => ConstraintKind::Not,
            Constraint::Xone(_) => ConstraintKind::Xone,
            Constraint::QualifiedValueShape { min_count, .. } => {
                if min_count.is_some() {
                    ConstraintKind::QualifiedMinCount
                } else {
                    ConstraintKind::QualifiedMaxCount
                }
            }
            Constraint::Closed { .. } => ConstraintKind::Closed,
        }
    }

    /// Shapes this constraint evaluates value nodes against
    pub fn shape_refs(&self) -> &[ShapeId] {
        match self {
            Constraint::Node(id)
            | Constraint::Property(id)
            | Constraint::Not(id)
            | Constraint::QualifiedValueShape { shape: id, .. } => std::slice::from_ref(id),
            Constraint::And(ids) | Constraint::Or(ids) | Constraint::Xone(ids) => ids,
            _ => &[],
        }
    }

    /// Get a human-readable description of this constraint
    pub fn description(&self) -> String {
        match self {
            Constraint::Class(class) => format!("sh:class <{}>", class),
            Constraint::Datatype(dt) => format!("sh:datatype <{}>", dt),
            Constraint::NodeKind(kind) => format!("sh:nodeKind {}", kind),
            Constraint::MinCount(n) => format!("sh:minCount {}", n),
            Constraint::MaxCount(n) => format!("sh:maxCount {}", n),
            Constraint::MinLength(n) => format!("sh:minLength {}", n),
            Constraint::MaxLength(n) => format!("sh:maxLength {}", n),
            Constraint::Pattern(p) => format!("sh:pattern \"{}\"", p.pattern()),
            Constraint::LanguageIn(langs) => format!("sh:languageIn {:?}", langs),
            Constraint::UniqueLang => "sh:uniqueLang true".to_string(),
            Constraint::MinInclusive(v) => format!("sh:minInclusive {}", v),
            Constraint::MaxInclusive(v) => format!("sh:maxInclusive {}", v),
            Constraint::MinExclusive(v) => format!("sh:minExclusive {}", v),
            Constraint::MaxExclusive(v) => format!("sh:maxExclusive {}", v),
            Constraint::In(vs) => format!("sh:in ({} values)", vs.len()),
            Constraint::HasValue(v) => format!("sh:hasValue {}", v),
            Constraint::Equals(p) => format!("sh:equals <{}>", p),
            Constraint::Disjoint(p) => format!("sh:disjoint <{}>", p),
            Constraint::LessThan(p) => format!("sh:lessThan <{}>", p),
            Constraint::LessThanOrEquals(p) => format!("sh:lessThanOrEquals <{}>", p),
            Constraint::Node(id) => format!("sh:node {}", id),
            Constraint::Property(id) => format!("sh:property {}", id),
            Constraint::And(ids) => format!("sh:and ({} shapes)", ids.len()),
            Constraint::Or(ids) => format!("sh:or ({} shapes)", ids.len()),
            Constraint::Not(id) => format!("sh:not {}", id),
            Constraint::Xone(ids) => format!("sh:xone ({} shapes)", ids.len()),
            Constraint::QualifiedValueShape {
                shape,
                min_count,
                max_count,
            } => format!(
                "sh:qualifiedValueShape {} (min: {:?}, max: {:?})",
                shape, min_count, max_count
            ),
            Constraint::Closed { allowed, ignored } => format!(
                "sh:closed true ({} allowed, {} ignored)",
                allowed.len(),
                ignored.len()
            ),
        }
    }
}

/// A single failed check, before shape context is attached
#[derive(Debug, Clone, PartialEq)]
pub struct ConstraintViolation {
    /// The component that failed
    pub kind: ConstraintKind,
    /// The value that violated the constraint (if applicable)
    pub value: Option<Term>,
    /// Overrides the shape's path (sh:closed reports the offending predicate)
    pub path: Option<PropertyPath>,
    /// Human-readable message about the violation
    pub message: String,
    /// Separates findings that share a value (the duplicated tag for sh:uniqueLang)
    pub detail: Option<String>,
}

impl ConstraintViolation {
    pub fn new(kind: ConstraintKind, value: Option<Term>, message: impl Into<String>) -> Self {
        Self {
            kind,
            value,
            path: None,
            message: message.into(),
            detail: None,
        }
    }

    pub fn with_path(mut self, path: PropertyPath) -> Self {
        self.path = Some(path);
        self
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// Output of evaluating one constraint
#[derive(Debug, Clone)]
pub enum Finding {
    /// A failure of the constraint itself
    Violation(ConstraintViolation),
    /// A result produced by a nested shape, re-emitted at the outer focus node
    Nested(ValidationResult),
}

/// Read access to the results of nested (shape, node) pairs
///
/// The engine resolves every nested pair a constraint depends on before the
/// constraint is evaluated. A pair that is still in progress is part of a
/// reference cycle and reports no results.
pub trait ShapeOutcomes {
    /// Results of validating `node` against `shape`
    fn outcome(&self, shape: ShapeId, node: &Term) -> Result<&[ValidationResult]>;

    /// A nested shape conforms when it produced no results of any severity
    fn conforms(&self, shape: ShapeId, node: &Term) -> Result<bool> {
        Ok(self.outcome(shape, node)?.is_empty())
    }
}

/// Everything a constraint may read while evaluating
pub struct EvalContext<'a> {
    pub data: &'a Graph,
    pub shapes: &'a ShapeSet,
    pub hierarchy: &'a ClassHierarchy,
    pub outcomes: &'a dyn ShapeOutcomes,
}

fn each<F>(value_nodes: &[Term], check: F) -> Vec<Finding>
where
    F: Fn(&Term) -> Option<ConstraintViolation>,
{
    value_nodes
        .iter()
        .filter_map(check)
        .map(Finding::Violation)
        .collect()
}

fn violations(found: impl IntoIterator<Item = ConstraintViolation>) -> Vec<Finding> {
    found.into_iter().map(Finding::Violation).collect()
}

/// Evaluate one constraint for a focus node and its value nodes
pub fn evaluate(
    constraint: &Constraint,
    ctx: &EvalContext<'_>,
    focus: &Term,
    value_nodes: &[Term],
) -> Result<Vec<Finding>> {
    let findings = match constraint {
        Constraint::Class(class) => each(value_nodes, |v| {
            datatype::validate_class(v, class, ctx.data, ctx.hierarchy)
        }),
        Constraint::Datatype(dt) => each(value_nodes, |v| datatype::validate_datatype(v, dt)),
        Constraint::NodeKind(kind) => each(value_nodes, |v| datatype::validate_node_kind(v, *kind)),

        Constraint::MinCount(min) => violations(cardinality::validate_min_count(value_nodes, *min)),
        Constraint::MaxCount(max) => violations(cardinality::validate_max_count(value_nodes, *max)),

        Constraint::MinLength(min) => each(value_nodes, |v| pattern::validate_min_length(v, *min)),
        Constraint::MaxLength(max) => each(value_nodes, |v| pattern::validate_max_length(v, *max)),
        Constraint::Pattern(p) => each(value_nodes, |v| pattern::validate_pattern(v, p)),
        Constraint::LanguageIn(ranges) => {
            each(value_nodes, |v| language::validate_language_in(v, ranges))
        }
        Constraint::UniqueLang => violations(language::validate_unique_lang(value_nodes)),

        Constraint::MinInclusive(min) => each(value_nodes, |v| value::validate_min_inclusive(v, min)),
        Constraint::MaxInclusive(max) => each(value_nodes, |v| value::validate_max_inclusive(v, max)),
        Constraint::MinExclusive(min) => each(value_nodes, |v| value::validate_min_exclusive(v, min)),
        Constraint::MaxExclusive(max) => each(value_nodes, |v| value::validate_max_exclusive(v, max)),
        Constraint::In(allowed) => each(value_nodes, |v| value::validate_in(v, allowed)),
        Constraint::HasValue(expected) => {
            violations(value::validate_has_value(value_nodes, expected))
        }

        Constraint::Equals(p) => {
            let others: Vec<Term> = ctx.data.objects(focus, p).cloned().collect();
            violations(pair::validate_equals(value_nodes, &others, p))
        }
        Constraint::Disjoint(p) => {
            let others: Vec<Term> = ctx.data.objects(focus, p).cloned().collect();
            violations(pair::validate_disjoint(value_nodes, &others, p))
        }
        Constraint::LessThan(p) => {
            let others: Vec<Term> = ctx.data.objects(focus, p).cloned().collect();
            violations(pair::validate_less_than(value_nodes, &others, p))
        }
        Constraint::LessThanOrEquals(p) => {
            let others: Vec<Term> = ctx.data.objects(focus, p).cloned().collect();
            violations(pair::validate_less_than_or_equals(value_nodes, &others, p))
        }

        Constraint::Node(shape) | Constraint::Property(shape) => {
            logical::reemit_nested(ctx, *shape, focus, value_nodes)?
        }
        Constraint::And(shapes) => violations(logical::validate_and(ctx, shapes, value_nodes)?),
        Constraint::Or(shapes) => violations(logical::validate_or(ctx, shapes, value_nodes)?),
        Constraint::Not(shape) => violations(logical::validate_not(ctx, *shape, value_nodes)?),
        Constraint::Xone(shapes) => violations(logical::validate_xone(ctx, shapes, value_nodes)?),
        Constraint::QualifiedValueShape {
            shape,
            min_count,
            max_count,
        } => violations(logical::validate_qualified(
            ctx,
            *shape,
            *min_count,
            *max_count,
            value_nodes,
        )?),

        Constraint::Closed { allowed, ignored } => {
            violations(closed::validate_closed(ctx.data, value_nodes, allowed, ignored))
        }
    };
    Ok(findings)
}
