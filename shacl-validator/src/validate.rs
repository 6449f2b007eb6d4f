//! SHACL validation engine
//!
//! This module provides the core validation logic for checking RDF data
//! against SHACL shapes.
//!
//! Every (shape, node) pair is validated at most once per run. Nested shape
//! references (`sh:node`, `sh:property`, the logical operators and qualified
//! value shapes) are resolved with an explicit work stack rather than
//! recursion: a pair is first *expanded*, which computes its value nodes and
//! pushes the nested pairs it depends on, and is *evaluated* once it is back
//! on top of the stack. A dependency that is still in progress at that point
//! is an ancestor, i.e. a reference cycle, and counts as conforming.

use crate::compile::{Severity, Shape, ShapeId, ShapeSet};
use crate::config::ValidationConfig;
use crate::constraints::{evaluate, EvalContext, Finding, ShapeOutcomes};
use crate::error::{Result, ShaclError};
use crate::hierarchy::ClassHierarchy;
use crate::report::{Outcome, ReportBuilder, ValidationReport, ValidationResult};
use crate::targets;
use rustc_hash::FxHashMap;
use shacl_graph_ir::{Graph, Term};
use std::time::Instant;
use tracing::{debug, trace};

/// Visit state of a (shape, node) pair
#[derive(Debug)]
enum VisitState {
    /// Pushed on the work stack, not yet expanded
    Pending,
    /// Expanded; its dependencies are being resolved
    InProgress,
    /// Evaluated
    Done(Vec<ValidationResult>),
}

/// One entry of the work stack
struct Frame {
    shape: ShapeId,
    node: Term,
    /// Set once the pair has been expanded
    value_nodes: Option<Vec<Term>>,
}

/// Read-only view of the visit states, handed to constraint evaluation
struct StateView<'s> {
    state: &'s FxHashMap<(ShapeId, Term), VisitState>,
}

impl ShapeOutcomes for StateView<'_> {
    fn outcome(&self, shape: ShapeId, node: &Term) -> Result<&[ValidationResult]> {
        match self.state.get(&(shape, node.clone())) {
            Some(VisitState::Done(results)) => Ok(results),
            // An ancestor on the work stack: a reference cycle
            Some(VisitState::InProgress) => Ok(&[]),
            Some(VisitState::Pending) | None => Err(ShaclError::invariant(format!(
                "nested pair ({}, {}) was not resolved before evaluation",
                shape, node
            ))),
        }
    }
}

/// SHACL validation engine
///
/// Holds the memoized results of every pair validated so far, so repeated
/// calls to [`validate_node`](Self::validate_node) and the final
/// [`validate`](Self::validate) share work.
pub struct ShaclEngine<'a> {
    data: &'a Graph,
    shapes: &'a ShapeSet,
    config: ValidationConfig,
    hierarchy: ClassHierarchy,
    state: FxHashMap<(ShapeId, Term), VisitState>,
}

impl<'a> ShaclEngine<'a> {
    /// Create an engine for `data` and compiled `shapes`
    ///
    /// With subclass inference enabled, the data graph's `rdfs:subClassOf`
    /// closure is computed up front.
    pub fn new(data: &'a Graph, shapes: &'a ShapeSet, config: ValidationConfig) -> Self {
        let hierarchy = if config.subclass_inference {
            ClassHierarchy::from_graph(data)
        } else {
            ClassHierarchy::default()
        };
        Self {
            data,
            shapes,
            config,
            hierarchy,
            state: FxHashMap::default(),
        }
    }

    pub fn config(&self) -> &ValidationConfig {
        &self.config
    }

    /// Validate every targeted focus node of every active shape
    ///
    /// Shapes run in load order and focus nodes in resolution order; the
    /// report lists results in that discovery order, without duplicates.
    pub fn validate(&mut self) -> Result<ValidationReport> {
        let span = tracing::debug_span!(
            "shacl_validate",
            shapes = self.shapes.len(),
            triples = self.data.len()
        );
        let _guard = span.enter();

        if self.config.meta_shacl {
            debug!("meta-SHACL validation of the shapes graph is not supported; ignoring");
        }

        let started = Instant::now();
        let budget = self.config.time_limit();
        let shapes = self.shapes;
        let mut builder = ReportBuilder::new();
        let mut outcome = Outcome::Complete;

        'shapes: for shape in shapes.iter() {
            if shape.deactivated || !shape.has_targets() {
                continue;
            }
            let focus_nodes = targets::resolve(shape, self.data, &self.hierarchy);
            debug!(shape = %shape.node, focus_nodes = focus_nodes.len(), "validating shape");

            for focus in &focus_nodes {
                if let Some(limit) = budget {
                    if started.elapsed() >= limit {
                        debug!(?limit, "SHACL time budget exceeded");
                        outcome = Outcome::BudgetExceeded;
                        break 'shapes;
                    }
                }

                let results = self.validate_node(shape.id, focus)?;
                let violated = results.iter().any(|r| r.severity == Severity::Violation);
                builder.extend(results);

                if violated && self.config.abort_on_first {
                    outcome = Outcome::AbortedOnFirst;
                    break 'shapes;
                }
            }
        }

        debug!(results = builder.len(), ?outcome, "SHACL validation finished");
        Ok(builder.build(&self.config, outcome, shapes.prefixes().clone()))
    }

    /// Validate one focus node against one shape
    ///
    /// Returns the pair's results, including those re-emitted from nested
    /// shapes. Deactivated shapes yield no results.
    pub fn validate_node(&mut self, shape: ShapeId, focus: &Term) -> Result<Vec<ValidationResult>> {
        self.resolve(shape, focus)?;
        match self.state.get(&(shape, focus.clone())) {
            Some(VisitState::Done(results)) => Ok(results.clone()),
            other => Err(ShaclError::invariant(format!(
                "pair ({}, {}) ended in state {:?}",
                shape, focus, other
            ))),
        }
    }

    fn shape(&self, id: ShapeId) -> Result<&'a Shape> {
        let shapes: &'a ShapeSet = self.shapes;
        shapes
            .get(id)
            .ok_or_else(|| ShaclError::invariant(format!("unknown {}", id)))
    }

    /// Drive the work stack until `(shape, node)` is Done
    fn resolve(&mut self, shape: ShapeId, node: &Term) -> Result<()> {
        let key = (shape, node.clone());
        if self.state.contains_key(&key) {
            return Ok(());
        }
        self.state.insert(key, VisitState::Pending);

        let mut stack = vec![Frame {
            shape,
            node: node.clone(),
            value_nodes: None,
        }];

        while let Some(frame) = stack.pop() {
            let key = (frame.shape, frame.node.clone());
            let shape = self.shape(frame.shape)?;

            match frame.value_nodes {
                None => {
                    // A duplicate frame whose pair was already handled higher up
                    if !matches!(self.state.get(&key), Some(VisitState::Pending)) {
                        continue;
                    }
                    self.state.insert(key, VisitState::InProgress);

                    let value_nodes = self.value_nodes(shape, &frame.node);
                    let dependencies = if shape.deactivated {
                        Vec::new()
                    } else {
                        dependencies(shape, &value_nodes)
                    };

                    stack.push(Frame {
                        shape: frame.shape,
                        node: frame.node,
                        value_nodes: Some(value_nodes),
                    });

                    for dep in dependencies {
                        match self.state.get(&dep) {
                            None | Some(VisitState::Pending) => {
                                self.state.insert(dep.clone(), VisitState::Pending);
                                stack.push(Frame {
                                    shape: dep.0,
                                    node: dep.1,
                                    value_nodes: None,
                                });
                            }
                            Some(VisitState::InProgress) | Some(VisitState::Done(_)) => {}
                        }
                    }
                }
                Some(value_nodes) => {
                    let results = self.evaluate_pair(shape, &frame.node, &value_nodes)?;
                    trace!(shape = %shape.node, focus = %frame.node, results = results.len(), "evaluated pair");
                    self.state.insert(key, VisitState::Done(results));
                }
            }
        }
        Ok(())
    }

    /// The focus node itself for node shapes, the path's values for property shapes
    fn value_nodes(&self, shape: &Shape, focus: &Term) -> Vec<Term> {
        match &shape.path {
            Some(path) => path.evaluate(self.data, focus),
            None => vec![focus.clone()],
        }
    }

    /// Run every constraint of `shape` for one focus node
    fn evaluate_pair(
        &self,
        shape: &Shape,
        focus: &Term,
        value_nodes: &[Term],
    ) -> Result<Vec<ValidationResult>> {
        if shape.deactivated {
            return Ok(Vec::new());
        }

        let outcomes = StateView { state: &self.state };
        let ctx = EvalContext {
            data: self.data,
            shapes: self.shapes,
            hierarchy: &self.hierarchy,
            outcomes: &outcomes,
        };

        let mut results = Vec::new();
        for (index, constraint) in shape.constraints.iter().enumerate() {
            for finding in evaluate(constraint, &ctx, focus, value_nodes)? {
                results.push(match finding {
                    Finding::Violation(v) => ValidationResult {
                        focus_node: focus.clone(),
                        result_path: v.path.or_else(|| shape.path.clone()),
                        value: v.value,
                        source_shape: shape.node.clone(),
                        source_constraint: v.kind,
                        severity: shape.severity,
                        message: shape.message.clone().unwrap_or(v.message),
                        constraint_index: index,
                        detail: v.detail,
                    },
                    Finding::Nested(result) => result,
                });
            }
        }
        Ok(results)
    }
}

/// Nested pairs the constraints of `shape` read, in constraint order
fn dependencies(shape: &Shape, value_nodes: &[Term]) -> Vec<(ShapeId, Term)> {
    let mut deps = Vec::new();
    for constraint in &shape.constraints {
        for &nested in constraint.shape_refs() {
            for value in value_nodes {
                deps.push((nested, value.clone()));
            }
        }
    }
    deps
}
