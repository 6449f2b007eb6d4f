//! Validation results and the report built from them
//!
//! The engine pushes results into a [`ReportBuilder`], which drops duplicates
//! and decides conformance. The finished [`ValidationReport`] renders as
//! deterministic text, as JSON, or as a SHACL results graph.

use crate::compile::Severity;
use crate::config::ValidationConfig;
use crate::error::{Result, ShaclError};
use crate::path::PropertyPath;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use shacl_graph_ir::{Graph, Term};
use shacl_vocab::{components, prefixes, rdf, shacl, xsd};
use std::collections::BTreeMap;
use std::fmt::Write as _;

/// Maximum number of result details carried by [`ShaclError::ValidationFailed`]
const MAX_DETAILS: usize = 10;

/// The constraint component that produced a result
///
/// Declaration order is the tie-break order of the text report.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ConstraintKind {
    Class,
    Datatype,
    NodeKind,
    MinCount,
    MaxCount,
    MinLength,
    MaxLength,
    Pattern,
    LanguageIn,
    UniqueLang,
    MinInclusive,
    MaxInclusive,
    MinExclusive,
    MaxExclusive,
    In,
    HasValue,
    Equals,
    Disjoint,
    LessThan,
    LessThanOrEquals,
    Node,
    Property,
    And,
    Or,
    Not,
    Xone,
    QualifiedMinCount,
    QualifiedMaxCount,
    Closed,
}

impl ConstraintKind {
    /// The SHACL constraint component IRI
    pub fn component_iri(self) -> &'static str {
        match self {
            ConstraintKind::Class => components::CLASS,
            ConstraintKind::Datatype => components::DATATYPE,
            ConstraintKind::NodeKind => components::NODE_KIND,
            ConstraintKind::MinCount => components::MIN_COUNT,
            ConstraintKind::MaxCount => components::MAX_COUNT,
            ConstraintKind::MinLength => components::MIN_LENGTH,
            ConstraintKind::MaxLength => components::MAX_LENGTH,
            ConstraintKind::Pattern => components::PATTERN,
            ConstraintKind::LanguageIn => components::LANGUAGE_IN,
            ConstraintKind::UniqueLang => components::UNIQUE_LANG,
            ConstraintKind::MinInclusive => components::MIN_INCLUSIVE,
            ConstraintKind::MaxInclusive => components::MAX_INCLUSIVE,
            ConstraintKind::MinExclusive => components::MIN_EXCLUSIVE,
            ConstraintKind::MaxExclusive => components::MAX_EXCLUSIVE,
            ConstraintKind::In => components::IN,
            ConstraintKind::HasValue => components::HAS_VALUE,
            ConstraintKind::Equals => components::EQUALS,
            ConstraintKind::Disjoint => components::DISJOINT,
            ConstraintKind::LessThan => components::LESS_THAN,
            ConstraintKind::LessThanOrEquals => components::LESS_THAN_OR_EQUALS,
            ConstraintKind::Node => components::NODE,
            ConstraintKind::Property => components::PROPERTY,
            ConstraintKind::And => components::AND,
            ConstraintKind::Or => components::OR,
            ConstraintKind::Not => components::NOT,
            ConstraintKind::Xone => components::XONE,
            ConstraintKind::QualifiedMinCount => components::QUALIFIED_MIN_COUNT,
            ConstraintKind::QualifiedMaxCount => components::QUALIFIED_MAX_COUNT,
            ConstraintKind::Closed => components::CLOSED,
        }
    }
}

/// Individual validation result
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// The focus node that was validated
    pub focus_node: Term,
    /// The property path (if property constraint)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result_path: Option<PropertyPath>,
    /// The value that caused the violation (if applicable)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<Term>,
    /// The shape that produced this result
    pub source_shape: Term,
    /// The constraint component that produced this result
    pub source_constraint: ConstraintKind,
    /// Severity level
    pub severity: Severity,
    /// Human-readable message
    pub message: String,
    /// Position of the producing constraint within `source_shape`
    #[serde(skip)]
    pub(crate) constraint_index: usize,
    /// Tells apart several findings of one constraint at the same value
    #[serde(skip)]
    pub(crate) detail: Option<String>,
}

impl ValidationResult {
    fn key(&self) -> ResultKey {
        (
            self.source_shape.clone(),
            self.focus_node.clone(),
            self.constraint_index,
            self.detail.clone(),
            self.result_path.clone(),
            self.value.clone(),
        )
    }
}

impl std::fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.result_path {
            Some(path) => write!(f, "Node {}: property {}: {}", self.focus_node, path, self.message),
            None => write!(f, "Node {}: {}", self.focus_node, self.message),
        }
    }
}

/// (source shape, focus node, constraint index, detail, path, value)
type ResultKey = (Term, Term, usize, Option<String>, Option<PropertyPath>, Option<Term>);

/// Whether a report's result list is exhaustive
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Outcome {
    /// Every target was validated
    #[default]
    Complete,
    /// Stopped after the first focus node with a Violation
    AbortedOnFirst,
    /// The time budget ran out before every target was validated
    BudgetExceeded,
}

impl Outcome {
    pub fn is_complete(self) -> bool {
        self == Outcome::Complete
    }
}

/// Accumulates results in discovery order, dropping duplicates
#[derive(Debug, Default)]
pub struct ReportBuilder {
    results: Vec<ValidationResult>,
    seen: FxHashSet<ResultKey>,
}

impl ReportBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a result; returns false if an equivalent result was already added
    pub fn push(&mut self, result: ValidationResult) -> bool {
        if self.seen.insert(result.key()) {
            self.results.push(result);
            true
        } else {
            false
        }
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Finish the report
    ///
    /// The report conforms unless it holds a Violation, a Warning while
    /// warnings are not allowed, or an Info while infos are not allowed.
    pub fn build(
        self,
        config: &ValidationConfig,
        outcome: Outcome,
        prefixes: BTreeMap<String, String>,
    ) -> ValidationReport {
        let conforms = !self.results.iter().any(|r| match r.severity {
            Severity::Violation => true,
            Severity::Warning => !config.allow_warnings,
            Severity::Info => !config.allow_infos,
        });
        ValidationReport {
            conforms,
            results: self.results,
            outcome,
            prefixes,
        }
    }
}

impl Extend<ValidationResult> for ReportBuilder {
    fn extend<I: IntoIterator<Item = ValidationResult>>(&mut self, iter: I) {
        for result in iter {
            self.push(result);
        }
    }
}

/// SHACL validation report
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// Whether the data conforms, under the configured allow flags
    pub conforms: bool,
    /// Individual validation results, in discovery order
    pub results: Vec<ValidationResult>,
    /// Whether `results` is exhaustive
    pub outcome: Outcome,
    /// Prefixes used to compact IRIs in the text rendering
    #[serde(skip)]
    prefixes: BTreeMap<String, String>,
}

impl ValidationReport {
    /// Create an empty conforming report
    pub fn conforming() -> Self {
        Self {
            conforms: true,
            results: Vec::new(),
            outcome: Outcome::Complete,
            prefixes: BTreeMap::new(),
        }
    }

    /// Count violations (Severity::Violation results)
    pub fn violation_count(&self) -> usize {
        self.count(Severity::Violation)
    }

    /// Count warnings (Severity::Warning results)
    pub fn warning_count(&self) -> usize {
        self.count(Severity::Warning)
    }

    /// Count infos (Severity::Info results)
    pub fn info_count(&self) -> usize {
        self.count(Severity::Info)
    }

    fn count(&self, severity: Severity) -> usize {
        self.results.iter().filter(|r| r.severity == severity).count()
    }

    /// Deterministic human-readable rendering
    ///
    /// One line per result, sorted by focus node, source shape and component
    /// (then path, value and message), followed by a summary line.
    pub fn to_text(&self) -> String {
        let mut sorted: Vec<&ValidationResult> = self.results.iter().collect();
        sorted.sort_by(|a, b| {
            (&a.focus_node, &a.source_shape, a.source_constraint, &a.result_path, &a.value, &a.message)
                .cmp(&(&b.focus_node, &b.source_shape, b.source_constraint, &b.result_path, &b.value, &b.message))
        });

        let mut out = String::new();
        for r in sorted {
            let _ = write!(
                out,
                "{}: focus {}, shape {}, component {}",
                r.severity,
                self.term(&r.focus_node),
                self.term(&r.source_shape),
                self.compact(r.source_constraint.component_iri()),
            );
            if let Some(path) = &r.result_path {
                let _ = write!(out, ", path {}", path.render(&|iri| self.compact(iri)));
            }
            if let Some(value) = &r.value {
                let _ = write!(out, ", value {}", self.term(value));
            }
            let _ = writeln!(out, ": {}", r.message);
        }

        let _ = write!(
            out,
            "Conforms: {} ({} violation(s), {} warning(s), {} info(s))",
            self.conforms,
            self.violation_count(),
            self.warning_count(),
            self.info_count()
        );
        match self.outcome {
            Outcome::Complete => {}
            Outcome::AbortedOnFirst => out.push_str(" [aborted on first violation]"),
            Outcome::BudgetExceeded => out.push_str(" [time budget exceeded]"),
        }
        out.push('\n');
        out
    }

    /// JSON rendering of the structured report
    pub fn to_json(&self) -> serde_json::Result<serde_json::Value> {
        serde_json::to_value(self)
    }

    /// The report as a SHACL results graph
    ///
    /// One `sh:ValidationReport` node with `sh:conforms` and one
    /// `sh:ValidationResult` per result, in report order.
    pub fn to_graph(&self) -> Result<Graph> {
        let mut graph = Graph::new();
        for (prefix, ns) in prefixes::WELL_KNOWN {
            graph.add_prefix(*prefix, *ns);
        }
        for (prefix, ns) in &self.prefixes {
            graph.add_prefix(prefix.clone(), ns.clone());
        }

        let ty = Term::iri(rdf::TYPE);
        let report = Term::blank("report");
        graph.add_triple(report.clone(), ty.clone(), Term::iri(shacl::VALIDATION_REPORT))?;
        graph.add_triple(
            report.clone(),
            Term::iri(shacl::CONFORMS),
            Term::boolean(self.conforms),
        )?;

        let mut next_blank = 0usize;
        let mut fresh = || {
            next_blank += 1;
            Term::blank(format!("path{}", next_blank))
        };

        for (i, r) in self.results.iter().enumerate() {
            let node = Term::blank(format!("result{}", i));
            graph.add_triple(report.clone(), Term::iri(shacl::RESULT), node.clone())?;
            graph.add_triple(node.clone(), ty.clone(), Term::iri(shacl::VALIDATION_RESULT))?;
            graph.add_triple(node.clone(), Term::iri(shacl::FOCUS_NODE), r.focus_node.clone())?;
            if let Some(path) = &r.result_path {
                let path_node = path.to_rdf(&mut graph, &mut fresh)?;
                graph.add_triple(node.clone(), Term::iri(shacl::RESULT_PATH), path_node)?;
            }
            if let Some(value) = &r.value {
                graph.add_triple(node.clone(), Term::iri(shacl::VALUE), value.clone())?;
            }
            graph.add_triple(node.clone(), Term::iri(shacl::SOURCE_SHAPE), r.source_shape.clone())?;
            graph.add_triple(
                node.clone(),
                Term::iri(shacl::SOURCE_CONSTRAINT_COMPONENT),
                Term::iri(r.source_constraint.component_iri()),
            )?;
            graph.add_triple(
                node.clone(),
                Term::iri(shacl::RESULT_SEVERITY),
                Term::iri(r.severity.iri()),
            )?;
            graph.add_triple(node, Term::iri(shacl::RESULT_MESSAGE), Term::string(&r.message))?;
        }
        Ok(graph)
    }

    /// Turn a non-conforming report into [`ShaclError::ValidationFailed`]
    ///
    /// Details cover at most the first ten results, Violations first.
    pub fn into_result(self) -> Result<Self> {
        if self.conforms {
            return Ok(self);
        }
        let mut ordered: Vec<&ValidationResult> = self.results.iter().collect();
        ordered.sort_by_key(|r| r.severity);
        let details = ordered
            .into_iter()
            .take(MAX_DETAILS)
            .map(|r| r.to_string())
            .collect();
        Err(ShaclError::ValidationFailed {
            violation_count: self.violation_count(),
            warning_count: self.warning_count(),
            details,
        })
    }

    /// Compact an IRI with the report's prefixes, then the well-known ones
    fn compact(&self, iri: &str) -> String {
        let declared = self.prefixes.iter().map(|(p, ns)| (p.as_str(), ns.as_str()));
        let best = declared
            .chain(prefixes::WELL_KNOWN.iter().copied())
            .filter(|(_, ns)| !ns.is_empty() && iri.starts_with(ns))
            .filter(|(_, ns)| {
                let local = &iri[ns.len()..];
                !local.is_empty() && !local.contains(&['/', '#'][..])
            })
            .max_by_key(|(_, ns)| ns.len());
        match best {
            Some((prefix, ns)) => format!("{}:{}", prefix, &iri[ns.len()..]),
            None => format!("<{}>", iri),
        }
    }

    fn term(&self, term: &Term) -> String {
        match term {
            Term::Iri(iri) => self.compact(iri),
            Term::BlankNode(id) => id.to_string(),
            Term::Literal(lit) => {
                let quoted = format!("\"{}\"", lit.lexical().escape_default());
                if let Some(lang) = lit.language() {
                    format!("{}@{}", quoted, lang)
                } else if lit.datatype().as_iri() == xsd::STRING {
                    quoted
                } else {
                    format!("{}^^{}", quoted, self.compact(lit.datatype().as_iri()))
                }
            }
        }
    }
}

impl std::fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_text())
    }
}
