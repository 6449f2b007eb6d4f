//! Shape compilation from a SHACL shapes graph
//!
//! This module compiles SHACL shape definitions from the triples of a shapes
//! graph into an arena of [`Shape`]s. Shapes refer to each other by
//! [`ShapeId`], so recursive and mutually recursive shapes need no special
//! handling here; the engine breaks cycles at validation time.
//!
//! A subject becomes a shape when it is typed `sh:NodeShape` or
//! `sh:PropertyShape`, or when any recognized target, constraint or shape
//! parameter is attached to it. Constraints appear in the order of the
//! shape's triples.

use crate::constraints::{Constraint, PatternConstraint};
use crate::error::{Result, ShaclError};
use crate::path::PropertyPath;
use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use shacl_graph_ir::{Datatype, Graph, LiteralValue, Term, Triple};
use shacl_vocab::{rdf, rdfs, shacl};
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use tracing::{debug, trace};

/// Index of a shape in its [`ShapeSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct ShapeId(pub(crate) u32);

impl ShapeId {
    /// Position of the shape in load order
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for ShapeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "shape#{}", self.0)
    }
}

/// Node shape or property shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ShapeKind {
    Node,
    Property,
}

/// How a shape selects its target focus nodes
#[derive(Debug, Clone, PartialEq)]
pub enum Target {
    /// sh:targetClass - all instances of the class
    Class(Arc<str>),
    /// sh:targetNode - a specific node
    Node(Term),
    /// sh:targetSubjectsOf - subjects of triples with this predicate
    SubjectsOf(Arc<str>),
    /// sh:targetObjectsOf - objects of triples with this predicate
    ObjectsOf(Arc<str>),
    /// Implicit class targeting (shape is also a class)
    ImplicitClass(Arc<str>),
}

/// sh:nodeKind values
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    BlankNode,
    IRI,
    Literal,
    BlankNodeOrIRI,
    BlankNodeOrLiteral,
    IRIOrLiteral,
}

impl NodeKind {
    /// Parse a node kind IRI
    pub fn from_iri(iri: &str) -> Option<Self> {
        match iri {
            shacl::BLANK_NODE => Some(NodeKind::BlankNode),
            shacl::IRI => Some(NodeKind::IRI),
            shacl::LITERAL => Some(NodeKind::Literal),
            shacl::BLANK_NODE_OR_IRI => Some(NodeKind::BlankNodeOrIRI),
            shacl::BLANK_NODE_OR_LITERAL => Some(NodeKind::BlankNodeOrLiteral),
            shacl::IRI_OR_LITERAL => Some(NodeKind::IRIOrLiteral),
            _ => None,
        }
    }

    pub fn iri(self) -> &'static str {
        match self {
            NodeKind::BlankNode => shacl::BLANK_NODE,
            NodeKind::IRI => shacl::IRI,
            NodeKind::Literal => shacl::LITERAL,
            NodeKind::BlankNodeOrIRI => shacl::BLANK_NODE_OR_IRI,
            NodeKind::BlankNodeOrLiteral => shacl::BLANK_NODE_OR_LITERAL,
            NodeKind::IRIOrLiteral => shacl::IRI_OR_LITERAL,
        }
    }

    /// The basic kind of a term
    pub fn of(term: &Term) -> Self {
        match term {
            Term::Iri(_) => NodeKind::IRI,
            Term::BlankNode(_) => NodeKind::BlankNode,
            Term::Literal(_) => NodeKind::Literal,
        }
    }

    /// Whether `term` is of this kind
    pub fn matches(self, term: &Term) -> bool {
        match self {
            NodeKind::BlankNode => term.is_blank(),
            NodeKind::IRI => term.is_iri(),
            NodeKind::Literal => term.is_literal(),
            NodeKind::BlankNodeOrIRI => term.is_blank() || term.is_iri(),
            NodeKind::BlankNodeOrLiteral => term.is_blank() || term.is_literal(),
            NodeKind::IRIOrLiteral => term.is_iri() || term.is_literal(),
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let local = self.iri().trim_start_matches(shacl::NS);
        write!(f, "sh:{}", local)
    }
}

/// Severity level for constraint violations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub enum Severity {
    #[default]
    Violation,
    Warning,
    Info,
}

impl Severity {
    pub fn from_iri(iri: &str) -> Option<Self> {
        match iri {
            shacl::VIOLATION => Some(Severity::Violation),
            shacl::WARNING => Some(Severity::Warning),
            shacl::INFO => Some(Severity::Info),
            _ => None,
        }
    }

    pub fn iri(self) -> &'static str {
        match self {
            Severity::Violation => shacl::VIOLATION,
            Severity::Warning => shacl::WARNING,
            Severity::Info => shacl::INFO,
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Violation => f.write_str("Violation"),
            Severity::Warning => f.write_str("Warning"),
            Severity::Info => f.write_str("Info"),
        }
    }
}

/// A compiled shape
#[derive(Debug, Clone)]
pub struct Shape {
    pub id: ShapeId,
    /// The shape's node in the shapes graph (IRI or blank node)
    pub node: Term,
    pub kind: ShapeKind,
    /// Property path (property shapes only)
    pub path: Option<PropertyPath>,
    /// How this shape targets focus nodes
    pub targets: Vec<Target>,
    /// Constraints in shapes-graph order
    pub constraints: Vec<Constraint>,
    /// Severity level for violations
    pub severity: Severity,
    /// Human-readable name
    pub name: Option<String>,
    /// Replaces the generated message of every result from this shape
    pub message: Option<String>,
    /// Whether this shape is deactivated (sh:deactivated true)
    pub deactivated: bool,
}

impl Shape {
    /// Check if this shape has any targets
    pub fn has_targets(&self) -> bool {
        !self.targets.is_empty()
    }

    pub fn is_property_shape(&self) -> bool {
        self.kind == ShapeKind::Property
    }
}

/// All shapes of a shapes graph, in discovery order
#[derive(Debug, Clone, Default)]
pub struct ShapeSet {
    shapes: Vec<Shape>,
    by_node: FxHashMap<Term, ShapeId>,
    prefixes: BTreeMap<String, String>,
}

impl ShapeSet {
    /// Compile every shape in `graph`
    ///
    /// Fails on the first malformed parameter, bad regex, malformed path or
    /// dangling shape reference.
    pub fn load(graph: &Graph) -> Result<Self> {
        let _span = tracing::debug_span!("shacl_load", triples = graph.len()).entered();
        let set = ShapeCompiler::new(graph).compile()?;
        debug!(shapes = set.len(), "compiled SHACL shapes");
        Ok(set)
    }

    pub fn get(&self, id: ShapeId) -> Option<&Shape> {
        self.shapes.get(id.index())
    }

    /// The shape whose node is `node`
    pub fn lookup(&self, node: &Term) -> Option<ShapeId> {
        self.by_node.get(node).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.iter()
    }

    pub fn len(&self) -> usize {
        self.shapes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
    }

    /// Prefixes declared in the shapes graph
    pub fn prefixes(&self) -> &BTreeMap<String, String> {
        &self.prefixes
    }
}

/// Predicates whose presence on a subject makes it a shape
const SHAPE_PREDICATES: &[&str] = &[
    // Targeting
    shacl::TARGET_CLASS,
    shacl::TARGET_NODE,
    shacl::TARGET_SUBJECTS_OF,
    shacl::TARGET_OBJECTS_OF,
    // Property shape
    shacl::PROPERTY,
    shacl::PATH,
    // Cardinality
    shacl::MIN_COUNT,
    shacl::MAX_COUNT,
    // Value type
    shacl::DATATYPE,
    shacl::NODE_KIND,
    shacl::CLASS,
    // Value range
    shacl::MIN_INCLUSIVE,
    shacl::MAX_INCLUSIVE,
    shacl::MIN_EXCLUSIVE,
    shacl::MAX_EXCLUSIVE,
    // String
    shacl::PATTERN,
    shacl::MIN_LENGTH,
    shacl::MAX_LENGTH,
    shacl::LANGUAGE_IN,
    shacl::UNIQUE_LANG,
    // Value
    shacl::HAS_VALUE,
    shacl::IN,
    // Pair constraints
    shacl::EQUALS,
    shacl::DISJOINT,
    shacl::LESS_THAN,
    shacl::LESS_THAN_OR_EQUALS,
    // Shape-based
    shacl::NODE,
    shacl::NOT,
    shacl::AND,
    shacl::OR,
    shacl::XONE,
    shacl::QUALIFIED_VALUE_SHAPE,
    // Closed shape
    shacl::CLOSED,
    shacl::IGNORED_PROPERTIES,
    // Shape parameters
    shacl::SEVERITY,
    shacl::DEACTIVATED,
];

/// Builder for compiling shapes from a shapes graph
struct ShapeCompiler<'a> {
    graph: &'a Graph,
    nodes: Vec<Term>,
    by_node: FxHashMap<Term, ShapeId>,
}

impl<'a> ShapeCompiler<'a> {
    fn new(graph: &'a Graph) -> Self {
        Self {
            graph,
            nodes: Vec::new(),
            by_node: FxHashMap::default(),
        }
    }

    fn compile(mut self) -> Result<ShapeSet> {
        self.discover();

        let mut shapes = Vec::with_capacity(self.nodes.len());
        for (index, node) in self.nodes.iter().enumerate() {
            shapes.push(self.compile_shape(ShapeId(index as u32), node)?);
        }

        Ok(ShapeSet {
            shapes,
            by_node: self.by_node,
            prefixes: self.graph.prefixes.clone(),
        })
    }

    /// Assign shape ids in triple order
    fn discover(&mut self) {
        for triple in self.graph.iter() {
            let predicate = triple.predicate_iri();
            let is_shape = if predicate == rdf::TYPE {
                matches!(
                    triple.object().as_iri(),
                    Some(shacl::NODE_SHAPE) | Some(shacl::PROPERTY_SHAPE)
                )
            } else {
                SHAPE_PREDICATES.contains(&predicate)
            };
            if is_shape && !self.by_node.contains_key(triple.subject()) {
                let id = ShapeId(self.nodes.len() as u32);
                self.by_node.insert(triple.subject().clone(), id);
                self.nodes.push(triple.subject().clone());
            }
        }
    }

    fn compile_shape(&self, id: ShapeId, node: &Term) -> Result<Shape> {
        let mut paths = self.graph.objects(node, shacl::PATH);
        let path = match (paths.next(), paths.next()) {
            (None, _) => None,
            (Some(p), None) => Some(PropertyPath::parse(self.graph, p, node)?),
            (Some(_), Some(_)) => {
                return Err(ShaclError::invalid(node, "sh:path", "more than one path"))
            }
        };

        let mut shape = Shape {
            id,
            node: node.clone(),
            kind: if path.is_some() {
                ShapeKind::Property
            } else {
                ShapeKind::Node
            },
            path,
            targets: Vec::new(),
            constraints: Vec::new(),
            severity: Severity::default(),
            name: None,
            message: None,
            deactivated: false,
        };

        for triple in self.graph.triples_for_subject(node) {
            self.process_triple(&mut shape, triple)?;
        }
        trace!(
            shape = %node,
            constraints = ?shape.constraints.iter().map(Constraint::description).collect::<Vec<_>>(),
            "compiled shape"
        );
        Ok(shape)
    }

    /// Process a single triple of a shape
    fn process_triple(&self, shape: &mut Shape, triple: &Triple) -> Result<()> {
        let node = &shape.node;
        let object = triple.object();

        match triple.predicate_iri() {
            rdf::TYPE => {
                if object.as_iri() == Some(rdfs::CLASS) {
                    if let Some(class) = node.as_iri() {
                        shape.targets.push(Target::ImplicitClass(Arc::from(class)));
                    }
                }
            }

            // Targets
            shacl::TARGET_CLASS => {
                let class = iri_param(node, "sh:targetClass", object)?;
                shape.targets.push(Target::Class(class));
            }
            shacl::TARGET_NODE => shape.targets.push(Target::Node(object.clone())),
            shacl::TARGET_SUBJECTS_OF => {
                let p = iri_param(node, "sh:targetSubjectsOf", object)?;
                shape.targets.push(Target::SubjectsOf(p));
            }
            shacl::TARGET_OBJECTS_OF => {
                let p = iri_param(node, "sh:targetObjectsOf", object)?;
                shape.targets.push(Target::ObjectsOf(p));
            }

            // Property reference from a shape to a property shape
            shacl::PROPERTY => {
                let id = self.shape_ref(node, object)?;
                if self.graph.object(object, shacl::PATH).is_none() {
                    return Err(ShaclError::invalid(
                        node,
                        "sh:property",
                        format!("{} has no sh:path", object),
                    ));
                }
                shape.constraints.push(Constraint::Property(id));
            }

            // Cardinality constraints
            shacl::MIN_COUNT => {
                let n = count_param(node, "sh:minCount", object)?;
                shape.constraints.push(Constraint::MinCount(n));
            }
            shacl::MAX_COUNT => {
                let n = count_param(node, "sh:maxCount", object)?;
                shape.constraints.push(Constraint::MaxCount(n));
            }

            // Value type constraints
            shacl::DATATYPE => {
                let dt = iri_param(node, "sh:datatype", object)?;
                shape
                    .constraints
                    .push(Constraint::Datatype(Datatype::from_iri(&dt)));
            }
            shacl::NODE_KIND => {
                let kind = object
                    .as_iri()
                    .and_then(NodeKind::from_iri)
                    .ok_or_else(|| {
                        ShaclError::invalid(node, "sh:nodeKind", format!("unknown node kind {}", object))
                    })?;
                shape.constraints.push(Constraint::NodeKind(kind));
            }
            shacl::CLASS => {
                let class = iri_param(node, "sh:class", object)?;
                shape.constraints.push(Constraint::Class(class));
            }

            // Value range constraints
            shacl::MIN_INCLUSIVE => {
                let bound = literal_param(node, "sh:minInclusive", object)?;
                shape.constraints.push(Constraint::MinInclusive(bound));
            }
            shacl::MAX_INCLUSIVE => {
                let bound = literal_param(node, "sh:maxInclusive", object)?;
                shape.constraints.push(Constraint::MaxInclusive(bound));
            }
            shacl::MIN_EXCLUSIVE => {
                let bound = literal_param(node, "sh:minExclusive", object)?;
                shape.constraints.push(Constraint::MinExclusive(bound));
            }
            shacl::MAX_EXCLUSIVE => {
                let bound = literal_param(node, "sh:maxExclusive", object)?;
                shape.constraints.push(Constraint::MaxExclusive(bound));
            }

            // String constraints
            shacl::PATTERN => {
                let pattern = string_param(node, "sh:pattern", object)?;
                let mut all_flags = self.graph.objects(node, shacl::FLAGS);
                let flags = match (all_flags.next(), all_flags.next()) {
                    (None, _) => None,
                    (Some(f), None) => Some(string_param(node, "sh:flags", f)?),
                    (Some(_), Some(_)) => {
                        return Err(ShaclError::invalid(node, "sh:flags", "more than one flags value"))
                    }
                };
                let compiled = PatternConstraint::compile(&pattern, flags.as_deref()).map_err(|e| {
                    ShaclError::InvalidPattern {
                        shape: node.clone(),
                        pattern: pattern.clone(),
                        message: e.to_string(),
                    }
                })?;
                shape.constraints.push(Constraint::Pattern(compiled));
            }
            shacl::MIN_LENGTH => {
                let n = count_param(node, "sh:minLength", object)?;
                shape.constraints.push(Constraint::MinLength(n));
            }
            shacl::MAX_LENGTH => {
                let n = count_param(node, "sh:maxLength", object)?;
                shape.constraints.push(Constraint::MaxLength(n));
            }
            shacl::LANGUAGE_IN => {
                let ranges = self
                    .graph
                    .list(object)?
                    .iter()
                    .map(|t| string_param(node, "sh:languageIn", t))
                    .collect::<Result<Vec<_>>>()?;
                shape.constraints.push(Constraint::LanguageIn(ranges));
            }
            shacl::UNIQUE_LANG => {
                if bool_param(node, "sh:uniqueLang", object)? {
                    shape.constraints.push(Constraint::UniqueLang);
                }
            }

            // Value constraints
            shacl::HAS_VALUE => shape.constraints.push(Constraint::HasValue(object.clone())),
            shacl::IN => {
                let values = self.graph.list(object)?;
                shape.constraints.push(Constraint::In(values));
            }

            // Pair constraints
            shacl::EQUALS => {
                let p = iri_param(node, "sh:equals", object)?;
                shape.constraints.push(Constraint::Equals(p));
            }
            shacl::DISJOINT => {
                let p = iri_param(node, "sh:disjoint", object)?;
                shape.constraints.push(Constraint::Disjoint(p));
            }
            shacl::LESS_THAN => {
                let p = iri_param(node, "sh:lessThan", object)?;
                shape.constraints.push(Constraint::LessThan(p));
            }
            shacl::LESS_THAN_OR_EQUALS => {
                let p = iri_param(node, "sh:lessThanOrEquals", object)?;
                shape.constraints.push(Constraint::LessThanOrEquals(p));
            }

            // Shape-based constraints
            shacl::NODE => {
                let id = self.shape_ref(node, object)?;
                shape.constraints.push(Constraint::Node(id));
            }
            shacl::NOT => {
                let id = self.shape_ref(node, object)?;
                shape.constraints.push(Constraint::Not(id));
            }
            shacl::AND => {
                let ids = self.shape_list(node, object)?;
                shape.constraints.push(Constraint::And(ids));
            }
            shacl::OR => {
                let ids = self.shape_list(node, object)?;
                shape.constraints.push(Constraint::Or(ids));
            }
            shacl::XONE => {
                let ids = self.shape_list(node, object)?;
                shape.constraints.push(Constraint::Xone(ids));
            }
            shacl::QUALIFIED_VALUE_SHAPE => {
                let id = self.shape_ref(node, object)?;
                let min_count = self.optional_count(node, shacl::QUALIFIED_MIN_COUNT, "sh:qualifiedMinCount")?;
                let max_count = self.optional_count(node, shacl::QUALIFIED_MAX_COUNT, "sh:qualifiedMaxCount")?;
                if min_count.is_none() && max_count.is_none() {
                    return Err(ShaclError::invalid(
                        node,
                        "sh:qualifiedValueShape",
                        "needs sh:qualifiedMinCount or sh:qualifiedMaxCount",
                    ));
                }
                shape.constraints.push(Constraint::QualifiedValueShape {
                    shape: id,
                    min_count,
                    max_count,
                });
            }

            // Closed shape constraints
            shacl::CLOSED => {
                if bool_param(node, "sh:closed", object)? {
                    let closed = self.closed_constraint(node)?;
                    shape.constraints.push(closed);
                }
            }

            // Shape parameters
            shacl::SEVERITY => {
                shape.severity = object
                    .as_iri()
                    .and_then(Severity::from_iri)
                    .ok_or_else(|| {
                        ShaclError::invalid(node, "sh:severity", format!("unknown severity {}", object))
                    })?;
            }
            shacl::DEACTIVATED => {
                shape.deactivated = bool_param(node, "sh:deactivated", object)?;
            }
            shacl::MESSAGE => {
                if shape.message.is_none() {
                    shape.message = Some(string_param(node, "sh:message", object)?);
                }
            }
            shacl::NAME => {
                if shape.name.is_none() {
                    shape.name = Some(string_param(node, "sh:name", object)?);
                }
            }

            // Consumed by the parameter they accompany, or purely descriptive
            shacl::PATH
            | shacl::FLAGS
            | shacl::IGNORED_PROPERTIES
            | shacl::QUALIFIED_MIN_COUNT
            | shacl::QUALIFIED_MAX_COUNT
            | shacl::DESCRIPTION
            | shacl::ORDER
            | shacl::GROUP => {}

            other if shacl::is_shacl_iri(other) => {
                debug!(shape = %node, predicate = other, "ignoring unsupported SHACL predicate");
            }
            _ => {}
        }
        Ok(())
    }

    /// Resolve a shape reference
    fn shape_ref(&self, referrer: &Term, node: &Term) -> Result<ShapeId> {
        self.by_node
            .get(node)
            .copied()
            .ok_or_else(|| ShaclError::UnknownShapeReference {
                referrer: referrer.clone(),
                referenced: node.clone(),
            })
    }

    /// Resolve an RDF list of shape references
    fn shape_list(&self, referrer: &Term, head: &Term) -> Result<Vec<ShapeId>> {
        self.graph
            .list(head)?
            .iter()
            .map(|member| self.shape_ref(referrer, member))
            .collect()
    }

    fn optional_count(
        &self,
        node: &Term,
        predicate: &str,
        parameter: &'static str,
    ) -> Result<Option<usize>> {
        self.graph
            .object(node, predicate)
            .map(|t| count_param(node, parameter, t))
            .transpose()
    }

    /// Build the sh:closed constraint for `node`
    ///
    /// Allowed predicates are rdf:type plus the simple paths of the shape's
    /// own property shapes.
    fn closed_constraint(&self, node: &Term) -> Result<Constraint> {
        let mut allowed: BTreeSet<Arc<str>> = BTreeSet::new();
        allowed.insert(Arc::from(rdf::TYPE));
        for property in self.graph.objects(node, shacl::PROPERTY) {
            if let Some(path) = self.graph.object(property, shacl::PATH) {
                if let Some(p) = path.as_iri() {
                    allowed.insert(Arc::from(p));
                }
            }
        }

        let mut ignored: BTreeSet<Arc<str>> = BTreeSet::new();
        for head in self.graph.objects(node, shacl::IGNORED_PROPERTIES) {
            for member in self.graph.list(head)? {
                ignored.insert(iri_param(node, "sh:ignoredProperties", &member)?);
            }
        }

        Ok(Constraint::Closed { allowed, ignored })
    }
}

fn iri_param(shape: &Term, parameter: &'static str, value: &Term) -> Result<Arc<str>> {
    value
        .as_iri()
        .map(Arc::from)
        .ok_or_else(|| ShaclError::invalid(shape, parameter, format!("expected an IRI, found {}", value)))
}

fn literal_param(shape: &Term, parameter: &'static str, value: &Term) -> Result<Term> {
    if value.is_literal() {
        Ok(value.clone())
    } else {
        Err(ShaclError::invalid(
            shape,
            parameter,
            format!("expected a literal, found {}", value),
        ))
    }
}

fn string_param(shape: &Term, parameter: &'static str, value: &Term) -> Result<String> {
    value
        .as_literal()
        .map(|lit| lit.lexical().to_string())
        .ok_or_else(|| ShaclError::invalid(shape, parameter, format!("expected a literal, found {}", value)))
}

fn count_param(shape: &Term, parameter: &'static str, value: &Term) -> Result<usize> {
    match value.as_literal().and_then(|lit| lit.value()) {
        Some(LiteralValue::Integer(n)) => usize::try_from(n).map_err(|_| {
            ShaclError::invalid(shape, parameter, format!("expected a non-negative integer, found {}", n))
        }),
        _ => Err(ShaclError::invalid(
            shape,
            parameter,
            format!("expected an integer, found {}", value),
        )),
    }
}

fn bool_param(shape: &Term, parameter: &'static str, value: &Term) -> Result<bool> {
    match value.as_literal().and_then(|lit| lit.value()) {
        Some(LiteralValue::Boolean(b)) => Ok(b),
        _ => Err(ShaclError::invalid(
            shape,
            parameter,
            format!("expected a boolean, found {}", value),
        )),
    }
}
