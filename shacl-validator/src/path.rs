//! SHACL property paths
//!
//! A property shape reaches its value nodes through a path expression. The
//! supported forms are the SHACL Core ones: a predicate IRI, `sh:inversePath`,
//! sequence paths (an RDF list), `sh:alternativePath`, and the three
//! repetition operators.

use crate::error::{Result, ShaclError};
use rustc_hash::FxHashSet;
use serde::Serialize;
use shacl_graph_ir::{Graph, Term};
use shacl_vocab::{rdf, shacl};
use std::sync::Arc;

/// A property path expression
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum PropertyPath {
    /// A single predicate IRI
    Predicate(Arc<str>),
    /// `sh:inversePath`
    Inverse(Box<PropertyPath>),
    /// RDF list of paths, followed in order
    Sequence(Vec<PropertyPath>),
    /// `sh:alternativePath` - union of the member paths
    Alternative(Vec<PropertyPath>),
    /// `sh:zeroOrMorePath`
    ZeroOrMore(Box<PropertyPath>),
    /// `sh:oneOrMorePath`
    OneOrMore(Box<PropertyPath>),
    /// `sh:zeroOrOnePath`
    ZeroOrOne(Box<PropertyPath>),
}

/// Insertion-ordered set of terms
#[derive(Default)]
struct NodeSet {
    order: Vec<Term>,
    seen: FxHashSet<Term>,
}

impl NodeSet {
    fn insert(&mut self, term: Term) -> bool {
        if self.seen.insert(term.clone()) {
            self.order.push(term);
            true
        } else {
            false
        }
    }

    fn into_vec(self) -> Vec<Term> {
        self.order
    }
}

impl PropertyPath {
    /// Create a simple predicate path
    pub fn predicate(iri: impl AsRef<str>) -> Self {
        PropertyPath::Predicate(Arc::from(iri.as_ref()))
    }

    /// The predicate IRI if this is a simple predicate path
    pub fn as_predicate(&self) -> Option<&str> {
        match self {
            PropertyPath::Predicate(p) => Some(p),
            _ => None,
        }
    }

    /// Parse the path expression rooted at `node` in the shapes graph
    ///
    /// `shape` is only used for error reporting.
    pub fn parse(shapes: &Graph, node: &Term, shape: &Term) -> Result<Self> {
        let mut stack = Vec::new();
        parse_path(shapes, node, shape, &mut stack)
    }

    /// Value nodes reached from `focus`, deduplicated, in discovery order
    pub fn evaluate(&self, data: &Graph, focus: &Term) -> Vec<Term> {
        self.step(data, std::slice::from_ref(focus), false)
    }

    fn step(&self, data: &Graph, from: &[Term], inverted: bool) -> Vec<Term> {
        let mut out = NodeSet::default();
        match self {
            PropertyPath::Predicate(p) => {
                for node in from {
                    if inverted {
                        data.subjects(p, node).for_each(|s| {
                            out.insert(s.clone());
                        });
                    } else {
                        data.objects(node, p).for_each(|o| {
                            out.insert(o.clone());
                        });
                    }
                }
            }
            PropertyPath::Inverse(inner) => return inner.step(data, from, !inverted),
            PropertyPath::Sequence(items) => {
                let mut current = from.to_vec();
                if inverted {
                    for item in items.iter().rev() {
                        current = item.step(data, &current, true);
                    }
                } else {
                    for item in items {
                        current = item.step(data, &current, false);
                    }
                }
                return current;
            }
            PropertyPath::Alternative(items) => {
                for item in items {
                    for node in item.step(data, from, inverted) {
                        out.insert(node);
                    }
                }
            }
            PropertyPath::ZeroOrMore(inner) => {
                for node in from {
                    out.insert(node.clone());
                }
                closure(inner, data, from, inverted, &mut out);
            }
            PropertyPath::OneOrMore(inner) => {
                closure(inner, data, from, inverted, &mut out);
            }
            PropertyPath::ZeroOrOne(inner) => {
                for node in from {
                    out.insert(node.clone());
                }
                for node in inner.step(data, from, inverted) {
                    out.insert(node);
                }
            }
        }
        out.into_vec()
    }

    /// Render with a caller-supplied IRI formatter
    pub fn render(&self, iri: &dyn Fn(&str) -> String) -> String {
        let join = |items: &[PropertyPath], sep: &str| {
            items
                .iter()
                .map(|p| p.render(iri))
                .collect::<Vec<_>>()
                .join(sep)
        };
        match self {
            PropertyPath::Predicate(p) => iri(p),
            PropertyPath::Inverse(inner) => format!("^{}", inner.render(iri)),
            PropertyPath::Sequence(items) => format!("({})", join(items, " / ")),
            PropertyPath::Alternative(items) => format!("({})", join(items, " | ")),
            PropertyPath::ZeroOrMore(inner) => format!("{}*", inner.render(iri)),
            PropertyPath::OneOrMore(inner) => format!("{}+", inner.render(iri)),
            PropertyPath::ZeroOrOne(inner) => format!("{}?", inner.render(iri)),
        }
    }

    /// Write this path into `graph` using the SHACL path vocabulary
    ///
    /// Returns the node that denotes the path. `fresh` supplies new blank nodes.
    pub fn to_rdf(&self, graph: &mut Graph, fresh: &mut dyn FnMut() -> Term) -> Result<Term> {
        match self {
            PropertyPath::Predicate(p) => Ok(Term::iri(p.as_ref())),
            PropertyPath::Inverse(inner) => wrap(graph, fresh, shacl::INVERSE_PATH, inner),
            PropertyPath::ZeroOrMore(inner) => wrap(graph, fresh, shacl::ZERO_OR_MORE_PATH, inner),
            PropertyPath::OneOrMore(inner) => wrap(graph, fresh, shacl::ONE_OR_MORE_PATH, inner),
            PropertyPath::ZeroOrOne(inner) => wrap(graph, fresh, shacl::ZERO_OR_ONE_PATH, inner),
            PropertyPath::Sequence(items) => write_list(graph, fresh, items),
            PropertyPath::Alternative(items) => {
                let list = write_list(graph, fresh, items)?;
                let node = fresh();
                graph.add_triple(node.clone(), Term::iri(shacl::ALTERNATIVE_PATH), list)?;
                Ok(node)
            }
        }
    }
}

impl std::fmt::Display for PropertyPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render(&|iri| format!("<{}>", iri)))
    }
}

/// Transitive closure of `inner` from `from`, excluding the start nodes
/// unless they are reachable again
fn closure(inner: &PropertyPath, data: &Graph, from: &[Term], inverted: bool, out: &mut NodeSet) {
    let mut reached = FxHashSet::default();
    let mut frontier = inner.step(data, from, inverted);
    while !frontier.is_empty() {
        let mut next = Vec::new();
        for node in frontier {
            if reached.insert(node.clone()) {
                out.insert(node.clone());
                next.push(node);
            }
        }
        frontier = inner.step(data, &next, inverted);
    }
}

fn wrap(
    graph: &mut Graph,
    fresh: &mut dyn FnMut() -> Term,
    predicate: &str,
    inner: &PropertyPath,
) -> Result<Term> {
    let inner_node = inner.to_rdf(graph, fresh)?;
    let node = fresh();
    graph.add_triple(node.clone(), Term::iri(predicate), inner_node)?;
    Ok(node)
}

fn write_list(
    graph: &mut Graph,
    fresh: &mut dyn FnMut() -> Term,
    items: &[PropertyPath],
) -> Result<Term> {
    let mut tail = Term::iri(rdf::NIL);
    for item in items.iter().rev() {
        let value = item.to_rdf(graph, fresh)?;
        let cell = fresh();
        graph.add_triple(cell.clone(), Term::iri(rdf::FIRST), value)?;
        graph.add_triple(cell.clone(), Term::iri(rdf::REST), tail)?;
        tail = cell;
    }
    Ok(tail)
}

fn parse_path(shapes: &Graph, node: &Term, shape: &Term, stack: &mut Vec<Term>) -> Result<PropertyPath> {
    let invalid = |message: String| ShaclError::InvalidPath {
        shape: shape.clone(),
        message,
    };

    match node {
        Term::Iri(iri) => return Ok(PropertyPath::Predicate(iri.clone())),
        Term::Literal(_) => return Err(invalid(format!("literal {} is not a path", node))),
        Term::BlankNode(_) => {}
    }

    if stack.contains(node) {
        return Err(invalid(format!("path expression {} refers to itself", node)));
    }
    stack.push(node.clone());

    let parsed = if shapes.object(node, rdf::FIRST).is_some() {
        let members = parse_members(shapes, node, shape, stack)?;
        if members.len() < 2 {
            return Err(invalid("sequence path needs at least two members".to_string()));
        }
        PropertyPath::Sequence(members)
    } else {
        let operators = [
            shacl::INVERSE_PATH,
            shacl::ALTERNATIVE_PATH,
            shacl::ZERO_OR_MORE_PATH,
            shacl::ONE_OR_MORE_PATH,
            shacl::ZERO_OR_ONE_PATH,
        ];
        let mut found = operators
            .iter()
            .filter_map(|op| shapes.object(node, op).map(|target| (*op, target)));
        let (op, target) = found
            .next()
            .ok_or_else(|| invalid(format!("{} is not a path expression", node)))?;
        if found.next().is_some() {
            return Err(invalid(format!("{} has more than one path operator", node)));
        }

        match op {
            shacl::ALTERNATIVE_PATH => {
                let members = parse_members(shapes, target, shape, stack)?;
                if members.len() < 2 {
                    return Err(invalid(
                        "alternative path needs at least two members".to_string(),
                    ));
                }
                PropertyPath::Alternative(members)
            }
            _ => {
                let inner = Box::new(parse_path(shapes, target, shape, stack)?);
                match op {
                    shacl::INVERSE_PATH => PropertyPath::Inverse(inner),
                    shacl::ZERO_OR_MORE_PATH => PropertyPath::ZeroOrMore(inner),
                    shacl::ONE_OR_MORE_PATH => PropertyPath::OneOrMore(inner),
                    _ => PropertyPath::ZeroOrOne(inner),
                }
            }
        }
    };

    stack.pop();
    Ok(parsed)
}

fn parse_members(
    shapes: &Graph,
    list: &Term,
    shape: &Term,
    stack: &mut Vec<Term>,
) -> Result<Vec<PropertyPath>> {
    shapes
        .list(list)?
        .iter()
        .map(|member| parse_path(shapes, member, shape, stack))
        .collect()
}
