//! Class hierarchy for sh:class and sh:targetClass
//!
//! Precomputes the transitive `rdfs:subClassOf` closure of the data graph.
//!
//! # Closure Direction
//!
//! The closure computes **descendants** (not ancestors):
//! `subclasses_of(Animal)` returns `[Dog, Poodle, ...]`. Target resolution
//! expands `sh:targetClass Animal` to the instances of each descendant, and an
//! instance check succeeds when one of the node's types is the class or one
//! of its descendants.

use rustc_hash::{FxHashMap, FxHashSet};
use shacl_graph_ir::{Graph, Term};
use shacl_vocab::{rdf, rdfs};
use std::collections::VecDeque;
use std::sync::Arc;

/// Static empty slice for missing entries
static EMPTY: &[Arc<str>] = &[];

/// Transitive subclass closure
///
/// The default value has no subclass relationships, so only direct
/// `rdf:type` assertions count. That is the behavior with subclass inference
/// turned off.
#[derive(Clone, Debug, Default)]
pub struct ClassHierarchy {
    /// Transitive closure: class C -> all descendants of C (NOT including C itself)
    subclasses: FxHashMap<Arc<str>, Arc<[Arc<str>]>>,
}

impl ClassHierarchy {
    /// Build the closure from the `rdfs:subClassOf` triples of `data`
    ///
    /// Only IRI classes take part. Cycles are handled (no infinite loops).
    pub fn from_graph(data: &Graph) -> Self {
        // parent -> immediate children, children in triple order
        let mut direct: FxHashMap<Arc<str>, Vec<Arc<str>>> = FxHashMap::default();
        let mut parents: Vec<Arc<str>> = Vec::new();

        for triple in data.iter() {
            if triple.predicate_iri() != rdfs::SUB_CLASS_OF {
                continue;
            }
            let (Some(child), Some(parent)) = (triple.subject().as_iri(), triple.object().as_iri())
            else {
                continue;
            };
            let parent: Arc<str> = Arc::from(parent);
            if !direct.contains_key(&parent) {
                parents.push(parent.clone());
            }
            direct.entry(parent).or_default().push(Arc::from(child));
        }

        let mut subclasses = FxHashMap::default();
        for start in &parents {
            let descendants = compute_descendants(start, &direct);
            if !descendants.is_empty() {
                subclasses.insert(start.clone(), descendants.into());
            }
        }

        Self { subclasses }
    }

    /// Returns all descendants of class `c` (subclasses, transitively).
    ///
    /// Does NOT include `c` itself. Returns empty slice if `c` has no subclasses.
    pub fn subclasses_of(&self, c: &str) -> &[Arc<str>] {
        self.subclasses
            .get(c)
            .map(|arc| arc.as_ref())
            .unwrap_or(EMPTY)
    }

    /// Whether `node` has `rdf:type` `class` or one of its subclasses
    pub fn is_instance_of(&self, data: &Graph, node: &Term, class: &str) -> bool {
        if node.is_literal() {
            return false;
        }
        if data.has_type(node, class) {
            return true;
        }
        let subclasses = self.subclasses_of(class);
        data.objects(node, rdf::TYPE)
            .filter_map(Term::as_iri)
            .any(|ty| subclasses.iter().any(|c| &**c == ty))
    }

    /// Check if the hierarchy is empty (no subclass relationships).
    pub fn is_empty(&self) -> bool {
        self.subclasses.is_empty()
    }
}

/// Compute all descendants of a class using BFS.
///
/// The start class is excluded from the result even if a cycle reaches it.
fn compute_descendants(start: &Arc<str>, direct: &FxHashMap<Arc<str>, Vec<Arc<str>>>) -> Vec<Arc<str>> {
    let mut visited: FxHashSet<Arc<str>> = FxHashSet::default();
    let mut queue: VecDeque<Arc<str>> = VecDeque::new();
    let mut result: Vec<Arc<str>> = Vec::new();

    visited.insert(start.clone());
    queue.push_back(start.clone());

    while let Some(current) = queue.pop_front() {
        if let Some(children) = direct.get(&current) {
            for child in children {
                if visited.insert(child.clone()) {
                    queue.push_back(child.clone());
                    result.push(child.clone());
                }
            }
        }
    }

    result
}
