//! Target resolution
//!
//! Turns a shape's target declarations into the ordered, deduplicated list
//! of focus nodes it applies to.

use crate::compile::{Shape, Target};
use crate::hierarchy::ClassHierarchy;
use rustc_hash::FxHashSet;
use shacl_graph_ir::{Graph, Term};
use shacl_vocab::rdf;
use tracing::trace;

/// Focus nodes of `shape` in `data`, in first-seen order
///
/// Class targets include instances of every subclass known to `hierarchy`.
/// A `sh:targetNode` is a focus node whether or not it occurs in the data.
pub fn resolve(shape: &Shape, data: &Graph, hierarchy: &ClassHierarchy) -> Vec<Term> {
    let mut seen: FxHashSet<Term> = FxHashSet::default();
    let mut focus_nodes = Vec::new();
    let mut push = |term: &Term| {
        if seen.insert(term.clone()) {
            focus_nodes.push(term.clone());
        }
    };

    for target in &shape.targets {
        match target {
            Target::Class(class) | Target::ImplicitClass(class) => {
                let class_term = Term::iri(class);
                data.subjects(rdf::TYPE, &class_term).for_each(&mut push);
                for sub in hierarchy.subclasses_of(class) {
                    let sub_term = Term::iri(sub);
                    data.subjects(rdf::TYPE, &sub_term).for_each(&mut push);
                }
            }
            Target::Node(node) => push(node),
            Target::SubjectsOf(p) => data.subjects_with_predicate(p).into_iter().for_each(&mut push),
            Target::ObjectsOf(p) => data.objects_with_predicate(p).into_iter().for_each(&mut push),
        }
    }

    trace!(shape = %shape.node, count = focus_nodes.len(), "resolved focus nodes");
    focus_nodes
}
