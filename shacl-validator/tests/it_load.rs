//! Shapes graph loading errors

mod support;

use shacl_graph_ir::{Graph, GraphError, Term};
use shacl_validator::{validate, ShaclError, ShapeSet, ValidationConfig};
use shacl_vocab::{rdf, shacl};
use support::{ex, GraphBuilder};

fn load_err(shapes: &Graph) -> ShaclError {
    match ShapeSet::load(shapes) {
        Ok(set) => panic!("expected a load error, loaded {} shape(s)", set.len()),
        Err(e) => e,
    }
}

#[test]
fn unknown_shape_reference() {
    let shapes = GraphBuilder::new()
        .add(&ex("PersonShape"), shacl::TARGET_CLASS, ex("Person"))
        .add(&ex("PersonShape"), shacl::NODE, ex("MissingShape"))
        .build();

    match load_err(&shapes) {
        ShaclError::UnknownShapeReference {
            referrer,
            referenced,
        } => {
            assert_eq!(referrer, ex("PersonShape"));
            assert_eq!(referenced, ex("MissingShape"));
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn invalid_regex() {
    let shapes = GraphBuilder::new()
        .add(&ex("CodeShape"), shacl::TARGET_NODE, ex("x"))
        .add(&ex("CodeShape"), shacl::PATTERN, Term::string("(unclosed"))
        .build();

    match load_err(&shapes) {
        ShaclError::InvalidPattern { shape, pattern, .. } => {
            assert_eq!(shape, ex("CodeShape"));
            assert_eq!(pattern, "(unclosed");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn non_integer_count() {
    let shapes = GraphBuilder::new()
        .add(&ex("Shape"), shacl::TARGET_NODE, ex("x"))
        .add(&ex("Shape"), shacl::MIN_COUNT, Term::string("one"))
        .build();

    match load_err(&shapes) {
        ShaclError::InvalidParameter { parameter, .. } => assert_eq!(parameter, "sh:minCount"),
        other => panic!("unexpected error: {}", other),
    }
}

#[test]
fn negative_count() {
    let shapes = GraphBuilder::new()
        .add(&ex("Shape"), shacl::TARGET_NODE, ex("x"))
        .add(&ex("Shape"), shacl::MAX_LENGTH, Term::integer(-1))
        .build();

    assert!(matches!(
        load_err(&shapes),
        ShaclError::InvalidParameter {
            parameter: "sh:maxLength",
            ..
        }
    ));
}

#[test]
fn literal_path() {
    let shapes = GraphBuilder::new()
        .add(&ex("Shape"), shacl::TARGET_NODE, ex("x"))
        .add(&ex("Shape"), shacl::PATH, Term::string("ex:name"))
        .build();

    assert!(matches!(load_err(&shapes), ShaclError::InvalidPath { .. }));
}

#[test]
fn property_shape_without_path() {
    let prop = Term::blank("prop");
    let shapes = GraphBuilder::new()
        .add(&ex("Shape"), shacl::TARGET_NODE, ex("x"))
        .add(&ex("Shape"), shacl::PROPERTY, prop.clone())
        .add(&prop, shacl::MIN_COUNT, Term::integer(1))
        .build();

    assert!(matches!(
        load_err(&shapes),
        ShaclError::InvalidParameter {
            parameter: "sh:property",
            ..
        }
    ));
}

#[test]
fn cyclic_list() {
    let cell = Term::blank("cell");
    let shapes = GraphBuilder::new()
        .add(&ex("Shape"), shacl::TARGET_NODE, ex("x"))
        .add(&ex("Shape"), shacl::IN, cell.clone())
        .add(&cell, rdf::FIRST, Term::integer(1))
        .add(&cell, rdf::REST, cell.clone())
        .build();

    assert!(matches!(
        load_err(&shapes),
        ShaclError::Graph(GraphError::MalformedList { .. })
    ));
}

#[test]
fn unknown_shacl_predicates_are_ignored() {
    let shapes = GraphBuilder::new()
        .typed(&ex("Shape"), shacl::NODE_SHAPE)
        .add(&ex("Shape"), shacl::TARGET_NODE, ex("x"))
        .add(&ex("Shape"), &format!("{}sparql", shacl::NS), Term::string("ASK {}"))
        .add(&ex("Shape"), shacl::DESCRIPTION, Term::string("anything"))
        .build();

    let set = ShapeSet::load(&shapes).unwrap();
    assert_eq!(set.len(), 1);
    let shape = set.iter().next().unwrap();
    assert!(shape.constraints.is_empty());
}

#[test]
fn validate_fails_before_evaluation() {
    let shapes = GraphBuilder::new()
        .add(&ex("Shape"), shacl::TARGET_NODE, ex("x"))
        .add(&ex("Shape"), shacl::NOT, ex("Nowhere"))
        .build();

    let err = validate(&Graph::new(), &shapes, &ValidationConfig::default()).unwrap_err();
    assert!(matches!(err, ShaclError::UnknownShapeReference { .. }));
    assert!(err.to_string().contains("unknown shape <http://example.org/Nowhere>"));
}

#[test]
fn repeated_flags_rejected() {
    let shapes = GraphBuilder::new()
        .add(&ex("CodeShape"), shacl::TARGET_NODE, ex("x"))
        .add(&ex("CodeShape"), shacl::PATTERN, Term::string("^a"))
        .add(&ex("CodeShape"), shacl::FLAGS, Term::string("i"))
        .add(&ex("CodeShape"), shacl::FLAGS, Term::string("x"))
        .build();

    match load_err(&shapes) {
        ShaclError::InvalidParameter { shape, parameter, .. } => {
            assert_eq!(shape, ex("CodeShape"));
            assert_eq!(parameter, "sh:flags");
        }
        other => panic!("unexpected error: {}", other),
    }
}
