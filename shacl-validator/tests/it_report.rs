//! Report renderings: text, JSON and the SHACL results graph

mod support;

use pretty_assertions::assert_eq;
use shacl_graph_ir::{Graph, Term};
use shacl_validator::{validate, ShaclError, ValidationConfig};
use shacl_vocab::{components, rdf, shacl};
use support::{ex, ex_iri, run_default, GraphBuilder, EX};

fn person_shapes() -> Graph {
    let shape = ex("PersonShape");
    let name = Term::blank("name");
    GraphBuilder::new()
        .prefix("ex", EX)
        .typed(&shape, shacl::NODE_SHAPE)
        .add(&shape, shacl::TARGET_CLASS, ex("Person"))
        .add(&shape, shacl::PROPERTY, name.clone())
        .add(&name, shacl::PATH, ex("name"))
        .add(&name, shacl::MIN_COUNT, Term::integer(1))
        .add(&name, shacl::MAX_LENGTH, Term::integer(5))
        .build()
}

fn people() -> Graph {
    GraphBuilder::new()
        .typed(&ex("alice"), &ex_iri("Person"))
        .add(&ex("alice"), &ex_iri("name"), Term::string("Alexandra"))
        .typed(&ex("bob"), &ex_iri("Person"))
        .typed(&ex("carol"), &ex_iri("Person"))
        .add(&ex("carol"), &ex_iri("name"), Term::string("Carol"))
        .build()
}

#[test]
fn text_report_is_sorted_and_summarized() {
    let report = run_default(&people(), &person_shapes());

    assert_eq!(
        report.to_text(),
        "Violation: focus ex:alice, shape _:name, component sh:MaxLengthConstraintComponent, path ex:name, value \"Alexandra\": String length 9 exceeds maximum 5\n\
         Violation: focus ex:bob, shape _:name, component sh:MinCountConstraintComponent, path ex:name: Expected at least 1 value(s) but found 0\n\
         Conforms: false (2 violation(s), 0 warning(s), 0 info(s))\n"
    );
    assert_eq!(report.to_string(), report.to_text());
}

#[test]
fn repeated_runs_render_identically() {
    let shapes = person_shapes();
    let data = people();

    let first = validate(&data, &shapes, &ValidationConfig::default()).unwrap();
    let second = validate(&data, &shapes, &ValidationConfig::default()).unwrap();

    assert_eq!(first.to_text(), second.to_text());
    assert_eq!(first.results, second.results);
}

#[test]
fn conforming_text_report() {
    let data = GraphBuilder::new()
        .typed(&ex("carol"), &ex_iri("Person"))
        .add(&ex("carol"), &ex_iri("name"), Term::string("Carol"))
        .build();

    let report = run_default(&data, &person_shapes());

    assert!(report.conforms);
    assert_eq!(
        report.to_text(),
        "Conforms: true (0 violation(s), 0 warning(s), 0 info(s))\n"
    );
}

#[test]
fn json_report_fields() {
    let report = run_default(&people(), &person_shapes());
    let json = report.to_json().unwrap();

    assert_eq!(json["conforms"], false);
    assert_eq!(json["outcome"], "Complete");

    let results = json["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);

    let bob = results
        .iter()
        .find(|r| r["focusNode"]["value"] == "http://example.org/bob")
        .unwrap();
    assert_eq!(bob["focusNode"]["type"], "iri");
    assert_eq!(bob["sourceShape"]["type"], "bnode");
    assert_eq!(bob["sourceConstraint"], "MinCount");
    assert_eq!(bob["severity"], "Violation");
    assert_eq!(bob["resultPath"]["predicate"], "http://example.org/name");
    assert!(bob.get("value").is_none());
    assert_eq!(bob["message"], "Expected at least 1 value(s) but found 0");
}

#[test]
fn results_graph_uses_shacl_vocabulary() {
    let report = run_default(&people(), &person_shapes());
    let graph = report.to_graph().unwrap();

    let reports = graph.subjects(rdf::TYPE, &Term::iri(shacl::VALIDATION_REPORT)).count();
    assert_eq!(reports, 1);

    let report_node = Term::blank("report");
    assert!(graph.contains_spo(&report_node, shacl::CONFORMS, &Term::boolean(false)));

    let result_nodes: Vec<Term> = graph.objects(&report_node, shacl::RESULT).cloned().collect();
    assert_eq!(result_nodes.len(), 2);

    let bob = result_nodes
        .iter()
        .find(|n| graph.contains_spo(n, shacl::FOCUS_NODE, &ex("bob")))
        .unwrap();
    assert!(graph.contains_spo(bob, rdf::TYPE, &Term::iri(shacl::VALIDATION_RESULT)));
    assert!(graph.contains_spo(bob, shacl::RESULT_PATH, &ex("name")));
    assert!(graph.contains_spo(bob, shacl::SOURCE_SHAPE, &Term::blank("name")));
    assert!(graph.contains_spo(
        bob,
        shacl::SOURCE_CONSTRAINT_COMPONENT,
        &Term::iri(components::MIN_COUNT)
    ));
    assert!(graph.contains_spo(bob, shacl::RESULT_SEVERITY, &Term::iri(shacl::VIOLATION)));
    assert_eq!(graph.object(bob, shacl::VALUE), None);

    let alice = result_nodes
        .iter()
        .find(|n| graph.contains_spo(n, shacl::FOCUS_NODE, &ex("alice")))
        .unwrap();
    assert_eq!(graph.object(alice, shacl::VALUE), Some(&Term::string("Alexandra")));

    assert_eq!(graph.prefixes.get("ex").map(String::as_str), Some(EX));
    assert_eq!(graph.prefixes.get("sh").map(String::as_str), Some(shacl::NS));
}

#[test]
fn into_result_reports_failure() {
    let report = run_default(&people(), &person_shapes());

    match report.into_result() {
        Err(ShaclError::ValidationFailed {
            violation_count,
            warning_count,
            details,
        }) => {
            assert_eq!(violation_count, 2);
            assert_eq!(warning_count, 0);
            assert_eq!(details.len(), 2);
            assert!(details
                .iter()
                .any(|d| d == "Node <http://example.org/bob>: property <http://example.org/name>: Expected at least 1 value(s) but found 0"));
        }
        other => panic!("expected ValidationFailed, got {:?}", other.map(|r| r.conforms)),
    }
}

#[test]
fn message_override_and_severity() {
    let shape = ex("PersonShape");
    let name = Term::blank("name");
    let shapes = GraphBuilder::new()
        .prefix("ex", EX)
        .add(&shape, shacl::TARGET_CLASS, ex("Person"))
        .add(&shape, shacl::PROPERTY, name.clone())
        .add(&name, shacl::PATH, ex("name"))
        .add(&name, shacl::MIN_COUNT, Term::integer(1))
        .add(&name, shacl::SEVERITY, Term::iri(shacl::WARNING))
        .add(&name, shacl::MESSAGE, Term::string("A person should have a name"))
        .build();
    let data = GraphBuilder::new()
        .typed(&ex("bob"), &ex_iri("Person"))
        .build();

    let report = run_default(&data, &shapes);

    assert!(report.conforms);
    assert_eq!(report.warning_count(), 1);
    assert_eq!(
        report.to_text(),
        "Warning: focus ex:bob, shape _:name, component sh:MinCountConstraintComponent, path ex:name: A person should have a name\n\
         Conforms: true (0 violation(s), 1 warning(s), 0 info(s))\n"
    );
    assert!(report.into_result().is_ok());
}
