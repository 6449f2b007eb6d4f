//! End-to-end constraint component tests
//!
//! Each test builds a small shapes graph and data graph, validates, and checks
//! the results the engine reports.

mod support;

use pretty_assertions::assert_eq;
use shacl_graph_ir::{Datatype, Term};
use shacl_validator::{ConstraintKind, PropertyPath, ValidationConfig};
use shacl_vocab::{rdfs, shacl, xsd};
use support::{ex, ex_iri, run, run_default, GraphBuilder, EX};

/// (focus, component) pairs, sorted
fn kinds(report: &shacl_validator::ValidationReport) -> Vec<(Term, ConstraintKind)> {
    let mut pairs: Vec<_> = report
        .results
        .iter()
        .map(|r| (r.focus_node.clone(), r.source_constraint))
        .collect();
    pairs.sort();
    pairs
}

#[test]
fn cardinality_zero_one_and_two_values() {
    let shape = ex("PersonShape");
    let name = Term::blank("name");
    let shapes = GraphBuilder::new()
        .prefix("ex", EX)
        .typed(&shape, shacl::NODE_SHAPE)
        .add(&shape, shacl::TARGET_CLASS, ex("Person"))
        .add(&shape, shacl::PROPERTY, name.clone())
        .add(&name, shacl::PATH, ex("name"))
        .add(&name, shacl::MIN_COUNT, Term::integer(1))
        .add(&name, shacl::MAX_COUNT, Term::integer(1))
        .build();

    let data = GraphBuilder::new()
        .typed(&ex("alice"), &ex_iri("Person"))
        .typed(&ex("bob"), &ex_iri("Person"))
        .add(&ex("bob"), &ex_iri("name"), Term::string("Bob"))
        .typed(&ex("carol"), &ex_iri("Person"))
        .add(&ex("carol"), &ex_iri("name"), Term::string("Carol"))
        .add(&ex("carol"), &ex_iri("name"), Term::string("Caroline"))
        .build();

    let report = run_default(&data, &shapes);

    assert!(!report.conforms);
    assert_eq!(
        report.to_text(),
        "Violation: focus ex:alice, shape _:name, component sh:MinCountConstraintComponent, path ex:name: Expected at least 1 value(s) but found 0\n\
         Violation: focus ex:carol, shape _:name, component sh:MaxCountConstraintComponent, path ex:name: Expected at most 1 value(s) but found 2\n\
         Conforms: false (2 violation(s), 0 warning(s), 0 info(s))\n"
    );

    for result in &report.results {
        assert_eq!(result.source_shape, name);
        assert_eq!(result.result_path, Some(PropertyPath::predicate(ex_iri("name"))));
        assert_eq!(result.value, None);
    }
}

#[test]
fn datatype_compares_the_literal_datatype() {
    let shape = ex("AgeShape");
    let age = Term::blank("age");
    let shapes = GraphBuilder::new()
        .add(&shape, shacl::TARGET_SUBJECTS_OF, ex("age"))
        .add(&shape, shacl::PROPERTY, age.clone())
        .add(&age, shacl::PATH, ex("age"))
        .add(&age, shacl::DATATYPE, Term::iri(xsd::INTEGER))
        .build();

    let as_string = Term::typed("5", Datatype::xsd_string());
    let ill_formed = Term::typed("five", Datatype::xsd_integer());
    let data = GraphBuilder::new()
        .add(&ex("alice"), &ex_iri("age"), Term::typed("5", Datatype::xsd_integer()))
        .add(&ex("bob"), &ex_iri("age"), as_string.clone())
        .add(&ex("carol"), &ex_iri("age"), ill_formed.clone())
        .build();

    let report = run_default(&data, &shapes);

    assert!(!report.conforms);
    assert_eq!(
        kinds(&report),
        vec![
            (ex("bob"), ConstraintKind::Datatype),
            (ex("carol"), ConstraintKind::Datatype),
        ]
    );
    let mut values: Vec<Term> = report.results.iter().filter_map(|r| r.value.clone()).collect();
    values.sort();
    let mut expected = vec![as_string, ill_formed];
    expected.sort();
    assert_eq!(values, expected);
}

#[test]
fn closed_shape_reports_each_extra_predicate() {
    let shape = ex("PersonShape");
    let name = Term::blank("name");
    let mut shapes = GraphBuilder::new()
        .add(&shape, shacl::TARGET_NODE, ex("alice"))
        .add(&shape, shacl::CLOSED, Term::boolean(true))
        .add(&shape, shacl::PROPERTY, name.clone())
        .add(&name, shacl::PATH, ex("name"));
    let ignored = shapes.list(vec![ex("nickname")]);
    let shapes = shapes.add(&shape, shacl::IGNORED_PROPERTIES, ignored).build();

    let data = GraphBuilder::new()
        .typed(&ex("alice"), &ex_iri("Person"))
        .add(&ex("alice"), &ex_iri("name"), Term::string("Alice"))
        .add(&ex("alice"), &ex_iri("nickname"), Term::string("Al"))
        .add(&ex("alice"), &ex_iri("age"), Term::integer(30))
        .build();

    let report = run_default(&data, &shapes);

    assert_eq!(report.results.len(), 1);
    let result = &report.results[0];
    assert_eq!(result.source_constraint, ConstraintKind::Closed);
    assert_eq!(result.focus_node, ex("alice"));
    assert_eq!(result.source_shape, shape);
    assert_eq!(result.result_path, Some(PropertyPath::predicate(ex_iri("age"))));
    assert_eq!(result.value, Some(Term::integer(30)));
}

#[test]
fn inverse_path_counts_incoming_edges() {
    let shape = ex("ParentShape");
    let children = Term::blank("children");
    let inverse = Term::blank("inverse");
    let shapes = GraphBuilder::new()
        .prefix("ex", EX)
        .add(&shape, shacl::TARGET_NODE, ex("alice"))
        .add(&shape, shacl::TARGET_NODE, ex("dan"))
        .add(&shape, shacl::PROPERTY, children.clone())
        .add(&children, shacl::PATH, inverse.clone())
        .add(&inverse, shacl::INVERSE_PATH, ex("parent"))
        .add(&children, shacl::MIN_COUNT, Term::integer(2))
        .build();

    let data = GraphBuilder::new()
        .add(&ex("bob"), &ex_iri("parent"), ex("alice"))
        .add(&ex("carol"), &ex_iri("parent"), ex("alice"))
        .add(&ex("erin"), &ex_iri("parent"), ex("dan"))
        .build();

    let report = run_default(&data, &shapes);

    assert_eq!(kinds(&report), vec![(ex("dan"), ConstraintKind::MinCount)]);
    assert_eq!(
        report.results[0].result_path,
        Some(PropertyPath::Inverse(Box::new(PropertyPath::predicate(ex_iri("parent")))))
    );
    assert!(report.to_text().contains(", path ^ex:parent: "));
}

#[test]
fn sequence_path_follows_each_step() {
    let shape = ex("PersonShape");
    let city = Term::blank("city");
    let shapes = GraphBuilder::new()
        .add(&shape, shacl::TARGET_CLASS, ex("Person"))
        .add(&shape, shacl::PROPERTY, city.clone())
        .add_list(&city, shacl::PATH, vec![ex("address"), ex("city")])
        .add(&city, shacl::MIN_COUNT, Term::integer(1))
        .add(&city, shacl::DATATYPE, Term::iri(xsd::STRING))
        .build();

    let data = GraphBuilder::new()
        .typed(&ex("alice"), &ex_iri("Person"))
        .add(&ex("alice"), &ex_iri("address"), Term::blank("a1"))
        .add(&Term::blank("a1"), &ex_iri("city"), Term::string("Paris"))
        .typed(&ex("bob"), &ex_iri("Person"))
        .add(&ex("bob"), &ex_iri("address"), Term::blank("b1"))
        .build();

    let report = run_default(&data, &shapes);

    assert_eq!(kinds(&report), vec![(ex("bob"), ConstraintKind::MinCount)]);
    assert_eq!(
        report.results[0].result_path,
        Some(PropertyPath::Sequence(vec![
            PropertyPath::predicate(ex_iri("address")),
            PropertyPath::predicate(ex_iri("city")),
        ]))
    );
}

#[test]
fn target_class_includes_subclass_instances() {
    let shape = ex("PersonShape");
    let name = Term::blank("name");
    let shapes = GraphBuilder::new()
        .add(&shape, shacl::TARGET_CLASS, ex("Person"))
        .add(&shape, shacl::PROPERTY, name.clone())
        .add(&name, shacl::PATH, ex("name"))
        .add(&name, shacl::MIN_COUNT, Term::integer(1))
        .build();

    let data = GraphBuilder::new()
        .add(&ex("Student"), rdfs::SUB_CLASS_OF, ex("Person"))
        .add(&ex("PhdStudent"), rdfs::SUB_CLASS_OF, ex("Student"))
        .typed(&ex("dave"), &ex_iri("PhdStudent"))
        .build();

    let report = run_default(&data, &shapes);
    assert_eq!(kinds(&report), vec![(ex("dave"), ConstraintKind::MinCount)]);

    let without_inference = run(
        &data,
        &shapes,
        ValidationConfig::default().with_subclass_inference(false),
    );
    assert!(without_inference.conforms);
    assert!(without_inference.results.is_empty());
}

#[test]
fn class_constraint_accepts_subclass_instances() {
    let shape = ex("EmployeeShape");
    let employer = Term::blank("employer");
    let shapes = GraphBuilder::new()
        .add(&shape, shacl::TARGET_SUBJECTS_OF, ex("employer"))
        .add(&shape, shacl::PROPERTY, employer.clone())
        .add(&employer, shacl::PATH, ex("employer"))
        .add(&employer, shacl::CLASS, ex("Organization"))
        .build();

    let data = GraphBuilder::new()
        .add(&ex("Company"), rdfs::SUB_CLASS_OF, ex("Organization"))
        .typed(&ex("acme"), &ex_iri("Company"))
        .add(&ex("alice"), &ex_iri("employer"), ex("acme"))
        .add(&ex("bob"), &ex_iri("employer"), ex("nowhere"))
        .add(&ex("carol"), &ex_iri("employer"), Term::string("acme"))
        .build();

    let report = run_default(&data, &shapes);

    assert_eq!(
        kinds(&report),
        vec![
            (ex("bob"), ConstraintKind::Class),
            (ex("carol"), ConstraintKind::Class),
        ]
    );
}

#[test]
fn string_and_range_constraints() {
    let shape = ex("ProductShape");
    let code = Term::blank("code");
    let price = Term::blank("price");
    let shapes = GraphBuilder::new()
        .add(&shape, shacl::TARGET_CLASS, ex("Product"))
        .add(&shape, shacl::PROPERTY, code.clone())
        .add(&code, shacl::PATH, ex("code"))
        .add(&code, shacl::PATTERN, Term::string("^[A-Z]{3}$"))
        .add(&shape, shacl::PROPERTY, price.clone())
        .add(&price, shacl::PATH, ex("price"))
        .add(&price, shacl::MIN_INCLUSIVE, Term::integer(0))
        .add(&price, shacl::MAX_EXCLUSIVE, Term::decimal("1000.0"))
        .build();

    let data = GraphBuilder::new()
        .typed(&ex("p1"), &ex_iri("Product"))
        .add(&ex("p1"), &ex_iri("code"), Term::string("ABC"))
        .add(&ex("p1"), &ex_iri("price"), Term::decimal("9.99"))
        .typed(&ex("p2"), &ex_iri("Product"))
        .add(&ex("p2"), &ex_iri("code"), Term::string("abcd"))
        .add(&ex("p2"), &ex_iri("price"), Term::integer(-1))
        .typed(&ex("p3"), &ex_iri("Product"))
        .add(&ex("p3"), &ex_iri("price"), Term::integer(1000))
        .build();

    let report = run_default(&data, &shapes);

    assert_eq!(
        kinds(&report),
        vec![
            (ex("p2"), ConstraintKind::Pattern),
            (ex("p2"), ConstraintKind::MinInclusive),
            (ex("p3"), ConstraintKind::MaxExclusive),
        ]
    );
}

#[test]
fn in_and_has_value() {
    let shape = ex("TaskShape");
    let status = Term::blank("status");
    let mut shapes = GraphBuilder::new()
        .add(&shape, shacl::TARGET_CLASS, ex("Task"))
        .add(&shape, shacl::PROPERTY, status.clone());
    let allowed = shapes.list(vec![ex("Open"), ex("Closed")]);
    let shapes = shapes
        .add(&status, shacl::PATH, ex("status"))
        .add(&status, shacl::IN, allowed)
        .add(&shape, shacl::HAS_VALUE, ex("t1"))
        .build();

    let data = GraphBuilder::new()
        .typed(&ex("t1"), &ex_iri("Task"))
        .add(&ex("t1"), &ex_iri("status"), ex("Open"))
        .typed(&ex("t2"), &ex_iri("Task"))
        .add(&ex("t2"), &ex_iri("status"), ex("Pending"))
        .build();

    let report = run_default(&data, &shapes);

    // t2 is not t1, and its status is not in the list
    assert_eq!(
        kinds(&report),
        vec![
            (ex("t2"), ConstraintKind::In),
            (ex("t2"), ConstraintKind::HasValue),
        ]
    );
}

#[test]
fn logical_or_and_not() {
    let shape = ex("ThingShape");
    let id = Term::blank("id");
    let string_shape = ex("StringShape");
    let integer_shape = ex("IntegerShape");
    let banned = ex("BannedShape");

    let mut shapes = GraphBuilder::new()
        .add(&string_shape, shacl::DATATYPE, Term::iri(xsd::STRING))
        .add(&integer_shape, shacl::DATATYPE, Term::iri(xsd::INTEGER))
        .add(&banned, shacl::HAS_VALUE, Term::integer(0))
        .add(&shape, shacl::TARGET_SUBJECTS_OF, ex("id"))
        .add(&shape, shacl::PROPERTY, id.clone())
        .add(&id, shacl::PATH, ex("id"));
    let members = shapes.list(vec![string_shape, integer_shape]);
    let shapes = shapes
        .add(&id, shacl::OR, members)
        .add(&id, shacl::NOT, banned)
        .build();

    let data = GraphBuilder::new()
        .add(&ex("a"), &ex_iri("id"), Term::string("A-1"))
        .add(&ex("b"), &ex_iri("id"), Term::integer(7))
        .add(&ex("c"), &ex_iri("id"), Term::boolean(true))
        .add(&ex("d"), &ex_iri("id"), Term::integer(0))
        .build();

    let report = run_default(&data, &shapes);

    assert_eq!(
        kinds(&report),
        vec![
            (ex("c"), ConstraintKind::Or),
            (ex("d"), ConstraintKind::Not),
        ]
    );
    // Member shapes have no targets of their own, so nothing else is reported
    assert_eq!(report.results.len(), 2);
}

#[test]
fn qualified_value_shape_counts_conforming_values() {
    let shape = ex("ChildShape");
    let parent = Term::blank("parent");
    let female = ex("FemaleShape");
    let shapes = GraphBuilder::new()
        .add(&female, shacl::CLASS, ex("Female"))
        .add(&shape, shacl::TARGET_CLASS, ex("Child"))
        .add(&shape, shacl::PROPERTY, parent.clone())
        .add(&parent, shacl::PATH, ex("parent"))
        .add(&parent, shacl::QUALIFIED_VALUE_SHAPE, female)
        .add(&parent, shacl::QUALIFIED_MIN_COUNT, Term::integer(1))
        .build();

    let data = GraphBuilder::new()
        .typed(&ex("mom"), &ex_iri("Female"))
        .typed(&ex("kid1"), &ex_iri("Child"))
        .add(&ex("kid1"), &ex_iri("parent"), ex("mom"))
        .add(&ex("kid1"), &ex_iri("parent"), ex("dad"))
        .typed(&ex("kid2"), &ex_iri("Child"))
        .add(&ex("kid2"), &ex_iri("parent"), ex("dad"))
        .build();

    let report = run_default(&data, &shapes);

    assert_eq!(kinds(&report), vec![(ex("kid2"), ConstraintKind::QualifiedMinCount)]);
    assert_eq!(report.results[0].value, None);
}

#[test]
fn pair_constraints_compare_against_focus_values() {
    let shape = ex("EventShape");
    let start = Term::blank("start");
    let shapes = GraphBuilder::new()
        .add(&shape, shacl::TARGET_CLASS, ex("Event"))
        .add(&shape, shacl::PROPERTY, start.clone())
        .add(&start, shacl::PATH, ex("start"))
        .add(&start, shacl::LESS_THAN, ex("end"))
        .build();

    let data = GraphBuilder::new()
        .typed(&ex("ok"), &ex_iri("Event"))
        .add(&ex("ok"), &ex_iri("start"), Term::integer(1))
        .add(&ex("ok"), &ex_iri("end"), Term::integer(2))
        .typed(&ex("bad"), &ex_iri("Event"))
        .add(&ex("bad"), &ex_iri("start"), Term::integer(5))
        .add(&ex("bad"), &ex_iri("end"), Term::integer(5))
        .build();

    let report = run_default(&data, &shapes);

    assert_eq!(kinds(&report), vec![(ex("bad"), ConstraintKind::LessThan)]);
    assert_eq!(report.results[0].value, Some(Term::integer(5)));
}

#[test]
fn language_constraints() {
    let shape = ex("LabelShape");
    let label = Term::blank("label");
    let mut shapes = GraphBuilder::new()
        .add(&shape, shacl::TARGET_SUBJECTS_OF, ex("label"))
        .add(&shape, shacl::PROPERTY, label.clone())
        .add(&label, shacl::PATH, ex("label"))
        .add(&label, shacl::UNIQUE_LANG, Term::boolean(true));
    let ranges = shapes.list(vec![Term::string("en"), Term::string("fr")]);
    let shapes = shapes.add(&label, shacl::LANGUAGE_IN, ranges).build();

    let data = GraphBuilder::new()
        .add(&ex("a"), &ex_iri("label"), Term::lang_string("colour", "en-GB"))
        .add(&ex("a"), &ex_iri("label"), Term::lang_string("couleur", "fr"))
        .add(&ex("b"), &ex_iri("label"), Term::lang_string("Farbe", "de"))
        .add(&ex("c"), &ex_iri("label"), Term::lang_string("one", "en"))
        .add(&ex("c"), &ex_iri("label"), Term::lang_string("uno", "EN"))
        .build();

    let report = run_default(&data, &shapes);

    assert_eq!(
        kinds(&report),
        vec![
            (ex("b"), ConstraintKind::LanguageIn),
            (ex("c"), ConstraintKind::UniqueLang),
        ]
    );
}

#[test]
fn node_kind_on_node_shape() {
    let shape = ex("ResourceShape");
    let shapes = GraphBuilder::new()
        .add(&shape, shacl::TARGET_OBJECTS_OF, ex("knows"))
        .add(&shape, shacl::NODE_KIND, Term::iri(shacl::IRI))
        .build();

    let data = GraphBuilder::new()
        .add(&ex("a"), &ex_iri("knows"), ex("b"))
        .add(&ex("a"), &ex_iri("knows"), Term::blank("anon"))
        .build();

    let report = run_default(&data, &shapes);

    assert_eq!(report.results.len(), 1);
    let result = &report.results[0];
    assert_eq!(result.source_constraint, ConstraintKind::NodeKind);
    assert_eq!(result.focus_node, Term::blank("anon"));
    assert_eq!(result.value, Some(Term::blank("anon")));
    assert_eq!(result.result_path, None);
}

#[test]
fn non_ascii_date_is_a_datatype_violation() {
    let shape = ex("EventShape");
    let bad = Term::typed("2024-01-0é", Datatype::xsd_date());
    let shapes = GraphBuilder::new()
        .add(&shape, shacl::TARGET_NODE, bad.clone())
        .add(&shape, shacl::DATATYPE, Term::iri(xsd::DATE))
        .add(&shape, shacl::MIN_INCLUSIVE, Term::typed("2024-01-01", Datatype::xsd_date()))
        .build();

    let report = run_default(&shacl_graph_ir::Graph::new(), &shapes);

    assert_eq!(
        kinds(&report),
        vec![
            (bad.clone(), ConstraintKind::Datatype),
            (bad, ConstraintKind::MinInclusive),
        ]
    );
}

#[test]
fn each_has_value_constraint_reports_separately() {
    let shape = ex("TagShape");
    let tag = Term::blank("tag");
    let shapes = GraphBuilder::new()
        .add(&shape, shacl::TARGET_SUBJECTS_OF, ex("tag"))
        .add(&shape, shacl::PROPERTY, tag.clone())
        .add(&tag, shacl::PATH, ex("tag"))
        .add(&tag, shacl::HAS_VALUE, ex("a"))
        .add(&tag, shacl::HAS_VALUE, ex("b"))
        .build();
    let data = GraphBuilder::new()
        .add(&ex("alice"), &ex_iri("tag"), ex("c"))
        .build();

    let report = run_default(&data, &shapes);

    let mut messages: Vec<&str> = report.results.iter().map(|r| r.message.as_str()).collect();
    messages.sort();
    assert_eq!(
        messages,
        vec![
            "Required value <http://example.org/a> not found",
            "Required value <http://example.org/b> not found",
        ]
    );
    assert!(report.results.iter().all(|r| r.source_constraint == ConstraintKind::HasValue));
}

#[test]
fn unique_lang_reports_every_duplicated_tag() {
    let shape = ex("LabelShape");
    let label = Term::blank("label");
    let shapes = GraphBuilder::new()
        .add(&shape, shacl::TARGET_SUBJECTS_OF, ex("label"))
        .add(&shape, shacl::PROPERTY, label.clone())
        .add(&label, shacl::PATH, ex("label"))
        .add(&label, shacl::UNIQUE_LANG, Term::boolean(true))
        .build();
    let data = GraphBuilder::new()
        .add(&ex("x"), &ex_iri("label"), Term::lang_string("a", "en"))
        .add(&ex("x"), &ex_iri("label"), Term::lang_string("b", "en"))
        .add(&ex("x"), &ex_iri("label"), Term::lang_string("c", "fr"))
        .add(&ex("x"), &ex_iri("label"), Term::lang_string("d", "fr"))
        .build();

    let report = run_default(&data, &shapes);

    let messages: Vec<&str> = report.results.iter().map(|r| r.message.as_str()).collect();
    assert_eq!(
        messages,
        vec![
            "Language tag 'en' is used by more than one value",
            "Language tag 'fr' is used by more than one value",
        ]
    );
}
