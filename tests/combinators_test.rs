//! Integration tests for union, discriminated union and intersection.

use inquest::{IssueKind, ParseError, Schema, SchemaFault, Value};
use serde_json::json;

fn circle() -> Schema {
    Schema::object([
        ("kind", Schema::literal("circle")),
        ("radius", Schema::number().positive()),
    ])
    .into()
}

fn square() -> Schema {
    Schema::object([
        ("kind", Schema::literal("square")),
        ("side", Schema::number().positive()),
    ])
    .into()
}

#[test]
fn test_union_accepts_any_option() {
    let schema = Schema::union([Schema::string(), Schema::number()]);
    assert!(schema.parse(&Value::from("a")).is_ok());
    assert!(schema.parse(&Value::from(1)).is_ok());
}

#[test]
fn test_union_failure_groups_option_issues() {
    let schema = Schema::string().min_length(3).or(Schema::number());
    let err = schema.parse(&Value::from("ab")).unwrap_err();
    let issues = err.issues().unwrap();
    assert_eq!(issues.len(), 1);

    let issue = issues.first();
    assert_eq!(issue.message, "Invalid input");
    match &issue.kind {
        IssueKind::InvalidUnion { errors, note } => {
            assert!(note.is_none());
            assert_eq!(errors.len(), 2);
            assert_eq!(errors[0][0].code(), "too_small");
            assert_eq!(errors[1][0].code(), "invalid_type");
        }
        other => panic!("unexpected kind {:?}", other),
    }
}

#[test]
fn test_union_first_clean_option_wins() {
    let schema = Schema::union([
        Schema::string().transform(|_| Ok(Value::from("first"))),
        Schema::string().transform(|_| Ok(Value::from("second"))),
    ]);
    assert_eq!(schema.parse(&Value::from("x")).unwrap(), Value::from("first"));
}

#[test]
fn test_union_inside_object_reports_field_path() {
    let schema = Schema::object([("id", Schema::union([Schema::string(), Schema::number()]))]);
    let err = schema
        .parse(&Value::from(json!({"id": true})))
        .unwrap_err();
    let issue = err.issues().unwrap().first();
    assert_eq!(issue.path.to_string(), "id");
    match &issue.kind {
        IssueKind::InvalidUnion { errors, .. } => assert!(errors[0][0].path.is_root()),
        other => panic!("unexpected kind {:?}", other),
    }
}

#[test]
fn test_discriminated_union_routes_by_key() {
    let shape = Schema::discriminated_union([circle(), square()], false).unwrap();

    assert!(shape
        .parse(&Value::from(json!({"kind": "circle", "radius": 1})))
        .is_ok());

    // Only the selected option's issues are reported.
    let err = shape
        .parse(&Value::from(json!({"kind": "square", "side": -1})))
        .unwrap_err();
    let issue = err.issues().unwrap().first();
    assert_eq!(issue.code(), "too_small");
    assert_eq!(issue.path.to_string(), "side");
}

#[test]
fn test_discriminated_union_without_match() {
    let shape = Schema::discriminated_union([circle(), square()], false).unwrap();
    let err = shape
        .parse(&Value::from(json!({"kind": "hexagon"})))
        .unwrap_err();
    let issue = err.issues().unwrap().first();
    assert_eq!(issue.code(), "invalid_union");
    assert_eq!(issue.message, "No matching discriminator");
    assert_eq!(issue.path.to_string(), "kind");
}

#[test]
fn test_discriminated_union_routes_on_any_matching_key() {
    let first: Schema = Schema::object([("type", Schema::literal("a")), ("v", Schema::literal(1))]).into();
    let second: Schema = Schema::object([("type", Schema::literal("b")), ("v", Schema::literal(2))]).into();
    let schema = Schema::discriminated_union([first, second], false).unwrap();

    let err = schema.parse(&Value::from(json!({"type": "a"}))).unwrap_err();
    let issue = err.issues().unwrap().first();
    assert_eq!(issue.code(), "invalid_value");
    assert_eq!(issue.path.to_string(), "v");

    // Both options match, so routing is inconclusive.
    let err = schema
        .parse(&Value::from(json!({"type": "a", "v": 2})))
        .unwrap_err();
    let issue = err.issues().unwrap().first();
    assert_eq!(issue.message, "No matching discriminator");
    assert!(issue.path.is_root());
}

#[test]
fn test_discriminated_union_rejects_non_objects() {
    let shape = Schema::discriminated_union([circle(), square()], false).unwrap();
    let err = shape.parse(&Value::from("circle")).unwrap_err();
    assert_eq!(err.issues().unwrap().first().code(), "invalid_type");
}

#[test]
fn test_discriminated_union_fallback_tries_every_option() {
    let shape = Schema::discriminated_union([circle(), square()], true).unwrap();
    let err = shape
        .parse(&Value::from(json!({"kind": "hexagon"})))
        .unwrap_err();
    match &err.issues().unwrap().first().kind {
        IssueKind::InvalidUnion { errors, note } => {
            assert!(note.is_none());
            assert_eq!(errors.len(), 2);
        }
        other => panic!("unexpected kind {:?}", other),
    }
}

#[test]
fn test_discriminated_union_option_without_literal_key_is_a_fault() {
    let plain: Schema = Schema::object([("radius", Schema::number())]).into();
    match Schema::discriminated_union([circle(), plain], false) {
        Err(SchemaFault::InvalidDiscriminatedUnionOption { index }) => assert_eq!(index, 1),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_nested_discriminated_unions() {
    let shape = Schema::discriminated_union([circle(), square()], false).unwrap();
    let line: Schema = Schema::object([("kind", Schema::literal("line"))]).into();
    let any = Schema::discriminated_union([shape, line], false).unwrap();

    assert!(any.parse(&Value::from(json!({"kind": "line"}))).is_ok());
    assert!(any
        .parse(&Value::from(json!({"kind": "circle", "radius": 2})))
        .is_ok());
}

#[test]
fn test_intersection_merges_objects() {
    let named = Schema::object([("name", Schema::string())]);
    let aged = Schema::object([("age", Schema::number())]);
    let person = named.and(aged);

    let out = person
        .parse(&Value::from(json!({"name": "Ada", "age": 36})))
        .unwrap();
    assert_eq!(out, Value::from(json!({"name": "Ada", "age": 36})));
}

#[test]
fn test_intersection_reports_both_sides() {
    let person = Schema::intersection(
        Schema::object([("name", Schema::string())]).into(),
        Schema::object([("age", Schema::number())]).into(),
    );
    let err = person.parse(&Value::from(json!({}))).unwrap_err();
    let paths: Vec<String> = err
        .issues()
        .unwrap()
        .iter()
        .map(|i| i.path.to_string())
        .collect();
    assert_eq!(paths, vec!["name", "age"]);
}

#[test]
fn test_intersection_conflict_is_a_fault() {
    let schema = Schema::intersection(
        Schema::string().transform(|_| Ok(Value::from("a"))),
        Schema::string().transform(|_| Ok(Value::from("b"))),
    );
    match schema.parse(&Value::from("x")) {
        Err(ParseError::Fault(SchemaFault::UnmergeableIntersection { path })) => {
            assert!(path.is_root())
        }
        other => panic!("unexpected {:?}", other),
    }
}
