//! Integration tests for issue collections and message resolution.

use inquest::{
    IssueKind, JsonPath, ParseConfig, ParseError, ParseResult, Schema, ValidationError, Value,
};
use serde_json::json;
use stillwater::prelude::*;
use stillwater::Validation;

fn failure(schema: &Schema, input: serde_json::Value) -> ValidationError {
    match schema.safe_parse(&Value::from(input)).unwrap() {
        Validation::Failure(err) => err,
        Validation::Success(v) => panic!("expected failure, got {}", v),
    }
}

fn form() -> Schema {
    Schema::object([
        ("name", Schema::string().min_length(2)),
        ("email", Schema::email()),
        ("age", Schema::number().gte(0)),
    ])
    .into()
}

#[test]
fn test_safe_parse_success() {
    let result: ParseResult = form()
        .safe_parse(&Value::from(json!({"name": "Ada", "email": "a@b.co", "age": 3})))
        .unwrap();
    assert!(result.is_success());
}

#[test]
fn test_errors_never_empty() {
    let err = failure(&form(), json!({}));
    assert!(!err.is_empty());
    assert_eq!(err.len(), 3);
}

#[test]
fn test_query_errors_by_path_and_code() {
    let err = failure(&form(), json!({"name": "A", "email": 5, "age": -1}));

    let at_email = err.at_path(&JsonPath::root().push_field("email"));
    assert_eq!(at_email.len(), 1);
    assert_eq!(at_email[0].code(), "invalid_type");

    let small = err.with_code("too_small");
    let paths: Vec<String> = small.iter().map(|i| i.path.to_string()).collect();
    assert_eq!(paths, vec!["name", "age"]);
}

#[test]
fn test_errors_combine_via_semigroup() {
    let a = failure(&form(), json!({"name": "A", "email": "a@b.co", "age": 1}));
    let b = failure(&form(), json!({"name": "Ada", "email": "x", "age": 1}));
    let combined = a.combine(b);
    assert_eq!(combined.len(), 2);
    assert_eq!(combined.first().path.to_string(), "name");
}

#[test]
fn test_validation_and_accumulates_across_parses() {
    let first = Schema::string().safe_parse(&Value::from(1)).unwrap();
    let second = Schema::number().safe_parse(&Value::from("1")).unwrap();

    match first.and(second) {
        Validation::Failure(errors) => assert_eq!(errors.len(), 2),
        Validation::Success(_) => panic!("expected failure"),
    }
}

#[test]
fn test_errors_into_vec_keeps_order() {
    let err = failure(&form(), json!({"name": 1, "email": 1, "age": "x"}));
    let issues = err.into_vec();
    let paths: Vec<String> = issues.iter().map(|i| i.path.to_string()).collect();
    assert_eq!(paths, vec!["name", "email", "age"]);
}

#[test]
fn test_error_display_lists_issues() {
    let err = failure(&form(), json!({"name": "Ada", "email": "a@b.co"}));
    let text = err.to_string();
    assert!(text.starts_with("Validation failed with 1 issue(s):"));
    assert!(text.contains("1. age: Invalid input: expected number, received undefined"));
}

#[test]
fn test_parse_error_exposes_issues() {
    let err = form().parse(&Value::Null).unwrap_err();
    assert!(!err.is_fault());
    assert!(err.fault().is_none());
    assert!(matches!(err, ParseError::Invalid(_)));
}

#[test]
fn test_issue_keeps_failing_input() {
    let err = failure(&form(), json!({"name": "A", "email": "a@b.co", "age": 1}));
    assert_eq!(err.first().input, Value::from("A"));
    match &err.first().kind {
        IssueKind::TooSmall { minimum, .. } => assert_eq!(minimum, &Value::from(2)),
        other => panic!("unexpected kind {:?}", other),
    }
}

#[test]
fn test_node_error_map_applies_to_node_and_checks() {
    let schema = Schema::number()
        .gte(10)
        .error_map(|issue| Some(format!("age: {}", issue.code())));

    let err = schema.parse(&Value::from("x")).unwrap_err();
    assert_eq!(err.issues().unwrap().first().message, "age: invalid_type");

    let err = schema.parse(&Value::from(3)).unwrap_err();
    assert_eq!(err.issues().unwrap().first().message, "age: too_small");
}

#[test]
fn test_error_map_may_decline() {
    let schema = Schema::string().error_map(|issue| match &issue.kind {
        IssueKind::InvalidType { .. } if issue.input.is_null() => Some("required".to_string()),
        _ => None,
    });

    let err = schema.parse(&Value::Null).unwrap_err();
    assert_eq!(err.issues().unwrap().first().message, "required");

    let err = schema.parse(&Value::from(1)).unwrap_err();
    assert_eq!(
        err.issues().unwrap().first().message,
        "Invalid input: expected string, received number"
    );
}

#[test]
fn test_message_precedence() {
    let config = ParseConfig::new().with_error(|_| Some("per call".to_string()));

    // An explicit check message beats every map.
    let explicit = Schema::string()
        .min_length(5)
        .error("explicit")
        .error_map(|_| Some("node".to_string()));
    let err = explicit.parse_with(&Value::from("abc"), &config).unwrap_err();
    assert_eq!(err.issues().unwrap().first().message, "explicit");

    // The node map beats the per-call map.
    let mapped = Schema::string().error_map(|_| Some("node".to_string()));
    let err = mapped.parse_with(&Value::from(1), &config).unwrap_err();
    assert_eq!(err.issues().unwrap().first().message, "node");

    // The per-call map beats the default.
    let err = Schema::string()
        .parse_with(&Value::from(1), &config)
        .unwrap_err();
    assert_eq!(err.issues().unwrap().first().message, "per call");
}

#[test]
fn test_inner_node_map_survives_nesting() {
    let schema = Schema::object([(
        "zip",
        Schema::string().error_map(|_| Some("bad zip".to_string())),
    )])
    .error_map(|_| Some("bad object".to_string()));

    let err = schema
        .parse(&Value::from(json!({"zip": 12345})))
        .unwrap_err();
    assert_eq!(err.issues().unwrap().first().message, "bad zip");

    let err = schema.parse(&Value::from("nope")).unwrap_err();
    assert_eq!(err.issues().unwrap().first().message, "bad object");
}
