//! Integration tests for wrappers, pipes, transforms and refinements.

use inquest::{JsonPath, ParseError, RawIssue, Refine, Schema, SchemaFault, TemplatePart, Value};
use serde_json::json;

#[test]
fn test_optional_field_may_be_missing() {
    let schema = Schema::object([
        ("name", Schema::string()),
        ("nick", Schema::string().optional()),
    ]);
    assert_eq!(
        schema.parse(&Value::from(json!({"name": "Ada"}))).unwrap(),
        Value::from(json!({"name": "Ada"}))
    );
    assert!(schema
        .parse(&Value::from(json!({"name": "Ada", "nick": 1})))
        .is_err());
}

#[test]
fn test_nullish_accepts_null_and_undefined() {
    let schema = Schema::number().nullish();
    assert!(schema.parse(&Value::Null).is_ok());
    assert!(schema.parse(&Value::Undefined).is_ok());
    assert!(schema.parse(&Value::from("1")).is_err());
}

#[test]
fn test_default_fills_missing_fields() {
    let schema = Schema::object([
        ("role", Schema::string().default("member")),
        ("tags", Schema::array(Schema::string()).default_with(|| Value::Array(vec![]))),
    ]);
    assert_eq!(
        schema.parse(&Value::from(json!({}))).unwrap(),
        Value::from(json!({"role": "member", "tags": []}))
    );
}

#[test]
fn test_default_value_skips_inner_validation() {
    let schema = Schema::string().min_length(10).default("short");
    assert_eq!(schema.parse(&Value::Undefined).unwrap(), Value::from("short"));
    assert!(schema.parse(&Value::from("short")).is_err());
}

#[test]
fn test_prefault_default_goes_through_validation() {
    let schema = Schema::string().trim().prefault("  padded  ");
    assert_eq!(schema.parse(&Value::Undefined).unwrap(), Value::from("padded"));
}

#[test]
fn test_catch_hides_failures_inside_objects() {
    let schema = Schema::object([("retries", Schema::number().int().catch(3))]);
    assert_eq!(
        schema.parse(&Value::from(json!({"retries": "many"}))).unwrap(),
        Value::from(json!({"retries": 3}))
    );
}

#[test]
fn test_readonly_is_transparent() {
    let schema = Schema::array(Schema::number()).readonly();
    assert!(schema.parse(&Value::from(json!([1, 2]))).is_ok());
    assert!(schema.parse(&Value::from(json!(["x"]))).is_err());
}

#[test]
fn test_success_outputs_a_boolean() {
    let schema = Schema::email().success();
    assert_eq!(
        schema.parse(&Value::from("a@b.co")).unwrap(),
        Value::from(true)
    );
    assert_eq!(schema.parse(&Value::from("nope")).unwrap(), Value::from(false));
}

#[test]
fn test_pipe_feeds_output_forward() {
    let schema = Schema::string()
        .transform(|v| Ok(Value::from(v.as_str().map_or(0, |s| s.len() as i64))))
        .pipe(Schema::number().gte(3));

    assert_eq!(schema.parse(&Value::from("abcd")).unwrap(), Value::from(4));
    assert_eq!(
        schema.parse(&Value::from("ab")).unwrap_err().issues().unwrap().first().code(),
        "too_small"
    );
}

#[test]
fn test_pipe_skips_output_after_fatal_input_issue() {
    let schema = Schema::string().pipe(Schema::number());
    let err = schema.parse(&Value::from(1)).unwrap_err();
    assert_eq!(err.issues().unwrap().len(), 1);
}

#[test]
fn test_transform_error_is_a_fault() {
    let schema = Schema::string().transform(|_| Err("boom".into()));
    match schema.parse(&Value::from("x")) {
        Err(ParseError::Fault(SchemaFault::Callback { .. })) => {}
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_refine_reports_custom_issue() {
    let schema = Schema::number().refine(|v| v.as_f64().is_some_and(|n| n % 2.0 == 0.0));
    let err = schema.parse(&Value::from(3)).unwrap_err();
    let issue = err.issues().unwrap().first();
    assert_eq!(issue.code(), "custom");
    assert_eq!(issue.message, "Invalid input");
}

#[test]
fn test_refinements_accumulate() {
    let schema = Schema::string()
        .check(Refine::new(|v| v.as_str().is_some_and(|s| s.contains('@'))).message("needs @"))
        .check(Refine::new(|v| v.as_str().is_some_and(|s| s.len() > 5)).message("too short"));

    let err = schema.parse(&Value::from("ab")).unwrap_err();
    let messages: Vec<&str> = err
        .issues()
        .unwrap()
        .iter()
        .map(|i| i.message.as_str())
        .collect();
    assert_eq!(messages, vec!["needs @", "too short"]);
}

#[test]
fn test_aborting_refinement_stops_later_checks() {
    let schema = Schema::string()
        .check(Refine::new(|_| false).message("first").abort())
        .check(Refine::new(|_| false).message("second"));

    let err = schema.parse(&Value::from("x")).unwrap_err();
    assert_eq!(err.issues().unwrap().len(), 1);
}

#[test]
fn test_cross_field_refinement_with_path() {
    let signup = Schema::object([
        ("password", Schema::string().min_length(8)),
        ("confirm", Schema::string()),
    ])
    .check(
        Refine::new(|v| v.get("password") == v.get("confirm"))
            .message("passwords do not match")
            .path(JsonPath::root().push_field("confirm")),
    );

    let err = signup
        .parse(&Value::from(json!({"password": "longenough", "confirm": "different"})))
        .unwrap_err();
    let issue = err.issues().unwrap().first();
    assert_eq!(issue.path.to_string(), "confirm");
    assert_eq!(issue.message, "passwords do not match");
}

#[test]
fn test_refinement_skipped_after_field_failure() {
    let signup = Schema::object([("password", Schema::string().min_length(8))])
        .refine(|_| false);

    // The field issue is continuable, so the refinement still runs.
    let err = signup
        .parse(&Value::from(json!({"password": "short"})))
        .unwrap_err();
    assert_eq!(err.issues().unwrap().len(), 2);

    // A type failure inside the object is fatal, so it does not.
    let err = signup
        .parse(&Value::from(json!({"password": 1})))
        .unwrap_err();
    assert_eq!(err.issues().unwrap().len(), 1);
}

#[test]
fn test_when_forces_refinement_after_failure() {
    let schema = Schema::object([("a", Schema::number())]).check(
        Refine::new(|_| false)
            .message("forced")
            .when(|payload| payload.value.as_object().is_some()),
    );
    let err = schema.parse(&Value::from(json!({"a": "x"}))).unwrap_err();
    let messages: Vec<&str> = err
        .issues()
        .unwrap()
        .iter()
        .map(|i| i.message.as_str())
        .collect();
    assert_eq!(messages.last(), Some(&"forced"));
}

#[test]
fn test_super_refine_pushes_many_issues() {
    let schema = Schema::array(Schema::number()).super_refine(|value, issues| {
        if let Some(items) = value.as_array() {
            for (index, item) in items.iter().enumerate() {
                if item.as_f64().is_some_and(|n| n > 10.0) {
                    issues.push(
                        RawIssue::custom(item.clone(), "over ten")
                            .at(JsonPath::root().push_index(index)),
                    );
                }
            }
        }
    });

    let err = schema.parse(&Value::from(json!([1, 11, 2, 12]))).unwrap_err();
    let paths: Vec<String> = err
        .issues()
        .unwrap()
        .iter()
        .map(|i| i.path.to_string())
        .collect();
    assert_eq!(paths, vec!["[1]", "[3]"]);
}

#[test]
fn test_template_literal() {
    let version = Schema::template_literal([
        TemplatePart::from("v"),
        TemplatePart::from(Schema::number().int()),
        TemplatePart::from("."),
        TemplatePart::from(Schema::number().int()),
    ])
    .unwrap();
    assert!(version.parse(&Value::from("v1.2")).is_ok());
    assert_eq!(
        version.parse(&Value::from("1.2")).unwrap_err().issues().unwrap().first().code(),
        "invalid_format"
    );
    assert_eq!(
        version.parse(&Value::from(12)).unwrap_err().issues().unwrap().first().code(),
        "invalid_type"
    );
}

#[test]
fn test_literal_and_enum() {
    let yes = Schema::literal(true);
    assert!(yes.parse(&Value::from(true)).is_ok());
    assert!(yes.parse(&Value::from(false)).is_err());

    let color = Schema::enumeration(["red", "green"]);
    let err = color.parse(&Value::from("blue")).unwrap_err();
    assert_eq!(
        err.issues().unwrap().first().message,
        "Invalid option: expected one of \"red\"|\"green\""
    );
}

#[test]
fn test_custom_node() {
    let even = Schema::custom(|v| v.as_f64().is_some_and(|n| n % 2.0 == 0.0));
    assert!(even.parse(&Value::from(2)).is_ok());
    assert_eq!(
        even.parse(&Value::from(3)).unwrap_err().issues().unwrap().first().code(),
        "custom"
    );
}
