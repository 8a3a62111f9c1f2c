//! Property tests over arbitrary JSON-shaped inputs.

use inquest::{Schema, Value};
use proptest::prelude::*;

fn json_value() -> impl Strategy<Value = serde_json::Value> {
    let leaf = prop_oneof![
        Just(serde_json::Value::Null),
        any::<bool>().prop_map(serde_json::Value::Bool),
        any::<i32>().prop_map(|n| serde_json::json!(n)),
        "[a-zA-Z0-9@. ]{0,20}".prop_map(serde_json::Value::String),
    ];
    leaf.prop_recursive(3, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(serde_json::Value::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..6)
                .prop_map(|m| serde_json::Value::Object(m.into_iter().collect())),
        ]
    })
}

fn sample_schema() -> Schema {
    Schema::object([
        ("name", Schema::string().min_length(1)),
        ("tags", Schema::array(Schema::string()).optional()),
        ("id", Schema::union([Schema::string(), Schema::number().int()])),
    ])
    .into()
}

proptest! {
    /// `parse` fails exactly when `safe_parse` reports a failure.
    #[test]
    fn parse_agrees_with_safe_parse(json in json_value()) {
        let schema = sample_schema();
        let input = Value::from(json);
        let safe = schema.safe_parse(&input).unwrap();
        prop_assert_eq!(schema.parse(&input).is_ok(), safe.is_success());
    }

    /// Validation never mutates what it accepts unless a node transforms it.
    #[test]
    fn unknown_returns_input_unchanged(json in json_value()) {
        let input = Value::from(json);
        prop_assert_eq!(Schema::unknown().parse(&input).unwrap(), input);
    }

    /// Optional wrappers always accept undefined.
    #[test]
    fn optional_accepts_undefined(json in json_value()) {
        let inner = Schema::literal(Value::from(json));
        prop_assert_eq!(inner.optional().parse(&Value::Undefined).unwrap(), Value::Undefined);
    }

    /// A caught node never reports issues.
    #[test]
    fn catch_never_fails(json in json_value()) {
        let schema = sample_schema().catch(Value::Null);
        prop_assert!(schema.parse(&Value::from(json)).is_ok());
    }

    /// Intersecting a schema with itself behaves like the schema alone.
    #[test]
    fn self_intersection_is_identity(json in json_value()) {
        let schema = sample_schema();
        let input = Value::from(json);
        let alone = schema.parse(&input).ok();
        let doubled = schema.and(schema.clone()).parse(&input).ok();
        prop_assert_eq!(alone, doubled);
    }

    /// Every reported issue carries a non-empty message.
    #[test]
    fn issues_always_have_messages(json in json_value()) {
        if let Err(err) = sample_schema().parse(&Value::from(json)) {
            for issue in err.issues().unwrap() {
                prop_assert!(!issue.message.is_empty());
            }
        }
    }
}
