//! Scalar kinds: type checks with optional coercion, literals and templates.

use super::kind::CustomFn;
use super::node::Node;
use crate::error::IssueKind;
use crate::validation::{ParsePayload, Step};
use crate::value::Value;

/// Type check for strings, converting with `String(input)` first when `coerce`.
pub(super) fn string(node: &Node, mut payload: ParsePayload, coerce: bool) -> Step<'static> {
    if coerce {
        if let Some(s) = payload.value.coerce_string() {
            payload.value = Value::String(s);
        }
    }
    if !matches!(payload.value, Value::String(_)) {
        let issue = node.invalid_type("string", payload.value.clone());
        payload.push(issue);
    }
    Step::ok(payload)
}

/// Type check for finite numbers.
///
/// `NaN` and the infinities are rejected and named in the issue's
/// `received` field.
pub(super) fn number(node: &Node, mut payload: ParsePayload, coerce: bool) -> Step<'static> {
    if coerce {
        if let Some(n) = payload.value.coerce_number() {
            payload.value = Value::Number(n);
        }
    }
    let received = match payload.value {
        Value::Number(n) if n.is_finite() => return Step::ok(payload),
        Value::Number(n) if n.is_nan() => Some("NaN".to_string()),
        Value::Number(_) => Some("Infinity".to_string()),
        _ => None,
    };
    let kind = IssueKind::InvalidType {
        expected: "number".to_string(),
        received,
    };
    let issue = node.issue(kind, payload.value.clone());
    payload.push(issue);
    Step::ok(payload)
}

pub(super) fn boolean(node: &Node, mut payload: ParsePayload, coerce: bool) -> Step<'static> {
    if coerce {
        if let Some(b) = payload.value.coerce_boolean() {
            payload.value = Value::Bool(b);
        }
    }
    if !matches!(payload.value, Value::Bool(_)) {
        let issue = node.invalid_type("boolean", payload.value.clone());
        payload.push(issue);
    }
    Step::ok(payload)
}

/// Type check for bigints.
pub(super) fn bigint(node: &Node, mut payload: ParsePayload, coerce: bool) -> Step<'static> {
    if coerce {
        // A failed conversion leaves the input in place for the type check.
        if let Some(i) = payload.value.coerce_bigint() {
            payload.value = Value::BigInt(i);
        }
    }
    if !matches!(payload.value, Value::BigInt(_)) {
        let issue = node.invalid_type("bigint", payload.value.clone());
        payload.push(issue);
    }
    Step::ok(payload)
}

/// Type check for dates.
///
/// A coercion that produces no date reports received "Invalid Date".
pub(super) fn date(node: &Node, mut payload: ParsePayload, coerce: bool) -> Step<'static> {
    let mut invalid_date = false;
    if coerce {
        match payload.value.coerce_date() {
            Some(d) => payload.value = Value::Date(d),
            None => invalid_date = true,
        }
    }
    if !matches!(payload.value, Value::Date(_)) {
        let kind = IssueKind::InvalidType {
            expected: "date".to_string(),
            received: invalid_date.then(|| "Invalid Date".to_string()),
        };
        let issue = node.issue(kind, payload.value.clone());
        payload.push(issue);
    }
    Step::ok(payload)
}

/// Kinds that accept exactly the values satisfying `accepts`.
pub(super) fn exact(
    node: &Node,
    mut payload: ParsePayload,
    expected: &str,
    accepts: impl Fn(&Value) -> bool,
) -> Step<'static> {
    if !accepts(&payload.value) {
        let issue = node.invalid_type(expected, payload.value.clone());
        payload.push(issue);
    }
    Step::ok(payload)
}

/// Membership test against the node's value set.
pub(super) fn literal(node: &Node, mut payload: ParsePayload) -> Step<'static> {
    let Some(values) = node.value_set() else {
        return Step::ok(payload);
    };
    if !values.contains(&payload.value) {
        let kind = IssueKind::InvalidValue {
            values: values.values().to_vec(),
        };
        let issue = node.issue(kind, payload.value.clone());
        payload.push(issue);
    }
    Step::ok(payload)
}

/// Matches a string against the pattern assembled from the template parts.
pub(super) fn template_literal(node: &Node, mut payload: ParsePayload) -> Step<'static> {
    let issue = match (&payload.value, node.pattern()) {
        (Value::String(s), Some(pattern)) if pattern.is_match(s) => None,
        (Value::String(_), pattern) => Some(node.issue(
            IssueKind::InvalidFormat {
                format: "template_literal".to_string(),
                pattern: pattern.map(|re| re.as_str().to_string()),
            },
            payload.value.clone(),
        )),
        (other, _) => Some(node.invalid_type("string", other.clone())),
    };
    if let Some(issue) = issue {
        payload.push(issue);
    }
    Step::ok(payload)
}

/// Runs the user predicate; a rejection is a continuable `custom` issue.
pub(super) fn custom(node: &Node, mut payload: ParsePayload, predicate: &CustomFn) -> Step<'static> {
    if !predicate(&payload.value) {
        let issue = node
            .issue(IssueKind::Custom { params: None }, payload.value.clone())
            .continuable(true);
        payload.push(issue);
    }
    Step::ok(payload)
}

#[cfg(test)]
mod tests {
    use crate::schema::Schema;
    use crate::value::Value;

    fn first_code(schema: &Schema, input: Value) -> Option<String> {
        schema
            .parse(&input)
            .err()
            .and_then(|e| e.issues().map(|i| i.first().code().to_string()))
    }

    #[test]
    fn test_number_rejects_nan_with_refined_received() {
        let err = Schema::number()
            .parse(&Value::Number(f64::NAN))
            .unwrap_err();
        let issue = err.issues().unwrap().first().clone();
        assert_eq!(issue.message, "Invalid input: expected number, received NaN");
    }

    #[test]
    fn test_coerced_number_from_string() {
        let schema = Schema::coerce_number();
        assert_eq!(schema.parse(&Value::from("42")).unwrap(), Value::Number(42.0));
        assert_eq!(first_code(&schema, Value::from("abc")).as_deref(), Some("invalid_type"));
    }

    #[test]
    fn test_coerced_bigint_keeps_input_when_conversion_fails() {
        let schema = Schema::coerce_bigint();
        assert_eq!(schema.parse(&Value::from("12")).unwrap(), Value::BigInt(12));

        let err = schema.parse(&Value::from(1.5)).unwrap_err();
        assert_eq!(err.issues().unwrap().first().input, Value::from(1.5));
    }

    #[test]
    fn test_void_and_undefined_accept_only_undefined() {
        assert!(Schema::void().parse(&Value::Undefined).is_ok());
        assert!(Schema::undefined().parse(&Value::Null).is_err());
    }

    #[test]
    fn test_never_always_fails() {
        assert_eq!(first_code(&Schema::never(), Value::Null).as_deref(), Some("invalid_type"));
    }

    #[test]
    fn test_nan_kind_accepts_only_nan() {
        assert!(Schema::nan().parse(&Value::Number(f64::NAN)).is_ok());
        assert!(Schema::nan().parse(&Value::from(1)).is_err());
    }

    #[test]
    fn test_literal_reports_expected_values() {
        let schema = Schema::literals(["a", "b"]);
        let err = schema.parse(&Value::from("c")).unwrap_err();
        let issue = err.issues().unwrap().first().clone();
        assert_eq!(issue.code(), "invalid_value");
        assert_eq!(issue.message, "Invalid option: expected one of \"a\"|\"b\"");
    }
}
