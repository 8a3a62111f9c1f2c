//! Combinators over several child nodes: union, discriminated union and
//! intersection.
//!
//! A union tries its options in order and keeps the first clean result;
//! when every option fails, each option's issues are kept as one group of a
//! single `invalid_union` issue. A discriminated union routes the input to
//! one option by looking at literal-valued keys. An intersection runs both
//! sides on the same input and deep-merges their outputs.
//!
//! # Example
//!
//! ```rust
//! use inquest::{Schema, Value};
//!
//! let shape = Schema::discriminated_union(
//!     [
//!         Schema::object([("type", Schema::literal("circle")), ("radius", Schema::number())]).into(),
//!         Schema::object([("type", Schema::literal("square")), ("side", Schema::number())]).into(),
//!     ],
//!     false,
//! )
//! .unwrap();
//!
//! let input = Value::object([("type", Value::from("square")), ("side", Value::from(2))]);
//! assert!(shape.parse(&input).is_ok());
//!
//! let input = Value::object([("type", "triangle")]);
//! let err = shape.parse(&input).unwrap_err();
//! assert_eq!(err.issues().unwrap().first().message, "No matching discriminator");
//! ```

use indexmap::IndexMap;

use super::derived::same_value;
use super::node::Node;
use super::Schema;
use crate::error::{IssueKind, SchemaFault};
use crate::path::{JsonPath, PathSegment};
use crate::validation::{ParseContext, ParsePayload, Step};
use crate::value::Value;

pub(super) fn union<'a>(
    node: &'a Node,
    options: &'a [Schema],
    mut payload: ParsePayload,
    ctx: &'a ParseContext,
) -> Step<'a> {
    let mut steps = Vec::with_capacity(options.len());
    let mut deferred = false;

    for option in options {
        let step = option
            .node()
            .run(ParsePayload::new(payload.value.clone()), ctx);
        match step {
            Step::Ready(Err(fault)) => return Step::fault(fault),
            Step::Ready(Ok(result)) => {
                if !deferred && !result.has_issues() {
                    payload.value = result.value;
                    return Step::ok(payload);
                }
                steps.push(Step::ok(result));
            }
            pending => {
                deferred = true;
                steps.push(pending);
            }
        }
    }

    Step::join(steps, move |results| {
        let mut payload = payload;
        let clean = results.iter().position(|r| !r.has_issues());
        match clean {
            Some(index) => {
                let mut results = results;
                payload.value = results.swap_remove(index).value;
            }
            None => {
                let errors = results
                    .into_iter()
                    .map(|r| ctx.finalize(r.issues))
                    .collect();
                let issue = node.issue(
                    IssueKind::InvalidUnion { errors, note: None },
                    payload.value.clone(),
                );
                payload.push(issue);
            }
        }
        Step::ok(payload)
    })
}

pub(super) fn discriminated_union<'a>(
    node: &'a Node,
    options: &'a [Schema],
    fallback: bool,
    mut payload: ParsePayload,
    ctx: &'a ParseContext,
) -> Step<'a> {
    if !matches!(payload.value, Value::Object(_)) {
        let issue = node.invalid_type("object", payload.value.clone());
        payload.push(issue);
        return Step::ok(payload);
    }

    let routes = node.routes();
    let selected = routes.select(&payload.value);
    if let [only] = selected.as_slice() {
        return options[*only].node().run(payload, ctx);
    }

    if fallback {
        tracing::trace!(matches = selected.len(), "discriminator inconclusive, trying all options");
        return union(node, options, payload, ctx);
    }

    let path = match routes.shared.as_slice() {
        [key] => JsonPath::from_segments(vec![PathSegment::field(key.as_str())]),
        _ => JsonPath::root(),
    };
    let issue = node
        .issue(
            IssueKind::InvalidUnion {
                errors: Vec::new(),
                note: Some("No matching discriminator".to_string()),
            },
            payload.value.clone(),
        )
        .at(path);
    payload.push(issue);
    Step::ok(payload)
}

pub(super) fn intersection<'a>(
    left: &'a Schema,
    right: &'a Schema,
    payload: ParsePayload,
    ctx: &'a ParseContext,
) -> Step<'a> {
    let steps = vec![
        left.node().run(ParsePayload::new(payload.value.clone()), ctx),
        right.node().run(ParsePayload::new(payload.value.clone()), ctx),
    ];

    Step::join(steps, move |results| {
        let mut payload = payload;
        let mut results = results.into_iter();
        let (Some(l), Some(r)) = (results.next(), results.next()) else {
            return Step::ok(payload);
        };

        payload.absorb(l.issues, None);
        payload.absorb(r.issues, None);
        if payload.aborted(0) {
            return Step::ok(payload);
        }

        match merge(l.value, r.value) {
            Ok(merged) => {
                payload.value = merged;
                Step::ok(payload)
            }
            Err(path) => {
                tracing::warn!(%path, "intersection outputs cannot be merged");
                Step::fault(SchemaFault::UnmergeableIntersection { path })
            }
        }
    })
}

/// Deep-merges two outputs of the same input. On conflict, returns the path
/// of the first conflicting position.
fn merge(a: Value, b: Value) -> Result<Value, JsonPath> {
    if same_value(&a, &b) {
        return Ok(a);
    }
    match (a, b) {
        (Value::Object(a), Value::Object(mut b)) => {
            let mut out = IndexMap::with_capacity(a.len() + b.len());
            for (key, left) in a {
                let value = match b.shift_remove(&key) {
                    Some(right) => merge(left, right).map_err(|mut path| {
                        path.prepend(PathSegment::field(key.as_str()));
                        path
                    })?,
                    None => left,
                };
                out.insert(key, value);
            }
            out.extend(b);
            Ok(Value::Object(out))
        }
        (Value::Array(a), Value::Array(b)) => {
            if a.len() != b.len() {
                return Err(JsonPath::root());
            }
            a.into_iter()
                .zip(b)
                .enumerate()
                .map(|(index, (left, right))| {
                    merge(left, right).map_err(|mut path| {
                        path.prepend(PathSegment::index(index));
                        path
                    })
                })
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array)
        }
        _ => Err(JsonPath::root()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_combines_disjoint_keys() {
        let merged = merge(
            Value::object([("a", 1)]),
            Value::object([("b", 2)]),
        )
        .unwrap();
        assert_eq!(merged, Value::object([("a", 1), ("b", 2)]));
    }

    #[test]
    fn test_merge_conflict_reports_path() {
        let path = merge(
            Value::object([("a", Value::object([("b", 1)]))]),
            Value::object([("a", Value::object([("b", 2)]))]),
        )
        .unwrap_err();
        assert_eq!(path.to_string(), "a.b");
    }

    #[test]
    fn test_merge_arrays_need_equal_length() {
        assert!(merge(Value::Array(vec![Value::from(1)]), Value::Array(vec![])).is_err());
    }

    #[test]
    fn test_union_takes_first_clean_option() {
        let schema = Schema::union([Schema::string(), Schema::coerce_string()]);
        assert_eq!(schema.parse(&Value::from("a")).unwrap(), Value::from("a"));
        assert_eq!(schema.parse(&Value::from(1)).unwrap(), Value::from("1"));
    }

    #[test]
    fn test_union_failure_groups_option_issues() {
        let schema = Schema::union([Schema::string(), Schema::number()]);
        let err = schema.parse(&Value::Bool(true)).unwrap_err();
        let issue = err.issues().unwrap().first().clone();
        match issue.kind {
            IssueKind::InvalidUnion { errors, .. } => assert_eq!(errors.len(), 2),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_discriminated_union_rejects_non_object() {
        let schema = Schema::discriminated_union(
            [Schema::object([("kind", Schema::literal("a"))]).into()],
            false,
        )
        .unwrap();
        let err = schema.parse(&Value::from("a")).unwrap_err();
        assert_eq!(err.issues().unwrap().first().code(), "invalid_type");
    }

    #[test]
    fn test_discriminated_union_no_match_points_at_key() {
        let schema = Schema::discriminated_union(
            [
                Schema::object([("kind", Schema::literal("a"))]).into(),
                Schema::object([("kind", Schema::literal("b"))]).into(),
            ],
            false,
        )
        .unwrap();
        let err = schema.parse(&Value::object([("kind", "c")])).unwrap_err();
        let issue = err.issues().unwrap().first().clone();
        assert_eq!(issue.path.to_string(), "kind");
        assert_eq!(issue.code(), "invalid_union");
    }

    #[test]
    fn test_discriminated_union_option_without_literal_faults() {
        let fault = Schema::discriminated_union(
            [
                Schema::object([("kind", Schema::literal("a"))]).into(),
                Schema::object([("kind", Schema::string())]).into(),
            ],
            false,
        )
        .err()
        .unwrap();
        assert!(matches!(fault, SchemaFault::InvalidDiscriminatedUnionOption { index: 1 }));
    }

    #[test]
    fn test_intersection_merges_objects() {
        let schema = Schema::intersection(
            Schema::object([("a", Schema::number())]).passthrough().into(),
            Schema::object([("b", Schema::number())]).passthrough().into(),
        );
        let input = Value::object([("a", 1), ("b", 2)]);
        assert_eq!(schema.parse(&input).unwrap(), input);
    }

    #[test]
    fn test_intersection_conflict_is_fault() {
        let schema = Schema::intersection(
            Schema::string().transform(|_| Ok(Value::from("x"))),
            Schema::string().transform(|_| Ok(Value::from("y"))),
        );
        let err = schema.parse(&Value::from("a")).unwrap_err();
        assert!(err.is_fault());
    }
}
