//! Keyed kinds: record and map.

use indexmap::IndexMap;

use super::node::Node;
use super::Schema;
use crate::error::{IssueKind, Origin, RawIssue};
use crate::path::{JsonPath, PathSegment};
use crate::validation::{ParseContext, ParsePayload, Step};
use crate::value::Value;

pub(super) fn record<'a>(
    node: &'a Node,
    key: &'a Schema,
    value: &'a Schema,
    mut payload: ParsePayload,
    ctx: &'a ParseContext,
) -> Step<'a> {
    let input = match std::mem::take(&mut payload.value) {
        Value::Object(map) => map,
        other => {
            let issue = node.invalid_type("record", other.clone());
            payload.value = other;
            payload.push(issue);
            return Step::ok(payload);
        }
    };

    match key.node().value_set() {
        Some(keys) => exhaustive(node, keys.values(), value, input, payload, ctx),
        None => open(node, key, value, input, payload, ctx),
    }
}

/// A record over a finite key set: every key is visited, extra keys are
/// reported.
fn exhaustive<'a>(
    node: &'a Node,
    keys: &'a [Value],
    value: &'a Schema,
    input: IndexMap<String, Value>,
    payload: ParsePayload,
    ctx: &'a ParseContext,
) -> Step<'a> {
    let names: Vec<String> = keys
        .iter()
        .filter_map(|k| match k {
            Value::String(s) => Some(s.clone()),
            Value::Number(_) => k.coerce_string(),
            _ => None,
        })
        .collect();

    let steps = names
        .iter()
        .map(|name| {
            let raw = input.get(name).cloned().unwrap_or_default();
            value.node().run(ParsePayload::new(raw), ctx)
        })
        .collect();

    Step::join(steps, move |results| {
        let mut payload = payload;
        let mut out = IndexMap::with_capacity(names.len());
        for (name, result) in names.iter().zip(results) {
            payload.absorb(result.issues, Some(&PathSegment::field(name.as_str())));
            if !result.value.is_undefined() || input.contains_key(name) {
                out.insert(name.clone(), result.value);
            }
        }

        let unknown: Vec<String> = input
            .keys()
            .filter(|k| !names.contains(k))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            let issue = node.issue(
                IssueKind::UnrecognizedKeys { keys: unknown },
                Value::Object(input),
            );
            payload.push(issue);
        }

        payload.value = Value::Object(out);
        Step::ok(payload)
    })
}

/// A record over an open key type: each own key is validated, then its value.
fn open<'a>(
    node: &'a Node,
    key: &'a Schema,
    value: &'a Schema,
    input: IndexMap<String, Value>,
    payload: ParsePayload,
    ctx: &'a ParseContext,
) -> Step<'a> {
    let steps = input
        .into_iter()
        .filter(|(name, _)| name != "__proto__")
        .map(|(name, raw)| record_entry(node, name, raw, key, value, ctx))
        .collect();

    Step::join(steps, move |entries| {
        let mut payload = payload;
        let mut out = IndexMap::with_capacity(entries.len());
        for entry in entries {
            payload.absorb(entry.issues, None);
            if let Value::Array(mut pair) = entry.value {
                if let (Some(v), Some(k)) = (pair.pop(), pair.pop()) {
                    let name = match k {
                        Value::String(s) => s,
                        other => other.coerce_string().unwrap_or_default(),
                    };
                    out.insert(name, v);
                }
            }
        }
        payload.value = Value::Object(out);
        Step::ok(payload)
    })
}

/// Runs one record entry. The resulting payload carries the entry's issues,
/// already re-based, and a `[key, value]` pair when the key was accepted.
fn record_entry<'a>(
    node: &'a Node,
    name: String,
    raw: Value,
    key: &'a Schema,
    value: &'a Schema,
    ctx: &'a ParseContext,
) -> Step<'a> {
    let key_step = key
        .node()
        .run(ParsePayload::new(Value::String(name.clone())), ctx);

    key_step.then(move |checked| {
        if checked.has_issues() {
            let issue = node
                .issue(
                    IssueKind::InvalidKey {
                        origin: Origin::Record,
                        issues: ctx.finalize(checked.issues),
                    },
                    Value::String(name.clone()),
                )
                .at(JsonPath::from_segments(vec![PathSegment::field(name)]));
            return Step::ok(ParsePayload::with_issues(Value::Undefined, vec![issue]));
        }

        let out_key = checked.value;
        value.node().run(ParsePayload::new(raw), ctx).map(move |result| {
            let segment = PathSegment::field(name);
            let issues = result
                .issues
                .into_iter()
                .map(|i| i.prefixed(segment.clone()))
                .collect();
            Ok(ParsePayload::with_issues(
                Value::Array(vec![out_key, result.value]),
                issues,
            ))
        })
    })
}

pub(super) fn map<'a>(
    node: &'a Node,
    key: &'a Schema,
    value: &'a Schema,
    mut payload: ParsePayload,
    ctx: &'a ParseContext,
) -> Step<'a> {
    let entries = match std::mem::take(&mut payload.value) {
        Value::Map(entries) => entries,
        other => {
            let issue = node.invalid_type("map", other.clone());
            payload.value = other;
            payload.push(issue);
            return Step::ok(payload);
        }
    };

    let mut steps = Vec::with_capacity(entries.len() * 2);
    for (k, v) in &entries {
        steps.push(key.node().run(ParsePayload::new(k.clone()), ctx));
        steps.push(value.node().run(ParsePayload::new(v.clone()), ctx));
    }

    Step::join(steps, move |results| {
        let mut out = Vec::with_capacity(entries.len());
        let mut results = results.into_iter();
        for (raw_key, _) in entries {
            let (Some(k), Some(v)) = (results.next(), results.next()) else {
                break;
            };
            let segment = PathSegment::from_key(&raw_key);

            if k.has_issues() {
                match &segment {
                    Some(segment) => payload.absorb(k.issues, Some(segment)),
                    None => payload.push(entry_issue(
                        node,
                        IssueKind::InvalidKey {
                            origin: Origin::Map,
                            issues: ctx.finalize(k.issues),
                        },
                        &raw_key,
                    )),
                }
            }
            if v.has_issues() {
                match &segment {
                    Some(segment) => payload.absorb(v.issues, Some(segment)),
                    None => payload.push(entry_issue(
                        node,
                        IssueKind::InvalidElement {
                            origin: Origin::Map,
                            key: raw_key.clone(),
                            issues: ctx.finalize(v.issues),
                        },
                        &raw_key,
                    )),
                }
            }
            out.push((k.value, v.value));
        }
        payload.value = Value::Map(out);
        Step::ok(payload)
    })
}

fn entry_issue(node: &Node, kind: IssueKind, key: &Value) -> RawIssue {
    node.issue(kind, key.clone())
}

#[cfg(test)]
mod tests {
    use crate::schema::Schema;
    use crate::value::Value;

    #[test]
    fn test_record_validates_values_under_key() {
        let schema = Schema::record(Schema::string(), Schema::number());
        let input = Value::object([("a", Value::from(1)), ("b", Value::from("x"))]);
        let err = schema.parse(&input).unwrap_err();
        let issue = err.issues().unwrap().first().clone();
        assert_eq!(issue.path.to_string(), "b");
        assert_eq!(issue.code(), "invalid_type");
    }

    #[test]
    fn test_record_key_failure_is_invalid_key() {
        let schema = Schema::record(Schema::string().min_length(2), Schema::number());
        let err = schema.parse(&Value::object([("a", 1)])).unwrap_err();
        let issue = err.issues().unwrap().first().clone();
        assert_eq!(issue.code(), "invalid_key");
        assert_eq!(issue.path.to_string(), "a");
    }

    #[test]
    fn test_record_over_enum_keys_is_exhaustive() {
        let schema = Schema::record(Schema::enumeration(["a", "b"]), Schema::number());
        assert!(schema.parse(&Value::object([("a", 1), ("b", 2)])).is_ok());

        let err = schema.parse(&Value::object([("a", 1)])).unwrap_err();
        assert_eq!(err.issues().unwrap().first().path.to_string(), "b");

        let err = schema
            .parse(&Value::object([("a", 1), ("b", 2), ("c", 3)]))
            .unwrap_err();
        assert_eq!(err.issues().unwrap().first().code(), "unrecognized_keys");
    }

    #[test]
    fn test_map_primitive_keys_prefix_paths() {
        let schema = Schema::map(Schema::string(), Schema::number());
        let input = Value::Map(vec![(Value::from("k"), Value::from("x"))]);
        let err = schema.parse(&input).unwrap_err();
        assert_eq!(err.issues().unwrap().first().path.to_string(), "k");
    }

    #[test]
    fn test_map_object_keys_use_element_issues() {
        let schema = Schema::map(Schema::any(), Schema::number());
        let key = Value::object([("id", 1)]);
        let input = Value::Map(vec![(key, Value::from("x"))]);
        let err = schema.parse(&input).unwrap_err();
        let issue = err.issues().unwrap().first().clone();
        assert_eq!(issue.code(), "invalid_element");
        assert!(issue.path.is_root());
    }
}
