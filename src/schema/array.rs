//! Sequence kinds: array, tuple and set.
//!
//! Elements are validated independently and every element issue is kept,
//! so one pass reports all bad positions. Array and tuple issues are
//! re-based under the element index; set members have no stable position
//! and report at the set itself.

use super::node::Node;
use super::Schema;
use crate::error::{IssueKind, Origin};
use crate::path::PathSegment;
use crate::validation::{ParseContext, ParsePayload, Step};
use crate::value::Value;

/// Validates every item of an array against `element`.
///
/// Non-array input raises a single `invalid_type` issue at the array's own
/// path. Otherwise each item's issues are prefixed with its index, and the
/// output keeps the items' (possibly transformed) values in input order.
pub(super) fn array<'a>(
    node: &'a Node,
    element: &'a Schema,
    mut payload: ParsePayload,
    ctx: &'a ParseContext,
) -> Step<'a> {
    let items = match std::mem::take(&mut payload.value) {
        Value::Array(items) => items,
        other => {
            let issue = node.invalid_type("array", other.clone());
            payload.value = other;
            payload.push(issue);
            return Step::ok(payload);
        }
    };

    let steps = items
        .into_iter()
        .map(|item| element.node().run(ParsePayload::new(item), ctx))
        .collect();

    Step::join(steps, move |results| {
        let mut out = Vec::with_capacity(results.len());
        for (index, result) in results.into_iter().enumerate() {
            payload.absorb(result.issues, Some(&PathSegment::index(index)));
            out.push(result.value);
        }
        payload.value = Value::Array(out);
        Step::ok(payload)
    })
}

/// Validates a tuple position by position.
///
/// Without `rest`, the input length must lie between the count of required
/// positions and `items.len()`. A length mismatch raises `too_small` or
/// `too_big` and skips item validation. Trailing positions whose node is
/// optional on output may be left out. With `rest`, no length issue is
/// raised: missing positions fail their own node and extra items are
/// checked against `rest`.
pub(super) fn tuple<'a>(
    node: &'a Node,
    items: &'a [Schema],
    rest: Option<&'a Schema>,
    mut payload: ParsePayload,
    ctx: &'a ParseContext,
) -> Step<'a> {
    let input = match std::mem::take(&mut payload.value) {
        Value::Array(input) => input,
        other => {
            let issue = node.invalid_type("tuple", other.clone());
            payload.value = other;
            payload.push(issue);
            return Step::ok(payload);
        }
    };

    // Positions from `required` onwards may be left out.
    let required = items
        .iter()
        .rposition(|item| !item.node().optionality().output)
        .map_or(0, |i| i + 1);

    if rest.is_none() {
        let bound = if input.len() > items.len() {
            Some(IssueKind::TooBig {
                origin: Origin::Array,
                maximum: Value::from(items.len() as f64),
                inclusive: true,
                exact: false,
            })
        } else if input.len() < required {
            Some(IssueKind::TooSmall {
                origin: Origin::Array,
                minimum: Value::from(required as f64),
                inclusive: true,
                exact: false,
            })
        } else {
            None
        };
        if let Some(kind) = bound {
            let issue = node.issue(kind, Value::Array(input.clone()));
            payload.value = Value::Array(input);
            payload.push(issue);
            return Step::ok(payload);
        }
    }

    let mut steps = Vec::with_capacity(input.len().max(items.len()));
    for (index, item) in items.iter().enumerate() {
        if index >= input.len() && index >= required {
            break;
        }
        let value = input.get(index).cloned().unwrap_or_default();
        steps.push(item.node().run(ParsePayload::new(value), ctx));
    }
    if let Some(rest) = rest {
        for value in input.iter().skip(items.len()) {
            steps.push(rest.node().run(ParsePayload::new(value.clone()), ctx));
        }
    }

    Step::join(steps, move |results| {
        let mut out = Vec::with_capacity(results.len());
        for (index, result) in results.into_iter().enumerate() {
            payload.absorb(result.issues, Some(&PathSegment::index(index)));
            out.push(result.value);
        }
        payload.value = Value::Array(out);
        Step::ok(payload)
    })
}

/// Validates every member of a set against `member`.
///
/// Member issues keep the set's own path.
pub(super) fn set<'a>(
    node: &'a Node,
    member: &'a Schema,
    mut payload: ParsePayload,
    ctx: &'a ParseContext,
) -> Step<'a> {
    let members = match std::mem::take(&mut payload.value) {
        Value::Set(members) => members,
        other => {
            let issue = node.invalid_type("set", other.clone());
            payload.value = other;
            payload.push(issue);
            return Step::ok(payload);
        }
    };

    let steps = members
        .into_iter()
        .map(|m| member.node().run(ParsePayload::new(m), ctx))
        .collect();

    Step::join(steps, move |results| {
        let mut out = Vec::with_capacity(results.len());
        for result in results {
            payload.absorb(result.issues, None);
            out.push(result.value);
        }
        payload.value = Value::Set(out);
        Step::ok(payload)
    })
}
