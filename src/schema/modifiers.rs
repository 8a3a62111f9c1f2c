//! Single-child wrappers that alter short-circuiting, substitution and
//! sequencing around an inner node.

use super::kind::{CatchFn, CatchInput, DefaultFn, TransformFn};
use super::node::Node;
use super::Schema;
use crate::error::SchemaFault;
use crate::validation::{ParseContext, ParsePayload, Step};
use crate::value::Value;

pub(super) fn optional<'a>(inner: &'a Schema, payload: ParsePayload, ctx: &'a ParseContext) -> Step<'a> {
    if payload.value.is_undefined() {
        return Step::ok(payload);
    }
    inner.node().run(payload, ctx)
}

pub(super) fn nullable<'a>(inner: &'a Schema, payload: ParsePayload, ctx: &'a ParseContext) -> Step<'a> {
    if payload.value.is_null() {
        return Step::ok(payload);
    }
    inner.node().run(payload, ctx)
}

/// Substitutes the default for `undefined` without validating it.
pub(super) fn default<'a>(
    inner: &'a Schema,
    value: &'a DefaultFn,
    mut payload: ParsePayload,
    ctx: &'a ParseContext,
) -> Step<'a> {
    if payload.value.is_undefined() {
        payload.value = value();
        return Step::ok(payload);
    }
    inner.node().run(payload, ctx).map(move |mut payload| {
        if payload.value.is_undefined() {
            payload.value = value();
        }
        Ok(payload)
    })
}

/// Substitutes the default for `undefined`, then validates it.
pub(super) fn prefault<'a>(
    inner: &'a Schema,
    value: &'a DefaultFn,
    mut payload: ParsePayload,
    ctx: &'a ParseContext,
) -> Step<'a> {
    if payload.value.is_undefined() {
        payload.value = value();
    }
    inner.node().run(payload, ctx)
}

pub(super) fn nonoptional<'a>(
    node: &'a Node,
    inner: &'a Schema,
    payload: ParsePayload,
    ctx: &'a ParseContext,
) -> Step<'a> {
    inner.node().run(payload, ctx).map(move |mut payload| {
        if !payload.has_issues() && payload.value.is_undefined() {
            let issue = node.invalid_type("nonoptional", Value::Undefined);
            payload.push(issue);
        }
        Ok(payload)
    })
}

/// Recovers from any inner failure with the catch value. All issues are
/// dropped, including ones raised before this node.
pub(super) fn catch<'a>(
    inner: &'a Schema,
    value: &'a CatchFn,
    payload: ParsePayload,
    ctx: &'a ParseContext,
) -> Step<'a> {
    let input = payload.value.clone();
    inner.node().run(payload, ctx).map(move |mut payload| {
        if payload.has_issues() {
            let caught = CatchInput {
                input,
                issues: ctx.finalize(std::mem::take(&mut payload.issues)),
            };
            tracing::debug!(issues = caught.issues.len(), "catch recovered from failure");
            payload.value = value(&caught);
        }
        Ok(payload)
    })
}

/// Runs `output` on the result of `input` unless `input` aborted.
pub(super) fn pipe<'a>(
    input: &'a Schema,
    output: &'a Schema,
    payload: ParsePayload,
    ctx: &'a ParseContext,
) -> Step<'a> {
    input.node().run(payload, ctx).then(move |payload| {
        if payload.aborted(0) {
            return Step::ok(payload);
        }
        output.node().run(payload, ctx)
    })
}

pub(super) fn transform<'a>(func: &'a TransformFn, mut payload: ParsePayload, ctx: &'a ParseContext) -> Step<'a> {
    match func {
        TransformFn::Sync(f) => match f(std::mem::take(&mut payload.value)) {
            Ok(value) => {
                payload.value = value;
                Step::ok(payload)
            }
            Err(source) => Step::fault(SchemaFault::callback(source)),
        },
        TransformFn::Async(f) => {
            if !ctx.is_async() {
                tracing::warn!("async transform in synchronous parse");
                return Step::fault(SchemaFault::UnexpectedAsync);
            }
            let future = f(payload.value.clone());
            ctx.defer(async move {
                payload.value = future.await.map_err(SchemaFault::callback)?;
                Ok(payload)
            })
        }
    }
}

/// Reports whether the inner node accepted, as a boolean output.
pub(super) fn success<'a>(inner: &'a Schema, payload: ParsePayload, ctx: &'a ParseContext) -> Step<'a> {
    inner.node().run(payload, ctx).map(|mut payload| {
        payload.value = Value::Bool(!payload.has_issues());
        payload.issues.clear();
        Ok(payload)
    })
}

/// Always deferred: validates the settled value with the inner node.
pub(super) fn promise<'a>(inner: &'a Schema, payload: ParsePayload, ctx: &'a ParseContext) -> Step<'a> {
    ctx.defer(async move { inner.node().run(payload, ctx).resolve().await })
}

#[cfg(test)]
mod tests {
    use crate::schema::Schema;
    use crate::value::Value;

    #[test]
    fn test_optional_passes_undefined_without_inner() {
        let schema = Schema::never().optional();
        assert_eq!(schema.parse(&Value::Undefined).unwrap(), Value::Undefined);
    }

    #[test]
    fn test_nullable_passes_null() {
        let schema = Schema::string().nullable();
        assert_eq!(schema.parse(&Value::Null).unwrap(), Value::Null);
        assert!(schema.parse(&Value::Undefined).is_err());
    }

    #[test]
    fn test_default_is_not_validated() {
        let schema = Schema::string().min_length(10).default(Value::from("short"));
        assert_eq!(schema.parse(&Value::Undefined).unwrap(), Value::from("short"));
    }

    #[test]
    fn test_prefault_is_validated() {
        let schema = Schema::string().min_length(10).prefault(Value::from("short"));
        assert!(schema.parse(&Value::Undefined).is_err());
    }

    #[test]
    fn test_nonoptional_rejects_undefined() {
        let schema = Schema::string().optional().nonoptional();
        let err = schema.parse(&Value::Undefined).unwrap_err();
        let issue = err.issues().unwrap().first().clone();
        assert_eq!(issue.message, "Invalid input: expected nonoptional, received undefined");
    }

    #[test]
    fn test_catch_replaces_failure() {
        let schema = Schema::number().catch(Value::from(0));
        assert_eq!(schema.parse(&Value::from("x")).unwrap(), Value::from(0));
        assert_eq!(schema.parse(&Value::from(5)).unwrap(), Value::from(5));
    }

    #[test]
    fn test_catch_with_sees_input_and_issues() {
        let schema = Schema::number().catch_with(|caught| {
            Value::from(format!("{}:{}", caught.input, caught.issues.len()))
        });
        assert_eq!(schema.parse(&Value::Bool(true)).unwrap(), Value::from("true:1"));
    }

    #[test]
    fn test_pipe_stops_after_fatal_issue() {
        let schema = Schema::string().pipe(Schema::string().min_length(3));
        let err = schema.parse(&Value::from(1)).unwrap_err();
        assert_eq!(err.issues().unwrap().len(), 1);
    }

    #[test]
    fn test_pipe_carries_continuable_issues() {
        let schema = Schema::string()
            .min_length(5)
            .pipe(Schema::string().max_length(1));
        let err = schema.parse(&Value::from("abc")).unwrap_err();
        let codes: Vec<&str> = err.issues().unwrap().iter().map(|i| i.code()).collect();
        assert_eq!(codes, vec!["too_small", "too_big"]);
    }

    #[test]
    fn test_transform_error_is_fault() {
        let schema = Schema::string().transform(|_| Err("boom".into()));
        let err = schema.parse(&Value::from("a")).unwrap_err();
        assert!(err.is_fault());
    }

    #[test]
    fn test_success_reports_acceptance() {
        let schema = Schema::string().success();
        assert_eq!(schema.parse(&Value::from("a")).unwrap(), Value::Bool(true));
        assert_eq!(schema.parse(&Value::from(1)).unwrap(), Value::Bool(false));
    }

    #[test]
    fn test_promise_faults_in_sync_parse() {
        let err = Schema::promise(Schema::string())
            .parse(&Value::from("a"))
            .unwrap_err();
        assert!(err.is_fault());
    }
}
