//! Refinement checks attached to nodes.
//!
//! A check runs after the node's own type validation. It may push issues,
//! rewrite the payload value, or hand back a pending operation. The runner
//! in this module enforces the abort rules: an ungated check is skipped once
//! a non-continuable issue has been raised since the last check that added
//! issues, while a gated check runs whenever its `when` predicate holds.

mod builtin;
mod format;

use std::sync::Arc;

use futures_util::future::{join_all, BoxFuture};

pub use builtin::{
    Compare, Comparison, LengthCheck, LengthKind, MultipleOf, NumberFormat, NumberFormatKind,
    Overwrite, Refine, StringCheck, StringCheckKind, SuperRefine,
};
pub use format::{FormatCheck, StringFormat};

use crate::error::{ErrorMap, RawIssue, SchemaFault};
use crate::schema::Computed;
use crate::validation::{ParseContext, ParsePayload, Step};

/// Outcome of running one check.
pub enum CheckStep {
    Done,
    /// Issues that will be appended once the operation completes.
    Pending(BoxFuture<'static, Vec<RawIssue>>),
}

/// A refinement unit attachable to a node.
pub trait Check: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    fn check(&self, payload: &mut ParsePayload) -> CheckStep;

    /// Gating predicate. `None` means ungated.
    fn when(&self, _payload: &ParsePayload) -> Option<bool> {
        None
    }

    /// Called once while the owning node is being built.
    fn on_attach(&self, _computed: &mut Computed) {}
}

/// Options shared by the built-in checks.
#[derive(Debug, Clone, Default)]
pub struct CheckParams {
    /// Explicit message for issues raised by the check.
    pub message: Option<String>,
    /// Marks raised issues as non-continuable.
    pub abort: bool,
}

impl CheckParams {
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            abort: false,
        }
    }

    pub fn abort(mut self) -> Self {
        self.abort = true;
        self
    }

    pub(crate) fn apply(&self, issue: RawIssue) -> RawIssue {
        let issue = issue.continuable(!self.abort);
        match &self.message {
            Some(message) if issue.message.is_none() => issue.with_message(message.clone()),
            _ => issue,
        }
    }
}

/// Overrides the message of every issue raised by the wrapped check.
pub(crate) struct Messaged {
    inner: Arc<dyn Check>,
    message: String,
}

impl Messaged {
    pub(crate) fn new(inner: Arc<dyn Check>, message: String) -> Self {
        Self { inner, message }
    }
}

impl Check for Messaged {
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    fn check(&self, payload: &mut ParsePayload) -> CheckStep {
        let before = payload.issues.len();
        match self.inner.check(payload) {
            CheckStep::Done => {
                for issue in &mut payload.issues[before..] {
                    issue.message = Some(self.message.clone());
                }
                CheckStep::Done
            }
            CheckStep::Pending(future) => {
                let message = self.message.clone();
                CheckStep::Pending(Box::pin(async move {
                    future
                        .await
                        .into_iter()
                        .map(|issue| issue.with_message(message.clone()))
                        .collect()
                }))
            }
        }
    }

    fn when(&self, payload: &ParsePayload) -> Option<bool> {
        self.inner.when(payload)
    }

    fn on_attach(&self, computed: &mut Computed) {
        self.inner.on_attach(computed)
    }
}

/// Runs `checks` in order against a payload that has already been parsed.
///
/// Issues raised by a check without an error map of their own pick up
/// `error`, the map of the owning node.
pub(crate) fn run_checks<'a>(
    checks: &'a [Arc<dyn Check>],
    mut payload: ParsePayload,
    ctx: &'a ParseContext,
    error: Option<&ErrorMap>,
) -> Step<'a> {
    let mut aborted = payload.aborted(0);
    let mut pending = Vec::new();

    for check in checks {
        match check.when(&payload) {
            Some(false) => continue,
            Some(true) => {}
            None if aborted => continue,
            None => {}
        }

        let before = payload.issues.len();
        match check.check(&mut payload) {
            CheckStep::Done => {}
            CheckStep::Pending(future) => {
                if !ctx.is_async() {
                    tracing::warn!(check = check.name(), "async check in synchronous parse");
                    return Step::fault(SchemaFault::UnexpectedAsync);
                }
                pending.push(future);
                continue;
            }
        }

        if payload.issues.len() > before {
            for issue in &mut payload.issues[before..] {
                if issue.error_map.is_none() {
                    issue.error_map = error.cloned();
                }
            }
            if !aborted {
                aborted = payload.aborted(before);
            }
        }
    }

    if pending.is_empty() {
        return Step::ok(payload);
    }

    let error = error.cloned();
    ctx.defer(async move {
        for issues in join_all(pending).await {
            payload.issues.extend(
                issues
                    .into_iter()
                    .map(|issue| issue.with_error_map(error.as_ref())),
            );
        }
        Ok(payload)
    })
}
