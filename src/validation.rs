//! Execution context and the immediate-or-deferred step type.
//!
//! Every node operation takes a [`ParsePayload`] by value and returns a
//! [`Step`]: either the finished payload or a future that will produce it.
//! Composite nodes fold their children's steps with [`Step::join`], which is
//! the only place where "all ready" and "some pending" are told apart.

use std::future::Future;
use std::sync::Arc;

use futures_util::future::{join_all, BoxFuture};
use futures_util::FutureExt;

use crate::error::{ErrorMap, Issue, RawIssue, SchemaFault};
use crate::path::PathSegment;
use crate::value::Value;

/// Per-call options.
#[derive(Clone, Default)]
pub struct ParseConfig {
    /// Error map consulted after node and check maps, before the global one.
    pub error: Option<ErrorMap>,
}

impl ParseConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_error<F>(mut self, map: F) -> Self
    where
        F: Fn(&RawIssue) -> Option<String> + Send + Sync + 'static,
    {
        self.error = Some(Arc::new(map));
        self
    }
}

impl std::fmt::Debug for ParseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParseConfig")
            .field("error", &self.error.is_some())
            .finish()
    }
}

/// Whether pending operations are permitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Sync,
    Async,
}

/// Read-only context threaded through one validation pass.
#[derive(Clone)]
pub struct ParseContext {
    mode: Mode,
    error: Option<ErrorMap>,
}

impl ParseContext {
    pub fn new(mode: Mode, config: &ParseConfig) -> Self {
        Self {
            mode,
            error: config.error.clone(),
        }
    }

    pub fn sync() -> Self {
        Self::new(Mode::Sync, &ParseConfig::default())
    }

    pub fn asynchronous() -> Self {
        Self::new(Mode::Async, &ParseConfig::default())
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_async(&self) -> bool {
        self.mode == Mode::Async
    }

    pub fn error_map(&self) -> Option<&ErrorMap> {
        self.error.as_ref()
    }

    /// Finalizes raw issues against this context's error map.
    pub fn finalize(&self, issues: Vec<RawIssue>) -> Vec<Issue> {
        issues
            .into_iter()
            .map(|issue| issue.finalize(self.error.as_ref()))
            .collect()
    }

    /// Wraps a user-supplied future. In synchronous mode the future is
    /// dropped unpolled and the step faults with
    /// [`SchemaFault::UnexpectedAsync`].
    pub fn defer<'a, F>(&self, future: F) -> Step<'a>
    where
        F: Future<Output = Parsed> + Send + 'a,
    {
        match self.mode {
            Mode::Async => Step::Pending(future.boxed()),
            Mode::Sync => {
                tracing::warn!("pending operation in synchronous parse");
                Step::fault(SchemaFault::UnexpectedAsync)
            }
        }
    }
}

impl std::fmt::Debug for ParseContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParseContext")
            .field("mode", &self.mode)
            .field("error", &self.error.is_some())
            .finish()
    }
}

/// The `{ value, issues }` carrier of one validation pass.
#[derive(Debug, Clone, Default)]
pub struct ParsePayload {
    pub value: Value,
    pub issues: Vec<RawIssue>,
}

impl ParsePayload {
    pub fn new(value: Value) -> Self {
        Self {
            value,
            issues: Vec::new(),
        }
    }

    /// A payload for `value` that carries `issues` forward.
    pub fn with_issues(value: Value, issues: Vec<RawIssue>) -> Self {
        Self { value, issues }
    }

    pub fn push(&mut self, issue: RawIssue) {
        self.issues.push(issue);
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }

    /// Folds a child's issues into this payload, re-based under `segment`
    /// when one is given.
    pub fn absorb(&mut self, issues: Vec<RawIssue>, segment: Option<&PathSegment>) {
        match segment {
            Some(segment) => self
                .issues
                .extend(issues.into_iter().map(|i| i.prefixed(segment.clone()))),
            None => self.issues.extend(issues),
        }
    }

    /// True when a non-continuable issue exists at or after index `from`.
    pub fn aborted(&self, from: usize) -> bool {
        self.issues
            .iter()
            .skip(from)
            .any(|issue| !issue.continuable)
    }
}

/// Result of running a node: the payload, or a fault that aborts the parse.
pub type Parsed = Result<ParsePayload, SchemaFault>;

/// An immediate or deferred node result.
pub enum Step<'a> {
    Ready(Parsed),
    Pending(BoxFuture<'a, Parsed>),
}

impl<'a> Step<'a> {
    pub fn ok(payload: ParsePayload) -> Self {
        Step::Ready(Ok(payload))
    }

    pub fn fault(fault: SchemaFault) -> Self {
        Step::Ready(Err(fault))
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Step::Ready(_))
    }

    /// Sequences `f` after this step. A fault skips `f`.
    pub fn then<F>(self, f: F) -> Step<'a>
    where
        F: FnOnce(ParsePayload) -> Step<'a> + Send + 'a,
    {
        match self {
            Step::Ready(Ok(payload)) => f(payload),
            Step::Ready(Err(fault)) => Step::fault(fault),
            Step::Pending(future) => Step::Pending(
                async move {
                    let payload = future.await?;
                    f(payload).resolve().await
                }
                .boxed(),
            ),
        }
    }

    /// Like [`then`](Self::then) for a folding function that never defers.
    pub fn map<F>(self, f: F) -> Step<'a>
    where
        F: FnOnce(ParsePayload) -> Parsed + Send + 'a,
    {
        self.then(move |payload| Step::Ready(f(payload)))
    }

    /// Awaits the step.
    pub async fn resolve(self) -> Parsed {
        match self {
            Step::Ready(parsed) => parsed,
            Step::Pending(future) => future.await,
        }
    }

    /// Folds the results of sibling steps.
    ///
    /// `fold` receives the payloads in dispatch order. When every step is
    /// ready it runs immediately; otherwise all steps are awaited
    /// concurrently and `fold` runs once they have all completed. The first
    /// fault in dispatch order wins.
    pub fn join<F>(steps: Vec<Step<'a>>, fold: F) -> Step<'a>
    where
        F: FnOnce(Vec<ParsePayload>) -> Step<'a> + Send + 'a,
    {
        if steps.iter().all(Step::is_ready) {
            let mut payloads = Vec::with_capacity(steps.len());
            for step in steps {
                if let Step::Ready(parsed) = step {
                    match parsed {
                        Ok(payload) => payloads.push(payload),
                        Err(fault) => return Step::fault(fault),
                    }
                }
            }
            return fold(payloads);
        }

        Step::Pending(
            async move {
                let results = join_all(steps.into_iter().map(Step::resolve)).await;
                let payloads = results.into_iter().collect::<Result<Vec<_>, _>>()?;
                fold(payloads).resolve().await
            }
            .boxed(),
        )
    }
}

impl std::fmt::Debug for Step<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Step::Ready(parsed) => f.debug_tuple("Ready").field(parsed).finish(),
            Step::Pending(_) => f.write_str("Pending(..)"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::IssueKind;

    fn ready(n: i32) -> Step<'static> {
        Step::ok(ParsePayload::new(Value::from(n)))
    }

    fn pending(n: i32) -> Step<'static> {
        Step::Pending(async move { Ok(ParsePayload::new(Value::from(n))) }.boxed())
    }

    fn values(payloads: Vec<ParsePayload>) -> Step<'static> {
        Step::ok(ParsePayload::new(Value::Array(
            payloads.into_iter().map(|p| p.value).collect(),
        )))
    }

    #[test]
    fn test_join_ready_folds_immediately() {
        let step = Step::join(vec![ready(1), ready(2)], values);
        match step {
            Step::Ready(Ok(payload)) => {
                assert_eq!(payload.value, Value::Array(vec![Value::from(1), Value::from(2)]))
            }
            other => panic!("expected ready, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_join_pending_keeps_dispatch_order() {
        let step = Step::join(vec![pending(1), ready(2), pending(3)], values);
        assert!(!step.is_ready());

        let payload = step.resolve().await.unwrap();
        assert_eq!(
            payload.value,
            Value::Array(vec![Value::from(1), Value::from(2), Value::from(3)])
        );
    }

    #[test]
    fn test_join_propagates_fault() {
        let step = Step::join(
            vec![ready(1), Step::fault(SchemaFault::UnexpectedAsync)],
            values,
        );
        assert!(matches!(step, Step::Ready(Err(SchemaFault::UnexpectedAsync))));
    }

    #[test]
    fn test_sync_context_rejects_deferred_work() {
        let ctx = ParseContext::sync();
        let step = ctx.defer(async { Ok(ParsePayload::default()) });
        assert!(matches!(step, Step::Ready(Err(SchemaFault::UnexpectedAsync))));
    }

    #[test]
    fn test_aborted_only_counts_fatal_issues_after_index() {
        let mut payload = ParsePayload::new(Value::Null);
        payload.push(RawIssue::new(IssueKind::invalid_type("string"), Value::Null));
        payload.push(RawIssue::custom(Value::Null, "soft").continuable(true));

        assert!(payload.aborted(0));
        assert!(!payload.aborted(1));
    }
}
