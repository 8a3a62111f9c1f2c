//! Built-in checks: sizes, numeric bounds, string content, overwrites and
//! custom refinements.

use std::cmp::Ordering;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use regex::Regex;

use super::{Check, CheckParams, CheckStep};
use crate::error::{IssueKind, Origin, RawIssue};
use crate::path::JsonPath;
use crate::schema::Computed;
use crate::validation::ParsePayload;
use crate::value::Value;

const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LengthKind {
    Min,
    Max,
    Exact,
}

/// Length of strings and arrays, size of sets and maps.
pub struct LengthCheck {
    kind: LengthKind,
    bound: usize,
    params: CheckParams,
}

impl LengthCheck {
    pub fn new(kind: LengthKind, bound: usize, params: CheckParams) -> Self {
        Self {
            kind,
            bound,
            params,
        }
    }
}

fn measure(value: &Value) -> Option<(usize, Origin)> {
    match value {
        Value::String(s) => Some((s.chars().count(), Origin::String)),
        Value::Array(items) => Some((items.len(), Origin::Array)),
        Value::Set(items) => Some((items.len(), Origin::Set)),
        Value::Map(entries) => Some((entries.len(), Origin::Map)),
        _ => None,
    }
}

impl Check for LengthCheck {
    fn name(&self) -> &'static str {
        match self.kind {
            LengthKind::Min => "min_length",
            LengthKind::Max => "max_length",
            LengthKind::Exact => "length_equals",
        }
    }

    fn check(&self, payload: &mut ParsePayload) -> CheckStep {
        let Some((len, origin)) = measure(&payload.value) else {
            return CheckStep::Done;
        };
        let bound = Value::Number(self.bound as f64);
        let exact = self.kind == LengthKind::Exact;

        let kind = match self.kind {
            LengthKind::Min | LengthKind::Exact if len < self.bound => IssueKind::TooSmall {
                origin,
                minimum: bound,
                inclusive: true,
                exact,
            },
            LengthKind::Max | LengthKind::Exact if len > self.bound => IssueKind::TooBig {
                origin,
                maximum: bound,
                inclusive: true,
                exact,
            },
            _ => return CheckStep::Done,
        };

        let input = payload.value.clone();
        payload.push(self.params.apply(RawIssue::new(kind, input)));
        CheckStep::Done
    }

    fn when(&self, payload: &ParsePayload) -> Option<bool> {
        Some(measure(&payload.value).is_some())
    }

    fn on_attach(&self, computed: &mut Computed) {
        match self.kind {
            LengthKind::Min => {
                computed.min_length = Some(computed.min_length.map_or(self.bound, |m| m.max(self.bound)))
            }
            LengthKind::Max => {
                computed.max_length = Some(computed.max_length.map_or(self.bound, |m| m.min(self.bound)))
            }
            LengthKind::Exact => {
                computed.min_length = Some(self.bound);
                computed.max_length = Some(self.bound);
            }
        }
    }
}

/// Numeric comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Gt,
    Gte,
    Lt,
    Lte,
}

/// Bounds on numbers, big integers and dates.
pub struct Compare {
    op: Comparison,
    bound: Value,
    params: CheckParams,
}

impl Compare {
    pub fn new(op: Comparison, bound: impl Into<Value>, params: CheckParams) -> Self {
        Self {
            op,
            bound: bound.into(),
            params,
        }
    }
}

fn compare(value: &Value, bound: &Value) -> Option<(Ordering, Origin)> {
    match (value, bound) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b).map(|o| (o, Origin::Number)),
        (Value::BigInt(a), Value::BigInt(b)) => Some((a.cmp(b), Origin::BigInt)),
        (Value::BigInt(a), Value::Number(b)) => (*a as f64).partial_cmp(b).map(|o| (o, Origin::BigInt)),
        (Value::Date(a), Value::Date(b)) => Some((a.cmp(b), Origin::Date)),
        _ => None,
    }
}

impl Check for Compare {
    fn name(&self) -> &'static str {
        match self.op {
            Comparison::Gt | Comparison::Gte => "greater_than",
            Comparison::Lt | Comparison::Lte => "less_than",
        }
    }

    fn check(&self, payload: &mut ParsePayload) -> CheckStep {
        let Some((ordering, origin)) = compare(&payload.value, &self.bound) else {
            return CheckStep::Done;
        };
        let ok = match self.op {
            Comparison::Gt => ordering == Ordering::Greater,
            Comparison::Gte => ordering != Ordering::Less,
            Comparison::Lt => ordering == Ordering::Less,
            Comparison::Lte => ordering != Ordering::Greater,
        };
        if ok {
            return CheckStep::Done;
        }

        let kind = match self.op {
            Comparison::Gt | Comparison::Gte => IssueKind::TooSmall {
                origin,
                minimum: self.bound.clone(),
                inclusive: self.op == Comparison::Gte,
                exact: false,
            },
            Comparison::Lt | Comparison::Lte => IssueKind::TooBig {
                origin,
                maximum: self.bound.clone(),
                inclusive: self.op == Comparison::Lte,
                exact: false,
            },
        };
        let input = payload.value.clone();
        payload.push(self.params.apply(RawIssue::new(kind, input)));
        CheckStep::Done
    }

    fn on_attach(&self, computed: &mut Computed) {
        match self.op {
            Comparison::Gt | Comparison::Gte => computed.minimum = Some(self.bound.clone()),
            Comparison::Lt | Comparison::Lte => computed.maximum = Some(self.bound.clone()),
        }
    }
}

/// Divisibility of numbers and big integers.
pub struct MultipleOf {
    divisor: Value,
    params: CheckParams,
}

impl MultipleOf {
    pub fn new(divisor: impl Into<Value>, params: CheckParams) -> Self {
        Self {
            divisor: divisor.into(),
            params,
        }
    }
}

fn decimals(n: f64) -> i32 {
    n.to_string()
        .split('.')
        .nth(1)
        .map_or(0, |frac| frac.len().min(15) as i32)
}

/// Remainder that tolerates binary floating point, e.g. `0.3 % 0.1 == 0`.
fn float_safe_remainder(value: f64, step: f64) -> f64 {
    let scale = 10f64.powi(decimals(value).max(decimals(step)));
    let value_int = (value * scale).round();
    let step_int = (step * scale).round();
    if step_int == 0.0 {
        return f64::NAN;
    }
    (value_int % step_int) / scale
}

impl Check for MultipleOf {
    fn name(&self) -> &'static str {
        "multiple_of"
    }

    fn check(&self, payload: &mut ParsePayload) -> CheckStep {
        let divisible = match (&payload.value, &self.divisor) {
            (Value::Number(n), Value::Number(d)) => float_safe_remainder(*n, *d) == 0.0,
            (Value::BigInt(n), Value::BigInt(d)) => *d != 0 && n % d == 0,
            _ => return CheckStep::Done,
        };
        if !divisible {
            let issue = RawIssue::new(
                IssueKind::NotMultipleOf {
                    divisor: self.divisor.clone(),
                },
                payload.value.clone(),
            );
            payload.push(self.params.apply(issue));
        }
        CheckStep::Done
    }
}

/// Integer formats for numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberFormatKind {
    /// Integers within the safe range.
    SafeInt,
    Int32,
    Uint32,
}

impl NumberFormatKind {
    pub fn name(&self) -> &'static str {
        match self {
            NumberFormatKind::SafeInt => "safeint",
            NumberFormatKind::Int32 => "int32",
            NumberFormatKind::Uint32 => "uint32",
        }
    }

    fn range(&self) -> (f64, f64) {
        match self {
            NumberFormatKind::SafeInt => (-MAX_SAFE_INTEGER, MAX_SAFE_INTEGER),
            NumberFormatKind::Int32 => (f64::from(i32::MIN), f64::from(i32::MAX)),
            NumberFormatKind::Uint32 => (0.0, f64::from(u32::MAX)),
        }
    }
}

pub struct NumberFormat {
    kind: NumberFormatKind,
    params: CheckParams,
}

impl NumberFormat {
    pub fn new(kind: NumberFormatKind, params: CheckParams) -> Self {
        Self { kind, params }
    }
}

impl Check for NumberFormat {
    fn name(&self) -> &'static str {
        self.kind.name()
    }

    fn check(&self, payload: &mut ParsePayload) -> CheckStep {
        let Value::Number(n) = payload.value else {
            return CheckStep::Done;
        };

        if n.fract() != 0.0 {
            let issue = RawIssue::new(IssueKind::invalid_type("int"), payload.value.clone());
            payload.push(self.params.apply(issue).continuable(false));
            return CheckStep::Done;
        }

        let (min, max) = self.kind.range();
        let kind = if n < min {
            IssueKind::TooSmall {
                origin: Origin::Number,
                minimum: Value::Number(min),
                inclusive: true,
                exact: false,
            }
        } else if n > max {
            IssueKind::TooBig {
                origin: Origin::Number,
                maximum: Value::Number(max),
                inclusive: true,
                exact: false,
            }
        } else {
            return CheckStep::Done;
        };
        let input = payload.value.clone();
        payload.push(self.params.apply(RawIssue::new(kind, input)));
        CheckStep::Done
    }

    fn on_attach(&self, computed: &mut Computed) {
        let (min, max) = self.kind.range();
        computed.format = Some(self.kind.name().to_string());
        computed.minimum = Some(Value::Number(min));
        computed.maximum = Some(Value::Number(max));
    }
}

/// String content tests.
#[derive(Debug, Clone)]
pub enum StringCheckKind {
    Regex(Regex),
    Includes(String),
    StartsWith(String),
    EndsWith(String),
    Lowercase,
    Uppercase,
}

pub struct StringCheck {
    kind: StringCheckKind,
    params: CheckParams,
}

impl StringCheck {
    pub fn new(kind: StringCheckKind, params: CheckParams) -> Self {
        Self { kind, params }
    }

    fn accepts(&self, s: &str) -> bool {
        match &self.kind {
            StringCheckKind::Regex(re) => re.is_match(s),
            StringCheckKind::Includes(needle) => s.contains(needle.as_str()),
            StringCheckKind::StartsWith(prefix) => s.starts_with(prefix.as_str()),
            StringCheckKind::EndsWith(suffix) => s.ends_with(suffix.as_str()),
            StringCheckKind::Lowercase => !s.chars().any(char::is_uppercase),
            StringCheckKind::Uppercase => !s.chars().any(char::is_lowercase),
        }
    }

    fn pattern(&self) -> Option<String> {
        match &self.kind {
            StringCheckKind::Regex(re) => Some(re.as_str().to_string()),
            StringCheckKind::Includes(s)
            | StringCheckKind::StartsWith(s)
            | StringCheckKind::EndsWith(s) => Some(s.clone()),
            StringCheckKind::Lowercase | StringCheckKind::Uppercase => None,
        }
    }

    fn as_regex(&self) -> Option<Regex> {
        let source = match &self.kind {
            StringCheckKind::Regex(re) => return Some(re.clone()),
            StringCheckKind::Includes(s) => format!("^[\\s\\S]*{}[\\s\\S]*$", regex::escape(s)),
            StringCheckKind::StartsWith(s) => format!("^{}[\\s\\S]*$", regex::escape(s)),
            StringCheckKind::EndsWith(s) => format!("^[\\s\\S]*{}$", regex::escape(s)),
            StringCheckKind::Lowercase => r"^[^\p{Lu}]*$".to_string(),
            StringCheckKind::Uppercase => r"^[^\p{Ll}]*$".to_string(),
        };
        Regex::new(&source).ok()
    }
}

impl Check for StringCheck {
    fn name(&self) -> &'static str {
        match self.kind {
            StringCheckKind::Regex(_) => "regex",
            StringCheckKind::Includes(_) => "includes",
            StringCheckKind::StartsWith(_) => "starts_with",
            StringCheckKind::EndsWith(_) => "ends_with",
            StringCheckKind::Lowercase => "lowercase",
            StringCheckKind::Uppercase => "uppercase",
        }
    }

    fn check(&self, payload: &mut ParsePayload) -> CheckStep {
        if let Value::String(s) = &payload.value {
            if !self.accepts(s) {
                let issue = RawIssue::new(
                    IssueKind::InvalidFormat {
                        format: self.name().to_string(),
                        pattern: self.pattern(),
                    },
                    payload.value.clone(),
                );
                payload.push(self.params.apply(issue));
            }
        }
        CheckStep::Done
    }

    fn on_attach(&self, computed: &mut Computed) {
        if let Some(re) = self.as_regex() {
            computed.patterns.push(re);
        }
    }
}

type OverwriteFn = Arc<dyn Fn(Value) -> Value + Send + Sync>;

/// Rewrites the value. Never raises issues.
#[derive(Clone)]
pub struct Overwrite {
    name: &'static str,
    f: OverwriteFn,
}

impl Overwrite {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        Self {
            name: "overwrite",
            f: Arc::new(f),
        }
    }

    fn on_strings(name: &'static str, f: fn(&str) -> String) -> Self {
        Self {
            name,
            f: Arc::new(move |value| match value {
                Value::String(s) => Value::String(f(&s)),
                other => other,
            }),
        }
    }

    pub fn trim() -> Self {
        Self::on_strings("trim", |s| s.trim().to_string())
    }

    pub fn to_lower_case() -> Self {
        Self::on_strings("to_lower_case", str::to_lowercase)
    }

    pub fn to_upper_case() -> Self {
        Self::on_strings("to_upper_case", str::to_uppercase)
    }
}

impl Check for Overwrite {
    fn name(&self) -> &'static str {
        self.name
    }

    fn check(&self, payload: &mut ParsePayload) -> CheckStep {
        let value = std::mem::take(&mut payload.value);
        payload.value = (self.f)(value);
        CheckStep::Done
    }
}

type SyncPredicate = Arc<dyn Fn(&Value) -> bool + Send + Sync>;
type AsyncPredicate = Arc<dyn Fn(Value) -> BoxFuture<'static, bool> + Send + Sync>;
type WhenFn = Arc<dyn Fn(&ParsePayload) -> bool + Send + Sync>;

#[derive(Clone)]
enum Predicate {
    Sync(SyncPredicate),
    Async(AsyncPredicate),
}

/// A custom predicate raising a `custom` issue when it returns false.
///
/// # Example
///
/// ```rust
/// use inquest::{Schema, Value};
/// use inquest::check::Refine;
///
/// let even = Schema::number().check(
///     Refine::new(|v| v.as_f64().is_some_and(|n| n % 2.0 == 0.0)).message("must be even"),
/// );
///
/// assert!(even.parse(&Value::from(4)).is_ok());
/// let err = even.parse(&Value::from(3)).unwrap_err();
/// assert_eq!(err.issues().unwrap().first().message, "must be even");
/// ```
#[derive(Clone)]
pub struct Refine {
    predicate: Predicate,
    params: CheckParams,
    path: JsonPath,
    when: Option<WhenFn>,
}

impl Refine {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self::with_predicate(Predicate::Sync(Arc::new(f)))
    }

    /// A refinement that resolves asynchronously. Only usable from the async
    /// entry points.
    pub fn new_async<F>(f: F) -> Self
    where
        F: Fn(Value) -> BoxFuture<'static, bool> + Send + Sync + 'static,
    {
        Self::with_predicate(Predicate::Async(Arc::new(f)))
    }

    fn with_predicate(predicate: Predicate) -> Self {
        Self {
            predicate,
            params: CheckParams::default(),
            path: JsonPath::root(),
            when: None,
        }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.params.message = Some(message.into());
        self
    }

    pub fn abort(mut self) -> Self {
        self.params.abort = true;
        self
    }

    /// Reports the issue at `path` relative to the refined value.
    pub fn path(mut self, path: JsonPath) -> Self {
        self.path = path;
        self
    }

    /// Runs the refinement whenever `f` holds, even after earlier failures.
    pub fn when<F>(mut self, f: F) -> Self
    where
        F: Fn(&ParsePayload) -> bool + Send + Sync + 'static,
    {
        self.when = Some(Arc::new(f));
        self
    }

    fn issue(&self, input: Value) -> RawIssue {
        self.params.apply(
            RawIssue::new(IssueKind::Custom { params: None }, input).at(self.path.clone()),
        )
    }
}

impl Check for Refine {
    fn name(&self) -> &'static str {
        "custom"
    }

    fn check(&self, payload: &mut ParsePayload) -> CheckStep {
        match &self.predicate {
            Predicate::Sync(f) => {
                if !f(&payload.value) {
                    let issue = self.issue(payload.value.clone());
                    payload.push(issue);
                }
                CheckStep::Done
            }
            Predicate::Async(f) => {
                let pending = f(payload.value.clone());
                let issue = self.issue(payload.value.clone());
                CheckStep::Pending(
                    async move {
                        if pending.await {
                            Vec::new()
                        } else {
                            vec![issue]
                        }
                    }
                    .boxed(),
                )
            }
        }
    }

    fn when(&self, payload: &ParsePayload) -> Option<bool> {
        self.when.as_ref().map(|f| f(payload))
    }
}

type SuperRefineFn = Arc<dyn Fn(&Value, &mut Vec<RawIssue>) + Send + Sync>;

/// A refinement that pushes any number of issues itself.
///
/// Pushed issues are continuable unless the refinement is marked `abort`.
#[derive(Clone)]
pub struct SuperRefine {
    f: SuperRefineFn,
    params: CheckParams,
}

impl SuperRefine {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value, &mut Vec<RawIssue>) + Send + Sync + 'static,
    {
        Self {
            f: Arc::new(f),
            params: CheckParams::default(),
        }
    }

    pub fn abort(mut self) -> Self {
        self.params.abort = true;
        self
    }
}

impl Check for SuperRefine {
    fn name(&self) -> &'static str {
        "super_refine"
    }

    fn check(&self, payload: &mut ParsePayload) -> CheckStep {
        let mut raised = Vec::new();
        (self.f)(&payload.value, &mut raised);
        payload
            .issues
            .extend(raised.into_iter().map(|issue| self.params.apply(issue)));
        CheckStep::Done
    }
}
