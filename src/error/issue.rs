//! Raw and finalized validation issues.
//!
//! A [`RawIssue`] is what node and check logic produces: a kind, the
//! offending input and a path relative to the node that raised it. Composite
//! nodes re-base child issues with [`RawIssue::prefixed`]. At the top-level
//! boundary each raw issue is finalized exactly once into an [`Issue`] with
//! an absolute path and a resolved message.

use std::fmt::{self, Display};
use std::sync::Arc;

use crate::config;
use crate::path::{JsonPath, PathSegment};
use crate::value::Value;

/// Custom message resolver.
///
/// Returning `None` defers to the next resolver in line: the issue's own map,
/// then the per-call map, then the global map, then the default message.
pub type ErrorMap = Arc<dyn Fn(&RawIssue) -> Option<String> + Send + Sync>;

/// The kind of container a size, key or element issue refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    String,
    Number,
    BigInt,
    Date,
    Array,
    Set,
    Map,
    Record,
}

impl Origin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Origin::String => "string",
            Origin::Number => "number",
            Origin::BigInt => "bigint",
            Origin::Date => "date",
            Origin::Array => "array",
            Origin::Set => "set",
            Origin::Map => "map",
            Origin::Record => "record",
        }
    }

    fn unit(&self) -> Option<&'static str> {
        match self {
            Origin::String => Some("characters"),
            Origin::Array | Origin::Set => Some("items"),
            Origin::Map | Origin::Record => Some("entries"),
            _ => None,
        }
    }
}

impl Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind-specific issue data. Each variant corresponds to one wire code.
#[derive(Debug, Clone, PartialEq)]
pub enum IssueKind {
    InvalidType {
        expected: String,
        /// Refinement of the received type, e.g. `"NaN"` for a NaN number.
        received: Option<String>,
    },
    InvalidValue {
        values: Vec<Value>,
    },
    InvalidFormat {
        format: String,
        pattern: Option<String>,
    },
    TooBig {
        origin: Origin,
        maximum: Value,
        inclusive: bool,
        exact: bool,
    },
    TooSmall {
        origin: Origin,
        minimum: Value,
        inclusive: bool,
        exact: bool,
    },
    NotMultipleOf {
        divisor: Value,
    },
    UnrecognizedKeys {
        keys: Vec<String>,
    },
    /// A key failed its key schema. Sub-issues are finalized relative to the key.
    InvalidKey {
        origin: Origin,
        issues: Vec<Issue>,
    },
    /// A map value keyed by a non-primitive key failed its value schema.
    InvalidElement {
        origin: Origin,
        key: Value,
        issues: Vec<Issue>,
    },
    /// Every union option failed; one group of finalized issues per option.
    InvalidUnion {
        errors: Vec<Vec<Issue>>,
        note: Option<String>,
    },
    Custom {
        params: Option<Value>,
    },
}

impl IssueKind {
    /// The wire code of this kind.
    pub fn code(&self) -> &'static str {
        match self {
            IssueKind::InvalidType { .. } => "invalid_type",
            IssueKind::InvalidValue { .. } => "invalid_value",
            IssueKind::InvalidFormat { .. } => "invalid_format",
            IssueKind::TooBig { .. } => "too_big",
            IssueKind::TooSmall { .. } => "too_small",
            IssueKind::NotMultipleOf { .. } => "not_multiple_of",
            IssueKind::UnrecognizedKeys { .. } => "unrecognized_keys",
            IssueKind::InvalidKey { .. } => "invalid_key",
            IssueKind::InvalidElement { .. } => "invalid_element",
            IssueKind::InvalidUnion { .. } => "invalid_union",
            IssueKind::Custom { .. } => "custom",
        }
    }

    pub(crate) fn invalid_type(expected: impl Into<String>) -> Self {
        IssueKind::InvalidType {
            expected: expected.into(),
            received: None,
        }
    }

    fn default_message(&self, input: &Value) -> String {
        match self {
            IssueKind::InvalidType { expected, received } => format!(
                "Invalid input: expected {}, received {}",
                expected,
                received.as_deref().unwrap_or(input.type_name())
            ),
            IssueKind::InvalidValue { values } => match values.as_slice() {
                [single] => format!("Invalid input: expected {}", single),
                many => format!(
                    "Invalid option: expected one of {}",
                    many.iter()
                        .map(ToString::to_string)
                        .collect::<Vec<_>>()
                        .join("|")
                ),
            },
            IssueKind::InvalidFormat { format, pattern } => match (format.as_str(), pattern) {
                ("regex", Some(p)) => format!("Invalid string: must match pattern {}", p),
                ("starts_with", Some(p)) => format!("Invalid string: must start with \"{}\"", p),
                ("ends_with", Some(p)) => format!("Invalid string: must end with \"{}\"", p),
                ("includes", Some(p)) => format!("Invalid string: must include \"{}\"", p),
                _ => format!("Invalid {}", format),
            },
            IssueKind::TooBig {
                origin,
                maximum,
                inclusive,
                ..
            } => bound_message("Too big", origin, if *inclusive { "<=" } else { "<" }, maximum),
            IssueKind::TooSmall {
                origin,
                minimum,
                inclusive,
                ..
            } => bound_message("Too small", origin, if *inclusive { ">=" } else { ">" }, minimum),
            IssueKind::NotMultipleOf { divisor } => {
                format!("Invalid number: must be a multiple of {}", divisor)
            }
            IssueKind::UnrecognizedKeys { keys } => format!(
                "Unrecognized key{}: {}",
                if keys.len() == 1 { "" } else { "s" },
                keys.iter()
                    .map(|k| format!("\"{}\"", k))
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            IssueKind::InvalidKey { origin, .. } => format!("Invalid key in {}", origin),
            IssueKind::InvalidElement { origin, .. } => format!("Invalid value in {}", origin),
            IssueKind::InvalidUnion { note, .. } => note
                .clone()
                .unwrap_or_else(|| "Invalid input".to_string()),
            IssueKind::Custom { .. } => "Invalid input".to_string(),
        }
    }
}

fn bound_message(prefix: &str, origin: &Origin, op: &str, bound: &Value) -> String {
    match origin.unit() {
        Some(unit) => format!(
            "{}: expected {} to have {}{} {}",
            prefix, origin, op, bound, unit
        ),
        None => format!("{}: expected {} to be {}{}", prefix, origin, op, bound),
    }
}

/// An issue as produced by node and check logic: relative path, no message.
#[derive(Clone)]
pub struct RawIssue {
    pub kind: IssueKind,
    /// The value that failed.
    pub input: Value,
    /// Path relative to the node that is currently holding the issue.
    pub path: JsonPath,
    /// An explicit message, which takes precedence over every error map.
    pub message: Option<String>,
    /// Whether later checks on the same node may still run.
    pub continuable: bool,
    pub(crate) error_map: Option<ErrorMap>,
}

impl RawIssue {
    /// Creates a fatal (non-continuable) issue at the current node.
    pub fn new(kind: IssueKind, input: Value) -> Self {
        Self {
            kind,
            input,
            path: JsonPath::root(),
            message: None,
            continuable: false,
            error_map: None,
        }
    }

    /// Creates a `custom` issue with an explicit message.
    pub fn custom(input: Value, message: impl Into<String>) -> Self {
        Self::new(IssueKind::Custom { params: None }, input).with_message(message)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn continuable(mut self, continuable: bool) -> Self {
        self.continuable = continuable;
        self
    }

    pub fn at(mut self, path: JsonPath) -> Self {
        self.path = path;
        self
    }

    /// Attaches the error map of the node or check that raised this issue,
    /// unless one is already set.
    pub fn with_error_map(mut self, error_map: Option<&ErrorMap>) -> Self {
        if self.error_map.is_none() {
            self.error_map = error_map.cloned();
        }
        self
    }

    /// Re-bases the issue onto the parent by prepending one segment.
    pub fn prefixed(mut self, segment: PathSegment) -> Self {
        self.path.prepend(segment);
        self
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Resolves the message and freezes the path.
    ///
    /// `per_call` is the error map supplied with the parse call, if any.
    pub fn finalize(self, per_call: Option<&ErrorMap>) -> Issue {
        let message = self
            .message
            .clone()
            .or_else(|| self.error_map.as_ref().and_then(|map| map(&self)))
            .or_else(|| per_call.and_then(|map| map(&self)))
            .or_else(|| {
                let global = config::global().custom_error.clone();
                global.and_then(|map| map(&self))
            })
            .unwrap_or_else(|| self.kind.default_message(&self.input));

        Issue {
            kind: self.kind,
            input: self.input,
            path: self.path,
            message,
        }
    }
}

impl fmt::Debug for RawIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawIssue")
            .field("kind", &self.kind)
            .field("input", &self.input)
            .field("path", &self.path)
            .field("message", &self.message)
            .field("continuable", &self.continuable)
            .finish_non_exhaustive()
    }
}

/// A finalized issue with an absolute path and a resolved message.
///
/// # Example
///
/// ```rust
/// use inquest::{Schema, Value};
///
/// let schema = Schema::object([("age", Schema::number())]);
/// let err = schema
///     .parse(&Value::object([("age", "ten")]))
///     .unwrap_err();
/// let issue = err.issues().unwrap().first().clone();
///
/// assert_eq!(issue.code(), "invalid_type");
/// assert_eq!(issue.path.to_string(), "age");
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Issue {
    pub kind: IssueKind,
    pub input: Value,
    pub path: JsonPath,
    pub message: String,
}

impl Issue {
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }
}

impl Display for Issue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_root() {
            write!(f, "(root): {}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<Issue>();
    assert_sync::<Issue>();
    assert_send::<RawIssue>();
    assert_sync::<RawIssue>();
};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixing_builds_parent_relative_path() {
        let issue = RawIssue::new(IssueKind::invalid_type("string"), Value::from(5))
            .prefixed(PathSegment::field("b"))
            .prefixed(PathSegment::field("a"));

        assert_eq!(issue.path.to_string(), "a.b");
    }

    #[test]
    fn test_default_messages() {
        let issue = RawIssue::new(IssueKind::invalid_type("string"), Value::from(5)).finalize(None);
        assert_eq!(issue.message, "Invalid input: expected string, received number");

        let issue = RawIssue::new(
            IssueKind::TooSmall {
                origin: Origin::String,
                minimum: Value::from(3),
                inclusive: true,
                exact: false,
            },
            Value::from("ab"),
        )
        .finalize(None);
        assert_eq!(
            issue.message,
            "Too small: expected string to have >=3 characters"
        );

        let issue = RawIssue::new(
            IssueKind::InvalidValue {
                values: vec![Value::from("a"), Value::from("b")],
            },
            Value::from("c"),
        )
        .finalize(None);
        assert_eq!(issue.message, "Invalid option: expected one of \"a\"|\"b\"");
    }

    #[test]
    fn test_explicit_message_wins() {
        let map: ErrorMap = Arc::new(|_| Some("from map".to_string()));
        let issue = RawIssue::custom(Value::Null, "explicit")
            .with_error_map(Some(&map))
            .finalize(Some(&map));

        assert_eq!(issue.message, "explicit");
    }

    #[test]
    fn test_node_error_map_precedes_per_call_map() {
        let node_map: ErrorMap = Arc::new(|_| Some("node".to_string()));
        let call_map: ErrorMap = Arc::new(|_| Some("call".to_string()));

        let issue = RawIssue::new(IssueKind::invalid_type("number"), Value::Null)
            .with_error_map(Some(&node_map))
            .finalize(Some(&call_map));
        assert_eq!(issue.message, "node");

        let issue =
            RawIssue::new(IssueKind::invalid_type("number"), Value::Null).finalize(Some(&call_map));
        assert_eq!(issue.message, "call");
    }

    #[test]
    fn test_error_map_may_defer() {
        let map: ErrorMap = Arc::new(|issue| {
            (issue.code() == "too_big").then(|| "nope".to_string())
        });
        let issue = RawIssue::new(IssueKind::invalid_type("number"), Value::Null)
            .with_error_map(Some(&map))
            .finalize(None);

        assert_eq!(issue.message, "Invalid input: expected number, received null");
    }

    #[test]
    fn test_issue_display() {
        let issue = RawIssue::custom(Value::Null, "bad")
            .at(JsonPath::root().push_field("users").push_index(1))
            .finalize(None);
        assert_eq!(issue.to_string(), "users[1]: bad");

        let root = RawIssue::custom(Value::Null, "bad").finalize(None);
        assert_eq!(root.to_string(), "(root): bad");
    }
}
