//! The aggregate error raised by the throwing entry points.

use std::fmt::{self, Display};

use stillwater::prelude::*;

use super::issue::Issue;
use crate::path::JsonPath;

/// A non-empty collection of finalized issues.
///
/// `ValidationError` wraps a `NonEmptyVec<Issue>` so a failed parse always
/// carries at least one issue. It implements `Semigroup`, so failures from
/// independent parses can be combined:
///
/// ```rust
/// use inquest::{Schema, Value};
/// use stillwater::prelude::*;
///
/// let schema = Schema::string();
/// let a = schema.parse(&Value::from(1)).unwrap_err();
/// let b = schema.parse(&Value::Null).unwrap_err();
///
/// let combined = a.issues().unwrap().clone().combine(b.issues().unwrap().clone());
/// assert_eq!(combined.len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationError(NonEmptyVec<Issue>);

impl ValidationError {
    /// Creates a `ValidationError` containing a single issue.
    pub fn single(issue: Issue) -> Self {
        Self(NonEmptyVec::singleton(issue))
    }

    pub fn from_non_empty(issues: NonEmptyVec<Issue>) -> Self {
        Self(issues)
    }

    /// Creates a `ValidationError` from a list of issues, or `None` when the
    /// list is empty.
    pub fn from_vec(issues: Vec<Issue>) -> Option<Self> {
        NonEmptyVec::from_vec(issues).map(Self)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; the collection is guaranteed non-empty.
    pub fn is_empty(&self) -> bool {
        false
    }

    pub fn iter(&self) -> impl Iterator<Item = &Issue> {
        self.0.iter()
    }

    /// Returns all issues at the specified path.
    pub fn at_path(&self, path: &JsonPath) -> Vec<&Issue> {
        self.0.iter().filter(|i| &i.path == path).collect()
    }

    /// Returns all issues with the specified wire code.
    pub fn with_code(&self, code: &str) -> Vec<&Issue> {
        self.0.iter().filter(|i| i.code() == code).collect()
    }

    pub fn first(&self) -> &Issue {
        self.0.head()
    }

    pub fn into_vec(self) -> Vec<Issue> {
        self.0.into_vec()
    }

    pub fn as_non_empty_vec(&self) -> &NonEmptyVec<Issue> {
        &self.0
    }
}

impl Semigroup for ValidationError {
    fn combine(self, other: Self) -> Self {
        ValidationError(self.0.combine(other.0))
    }
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Validation failed with {} issue(s):", self.len())?;
        for (i, issue) in self.iter().enumerate() {
            writeln!(f, "  {}. {}", i + 1, issue)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

impl IntoIterator for ValidationError {
    type Item = Issue;
    type IntoIter = std::vec::IntoIter<Issue>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_vec().into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationError {
    type Item = &'a Issue;
    type IntoIter = Box<dyn Iterator<Item = &'a Issue> + 'a>;

    fn into_iter(self) -> Self::IntoIter {
        Box::new(self.0.iter())
    }
}

const _: () = {
    const fn assert_send<T: Send>() {}
    const fn assert_sync<T: Sync>() {}
    assert_send::<ValidationError>();
    assert_sync::<ValidationError>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RawIssue;
    use crate::value::Value;

    fn issue(path: JsonPath, message: &str) -> Issue {
        RawIssue::custom(Value::Null, message).at(path).finalize(None)
    }

    #[test]
    fn test_single() {
        let first = issue(JsonPath::root(), "test");
        let errors = ValidationError::single(first.clone());

        assert_eq!(errors.len(), 1);
        assert!(!errors.is_empty());
        assert_eq!(errors.first(), &first);
    }

    #[test]
    fn test_from_empty_vec_is_none() {
        assert!(ValidationError::from_vec(vec![]).is_none());
        assert_eq!(
            ValidationError::from_vec(vec![issue(JsonPath::root(), "x")])
                .unwrap()
                .len(),
            1
        );
    }

    #[test]
    fn test_combine_preserves_order() {
        let a = ValidationError::single(issue(JsonPath::root().push_field("a"), "one"));
        let b = ValidationError::single(issue(JsonPath::root().push_field("b"), "two"));
        let combined = a.combine(b);

        let messages: Vec<_> = combined.iter().map(|i| i.message.as_str()).collect();
        assert_eq!(messages, vec!["one", "two"]);
    }

    #[test]
    fn test_at_path_and_with_code() {
        let path_a = JsonPath::root().push_field("a");
        let errors = ValidationError::single(issue(path_a.clone(), "one"))
            .combine(ValidationError::single(issue(path_a.clone(), "two")))
            .combine(ValidationError::single(issue(JsonPath::root(), "three")));

        assert_eq!(errors.at_path(&path_a).len(), 2);
        assert_eq!(errors.with_code("custom").len(), 3);
        assert!(errors.with_code("invalid_type").is_empty());
    }

    #[test]
    fn test_display() {
        let errors = ValidationError::single(issue(JsonPath::root().push_field("name"), "required"))
            .combine(ValidationError::single(issue(
                JsonPath::root().push_field("email"),
                "invalid",
            )));
        let display = errors.to_string();

        assert!(display.contains("2 issue(s)"));
        assert!(display.contains("1. name: required"));
        assert!(display.contains("2. email: invalid"));
    }
}
