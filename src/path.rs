//! Issue paths locating values inside nested structures.
//!
//! Issues are produced with paths relative to the node that raised them.
//! Composite nodes turn those into parent-relative paths by *prepending* the
//! key or index of the child that produced them, so by the time an issue
//! reaches the top-level entry point its path is absolute.

use std::fmt::{self, Display};

use crate::value::Value;

/// A segment of an issue path: an object key or a sequence index.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    /// An object key, record key or primitive map key (e.g. `user`, `email`)
    Field(String),
    /// A sequence position (e.g. `[0]`, `[42]`)
    Index(usize),
}

impl PathSegment {
    /// Creates a new field segment.
    pub fn field(name: impl Into<String>) -> Self {
        PathSegment::Field(name.into())
    }

    /// Creates a new index segment.
    pub fn index(idx: usize) -> Self {
        PathSegment::Index(idx)
    }

    /// Converts a map key into a path segment, if the key is a property-like
    /// primitive. Non-negative integral numbers become indexes; other
    /// numbers use their string form.
    pub fn from_key(key: &Value) -> Option<Self> {
        match key {
            Value::String(s) => Some(PathSegment::Field(s.clone())),
            Value::Number(n) if n.is_finite() && n.fract() == 0.0 && *n >= 0.0 => {
                Some(PathSegment::Index(*n as usize))
            }
            Value::Number(n) => Some(PathSegment::Field(crate::value::number_to_string(*n))),
            _ => None,
        }
    }
}

impl From<&str> for PathSegment {
    fn from(name: &str) -> Self {
        PathSegment::Field(name.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(name: String) -> Self {
        PathSegment::Field(name)
    }
}

impl From<usize> for PathSegment {
    fn from(idx: usize) -> Self {
        PathSegment::Index(idx)
    }
}

/// A path to a value in a nested structure.
///
/// # Example
///
/// ```rust
/// use inquest::JsonPath;
///
/// let path = JsonPath::root()
///     .push_field("users")
///     .push_index(0)
///     .push_field("email");
///
/// assert_eq!(path.to_string(), "users[0].email");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct JsonPath {
    segments: Vec<PathSegment>,
}

impl JsonPath {
    /// Creates an empty path representing the root value.
    pub fn root() -> Self {
        Self::default()
    }

    /// Creates a path from an ordered list of segments.
    pub fn from_segments(segments: Vec<PathSegment>) -> Self {
        Self { segments }
    }

    /// Returns a new path with a field segment appended.
    pub fn push_field(&self, name: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Field(name.into()));
        Self { segments }
    }

    /// Returns a new path with an index segment appended.
    pub fn push_index(&self, index: usize) -> Self {
        let mut segments = self.segments.clone();
        segments.push(PathSegment::Index(index));
        Self { segments }
    }

    /// Inserts a segment at the front of the path in place.
    ///
    /// This is how a composite node re-bases a child issue onto itself.
    pub fn prepend(&mut self, segment: PathSegment) {
        self.segments.insert(0, segment);
    }

    /// Returns true if this is the root path (no segments).
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns the number of segments in this path.
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    /// Returns true if this path has no segments.
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns an iterator over the path segments.
    pub fn segments(&self) -> impl Iterator<Item = &PathSegment> {
        self.segments.iter()
    }

    /// Returns the parent path (all segments except the last), or None if this is root.
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            None
        } else {
            Some(Self {
                segments: self.segments[..self.segments.len() - 1].to_vec(),
            })
        }
    }

    /// Returns the last segment, or None if this is root.
    pub fn last(&self) -> Option<&PathSegment> {
        self.segments.last()
    }
}

impl<S: Into<PathSegment>> FromIterator<S> for JsonPath {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            segments: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                PathSegment::Field(name) => {
                    if i > 0 {
                        write!(f, ".")?;
                    }
                    write!(f, "{}", name)?;
                }
                PathSegment::Index(idx) => write!(f, "[{}]", idx)?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_root_path_is_empty() {
        let path = JsonPath::root();
        assert!(path.is_root());
        assert_eq!(path.len(), 0);
        assert_eq!(path.to_string(), "");
    }

    #[test]
    fn test_complex_path() {
        let path = JsonPath::root()
            .push_field("users")
            .push_index(0)
            .push_field("email");
        assert_eq!(path.to_string(), "users[0].email");
    }

    #[test]
    fn test_prepend_rebases_child_path() {
        let mut path = JsonPath::root().push_field("b");
        path.prepend(PathSegment::field("a"));
        assert_eq!(path.to_string(), "a.b");

        path.prepend(PathSegment::index(3));
        assert_eq!(path.to_string(), "[3].a.b");
    }

    #[test]
    fn test_from_iterator() {
        let path: JsonPath = ["a", "b"].into_iter().collect();
        assert_eq!(path, JsonPath::root().push_field("a").push_field("b"));
    }

    #[test]
    fn test_segment_from_map_key() {
        assert_eq!(
            PathSegment::from_key(&Value::from("k")),
            Some(PathSegment::field("k"))
        );
        assert_eq!(
            PathSegment::from_key(&Value::from(2)),
            Some(PathSegment::index(2))
        );
        assert_eq!(
            PathSegment::from_key(&Value::Number(1.5)),
            Some(PathSegment::field("1.5"))
        );
        assert_eq!(PathSegment::from_key(&Value::Array(vec![])), None);
    }

    #[test]
    fn test_parent_path() {
        let path = JsonPath::root().push_field("users").push_index(0);
        let parent = path.parent().unwrap();
        assert_eq!(parent.to_string(), "users");
        assert!(parent.parent().unwrap().is_root());
        assert!(JsonPath::root().parent().is_none());
    }

    #[test]
    fn test_last_segment() {
        let path = JsonPath::root().push_field("users").push_index(0);
        assert_eq!(path.last(), Some(&PathSegment::Index(0)));
        assert_eq!(JsonPath::root().last(), None);
    }
}
