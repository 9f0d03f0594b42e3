//! Type definitions for value paths.

use std::fmt;

/// Root alias used by schema indexes and the whole-form watch entry.
pub const ROOT: &str = "#";

/// Marker appended to a key to denote one array level.
pub const ARRAY_MARKER: &str = "[]";

/// A single step in a [`ValuePath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Segment {
    /// Named object key.
    Key(String),
    /// One array level. Concrete element indices never appear in a path.
    Array,
}

impl Segment {
    pub fn key(&self) -> Option<&str> {
        match self {
            Segment::Key(k) => Some(k),
            Segment::Array => None,
        }
    }

    pub fn is_array(&self) -> bool {
        matches!(self, Segment::Array)
    }
}

/// An ordered sequence of segments. The empty path is the form root (`#`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ValuePath {
    segments: Vec<Segment>,
}

impl ValuePath {
    pub fn root() -> Self {
        Self::default()
    }

    pub fn from_segments(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Child path for an object key.
    pub fn join_key(&self, key: impl Into<String>) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Key(key.into()));
        Self { segments }
    }

    /// Child path one array level down (`path[]`).
    pub fn join_array(&self) -> Self {
        let mut segments = self.segments.clone();
        segments.push(Segment::Array);
        Self { segments }
    }

    /// The object keys of this path, array markers dropped.
    ///
    /// `list[].card.name` yields `["list", "card", "name"]`.
    pub fn concrete_keys(&self) -> Vec<&str> {
        self.segments.iter().filter_map(Segment::key).collect()
    }

    /// Nesting depth: the number of `.` separators in the formatted path.
    pub fn depth(&self) -> usize {
        self.concrete_keys().len().saturating_sub(1)
    }

    /// Position of the first contiguous occurrence of `needle` that is
    /// followed by at least one more segment.
    ///
    /// This is the segment-aligned form of testing `path` for the substring
    /// `needle + "."`: a match may start anywhere, but must end on a segment
    /// boundary with something after it.
    pub fn find_window(&self, needle: &ValuePath) -> Option<usize> {
        let n = needle.len();
        if n == 0 || n >= self.len() {
            return None;
        }
        (0..self.len() - n).find(|&start| self.segments[start..start + n] == needle.segments[..])
    }

    /// Copy of this path with the first windowed occurrence of `needle`
    /// removed, or `None` when [`find_window`](Self::find_window) finds nothing.
    pub fn remove_window(&self, needle: &ValuePath) -> Option<ValuePath> {
        let start = self.find_window(needle)?;
        let mut segments = Vec::with_capacity(self.len() - needle.len());
        segments.extend_from_slice(&self.segments[..start]);
        segments.extend_from_slice(&self.segments[start + needle.len()..]);
        Some(ValuePath { segments })
    }
}

impl From<Vec<Segment>> for ValuePath {
    fn from(segments: Vec<Segment>) -> Self {
        Self { segments }
    }
}

impl From<&str> for ValuePath {
    fn from(path: &str) -> Self {
        crate::parse_value_path(path)
    }
}

impl fmt::Display for ValuePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::format_value_path(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(k: &str) -> Segment {
        Segment::Key(k.to_string())
    }

    #[test]
    fn test_join() {
        let p = ValuePath::root().join_key("list").join_array().join_key("name");
        assert_eq!(p.segments(), &[key("list"), Segment::Array, key("name")]);
        assert_eq!(p.depth(), 1);
    }

    #[test]
    fn test_concrete_keys() {
        let p = ValuePath::from(vec![key("a"), Segment::Array, Segment::Array, key("b")]);
        assert_eq!(p.concrete_keys(), vec!["a", "b"]);
    }

    #[test]
    fn test_find_window_requires_trailing_segment() {
        let p = ValuePath::from(vec![key("a"), key("b")]);
        let needle = ValuePath::from(vec![key("a"), key("b")]);
        assert_eq!(p.find_window(&needle), None);
        assert_eq!(p.find_window(&ValuePath::from(vec![key("a")])), Some(0));
        assert_eq!(p.find_window(&ValuePath::from(vec![key("b")])), None);
    }

    #[test]
    fn test_find_window_inner() {
        let p = ValuePath::from(vec![key("x"), key("box"), key("y")]);
        let needle = ValuePath::from(vec![key("box")]);
        assert_eq!(p.find_window(&needle), Some(1));
        assert_eq!(
            p.remove_window(&needle),
            Some(ValuePath::from(vec![key("x"), key("y")]))
        );
    }

    #[test]
    fn test_find_window_empty_needle() {
        let p = ValuePath::from(vec![key("a")]);
        assert_eq!(p.find_window(&ValuePath::root()), None);
    }
}
