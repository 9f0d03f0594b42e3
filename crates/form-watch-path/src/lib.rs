//! Form value path notation.
//!
//! Paths are dot-separated keys. An array level is written by appending a
//! literal `[]` to the key that holds the array, and concrete element indices
//! never appear in a path: every element of `list` shares `list[]`. The form
//! root is `#`, and a leading `#.` is accepted and dropped.
//!
//! # Example
//!
//! ```
//! use form_watch_path::{format_value_path, parse_value_path, Segment};
//!
//! let path = parse_value_path("#.list[].name");
//! assert_eq!(
//!     path.segments(),
//!     &[
//!         Segment::Key("list".to_string()),
//!         Segment::Array,
//!         Segment::Key("name".to_string()),
//!     ]
//! );
//! assert_eq!(format_value_path(&path), "list[].name");
//! assert_eq!(format_value_path(&parse_value_path("")), "#");
//! ```

use thiserror::Error;

pub mod types;
pub use types::{Segment, ValuePath, ARRAY_MARKER, ROOT};

pub mod validate;
pub use validate::validate_value_path;

/// Splits one dotted component into its key and the number of trailing `[]`.
pub(crate) fn split_markers(part: &str) -> (&str, usize) {
    let mut key = part;
    let mut arrays = 0;
    while let Some(rest) = key.strip_suffix(ARRAY_MARKER) {
        key = rest;
        arrays += 1;
    }
    (key, arrays)
}

/// Drops the root alias: `#` becomes empty and `#.a.b` becomes `a.b`.
///
/// # Example
///
/// ```
/// use form_watch_path::strip_root;
///
/// assert_eq!(strip_root("#"), "");
/// assert_eq!(strip_root("#.a.b"), "a.b");
/// assert_eq!(strip_root("a.b"), "a.b");
/// ```
pub fn strip_root(path: &str) -> &str {
    if path == ROOT {
        return "";
    }
    path.strip_prefix("#.").unwrap_or(path)
}

/// Parse a dotted path into segments.
///
/// Parsing never fails; malformed input (empty keys, stray markers) is kept
/// as-is and can be rejected up front with [`validate_value_path`].
///
/// # Example
///
/// ```
/// use form_watch_path::{parse_value_path, Segment};
///
/// assert!(parse_value_path("#").is_root());
/// assert_eq!(
///     parse_value_path("grid[][]").segments(),
///     &[Segment::Key("grid".to_string()), Segment::Array, Segment::Array]
/// );
/// ```
pub fn parse_value_path(path: &str) -> ValuePath {
    let path = strip_root(path);
    if path.is_empty() {
        return ValuePath::root();
    }
    let mut segments = Vec::new();
    for part in path.split('.') {
        let (key, arrays) = split_markers(part);
        if !key.is_empty() || arrays == 0 {
            segments.push(Segment::Key(key.to_string()));
        }
        segments.extend(std::iter::repeat(Segment::Array).take(arrays));
    }
    ValuePath::from_segments(segments)
}

/// Format a path back into dotted notation. The root formats as `#`.
///
/// # Example
///
/// ```
/// use form_watch_path::{format_value_path, ValuePath};
///
/// let path = ValuePath::root().join_key("list").join_array().join_key("name");
/// assert_eq!(format_value_path(&path), "list[].name");
/// ```
pub fn format_value_path(path: &ValuePath) -> String {
    if path.is_root() {
        return ROOT.to_string();
    }
    let mut out = String::new();
    for (i, segment) in path.segments().iter().enumerate() {
        match segment {
            Segment::Key(key) => {
                if i > 0 {
                    out.push('.');
                }
                out.push_str(key);
            }
            Segment::Array => out.push_str(ARRAY_MARKER),
        }
    }
    out
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("empty path segment at position {0}")]
    EmptySegment(usize),
    #[error("array marker without a key at position {0}")]
    BareArrayMarker(usize),
    #[error("unbalanced array marker in segment {0:?}")]
    InvalidMarker(String),
    #[error("Path too long")]
    PathTooLong,
}
