//! Validation for dotted value paths.

use crate::{split_markers, strip_root, PathError};

/// Maximum allowed number of segments.
const MAX_PATH_LENGTH: usize = 256;

/// Validate a dotted value path.
///
/// # Errors
///
/// Returns an error if:
/// - a key between two dots is empty (`a..b`)
/// - a `[]` marker has no key in front of it (`a.[]`)
/// - a key still contains `[` or `]` after trailing markers are removed
/// - the path has more than 256 segments
///
/// # Example
///
/// ```
/// use form_watch_path::validate_value_path;
///
/// validate_value_path("#").unwrap();
/// validate_value_path("list[].name").unwrap();
/// validate_value_path("a..b").unwrap_err();
/// validate_value_path("list[0].name").unwrap_err();
/// ```
pub fn validate_value_path(path: &str) -> Result<(), PathError> {
    let path = strip_root(path);
    if path.is_empty() {
        return Ok(());
    }
    let mut segments = 0;
    for (i, part) in path.split('.').enumerate() {
        let (key, arrays) = split_markers(part);
        if key.is_empty() {
            return Err(if arrays == 0 {
                PathError::EmptySegment(i)
            } else {
                PathError::BareArrayMarker(i)
            });
        }
        if key.contains('[') || key.contains(']') {
            return Err(PathError::InvalidMarker(part.to_string()));
        }
        segments += 1 + arrays;
        if segments > MAX_PATH_LENGTH {
            return Err(PathError::PathTooLong);
        }
    }
    Ok(())
}
