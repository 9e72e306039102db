//! Update paths for awe UI records.
//!
//! A path addresses a nested location inside an element or variable record:
//! `["data", "series", 0, "data"]` walks into the `data` field, its `series`
//! list, the first series and finally that series' points.
//!
//! Paths travel as JSON arrays, but they can also be written as pointer
//! strings (RFC 6901 escaping) for logging and command-line use.
//!
//! # Example
//!
//! ```
//! use awe_path::{format_path, get, parse_path, set};
//! use serde_json::json;
//!
//! let path = parse_path("/data/items");
//! assert_eq!(format_path(&path), "/data/items");
//!
//! let mut doc = json!({"data": {"items": [1, 2]}});
//! assert_eq!(get(&doc, &path), Some(&json!([1, 2])));
//!
//! set(&mut doc, &path, json!([])).unwrap();
//! assert_eq!(doc, json!({"data": {"items": []}}));
//! ```

use serde_json::Value;
use thiserror::Error;

pub mod types;
pub use types::{Path, PathStep};

pub mod get;
pub use get::{get, get_mut, set};

/// Errors raised while resolving a path against a document.
///
/// Locations (`at`) are formatted as pointer strings.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PathError {
    #[error("nothing at {at}")]
    NotFound { at: String },
    #[error("value at {at:?} is neither an object nor a list")]
    NotAContainer { at: String },
    #[error("invalid list index {step:?}")]
    InvalidIndex { step: String },
    #[error("list index {index} out of bounds (length {len})")]
    IndexOutOfBounds { index: usize, len: usize },
}

/// Decode one pointer component back into a key.
///
/// ```
/// use awe_path::unescape_component;
///
/// assert_eq!(unescape_component("cpu~1mem"), "cpu/mem");
/// assert_eq!(unescape_component("~0draft"), "~draft");
/// assert_eq!(unescape_component("~01"), "~1");
/// ```
pub fn unescape_component(component: &str) -> String {
    let mut out = String::with_capacity(component.len());
    let mut chars = component.chars();
    while let Some(c) = chars.next() {
        if c != '~' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('1') => out.push('/'),
            Some('0') => out.push('~'),
            // Not a valid escape; keep it as sent.
            Some(other) => {
                out.push('~');
                out.push(other);
            }
            None => out.push('~'),
        }
    }
    out
}

/// Encode a key so it can sit between `/` separators.
///
/// ```
/// use awe_path::escape_component;
///
/// assert_eq!(escape_component("cpu/mem"), "cpu~1mem");
/// assert_eq!(escape_component("~draft"), "~0draft");
/// assert_eq!(escape_component("items"), "items");
/// ```
pub fn escape_component(component: &str) -> String {
    let mut out = String::with_capacity(component.len());
    for c in component.chars() {
        match c {
            '~' => out.push_str("~0"),
            '/' => out.push_str("~1"),
            c => out.push(c),
        }
    }
    out
}

/// Parse a pointer string into path steps.
///
/// All steps come back as keys; list positions are recognised at resolution
/// time, so `"/items/0"` addresses the first item of a list.
///
/// # Example
///
/// ```
/// use awe_path::{parse_path, PathStep};
///
/// assert!(parse_path("").is_empty());
/// assert_eq!(parse_path("/a~1b/0"), vec![PathStep::from("a/b"), PathStep::from("0")]);
/// ```
pub fn parse_path(pointer: &str) -> Path {
    if pointer.is_empty() {
        return Vec::new();
    }
    let body = pointer.strip_prefix('/').unwrap_or(pointer);
    body.split('/')
        .map(|c| PathStep::Key(unescape_component(c)))
        .collect()
}

/// Format path steps as a pointer string. The root path formats as `""`.
pub fn format_path(path: &[PathStep]) -> String {
    let mut out = String::new();
    for step in path {
        out.push('/');
        out.push_str(&escape_component(&step.as_key()));
    }
    out
}

/// Decode a wire path (a JSON array of keys and indices).
///
/// Returns `None` if `value` is not an array or holds an invalid step.
pub fn path_from_json(value: &Value) -> Option<Path> {
    value.as_array()?.iter().map(PathStep::from_json).collect()
}

pub fn path_to_json(path: &[PathStep]) -> Value {
    Value::Array(path.iter().map(PathStep::to_json).collect())
}

/// Check if a string is a canonical non-negative list index (no leading zeros).
pub fn is_valid_index(index: &str) -> bool {
    let bytes = index.as_bytes();
    if bytes.is_empty() || (bytes.len() > 1 && bytes[0] == b'0') {
        return false;
    }
    bytes.iter().all(u8::is_ascii_digit)
}
