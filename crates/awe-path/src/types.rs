//! Type definitions for update paths.

use std::borrow::Cow;
use std::fmt;

use serde_json::Value;

/// A step in an update path.
///
/// The server sends paths as JSON arrays mixing strings (object keys) and
/// non-negative integers (list positions).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathStep {
    Key(String),
    Index(usize),
}

/// A path into a record: a sequence of steps, empty for the record root.
pub type Path = Vec<PathStep>;

impl PathStep {
    /// The step as an object key. Indices address their decimal key.
    pub fn as_key(&self) -> Cow<'_, str> {
        match self {
            PathStep::Key(key) => Cow::Borrowed(key),
            PathStep::Index(idx) => Cow::Owned(idx.to_string()),
        }
    }

    /// The step as a list position, if it is one or parses as one.
    pub fn as_index(&self) -> Option<usize> {
        match self {
            PathStep::Index(idx) => Some(*idx),
            PathStep::Key(key) if crate::is_valid_index(key) => key.parse().ok(),
            PathStep::Key(_) => None,
        }
    }

    /// Decode a step from its wire form. Returns `None` for anything other
    /// than a string or a non-negative integer.
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(PathStep::Key(s.clone())),
            Value::Number(n) => n.as_u64().map(|n| PathStep::Index(n as usize)),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            PathStep::Key(key) => Value::String(key.clone()),
            PathStep::Index(idx) => Value::from(*idx),
        }
    }
}

impl fmt::Display for PathStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathStep::Key(key) => f.write_str(key),
            PathStep::Index(idx) => write!(f, "{idx}"),
        }
    }
}

impl From<&str> for PathStep {
    fn from(key: &str) -> Self {
        PathStep::Key(key.to_string())
    }
}

impl From<String> for PathStep {
    fn from(key: String) -> Self {
        PathStep::Key(key)
    }
}

impl From<usize> for PathStep {
    fn from(idx: usize) -> Self {
        PathStep::Index(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn step_from_json() {
        assert_eq!(PathStep::from_json(&json!("data")), Some(PathStep::Key("data".into())));
        assert_eq!(PathStep::from_json(&json!(3)), Some(PathStep::Index(3)));
        assert_eq!(PathStep::from_json(&json!(-1)), None);
        assert_eq!(PathStep::from_json(&json!(1.5)), None);
        assert_eq!(PathStep::from_json(&json!(null)), None);
    }

    #[test]
    fn step_as_index() {
        assert_eq!(PathStep::Index(2).as_index(), Some(2));
        assert_eq!(PathStep::from("7").as_index(), Some(7));
        assert_eq!(PathStep::from("07").as_index(), None);
        assert_eq!(PathStep::from("items").as_index(), None);
    }

    #[test]
    fn step_as_key() {
        assert_eq!(PathStep::Index(12).as_key(), "12");
        assert_eq!(PathStep::from("series").as_key(), "series");
    }
}
