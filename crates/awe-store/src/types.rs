//! Identifiers and error types shared by the store modules.

use std::fmt;

use awe_path::PathError;
use serde_json::Value;
use thiserror::Error;

// ── Id ────────────────────────────────────────────────────────────────────

/// Element or variable identifier.
///
/// The server may use strings or integers; `Int(1)` and `Str("1")` are
/// different keys.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Id {
    Int(i64),
    Str(String),
}

impl Id {
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(Id::Str(s.clone())),
            Value::Number(n) => n.as_i64().map(Id::Int),
            _ => None,
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            Id::Int(n) => Value::from(*n),
            Id::Str(s) => Value::String(s.clone()),
        }
    }

    /// The id as an object key in encoded snapshots.
    ///
    /// `Int(1)` and `Str("1")` map to the same key `"1"`, so they collide
    /// once encoded even though they are distinct in a [`crate::Snapshot`].
    pub fn as_key(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Id::Int(n) => write!(f, "{n}"),
            Id::Str(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Id {
    fn from(s: &str) -> Self {
        Id::Str(s.to_string())
    }
}

impl From<String> for Id {
    fn from(s: String) -> Self {
        Id::Str(s)
    }
}

impl From<i64> for Id {
    fn from(n: i64) -> Self {
        Id::Int(n)
    }
}

// ── Errors ────────────────────────────────────────────────────────────────

/// Malformed protocol input.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DecodeError {
    #[error("expected a JSON object for {0}")]
    NotAnObject(&'static str),
    #[error("missing field `{field}` in {context}")]
    MissingField {
        context: &'static str,
        field: &'static str,
    },
    #[error("invalid field `{field}` in {context}: {reason}")]
    InvalidField {
        context: &'static str,
        field: &'static str,
        reason: String,
    },
    #[error("invalid id {0}: expected a string or an integer")]
    InvalidId(String),
    #[error("unknown update action {0:?}")]
    UnknownAction(String),
}

/// Failure of a state transition. The snapshot it was applied to is left
/// untouched.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum StoreError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error("path error: {0}")]
    Path(#[from] PathError),
    #[error("no element with id {0}")]
    UnknownElement(Id),
    #[error("no variable with id {0}")]
    UnknownVariable(Id),
    #[error("value at {path:?} is not a list")]
    NotASequence { path: String },
    #[error("malformed chart data: {0}")]
    MalformedChart(String),
    #[error("invalid record: {0}")]
    InvalidRecord(String),
    #[error("unknown command type {0:?}")]
    UnknownCommand(String),
}
