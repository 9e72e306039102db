//! Update verbs and the patch payload.

use std::fmt;
use std::str::FromStr;

use awe_path::Path;
use serde_json::Value;

use crate::types::DecodeError;

/// What an `updateElement` patch does at its resolved path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UpdateAction {
    /// Replace the value wholesale.
    Set,
    /// Push onto the tail of a list.
    Append,
    /// Insert at the head of a list.
    Prepend,
    /// Concatenate a list onto the tail of a list.
    Extend,
    /// Merge a chart batch into the chart mapping at the path.
    AddChartData,
}

impl UpdateAction {
    pub const ALL: [UpdateAction; 5] = [
        UpdateAction::Set,
        UpdateAction::Append,
        UpdateAction::Prepend,
        UpdateAction::Extend,
        UpdateAction::AddChartData,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateAction::Set => "set",
            UpdateAction::Append => "append",
            UpdateAction::Prepend => "prepend",
            UpdateAction::Extend => "extend",
            UpdateAction::AddChartData => "addChartData",
        }
    }
}

impl FromStr for UpdateAction {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UpdateAction::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| DecodeError::UnknownAction(s.to_string()))
    }
}

impl fmt::Display for UpdateAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single patch against one element or variable record.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateData {
    /// Empty for the record root.
    pub path: Path,
    pub action: UpdateAction,
    pub data: Value,
}

impl UpdateData {
    pub fn new(path: Path, action: UpdateAction, data: Value) -> Self {
        Self { path, action, data }
    }

    pub fn set(path: Path, data: Value) -> Self {
        Self::new(path, UpdateAction::Set, data)
    }

    pub fn append(path: Path, data: Value) -> Self {
        Self::new(path, UpdateAction::Append, data)
    }

    pub fn prepend(path: Path, data: Value) -> Self {
        Self::new(path, UpdateAction::Prepend, data)
    }

    pub fn extend(path: Path, data: Value) -> Self {
        Self::new(path, UpdateAction::Extend, data)
    }

    pub fn add_chart_data(path: Path, data: Value) -> Self {
        Self::new(path, UpdateAction::AddChartData, data)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_known_actions() {
        for action in UpdateAction::ALL {
            assert_eq!(action.as_str().parse::<UpdateAction>(), Ok(action));
        }
    }

    #[test]
    fn unknown_action_is_rejected() {
        assert_eq!(
            "pop".parse::<UpdateAction>(),
            Err(DecodeError::UnknownAction("pop".into()))
        );
        // Verbs are case-sensitive on the wire.
        assert!("Set".parse::<UpdateAction>().is_err());
    }
}
