//! Variable writes with version-based conflict resolution.
//!
//! Two kinds of writes reach a variable:
//!
//! - internal writes (local user input) carry no version and always apply,
//!   leaving the stored version as is;
//! - authoritative writes (from the server) carry a version and apply only
//!   if it is strictly greater than the stored one. Anything else is a stale
//!   or duplicate delivery and is dropped without error.

use serde_json::Value;
use tracing::debug;

use crate::snapshot::{Snapshot, Variable};
use crate::types::Id;

/// Outcome of comparing an incoming write against the stored version.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Unversioned write; applied, version untouched.
    Internal,
    /// Newer authoritative write; applied along with its version.
    Accepted(u64),
    /// Authoritative write not newer than the stored version; dropped.
    Stale { current: u64, incoming: u64 },
}

impl Resolution {
    pub fn applies(&self) -> bool {
        !matches!(self, Resolution::Stale { .. })
    }
}

/// Decide what to do with a write. `current` is `None` for an unknown variable.
pub fn resolve(current: Option<u64>, incoming: Option<u64>) -> Resolution {
    match (current, incoming) {
        (_, None) => Resolution::Internal,
        (Some(current), Some(incoming)) if incoming <= current => Resolution::Stale { current, incoming },
        (_, Some(incoming)) => Resolution::Accepted(incoming),
    }
}

/// `updateVariable`: write `value` to the variable `id`.
///
/// An unknown id creates the variable, with version `0` for internal writes.
/// Returns the successor snapshot and how the write was resolved; a stale
/// write returns an unchanged clone.
pub fn update_variable(
    snapshot: &Snapshot,
    id: &Id,
    value: Value,
    version: Option<u64>,
) -> (Snapshot, Resolution) {
    let current = snapshot.variable(id).map(|v| v.version);
    let resolution = resolve(current, version);

    let next = match resolution {
        Resolution::Stale { current, incoming } => {
            debug!(%id, current, incoming, "dropping stale variable update");
            snapshot.clone()
        }
        Resolution::Internal | Resolution::Accepted(_) if current.is_none() => {
            let version = match resolution {
                Resolution::Accepted(version) => version,
                _ => 0,
            };
            snapshot.with_variable(Variable::new(id.clone(), value, version))
        }
        Resolution::Internal | Resolution::Accepted(_) => {
            let mut next = snapshot.clone();
            if let Some(variable) = next.variable_mut(id) {
                variable.value = value;
                if let Resolution::Accepted(version) = resolution {
                    variable.version = version;
                }
            }
            next
        }
    };
    (next, resolution)
}
