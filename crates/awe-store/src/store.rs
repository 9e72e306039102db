//! Session-scoped owner of the current snapshot.
//!
//! A [`Store`] is created at session start and dropped at session end by
//! whoever drives the command stream. It applies commands one at a time,
//! publishes each successor snapshot and keeps a bounded history of the
//! snapshots it replaced.

use std::collections::VecDeque;

use serde_json::Value;
use tracing::{debug, trace};

use crate::codec::json::decode_command;
use crate::command::{reduce, Command};
use crate::snapshot::Snapshot;
use crate::types::StoreError;

/// Store configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreOptions {
    /// Number of replaced snapshots kept for [`Store::undo`]. `0` disables
    /// history.
    pub history_limit: usize,
    /// Fail on unknown command types instead of ignoring them.
    pub reject_unknown_commands: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            history_limit: 32,
            reject_unknown_commands: false,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Store {
    current: Snapshot,
    history: VecDeque<Snapshot>,
    options: StoreOptions,
    applied: u64,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: StoreOptions) -> Self {
        Self {
            options,
            ..Self::default()
        }
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> &Snapshot {
        &self.current
    }

    /// Number of commands applied successfully.
    pub fn applied(&self) -> u64 {
        self.applied
    }

    /// Replaced snapshots, oldest first.
    pub fn history(&self) -> impl Iterator<Item = &Snapshot> {
        self.history.iter()
    }

    /// Apply one command. On error the current snapshot stays as it was.
    pub fn dispatch(&mut self, command: Command) -> Result<&Snapshot, StoreError> {
        trace!(kind = command.kind(), "dispatch");
        if command.is_unknown() && self.options.reject_unknown_commands {
            return Err(StoreError::UnknownCommand(command.kind().to_string()));
        }
        let next = reduce(&self.current, command)?;
        let previous = std::mem::replace(&mut self.current, next);
        self.remember(previous);
        self.applied += 1;
        Ok(&self.current)
    }

    /// Decode and apply one wire message.
    pub fn dispatch_json(&mut self, message: &Value) -> Result<&Snapshot, StoreError> {
        let command = decode_command(message)?;
        self.dispatch(command)
    }

    /// Restore the snapshot replaced by the last applied command.
    ///
    /// Returns `false` when there is no history left.
    pub fn undo(&mut self) -> bool {
        match self.history.pop_back() {
            Some(previous) => {
                debug!(remaining = self.history.len(), "undo");
                self.current = previous;
                true
            }
            None => false,
        }
    }

    /// Drop the session state and start over from an empty snapshot.
    pub fn reset(&mut self) {
        self.current = Snapshot::default();
        self.history.clear();
        self.applied = 0;
    }

    fn remember(&mut self, previous: Snapshot) {
        if self.options.history_limit == 0 {
            return;
        }
        if self.history.len() == self.options.history_limit {
            self.history.pop_front();
        }
        self.history.push_back(previous);
    }
}
