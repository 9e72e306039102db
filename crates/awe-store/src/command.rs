//! The command protocol and the reducer.
//!
//! Every transition is a pure function `Snapshot × Command → Snapshot`.

use serde_json::Value;
use tracing::debug;

use crate::snapshot::{Element, Snapshot, Variable};
use crate::tree::{process_initial_state, InitialState};
use crate::types::{Id, StoreError};
use crate::update::{update_element, UpdateData};
use crate::variable::update_variable;

/// One server command, already decoded.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    ProcessInitialState(InitialState),
    NewElement(Element),
    RemoveElements {
        ids: Vec<Id>,
    },
    NewVariable(Variable),
    UpdateElement {
        id: Id,
        update: UpdateData,
    },
    UpdateVariable {
        id: Id,
        value: Value,
        /// `None` for internal (local) writes.
        version: Option<u64>,
    },
    DisplayError {
        error: Value,
    },
    DisplayOptions {
        display_options: bool,
    },
    ExportLoading {
        export_loading: bool,
    },
    DisplayExportObjectResult {
        result: Value,
    },
    /// A `type` this client does not know.
    Unknown {
        kind: String,
    },
}

impl Command {
    /// The wire `type` tag.
    pub fn kind(&self) -> &str {
        match self {
            Command::ProcessInitialState(_) => "processInitialState",
            Command::NewElement(_) => "newElement",
            Command::RemoveElements { .. } => "removeElements",
            Command::NewVariable(_) => "newVariable",
            Command::UpdateElement { .. } => "updateElement",
            Command::UpdateVariable { .. } => "updateVariable",
            Command::DisplayError { .. } => "displayError",
            Command::DisplayOptions { .. } => "displayOptions",
            Command::ExportLoading { .. } => "exportLoading",
            Command::DisplayExportObjectResult { .. } => "displayExportObjectResult",
            Command::Unknown { kind } => kind,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, Command::Unknown { .. })
    }
}

/// Apply `command` to `snapshot`, returning the successor.
///
/// Unknown commands are the identity transition. On error `snapshot` is
/// unaffected and no successor exists.
pub fn reduce(snapshot: &Snapshot, command: Command) -> Result<Snapshot, StoreError> {
    let next = match command {
        Command::ProcessInitialState(initial) => process_initial_state(snapshot, initial),
        Command::NewElement(element) => snapshot.with_element(element),
        Command::RemoveElements { ids } => snapshot.without_elements(&ids),
        Command::NewVariable(variable) => snapshot.with_variable(variable),
        Command::UpdateElement { id, update } => update_element(snapshot, &id, update)?,
        Command::UpdateVariable { id, value, version } => {
            update_variable(snapshot, &id, value, version).0
        }
        Command::DisplayError { error } => snapshot.with_display_error(error),
        Command::DisplayOptions { display_options } => {
            snapshot.with_display_options(display_options)
        }
        Command::ExportLoading { export_loading } => snapshot.with_export_loading(export_loading),
        Command::DisplayExportObjectResult { result } => {
            snapshot.with_display_export_object_result(result)
        }
        Command::Unknown { kind } => {
            debug!(kind = %kind, "ignoring unknown command");
            snapshot.clone()
        }
    };
    Ok(next)
}
