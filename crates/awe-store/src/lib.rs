//! Client state engine for server-driven awe UIs.
//!
//! The server describes a UI as a flat set of element records linked by
//! `parentId`, plus a set of versioned variables, and streams commands that
//! mutate them. This crate turns that command stream into a sequence of
//! immutable [`Snapshot`]s:
//!
//! - [`tree`] flattens the nested initial element tree;
//! - [`update`] applies path patches (`set`, `append`, `prepend`, `extend`,
//!   `addChartData`) to a single record;
//! - [`variable`] drops stale authoritative writes by version;
//! - [`chart`] merges streamed series into existing charts;
//! - [`command`] defines the commands and the reducer;
//! - [`codec`] maps the JSON wire format to and from [`Command`] and
//!   [`Snapshot`].
//!
//! ```
//! use awe_store::Store;
//! use serde_json::json;
//!
//! let mut store = Store::new();
//! store.dispatch_json(&json!({
//!     "type": "newElement",
//!     "id": "list", "elementType": "List", "data": {"items": []}
//! })).unwrap();
//! store.dispatch_json(&json!({
//!     "type": "updateElement", "id": "list",
//!     "updateData": {"path": ["data", "items"], "action": "append", "data": "first"}
//! })).unwrap();
//!
//! let list = store.snapshot().element(&"list".into()).unwrap();
//! assert_eq!(list.data, json!({"items": ["first"]}));
//! ```

pub mod chart;
pub mod codec;
pub mod command;
pub mod snapshot;
pub mod store;
pub mod tree;
pub mod types;
pub mod update;
pub mod variable;

pub use command::{reduce, Command};
pub use snapshot::{Element, Snapshot, Variable};
pub use store::{Store, StoreOptions};
pub use tree::{process_initial_state, ChildIndex, ElementNode, InitialState};
pub use types::{DecodeError, Id, StoreError};
pub use update::{UpdateAction, UpdateData};
pub use variable::{update_variable, Resolution};
