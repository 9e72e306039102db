//! Path-based patches against element and variable records.
//!
//! # Verbs
//!
//! `set`, `append`, `prepend`, `extend` and `addChartData`. Unknown verbs
//! never reach this module: they fail to decode.

pub mod action;
pub mod apply;

pub use action::{UpdateAction, UpdateData};
pub use apply::{apply_at, patch_element, patch_variable, update_element, update_variable_path};
