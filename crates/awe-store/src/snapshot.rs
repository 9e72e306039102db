//! The immutable state container.
//!
//! A [`Snapshot`] is a bundle of `Arc`s. Cloning one is O(1), and a
//! transition only copies what it touches: the element or variable map (a
//! vector of pointers) and the single record being changed, and even those
//! only while an older snapshot still shares them (`Arc::make_mut`).
//! Untouched records stay shared between every snapshot that contains them.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::types::Id;

/// A node of the UI tree.
///
/// Children are not stored: the tree is implied by `parent_id`
/// back-references (see [`crate::tree::ChildIndex`]).
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: Id,
    /// Sibling ordering hint, as sent by the server.
    pub index: i64,
    pub parent_id: Option<Id>,
    pub element_type: String,
    pub data: Value,
    pub props: Value,
    /// Fields the engine does not interpret, kept as sent.
    pub extra: Map<String, Value>,
}

impl Element {
    pub fn new(id: impl Into<Id>, element_type: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            index: 0,
            parent_id: None,
            element_type: element_type.into(),
            data: Value::Object(Map::new()),
            props: Value::Object(Map::new()),
            extra: Map::new(),
        }
    }

    pub fn with_index(mut self, index: i64) -> Self {
        self.index = index;
        self
    }

    pub fn with_parent(mut self, parent_id: impl Into<Id>) -> Self {
        self.parent_id = Some(parent_id.into());
        self
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    pub fn with_props(mut self, props: Value) -> Self {
        self.props = props;
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

/// A named reactive value.
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    pub id: Id,
    pub value: Value,
    /// Bumped by the server on every authoritative write.
    pub version: u64,
    pub extra: Map<String, Value>,
}

impl Variable {
    pub fn new(id: impl Into<Id>, value: Value, version: u64) -> Self {
        Self {
            id: id.into(),
            value,
            version,
            extra: Map::new(),
        }
    }
}

pub type ElementMap = IndexMap<Id, Arc<Element>>;
pub type VariableMap = IndexMap<Id, Arc<Variable>>;

/// The whole client-visible UI state at one point in time.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    pub(crate) elements: Arc<ElementMap>,
    pub(crate) variables: Arc<VariableMap>,
    pub(crate) style: Arc<Value>,
    pub(crate) display_error: Arc<Value>,
    pub(crate) display_options: bool,
    pub(crate) export_loading: bool,
    pub(crate) display_export_object_result: Arc<Value>,
}

impl Default for Snapshot {
    fn default() -> Self {
        Self {
            elements: Arc::default(),
            variables: Arc::default(),
            style: Arc::new(Value::Object(Map::new())),
            display_error: Arc::new(Value::Bool(false)),
            display_options: false,
            export_loading: false,
            display_export_object_result: Arc::new(Value::Bool(false)),
        }
    }
}

impl Snapshot {
    pub fn new() -> Self {
        Self::default()
    }

    // ── Reads ─────────────────────────────────────────────────────────────

    pub fn element(&self, id: &Id) -> Option<&Element> {
        self.elements.get(id).map(Arc::as_ref)
    }

    pub fn variable(&self, id: &Id) -> Option<&Variable> {
        self.variables.get(id).map(Arc::as_ref)
    }

    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.elements.values().map(Arc::as_ref)
    }

    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.variables.values().map(Arc::as_ref)
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn variable_count(&self) -> usize {
        self.variables.len()
    }

    pub fn style(&self) -> &Value {
        &self.style
    }

    pub fn display_error(&self) -> &Value {
        &self.display_error
    }

    pub fn display_options(&self) -> bool {
        self.display_options
    }

    pub fn export_loading(&self) -> bool {
        self.export_loading
    }

    pub fn display_export_object_result(&self) -> &Value {
        &self.display_export_object_result
    }

    /// True until the first element or variable is inserted.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty() && self.variables.is_empty()
    }

    /// True if both snapshots hold the very same record for `id`.
    pub fn shares_element(&self, other: &Snapshot, id: &Id) -> bool {
        match (self.elements.get(id), other.elements.get(id)) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }

    // ── Transitions ───────────────────────────────────────────────────────
    //
    // Each takes `&self` and returns the successor; `self` is never changed.

    pub fn with_element(&self, element: Element) -> Snapshot {
        let mut next = self.clone();
        Arc::make_mut(&mut next.elements).insert(element.id.clone(), Arc::new(element));
        next
    }

    pub fn with_variable(&self, variable: Variable) -> Snapshot {
        let mut next = self.clone();
        Arc::make_mut(&mut next.variables).insert(variable.id.clone(), Arc::new(variable));
        next
    }

    /// Remove every listed element. Unknown ids are skipped.
    pub fn without_elements<'a>(&self, ids: impl IntoIterator<Item = &'a Id>) -> Snapshot {
        let mut next = self.clone();
        for id in ids {
            if next.elements.contains_key(id) {
                Arc::make_mut(&mut next.elements).shift_remove(id);
            }
        }
        next
    }

    pub fn with_style(&self, style: Value) -> Snapshot {
        Snapshot {
            style: Arc::new(style),
            ..self.clone()
        }
    }

    pub fn with_display_error(&self, error: Value) -> Snapshot {
        Snapshot {
            display_error: Arc::new(error),
            ..self.clone()
        }
    }

    pub fn with_display_options(&self, display_options: bool) -> Snapshot {
        Snapshot {
            display_options,
            ..self.clone()
        }
    }

    pub fn with_export_loading(&self, export_loading: bool) -> Snapshot {
        Snapshot {
            export_loading,
            ..self.clone()
        }
    }

    pub fn with_display_export_object_result(&self, result: Value) -> Snapshot {
        Snapshot {
            display_export_object_result: Arc::new(result),
            ..self.clone()
        }
    }

    /// Copy-on-write access to one element record of an owned successor.
    pub(crate) fn element_mut(&mut self, id: &Id) -> Option<&mut Element> {
        if !self.elements.contains_key(id) {
            return None;
        }
        Arc::make_mut(&mut self.elements).get_mut(id).map(Arc::make_mut)
    }

    pub(crate) fn variable_mut(&mut self, id: &Id) -> Option<&mut Variable> {
        if !self.variables.contains_key(id) {
            return None;
        }
        Arc::make_mut(&mut self.variables).get_mut(id).map(Arc::make_mut)
    }
}
