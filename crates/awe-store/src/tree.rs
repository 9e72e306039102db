//! Initial tree building and the derived parent → children index.

use std::sync::Arc;

use indexmap::IndexMap;
use serde_json::Value;
use tracing::warn;

use crate::snapshot::{Element, Snapshot, Variable};
use crate::types::Id;

/// One node of the nested tree description sent at session start.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementNode {
    pub element: Element,
    pub children: Vec<ElementNode>,
}

impl ElementNode {
    pub fn leaf(element: Element) -> Self {
        Self {
            element,
            children: Vec::new(),
        }
    }

    pub fn with_children(element: Element, children: Vec<ElementNode>) -> Self {
        Self { element, children }
    }
}

/// The full initialization payload.
#[derive(Debug, Clone, PartialEq)]
pub struct InitialState {
    pub style: Value,
    pub variables: Vec<Variable>,
    pub children: Vec<ElementNode>,
}

/// Flatten the initial tree description into `snapshot`.
///
/// Variables are inserted first, then every element at any depth, each with
/// the `parent_id` of its immediate ancestor. Top-level elements get no
/// parent.
pub fn process_initial_state(snapshot: &Snapshot, initial: InitialState) -> Snapshot {
    if !snapshot.is_empty() {
        warn!(
            elements = snapshot.element_count(),
            variables = snapshot.variable_count(),
            "initial state applied to a populated snapshot"
        );
    }
    let InitialState {
        style,
        variables,
        children,
    } = initial;

    let mut next = snapshot.with_style(style);
    let vars = Arc::make_mut(&mut next.variables);
    for variable in variables {
        vars.insert(variable.id.clone(), Arc::new(variable));
    }

    let elements = Arc::make_mut(&mut next.elements);
    let mut stack: Vec<(ElementNode, Option<Id>)> =
        children.into_iter().rev().map(|node| (node, None)).collect();
    while let Some((node, parent_id)) = stack.pop() {
        let ElementNode {
            mut element,
            children,
        } = node;
        element.parent_id = parent_id;
        let id = element.id.clone();
        for child in children.into_iter().rev() {
            stack.push((child, Some(id.clone())));
        }
        elements.insert(id, Arc::new(element));
    }
    next
}

// ── ChildIndex ────────────────────────────────────────────────────────────

/// Parent → ordered child ids, derived from a snapshot on demand.
///
/// The snapshot itself only carries `parent_id` back-references; renderers
/// build this index when they need to walk the tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChildIndex {
    roots: Vec<Id>,
    children: IndexMap<Id, Vec<Id>>,
}

impl ChildIndex {
    /// Siblings are sorted by `index`; ties keep snapshot insertion order.
    pub fn build(snapshot: &Snapshot) -> Self {
        let mut roots: Vec<(i64, Id)> = Vec::new();
        let mut children: IndexMap<Id, Vec<(i64, Id)>> = IndexMap::new();
        for element in snapshot.elements() {
            let entry = (element.index, element.id.clone());
            match &element.parent_id {
                Some(parent) => children.entry(parent.clone()).or_default().push(entry),
                None => roots.push(entry),
            }
        }
        let sorted = |mut ids: Vec<(i64, Id)>| {
            ids.sort_by_key(|(index, _)| *index);
            ids.into_iter().map(|(_, id)| id).collect::<Vec<_>>()
        };
        Self {
            roots: sorted(roots),
            children: children
                .into_iter()
                .map(|(parent, ids)| (parent, sorted(ids)))
                .collect(),
        }
    }

    pub fn roots(&self) -> &[Id] {
        &self.roots
    }

    pub fn children(&self, parent: &Id) -> &[Id] {
        self.children.get(parent).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Parents referenced by some element but absent from `snapshot`.
    pub fn dangling_parents<'a>(&'a self, snapshot: &'a Snapshot) -> impl Iterator<Item = &'a Id> {
        self.children
            .keys()
            .filter(move |parent| snapshot.element(parent).is_none())
    }
}
