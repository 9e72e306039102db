//! Patch apply logic.
//!
//! The address of a patch is `[collection, id, ...path]`. The collection and
//! id select one record; `path` is then resolved inside that record. Patches
//! under `data`/`props` (elements) or `value` (variables) go straight to the
//! opaque payload; anything else goes through the encoded record so typed
//! fields such as `index` or `parentId` can be patched too.

use awe_path::{format_path, PathStep};
use serde_json::Value;

use super::action::{UpdateAction, UpdateData};
use crate::chart::add_chart_data;
use crate::codec::json::{decode_element, decode_variable, encode_element, encode_variable};
use crate::snapshot::{Element, Snapshot, Variable};
use crate::types::{Id, StoreError};

// ── Value-level verbs ─────────────────────────────────────────────────────

fn sequence_at<'a>(doc: &'a mut Value, path: &[PathStep]) -> Result<&'a mut Vec<Value>, StoreError> {
    match awe_path::get_mut(doc, path)? {
        Value::Array(items) => Ok(items),
        _ => Err(StoreError::NotASequence {
            path: format_path(path),
        }),
    }
}

/// Apply one verb at `path` inside `doc` (in-place).
pub fn apply_at(
    doc: &mut Value,
    path: &[PathStep],
    action: UpdateAction,
    data: Value,
) -> Result<(), StoreError> {
    match action {
        UpdateAction::Set => {
            awe_path::set(doc, path, data)?;
        }
        UpdateAction::Append => sequence_at(doc, path)?.push(data),
        UpdateAction::Prepend => sequence_at(doc, path)?.insert(0, data),
        UpdateAction::Extend => {
            let items = sequence_at(doc, path)?;
            match data {
                Value::Array(tail) => items.extend(tail),
                single => items.push(single),
            }
        }
        UpdateAction::AddChartData => match awe_path::get_mut(doc, path)? {
            Value::Object(charts) => add_chart_data(charts, &data)?,
            _ => {
                return Err(StoreError::MalformedChart(format!(
                    "value at {:?} is not a chart mapping",
                    format_path(path)
                )))
            }
        },
    }
    Ok(())
}

// ── Record-level patches ──────────────────────────────────────────────────

fn split_field<'a>(path: &'a [PathStep], field: &str) -> Option<&'a [PathStep]> {
    match path.split_first() {
        Some((first, rest)) if first.as_key() == field => Some(rest),
        _ => None,
    }
}

/// Apply `update` to a single element record.
pub fn patch_element(element: &mut Element, update: UpdateData) -> Result<(), StoreError> {
    let UpdateData { path, action, data } = update;
    if let Some(rest) = split_field(&path, "data") {
        return apply_at(&mut element.data, rest, action, data);
    }
    if let Some(rest) = split_field(&path, "props") {
        return apply_at(&mut element.props, rest, action, data);
    }

    let mut record = encode_element(element);
    apply_at(&mut record, &path, action, data)?;
    keep_id(&mut record, &element.id);
    let mut next = decode_element(&record).map_err(|e| StoreError::InvalidRecord(e.to_string()))?;
    next.id = element.id.clone();
    ensure_kept(&record, &encode_element(&next))?;
    *element = next;
    Ok(())
}

/// Apply `update` to a single variable record.
pub fn patch_variable(variable: &mut Variable, update: UpdateData) -> Result<(), StoreError> {
    let UpdateData { path, action, data } = update;
    if let Some(rest) = split_field(&path, "value") {
        return apply_at(&mut variable.value, rest, action, data);
    }

    let mut record = encode_variable(variable);
    apply_at(&mut record, &path, action, data)?;
    keep_id(&mut record, &variable.id);
    let mut next = decode_variable(&record).map_err(|e| StoreError::InvalidRecord(e.to_string()))?;
    next.id = variable.id.clone();
    ensure_kept(&record, &encode_variable(&next))?;
    *variable = next;
    Ok(())
}

/// Every field written into the patched record must read back unchanged
/// from the decoded one. Fields the record cannot hold, such as `children`,
/// fail instead of being dropped.
fn ensure_kept(patched: &Value, decoded: &Value) -> Result<(), StoreError> {
    let Value::Object(fields) = patched else {
        return Ok(());
    };
    for (key, value) in fields {
        if key == "id" {
            continue;
        }
        if decoded.get(key) != Some(value) {
            return Err(StoreError::InvalidRecord(format!(
                "field `{key}` cannot be stored on the record"
            )));
        }
    }
    Ok(())
}

/// A replaced record may omit its id; the map key stays authoritative.
fn keep_id(record: &mut Value, id: &Id) {
    if let Value::Object(map) = record {
        map.entry("id").or_insert_with(|| id.to_json());
    }
}

// ── Snapshot-level entry points ───────────────────────────────────────────

/// `updateElement`: patch the element `id`, producing a new snapshot.
pub fn update_element(snapshot: &Snapshot, id: &Id, update: UpdateData) -> Result<Snapshot, StoreError> {
    let mut next = snapshot.clone();
    let element = next
        .element_mut(id)
        .ok_or_else(|| StoreError::UnknownElement(id.clone()))?;
    patch_element(element, update)?;
    Ok(next)
}

/// Path patch against the variable `id`. Unlike
/// [`crate::variable::update_variable`] this ignores versions.
pub fn update_variable_path(snapshot: &Snapshot, id: &Id, update: UpdateData) -> Result<Snapshot, StoreError> {
    let mut next = snapshot.clone();
    let variable = next
        .variable_mut(id)
        .ok_or_else(|| StoreError::UnknownVariable(id.clone()))?;
    patch_variable(variable, update)?;
    Ok(next)
}

// ── Tests ─────────────────────────────────────────────────────────────────
