//! JSON codec for the command protocol and for snapshots.
//!
//! Commands arrive as objects tagged by `type`:
//!
//! ```text
//! {"type": "updateElement", "id": "t1", "updateData": {"path": ["data", "items"], "action": "append", "data": 4}}
//! ```
//!
//! Snapshots are encoded in the shape the view layer reads.

use awe_path::path_from_json;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::command::Command;
use crate::snapshot::{Element, Snapshot, Variable};
use crate::tree::{ElementNode, InitialState};
use crate::types::{DecodeError, Id};
use crate::update::{UpdateAction, UpdateData};

// ── Field helpers ─────────────────────────────────────────────────────────

fn as_object<'a>(v: &'a Value, context: &'static str) -> Result<&'a Map<String, Value>, DecodeError> {
    v.as_object().ok_or(DecodeError::NotAnObject(context))
}

fn required<'a>(
    map: &'a Map<String, Value>,
    context: &'static str,
    field: &'static str,
) -> Result<&'a Value, DecodeError> {
    map.get(field).ok_or(DecodeError::MissingField { context, field })
}

/// A present, non-null field.
fn optional<'a>(map: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    map.get(field).filter(|v| !v.is_null())
}

fn invalid(context: &'static str, field: &'static str, reason: impl Into<String>) -> DecodeError {
    DecodeError::InvalidField {
        context,
        field,
        reason: reason.into(),
    }
}

fn decode_id(v: &Value) -> Result<Id, DecodeError> {
    Id::from_json(v).ok_or_else(|| DecodeError::InvalidId(v.to_string()))
}

fn decode_bool(map: &Map<String, Value>, context: &'static str, field: &'static str) -> Result<bool, DecodeError> {
    required(map, context, field)?
        .as_bool()
        .ok_or_else(|| invalid(context, field, "expected a boolean"))
}

fn empty_object() -> Value {
    Value::Object(Map::new())
}

/// Every field of `map` not listed in `known`.
fn extra_fields(map: &Map<String, Value>, known: &[&str]) -> Map<String, Value> {
    map.iter()
        .filter(|(key, _)| !known.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

/// Add `extra` to an encoded record without touching its typed fields.
fn with_extra(mut record: Value, extra: &Map<String, Value>) -> Value {
    if let Value::Object(map) = &mut record {
        for (key, value) in extra {
            map.entry(key.as_str()).or_insert_with(|| value.clone());
        }
    }
    record
}

// `type` is the command tag when a record arrives inline in a command.
const ELEMENT_FIELDS: &[&str] = &[
    "id", "index", "parentId", "elementType", "data", "props", "children", "type",
];
const VARIABLE_FIELDS: &[&str] = &["id", "value", "version", "type"];

// ── Records ───────────────────────────────────────────────────────────────

/// Decode an element record.
///
/// `children` is ignored; fields the engine does not know land in
/// [`Element::extra`].
pub fn decode_element(v: &Value) -> Result<Element, DecodeError> {
    const CTX: &str = "element";
    let map = as_object(v, CTX)?;
    let id = decode_id(required(map, CTX, "id")?)?;
    let index = match optional(map, "index") {
        Some(index) => index
            .as_i64()
            .ok_or_else(|| invalid(CTX, "index", "expected an integer"))?,
        None => 0,
    };
    let parent_id = optional(map, "parentId").map(decode_id).transpose()?;
    let element_type = required(map, CTX, "elementType")?
        .as_str()
        .ok_or_else(|| invalid(CTX, "elementType", "expected a string"))?
        .to_string();
    Ok(Element {
        id,
        index,
        parent_id,
        element_type,
        data: optional(map, "data").cloned().unwrap_or_else(empty_object),
        props: optional(map, "props").cloned().unwrap_or_else(empty_object),
        extra: extra_fields(map, ELEMENT_FIELDS),
    })
}

/// Encode an element record. `children` is always an empty placeholder.
pub fn encode_element(element: &Element) -> Value {
    let record = json!({
        "id": element.id.to_json(),
        "index": element.index,
        "parentId": element.parent_id.as_ref().map(Id::to_json),
        "elementType": element.element_type,
        "data": element.data,
        "props": element.props,
        "children": [],
    });
    with_extra(record, &element.extra)
}

/// Decode a variable record. A missing version is `0`.
pub fn decode_variable(v: &Value) -> Result<Variable, DecodeError> {
    const CTX: &str = "variable";
    let map = as_object(v, CTX)?;
    let id = decode_id(required(map, CTX, "id")?)?;
    let version = match optional(map, "version") {
        Some(version) => version
            .as_u64()
            .ok_or_else(|| invalid(CTX, "version", "expected a non-negative integer"))?,
        None => 0,
    };
    Ok(Variable {
        id,
        value: map.get("value").cloned().unwrap_or(Value::Null),
        version,
        extra: extra_fields(map, VARIABLE_FIELDS),
    })
}

pub fn encode_variable(variable: &Variable) -> Value {
    let record = json!({
        "id": variable.id.to_json(),
        "value": variable.value,
        "version": variable.version,
    });
    with_extra(record, &variable.extra)
}

/// Decode one node of the initial tree, recursively.
pub fn decode_element_node(v: &Value) -> Result<ElementNode, DecodeError> {
    let element = decode_element(v)?;
    let children = match v.get("children").filter(|c| !c.is_null()) {
        Some(Value::Array(children)) => children
            .iter()
            .map(decode_element_node)
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(invalid("element", "children", "expected a list")),
        None => Vec::new(),
    };
    Ok(ElementNode { element, children })
}

/// Decode the initialization payload `{style, variables, children}`.
///
/// `variables` may be a mapping keyed by id (the usual form) or a list.
pub fn decode_initial_state(v: &Value) -> Result<InitialState, DecodeError> {
    const CTX: &str = "initial state";
    let map = as_object(v, CTX)?;
    let style = optional(map, "style").cloned().unwrap_or_else(empty_object);
    let variables = match optional(map, "variables") {
        Some(Value::Object(vars)) => vars.values().map(decode_variable).collect::<Result<Vec<_>, _>>()?,
        Some(Value::Array(vars)) => vars.iter().map(decode_variable).collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(invalid(CTX, "variables", "expected a mapping or a list")),
        None => Vec::new(),
    };
    let children = match optional(map, "children") {
        Some(Value::Array(children)) => children
            .iter()
            .map(decode_element_node)
            .collect::<Result<Vec<_>, _>>()?,
        Some(_) => return Err(invalid(CTX, "children", "expected a list")),
        None => Vec::new(),
    };
    Ok(InitialState {
        style,
        variables,
        children,
    })
}

/// Decode `{path?, action, data}`. Unknown actions are an error.
pub fn decode_update_data(v: &Value) -> Result<UpdateData, DecodeError> {
    const CTX: &str = "updateData";
    let map = as_object(v, CTX)?;
    let path = match optional(map, "path") {
        Some(path) => path_from_json(path)
            .ok_or_else(|| invalid(CTX, "path", "expected a list of keys and indices"))?,
        None => Vec::new(),
    };
    let action: UpdateAction = required(map, CTX, "action")?
        .as_str()
        .ok_or_else(|| invalid(CTX, "action", "expected a string"))?
        .parse()?;
    let data = map.get("data").cloned().unwrap_or(Value::Null);
    Ok(UpdateData { path, action, data })
}

// ── Commands ──────────────────────────────────────────────────────────────

/// Decode one protocol message. Unrecognised `type` tags decode to
/// [`Command::Unknown`].
pub fn decode_command(v: &Value) -> Result<Command, DecodeError> {
    const CTX: &str = "command";
    let map = as_object(v, CTX)?;
    let kind = required(map, CTX, "type")?
        .as_str()
        .ok_or_else(|| invalid(CTX, "type", "expected a string"))?;

    let command = match kind {
        "processInitialState" => Command::ProcessInitialState(decode_initial_state(v)?),
        "newElement" => Command::NewElement(decode_element(v)?),
        "removeElements" => {
            let ids = required(map, "removeElements", "ids")?
                .as_array()
                .ok_or_else(|| invalid("removeElements", "ids", "expected a list"))?
                .iter()
                .map(decode_id)
                .collect::<Result<Vec<_>, _>>()?;
            Command::RemoveElements { ids }
        }
        "newVariable" => Command::NewVariable(decode_variable(v)?),
        "updateElement" => Command::UpdateElement {
            id: decode_id(required(map, "updateElement", "id")?)?,
            update: decode_update_data(required(map, "updateElement", "updateData")?)?,
        },
        "updateVariable" => {
            let version = match optional(map, "version") {
                // Negative versions are the legacy "internal write" marker.
                Some(version) if version.as_i64().is_some_and(|n| n < 0) => None,
                Some(version) => Some(version.as_u64().ok_or_else(|| {
                    invalid("updateVariable", "version", "expected an integer")
                })?),
                None => None,
            };
            Command::UpdateVariable {
                id: decode_id(required(map, "updateVariable", "id")?)?,
                value: map.get("value").cloned().unwrap_or(Value::Null),
                version,
            }
        }
        "displayError" => Command::DisplayError {
            error: required(map, "displayError", "error")?.clone(),
        },
        "displayOptions" => Command::DisplayOptions {
            display_options: decode_bool(map, "displayOptions", "displayOptions")?,
        },
        "exportLoading" => Command::ExportLoading {
            export_loading: decode_bool(map, "exportLoading", "exportLoading")?,
        },
        "displayExportObjectResult" => Command::DisplayExportObjectResult {
            result: required(map, "displayExportObjectResult", "displayExportObjectResult")?.clone(),
        },
        other => Command::Unknown {
            kind: other.to_string(),
        },
    };
    Ok(command)
}

// ── Snapshot ──────────────────────────────────────────────────────────────

/// Key records by [`Id::as_key`]. When an integer and a string id share a
/// key, the record inserted last wins.
fn keyed<'a>(
    collection: &'static str,
    records: impl Iterator<Item = (&'a Id, Value)>,
) -> Map<String, Value> {
    let mut out = Map::new();
    for (id, record) in records {
        if out.insert(id.as_key(), record).is_some() {
            debug!(collection, %id, "encoded key collision, keeping the later record");
        }
    }
    out
}

/// Encode a snapshot for the view layer.
pub fn encode_snapshot(snapshot: &Snapshot) -> Value {
    let elements = keyed("elements", snapshot.elements().map(|e| (&e.id, encode_element(e))));
    let variables = keyed("variables", snapshot.variables().map(|v| (&v.id, encode_variable(v))));
    json!({
        "elements": elements,
        "variables": variables,
        "style": snapshot.style(),
        "displayError": snapshot.display_error(),
        "displayOptions": snapshot.display_options(),
        "exportLoading": snapshot.export_loading(),
        "displayExportObjectResult": snapshot.display_export_object_result(),
    })
}

// ── Tests ─────────────────────────────────────────────────────────────────
