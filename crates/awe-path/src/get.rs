use serde_json::{Map, Value};

use crate::types::PathStep;
use crate::{format_path, PathError};

/// Get a value from a document by path.
pub fn get<'a>(val: &'a Value, path: &[PathStep]) -> Option<&'a Value> {
    let mut current = val;
    for step in path {
        current = match current {
            Value::Array(arr) => arr.get(step.as_index()?)?,
            Value::Object(map) => map.get(step.as_key().as_ref())?,
            _ => return None,
        };
    }
    Some(current)
}

/// Get a mutable reference to an existing value by path.
pub fn get_mut<'a>(val: &'a mut Value, path: &[PathStep]) -> Result<&'a mut Value, PathError> {
    let mut current = val;
    for (i, step) in path.iter().enumerate() {
        current = match current {
            Value::Array(arr) => {
                let len = arr.len();
                let idx = step.as_index().ok_or_else(|| PathError::InvalidIndex {
                    step: step.to_string(),
                })?;
                arr.get_mut(idx)
                    .ok_or(PathError::IndexOutOfBounds { index: idx, len })?
            }
            Value::Object(map) => map.get_mut(step.as_key().as_ref()).ok_or_else(|| {
                PathError::NotFound {
                    at: format_path(&path[..=i]),
                }
            })?,
            _ => {
                return Err(PathError::NotAContainer {
                    at: format_path(&path[..i]),
                })
            }
        };
    }
    Ok(current)
}

/// Write `value` at `path`, returning the value it replaced.
///
/// Missing object keys along the way are created as empty objects. A list
/// position equal to the list length appends; anything past it is an error.
pub fn set(doc: &mut Value, path: &[PathStep], value: Value) -> Result<Option<Value>, PathError> {
    let Some((leaf, parent_path)) = path.split_last() else {
        return Ok(Some(std::mem::replace(doc, value)));
    };
    let parent = get_or_create_mut(doc, parent_path)?;
    match parent {
        Value::Object(map) => Ok(map.insert(leaf.as_key().into_owned(), value)),
        Value::Array(arr) => {
            let idx = leaf.as_index().ok_or_else(|| PathError::InvalidIndex {
                step: leaf.to_string(),
            })?;
            let len = arr.len();
            if idx < len {
                Ok(Some(std::mem::replace(&mut arr[idx], value)))
            } else if idx == len {
                arr.push(value);
                Ok(None)
            } else {
                Err(PathError::IndexOutOfBounds { index: idx, len })
            }
        }
        _ => Err(PathError::NotAContainer {
            at: format_path(parent_path),
        }),
    }
}

fn get_or_create_mut<'a>(val: &'a mut Value, path: &[PathStep]) -> Result<&'a mut Value, PathError> {
    let mut current = val;
    for (i, step) in path.iter().enumerate() {
        current = match current {
            Value::Object(map) => map
                .entry(step.as_key().into_owned())
                .or_insert_with(|| Value::Object(Map::new())),
            Value::Array(arr) => {
                let len = arr.len();
                let idx = step.as_index().ok_or_else(|| PathError::InvalidIndex {
                    step: step.to_string(),
                })?;
                arr.get_mut(idx)
                    .ok_or(PathError::IndexOutOfBounds { index: idx, len })?
            }
            _ => {
                return Err(PathError::NotAContainer {
                    at: format_path(&path[..i]),
                })
            }
        };
    }
    Ok(current)
}
