//! Incremental merge of streamed chart data.
//!
//! A chart-typed element keeps its charts in a mapping keyed by title:
//!
//! ```text
//! { "<title>": { "title": "<title>", "type": "line", "series": [ { "name": "s1", "data": [...] }, ... ] } }
//! ```
//!
//! Each batch from the server carries chart configs in the same shape. Points
//! for a series that already exists are appended to it; series seen for the
//! first time are appended to the series list. Nothing is ever dropped or
//! reordered.

use std::collections::{HashMap, HashSet};

use serde_json::{json, Map, Value};

use crate::types::StoreError;

fn malformed(msg: impl Into<String>) -> StoreError {
    StoreError::MalformedChart(msg.into())
}

/// Chart configs of a batch: a list, or the values of a mapping.
fn batch_configs(batch: &Value) -> Result<Vec<&Value>, StoreError> {
    match batch {
        Value::Array(items) => Ok(items.iter().collect()),
        Value::Object(map) => Ok(map.values().collect()),
        _ => Err(malformed("chart batch must be a list or a mapping")),
    }
}

fn series_name(series: &Value) -> Result<String, StoreError> {
    match series.get("name") {
        Some(Value::String(name)) => Ok(name.clone()),
        Some(Value::Null) | None => Err(malformed("series without a name")),
        Some(other) => Ok(other.to_string()),
    }
}

fn series_points(series: &Value) -> Result<&[Value], StoreError> {
    match series.get("data") {
        Some(Value::Array(points)) => Ok(points.as_slice()),
        None => Ok(&[][..]),
        Some(_) => Err(malformed("series data must be a list")),
    }
}

/// Merge `incoming` series into the `existing` series list of one chart.
///
/// Existing series are extended in place by position, so the pass over
/// `existing` happens once regardless of how many series match. If `incoming`
/// repeats a known name, the last occurrence wins.
pub fn merge_series(existing: &mut Vec<Value>, incoming: &[Value]) -> Result<(), StoreError> {
    let known = existing
        .iter()
        .map(series_name)
        .collect::<Result<HashSet<_>, _>>()?;

    let mut updates: HashMap<String, &[Value]> = HashMap::new();
    let mut fresh: Vec<&Value> = Vec::new();
    for series in incoming {
        let name = series_name(series)?;
        let points = series_points(series)?;
        if known.contains(&name) {
            updates.insert(name, points);
        } else {
            fresh.push(series);
        }
    }

    if !updates.is_empty() {
        for series in existing.iter_mut() {
            let Some(points) = updates.get(&series_name(series)?) else {
                continue;
            };
            let record = series
                .as_object_mut()
                .ok_or_else(|| malformed("series must be an object"))?;
            match record.entry("data").or_insert_with(|| Value::Array(Vec::new())) {
                Value::Array(data) => data.extend(points.iter().cloned()),
                _ => return Err(malformed("series data must be a list")),
            }
        }
    }

    existing.extend(fresh.into_iter().cloned());
    Ok(())
}

/// Merge a batch of chart configs into a chart mapping keyed by title.
///
/// A chart seen for the first time is created with the config's `type` and
/// an empty series list before its series are merged.
pub fn add_chart_data(charts: &mut Map<String, Value>, batch: &Value) -> Result<(), StoreError> {
    for config in batch_configs(batch)? {
        let title = config
            .get("title")
            .and_then(Value::as_str)
            .ok_or_else(|| malformed("chart config without a string title"))?;
        let incoming = match config.get("series") {
            Some(Value::Array(series)) => series.as_slice(),
            None => &[][..],
            Some(_) => return Err(malformed(format!("series of chart {title:?} must be a list"))),
        };

        let chart = charts.entry(title).or_insert_with(|| {
            json!({
                "title": title,
                "type": config.get("type").cloned().unwrap_or(Value::Null),
                "series": [],
            })
        });
        let series = chart
            .get_mut("series")
            .and_then(Value::as_array_mut)
            .ok_or_else(|| malformed(format!("chart {title:?} has no series list")))?;
        merge_series(series, incoming)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn charts(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn extends_existing_and_appends_new_series() {
        let mut map = charts(json!({
            "T": {"title": "T", "type": "line", "series": [{"name": "s1", "data": [1, 2]}]}
        }));
        let batch = json!([
            {"title": "T", "type": "line", "series": [{"name": "s1", "data": [3]}, {"name": "s2", "data": [9]}]}
        ]);
        add_chart_data(&mut map, &batch).unwrap();
        assert_eq!(
            map["T"]["series"],
            json!([{"name": "s1", "data": [1, 2, 3]}, {"name": "s2", "data": [9]}])
        );
    }

    #[test]
    fn creates_missing_chart() {
        let mut map = Map::new();
        let batch = json!([{"title": "cpu", "type": "area", "series": [{"name": "a", "data": [[0, 1]]}]}]);
        add_chart_data(&mut map, &batch).unwrap();
        assert_eq!(
            map["cpu"],
            json!({"title": "cpu", "type": "area", "series": [{"name": "a", "data": [[0, 1]]}]})
        );
    }

    #[test]
    fn type_is_set_once() {
        let mut map = Map::new();
        add_chart_data(&mut map, &json!([{"title": "T", "type": "line", "series": []}])).unwrap();
        add_chart_data(&mut map, &json!([{"title": "T", "type": "bar", "series": []}])).unwrap();
        assert_eq!(map["T"]["type"], json!("line"));
    }

    #[test]
    fn repeated_title_in_one_batch() {
        let mut map = Map::new();
        let batch = json!([
            {"title": "T", "type": "line", "series": [{"name": "s", "data": [1]}]},
            {"title": "T", "type": "line", "series": [{"name": "s", "data": [2]}]}
        ]);
        add_chart_data(&mut map, &batch).unwrap();
        assert_eq!(map["T"]["series"], json!([{"name": "s", "data": [1, 2]}]));
    }

    #[test]
    fn batch_as_mapping() {
        let mut map = Map::new();
        let batch = json!({"x": {"title": "T", "type": "line", "series": [{"name": "s", "data": [5]}]}});
        add_chart_data(&mut map, &batch).unwrap();
        assert_eq!(map["T"]["series"][0]["data"], json!([5]));
    }

    #[test]
    fn new_series_keep_extra_fields() {
        let mut existing = vec![];
        merge_series(&mut existing, &[json!({"name": "s", "data": [1], "color": "red"})]).unwrap();
        assert_eq!(existing, vec![json!({"name": "s", "data": [1], "color": "red"})]);
    }

    #[test]
    fn last_duplicate_wins_for_known_series() {
        let mut existing = vec![json!({"name": "s", "data": [0]})];
        let incoming = [json!({"name": "s", "data": [1]}), json!({"name": "s", "data": [2]})];
        merge_series(&mut existing, &incoming).unwrap();
        assert_eq!(existing, vec![json!({"name": "s", "data": [0, 2]})]);
    }

    #[test]
    fn malformed_batches() {
        let mut map = Map::new();
        assert!(add_chart_data(&mut map, &json!(3)).is_err());
        assert!(add_chart_data(&mut map, &json!([{"series": []}])).is_err());
        assert!(add_chart_data(&mut map, &json!([{"title": "T", "series": {}}])).is_err());
        assert!(add_chart_data(&mut map, &json!([{"title": "T", "series": [{"data": []}]}])).is_err());
    }
}
