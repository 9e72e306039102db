//! Property-based invariant tests for the state engine.
//!
//! 1. Authoritative variable writes are monotonic in version.
//! 2. Internal writes always apply and never move the version.
//! 3. `removeElements` is idempotent and never fails.
//! 4. Chart merging ignores the order of distinct series in a batch.
//! 5. Chart merging preserves point order within a series.
//! 6. The initial tree survives flattening: `parentId` chains rebuild it.
//! 7. Older snapshots never observe later commands.

use std::collections::BTreeSet;

use awe_store::chart::merge_series;
use awe_store::{
    reduce, update_variable, ChildIndex, Command, Element, ElementNode, Id, InitialState, Snapshot,
    UpdateData, Variable,
};
use proptest::prelude::*;
use proptest::sample::Index;
use serde_json::{json, Value};

// ── Helpers ─────────────────────────────────────────────────────────────

fn with_x() -> Snapshot {
    Snapshot::new().with_variable(Variable::new("x", json!("init"), 0))
}

/// `parents[i]` is the parent of node `i`, always an earlier node, or `None`.
fn parents_strategy() -> impl Strategy<Value = Vec<Option<usize>>> {
    prop::collection::vec(any::<Index>(), 1..40).prop_map(|picks| {
        picks
            .iter()
            .enumerate()
            .map(|(i, pick)| {
                let p = pick.index(i + 1);
                (p < i).then_some(p)
            })
            .collect()
    })
}

fn build_node(i: usize, parents: &[Option<usize>]) -> ElementNode {
    let children = (0..parents.len())
        .filter(|&j| parents[j] == Some(i))
        .map(|j| build_node(j, parents))
        .collect();
    ElementNode::with_children(
        Element::new(Id::Int(i as i64), "Box").with_index(i as i64),
        children,
    )
}

fn build_tree(parents: &[Option<usize>]) -> Vec<ElementNode> {
    (0..parents.len())
        .filter(|&i| parents[i].is_none())
        .map(|i| build_node(i, parents))
        .collect()
}

fn series_batch_strategy() -> impl Strategy<Value = Vec<Value>> {
    prop::collection::btree_set("[a-f]{1,3}", 0..6).prop_map(|names| {
        names
            .into_iter()
            .enumerate()
            .map(|(i, name)| json!({"name": name, "data": [i]}))
            .collect()
    })
}

// ═════════════════════════════════════════════════════════════════════════
// 1. Authoritative writes are monotonic
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn highest_version_wins(writes in prop::collection::vec((any::<i32>(), 0u64..20), 0..30)) {
        let x = Id::from("x");
        let mut snapshot = with_x();
        let (mut model_value, mut model_version) = (json!("init"), 0u64);

        for (value, version) in writes {
            let before = snapshot.variable(&x).cloned();
            snapshot = update_variable(&snapshot, &x, json!(value), Some(version)).0;
            let after = snapshot.variable(&x).cloned();

            if version > model_version {
                model_value = json!(value);
                model_version = version;
            } else {
                prop_assert_eq!(before, after, "stale write {} changed the variable", version);
            }
        }

        let stored = snapshot.variable(&x).unwrap();
        prop_assert_eq!(&stored.value, &model_value);
        prop_assert_eq!(stored.version, model_version);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 2. Internal writes always apply
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn internal_writes_keep_version(
        writes in prop::collection::vec((any::<i32>(), prop::option::of(0u64..20)), 1..30)
    ) {
        let x = Id::from("x");
        let mut snapshot = with_x();
        let mut model_version = 0u64;

        for (value, version) in writes {
            snapshot = update_variable(&snapshot, &x, json!(value), version).0;
            let stored = snapshot.variable(&x).unwrap();
            match version {
                None => {
                    prop_assert_eq!(&stored.value, &json!(value));
                    prop_assert_eq!(stored.version, model_version);
                }
                Some(v) if v > model_version => model_version = v,
                Some(_) => {}
            }
            prop_assert_eq!(stored.version, model_version);
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 3. Removal is idempotent
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn remove_elements_idempotent(
        present in prop::collection::btree_set(0i64..30, 0..20),
        removed in prop::collection::vec(0i64..40, 0..20),
    ) {
        let mut snapshot = Snapshot::new();
        for id in &present {
            snapshot = snapshot.with_element(Element::new(Id::Int(*id), "Text"));
        }
        let ids: Vec<Id> = removed.iter().map(|id| Id::Int(*id)).collect();

        let once = reduce(&snapshot, Command::RemoveElements { ids: ids.clone() }).unwrap();
        let twice = reduce(&once, Command::RemoveElements { ids: ids.clone() }).unwrap();
        prop_assert_eq!(&once, &twice);

        let expected: BTreeSet<i64> = present
            .iter()
            .copied()
            .filter(|id| !removed.contains(id))
            .collect();
        prop_assert_eq!(once.element_count(), expected.len());
        for id in expected {
            prop_assert!(once.element(&Id::Int(id)).is_some());
        }
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 4. Distinct series merge as a set
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn distinct_series_order_insensitive(
        existing in series_batch_strategy(),
        incoming in series_batch_strategy(),
        rotate in any::<Index>(),
    ) {
        let mut forward = existing.clone();
        merge_series(&mut forward, &incoming).unwrap();

        let mut shuffled = incoming.clone();
        if !shuffled.is_empty() {
            let k = rotate.index(shuffled.len());
            shuffled.rotate_left(k);
        }
        let mut rotated = existing.clone();
        merge_series(&mut rotated, &shuffled).unwrap();

        let as_set = |series: &[Value]| series.iter().map(Value::to_string).collect::<BTreeSet<_>>();
        prop_assert_eq!(as_set(&forward), as_set(&rotated));
        prop_assert_eq!(&forward[..existing.len()], &rotated[..existing.len()]);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Points keep arrival order
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn points_append_in_order(batches in prop::collection::vec(prop::collection::vec(any::<i16>(), 0..5), 1..10)) {
        let mut series = Vec::new();
        for points in &batches {
            merge_series(&mut series, &[json!({"name": "s", "data": points})]).unwrap();
        }
        let expected: Vec<Value> = batches.iter().flatten().map(|p| json!(p)).collect();
        prop_assert_eq!(series.len(), 1);
        prop_assert_eq!(&series[0]["data"], &Value::Array(expected));
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Tree round-trip through parentId
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn tree_roundtrip(parents in parents_strategy()) {
        let initial = InitialState {
            style: json!({}),
            variables: Vec::new(),
            children: build_tree(&parents),
        };
        let snapshot = reduce(&Snapshot::new(), Command::ProcessInitialState(initial)).unwrap();
        prop_assert_eq!(snapshot.element_count(), parents.len());

        for (i, parent) in parents.iter().enumerate() {
            let element = snapshot.element(&Id::Int(i as i64)).unwrap();
            prop_assert_eq!(&element.parent_id, &parent.map(|p| Id::Int(p as i64)));
        }

        let index = ChildIndex::build(&snapshot);
        for i in 0..parents.len() {
            let expected: Vec<Id> = (0..parents.len())
                .filter(|&j| parents[j] == Some(i))
                .map(|j| Id::Int(j as i64))
                .collect();
            prop_assert_eq!(index.children(&Id::Int(i as i64)), expected.as_slice());
        }
        prop_assert_eq!(index.dangling_parents(&snapshot).count(), 0);
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 7. Snapshots are immutable
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn earlier_snapshot_unaffected(items in prop::collection::vec(any::<i32>(), 1..10)) {
        let s0 = Snapshot::new()
            .with_element(Element::new("list", "List").with_data(json!({"items": []})))
            .with_element(Element::new("other", "Text"));
        let frozen = s0.clone();

        let mut current = s0.clone();
        for item in &items {
            let update = UpdateData::append(awe_path::parse_path("/data/items"), json!(item));
            current = reduce(&current, Command::UpdateElement { id: Id::from("list"), update }).unwrap();
        }

        prop_assert_eq!(&s0, &frozen);
        prop_assert_eq!(&current.element(&Id::from("list")).unwrap().data["items"], &json!(items));
        prop_assert!(current.shares_element(&s0, &Id::from("other")));
    }
}
