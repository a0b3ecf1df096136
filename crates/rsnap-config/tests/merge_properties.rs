//! Property tests for layered merge.

use proptest::prelude::*;
use rsnap_config::{merge, merge_all};
use serde_json::{Map, Value};

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i32>().prop_map(Value::from),
        "[a-z#0-9]{0,8}".prop_map(Value::String),
        prop::collection::vec(any::<u8>().prop_map(Value::from), 0..3).prop_map(Value::Array),
    ]
}

fn json_tree() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(3, 24, 4, |inner| {
        prop::collection::btree_map("[a-e]", inner, 0..4)
            .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>()))
    })
}

fn json_object() -> impl Strategy<Value = Value> {
    prop::collection::btree_map("[a-e]", json_tree(), 0..5)
        .prop_map(|m| Value::Object(m.into_iter().collect::<Map<_, _>>()))
}

/// Every leaf path of `value`, paired with the leaf.
fn leaves(value: &Value, prefix: &mut Vec<String>, out: &mut Vec<(Vec<String>, Value)>) {
    match value {
        Value::Object(map) if !map.is_empty() => {
            for (k, v) in map {
                prefix.push(k.clone());
                leaves(v, prefix, out);
                prefix.pop();
            }
        }
        other => out.push((prefix.clone(), other.clone())),
    }
}

fn lookup<'a>(value: &'a Value, path: &[String]) -> Option<&'a Value> {
    path.iter().try_fold(value, |cur, key| cur.get(key))
}

proptest! {
    #[test]
    fn merge_with_empty_is_identity(base in json_object()) {
        let empty = Value::Object(Map::new());
        prop_assert_eq!(merge(&base, &empty), base.clone());
        prop_assert_eq!(merge(&empty, &base), base);
    }

    #[test]
    fn override_leaves_always_win(base in json_object(), over in json_object()) {
        let merged = merge(&base, &over);
        let mut over_leaves = Vec::new();
        leaves(&over, &mut Vec::new(), &mut over_leaves);
        for (path, leaf) in over_leaves {
            // An empty mapping merges into whatever the base holds there.
            if path.is_empty() || leaf == Value::Object(Map::new()) {
                continue;
            }
            prop_assert_eq!(lookup(&merged, &path), Some(&leaf), "path {:?}", path);
        }
    }

    #[test]
    fn base_keys_absent_from_override_survive(base in json_object(), over in json_object()) {
        let merged = merge(&base, &over);
        let (Value::Object(base_map), Value::Object(over_map)) = (&base, &over) else {
            unreachable!()
        };
        for (key, value) in base_map {
            if !over_map.contains_key(key) {
                prop_assert_eq!(merged.get(key), Some(value));
            }
        }
    }

    #[test]
    fn merge_is_idempotent(base in json_object(), over in json_object()) {
        let once = merge(&base, &over);
        prop_assert_eq!(merge(&once, &over), once);
    }

    #[test]
    fn merge_all_matches_pairwise_fold(a in json_object(), b in json_object(), c in json_object()) {
        let folded = merge(&merge(&a, &b), &c);
        prop_assert_eq!(merge_all([&a, &b, &c]), folded);
    }
}
