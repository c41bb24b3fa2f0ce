//! Algebraic laws of conversion and merge, checked over generated mappings

use gha_tree::{merge, select, to_mapping, to_tree, Mapping};
use proptest::prelude::*;
use serde_json::{json, Value};

fn leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-z0-9 :.]{0,8}".prop_map(Value::String),
    ]
}

fn value() -> impl Strategy<Value = Value> {
    leaf().prop_recursive(3, 32, 4, |inner| {
        prop::collection::btree_map("[a-z]{1,4}", inner, 0..4)
            .prop_map(|m| Value::Object(m.into_iter().collect()))
    })
}

fn mapping_with_keys(keys: &'static str) -> impl Strategy<Value = Mapping> {
    prop::collection::btree_map(keys, value(), 0..5).prop_map(|m| m.into_iter().collect())
}

fn mapping() -> impl Strategy<Value = Mapping> {
    mapping_with_keys("[a-z]{1,4}")
}

proptest! {
    #[test]
    fn round_trip_without_normalized_keys(m in mapping()) {
        let tree = to_tree(&m).unwrap();
        prop_assert_eq!(to_mapping(&tree), m);
    }

    #[test]
    fn merge_into_empty_yields_defaults(d in mapping()) {
        prop_assert_eq!(merge(&Mapping::new(), &d), d);
    }

    #[test]
    fn merge_disjoint_is_union(
        v in mapping_with_keys("v[a-z]{0,3}"),
        d in mapping_with_keys("d[a-z]{0,3}"),
    ) {
        let merged = merge(&v, &d);
        prop_assert_eq!(merged.len(), v.len() + d.len());
        for (key, val) in v.iter().chain(d.iter()) {
            prop_assert_eq!(&merged[key], val);
        }
    }

    #[test]
    fn merge_is_idempotent(v in mapping(), d in mapping()) {
        let once = merge(&v, &d);
        let twice = merge(&once, &d);
        prop_assert_eq!(twice, once);
    }

    #[test]
    fn merge_keeps_every_default_key(v in mapping(), d in mapping()) {
        let merged = merge(&v, &d);
        for key in d.keys() {
            prop_assert!(merged.contains_key(key));
        }
    }

    #[test]
    fn select_agrees_between_tree_and_mapping(m in mapping()) {
        let tree = to_tree(&m).unwrap();
        for key in m.keys() {
            prop_assert_eq!(select(&tree, key).unwrap(), select(&m, key).unwrap());
        }
    }
}

#[test]
fn select_examples() {
    let root: Mapping = match json!({"a": {"b": 3}}) {
        Value::Object(map) => map,
        _ => unreachable!(),
    };
    assert_eq!(select(&root, "a.b").unwrap(), json!(3));
    assert!(select(&root, "a.c").is_err());
    assert!(select(&root, "").is_err());
}
