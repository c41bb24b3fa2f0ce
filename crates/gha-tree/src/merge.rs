//! Defaults merge
//!
//! `defaults` drives the merge:
//! - Mappings: merged recursively against the matching sub-mapping of
//!   `values` (absent or null counts as empty)
//! - Missing or null values: filled from `defaults`
//! - Explicit values: kept, even when the default is a mapping
//! - Keys only present in `values`: passed through

use serde_json::Value;

use crate::Mapping;

/// Fill the gaps of `values` from `defaults`, producing a new mapping.
///
/// Not commutative: `merge(a, b)` and `merge(b, a)` differ whenever both
/// define the same leaf.
pub fn merge(values: &Mapping, defaults: &Mapping) -> Mapping {
    let mut merged = values.clone();

    for (key, default) in defaults {
        let current = values.get(key);
        let value = match (default, current) {
            (Value::Object(default_map), None | Some(Value::Null)) => {
                Value::Object(merge(&Mapping::new(), default_map))
            }
            (Value::Object(default_map), Some(Value::Object(current_map))) => {
                Value::Object(merge(current_map, default_map))
            }
            (_, None | Some(Value::Null)) => default.clone(),
            (_, Some(current)) => current.clone(),
        };
        merged.insert(key.clone(), value);
    }

    merged
}
