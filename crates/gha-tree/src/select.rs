//! Dotted-path lookup across trees and plain mappings
//!
//! Each segment is resolved against the representation of the current
//! cursor: attribute-style (normalized) on tree nodes, raw-key access on
//! mappings and JSON objects.

use serde_json::Value;

use crate::{segments, ConfigNode, Mapping, TreeError};

/// A root that can be searched with [`select`]
#[derive(Debug, Clone, Copy)]
pub enum Selectable<'a> {
    Tree(&'a ConfigNode),
    Mapping(&'a Mapping),
    Value(&'a Value),
}

impl<'a> From<&'a ConfigNode> for Selectable<'a> {
    fn from(node: &'a ConfigNode) -> Self {
        Selectable::Tree(node)
    }
}

impl<'a> From<&'a Mapping> for Selectable<'a> {
    fn from(map: &'a Mapping) -> Self {
        Selectable::Mapping(map)
    }
}

impl<'a> From<&'a Value> for Selectable<'a> {
    fn from(value: &'a Value) -> Self {
        Selectable::Value(value)
    }
}

impl<'a> Selectable<'a> {
    fn child(self, segment: &str) -> Option<Selectable<'a>> {
        match self {
            Selectable::Tree(node) => node.get(segment).map(Selectable::Tree),
            Selectable::Mapping(map) => map.get(segment).map(Selectable::Value),
            Selectable::Value(Value::Object(map)) => map.get(segment).map(Selectable::Value),
            Selectable::Value(_) => None,
        }
    }

    fn to_value(self) -> Value {
        match self {
            Selectable::Tree(node) => node.to_value(),
            Selectable::Mapping(map) => Value::Object(map.clone()),
            Selectable::Value(value) => value.clone(),
        }
    }
}

/// Select the value named by a dotted path.
///
/// Fails with [`TreeError::InvalidSelector`] for an empty path and with
/// [`TreeError::PathNotFound`] as soon as a segment is missing or the
/// cursor reaches a leaf before the path ends.
pub fn select<'a>(root: impl Into<Selectable<'a>>, path: &str) -> Result<Value, TreeError> {
    let mut current = root.into();
    for segment in segments(path)? {
        current = current.child(segment).ok_or_else(|| TreeError::PathNotFound {
            path: path.to_string(),
            segment: segment.to_string(),
        })?;
    }
    Ok(current.to_value())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::to_tree;
    use serde_json::json;

    fn mapping(value: Value) -> Mapping {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_select_mapping() {
        let root = mapping(json!({"a": {"b": 3}}));
        assert_eq!(select(&root, "a.b").unwrap(), json!(3));
    }

    #[test]
    fn test_select_missing_segment() {
        let root = mapping(json!({"a": {"b": 3}}));
        let err = select(&root, "a.c").unwrap_err();
        assert_eq!(
            err,
            TreeError::PathNotFound {
                path: "a.c".to_string(),
                segment: "c".to_string(),
            }
        );
    }

    #[test]
    fn test_select_empty_selector() {
        let root = mapping(json!({"a": 1}));
        assert!(matches!(
            select(&root, ""),
            Err(TreeError::InvalidSelector { .. })
        ));

        let tree = to_tree(&root).unwrap();
        assert!(matches!(
            select(&tree, ""),
            Err(TreeError::InvalidSelector { .. })
        ));
    }

    #[test]
    fn test_select_through_leaf_fails() {
        let root = mapping(json!({"a": "text"}));
        assert!(matches!(
            select(&root, "a.b"),
            Err(TreeError::PathNotFound { .. })
        ));
    }

    #[test]
    fn test_select_tree_uses_normalized_fields() {
        let tree = to_tree(&mapping(json!({
            "ci": {"runners": {"linux/amd64": "ubuntu-24.04"}}
        })))
        .unwrap();

        assert_eq!(
            select(&tree, "ci.runners.linux_amd64").unwrap(),
            json!("ubuntu-24.04")
        );
    }

    #[test]
    fn test_select_mapping_keeps_raw_keys() {
        let root = mapping(json!({"base-image": "debian:12"}));
        assert_eq!(select(&root, "base-image").unwrap(), json!("debian:12"));
        assert!(select(&root, "base_image").is_err());
    }

    #[test]
    fn test_select_subtree_returns_mapping() {
        let tree = to_tree(&mapping(json!({
            "login": {"github": true, "dockerhub": false}
        })))
        .unwrap();

        assert_eq!(
            select(&tree, "login").unwrap(),
            json!({"github": true, "dockerhub": false})
        );
    }

    #[test]
    fn test_select_json_value_root() {
        let event = json!({"event": {"pull_request": {"number": 42}}});
        assert_eq!(
            select(&event, "event.pull_request.number").unwrap(),
            json!(42)
        );
    }
}
