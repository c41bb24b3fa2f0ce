//! Tree representation of a settings mapping
//!
//! Conversion rules:
//! - Mappings become internal nodes, recursively
//! - Keys are normalized (`-` and `/` become `_`)
//! - Keys that are empty or start with `_` are skipped
//! - A mapping without usable keys becomes `ConfigNode::Empty`
//! - Everything else (scalars, sequences) is kept verbatim as a leaf

use serde_json::Value;
use std::collections::BTreeMap;

use crate::{segments, Mapping, TreeError};

/// A node of an immutable configuration tree
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigNode {
    /// A non-mapping value: string, number, boolean, null or sequence
    Leaf(Value),

    /// Named fields, keyed by normalized name
    Node(BTreeMap<String, ConfigNode>),

    /// A mapping that had no usable keys
    Empty,
}

/// Normalize a mapping key into a field name.
pub fn normalize_key(key: &str) -> String {
    key.replace(|c: char| c == '-' || c == '/', "_")
}

fn is_usable_key(key: &str) -> bool {
    !key.is_empty() && !key.starts_with('_')
}

/// Convert a plain mapping into a configuration tree.
///
/// Fails with [`TreeError::MalformedConfig`] if two keys of the same
/// mapping normalize to the same field name.
pub fn to_tree(raw: &Mapping) -> Result<ConfigNode, TreeError> {
    let mut fields: BTreeMap<String, ConfigNode> = BTreeMap::new();
    let mut origins: BTreeMap<String, &str> = BTreeMap::new();

    for (key, value) in raw {
        if !is_usable_key(key) {
            continue;
        }

        let node = match value {
            Value::Object(child) => to_tree(child)?,
            other => ConfigNode::Leaf(other.clone()),
        };

        let normalized = normalize_key(key);
        if let Some(first) = origins.insert(normalized.clone(), key.as_str()) {
            return Err(TreeError::MalformedConfig {
                first: first.to_string(),
                second: key.clone(),
                normalized,
            });
        }
        fields.insert(normalized, node);
    }

    if fields.is_empty() {
        Ok(ConfigNode::Empty)
    } else {
        Ok(ConfigNode::Node(fields))
    }
}

/// Expand a tree back into a plain mapping.
///
/// Keys come out normalized: original keys containing `-` or `/` cannot be
/// recovered. A leaf has no fields and expands to an empty mapping; use
/// [`ConfigNode::to_value`] to keep it.
pub fn to_mapping(node: &ConfigNode) -> Mapping {
    match node {
        ConfigNode::Node(fields) => fields
            .iter()
            .map(|(key, child)| (key.clone(), child.to_value()))
            .collect(),
        ConfigNode::Leaf(_) | ConfigNode::Empty => Mapping::new(),
    }
}

impl ConfigNode {
    /// Build a tree from any JSON value.
    ///
    /// Objects go through [`to_tree`]; other values become leaves.
    pub fn from_value(value: &Value) -> Result<Self, TreeError> {
        match value {
            Value::Object(map) => to_tree(map),
            other => Ok(ConfigNode::Leaf(other.clone())),
        }
    }

    /// Convert back into a JSON value (`Empty` becomes `{}`)
    pub fn to_value(&self) -> Value {
        match self {
            ConfigNode::Leaf(value) => value.clone(),
            ConfigNode::Node(_) | ConfigNode::Empty => Value::Object(to_mapping(self)),
        }
    }

    /// Attribute-style access to a direct child.
    ///
    /// The field name is normalized the same way keys are.
    pub fn get(&self, field: &str) -> Option<&ConfigNode> {
        match self {
            ConfigNode::Node(fields) => fields.get(&normalize_key(field)),
            ConfigNode::Leaf(_) | ConfigNode::Empty => None,
        }
    }

    /// Iterate over the fields of an internal node (nothing for leaves)
    pub fn fields(&self) -> impl Iterator<Item = (&str, &ConfigNode)> {
        let fields = match self {
            ConfigNode::Node(fields) => Some(fields),
            ConfigNode::Leaf(_) | ConfigNode::Empty => None,
        };
        fields
            .into_iter()
            .flat_map(|f| f.iter().map(|(k, v)| (k.as_str(), v)))
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, ConfigNode::Empty)
    }

    pub fn as_leaf(&self) -> Option<&Value> {
        match self {
            ConfigNode::Leaf(value) => Some(value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        self.as_leaf().and_then(Value::as_str)
    }

    /// Walk a dotted path and return the node it names
    pub fn node_at(&self, path: &str) -> Result<&ConfigNode, TreeError> {
        let mut current = self;
        for segment in segments(path)? {
            current = current.get(segment).ok_or_else(|| TreeError::PathNotFound {
                path: path.to_string(),
                segment: segment.to_string(),
            })?;
        }
        Ok(current)
    }

    /// Like [`node_at`](Self::node_at), but a missing field selects `None`
    pub fn find(&self, path: &str) -> Result<Option<&ConfigNode>, TreeError> {
        match self.node_at(path) {
            Ok(node) => Ok(Some(node)),
            Err(TreeError::PathNotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Select the value at a dotted path
    pub fn value_at(&self, path: &str) -> Result<Value, TreeError> {
        self.node_at(path).map(ConfigNode::to_value)
    }

    pub fn str_at(&self, path: &str) -> Result<&str, TreeError> {
        self.node_at(path)?
            .as_str()
            .ok_or_else(|| mismatch(path, "a string"))
    }

    /// Like [`str_at`](Self::str_at), but null selects `None`
    pub fn opt_str_at(&self, path: &str) -> Result<Option<&str>, TreeError> {
        match self.node_at(path)? {
            ConfigNode::Leaf(Value::Null) => Ok(None),
            ConfigNode::Leaf(Value::String(s)) => Ok(Some(s)),
            _ => Err(mismatch(path, "a string or null")),
        }
    }

    pub fn bool_at(&self, path: &str) -> Result<bool, TreeError> {
        self.node_at(path)?
            .as_leaf()
            .and_then(Value::as_bool)
            .ok_or_else(|| mismatch(path, "a boolean"))
    }

    pub fn i64_at(&self, path: &str) -> Result<i64, TreeError> {
        self.node_at(path)?
            .as_leaf()
            .and_then(Value::as_i64)
            .ok_or_else(|| mismatch(path, "an integer"))
    }

    /// Select a sequence of strings. Null selects an empty list.
    pub fn strings_at(&self, path: &str) -> Result<Vec<String>, TreeError> {
        match self.node_at(path)? {
            ConfigNode::Leaf(Value::Null) => Ok(Vec::new()),
            ConfigNode::Leaf(Value::Array(items)) => items
                .iter()
                .map(|item| {
                    item.as_str()
                        .map(str::to_string)
                        .ok_or_else(|| mismatch(path, "a list of strings"))
                })
                .collect(),
            _ => Err(mismatch(path, "a list of strings")),
        }
    }
}

fn mismatch(path: &str, expected: &'static str) -> TreeError {
    TreeError::TypeMismatch {
        path: path.to_string(),
        expected,
    }
}
