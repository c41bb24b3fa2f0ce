//! Immutable configuration trees for workflow settings.
//!
//! Settings arrive as parsed YAML/JSON mappings. This crate converts them
//! into [`ConfigNode`] trees addressable by dotted attribute paths, fills
//! gaps in one mapping from a mapping of defaults, and selects values by
//! path from either representation.
//!
//! Key normalization (`-` and `/` become `_`) applies to tree fields only.
//! Plain mappings keep their raw keys.

mod error;
mod merge;
mod node;
mod select;

pub use error::TreeError;
pub use merge::merge;
pub use node::{normalize_key, to_mapping, to_tree, ConfigNode};
pub use select::{select, Selectable};

/// A plain string-keyed mapping as produced by the YAML/JSON parsers.
pub type Mapping = serde_json::Map<String, serde_json::Value>;

/// Split a dotted selector into its segments.
///
/// Empty selectors and selectors with empty segments (`"a..b"`, `".a"`)
/// are rejected.
pub(crate) fn segments(path: &str) -> Result<Vec<&str>, TreeError> {
    if path.is_empty() {
        return Err(TreeError::InvalidSelector {
            path: path.to_string(),
        });
    }
    let parts: Vec<&str> = path.split('.').collect();
    if parts.iter().any(|p| p.is_empty()) {
        return Err(TreeError::InvalidSelector {
            path: path.to_string(),
        });
    }
    Ok(parts)
}
