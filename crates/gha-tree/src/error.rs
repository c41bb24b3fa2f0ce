//! Error types for tree conversion and lookup

/// Errors raised while building or walking a configuration tree
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TreeError {
    /// Two keys of the same mapping normalize to the same field name
    #[error("malformed config: keys {first:?} and {second:?} both normalize to {normalized:?}")]
    MalformedConfig {
        first: String,
        second: String,
        normalized: String,
    },

    /// A segment of the selector does not exist
    #[error("path not found: {path} (no field {segment:?})")]
    PathNotFound { path: String, segment: String },

    /// The selector is empty or contains an empty segment
    #[error("invalid selector {path:?}: a non-empty dotted selector is required")]
    InvalidSelector { path: String },

    /// The selected value does not have the requested shape
    #[error("type mismatch at {path}: expected {expected}")]
    TypeMismatch {
        path: String,
        expected: &'static str,
    },
}
