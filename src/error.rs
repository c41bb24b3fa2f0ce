//! Error taxonomy for settings computation
//!
//! Every error is fatal to the invoking process: the CLI reports it and
//! exits non-zero so the CI job fails visibly.

use gha_output::OutputError;
use gha_tree::TreeError;
use std::io;
use std::path::PathBuf;

/// Errors raised while computing or writing settings
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Lookup or conversion failure in a configuration tree
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// Output encoding or channel failure
    #[error(transparent)]
    Output(#[from] OutputError),

    /// Unparsable YAML/JSON/TOML, or input with the wrong shape
    #[error("malformed config: {0}")]
    MalformedConfig(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A line of the `--outputs` text that is not `VAR = ctx.path`
    #[error("invalid output spec {line:?}: {reason}")]
    InvalidOutputSpec { line: String, reason: &'static str },

    #[error("unknown context {0:?} (expected one of: cfg, env, github, inputs)")]
    UnknownContext(String),

    #[error("workflow {0} requires --inputs")]
    MissingInputs(&'static str),

    #[error("workflow {workflow} does not support {operation}")]
    UnsupportedOperation {
        workflow: &'static str,
        operation: &'static str,
    },

    /// An external command (`git`, `gh`) could not run or failed
    #[error("command `{command}` failed: {detail}")]
    Command { command: String, detail: String },

    #[error("{0} is not set")]
    MissingEnv(&'static str),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Error::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result alias used across the crate
pub type Result<T> = std::result::Result<T, Error>;
