//! GitHub Actions output and step summary channels.
//!
//! Outputs are appended to the file named by `GITHUB_OUTPUT`:
//! single-line values as `NAME=value`, multi-line values as a
//! `NAME<<EOF` heredoc block. Booleans are encoded as presence/absence:
//! `true` becomes the lower-cased variable name, `false` an empty value.
//!
//! Markdown summaries are appended to the file named by
//! `GITHUB_STEP_SUMMARY`.

mod env;
mod summary;
mod value;
mod writer;

pub use env::{export_env, export_env_with};
pub use summary::append_summary;
pub use value::{OutputValue, Outputs};
pub use writer::{validate_name, write_outputs, OutputWriter, HEREDOC_DELIMITER};

use std::io;

/// Environment variable naming the output file
pub const GITHUB_OUTPUT: &str = "GITHUB_OUTPUT";

/// Environment variable naming the step summary file
pub const GITHUB_STEP_SUMMARY: &str = "GITHUB_STEP_SUMMARY";

/// Errors raised while encoding or writing outputs
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    #[error("unsupported output value type: {name} = {kind}")]
    UnsupportedOutputType { name: String, kind: &'static str },

    #[error("invalid output name: {0:?}")]
    InvalidName(String),

    #[error("value of {0} contains a line equal to the heredoc delimiter")]
    DelimiterCollision(String),

    #[error("failed to write output channel: {0}")]
    IoError(#[from] io::Error),
}
